/// Shared uniform declarations; must match `uniforms::Globals` and
/// `uniforms::ObjectUniform`.
const COMMON: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    sun: vec4<f32>,
    point_lights: array<vec4<f32>, 4>,
    params: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> draw_object: Object;
"#;

/// Depth-only pass rendered from the directional light.
const SHADOW_BODY: &str = r#"
@vertex
fn vs_shadow(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.light_view_proj * draw_object.model * vec4<f32>(position, 1.0);
}
"#;

/// Main pass: lit objects and the shadow-only floor.
const SCENE_BODY: &str = r#"
@group(0) @binding(1)
var shadow_map: texture_depth_2d;

@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = draw_object.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (draw_object.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    return out;
}

// 1.0 = fully lit by the sun, 0.0 = fully in shadow.
fn sun_visibility(world_position: vec3<f32>) -> f32 {
    let light_clip = globals.light_view_proj * vec4<f32>(world_position, 1.0);
    let ndc = light_clip.xyz / light_clip.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    let depth = ndc.z - globals.params.y;
    let texel = globals.params.z;

    var lit = 0.0;
    for (var x = -1; x <= 1; x++) {
        for (var y = -1; y <= 1; y++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    lit = lit / 9.0;

    let outside = any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0;
    return select(lit, 1.0, outside);
}

@fragment
fn fs_object(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    var light = globals.ambient.rgb;

    let sun = max(dot(n, globals.sun.xyz), 0.0) * globals.sun.w;
    light += vec3<f32>(sun * sun_visibility(in.world_position));

    for (var i = 0u; i < 4u; i++) {
        let p = globals.point_lights[i];
        if (p.w <= 0.0) {
            continue;
        }
        let to_light = normalize(p.xyz - in.world_position);
        light += vec3<f32>(max(dot(n, to_light), 0.0) * p.w);
    }

    return vec4<f32>(draw_object.color.rgb * light, draw_object.color.a);
}

@fragment
fn fs_floor(in: VertexOutput) -> @location(0) vec4<f32> {
    let shadow = 1.0 - sun_visibility(in.world_position);
    return vec4<f32>(0.0, 0.0, 0.0, shadow * globals.params.x);
}
"#;

pub(crate) fn shadow_shader() -> String {
    format!("{COMMON}{SHADOW_BODY}")
}

pub(crate) fn scene_shader() -> String {
    format!("{COMMON}{SCENE_BODY}")
}
