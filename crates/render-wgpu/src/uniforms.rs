use bytemuck::{Pod, Zeroable};
use boxstage_common::Color;
use boxstage_scene::{DirectionalLight, MAX_POINT_LIGHTS, SceneConfig};
use glam::{Mat4, Vec3};

/// Per-frame values shared by every draw. Layout mirrors `Globals` in the
/// WGSL sources: only `vec4`/`mat4` members, so no padding rules apply.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// rgb = ambient color * intensity.
    pub ambient: [f32; 4],
    /// xyz = unit vector toward the sun, w = intensity.
    pub sun: [f32; 4],
    /// xyz = position, w = intensity (0 for unused slots).
    pub point_lights: [[f32; 4]; MAX_POINT_LIGHTS],
    /// x = floor shadow opacity, y = shadow depth bias, z = 1 / shadow map width.
    pub params: [f32; 4],
}

impl Globals {
    pub fn new(config: &SceneConfig, view_proj: Mat4) -> Self {
        let ambient = scaled(config.ambient.color, config.ambient.intensity);
        let dir = config.sun.direction();

        let mut point_lights = [[0.0; 4]; MAX_POINT_LIGHTS];
        for (slot, light) in point_lights.iter_mut().zip(&config.point_lights) {
            *slot = [
                light.position.x,
                light.position.y,
                light.position.z,
                light.intensity,
            ];
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: light_view_projection(&config.sun).to_cols_array_2d(),
            ambient,
            sun: [dir.x, dir.y, dir.z, config.sun.intensity],
            point_lights,
            params: [
                config.floor.shadow_opacity,
                config.sun.shadow.bias,
                1.0 / config.sun.shadow.map_width.max(1) as f32,
                0.0,
            ],
        }
    }
}

/// Model matrix and color of one draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, color: Color) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_linear(),
        }
    }
}

fn scaled(color: Color, intensity: f32) -> [f32; 4] {
    let [r, g, b, _] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, 1.0]
}

/// Orthographic view-projection of the directional light's shadow camera.
pub(crate) fn light_view_projection(sun: &DirectionalLight) -> Mat4 {
    let dir = sun.direction();
    let up = if dir.abs_diff_eq(Vec3::Y, 1e-4) || dir.abs_diff_eq(Vec3::NEG_Y, 1e-4) {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(sun.position, sun.target, up);
    let s = &sun.shadow;
    let proj = Mat4::orthographic_rh(s.left, s.right, s.bottom, s.top, s.near, s.far);
    proj * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxstage_scene::PointLight;

    #[test]
    fn layouts_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
        assert_eq!(
            std::mem::size_of::<Globals>(),
            64 * 2 + 16 * 3 + 16 * MAX_POINT_LIGHTS
        );
    }

    #[test]
    fn unused_point_light_slots_are_dark() {
        let g = Globals::new(&SceneConfig::default(), Mat4::IDENTITY);
        assert_eq!(g.point_lights[0], [-10.0, 0.0, -10.0, 0.5]);
        assert_eq!(g.point_lights[1], [0.0, -10.0, 0.0, 1.5]);
        assert_eq!(g.point_lights[2][3], 0.0);
        assert_eq!(g.point_lights[3][3], 0.0);
    }

    #[test]
    fn sun_and_floor_params() {
        let mut config = SceneConfig::default();
        config.point_lights.push(PointLight {
            position: Vec3::ONE,
            intensity: 2.0,
        });
        let g = Globals::new(&config, Mat4::IDENTITY);
        assert_eq!(g.sun, [0.0, 1.0, 0.0, 1.5]);
        assert_eq!(g.params[0], 0.3);
        assert_eq!(g.params[2], 1.0 / 1024.0);
        assert_eq!(g.point_lights[2][3], 2.0);
        assert!((g.ambient[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn shadow_frustum_covers_box_and_floor() {
        let sun = SceneConfig::default().sun;
        let m = light_view_projection(&sun);
        for p in [Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0), Vec3::new(9.0, -3.0, -9.0)] {
            let clip = m.project_point3(p);
            assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0, "{p}");
            assert!((0.0..=1.0).contains(&clip.z), "{p}");
        }
        // The box is closer to the light than the floor.
        let box_depth = m.project_point3(Vec3::ZERO).z;
        let floor_depth = m.project_point3(Vec3::new(0.0, -3.0, 0.0)).z;
        assert!(box_depth < floor_depth);
    }

    #[test]
    fn object_uniform_uses_linear_color() {
        let u = ObjectUniform::new(Mat4::IDENTITY, Color::PURPLE);
        assert_eq!(u.color, Color::PURPLE.to_linear());
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }
}
