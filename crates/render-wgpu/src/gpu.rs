use crate::camera::OrbitCamera;
use crate::mesh::{self, MeshData, Vertex};
use crate::shaders;
use crate::uniforms::{Globals, ObjectUniform};
use boxstage_common::Color;
use boxstage_scene::{FloorConfig, SceneComposer, SceneConfig};
use glam::{Mat4, Quat};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Uniform buffer and bind group holding one draw's model matrix and color.
struct DrawUniform {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawUniform {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        initial: ObjectUniform,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_uniform")),
            contents: bytemuck::bytes_of(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_bind_group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Options for [`create_pipeline`] that differ between the three pipelines.
struct PipelineSpec<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vs_entry: &'a str,
    /// Fragment entry and color target; `None` for depth-only passes.
    fragment: Option<(&'a str, wgpu::ColorTargetState)>,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    bias: wgpu::DepthBiasState,
}

fn create_pipeline(device: &wgpu::Device, spec: PipelineSpec<'_>) -> wgpu::RenderPipeline {
    let targets = spec.fragment.as_ref().map(|(_, target)| [Some(target.clone())]);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some(spec.vs_entry),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                ],
            }],
        },
        fragment: match (&spec.fragment, &targets) {
            (Some((entry, _)), Some(targets)) => Some(wgpu::FragmentState {
                module: spec.shader,
                entry_point: Some(*entry),
                compilation_options: Default::default(),
                targets,
            }),
            _ => None,
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: spec.bias,
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn floor_matrix(floor: &FloorConfig) -> Mat4 {
    Mat4::from_rotation_translation(Quat::from_rotation_x(floor.rotation_x), floor.position)
}

/// wgpu-based scene renderer: shadow depth pass, then the lit box and the
/// shadow-receiving floor.
pub struct WgpuRenderer {
    shadow_pipeline: wgpu::RenderPipeline,
    object_pipeline: wgpu::RenderPipeline,
    floor_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    shadow_globals_bind_group: wgpu::BindGroup,
    scene_globals_bind_group: wgpu::BindGroup,
    box_mesh: GpuMesh,
    floor_mesh: GpuMesh,
    box_uniform: DrawUniform,
    floor_uniform: DrawUniform,
    shadow_view: wgpu::TextureView,
    depth_texture: wgpu::TextureView,
    config: SceneConfig,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SceneConfig,
    ) -> Self {
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&Globals::new(config, Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shadow_globals_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow_globals_layout"),
                entries: &[uniform_entry(0)],
            });
        let scene_globals_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene_globals_layout"),
                entries: &[
                    uniform_entry(0),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[uniform_entry(0)],
        });

        // Shadow map
        let shadow = &config.sun.shadow;
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: shadow.map_width.max(1),
                height: shadow.map_height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_view = shadow_texture.create_view(&Default::default());
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shadow_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_globals_bind_group"),
            layout: &shadow_globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let scene_globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_globals_bind_group"),
            layout: &scene_globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_pipeline_layout"),
            bind_group_layouts: &[&shadow_globals_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&scene_globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::shadow_shader().into()),
        });
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::scene_shader().into()),
        });

        let shadow_pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "shadow_pipeline",
                layout: &shadow_layout,
                shader: &shadow_shader,
                vs_entry: "vs_shadow",
                fragment: None,
                cull_mode: None,
                depth_write: true,
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            },
        );
        let object_pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "object_pipeline",
                layout: &scene_layout,
                shader: &scene_shader,
                vs_entry: "vs_main",
                fragment: Some((
                    "fs_object",
                    wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    },
                )),
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                bias: Default::default(),
            },
        );
        let floor_pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "floor_pipeline",
                layout: &scene_layout,
                shader: &scene_shader,
                vs_entry: "vs_main",
                fragment: Some((
                    "fs_floor",
                    wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    },
                )),
                cull_mode: None,
                depth_write: false,
                bias: Default::default(),
            },
        );

        let box_mesh = GpuMesh::upload(device, "box", &mesh::box_mesh(config.controllable.size));
        let floor_mesh = GpuMesh::upload(
            device,
            "floor",
            &mesh::plane_mesh(config.floor.width, config.floor.depth),
        );
        let box_uniform = DrawUniform::new(
            device,
            &object_layout,
            "box",
            ObjectUniform::new(Mat4::IDENTITY, config.controllable.color),
        );
        let floor_uniform = DrawUniform::new(
            device,
            &object_layout,
            "floor",
            ObjectUniform::new(floor_matrix(&config.floor), Color::BLACK),
        );

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(
            shadow_width = shadow.map_width,
            shadow_height = shadow.map_height,
            "wgpu renderer created"
        );

        Self {
            shadow_pipeline,
            object_pipeline,
            floor_pipeline,
            globals_buffer,
            shadow_globals_bind_group,
            scene_globals_bind_group,
            box_mesh,
            floor_mesh,
            box_uniform,
            floor_uniform,
            shadow_view,
            depth_texture,
            config: config.clone(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: shadow pass, then box and floor.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &SceneComposer,
    ) {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::new(&self.config, camera.view_projection())),
        );

        let object = scene.object();
        if let Some(object) = object {
            queue.write_buffer(
                &self.box_uniform.buffer,
                0,
                bytemuck::bytes_of(&ObjectUniform::new(
                    object.transform().matrix(),
                    object.color(),
                )),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if object.is_some() {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.shadow_globals_bind_group, &[]);
                pass.set_bind_group(1, &self.box_uniform.bind_group, &[]);
                self.box_mesh.draw(&mut pass);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.72,
                            g: 0.72,
                            b: 0.78,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.scene_globals_bind_group, &[]);

            // Opaque box first; the blended floor is drawn over it.
            if object.is_some() {
                pass.set_pipeline(&self.object_pipeline);
                pass.set_bind_group(1, &self.box_uniform.bind_group, &[]);
                self.box_mesh.draw(&mut pass);
            }

            pass.set_pipeline(&self.floor_pipeline);
            pass.set_bind_group(1, &self.floor_uniform.bind_group, &[]);
            self.floor_mesh.draw(&mut pass);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn floor_matrix_lays_plane_flat_below_origin() {
        let m = floor_matrix(&FloorConfig::default());
        let normal = m.transform_vector3(Vec3::Z);
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
        let corner = m.transform_point3(Vec3::new(50.0, 50.0, 0.0));
        assert!((corner.y + 3.0).abs() < 1e-4);
        assert!((corner.z + 50.0).abs() < 1e-4);
    }
}
