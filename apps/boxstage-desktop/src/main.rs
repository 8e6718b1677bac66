mod keymap;

use anyhow::{Context, Result};
use boxstage_input::{InputController, KeyEvent as HubKeyEvent, KeyboardHub, KeyboardSubscription};
use boxstage_render::FrameReport;
use boxstage_render_wgpu::{OrbitCamera, WgpuRenderer};
use boxstage_scene::{SceneComposer, SceneConfig};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Cursor travel in pixels after which a left press becomes an orbit drag
/// instead of a click.
const DRAG_THRESHOLD: f32 = 4.0;

#[derive(Parser)]
#[command(name = "boxstage-desktop", about = "Box stage desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene description (defaults are used when omitted)
    #[arg(long)]
    scene: Option<PathBuf>,
}

#[derive(Default)]
struct Pointer {
    cursor: Vec2,
    pressed_at: Option<Vec2>,
    dragging: bool,
}

/// Application state.
struct AppState {
    scene: SceneComposer,
    hub: KeyboardHub,
    input: InputController,
    subscription: Option<KeyboardSubscription>,
    camera: OrbitCamera,
    pointer: Pointer,
    show_overlay: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        let camera = OrbitCamera::from_config(&config.camera);
        Self {
            scene: SceneComposer::new(config),
            hub: KeyboardHub::new(),
            input: InputController::new(),
            subscription: None,
            camera,
            pointer: Pointer::default(),
            show_overlay: true,
            last_frame: Instant::now(),
        }
    }

    fn mount(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.input.subscribe(&self.hub));
        }
        if !self.scene.is_mounted() {
            self.scene.mount();
        }
        self.last_frame = Instant::now();
        tracing::info!("scene mounted");
    }

    fn unmount(&mut self) {
        self.subscription = None;
        self.input.reset();
        self.scene.unmount();
        tracing::info!("scene unmounted");
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.scene.frame(self.input.snapshot(), dt);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed && key == KeyCode::F1 {
            self.show_overlay = !self.show_overlay;
            return;
        }
        let Some(code) = keymap::legacy_code(key) else {
            return;
        };
        let event = if pressed {
            HubKeyEvent::press(code)
        } else {
            HubKeyEvent::release(code)
        };
        self.hub.dispatch(event);
    }

    fn cursor_moved(&mut self, position: Vec2) {
        let delta = position - self.pointer.cursor;
        self.pointer.cursor = position;
        let Some(origin) = self.pointer.pressed_at else {
            return;
        };
        if !self.pointer.dragging && origin.distance(position) > DRAG_THRESHOLD {
            self.pointer.dragging = true;
        }
        if self.pointer.dragging {
            self.camera.orbit(-delta.x, delta.y);
        }
    }

    fn left_button(&mut self, pressed: bool, surface: Vec2) {
        if pressed {
            self.pointer.pressed_at = Some(self.pointer.cursor);
            self.pointer.dragging = false;
            return;
        }
        let clicked = self.pointer.pressed_at.take().is_some() && !self.pointer.dragging;
        self.pointer.dragging = false;
        if !clicked {
            return;
        }
        let Some(ray) = self.camera.screen_ray(self.pointer.cursor, surface) else {
            return;
        };
        if self.scene.click_at(&ray) {
            tracing::debug!(
                expanded = self.scene.object().is_some_and(|o| o.is_expanded()),
                "box clicked"
            );
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let report = FrameReport::capture(&self.scene, self.input.snapshot());

        egui::Window::new("Box Stage")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Frame: {}", report.frame));
                if report.mounted {
                    let p = report.position;
                    let s = report.scale;
                    ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                    ui.label(format!("Scale: ({:.2}, {:.2}, {:.2})", s.x, s.y, s.z));
                    ui.label(format!("Expanded: {}", report.expanded));
                    let held = if report.held.is_empty() {
                        "-".to_string()
                    } else {
                        report.held.join(" + ")
                    };
                    ui.label(format!("Held: {held}"));
                    if ui.button("Toggle size").clicked() {
                        self.scene.click();
                    }
                } else {
                    ui.label("Scene not mounted");
                }
                ui.separator();
                ui.small("WASD / Arrows: Move | Click box: Expand | Drag: Orbit | Wheel: Zoom");
                ui.small("F1: Toggle Overlay");
            });
    }
}

/// Everything that only exists while a window is alive.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn init(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, scene: &SceneConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Box Stage")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("boxstage_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer =
            WgpuRenderer::new(&device, surface_format, config.width, config.height, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.config.width = new_size.width.max(1);
        self.config.height = new_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.scene,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_none() {
            match Gpu::init(event_loop, &self.egui_ctx, self.state.scene.config()) {
                Ok(gpu) => {
                    self.state.camera.aspect = gpu.aspect();
                    self.gpu = Some(gpu);
                }
                Err(e) => {
                    tracing::error!("failed to initialize graphics: {e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }
        self.state.mount();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.unmount();
        self.gpu = None;
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.unmount();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::Focused(false) => {
                // Releases that happen while unfocused never arrive.
                self.state.input.reset();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                let surface = self.gpu.as_ref().map_or(Vec2::ZERO, Gpu::size);
                self.state
                    .left_button(btn_state == ElementState::Pressed, surface);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!(
        renderer = boxstage_render_wgpu::crate_info(),
        "boxstage-desktop starting"
    );

    let config = match &cli.scene {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
