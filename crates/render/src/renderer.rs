use boxstage_input::DirectionalInput;
use boxstage_scene::{CameraConfig, SceneComposer};
use glam::Vec3;
use std::fmt;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_camera(&CameraConfig::default())
    }
}

impl RenderView {
    pub fn from_camera(camera: &CameraConfig) -> Self {
        Self {
            eye: camera.position,
            target: camera.target,
            fov_degrees: camera.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene, the input that drove the last frame and a
/// view, then produces output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(
        &self,
        scene: &SceneComposer,
        input: DirectionalInput,
        view: &RenderView,
    ) -> Self::Output;
}

/// Plain-data summary of one frame, shared by text output and UI overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub mounted: bool,
    pub position: Vec3,
    pub scale: Vec3,
    pub scale_target: Vec3,
    pub expanded: bool,
    pub held: Vec<&'static str>,
}

impl FrameReport {
    pub fn capture(scene: &SceneComposer, input: DirectionalInput) -> Self {
        let held = input.held().map(|d| d.name()).collect();
        match scene.object() {
            Some(obj) => Self {
                frame: scene.frame_count(),
                mounted: true,
                position: obj.position(),
                scale: obj.scale(),
                scale_target: obj.scale_target(),
                expanded: obj.is_expanded(),
                held,
            },
            None => Self {
                frame: scene.frame_count(),
                mounted: false,
                position: Vec3::ZERO,
                scale: Vec3::ZERO,
                scale_target: Vec3::ZERO,
                expanded: false,
                held,
            },
        }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mounted {
            return write!(f, "frame={} (not mounted)", self.frame);
        }
        let held = if self.held.is_empty() {
            "-".to_string()
        } else {
            self.held.join("+")
        };
        write!(
            f,
            "frame={} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) target=({:.0}, {:.0}, {:.0}) expanded={} held={}",
            self.frame,
            self.position.x,
            self.position.y,
            self.position.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
            self.scale_target.x,
            self.scale_target.y,
            self.scale_target.z,
            self.expanded,
            held
        )
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of the scene. Useful for CLI
/// output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneComposer, input: DirectionalInput, view: &RenderView) -> String {
        let config = scene.config();
        let mut out = String::new();
        out.push_str(&format!("=== Scene (frame={}) ===\n", scene.frame_count()));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        out.push_str(&format!(
            "Lights: ambient={:.1} sun={:.1} (shadow {}x{}) points={}\n",
            config.ambient.intensity,
            config.sun.intensity,
            config.sun.shadow.map_width,
            config.sun.shadow.map_height,
            config.point_lights.len()
        ));
        out.push_str(&format!(
            "Floor: {:.0}x{:.0} at y={:.1}\n",
            config.floor.width, config.floor.depth, config.floor.position.y
        ));
        out.push_str(&format!("  {}\n", FrameReport::capture(scene, input)));
        tracing::trace!(frame = scene.frame_count(), bytes = out.len(), "text frame rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxstage_scene::Snap;

    #[test]
    fn debug_renderer_writes_one_section_per_line() {
        let output = DebugTextRenderer::new().render(
            &SceneComposer::default(),
            DirectionalInput::default(),
            &RenderView::default(),
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("=== Scene"));
        assert!(lines[1].starts_with("Camera:"));
        assert!(lines[2].starts_with("Lights:"));
        assert!(lines[3].starts_with("Floor:"));
        assert!(lines[4].starts_with("  frame="));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn debug_renderer_unmounted_scene() {
        let scene = SceneComposer::default();
        let output = DebugTextRenderer::new().render(
            &scene,
            DirectionalInput::default(),
            &RenderView::default(),
        );
        assert!(output.contains("frame=0"));
        assert!(output.contains("not mounted"));
        assert!(output.contains("fov=100"));
    }

    #[test]
    fn debug_renderer_reports_object_state() {
        let mut scene = SceneComposer::default();
        scene.mount_with(Box::new(Snap));
        let input = DirectionalInput {
            forward: true,
            right: true,
            ..Default::default()
        };
        scene.frame(input, 1.0 / 60.0);
        scene.click();
        let output = DebugTextRenderer::new().render(&scene, input, &RenderView::default());

        assert!(output.contains("pos=(0.05, 0.00, 0.05)"));
        assert!(output.contains("expanded=true"));
        assert!(output.contains("target=(2, 2, 2)"));
        assert!(output.contains("held=forward+right"));
        assert!(output.contains("shadow 1024x1024"));
    }

    #[test]
    fn report_lists_no_keys_as_dash() {
        let mut scene = SceneComposer::default();
        scene.mount();
        let report = FrameReport::capture(&scene, DirectionalInput::default());
        assert!(report.held.is_empty());
        assert!(report.to_string().contains("held=-"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 100.0);
        assert_eq!(view.eye, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(view.target, Vec3::ZERO);
    }
}
