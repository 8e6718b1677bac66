//! wgpu render backend for the box stage.
//!
//! Draws the controllable box lit by ambient, directional and point lights,
//! and a floor that only shows the box's shadow. The directional light renders
//! a depth map first; the main pass samples it.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Camera motion is view state only; it does not feed the frame update.

mod camera;
mod gpu;
mod mesh;
mod shaders;
mod uniforms;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;

pub fn crate_info() -> &'static str {
    concat!("boxstage-render-wgpu v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().starts_with("boxstage-render-wgpu v"));
    }
}
