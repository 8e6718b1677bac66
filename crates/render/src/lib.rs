//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Render state derives from the scene and a view.
//!
//! The GPU backend lives in `boxstage-render-wgpu`; the text renderer here is
//! what headless tools and tests use.

mod renderer;

pub use renderer::{DebugTextRenderer, FrameReport, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    concat!("boxstage-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
