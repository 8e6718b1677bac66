//! Scene Composer: camera, lights, floor and the one controllable box.
//!
//! # Invariants
//! - The per-frame update is a pure function of the input snapshot, the
//!   current transform and elapsed time; it never touches a GPU.
//! - Only the [`Controllable`] mutates its transform.
//! - A frame before mount (or after unmount) is a no-op.

mod composer;
mod config;
mod controllable;
mod error;
mod interpolate;
mod motion;
mod picking;

pub use composer::SceneComposer;
pub use config::{
    AmbientLight, CameraConfig, ControllableConfig, DirectionalLight, FloorConfig,
    MAX_POINT_LIGHTS, MAX_SHADOW_MAP_SIZE, PointLight, SceneConfig, ShadowConfig, SpringConfig,
};
pub use controllable::Controllable;
pub use error::SceneError;
pub use interpolate::{Interpolator, Snap, SpringInterpolator};
pub use motion::{DEFAULT_STEP, apply_motion, motion_delta};
pub use picking::{Aabb, Ray};

pub fn crate_info() -> &'static str {
    concat!("boxstage-scene v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().starts_with("boxstage-scene v"));
    }
}
