use boxstage_input::DirectionalInput;
use glam::Vec3;

/// Distance moved per frame for each held direction.
pub const DEFAULT_STEP: f32 = 0.05;

/// Apply one frame of movement to `position`.
///
/// Each held direction contributes its own increment, so diagonals sum and
/// opposite directions are both applied (net zero) rather than suppressed.
/// Forward is +Z, right is +X.
pub fn apply_motion(position: &mut Vec3, input: DirectionalInput, step: f32) {
    if input.forward {
        position.z += step;
    }
    if input.backward {
        position.z -= step;
    }
    if input.left {
        position.x -= step;
    }
    if input.right {
        position.x += step;
    }
}

/// The displacement one frame of `input` would produce from the origin.
pub fn motion_delta(input: DirectionalInput, step: f32) -> Vec3 {
    let mut delta = Vec3::ZERO;
    apply_motion(&mut delta, input, step);
    delta
}
