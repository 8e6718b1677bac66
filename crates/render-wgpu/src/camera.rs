use boxstage_scene::{CameraConfig, Ray};
use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 200.0;

/// Orbit camera circling a target point.
/// View state only; it never feeds back into the scene's frame update.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    /// Place the camera at the configured eye, orbiting the configured target.
    pub fn from_config(config: &CameraConfig) -> Self {
        let offset = config.position - config.target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let (yaw, pitch) = if offset.length_squared() > 0.0 {
            (
                offset.z.atan2(offset.x),
                (offset.y / offset.length()).clamp(-1.0, 1.0).asin(),
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            target: config.target,
            distance,
            yaw,
            pitch: clamp_pitch(pitch),
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            sensitivity: 0.005,
            zoom_speed: 1.1,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * cy, sp, cp * sy) * self.distance
    }

    /// Rotate around the target by a cursor delta in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = clamp_pitch(self.pitch + dy * self.sensitivity);
    }

    /// Move toward (positive delta) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance * self.zoom_speed.powf(-delta)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a cursor position given in pixels from the
    /// top-left corner of a surface of `size` pixels.
    pub fn screen_ray(&self, cursor: Vec2, size: Vec2) -> Option<Ray> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0);
        let inv = self.view_projection().inverse();
        let near = inv * ndc.extend(0.0).extend(1.0);
        let far = inv * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray::new(near, far - near)
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_starts_at_configured_eye() {
        let cam = OrbitCamera::default();
        assert!(cam.position().abs_diff_eq(Vec3::new(5.0, 5.0, 5.0), 1e-4));
        assert!((cam.fov - 100.0_f32.to_radians()).abs() < 1e-6);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = OrbitCamera::default();
        let d = cam.position().distance(cam.target);
        cam.orbit(120.0, -40.0);
        assert!((cam.position().distance(cam.target) - d).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
        assert!(!cam.view_matrix().col(0).x.is_nan());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        let before = cam.distance;
        cam.zoom(1.0);
        assert!(cam.distance < before);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = OrbitCamera::default();
        let size = Vec2::new(1600.0, 900.0);
        let ray = cam.screen_ray(size * 0.5, size).expect("ray");
        let expected = (cam.target - cam.position()).normalize();
        assert!(ray.direction.abs_diff_eq(expected, 1e-3));
    }

    #[test]
    fn zero_sized_surface_has_no_ray() {
        let cam = OrbitCamera::default();
        assert!(cam.screen_ray(Vec2::ZERO, Vec2::ZERO).is_none());
    }
}
