use crate::error::SceneError;
use crate::motion::DEFAULT_STEP;
use boxstage_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on point lights; the GPU backend reserves this many slots.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Largest shadow map edge accepted; matches wgpu's default
/// `max_texture_dimension_2d`.
pub const MAX_SHADOW_MAP_SIZE: u32 = 8192;

/// Initial camera pose and projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 100.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.3,
        }
    }
}

/// Orthographic shadow camera of the directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_width: u32,
    pub map_height: u32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    /// Depth bias subtracted before the shadow comparison.
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_width: 1024,
            map_height: 1024,
            left: -10.0,
            right: 10.0,
            top: 10.0,
            bottom: -10.0,
            near: 0.5,
            far: 50.0,
            bias: 0.002,
        }
    }
}

/// Shadow-casting light shining from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub shadow: ShadowConfig,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            color: Color::WHITE,
            intensity: 1.5,
            shadow: ShadowConfig::default(),
        }
    }
}

impl DirectionalLight {
    /// Unit vector from the lit surface toward the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
}

/// A flat plane that only shows the shadows it receives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub width: f32,
    pub depth: f32,
    pub position: Vec3,
    /// Rotation about X in radians; the plane is authored in XY.
    pub rotation_x: f32,
    pub shadow_opacity: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            depth: 100.0,
            position: Vec3::new(0.0, -3.0, 0.0),
            rotation_x: -std::f32::consts::FRAC_PI_2,
            shadow_opacity: 0.3,
        }
    }
}

/// Spring parameters for the scale animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub tension: f32,
    pub friction: f32,
    pub mass: f32,
    /// Distance and speed below which the spring snaps to rest.
    pub precision: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 170.0,
            friction: 26.0,
            mass: 1.0,
            precision: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllableConfig {
    /// Box width, height, depth.
    pub size: Vec3,
    pub color: Color,
    pub position: Vec3,
    /// Distance moved per frame per held direction.
    pub step: f32,
    pub rest_scale: Vec3,
    pub expanded_scale: Vec3,
    pub spring: SpringConfig,
}

impl Default for ControllableConfig {
    fn default() -> Self {
        Self {
            size: Vec3::ONE,
            color: Color::PURPLE,
            position: Vec3::ZERO,
            step: DEFAULT_STEP,
            rest_scale: Vec3::ONE,
            expanded_scale: Vec3::splat(2.0),
            spring: SpringConfig::default(),
        }
    }
}

/// Everything needed to compose the scene. Missing fields in a JSON file
/// fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub point_lights: Vec<PointLight>,
    pub floor: FloorConfig,
    pub controllable: ControllableConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            ambient: AmbientLight::default(),
            sun: DirectionalLight::default(),
            point_lights: vec![
                PointLight {
                    position: Vec3::new(-10.0, 0.0, -10.0),
                    intensity: 0.5,
                },
                PointLight {
                    position: Vec3::new(0.0, -10.0, 0.0),
                    intensity: 1.5,
                },
            ],
            floor: FloorConfig::default(),
            controllable: ControllableConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Read a JSON scene description and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data)?;
        tracing::debug!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    pub fn from_json(data: &str) -> Result<Self, SceneError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the renderer or the frame loop cannot use.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.validate_finite()?;

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(SceneError::invalid(
                "camera.fov_degrees",
                format!("{} is outside (0, 180)", cam.fov_degrees),
            ));
        }
        if !(cam.near > 0.0) {
            return Err(SceneError::invalid("camera.near", "must be positive"));
        }
        if !(cam.far > cam.near) {
            return Err(SceneError::invalid("camera.far", "must exceed camera.near"));
        }
        if cam.position == cam.target {
            return Err(SceneError::invalid(
                "camera.position",
                "must differ from camera.target",
            ));
        }

        let shadow = &self.sun.shadow;
        if shadow.map_width == 0 || shadow.map_height == 0 {
            return Err(SceneError::invalid("sun.shadow", "map size must be non-zero"));
        }
        if shadow.map_width > MAX_SHADOW_MAP_SIZE || shadow.map_height > MAX_SHADOW_MAP_SIZE {
            return Err(SceneError::invalid(
                "sun.shadow",
                format!(
                    "map size {}x{} exceeds {MAX_SHADOW_MAP_SIZE}",
                    shadow.map_width, shadow.map_height
                ),
            ));
        }
        if !(shadow.right > shadow.left && shadow.top > shadow.bottom) {
            return Err(SceneError::invalid("sun.shadow", "frustum is degenerate"));
        }
        if !(shadow.far > shadow.near) {
            return Err(SceneError::invalid("sun.shadow.far", "must exceed near"));
        }
        if self.sun.position == self.sun.target {
            return Err(SceneError::invalid(
                "sun.position",
                "must differ from sun.target",
            ));
        }

        if self.point_lights.len() > MAX_POINT_LIGHTS {
            return Err(SceneError::invalid(
                "point_lights",
                format!(
                    "{} lights given, at most {MAX_POINT_LIGHTS} supported",
                    self.point_lights.len()
                ),
            ));
        }

        if !(self.floor.width > 0.0 && self.floor.depth > 0.0) {
            return Err(SceneError::invalid("floor", "width and depth must be positive"));
        }
        if !(0.0..=1.0).contains(&self.floor.shadow_opacity) {
            return Err(SceneError::invalid(
                "floor.shadow_opacity",
                "must lie in [0, 1]",
            ));
        }

        let obj = &self.controllable;
        if !(obj.size.cmpgt(Vec3::ZERO).all()) {
            return Err(SceneError::invalid(
                "controllable.size",
                "all extents must be positive",
            ));
        }
        if !obj.step.is_finite() {
            return Err(SceneError::invalid("controllable.step", "must be finite"));
        }
        if !(obj.rest_scale.is_finite() && obj.expanded_scale.is_finite()) {
            return Err(SceneError::invalid(
                "controllable.scale",
                "scale endpoints must be finite",
            ));
        }
        if !(obj.spring.mass > 0.0) {
            return Err(SceneError::invalid(
                "controllable.spring.mass",
                "must be positive",
            ));
        }
        if !(obj.spring.tension >= 0.0 && obj.spring.friction >= 0.0) {
            return Err(SceneError::invalid(
                "controllable.spring",
                "tension and friction must be non-negative",
            ));
        }
        Ok(())
    }

    /// JSON numbers past the f32 range parse as infinities; none of them is
    /// usable in a transform or a light.
    fn validate_finite(&self) -> Result<(), SceneError> {
        let cam = &self.camera;
        finite("camera.position", &cam.position.to_array())?;
        finite("camera.target", &cam.target.to_array())?;
        finite("camera", &[cam.fov_degrees, cam.near, cam.far])?;

        finite("ambient.color", &color(self.ambient.color))?;
        finite("ambient.intensity", &[self.ambient.intensity])?;

        let sun = &self.sun;
        finite("sun.position", &sun.position.to_array())?;
        finite("sun.target", &sun.target.to_array())?;
        finite("sun.color", &color(sun.color))?;
        finite("sun.intensity", &[sun.intensity])?;
        let sh = &sun.shadow;
        finite(
            "sun.shadow",
            &[sh.left, sh.right, sh.top, sh.bottom, sh.near, sh.far, sh.bias],
        )?;

        for light in &self.point_lights {
            finite("point_lights.position", &light.position.to_array())?;
            finite("point_lights.intensity", &[light.intensity])?;
        }

        let floor = &self.floor;
        finite("floor.position", &floor.position.to_array())?;
        finite(
            "floor",
            &[floor.width, floor.depth, floor.rotation_x, floor.shadow_opacity],
        )?;

        let obj = &self.controllable;
        finite("controllable.size", &obj.size.to_array())?;
        finite("controllable.color", &color(obj.color))?;
        finite("controllable.position", &obj.position.to_array())?;
        let spring = &obj.spring;
        finite(
            "controllable.spring",
            &[spring.tension, spring.friction, spring.mass, spring.precision],
        )
    }
}

fn color(c: Color) -> [f32; 3] {
    [c.r, c.g, c.b]
}

fn finite(field: &'static str, values: &[f32]) -> Result<(), SceneError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::invalid(field, "must be finite"))
    }
}
