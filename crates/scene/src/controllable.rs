use crate::config::ControllableConfig;
use crate::interpolate::{Interpolator, SpringInterpolator};
use crate::motion::apply_motion;
use crate::picking::Aabb;
use boxstage_common::{Color, Transform};
use boxstage_input::DirectionalInput;
use glam::Vec3;

/// The single box whose transform responds to input.
///
/// Owns its transform; nothing else mutates it. Position moves by a fixed
/// step per held direction per frame, and scale is animated by the injected
/// interpolator toward the rest or expanded endpoint.
#[derive(Debug)]
pub struct Controllable {
    transform: Transform,
    size: Vec3,
    color: Color,
    step: f32,
    rest_scale: Vec3,
    expanded_scale: Vec3,
    expanded: bool,
    interpolator: Box<dyn Interpolator>,
}

impl Controllable {
    /// Build the object with the spring described by the config.
    pub fn new(config: &ControllableConfig) -> Self {
        Self::with_interpolator(config, Box::new(SpringInterpolator::new(config.spring)))
    }

    pub fn with_interpolator(
        config: &ControllableConfig,
        interpolator: Box<dyn Interpolator>,
    ) -> Self {
        Self {
            transform: Transform {
                position: config.position,
                scale: config.rest_scale,
                ..Transform::default()
            },
            size: config.size,
            color: config.color,
            step: config.step,
            rest_scale: config.rest_scale,
            expanded_scale: config.expanded_scale,
            expanded: false,
            interpolator,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The scale the interpolator is currently heading for.
    pub fn scale_target(&self) -> Vec3 {
        if self.expanded {
            self.expanded_scale
        } else {
            self.rest_scale
        }
    }

    /// Flip the expanded flag. Returns the new value.
    pub fn toggle_expanded(&mut self) -> bool {
        self.expanded = !self.expanded;
        tracing::debug!(
            expanded = self.expanded,
            target = ?self.scale_target(),
            "controllable toggled"
        );
        self.expanded
    }

    /// World-space bounds of the box at its current position and scale.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.transform.position, self.size * self.transform.scale)
    }

    /// Per-frame update: move by the held directions, then advance the scale
    /// animation by `dt` seconds.
    pub fn advance(&mut self, input: DirectionalInput, dt: f32) {
        apply_motion(&mut self.transform.position, input, self.step);
        let target = self.scale_target();
        self.transform.scale = self.interpolator.step(self.transform.scale, target, dt);
    }
}
