use crate::config::SpringConfig;
use glam::Vec3;
use std::fmt::Debug;

/// Strategy that animates a value toward a target over time.
pub trait Interpolator: Debug {
    /// Given the current value, the target and the seconds elapsed since the
    /// previous call, produce the next value.
    fn step(&mut self, current: Vec3, target: Vec3, dt: f32) -> Vec3;

    /// Forget any internal motion (velocity etc.).
    fn reset(&mut self) {}
}

/// Jumps straight to the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snap;

impl Interpolator for Snap {
    fn step(&mut self, _current: Vec3, target: Vec3, _dt: f32) -> Vec3 {
        target
    }
}

/// Largest integration step; longer frames are split into substeps.
const MAX_SUBSTEP: f32 = 0.001;
/// Frames longer than this are clamped, so a stall cannot explode the spring.
const MAX_FRAME: f32 = 0.25;

/// Damped spring integrated with semi-implicit Euler.
#[derive(Debug, Clone, Copy)]
pub struct SpringInterpolator {
    config: SpringConfig,
    velocity: Vec3,
}

impl SpringInterpolator {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            velocity: Vec3::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn is_at_rest(&self, current: Vec3, target: Vec3) -> bool {
        self.velocity.length() < self.config.precision
            && current.distance(target) < self.config.precision
    }
}

impl Default for SpringInterpolator {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl Interpolator for SpringInterpolator {
    fn step(&mut self, current: Vec3, target: Vec3, dt: f32) -> Vec3 {
        if !dt.is_finite() || dt <= 0.0 {
            return current;
        }
        if self.is_at_rest(current, target) {
            self.velocity = Vec3::ZERO;
            return target;
        }

        let SpringConfig {
            tension,
            friction,
            mass,
            ..
        } = self.config;
        let mut value = current;
        let mut remaining = dt.min(MAX_FRAME);
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            let force = -tension * (value - target) - friction * self.velocity;
            self.velocity += force / mass * h;
            value += self.velocity * h;
            remaining -= h;
        }

        if self.is_at_rest(value, target) {
            self.velocity = Vec3::ZERO;
            return target;
        }
        value
    }

    fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}
