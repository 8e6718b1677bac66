use crate::config::SceneConfig;
use crate::controllable::Controllable;
use crate::interpolate::Interpolator;
use crate::picking::Ray;
use boxstage_input::DirectionalInput;

/// Owns the scene description and, while mounted, the controllable box.
///
/// The composer is driven from outside: the host calls [`SceneComposer::frame`]
/// once per rendered frame with the current input snapshot. Camera, lights and
/// floor are fixed configuration and never change after construction.
#[derive(Debug)]
pub struct SceneComposer {
    config: SceneConfig,
    object: Option<Controllable>,
    frames: u64,
}

impl SceneComposer {
    /// Create an unmounted composer.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            object: None,
            frames: 0,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Create the controllable box with the configured spring.
    pub fn mount(&mut self) {
        let object = Controllable::new(&self.config.controllable);
        self.install(object);
    }

    /// Create the controllable box with a caller-chosen interpolator.
    pub fn mount_with(&mut self, interpolator: Box<dyn Interpolator>) {
        let object = Controllable::with_interpolator(&self.config.controllable, interpolator);
        self.install(object);
    }

    fn install(&mut self, object: Controllable) {
        if self.object.is_some() {
            tracing::warn!("scene already mounted; replacing controllable object");
        }
        self.object = Some(object);
        tracing::debug!("scene mounted");
    }

    /// Destroy the controllable box. Later frames are no-ops.
    pub fn unmount(&mut self) {
        if self.object.take().is_some() {
            tracing::debug!(frames = self.frames, "scene unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.object.is_some()
    }

    pub fn object(&self) -> Option<&Controllable> {
        self.object.as_ref()
    }

    /// Frames run since construction, mounted or not.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// The frame callback. A no-op for the object while nothing is mounted.
    pub fn frame(&mut self, input: DirectionalInput, dt: f32) {
        self.frames += 1;
        match self.object.as_mut() {
            Some(object) => object.advance(input, dt),
            None => tracing::trace!(frame = self.frames, "frame before mount; nothing to update"),
        }
    }

    /// Toggle expansion of the box. Returns the new expanded flag, or `None`
    /// when nothing is mounted.
    pub fn click(&mut self) -> Option<bool> {
        self.object.as_mut().map(Controllable::toggle_expanded)
    }

    /// Toggle expansion only if `ray` hits the box. Returns whether it did.
    pub fn click_at(&mut self, ray: &Ray) -> bool {
        let Some(object) = self.object.as_mut() else {
            return false;
        };
        match ray.intersect_aabb(&object.bounds()) {
            Some(distance) => {
                tracing::debug!(distance, "click hit controllable");
                object.toggle_expanded();
                true
            }
            None => false,
        }
    }
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}
