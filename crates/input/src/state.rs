use crate::key::{Direction, KeyCode};

/// The four directional flags, one per movement direction.
///
/// `Copy` so the frame loop receives a by-value snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        let flag = match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        };
        *flag = held;
    }

    /// Handle a key press. Returns the affected direction, or `None` for an
    /// unmapped key (which leaves the state untouched).
    pub fn press(&mut self, key: KeyCode) -> Option<Direction> {
        let direction = key.direction()?;
        self.set(direction, true);
        Some(direction)
    }

    /// Handle a key release. Releasing a key that is not held is a no-op.
    pub fn release(&mut self, key: KeyCode) -> Option<Direction> {
        let direction = key.direction()?;
        self.set(direction, false);
        Some(direction)
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Directions currently held, in [`Direction::ALL`] order.
    pub fn held(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_held(*d))
    }
}
