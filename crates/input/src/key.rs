use std::fmt;

/// A keyboard key identified by its legacy DOM key code.
///
/// Hosts translate their native key representation into these codes before
/// dispatching, so the mapping table below is the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ARROW_LEFT: Self = Self(37);
    pub const ARROW_UP: Self = Self(38);
    pub const ARROW_RIGHT: Self = Self(39);
    pub const ARROW_DOWN: Self = Self(40);
    pub const A: Self = Self(65);
    pub const D: Self = Self(68);
    pub const S: Self = Self(83);
    pub const W: Self = Self(87);

    /// Every code that maps to a direction.
    pub const MAPPED: [Self; 8] = [
        Self::ARROW_UP,
        Self::W,
        Self::ARROW_DOWN,
        Self::S,
        Self::ARROW_LEFT,
        Self::A,
        Self::ARROW_RIGHT,
        Self::D,
    ];

    /// The direction this key drives, if any.
    pub fn direction(self) -> Option<Direction> {
        Direction::from_key(self)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Forward, Self::Backward, Self::Left, Self::Right];

    /// Arrow keys and W/A/S/D are aliases of the same four directions.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ARROW_UP | KeyCode::W => Some(Self::Forward),
            KeyCode::ARROW_DOWN | KeyCode::S => Some(Self::Backward),
            KeyCode::ARROW_LEFT | KeyCode::A => Some(Self::Left),
            KeyCode::ARROW_RIGHT | KeyCode::D => Some(Self::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_alias() {
        assert_eq!(KeyCode::ARROW_UP.direction(), KeyCode::W.direction());
        assert_eq!(KeyCode::ARROW_DOWN.direction(), KeyCode::S.direction());
        assert_eq!(KeyCode::ARROW_LEFT.direction(), KeyCode::A.direction());
        assert_eq!(KeyCode::ARROW_RIGHT.direction(), KeyCode::D.direction());
    }

    #[test]
    fn raw_codes_match_table() {
        assert_eq!(Direction::from_key(KeyCode(87)), Some(Direction::Forward));
        assert_eq!(Direction::from_key(KeyCode(38)), Some(Direction::Forward));
        assert_eq!(Direction::from_key(KeyCode(40)), Some(Direction::Backward));
        assert_eq!(Direction::from_key(KeyCode(83)), Some(Direction::Backward));
        assert_eq!(Direction::from_key(KeyCode(37)), Some(Direction::Left));
        assert_eq!(Direction::from_key(KeyCode(65)), Some(Direction::Left));
        assert_eq!(Direction::from_key(KeyCode(39)), Some(Direction::Right));
        assert_eq!(Direction::from_key(KeyCode(68)), Some(Direction::Right));
    }

    #[test]
    fn unmapped_keys_have_no_direction() {
        for code in [0, 13, 32, 36, 41, 66, 81, 88, 255] {
            assert_eq!(KeyCode(code).direction(), None, "code {code}");
        }
    }

    #[test]
    fn every_direction_has_two_keys() {
        for dir in Direction::ALL {
            let n = KeyCode::MAPPED
                .iter()
                .filter(|k| k.direction() == Some(dir))
                .count();
            assert_eq!(n, 2, "{}", dir.name());
        }
    }
}
