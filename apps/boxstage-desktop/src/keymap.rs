use boxstage_input::KeyCode as LegacyKey;
use winit::keyboard::KeyCode;

/// Translate a winit physical key into the legacy key code the input hub
/// understands. Keys without a legacy code return `None`.
pub fn legacy_code(key: KeyCode) -> Option<LegacyKey> {
    let code = match key {
        KeyCode::Backspace => 8,
        KeyCode::Tab => 9,
        KeyCode::Enter | KeyCode::NumpadEnter => 13,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => 16,
        KeyCode::ControlLeft | KeyCode::ControlRight => 17,
        KeyCode::AltLeft | KeyCode::AltRight => 18,
        KeyCode::Escape => 27,
        KeyCode::Space => 32,
        KeyCode::ArrowLeft => 37,
        KeyCode::ArrowUp => 38,
        KeyCode::ArrowRight => 39,
        KeyCode::ArrowDown => 40,
        KeyCode::Digit0 => 48,
        KeyCode::Digit1 => 49,
        KeyCode::Digit2 => 50,
        KeyCode::Digit3 => 51,
        KeyCode::Digit4 => 52,
        KeyCode::Digit5 => 53,
        KeyCode::Digit6 => 54,
        KeyCode::Digit7 => 55,
        KeyCode::Digit8 => 56,
        KeyCode::Digit9 => 57,
        KeyCode::KeyA => 65,
        KeyCode::KeyB => 66,
        KeyCode::KeyC => 67,
        KeyCode::KeyD => 68,
        KeyCode::KeyE => 69,
        KeyCode::KeyF => 70,
        KeyCode::KeyG => 71,
        KeyCode::KeyH => 72,
        KeyCode::KeyI => 73,
        KeyCode::KeyJ => 74,
        KeyCode::KeyK => 75,
        KeyCode::KeyL => 76,
        KeyCode::KeyM => 77,
        KeyCode::KeyN => 78,
        KeyCode::KeyO => 79,
        KeyCode::KeyP => 80,
        KeyCode::KeyQ => 81,
        KeyCode::KeyR => 82,
        KeyCode::KeyS => 83,
        KeyCode::KeyT => 84,
        KeyCode::KeyU => 85,
        KeyCode::KeyV => 86,
        KeyCode::KeyW => 87,
        KeyCode::KeyX => 88,
        KeyCode::KeyY => 89,
        KeyCode::KeyZ => 90,
        _ => return None,
    };
    Some(LegacyKey(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxstage_input::Direction;

    #[test]
    fn movement_keys_map_to_directions() {
        let cases = [
            (KeyCode::KeyW, Direction::Forward),
            (KeyCode::ArrowUp, Direction::Forward),
            (KeyCode::KeyS, Direction::Backward),
            (KeyCode::ArrowDown, Direction::Backward),
            (KeyCode::KeyA, Direction::Left),
            (KeyCode::ArrowLeft, Direction::Left),
            (KeyCode::KeyD, Direction::Right),
            (KeyCode::ArrowRight, Direction::Right),
        ];
        for (key, dir) in cases {
            let legacy = legacy_code(key).expect("mapped");
            assert_eq!(legacy.direction(), Some(dir), "{key:?}");
        }
    }

    #[test]
    fn other_keys_keep_their_codes_but_do_not_move() {
        assert_eq!(legacy_code(KeyCode::Space), Some(LegacyKey(32)));
        assert_eq!(legacy_code(KeyCode::KeyQ).and_then(LegacyKey::direction), None);
        assert_eq!(legacy_code(KeyCode::F1), None);
    }
}
