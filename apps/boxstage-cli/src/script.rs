//! Scripted input sessions.
//!
//! A script is a list of tokens separated by commas or whitespace:
//! `down:<key>`, `up:<key>`, `frame` / `frame:<n>` and `click`. Keys are
//! legacy numeric codes (`87`), single letters (`w`) or arrow names
//! (`arrowup`, or just `up`).

use boxstage_input::{DirectionalInput, InputController, KeyCode, KeyEvent, KeyboardHub};
use boxstage_scene::SceneComposer;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Down(KeyCode),
    Up(KeyCode),
    Frames(u32),
    Click,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown token `{0}`")]
    UnknownToken(String),
    #[error("unknown key `{key}` in `{token}`")]
    UnknownKey { token: String, key: String },
    #[error("invalid frame count in `{0}`: expected a positive integer")]
    BadFrameCount(String),
    #[error("script is empty")]
    Empty,
}

pub fn parse(script: &str) -> Result<Vec<Step>, ScriptError> {
    let steps = script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(parse_token)
        .collect::<Result<Vec<_>, _>>()?;
    if steps.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(steps)
}

fn parse_token(token: &str) -> Result<Step, ScriptError> {
    let lower = token.to_ascii_lowercase();
    let (head, arg) = match lower.split_once(':') {
        Some((head, arg)) => (head, Some(arg)),
        None => (lower.as_str(), None),
    };
    match (head, arg) {
        ("click", None) => Ok(Step::Click),
        ("frame", None) => Ok(Step::Frames(1)),
        ("frame", Some(n)) => match n.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Step::Frames(n)),
            _ => Err(ScriptError::BadFrameCount(token.to_string())),
        },
        ("down", Some(key)) => parse_key(token, key).map(Step::Down),
        ("up", Some(key)) => parse_key(token, key).map(Step::Up),
        _ => Err(ScriptError::UnknownToken(token.to_string())),
    }
}

fn parse_key(token: &str, key: &str) -> Result<KeyCode, ScriptError> {
    if let Ok(code) = key.parse::<u32>() {
        return Ok(KeyCode(code));
    }
    let named = match key {
        "arrowleft" | "left" => Some(KeyCode::ARROW_LEFT),
        "arrowup" | "up" => Some(KeyCode::ARROW_UP),
        "arrowright" | "right" => Some(KeyCode::ARROW_RIGHT),
        "arrowdown" | "down" => Some(KeyCode::ARROW_DOWN),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => {
                    Some(KeyCode(c.to_ascii_uppercase() as u32))
                }
                _ => None,
            }
        }
    };
    named.ok_or_else(|| ScriptError::UnknownKey {
        token: token.to_string(),
        key: key.to_string(),
    })
}

/// Play `steps` against a mounted scene through a fresh keyboard hub.
///
/// `on_frame` runs after every simulated frame. Returns the input state left
/// over when the script ends. The subscription is dropped before returning.
pub fn run(
    steps: &[Step],
    scene: &mut SceneComposer,
    dt: f32,
    mut on_frame: impl FnMut(&SceneComposer, DirectionalInput),
) -> DirectionalInput {
    let hub = KeyboardHub::new();
    let input = InputController::new();
    let subscription = input.subscribe(&hub);

    for step in steps {
        match *step {
            Step::Down(key) => {
                hub.dispatch(KeyEvent::press(key));
            }
            Step::Up(key) => {
                hub.dispatch(KeyEvent::release(key));
            }
            Step::Frames(n) => {
                for _ in 0..n {
                    let snapshot = input.snapshot();
                    scene.frame(snapshot, dt);
                    on_frame(scene, snapshot);
                }
            }
            Step::Click => {
                if scene.click().is_none() {
                    tracing::warn!("click ignored: scene is not mounted");
                }
            }
        }
    }

    let held = input.snapshot();
    subscription.cancel();
    held
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxstage_scene::{SceneConfig, Snap};

    fn mounted() -> SceneComposer {
        let mut scene = SceneComposer::new(SceneConfig::default());
        scene.mount_with(Box::new(Snap));
        scene
    }

    #[test]
    fn parse_all_token_kinds() {
        let steps = parse("down:87, frame frame:3,up:w click").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Down(KeyCode::W),
                Step::Frames(1),
                Step::Frames(3),
                Step::Up(KeyCode::W),
                Step::Click,
            ]
        );
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(
            parse("down:ArrowUp down:left up:D").unwrap(),
            vec![
                Step::Down(KeyCode::ARROW_UP),
                Step::Down(KeyCode::ARROW_LEFT),
                Step::Up(KeyCode::D),
            ]
        );
    }

    #[test]
    fn bare_arrow_names_work_for_all_four_arrows() {
        assert_eq!(
            parse("down:up down:down up:left up:right").unwrap(),
            vec![
                Step::Down(KeyCode::ARROW_UP),
                Step::Down(KeyCode::ARROW_DOWN),
                Step::Up(KeyCode::ARROW_LEFT),
                Step::Up(KeyCode::ARROW_RIGHT),
            ]
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse("  , "), Err(ScriptError::Empty));
        assert_eq!(
            parse("jump"),
            Err(ScriptError::UnknownToken("jump".into()))
        );
        assert_eq!(
            parse("frame:0"),
            Err(ScriptError::BadFrameCount("frame:0".into()))
        );
        assert!(matches!(
            parse("down:shift"),
            Err(ScriptError::UnknownKey { .. })
        ));
        assert_eq!(parse("down"), Err(ScriptError::UnknownToken("down".into())));
    }

    #[test]
    fn press_w_then_release() {
        let mut scene = mounted();
        let mut zs = Vec::new();
        let steps = parse("down:87 frame up:87 frame").unwrap();
        let held = run(&steps, &mut scene, 1.0 / 60.0, |s, _| {
            zs.push(s.object().map(|o| o.position().z).unwrap_or_default());
        });
        assert_eq!(zs.len(), 2);
        assert!((zs[0] - 0.05).abs() < 1e-6);
        assert_eq!(zs[0], zs[1]);
        assert!(!held.any());
    }

    #[test]
    fn held_keys_survive_script_end() {
        let mut scene = mounted();
        let steps = parse("down:d down:w frame:2").unwrap();
        let held = run(&steps, &mut scene, 1.0 / 60.0, |_, input| {
            assert!(input.forward && input.right);
        });
        assert!(held.forward && held.right);
        let p = scene.object().map(|o| o.position()).unwrap_or_default();
        assert!((p.x - 0.1).abs() < 1e-6);
        assert!((p.z - 0.1).abs() < 1e-6);
    }

    #[test]
    fn clicks_toggle_expansion() {
        let mut scene = mounted();
        run(&parse("click frame").unwrap(), &mut scene, 1.0 / 60.0, |_, _| {});
        let object = scene.object().unwrap();
        assert!(object.is_expanded());
        assert_eq!(object.scale_target(), glam::Vec3::splat(2.0));

        run(&parse("click frame").unwrap(), &mut scene, 1.0 / 60.0, |_, _| {});
        assert_eq!(scene.object().unwrap().scale_target(), glam::Vec3::ONE);
    }

    #[test]
    fn unmounted_scene_counts_frames_only() {
        let mut scene = SceneComposer::default();
        run(&parse("down:w frame click").unwrap(), &mut scene, 1.0 / 60.0, |_, _| {});
        assert_eq!(scene.frame_count(), 1);
        assert!(scene.object().is_none());
    }
}
