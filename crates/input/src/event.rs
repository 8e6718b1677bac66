use crate::key::KeyCode;

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A raw keyboard event as delivered by the host.
///
/// Hosts (winit, a scripted CLI loop) produce these; the hub fans them out to
/// listeners of the matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: KeyCode,
}

impl KeyEvent {
    pub fn press(key: KeyCode) -> Self {
        Self {
            kind: KeyEventKind::Press,
            key,
        }
    }

    pub fn release(key: KeyCode) -> Self {
        Self {
            kind: KeyEventKind::Release,
            key,
        }
    }
}
