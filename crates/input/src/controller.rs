use crate::event::KeyEventKind;
use crate::hub::{KeyboardHub, KeyboardSubscription};
use crate::state::DirectionalInput;
use std::cell::RefCell;
use std::rc::Rc;

/// Owns the directional flags and wires them to a keyboard hub.
///
/// The controller never reads the hub itself: key presses and releases are
/// pushed into the shared state by the listeners installed in
/// [`InputController::subscribe`], and the frame loop pulls a copy with
/// [`InputController::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct InputController {
    state: Rc<RefCell<DirectionalInput>>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the press and release handlers on `hub`.
    ///
    /// Both handlers stay registered exactly as long as the returned
    /// subscription lives.
    pub fn subscribe(&self, hub: &KeyboardHub) -> KeyboardSubscription {
        let state = Rc::clone(&self.state);
        let press = hub.add_listener(KeyEventKind::Press, move |key| {
            match state.borrow_mut().press(key) {
                Some(direction) => tracing::trace!(%key, direction = direction.name(), "held"),
                None => tracing::trace!(%key, "ignoring unmapped key press"),
            }
        });

        let state = Rc::clone(&self.state);
        let release = hub.add_listener(KeyEventKind::Release, move |key| {
            match state.borrow_mut().release(key) {
                Some(direction) => tracing::trace!(%key, direction = direction.name(), "released"),
                None => tracing::trace!(%key, "ignoring unmapped key release"),
            }
        });

        tracing::debug!("input controller subscribed to keyboard");
        KeyboardSubscription::new(hub, vec![press, release])
    }

    /// Copy of the current flags, for one frame.
    pub fn snapshot(&self) -> DirectionalInput {
        *self.state.borrow()
    }

    /// Clear every flag, e.g. when the window loses focus and release
    /// events will never arrive.
    pub fn reset(&self) {
        *self.state.borrow_mut() = DirectionalInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEvent;
    use crate::key::KeyCode;

    #[test]
    fn press_and_release_through_hub() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let _sub = controller.subscribe(&hub);

        hub.dispatch(KeyEvent::press(KeyCode::W));
        assert!(controller.snapshot().forward);
        hub.dispatch(KeyEvent::release(KeyCode::W));
        assert!(!controller.snapshot().forward);
    }

    #[test]
    fn subscribe_registers_two_listeners() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let sub = controller.subscribe(&hub);
        assert_eq!(hub.listener_count(), 2);
        assert_eq!(sub.ids().len(), 2);
    }

    #[test]
    fn teardown_detaches_handlers() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let sub = controller.subscribe(&hub);
        drop(sub);

        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.dispatch(KeyEvent::press(KeyCode::D)), 0);
        assert_eq!(controller.snapshot(), DirectionalInput::default());
    }

    #[test]
    fn out_of_order_release_is_handled() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let _sub = controller.subscribe(&hub);

        hub.dispatch(KeyEvent::press(KeyCode::W));
        hub.dispatch(KeyEvent::press(KeyCode::D));
        hub.dispatch(KeyEvent::release(KeyCode::W));
        let s = controller.snapshot();
        assert!(!s.forward);
        assert!(s.right);
        hub.dispatch(KeyEvent::release(KeyCode::D));
        assert!(!controller.snapshot().any());
    }

    #[test]
    fn unmapped_keys_leave_state_alone() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let _sub = controller.subscribe(&hub);

        hub.dispatch(KeyEvent::press(KeyCode(13)));
        hub.dispatch(KeyEvent::release(KeyCode(27)));
        assert_eq!(controller.snapshot(), DirectionalInput::default());
    }

    #[test]
    fn reset_clears_held_flags() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let _sub = controller.subscribe(&hub);
        hub.dispatch(KeyEvent::press(KeyCode::ARROW_LEFT));
        hub.dispatch(KeyEvent::press(KeyCode::ARROW_DOWN));
        controller.reset();
        assert!(!controller.snapshot().any());
    }

    #[test]
    fn clones_share_state() {
        let hub = KeyboardHub::new();
        let controller = InputController::new();
        let view = controller.clone();
        let _sub = controller.subscribe(&hub);
        hub.dispatch(KeyEvent::press(KeyCode::A));
        assert!(view.snapshot().left);
    }
}
