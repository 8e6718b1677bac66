use crate::event::{KeyEvent, KeyEventKind};
use crate::key::KeyCode;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier of a listener registered on a [`KeyboardHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Rc<RefCell<dyn FnMut(KeyCode)>>;

struct Listener {
    kind: KeyEventKind,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

/// Process-wide keyboard event source.
///
/// Listeners are invoked in registration order (BTreeMap keyed by a
/// monotonically increasing id). Cloning the hub yields another handle to the
/// same registry.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one kind of key event.
    ///
    /// Prefer [`crate::InputController::subscribe`], which ties the
    /// registration to a [`KeyboardSubscription`].
    pub fn add_listener(
        &self,
        kind: KeyEventKind,
        handler: impl FnMut(KeyCode) + 'static,
    ) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        let handler: Handler = Rc::new(RefCell::new(handler));
        registry.listeners.insert(id, Listener { kind, handler });
        tracing::trace!(?id, ?kind, "keyboard listener added");
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.registry.borrow_mut().listeners.remove(&id).is_some();
        if removed {
            tracing::trace!(?id, "keyboard listener removed");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// Deliver an event to every listener of its kind. Returns how many
    /// handlers ran.
    ///
    /// The registry is not borrowed while handlers run, so a handler may drop
    /// a subscription; listeners removed that way are skipped for the rest of
    /// the event. A handler that re-enters dispatch is skipped for the nested
    /// event.
    pub fn dispatch(&self, event: KeyEvent) -> usize {
        let handlers: Vec<(ListenerId, Handler)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .filter(|(_, l)| l.kind == event.kind)
            .map(|(id, l)| (*id, Rc::clone(&l.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in &handlers {
            if !self.registry.borrow().listeners.contains_key(id) {
                tracing::trace!(?id, "listener removed during dispatch; skipping");
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut f) => {
                    (&mut *f)(event.key);
                    delivered += 1;
                }
                Err(_) => {
                    tracing::warn!(key = %event.key, "skipping re-entrant keyboard handler");
                }
            }
        }
        delivered
    }
}

/// Owned registration of keyboard listeners.
///
/// Dropping the subscription removes every listener it owns. If the hub is
/// already gone, dropping is a no-op.
#[must_use = "dropping the subscription immediately removes its listeners"]
pub struct KeyboardSubscription {
    registry: Weak<RefCell<Registry>>,
    ids: Vec<ListenerId>,
}

impl fmt::Debug for KeyboardSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardSubscription")
            .field("ids", &self.ids)
            .field("active", &self.is_active())
            .finish()
    }
}

impl KeyboardSubscription {
    pub(crate) fn new(hub: &KeyboardHub, ids: Vec<ListenerId>) -> Self {
        Self {
            registry: Rc::downgrade(&hub.registry),
            ids,
        }
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    /// True while the hub is alive and all owned listeners are registered.
    pub fn is_active(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let registry = registry.borrow();
                self.ids.iter().all(|id| registry.listeners.contains_key(id))
            }
            None => false,
        }
    }

    /// Explicitly end the subscription. Equivalent to dropping it.
    pub fn cancel(self) {}
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        for id in &self.ids {
            registry.listeners.remove(id);
        }
        tracing::debug!(count = self.ids.len(), "keyboard subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_matching_kind_only() {
        let hub = KeyboardHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        hub.add_listener(KeyEventKind::Press, move |k| s.borrow_mut().push(k));

        assert_eq!(hub.dispatch(KeyEvent::press(KeyCode::W)), 1);
        assert_eq!(hub.dispatch(KeyEvent::release(KeyCode::W)), 0);
        assert_eq!(*seen.borrow(), vec![KeyCode::W]);
    }

    #[test]
    fn remove_listener_stops_delivery() {
        let hub = KeyboardHub::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = hub.add_listener(KeyEventKind::Release, move |_| *c.borrow_mut() += 1);
        hub.dispatch(KeyEvent::release(KeyCode::A));
        assert!(hub.remove_listener(id));
        assert!(!hub.remove_listener(id));
        hub.dispatch(KeyEvent::release(KeyCode::A));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn subscription_drop_removes_listeners() {
        let hub = KeyboardHub::new();
        let a = hub.add_listener(KeyEventKind::Press, |_| {});
        let b = hub.add_listener(KeyEventKind::Release, |_| {});
        let sub = KeyboardSubscription::new(&hub, vec![a, b]);
        assert!(sub.is_active());
        assert_eq!(hub.listener_count(), 2);
        drop(sub);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = KeyboardHub::new();
        let id = hub.add_listener(KeyEventKind::Press, |_| {});
        let sub = KeyboardSubscription::new(&hub, vec![id]);
        drop(hub);
        assert!(!sub.is_active());
        sub.cancel();
    }

    #[test]
    fn handler_may_drop_subscription_during_dispatch() {
        let hub = KeyboardHub::new();
        let slot: Rc<RefCell<Option<KeyboardSubscription>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        let id = hub.add_listener(KeyEventKind::Press, move |_| {
            s.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(KeyboardSubscription::new(&hub, vec![id]));

        assert_eq!(hub.dispatch(KeyEvent::press(KeyCode::D)), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn listener_removed_mid_dispatch_does_not_run() {
        let hub = KeyboardHub::new();
        let slot: Rc<RefCell<Option<KeyboardSubscription>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        hub.add_listener(KeyEventKind::Press, move |_| {
            s.borrow_mut().take();
        });

        let ran = Rc::new(RefCell::new(0));
        let r = Rc::clone(&ran);
        let later = hub.add_listener(KeyEventKind::Press, move |_| *r.borrow_mut() += 1);
        *slot.borrow_mut() = Some(KeyboardSubscription::new(&hub, vec![later]));

        assert_eq!(hub.dispatch(KeyEvent::press(KeyCode::W)), 1);
        assert_eq!(*ran.borrow(), 0);
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let hub = KeyboardHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let o = Rc::clone(&order);
            hub.add_listener(KeyEventKind::Press, move |_| o.borrow_mut().push(n));
        }
        hub.dispatch(KeyEvent::press(KeyCode::S));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
