//! Input Controller: keyboard events mapped to four directional flags.
//!
//! # Invariants
//! - Each flag is set by a press and cleared by a release of any key in its
//!   group; flags never influence each other.
//! - Listeners registered through a [`KeyboardSubscription`] never outlive it.
//! - Everything here is single-threaded (`Rc`/`RefCell`), like the host event loop.

mod controller;
mod event;
mod hub;
mod key;
mod state;

pub use controller::InputController;
pub use event::{KeyEvent, KeyEventKind};
pub use hub::{KeyboardHub, KeyboardSubscription, ListenerId};
pub use key::{Direction, KeyCode};
pub use state::DirectionalInput;

pub fn crate_info() -> &'static str {
    concat!("boxstage-input v", env!("CARGO_PKG_VERSION"))
}
