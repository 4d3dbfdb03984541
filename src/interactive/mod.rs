//! Keyboard-driven live view over a stats file.

pub mod session;
pub mod state;

pub use session::Session;
pub use state::{InteractiveState, Key, LimitTarget, Transition};
