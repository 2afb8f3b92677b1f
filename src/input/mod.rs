//! Platform-agnostic input events and key actions.

/// Input event, mouse button and key action types.
pub mod event;

pub use event::{InputEvent, KeyAction, MouseButton};
