//! Native-side GUI layer: a transparent wry webview hosting the page
//! overlay.
//!
//! The webview is created as a child of the winit window. Page calls reach
//! the engine through a JSON IPC bridge and DOM writes go back through
//! `evaluate_script`.

/// Wry webview creation, IPC parsing, and the DOM surface.
pub mod webview;
