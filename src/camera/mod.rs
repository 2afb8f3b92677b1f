//! Camera model and pointer-driven orbit controls.

/// Orbit controls: rotate, dolly and pan around a look-at target.
pub mod controls;
/// Core camera struct and GPU uniform type.
pub mod core;

pub use self::controls::OrbitControls;
pub use self::core::{Camera, CameraUniform};
