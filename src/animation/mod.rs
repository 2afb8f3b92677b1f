//! Timed interpolation: generic tweens and the camera flight controller.

pub mod flight;
pub mod tween;

pub use flight::{
    CameraFlight, FlightConfig, FlightController, FlightId, FlightPolicy, Xyz,
};
pub use tween::{Lerp, Tween};
