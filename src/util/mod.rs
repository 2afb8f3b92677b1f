//! Shared utilities: easing curves and the per-frame clock.

pub mod easing;
pub mod frame_timing;
