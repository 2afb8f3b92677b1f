//! Frame clock and paint counters.

use web_time::{Duration, Instant};

/// Per-frame clock for the render loop.
///
/// Hands out one timestamp per frame so every subsystem ticked in that frame
/// (flights, controls, page timers) sees the same "now", and keeps a smoothed
/// FPS figure for diagnostics.
pub struct FrameTiming {
    /// Timestamp of the current frame.
    now: Instant,
    /// Time between the previous frame and the current one.
    delta: Duration,
    /// Smoothed FPS using exponential moving average.
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0).
    smoothing: f32,
    /// Frames actually painted (dirty frames) since startup.
    painted: u64,
    /// Frames ticked since startup.
    ticked: u64,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Start the clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start the clock at a given instant.
    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            now,
            delta: Duration::ZERO,
            smoothed_fps: 60.0,
            smoothing: 0.05,
            painted: 0,
            ticked: 0,
        }
    }

    /// Advance to `now`; returns the elapsed time since the previous tick.
    pub fn tick(&mut self, now: Instant) -> Duration {
        self.delta = now.saturating_duration_since(self.now);
        self.now = now;
        self.ticked += 1;

        let frame_time = self.delta.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        self.delta
    }

    /// Record that the current frame executed a render pass.
    pub fn mark_painted(&mut self) {
        self.painted += 1;
    }

    /// Timestamp of the current frame.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Time between the previous frame and the current one.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get the current FPS (smoothed).
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Number of frames that executed a render pass.
    #[must_use]
    pub fn painted_frames(&self) -> u64 {
        self.painted
    }

    /// Number of frames ticked.
    #[must_use]
    pub fn ticked_frames(&self) -> u64 {
        self.ticked
    }
}
