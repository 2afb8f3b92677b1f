//! A single eased interpolation between two values.

use glam::Vec3;
use web_time::{Duration, Instant};

use crate::util::easing::EasingFunction;

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    /// Linear interpolation; `t` may leave `[0, 1]` for overshooting curves.
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec3::lerp(self, to, t)
    }
}

/// Interpolates `from` to `to` over `duration` starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    /// Value at progress 0.
    pub from: T,
    /// Value at progress 1.
    pub to: T,
    start: Instant,
    duration: Duration,
    easing: EasingFunction,
}

impl<T: Lerp> Tween<T> {
    /// Start a tween at `start`.
    #[must_use]
    pub fn new(
        from: T,
        to: T,
        start: Instant,
        duration: Duration,
        easing: EasingFunction,
    ) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    /// Normalized elapsed time in `[0, 1]`. Zero-length tweens are always
    /// complete.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Eased value at `now`. Lands exactly on `to` once complete.
    #[must_use]
    pub fn sample(&self, now: Instant) -> T {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.evaluate(t))
    }

    /// Whether the tween has reached its end value.
    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Tween length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tween_samples_midpoint() {
        let start = Instant::now();
        let tween = Tween::new(
            0.0_f32,
            10.0,
            start,
            Duration::from_millis(1000),
            EasingFunction::Linear,
        );
        assert_eq!(tween.sample(start), 0.0);
        assert!((tween.sample(start + Duration::from_millis(500)) - 5.0).abs() < 1e-4);
        assert_eq!(tween.sample(start + Duration::from_secs(5)), 10.0);
    }

    #[test]
    fn zero_duration_is_complete_immediately() {
        let start = Instant::now();
        let tween = Tween::new(
            Vec3::ZERO,
            Vec3::ONE,
            start,
            Duration::ZERO,
            EasingFunction::QuarticOut,
        );
        assert!(tween.is_finished(start));
        assert_eq!(tween.sample(start), Vec3::ONE);
    }

    #[test]
    fn samples_before_start_hold_the_origin() {
        let now = Instant::now();
        let tween = Tween::new(
            1.0_f32,
            2.0,
            now + Duration::from_secs(1),
            Duration::from_secs(1),
            EasingFunction::Linear,
        );
        assert_eq!(tween.sample(now), 1.0);
    }

    #[test]
    fn easing_shapes_the_curve() {
        let start = Instant::now();
        let tween = Tween::new(
            0.0_f32,
            1.0,
            start,
            Duration::from_millis(1000),
            EasingFunction::QuarticOut,
        );
        let half = tween.sample(start + Duration::from_millis(500));
        assert!((half - 0.9375).abs() < 1e-3);
    }
}
