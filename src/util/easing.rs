//! Easing functions for tween interpolation.
//!
//! The named curves follow the classic Penner set (the same names the
//! overlay pages use through `TWEEN.Easing.<Family>.<Mode>`), so a flight
//! authored against a JavaScript tweening library keeps its timing feel.

use std::f32::consts::PI;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Easing function variants for animation curves.
///
/// `Elastic` and `Back` curves overshoot: their output leaves `[0, 1]`
/// mid-animation but always lands on exactly `0.0` and `1.0` at the ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// `t²`.
    QuadraticIn,
    /// Mirror of `QuadraticIn`.
    QuadraticOut,
    /// `QuadraticIn` then `QuadraticOut`.
    QuadraticInOut,
    /// `t³`.
    CubicIn,
    /// Mirror of `CubicIn`.
    CubicOut,
    /// `CubicIn` then `CubicOut`.
    CubicInOut,
    /// `t⁴`.
    QuarticIn,
    /// Mirror of `QuarticIn`; the default flight curve.
    QuarticOut,
    /// `QuarticIn` then `QuarticOut`.
    QuarticInOut,
    /// `t⁵`.
    QuinticIn,
    /// Mirror of `QuinticIn`.
    QuinticOut,
    /// `QuinticIn` then `QuinticOut`.
    QuinticInOut,
    /// Quarter cosine wave.
    SinusoidalIn,
    /// Quarter sine wave.
    SinusoidalOut,
    /// Half cosine wave.
    SinusoidalInOut,
    /// `2^(10(t-1))`.
    ExponentialIn,
    /// Mirror of `ExponentialIn`.
    ExponentialOut,
    /// `ExponentialIn` then `ExponentialOut`.
    ExponentialInOut,
    /// Quarter circle.
    CircularIn,
    /// Mirror of `CircularIn`.
    CircularOut,
    /// `CircularIn` then `CircularOut`.
    CircularInOut,
    /// Decaying sine wound up before the start.
    ElasticIn,
    /// Decaying sine ringing after the end.
    ElasticOut,
    /// `ElasticIn` then `ElasticOut`.
    ElasticInOut,
    /// Pulls back before moving forward.
    BackIn,
    /// Overshoots the end then settles.
    BackOut,
    /// `BackIn` then `BackOut`.
    BackInOut,
    /// Mirror of `BounceOut`.
    BounceIn,
    /// Bounces against the end value.
    BounceOut,
    /// `BounceIn` then `BounceOut`.
    BounceInOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control point.
        c1: f32,
        /// Second control point.
        c2: f32,
    },
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl EasingFunction {
    /// Default easing function for camera flights.
    pub const DEFAULT: EasingFunction = EasingFunction::QuarticOut;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => t * (2.0 - t),
            Self::QuadraticInOut => in_out(t, |k| k * k),
            Self::CubicIn => t.powi(3),
            Self::CubicOut => out(t, |k| k.powi(3)),
            Self::CubicInOut => in_out(t, |k| k.powi(3)),
            Self::QuarticIn => t.powi(4),
            Self::QuarticOut => out(t, |k| k.powi(4)),
            Self::QuarticInOut => in_out(t, |k| k.powi(4)),
            Self::QuinticIn => t.powi(5),
            Self::QuinticOut => out(t, |k| k.powi(5)),
            Self::QuinticInOut => in_out(t, |k| k.powi(5)),
            Self::SinusoidalIn => sinusoidal_in(t),
            Self::SinusoidalOut => out(t, sinusoidal_in),
            Self::SinusoidalInOut => 0.5 * (1.0 - (PI * t).cos()),
            Self::ExponentialIn => exponential_in(t),
            Self::ExponentialOut => out(t, exponential_in),
            Self::ExponentialInOut => in_out(t, exponential_in),
            Self::CircularIn => circular_in(t),
            Self::CircularOut => out(t, circular_in),
            Self::CircularInOut => in_out(t, circular_in),
            Self::ElasticIn => elastic_in(t),
            Self::ElasticOut => out(t, elastic_in),
            Self::ElasticInOut => in_out(t, elastic_in),
            Self::BackIn => back_in(t, BACK_OVERSHOOT),
            Self::BackOut => out(t, |k| back_in(k, BACK_OVERSHOOT)),
            Self::BackInOut => {
                in_out(t, |k| back_in(k, BACK_OVERSHOOT * 1.525))
            }
            Self::BounceIn => out(t, bounce_out),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => out_in(t, bounce_out),
            Self::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mirror an "in" curve into its "out" counterpart (and vice versa).
#[inline]
fn out(t: f32, f: impl Fn(f32) -> f32) -> f32 {
    1.0 - f(1.0 - t)
}

/// First half runs `f` on `[0, 1]`, second half runs its mirror.
#[inline]
fn in_out(t: f32, f: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        0.5 * f(2.0 * t)
    } else {
        1.0 - 0.5 * f(2.0 - 2.0 * t)
    }
}

/// Same split as [`in_out`] for a curve given in its "out" form.
#[inline]
fn out_in(t: f32, f_out: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        0.5 * (1.0 - f_out(1.0 - 2.0 * t))
    } else {
        0.5 * f_out(2.0 * t - 1.0) + 0.5
    }
}

fn sinusoidal_in(t: f32) -> f32 {
    1.0 - (t * PI * 0.5).cos()
}

fn exponential_in(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        1024.0_f32.powf(t - 1.0)
    }
}

fn circular_in(t: f32) -> f32 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn elastic_in(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    -(2.0_f32.powf(10.0 * (t - 1.0))) * ((t - 1.1) * 5.0 * PI).sin()
}

fn back_in(t: f32, s: f32) -> f32 {
    t * t * ((s + 1.0) * t - s)
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let k = t - 1.5 / D;
        N * k * k + 0.75
    } else if t < 2.5 / D {
        let k = t - 2.25 / D;
        N * k * k + 0.9375
    } else {
        let k = t - 2.625 / D;
        N * k * k + 0.984_375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMED: [EasingFunction; 31] = [
        EasingFunction::Linear,
        EasingFunction::QuadraticIn,
        EasingFunction::QuadraticOut,
        EasingFunction::QuadraticInOut,
        EasingFunction::CubicIn,
        EasingFunction::CubicOut,
        EasingFunction::CubicInOut,
        EasingFunction::QuarticIn,
        EasingFunction::QuarticOut,
        EasingFunction::QuarticInOut,
        EasingFunction::QuinticIn,
        EasingFunction::QuinticOut,
        EasingFunction::QuinticInOut,
        EasingFunction::SinusoidalIn,
        EasingFunction::SinusoidalOut,
        EasingFunction::SinusoidalInOut,
        EasingFunction::ExponentialIn,
        EasingFunction::ExponentialOut,
        EasingFunction::ExponentialInOut,
        EasingFunction::CircularIn,
        EasingFunction::CircularOut,
        EasingFunction::CircularInOut,
        EasingFunction::ElasticIn,
        EasingFunction::ElasticOut,
        EasingFunction::ElasticInOut,
        EasingFunction::BackIn,
        EasingFunction::BackOut,
        EasingFunction::BackInOut,
        EasingFunction::BounceIn,
        EasingFunction::BounceOut,
        EasingFunction::BounceInOut,
    ];

    #[test]
    fn test_every_curve_hits_both_endpoints() {
        for easing in NAMED {
            assert!(
                easing.evaluate(0.0).abs() < 1e-3,
                "{easing:?} at 0 = {}",
                easing.evaluate(0.0)
            );
            assert!(
                (easing.evaluate(1.0) - 1.0).abs() < 1e-3,
                "{easing:?} at 1 = {}",
                easing.evaluate(1.0)
            );
        }
    }

    #[test]
    fn test_in_out_curves_pass_through_midpoint() {
        for easing in [
            EasingFunction::QuadraticInOut,
            EasingFunction::CubicInOut,
            EasingFunction::QuarticInOut,
            EasingFunction::SinusoidalInOut,
            EasingFunction::CircularInOut,
            EasingFunction::BounceInOut,
        ] {
            assert!((easing.evaluate(0.5) - 0.5).abs() < 1e-3, "{easing:?}");
        }
    }

    #[test]
    fn test_quartic_out_matches_closed_form() {
        let quartic = EasingFunction::QuarticOut;
        // 1 - (1 - t)^4
        assert!((quartic.evaluate(0.5) - 0.9375).abs() < 1e-6);
        assert!((quartic.evaluate(0.25) - 0.683_593_75).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_out() {
        let quad_out = EasingFunction::QuadraticOut;
        assert_eq!(quad_out.evaluate(0.0), 0.0);
        assert_eq!(quad_out.evaluate(0.5), 0.75);
        assert_eq!(quad_out.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| EasingFunction::BackOut.evaluate(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.05, "BackOut should overshoot, peak = {peak}");
    }

    #[test]
    fn test_input_clamping() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(-0.5), 0.0);
        assert_eq!(linear.evaluate(1.5), 1.0);

        let hermite = EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 };
        assert_eq!(hermite.evaluate(-0.5), 0.0);
        assert!((hermite.evaluate(1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_is_quartic_out() {
        assert_eq!(EasingFunction::default(), EasingFunction::QuarticOut);
    }

    #[test]
    fn test_names_parse_from_json() {
        let easing: EasingFunction =
            serde_json::from_str("\"SinusoidalInOut\"").unwrap();
        assert_eq!(easing, EasingFunction::SinusoidalInOut);
        let hermite: EasingFunction =
            serde_json::from_str(r#"{"CubicHermite":{"c1":0.33,"c2":1.0}}"#)
                .unwrap();
        assert_eq!(hermite, EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 });
    }
}
