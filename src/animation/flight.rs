//! Camera flights: four tweens (eye, target, focus distance, focal length)
//! advanced in lock-step and written into the [`RenderState`].

use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

use super::tween::Tween;
use crate::scene::RenderState;
use crate::util::easing::EasingFunction;

/// A plain `{x, y, z}` triple as sent by overlay pages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Xyz {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Xyz {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Arguments of a `cameraFly` call.
///
/// Every field is optional on the wire. Missing fields fall back to the
/// origin for positions, `0.1` for both depth-of-field values, two seconds
/// and a quartic ease-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightConfig {
    /// Final camera eye.
    pub position: Xyz,
    /// Final look-at target.
    pub target: Xyz,
    /// Final depth-of-field focus distance.
    pub focus_distance: f32,
    /// Final depth-of-field focal length.
    pub focal_length: f32,
    /// Flight length in milliseconds. Negative values count as zero.
    pub time: f64,
    /// Curve shared by all four tweens.
    pub easing: EasingFunction,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            position: Xyz::default(),
            target: Xyz::default(),
            focus_distance: 0.1,
            focal_length: 0.1,
            time: 2000.0,
            easing: EasingFunction::DEFAULT,
        }
    }
}

impl FlightConfig {
    /// Flight length as a [`Duration`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.time.is_finite() && self.time > 0.0 {
            Duration::try_from_secs_f64(self.time / 1000.0)
                .unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// How a new flight interacts with flights already running.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
pub enum FlightPolicy {
    /// A new flight cancels every running flight.
    #[default]
    Supersede,
    /// Flights run independently; each frame the most recently started
    /// flight writes last and wins.
    Overlap,
}

/// Identifies a started flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightId(u64);

/// One running flight.
#[derive(Debug, Clone, Copy)]
pub struct CameraFlight {
    id: FlightId,
    position: Tween<Vec3>,
    target: Tween<Vec3>,
    focus_distance: Tween<f32>,
    focal_length: Tween<f32>,
}

impl CameraFlight {
    fn start(
        id: FlightId,
        config: &FlightConfig,
        state: &RenderState,
        now: Instant,
    ) -> Self {
        let duration = config.duration();
        let easing = config.easing;
        let camera = state.camera();
        let post = state.post();
        Self {
            id,
            position: Tween::new(
                camera.eye,
                config.position.into(),
                now,
                duration,
                easing,
            ),
            target: Tween::new(
                camera.target,
                config.target.into(),
                now,
                duration,
                easing,
            ),
            focus_distance: Tween::new(
                post.focus_distance,
                config.focus_distance,
                now,
                duration,
                easing,
            ),
            focal_length: Tween::new(
                post.focal_length,
                config.focal_length,
                now,
                duration,
                easing,
            ),
        }
    }

    /// This flight's id.
    #[must_use]
    pub fn id(&self) -> FlightId {
        self.id
    }

    /// Write all four sampled values. Returns `true` once finished.
    fn apply(&self, state: &mut RenderState, now: Instant) -> bool {
        state.set_camera_position(self.position.sample(now));
        state.set_look_at(self.target.sample(now));
        state.set_focus_distance(self.focus_distance.sample(now));
        state.set_focal_length(self.focal_length.sample(now));
        // All four share start, duration and easing.
        self.position.is_finished(now)
    }
}

/// Owns the running flights and advances them once per frame.
#[derive(Debug, Clone, Default)]
pub struct FlightController {
    flights: Vec<CameraFlight>,
    policy: FlightPolicy,
    next_id: u64,
}

impl FlightController {
    /// Controller with the given overlap policy.
    #[must_use]
    pub fn new(policy: FlightPolicy) -> Self {
        Self {
            flights: Vec::new(),
            policy,
            next_id: 0,
        }
    }

    /// Current overlap policy.
    #[must_use]
    pub fn policy(&self) -> FlightPolicy {
        self.policy
    }

    /// Change the overlap policy; running flights are kept.
    pub fn set_policy(&mut self, policy: FlightPolicy) {
        self.policy = policy;
    }

    /// Start a flight from the current state toward `config`.
    ///
    /// The start values are written immediately (marking the state dirty),
    /// so a zero-length flight has fully landed when this returns.
    pub fn fly(
        &mut self,
        config: &FlightConfig,
        state: &mut RenderState,
        now: Instant,
    ) -> FlightId {
        let id = FlightId(self.next_id);
        self.next_id += 1;

        if self.policy == FlightPolicy::Supersede && !self.flights.is_empty() {
            log::debug!(
                "flight {} supersedes {} running",
                id.0,
                self.flights.len()
            );
            self.flights.clear();
        }

        let flight = CameraFlight::start(id, config, state, now);
        if flight.apply(state, now) {
            log::debug!("flight {} landed immediately", id.0);
        } else {
            log::debug!(
                "flight {} started ({:?}, {:?})",
                id.0,
                config.duration(),
                config.easing
            );
            self.flights.push(flight);
        }
        id
    }

    /// Advance every running flight in start order, so the newest one
    /// writes last. Finished flights write their end values and are
    /// dropped. Returns `true` if anything was written.
    pub fn update(&mut self, now: Instant, state: &mut RenderState) -> bool {
        if self.flights.is_empty() {
            return false;
        }
        self.flights.retain(|flight| !flight.apply(state, now));
        true
    }

    /// Stop every running flight where it is.
    pub fn cancel_flights(&mut self) {
        if !self.flights.is_empty() {
            log::debug!("cancelled {} flight(s)", self.flights.len());
        }
        self.flights.clear();
    }

    /// Whether any flight is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.flights.is_empty()
    }

    /// Whether a specific flight is still running.
    #[must_use]
    pub fn is_running(&self, id: FlightId) -> bool {
        self.flights.iter().any(|f| f.id == id)
    }

    /// Number of running flights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Whether no flight is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn state() -> RenderState {
        RenderState::from_options(&Options::default(), (800, 600))
    }

    fn config(position: Vec3, time: f64) -> FlightConfig {
        FlightConfig {
            position: position.into(),
            target: Xyz {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            focus_distance: 0.4,
            focal_length: 0.02,
            time,
            easing: EasingFunction::Linear,
        }
    }

    #[test]
    fn zero_time_lands_immediately() {
        let mut state = state();
        let _ = state.take_repaint();
        let mut flights = FlightController::default();
        let now = Instant::now();
        let _ = flights.fly(&config(Vec3::new(5.0, 6.0, 7.0), 0.0), &mut state, now);

        assert!(!flights.is_active());
        assert!(state.needs_repaint());
        assert_eq!(state.camera().eye, Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(state.camera().target, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.post().focus_distance, 0.4);
        assert_eq!(state.post().focal_length, 0.02);
    }

    #[test]
    fn four_values_move_in_lock_step() {
        let mut state = state();
        let start_eye = state.camera().eye;
        let start_target = state.camera().target;
        let start_focus = state.post().focus_distance;
        let mut flights = FlightController::default();
        let now = Instant::now();
        let cfg = config(Vec3::ZERO, 1000.0);
        let _ = flights.fly(&cfg, &mut state, now);

        let _ = state.take_repaint();
        assert!(flights.update(now + Duration::from_millis(250), &mut state));
        assert!(state.needs_repaint());

        let t = 0.25;
        let eye = start_eye.lerp(Vec3::ZERO, t);
        let target = start_target.lerp(Vec3::new(1.0, 2.0, 3.0), t);
        let focus = start_focus + (0.4 - start_focus) * t;
        assert!(state.camera().eye.distance(eye) < 1e-3);
        assert!(state.camera().target.distance(target) < 1e-3);
        assert!((state.post().focus_distance - focus).abs() < 1e-4);

        assert!(flights.update(now + Duration::from_millis(1000), &mut state));
        assert!(!flights.is_active());
        assert_eq!(state.camera().eye, Vec3::ZERO);
        assert!(!flights.update(now + Duration::from_millis(1100), &mut state));
    }

    #[test]
    fn supersede_cancels_the_running_flight() {
        let mut state = state();
        let mut flights = FlightController::new(FlightPolicy::Supersede);
        let now = Instant::now();
        let first = flights.fly(&config(Vec3::X * 10.0, 1000.0), &mut state, now);
        let second = flights.fly(
            &config(Vec3::Y * 10.0, 1000.0),
            &mut state,
            now + Duration::from_millis(100),
        );
        assert!(!flights.is_running(first));
        assert!(flights.is_running(second));
        assert_eq!(flights.len(), 1);

        let _ = flights.update(now + Duration::from_secs(2), &mut state);
        assert_eq!(state.camera().eye, Vec3::Y * 10.0);
    }

    #[test]
    fn overlap_lets_the_newest_flight_win_each_frame() {
        let mut state = state();
        let mut flights = FlightController::new(FlightPolicy::Overlap);
        let now = Instant::now();
        let _ = flights.fly(&config(Vec3::X * 10.0, 2000.0), &mut state, now);
        let _ = flights.fly(
            &config(Vec3::Y * 10.0, 500.0),
            &mut state,
            now + Duration::from_millis(10),
        );
        assert_eq!(flights.len(), 2);

        // The shorter, newer flight has finished; the older one keeps going.
        let _ = flights.update(now + Duration::from_millis(600), &mut state);
        assert_eq!(flights.len(), 1);
        assert_eq!(state.camera().eye, Vec3::Y * 10.0);

        let _ = flights.update(now + Duration::from_millis(2000), &mut state);
        assert_eq!(state.camera().eye, Vec3::X * 10.0);
        assert!(flights.is_empty());
    }

    #[test]
    fn cancel_leaves_values_in_place() {
        let mut state = state();
        let mut flights = FlightController::default();
        let now = Instant::now();
        let _ = flights.fly(&config(Vec3::ZERO, 1000.0), &mut state, now);
        let _ = flights.update(now + Duration::from_millis(500), &mut state);
        let mid = state.camera().eye;
        flights.cancel_flights();
        assert!(!flights.update(now + Duration::from_millis(900), &mut state));
        assert_eq!(state.camera().eye, mid);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: FlightConfig =
            serde_json::from_str(r#"{"position":{"x":3},"time":750}"#).unwrap();
        assert_eq!(cfg.position, Xyz { x: 3.0, y: 0.0, z: 0.0 });
        assert_eq!(cfg.target, Xyz::default());
        assert_eq!(cfg.focus_distance, 0.1);
        assert_eq!(cfg.focal_length, 0.1);
        assert_eq!(cfg.duration(), Duration::from_millis(750));
        assert_eq!(cfg.easing, EasingFunction::QuarticOut);

        let empty: FlightConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FlightConfig::default());
        assert_eq!(empty.duration(), Duration::from_secs(2));
    }

    #[test]
    fn camel_case_keys_and_named_easing() {
        let cfg: FlightConfig = serde_json::from_str(
            r#"{"focusDistance":0.3,"focalLength":0.05,"easing":"CubicInOut"}"#,
        )
        .unwrap();
        assert_eq!(cfg.focus_distance, 0.3);
        assert_eq!(cfg.focal_length, 0.05);
        assert_eq!(cfg.easing, EasingFunction::CubicInOut);
    }

    #[test]
    fn negative_time_counts_as_zero() {
        let cfg = FlightConfig {
            time: -5.0,
            ..FlightConfig::default()
        };
        assert_eq!(cfg.duration(), Duration::ZERO);
    }
}
