//! Pointer-driven orbit controls.
//!
//! Rotate with the left button, pan with the right button or shift-drag,
//! dolly with the wheel or the middle button. The eye is clamped between
//! the configured distances on every update, enabled or not.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::input::{InputEvent, MouseButton};
use crate::options::ControlsOptions;
use crate::scene::RenderState;

/// Squared eye movement below which an update is not a change.
const CHANGE_EPS: f32 = 1e-6;
/// Keeps the polar angle off the poles so `look_at` stays defined.
const POLE_EPS: f32 = 1e-6;
/// Dolly factor per scroll notch at `zoom_speed = 1`.
const ZOOM_BASE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
    Dolly,
}

/// Orbit controls: drag to rotate around the target, shift/right drag to
/// pan, scroll to dolly.
///
/// Input only accumulates pending motion; [`update`](Self::update) (called
/// once per frame) applies it to the camera in the [`RenderState`] and
/// reports whether the camera moved. When [`enabled`](Self::enabled) is
/// false input is ignored, but `update` still runs so damping settles and
/// distance limits keep applying.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Whether pointer input moves the camera.
    pub enabled: bool,
    /// Closest allowed eye-to-target distance.
    pub min_distance: f32,
    /// Farthest allowed eye-to-target distance.
    pub max_distance: f32,
    /// Rotation sensitivity multiplier.
    pub rotate_speed: f32,
    /// Dolly sensitivity multiplier.
    pub zoom_speed: f32,
    /// Pan sensitivity multiplier.
    pub pan_speed: f32,
    /// Decay pending motion instead of applying it in one update.
    pub enable_damping: bool,
    /// Fraction of pending motion applied per update when damping.
    pub damping_factor: f32,

    /// Pending (azimuth, polar) rotation in radians.
    spherical_delta: Vec2,
    /// Pending dolly factor.
    scale: f32,
    /// Pending screen-space pan in pixels.
    pan_pixels: Vec2,
    /// Carried world-space pan while damping.
    pan_offset: Vec3,

    drag: Option<Drag>,
    shift: bool,
    last_cursor: Option<Vec2>,
    viewport_height: f32,
}

impl OrbitControls {
    /// Build controls from options.
    #[must_use]
    pub fn new(options: &ControlsOptions) -> Self {
        Self {
            enabled: options.enabled,
            min_distance: options.min_distance,
            max_distance: options.max_distance,
            rotate_speed: options.rotate_speed,
            zoom_speed: options.zoom_speed,
            pan_speed: options.pan_speed,
            enable_damping: options.enable_damping,
            damping_factor: options.damping_factor,
            spherical_delta: Vec2::ZERO,
            scale: 1.0,
            pan_pixels: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            drag: None,
            shift: false,
            last_cursor: None,
            viewport_height: 1.0,
        }
    }

    /// Flip [`enabled`](Self::enabled); returns the new value.
    ///
    /// Disabling drops any drag in progress.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.drag = None;
        }
        self.enabled
    }

    /// Track the viewport height that pixel deltas are measured against.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Feed one input event. Returns `true` if the controls consumed it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if let InputEvent::ModifiersChanged { shift } = event {
            self.shift = shift;
            return false;
        }
        if let InputEvent::CursorMoved { x, y } = event {
            let cursor = Vec2::new(x, y);
            let delta = self
                .last_cursor
                .map_or(Vec2::ZERO, |last| cursor - last);
            self.last_cursor = Some(cursor);
            if !self.enabled {
                return false;
            }
            return match self.drag {
                Some(Drag::Rotate) => {
                    self.rotate(delta);
                    true
                }
                Some(Drag::Pan) => {
                    self.pan(delta);
                    true
                }
                Some(Drag::Dolly) => {
                    self.dolly(-delta.y * 0.05);
                    true
                }
                None => false,
            };
        }
        if !self.enabled {
            return false;
        }
        match event {
            InputEvent::MouseButton { button, pressed } => {
                self.drag = pressed.then(|| match button {
                    MouseButton::Left if self.shift => Drag::Pan,
                    MouseButton::Left => Drag::Rotate,
                    MouseButton::Right => Drag::Pan,
                    MouseButton::Middle => Drag::Dolly,
                });
                true
            }
            InputEvent::Scroll { delta } => {
                self.dolly(delta);
                true
            }
            InputEvent::CursorMoved { .. }
            | InputEvent::ModifiersChanged { .. } => false,
        }
    }

    /// Queue a rotation from a pointer delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        let per_pixel = TAU / self.viewport_height * self.rotate_speed;
        self.spherical_delta -= delta * per_pixel;
    }

    /// Queue a pan from a pointer delta in pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.pan_pixels += delta * self.pan_speed;
    }

    /// Queue a dolly; positive moves toward the target.
    pub fn dolly(&mut self, notches: f32) {
        self.scale *= ZOOM_BASE.powf(self.zoom_speed * notches);
    }

    /// Whether any motion is waiting to be applied.
    #[must_use]
    pub fn has_pending_motion(&self) -> bool {
        self.spherical_delta.length_squared() > 0.0
            || self.scale != 1.0
            || self.pan_pixels != Vec2::ZERO
            || self.pan_offset.length_squared() > CHANGE_EPS
    }

    /// Apply pending motion and distance limits to the camera.
    ///
    /// Returns `true` (and raises the repaint flag through the state's
    /// setters) only if the eye or target actually moved.
    pub fn update(&mut self, state: &mut RenderState) -> bool {
        let camera = *state.camera();
        let offset = camera.eye - camera.target;
        let radius = offset.length();
        let clamped = radius.clamp(self.min_distance, self.max_distance);

        if !self.has_pending_motion() && (clamped - radius).abs() <= 1e-5 {
            return false;
        }

        // Spherical coordinates around +Y.
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI * 0.5
        };

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.spherical_delta.x * step;
        phi += self.spherical_delta.y * step;
        phi = phi.clamp(POLE_EPS, PI - POLE_EPS);
        let radius =
            (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.pan_offset += self.pan_world(&camera, radius);
        let target = camera.target + self.pan_offset * step;

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let eye = target + new_offset;

        if self.enable_damping {
            self.spherical_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        self.pan_pixels = Vec2::ZERO;

        let moved = eye.distance_squared(camera.eye) > CHANGE_EPS
            || target.distance_squared(camera.target) > 0.0;
        if moved {
            state.set_camera_position(eye);
            state.set_look_at(target);
        }
        moved
    }

    /// Convert pending pixel pan into a world-space offset in the camera
    /// plane, scaled so the point under the cursor tracks the pointer.
    fn pan_world(&self, camera: &crate::camera::Camera, distance: f32) -> Vec3 {
        if self.pan_pixels == Vec2::ZERO {
            return Vec3::ZERO;
        }
        let forward = (camera.target - camera.eye).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(camera.up).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let half_fov = (camera.fovy.to_radians() * 0.5).tan();
        let world_per_pixel = 2.0 * distance * half_fov / self.viewport_height;
        (-right * self.pan_pixels.x + up * self.pan_pixels.y) * world_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn setup(enabled: bool) -> (OrbitControls, RenderState) {
        let mut options = Options::default();
        options.controls.enabled = enabled;
        let mut controls = OrbitControls::new(&options.controls);
        controls.set_viewport_height(900);
        (controls, RenderState::from_options(&options, (1600, 900)))
    }

    #[test]
    fn idle_update_is_not_a_change() {
        let (mut controls, mut state) = setup(true);
        assert!(!controls.update(&mut state));
        assert!(!state.needs_repaint());
    }

    #[test]
    fn disabled_controls_ignore_pointer_input() {
        let (mut controls, mut state) = setup(false);
        assert!(!controls.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        }));
        let _ = controls.handle_input(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        let _ =
            controls.handle_input(InputEvent::CursorMoved { x: 200.0, y: 0.0 });
        assert!(!controls.handle_input(InputEvent::Scroll { delta: 3.0 }));
        assert!(!controls.update(&mut state));
    }

    #[test]
    fn drag_rotates_around_target_at_constant_distance() {
        let (mut controls, mut state) = setup(true);
        let before = *state.camera();
        let _ = controls.handle_input(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        let _ = controls.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        assert!(controls
            .handle_input(InputEvent::CursorMoved { x: 110.0, y: 10.0 }));
        assert!(controls.update(&mut state));
        assert!(state.needs_repaint());

        let after = state.camera();
        assert_eq!(after.target, before.target);
        assert!((after.distance() - before.distance()).abs() < 1e-3);
        assert!(after.eye.distance(before.eye) > 1.0);
    }

    #[test]
    fn scroll_dollies_and_respects_limits() {
        let (mut controls, mut state) = setup(true);
        let start = state.camera().distance();
        let _ = controls.handle_input(InputEvent::Scroll { delta: 1.0 });
        assert!(controls.update(&mut state));
        assert!((state.camera().distance() - start * 0.95).abs() < 1e-2);

        let _ = controls.handle_input(InputEvent::Scroll { delta: 500.0 });
        let _ = controls.update(&mut state);
        assert!((state.camera().distance() - 2.0).abs() < 1e-3);

        let _ = controls.handle_input(InputEvent::Scroll { delta: -500.0 });
        let _ = controls.update(&mut state);
        assert!((state.camera().distance() - 500.0).abs() < 1e-2);
    }

    #[test]
    fn shift_drag_pans_target_and_eye_together() {
        let (mut controls, mut state) = setup(true);
        let before = *state.camera();
        let _ = controls.handle_input(InputEvent::ModifiersChanged { shift: true });
        let _ = controls.handle_input(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        let _ = controls.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        let _ = controls.handle_input(InputEvent::CursorMoved { x: 50.0, y: 0.0 });
        assert!(controls.update(&mut state));
        let after = state.camera();
        let target_shift = after.target - before.target;
        let eye_shift = after.eye - before.eye;
        assert!(target_shift.length() > 0.1);
        assert!((target_shift - eye_shift).length() < 1e-3);
    }

    #[test]
    fn external_move_inside_limits_is_left_alone() {
        let (mut controls, mut state) = setup(false);
        state.set_camera_position(Vec3::new(7.0, 40.0, 20.0));
        let _ = state.take_repaint();
        assert!(!controls.update(&mut state));
        assert_eq!(state.camera().eye, Vec3::new(7.0, 40.0, 20.0));
    }

    #[test]
    fn external_move_too_close_is_clamped() {
        let (mut controls, mut state) = setup(false);
        let target = state.camera().target;
        state.set_camera_position(target + Vec3::new(0.0, 0.0, 0.5));
        assert!(controls.update(&mut state));
        assert!((state.camera().distance() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let (mut controls, mut state) = setup(true);
        controls.enable_damping = true;
        controls.rotate(Vec2::new(100.0, 0.0));
        let start = state.camera().eye;
        assert!(controls.update(&mut state));
        let first = state.camera().eye.distance(start);
        assert!(controls.update(&mut state));
        assert!(controls.has_pending_motion());
        assert!(first > 0.0);
    }

    #[test]
    fn toggle_round_trips() {
        let (mut controls, _) = setup(false);
        assert!(controls.toggle());
        assert!(!controls.toggle());
        assert!(!controls.enabled);
    }
}
