//! The mutable state the frame loop renders from.
//!
//! Every writer (resize, controls, flights, asset completion) goes through a
//! setter that also raises the repaint flag, so a change can never sit
//! invisible until some unrelated event happens to trigger a frame. Writes
//! are plain snapshot assignments: when two writers touch the same value in
//! one frame the later one wins.

use glam::Vec3;

use crate::camera::Camera;
use crate::options::Options;

/// Post-processing parameters read by the composer every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostParams {
    /// Hue/saturation pass strength in `[-1, 1]`.
    pub saturation: f32,
    /// Depth-of-field focus distance, normalized view depth.
    pub focus_distance: f32,
    /// Depth-of-field in-focus range, normalized view depth.
    pub focal_length: f32,
    /// Bokeh kernel scale.
    pub bokeh_scale: f32,
    /// Exposure multiplier.
    pub exposure: f32,
}

/// Camera, post parameters, viewport and the repaint flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    camera: Camera,
    post: PostParams,
    viewport: (u32, u32),
    needs_repaint: bool,
}

impl RenderState {
    /// Build the startup state from options and the initial viewport.
    #[must_use]
    pub fn from_options(options: &Options, viewport: (u32, u32)) -> Self {
        let cam = &options.camera;
        let pp = &options.post_processing;
        let (width, height) = clamp_viewport(viewport);
        Self {
            camera: Camera {
                eye: Vec3::from_array(cam.position),
                target: Vec3::from_array(cam.target),
                up: Vec3::Y,
                aspect: width as f32 / height as f32,
                fovy: cam.fovy,
                znear: cam.znear,
                zfar: cam.zfar,
            },
            post: PostParams {
                saturation: pp.saturation,
                focus_distance: pp.focus_distance,
                focal_length: pp.focal_length,
                bokeh_scale: pp.bokeh_scale,
                exposure: pp.exposure,
            },
            viewport: (width, height),
            needs_repaint: false,
        }
    }

    /// Current camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current post-processing parameters.
    #[must_use]
    pub fn post(&self) -> &PostParams {
        &self.post
    }

    /// Render target size in physical pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Whether something changed since the last render.
    #[must_use]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Raise the repaint flag.
    pub fn request_repaint(&mut self) {
        self.needs_repaint = true;
    }

    /// Clear the repaint flag, returning whether it was set.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    /// Move the camera eye.
    pub fn set_camera_position(&mut self, eye: Vec3) {
        self.camera.eye = eye;
        self.needs_repaint = true;
    }

    /// Move the look-at target.
    pub fn set_look_at(&mut self, target: Vec3) {
        self.camera.target = target;
        self.needs_repaint = true;
    }

    /// Set the depth-of-field focus distance.
    pub fn set_focus_distance(&mut self, value: f32) {
        self.post.focus_distance = value;
        self.needs_repaint = true;
    }

    /// Set the depth-of-field focal length.
    pub fn set_focal_length(&mut self, value: f32) {
        self.post.focal_length = value;
        self.needs_repaint = true;
    }

    /// Replace every post parameter at once (options reload).
    pub fn set_post(&mut self, post: PostParams) {
        self.post = post;
        self.needs_repaint = true;
    }

    /// Adopt a new container size: aspect ratio and render target follow.
    ///
    /// Idempotent. Zero dimensions are clamped to one pixel so the aspect
    /// ratio stays finite.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = clamp_viewport((width, height));
        self.viewport = (width, height);
        self.camera.aspect = width as f32 / height as f32;
        self.needs_repaint = true;
    }
}

fn clamp_viewport((width, height): (u32, u32)) -> (u32, u32) {
    (width.max(1), height.max(1))
}
