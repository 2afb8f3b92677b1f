//! What the renderer draws and the state it draws it with.
//!
//! [`Scene`] holds the decoded assets; [`RenderState`] holds the camera,
//! post parameters and the repaint flag. Assets are shared behind `Arc` so
//! the renderer can upload them without copying.

pub mod render_state;

use std::sync::Arc;

pub use render_state::{PostParams, RenderState};

use crate::assets::{AssetPayload, BackgroundImage, EnvironmentMap, Model};

/// What fills the screen behind the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Solid linear RGB colour.
    Color([f32; 3]),
    /// Stretched image.
    Image(Arc<BackgroundImage>),
}

/// Scene content. Every change bumps [`revision`](Self::revision).
#[derive(Debug, Clone)]
pub struct Scene {
    background: Background,
    environment: Option<Arc<EnvironmentMap>>,
    model: Option<Arc<Model>>,
    revision: u64,
}

impl Scene {
    /// Empty scene over a solid colour.
    #[must_use]
    pub fn new(background_color: [f32; 3]) -> Self {
        Self {
            background: Background::Color(background_color),
            environment: None,
            model: None,
            revision: 0,
        }
    }

    /// Current backdrop.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Reflection/ambient environment, once loaded.
    #[must_use]
    pub fn environment(&self) -> Option<&Arc<EnvironmentMap>> {
        self.environment.as_ref()
    }

    /// The model, once loaded.
    #[must_use]
    pub fn model(&self) -> Option<&Arc<Model>> {
        self.model.as_ref()
    }

    /// Change counter; the GPU side re-uploads when it moves.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the backdrop.
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.revision += 1;
    }

    /// Replace the environment.
    pub fn set_environment(&mut self, environment: EnvironmentMap) {
        self.environment = Some(Arc::new(environment));
        self.revision += 1;
    }

    /// Attach the model.
    pub fn set_model(&mut self, model: Model) {
        self.model = Some(Arc::new(model));
        self.revision += 1;
    }

    /// Slot a decoded asset into the scene.
    pub fn apply(&mut self, payload: AssetPayload) {
        match payload {
            AssetPayload::Environment(env) => self.set_environment(env),
            AssetPayload::Background(image) => {
                self.set_background(Background::Image(Arc::new(image)));
            }
            AssetPayload::Model(model) => self.set_model(model),
        }
    }
}
