//! Startup asset chain.
//!
//! The environment is requested first. When it finishes (loaded or not) the
//! background and the model are requested together, and the first time the
//! model lands the initial page is loaded.

use std::path::PathBuf;

use crate::assets::AssetKind;
use crate::options::{PageOptions, SceneOptions};

/// One asset the host should hand to the asset worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLoad {
    /// Scene slot.
    pub kind: AssetKind,
    /// Resolved path.
    pub path: PathBuf,
}

/// What the chain wants done after an asset finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapStep {
    /// Loads to dispatch.
    pub loads: Vec<AssetLoad>,
    /// Page to load, once the model is in.
    pub initial_page: Option<String>,
}

/// Tracks where the startup chain is.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    environment: PathBuf,
    background: PathBuf,
    model: PathBuf,
    initial_page: String,
    started: bool,
    followups_issued: bool,
    page_issued: bool,
}

impl Bootstrap {
    /// Chain over the asset paths in `scene`, ending in
    /// `pages.initial_page`.
    #[must_use]
    pub fn new(scene: &SceneOptions, pages: &PageOptions) -> Self {
        Self {
            environment: scene.resolve(&scene.environment),
            background: scene.resolve(&scene.background),
            model: scene.resolve(&scene.model),
            initial_page: pages.initial_page.clone(),
            started: false,
            followups_issued: false,
            page_issued: false,
        }
    }

    /// First request of the chain. Only the first call returns anything.
    pub fn start(&mut self) -> Vec<AssetLoad> {
        if self.started {
            return Vec::new();
        }
        self.started = true;
        vec![AssetLoad {
            kind: AssetKind::Environment,
            path: self.environment.clone(),
        }]
    }

    /// Whether [`start`](Self::start) has run.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the initial page has been handed out.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.page_issued
    }

    /// Advance the chain after `kind` finished.
    pub fn on_loaded(&mut self, kind: AssetKind, succeeded: bool) -> BootstrapStep {
        let mut step = BootstrapStep::default();
        match kind {
            AssetKind::Environment if !self.followups_issued => {
                self.followups_issued = true;
                step.loads = vec![
                    AssetLoad {
                        kind: AssetKind::Background,
                        path: self.background.clone(),
                    },
                    AssetLoad {
                        kind: AssetKind::Model,
                        path: self.model.clone(),
                    },
                ];
            }
            AssetKind::Model if succeeded && !self.page_issued => {
                self.page_issued = true;
                step.initial_page = Some(self.initial_page.clone());
            }
            _ => {}
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrap() -> Bootstrap {
        let scene = SceneOptions {
            asset_root: PathBuf::from("site"),
            ..SceneOptions::default()
        };
        Bootstrap::new(&scene, &PageOptions::default())
    }

    #[test]
    fn environment_comes_first_and_only_once() {
        let mut b = bootstrap();
        let first = b.start();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, AssetKind::Environment);
        assert!(first[0].path.starts_with("site"));
        assert!(b.start().is_empty());
    }

    #[test]
    fn environment_result_requests_background_and_model() {
        let mut b = bootstrap();
        let _ = b.start();
        let step = b.on_loaded(AssetKind::Environment, true);
        let kinds: Vec<_> = step.loads.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![AssetKind::Background, AssetKind::Model]);
        assert_eq!(step.initial_page, None);
    }

    #[test]
    fn failed_environment_still_loads_the_model() {
        let mut b = bootstrap();
        let _ = b.start();
        let step = b.on_loaded(AssetKind::Environment, false);
        assert!(step.loads.iter().any(|l| l.kind == AssetKind::Model));
    }

    #[test]
    fn model_success_triggers_initial_page_once() {
        let mut b = bootstrap();
        let _ = b.start();
        let _ = b.on_loaded(AssetKind::Environment, true);
        assert_eq!(b.on_loaded(AssetKind::Background, true), BootstrapStep::default());

        let step = b.on_loaded(AssetKind::Model, true);
        assert_eq!(step.initial_page.as_deref(), Some("page1.html"));
        assert!(b.is_complete());
        assert_eq!(b.on_loaded(AssetKind::Model, true).initial_page, None);
    }

    #[test]
    fn failed_model_loads_no_page() {
        let mut b = bootstrap();
        let _ = b.start();
        let _ = b.on_loaded(AssetKind::Environment, true);
        assert_eq!(b.on_loaded(AssetKind::Model, false).initial_page, None);
        assert!(!b.is_complete());
    }
}
