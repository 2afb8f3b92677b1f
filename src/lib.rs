// -- Lint policy ---------------------------------------------------------
// Crate-wide lint levels live in Cargo.toml; only the groups that need
// crate attributes are repeated here.

// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]

//! GPU-accelerated 3D showcase viewer built on wgpu.
//!
//! Vitrine renders a glTF model in front of a background image, lit by an
//! HDR environment map, and lays an HTML page overlay on top. Pages drive
//! the view through three calls: `cameraFly` animates the camera and depth
//! of field, `loadPage` cross-fades to another page fragment, and
//! `toggle3DControls` switches pointer orbiting on and off.
//!
//! # Key entry points
//!
//! - [`SceneEngine`] - the GPU-backed engine
//! - [`Stage`] - all viewer state, testable without a GPU
//! - [`VitrineCommand`] - everything a page, key or pointer can ask for
//! - [`Options`] - runtime configuration with TOML presets
//! - [`Viewer`] - a ready-made winit window (`viewer` feature)
//!
//! # Architecture
//!
//! Startup loads the environment map, then the background and model in
//! parallel on a worker thread, then the first page. Page fragments are
//! fetched on a second worker. The frame loop only paints when something
//! marked the [`scene::RenderState`] dirty: an asset arriving, a running
//! flight, the orbit controls moving the camera, or a resize. The render
//! chain is scene → saturation → depth of field → tone-mapped output.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
#[cfg(feature = "gui")]
pub mod gui;
pub mod input;
pub mod options;
pub mod page;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use animation::{FlightConfig, FlightPolicy};
pub use engine::{SceneEngine, Stage, VitrineCommand};
pub use error::VitrineError;
pub use input::{InputEvent, KeyAction, MouseButton};
pub use options::Options;
pub use page::PageSurface;
pub use util::easing::EasingFunction;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
