//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, texture helpers, and shader
//! composition.

/// Shared wgpu boilerplate helpers for pipelines and bind groups.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render targets and sampled texture uploads.
pub mod texture;
