//! The render chain.
//!
//! [`scene_pass::ScenePass`] draws the backdrop and model into HDR colour
//! and depth targets; the [`postprocess`] passes adjust saturation, apply
//! depth of field and tone-map into the swapchain. [`composer::Composer`]
//! owns the chain and wires it as [`postprocess::CHAIN`] describes.

pub mod composer;
pub mod postprocess;
pub mod scene_pass;

pub use composer::Composer;
