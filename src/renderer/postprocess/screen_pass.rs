//! Shared interface of the fullscreen passes.

use super::PassKind;

/// Uniform interface for fullscreen passes that sit between the scene pass
/// and the output pass.
pub trait ScreenPass {
    /// Which slot of the chain this pass fills.
    fn kind(&self) -> PassKind;
    /// Encode GPU commands for this pass.
    fn render(&self, encoder: &mut wgpu::CommandEncoder);
    /// View later passes sample from.
    fn output_view(&self) -> &wgpu::TextureView;
}
