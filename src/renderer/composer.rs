//! The render chain owner.
//!
//! [`Composer`] builds the scene pass, the HDR targets and the fullscreen
//! passes, and wires each pass to the input [`CHAIN`] names for it, both at
//! construction and after every resize.

use crate::error::VitrineError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::options::{Options, ToneMapping};
use crate::renderer::postprocess::depth_of_field::DepthOfFieldPass;
use crate::renderer::postprocess::output::OutputPass;
use crate::renderer::postprocess::saturation::SaturationPass;
use crate::renderer::postprocess::screen_pass::ScreenPass;
use crate::renderer::postprocess::{pass_order, resolve_input, PassKind, CHAIN};
use crate::renderer::scene_pass::{ScenePass, HDR_FORMAT};
use crate::scene::{RenderState, Scene};

/// Owns the whole chain: scene pass, HDR targets, the fullscreen passes and
/// the output pass.
pub struct Composer {
    scene_pass: ScenePass,
    scene_color: RenderTarget,
    scene_depth: RenderTarget,
    saturation: SaturationPass,
    depth_of_field: DepthOfFieldPass,
    output: OutputPass,
    tone_mapping: ToneMapping,
    show_coc: bool,
}

impl Composer {
    /// Build every pass at the current surface size.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Shader`] if any shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        options: &Options,
    ) -> Result<Self, VitrineError> {
        let post = &options.post_processing;
        let scene_pass = ScenePass::new(context, shader_composer)?;
        let (scene_color, scene_depth) = Self::create_scene_targets(context);
        let saturation = SaturationPass::new(
            context,
            shader_composer,
            resolve_input(
                PassKind::HueSaturation,
                &[(PassKind::Render, &scene_color.view)],
            )?,
            post.saturation,
        )?;
        let depth_of_field = DepthOfFieldPass::new(
            context,
            shader_composer,
            resolve_input(
                PassKind::DepthOfField,
                &[
                    (PassKind::Render, &scene_color.view),
                    (PassKind::HueSaturation, saturation.output_view()),
                ],
            )?,
            &scene_depth.view,
            post.dof_resolution_height,
        )?;
        let output = OutputPass::new(
            context,
            shader_composer,
            resolve_input(
                PassKind::Output,
                &[
                    (PassKind::Render, &scene_color.view),
                    (PassKind::HueSaturation, saturation.output_view()),
                    (PassKind::DepthOfField, depth_of_field.output_view()),
                ],
            )?,
            depth_of_field.coc_view(),
            post.tone_mapping,
        )?;
        log::debug!("blur target {:?}", depth_of_field.blur_size());

        let composer = Self {
            scene_pass,
            scene_color,
            scene_depth,
            saturation,
            depth_of_field,
            output,
            tone_mapping: post.tone_mapping,
            show_coc: options.debug.show_coc,
        };
        debug_assert_eq!(composer.passes(), pass_order());
        log::debug!("render chain: {:?}", composer.passes());
        Ok(composer)
    }

    fn create_scene_targets(context: &RenderContext) -> (RenderTarget, RenderTarget) {
        let size = context.size();
        (
            RenderTarget::new(&context.device, "Scene Color", size, HDR_FORMAT),
            RenderTarget::depth(&context.device, "Scene Depth", size),
        )
    }

    /// Passes in execution order, as reported by the passes themselves.
    #[must_use]
    pub fn passes(&self) -> Vec<PassKind> {
        let mut passes = vec![PassKind::Render];
        passes.extend(self.screen_passes().iter().map(|p| p.kind()));
        passes.push(PassKind::Output);
        passes
    }

    fn screen_pass(&self, kind: PassKind) -> Option<&dyn ScreenPass> {
        match kind {
            PassKind::HueSaturation => Some(&self.saturation),
            PassKind::DepthOfField => Some(&self.depth_of_field),
            PassKind::Render | PassKind::Output => None,
        }
    }

    fn screen_passes(&self) -> Vec<&dyn ScreenPass> {
        CHAIN
            .iter()
            .filter_map(|(kind, _)| self.screen_pass(*kind))
            .collect()
    }

    /// Recreate all resolution-dependent targets. Call after the surface
    /// has been reconfigured.
    pub fn resize(&mut self, context: &RenderContext) {
        if let Err(e) = self.rebuild_targets(context) {
            log::error!("render chain resize failed: {e}");
        }
    }

    fn rebuild_targets(&mut self, context: &RenderContext) -> Result<(), VitrineError> {
        let (scene_color, scene_depth) = Self::create_scene_targets(context);
        self.scene_color = scene_color;
        self.scene_depth = scene_depth;
        self.saturation.resize(
            context,
            resolve_input(
                PassKind::HueSaturation,
                &[(PassKind::Render, &self.scene_color.view)],
            )?,
        );
        self.depth_of_field.resize(
            context,
            resolve_input(
                PassKind::DepthOfField,
                &[
                    (PassKind::Render, &self.scene_color.view),
                    (PassKind::HueSaturation, self.saturation.output_view()),
                ],
            )?,
            &self.scene_depth.view,
        );
        self.output.resize(
            context,
            resolve_input(
                PassKind::Output,
                &[
                    (PassKind::Render, &self.scene_color.view),
                    (PassKind::HueSaturation, self.saturation.output_view()),
                    (PassKind::DepthOfField, self.depth_of_field.output_view()),
                ],
            )?,
            self.depth_of_field.coc_view(),
        );
        Ok(())
    }

    /// Upload what changed and encode the full chain into `frame_view`.
    pub fn render(
        &mut self,
        context: &RenderContext,
        scene: &Scene,
        state: &RenderState,
        frame_view: &wgpu::TextureView,
    ) {
        let queue = &context.queue;
        let post = state.post();
        self.scene_pass.sync(context, scene);
        self.scene_pass.update_camera(queue, state.camera());
        self.saturation.set_saturation(queue, post.saturation);
        self.depth_of_field.update(queue, post, state.camera());
        self.output
            .update(queue, post.exposure, self.tone_mapping, self.show_coc);

        let mut encoder = context.create_encoder();
        self.scene_pass
            .render(&mut encoder, &self.scene_color.view, &self.scene_depth.view);
        for pass in self.screen_passes() {
            pass.render(&mut encoder);
        }
        self.output.render(&mut encoder, frame_view);
        context.submit(encoder);
    }
}
