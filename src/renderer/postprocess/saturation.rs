//! Hue/saturation pass.

use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use super::PassKind;
use crate::error::VitrineError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, draw_fullscreen, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::renderer::scene_pass::HDR_FORMAT;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SaturationParams {
    saturation: f32,
    _pad: [f32; 3],
}

/// CPU mirror of the shader's saturation curve. Positive values push each
/// channel away from the channel mean, negative values pull it toward grey
/// (`-1` is fully grey).
#[must_use]
pub fn adjust_saturation(color: [f32; 3], saturation: f32) -> [f32; 3] {
    let average = (color[0] + color[1] + color[2]) / 3.0;
    let amount = if saturation > 0.0 {
        1.0 - 1.0 / (1.001 - saturation)
    } else {
        -saturation
    };
    color.map(|c| (c + (average - c) * amount).max(0.0))
}

/// Applies [`adjust_saturation`] to every pixel of the scene colour.
pub struct SaturationPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    output: RenderTarget,
}

impl SaturationPass {
    /// Build the pass reading from `input`.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Shader`] if the shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        input: &wgpu::TextureView,
        saturation: f32,
    ) -> Result<Self, VitrineError> {
        let device = &context.device;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Saturation Bind Group Layout"),
                entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
            });
        let shader = shader_composer.compose(
            device,
            "Saturation Shader",
            include_str!("../../../assets/shaders/screen/saturation.wgsl"),
            "saturation.wgsl",
        )?;
        let pipeline = create_screen_space_pipeline(
            device,
            "Saturation",
            &shader,
            HDR_FORMAT,
            None,
            &[&layout],
        );
        let sampler = linear_sampler(device, "Saturation Sampler");
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Saturation Params Buffer"),
                contents: bytemuck::bytes_of(&SaturationParams {
                    saturation,
                    _pad: [0.0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let output =
            RenderTarget::new(device, "Saturation Output", context.size(), HDR_FORMAT);
        let bind_group =
            Self::create_bind_group(device, &layout, input, &sampler, &params_buffer);

        Ok(Self {
            pipeline,
            layout,
            sampler,
            params_buffer,
            bind_group,
            output,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        input: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Saturation Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Upload a new saturation amount.
    pub fn set_saturation(&self, queue: &wgpu::Queue, saturation: f32) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&SaturationParams {
                saturation,
                _pad: [0.0; 3],
            }),
        );
    }

    /// Recreate the output at the new surface size and rebind `input`.
    pub fn resize(&mut self, context: &RenderContext, input: &wgpu::TextureView) {
        self.output = RenderTarget::new(
            &context.device,
            "Saturation Output",
            context.size(),
            HDR_FORMAT,
        );
        self.bind_group = Self::create_bind_group(
            &context.device,
            &self.layout,
            input,
            &self.sampler,
            &self.params_buffer,
        );
    }
}

impl ScreenPass for SaturationPass {
    fn kind(&self) -> PassKind {
        PassKind::HueSaturation
    }

    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        draw_fullscreen(
            encoder,
            "Saturation Pass",
            &self.output.view,
            &self.pipeline,
            &[&self.bind_group],
        );
    }

    fn output_view(&self) -> &wgpu::TextureView {
        &self.output.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_leaves_colour_alone() {
        let c = [0.2, 0.5, 0.9];
        let out = adjust_saturation(c, 0.0);
        for (a, b) in c.iter().zip(out) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn minus_one_is_grey() {
        let out = adjust_saturation([0.3, 0.6, 0.9], -1.0);
        assert!((out[0] - 0.6).abs() < 1e-6);
        assert!((out[1] - 0.6).abs() < 1e-6);
        assert!((out[2] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn positive_values_spread_channels() {
        let c = [0.4, 0.5, 0.6];
        let out = adjust_saturation(c, 0.7);
        assert!(out[2] - out[0] > c[2] - c[0]);
        // Mean stays put while nothing clips.
        let mean = out.iter().sum::<f32>() / 3.0;
        assert!((mean - 0.5).abs() < 1e-5);
    }

    #[test]
    fn grey_is_a_fixed_point() {
        let out = adjust_saturation([0.25; 3], 0.9);
        assert_eq!(out, [0.25; 3]);
    }

    #[test]
    fn output_never_goes_negative() {
        let out = adjust_saturation([0.0, 0.1, 1.0], 0.9);
        assert!(out.iter().all(|c| *c >= 0.0));
        // Bright channel is not clamped to 1 so HDR survives.
        assert!(out[2] > 1.0);
    }
}
