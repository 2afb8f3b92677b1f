//! Last pass of the chain: exposure, tone mapping and colour encoding into
//! the swapchain image.

use wgpu::util::DeviceExt;

use crate::error::VitrineError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, draw_fullscreen, filtering_sampler,
    linear_sampler, texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::ToneMapping;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct OutputParams {
    exposure: f32,
    tone_mapping: u32,
    show_coc: u32,
    encode_srgb: u32,
}

/// Writes the post-processed HDR image to the surface.
pub struct OutputPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    params: OutputParams,
    bind_group: wgpu::BindGroup,
}

impl OutputPass {
    /// Build the pass for the surface format of `context`.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Shader`] if the shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        color: &wgpu::TextureView,
        coc: &wgpu::TextureView,
        tone_mapping: ToneMapping,
    ) -> Result<Self, VitrineError> {
        let device = &context.device;
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Output Bind Group Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    filtering_sampler(2),
                    uniform_buffer(3),
                ],
            });
        let shader = shader_composer.compose(
            device,
            "Output Shader",
            include_str!("../../../assets/shaders/screen/output.wgsl"),
            "output.wgsl",
        )?;
        let pipeline = create_screen_space_pipeline(
            device,
            "Output",
            &shader,
            context.format(),
            None,
            &[&layout],
        );
        let sampler = linear_sampler(device, "Output Sampler");

        // sRGB surfaces encode in hardware.
        let params = OutputParams {
            exposure: 1.0,
            tone_mapping: tone_mapping.as_index(),
            show_coc: 0,
            encode_srgb: u32::from(!context.format().is_srgb()),
        };
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Output Params Buffer"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = Self::create_bind_group(
            device,
            &layout,
            color,
            coc,
            &sampler,
            &params_buffer,
        );

        Ok(Self {
            pipeline,
            layout,
            sampler,
            params_buffer,
            params,
            bind_group,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        color: &wgpu::TextureView,
        coc: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Output Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(coc),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Upload exposure, operator and the CoC debug toggle. Skips the write
    /// when nothing changed.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        exposure: f32,
        tone_mapping: ToneMapping,
        show_coc: bool,
    ) {
        let params = OutputParams {
            exposure,
            tone_mapping: tone_mapping.as_index(),
            show_coc: u32::from(show_coc),
            ..self.params
        };
        if params != self.params {
            self.params = params;
            queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
        }
    }

    /// Rebind inputs after a resize.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        color: &wgpu::TextureView,
        coc: &wgpu::TextureView,
    ) {
        self.bind_group = Self::create_bind_group(
            &context.device,
            &self.layout,
            color,
            coc,
            &self.sampler,
            &self.params_buffer,
        );
    }

    /// Draw into the swapchain view.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        draw_fullscreen(
            encoder,
            "Output Pass",
            target,
            &self.pipeline,
            &[&self.bind_group],
        );
    }
}
