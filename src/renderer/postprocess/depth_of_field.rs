//! Bokeh depth of field.
//!
//! Three draws: a full-resolution circle-of-confusion buffer from scene
//! depth (near field in `r`, far field in `g`), a disk blur at a reduced
//! resolution, and a composite that mixes sharp and blurred colour by the
//! CoC.

use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use super::PassKind;
use crate::camera::Camera;
use crate::error::VitrineError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, depth_texture_2d, draw_fullscreen,
    filtering_sampler, linear_sampler, texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::renderer::scene_pass::HDR_FORMAT;
use crate::scene::PostParams;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CocParams {
    focus_distance: f32,
    focal_length: f32,
    znear: f32,
    zfar: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BokehParams {
    texel_size: [f32; 2],
    bokeh_scale: f32,
    _pad: f32,
}

/// Perspective depth-buffer value to positive view distance.
#[must_use]
pub fn linearize_depth(depth: f32, znear: f32, zfar: f32) -> f32 {
    znear * zfar / (zfar - depth * (zfar - znear))
}

/// View distance to `[0, 1]` between the clip planes.
#[must_use]
pub fn orthographic_depth(view_z: f32, znear: f32, zfar: f32) -> f32 {
    ((view_z - znear) / (zfar - znear)).clamp(0.0, 1.0)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Near and far blur amounts for a depth-buffer value, as the CoC shader
/// computes them. At most one of the two is non-zero.
#[must_use]
pub fn circle_of_confusion(
    depth: f32,
    focus_distance: f32,
    focal_length: f32,
    znear: f32,
    zfar: f32,
) -> (f32, f32) {
    let view_z = linearize_depth(depth, znear, zfar);
    let signed = orthographic_depth(view_z, znear, zfar) - focus_distance;
    let magnitude = smoothstep(0.0, focal_length.max(1e-5), signed.abs());
    if signed <= 0.0 {
        (magnitude, 0.0)
    } else {
        (0.0, magnitude)
    }
}

/// Blur target size: `reference_height` rows (never more than the viewport)
/// with the viewport's aspect ratio.
#[must_use]
pub fn dof_resolution((width, height): (u32, u32), reference_height: u32) -> (u32, u32) {
    let (width, height) = (width.max(1), height.max(1));
    let rows = reference_height.clamp(1, height);
    let columns = (rows as f32 * width as f32 / height as f32).round() as u32;
    (columns.clamp(1, width), rows)
}

/// CoC, blur and composite draws.
pub struct DepthOfFieldPass {
    coc_pipeline: wgpu::RenderPipeline,
    coc_layout: wgpu::BindGroupLayout,
    coc_params: wgpu::Buffer,
    coc_bind_group: wgpu::BindGroup,
    coc: RenderTarget,

    bokeh_pipeline: wgpu::RenderPipeline,
    bokeh_layout: wgpu::BindGroupLayout,
    bokeh_params: wgpu::Buffer,
    bokeh_bind_group: wgpu::BindGroup,
    blurred: RenderTarget,

    composite_pipeline: wgpu::RenderPipeline,
    composite_layout: wgpu::BindGroupLayout,
    composite_bind_group: wgpu::BindGroup,
    output: RenderTarget,

    sampler: wgpu::Sampler,
    reference_height: u32,
}

impl DepthOfFieldPass {
    /// Build the pass over the given colour and scene depth.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Shader`] if a shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        reference_height: u32,
    ) -> Result<Self, VitrineError> {
        let device = &context.device;

        let coc_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("CoC Bind Group Layout"),
                entries: &[depth_texture_2d(0), uniform_buffer(1)],
            });
        let bokeh_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bokeh Bind Group Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    filtering_sampler(2),
                    uniform_buffer(3),
                ],
            });
        let composite_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("DoF Composite Bind Group Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    texture_2d(2),
                    filtering_sampler(3),
                ],
            });

        let coc_shader = shader_composer.compose(
            device,
            "CoC Shader",
            include_str!("../../../assets/shaders/screen/coc.wgsl"),
            "coc.wgsl",
        )?;
        let bokeh_shader = shader_composer.compose(
            device,
            "Bokeh Shader",
            include_str!("../../../assets/shaders/screen/bokeh.wgsl"),
            "bokeh.wgsl",
        )?;
        let composite_shader = shader_composer.compose(
            device,
            "DoF Composite Shader",
            include_str!("../../../assets/shaders/screen/dof_composite.wgsl"),
            "dof_composite.wgsl",
        )?;

        let coc_pipeline = create_screen_space_pipeline(
            device,
            "CoC",
            &coc_shader,
            HDR_FORMAT,
            None,
            &[&coc_layout],
        );
        let bokeh_pipeline = create_screen_space_pipeline(
            device,
            "Bokeh",
            &bokeh_shader,
            HDR_FORMAT,
            None,
            &[&bokeh_layout],
        );
        let composite_pipeline = create_screen_space_pipeline(
            device,
            "DoF Composite",
            &composite_shader,
            HDR_FORMAT,
            None,
            &[&composite_layout],
        );

        let coc_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("CoC Params Buffer"),
            contents: bytemuck::bytes_of(&CocParams {
                focus_distance: 0.1,
                focal_length: 0.1,
                znear: 0.1,
                zfar: 100.0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bokeh_params =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bokeh Params Buffer"),
                contents: bytemuck::bytes_of(&BokehParams {
                    texel_size: [0.0; 2],
                    bokeh_scale: 0.0,
                    _pad: 0.0,
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let sampler = linear_sampler(device, "DoF Sampler");

        let (coc, blurred, output) = Self::create_targets(context, reference_height);
        let coc_bind_group =
            Self::create_coc_bind_group(device, &coc_layout, depth, &coc_params);
        let bokeh_bind_group = Self::create_bokeh_bind_group(
            device,
            &bokeh_layout,
            color,
            &coc.view,
            &sampler,
            &bokeh_params,
        );
        let composite_bind_group = Self::create_composite_bind_group(
            device,
            &composite_layout,
            color,
            &blurred.view,
            &coc.view,
            &sampler,
        );

        Ok(Self {
            coc_pipeline,
            coc_layout,
            coc_params,
            coc_bind_group,
            coc,
            bokeh_pipeline,
            bokeh_layout,
            bokeh_params,
            bokeh_bind_group,
            blurred,
            composite_pipeline,
            composite_layout,
            composite_bind_group,
            output,
            sampler,
            reference_height,
        })
    }

    fn create_targets(
        context: &RenderContext,
        reference_height: u32,
    ) -> (RenderTarget, RenderTarget, RenderTarget) {
        let size = context.size();
        let device = &context.device;
        (
            RenderTarget::new(device, "CoC Texture", size, HDR_FORMAT),
            RenderTarget::new(
                device,
                "Bokeh Texture",
                dof_resolution(size, reference_height),
                HDR_FORMAT,
            ),
            RenderTarget::new(device, "DoF Output", size, HDR_FORMAT),
        )
    }

    fn create_coc_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        depth: &wgpu::TextureView,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CoC Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(depth),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    fn create_bokeh_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        color: &wgpu::TextureView,
        coc: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bokeh Bind Group"),
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

    fn create_composite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sharp: &wgpu::TextureView,
        blurred: &wgpu::TextureView,
        coc: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("DoF Composite Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(sharp),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(blurred),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(coc),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Upload focus parameters and the camera's clip planes.
    pub fn update(&self, queue: &wgpu::Queue, post: &PostParams, camera: &Camera) {
        queue.write_buffer(
            &self.coc_params,
            0,
            bytemuck::bytes_of(&CocParams {
                focus_distance: post.focus_distance,
                focal_length: post.focal_length,
                znear: camera.znear,
                zfar: camera.zfar,
            }),
        );
        let (w, h) = self.blurred.size;
        queue.write_buffer(
            &self.bokeh_params,
            0,
            bytemuck::bytes_of(&BokehParams {
                texel_size: [1.0 / w as f32, 1.0 / h as f32],
                bokeh_scale: post.bokeh_scale,
                _pad: 0.0,
            }),
        );
    }

    /// Circle-of-confusion buffer, for the debug view.
    #[must_use]
    pub fn coc_view(&self) -> &wgpu::TextureView {
        &self.coc.view
    }

    /// Size of the blur target.
    #[must_use]
    pub fn blur_size(&self) -> (u32, u32) {
        self.blurred.size
    }

    /// Recreate every target at the new surface size and rebind inputs.
    pub fn resize(
        &mut self,
        context: &RenderContext,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
    ) {
        let device = &context.device;
        let (coc, blurred, output) =
            Self::create_targets(context, self.reference_height);
        self.coc = coc;
        self.blurred = blurred;
        self.output = output;
        self.coc_bind_group = Self::create_coc_bind_group(
            device,
            &self.coc_layout,
            depth,
            &self.coc_params,
        );
        self.bokeh_bind_group = Self::create_bokeh_bind_group(
            device,
            &self.bokeh_layout,
            color,
            &self.coc.view,
            &self.sampler,
            &self.bokeh_params,
        );
        self.composite_bind_group = Self::create_composite_bind_group(
            device,
            &self.composite_layout,
            color,
            &self.blurred.view,
            &self.coc.view,
            &self.sampler,
        );
    }
}

impl ScreenPass for DepthOfFieldPass {
    fn kind(&self) -> PassKind {
        PassKind::DepthOfField
    }

    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        draw_fullscreen(
            encoder,
            "CoC Pass",
            &self.coc.view,
            &self.coc_pipeline,
            &[&self.coc_bind_group],
        );
        draw_fullscreen(
            encoder,
            "Bokeh Pass",
            &self.blurred.view,
            &self.bokeh_pipeline,
            &[&self.bokeh_bind_group],
        );
        draw_fullscreen(
            encoder,
            "DoF Composite Pass",
            &self.output.view,
            &self.composite_pipeline,
            &[&self.composite_bind_group],
        );
    }

    fn output_view(&self) -> &wgpu::TextureView {
        &self.output.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    #[test]
    fn depth_buffer_endpoints_map_to_clip_planes() {
        assert!((linearize_depth(0.0, NEAR, FAR) - NEAR).abs() < 1e-5);
        assert!((linearize_depth(1.0, NEAR, FAR) - FAR).abs() < 1e-2);
        assert_eq!(orthographic_depth(NEAR, NEAR, FAR), 0.0);
        assert_eq!(orthographic_depth(FAR, NEAR, FAR), 1.0);
        assert_eq!(orthographic_depth(FAR * 2.0, NEAR, FAR), 1.0);
    }

    /// Depth-buffer value for a point at normalized depth `t`.
    fn depth_at(t: f32) -> f32 {
        let z = NEAR + t * (FAR - NEAR);
        (FAR * (z - NEAR)) / (z * (FAR - NEAR))
    }

    #[test]
    fn focus_plane_is_sharp() {
        let (near, far) = circle_of_confusion(depth_at(0.3), 0.3, 0.1, NEAR, FAR);
        assert!(near < 1e-3);
        assert!(far < 1e-3);
    }

    #[test]
    fn blur_splits_by_side_of_focus() {
        let (near, far) = circle_of_confusion(depth_at(0.05), 0.3, 0.1, NEAR, FAR);
        assert!((near - 1.0).abs() < 1e-3);
        assert_eq!(far, 0.0);

        let (near, far) = circle_of_confusion(depth_at(0.8), 0.3, 0.1, NEAR, FAR);
        assert_eq!(near, 0.0);
        assert!((far - 1.0).abs() < 1e-3);
    }

    #[test]
    fn blur_ramps_inside_focal_range() {
        let (_, far) = circle_of_confusion(depth_at(0.35), 0.3, 0.1, NEAR, FAR);
        assert!(far > 0.1 && far < 0.9, "far = {far}");
    }

    #[test]
    fn zero_focal_length_does_not_divide_by_zero() {
        let (near, far) = circle_of_confusion(depth_at(0.6), 0.3, 0.0, NEAR, FAR);
        assert!(near.is_finite() && far.is_finite());
        assert!((far - 1.0).abs() < 1e-3);
    }

    #[test]
    fn blur_target_follows_reference_height() {
        assert_eq!(dof_resolution((3840, 2160), 1024), (1820, 1024));
        assert_eq!(dof_resolution((800, 600), 1024), (800, 600));
        assert_eq!(dof_resolution((0, 0), 1024), (1, 1));
    }
}
