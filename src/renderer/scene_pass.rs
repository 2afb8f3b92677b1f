//! First pass of the composer: backdrop plus the lit model into an HDR
//! colour target and a sampleable depth target.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::assets::{BackgroundImage, EnvironmentMap, Model};
use crate::camera::{Camera, CameraUniform};
use crate::error::VitrineError;
use crate::gpu::pipeline_helpers::{
    equirect_sampler, filtering_sampler, linear_sampler, texture_2d,
    uniform_buffer, uniform_buffer_in,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{solid_texture, upload_texture, RenderTarget};
use crate::scene::{Background, Scene};

/// HDR format every intermediate colour target uses.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Depth format of the scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BackgroundParams {
    color: [f32; 4],
    mode: u32,
    _pad: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct EnvironmentParams {
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialParams {
    base_color: [f32; 4],
    metallic: f32,
    roughness: f32,
    has_texture: u32,
    _pad: u32,
}

/// Ambient used until an environment arrives.
const FALLBACK_AMBIENT: [f32; 4] = [0.6, 0.6, 0.6, 0.0];

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: usize,
}

struct GpuModel {
    source: Arc<Model>,
    meshes: Vec<GpuMesh>,
    material_bind_groups: Vec<wgpu::BindGroup>,
    _textures: Vec<RenderTarget>,
}

/// Draws the backdrop and the model.
pub struct ScenePass {
    background_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    environment_buffer: wgpu::Buffer,
    background_buffer: wgpu::Buffer,

    scene_layout: wgpu::BindGroupLayout,
    scene_bind_group: wgpu::BindGroup,
    background_layout: wgpu::BindGroupLayout,
    background_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,

    sampler: wgpu::Sampler,
    env_sampler: wgpu::Sampler,
    white: RenderTarget,

    environment: Option<(Arc<EnvironmentMap>, RenderTarget)>,
    fallback_environment: RenderTarget,
    background: Option<(Arc<BackgroundImage>, RenderTarget)>,
    model: Option<GpuModel>,
    revision: Option<u64>,
}

impl ScenePass {
    /// Build pipelines and placeholder bindings.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Shader`] if a shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, VitrineError> {
        let device = &context.device;
        let queue = &context.queue;

        let camera_uniform = CameraUniform::new();
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::bytes_of(&camera_uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let environment_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Environment Params Buffer"),
                contents: bytemuck::bytes_of(&EnvironmentParams {
                    ambient: FALLBACK_AMBIENT,
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let background_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Background Params Buffer"),
                contents: bytemuck::bytes_of(&BackgroundParams {
                    color: [0.0, 0.0, 0.0, 1.0],
                    mode: 0,
                    _pad: [0; 3],
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let sampler = linear_sampler(device, "Scene Sampler");
        let env_sampler = equirect_sampler(device, "Environment Sampler");
        let white = solid_texture(
            device,
            queue,
            "White Texture",
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &[255, 255, 255, 255],
        );
        let fallback_environment = solid_texture(
            device,
            queue,
            "Empty Environment",
            HDR_FORMAT,
            &[0; 8],
        );

        let scene_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[
                    uniform_buffer_in(
                        0,
                        wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ),
                    uniform_buffer(1),
                    texture_2d(2),
                    filtering_sampler(3),
                ],
            });
        let background_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Background Bind Group Layout"),
                entries: &[uniform_buffer(0), texture_2d(1), filtering_sampler(2)],
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[uniform_buffer(0), texture_2d(1), filtering_sampler(2)],
            });

        let scene_bind_group = create_scene_bind_group(
            device,
            &scene_layout,
            &camera_buffer,
            &environment_buffer,
            &fallback_environment.view,
            &env_sampler,
        );
        let background_bind_group = create_textured_bind_group(
            device,
            "Background Bind Group",
            &background_layout,
            &background_buffer,
            &white.view,
            &sampler,
        );

        let background_shader = shader_composer.compose(
            device,
            "Background Shader",
            include_str!("../../assets/shaders/raster/background.wgsl"),
            "background.wgsl",
        )?;
        let mesh_shader = shader_composer.compose(
            device,
            "Scene Shader",
            include_str!("../../assets/shaders/raster/scene.wgsl"),
            "scene.wgsl",
        )?;

        let background_pipeline = create_pipeline(
            device,
            "Background",
            &background_shader,
            &[&background_layout],
            &[],
            false,
        );
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
                2 => Float32x2
            ],
        };
        let mesh_pipeline = create_pipeline(
            device,
            "Scene Mesh",
            &mesh_shader,
            &[&scene_layout, &material_layout],
            &[vertex_layout],
            true,
        );

        Ok(Self {
            background_pipeline,
            mesh_pipeline,
            camera_uniform,
            camera_buffer,
            environment_buffer,
            background_buffer,
            scene_layout,
            scene_bind_group,
            background_layout,
            background_bind_group,
            material_layout,
            sampler,
            env_sampler,
            white,
            environment: None,
            fallback_environment,
            background: None,
            model: None,
            revision: None,
        })
    }

    /// Upload the camera for this frame.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, camera: &Camera) {
        self.camera_uniform.update(camera);
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }

    /// Bring GPU resources in line with the scene. Cheap when the scene's
    /// revision has not moved.
    pub fn sync(&mut self, context: &RenderContext, scene: &Scene) {
        if self.revision == Some(scene.revision()) {
            return;
        }
        self.revision = Some(scene.revision());
        self.sync_background(context, scene.background());
        self.sync_environment(context, scene.environment());
        if let Some(model) = scene.model() {
            let stale = self
                .model
                .as_ref()
                .is_none_or(|m| !Arc::ptr_eq(&m.source, model));
            if stale {
                self.model = Some(self.upload_model(context, model));
            }
        }
    }

    fn sync_background(&mut self, context: &RenderContext, background: &Background) {
        let params = match background {
            Background::Color(rgb) => {
                self.background = None;
                BackgroundParams {
                    color: [rgb[0], rgb[1], rgb[2], 1.0],
                    mode: 0,
                    _pad: [0; 3],
                }
            }
            Background::Image(image) => {
                let stale = self
                    .background
                    .as_ref()
                    .is_none_or(|(src, _)| !Arc::ptr_eq(src, image));
                if stale {
                    let texture = upload_texture(
                        &context.device,
                        &context.queue,
                        "Background Texture",
                        (image.width, image.height),
                        wgpu::TextureFormat::Rgba8UnormSrgb,
                        &image.rgba,
                    );
                    self.background = Some((Arc::clone(image), texture));
                }
                BackgroundParams {
                    color: [0.0, 0.0, 0.0, 1.0],
                    mode: 1,
                    _pad: [0; 3],
                }
            }
        };
        context
            .queue
            .write_buffer(&self.background_buffer, 0, bytemuck::bytes_of(&params));
        let view = self
            .background
            .as_ref()
            .map_or(&self.white.view, |(_, t)| &t.view);
        self.background_bind_group = create_textured_bind_group(
            &context.device,
            "Background Bind Group",
            &self.background_layout,
            &self.background_buffer,
            view,
            &self.sampler,
        );
    }

    fn sync_environment(
        &mut self,
        context: &RenderContext,
        environment: Option<&Arc<EnvironmentMap>>,
    ) {
        let Some(env) = environment else {
            return;
        };
        if self
            .environment
            .as_ref()
            .is_some_and(|(src, _)| Arc::ptr_eq(src, env))
        {
            return;
        }
        let bits: Vec<u16> =
            env.to_half_texels().iter().map(|h| h.to_bits()).collect();
        let texture = upload_texture(
            &context.device,
            &context.queue,
            "Environment Texture",
            (env.width, env.height),
            HDR_FORMAT,
            bytemuck::cast_slice(&bits),
        );
        let [r, g, b] = env.average();
        context.queue.write_buffer(
            &self.environment_buffer,
            0,
            bytemuck::bytes_of(&EnvironmentParams {
                ambient: [r, g, b, 1.0],
            }),
        );
        self.scene_bind_group = create_scene_bind_group(
            &context.device,
            &self.scene_layout,
            &self.camera_buffer,
            &self.environment_buffer,
            &texture.view,
            &self.env_sampler,
        );
        self.environment = Some((Arc::clone(env), texture));
    }

    fn upload_model(&self, context: &RenderContext, model: &Arc<Model>) -> GpuModel {
        let device = &context.device;
        let textures: Vec<RenderTarget> = model
            .textures
            .iter()
            .enumerate()
            .map(|(i, t)| {
                upload_texture(
                    device,
                    &context.queue,
                    &format!("Model Texture {i}"),
                    (t.width, t.height),
                    wgpu::TextureFormat::Rgba8UnormSrgb,
                    &t.rgba,
                )
            })
            .collect();

        let material_bind_groups = model
            .materials
            .iter()
            .map(|material| {
                let texture = material
                    .base_color_texture
                    .and_then(|i| textures.get(i));
                let params = MaterialParams {
                    base_color: material.base_color_factor,
                    metallic: material.metallic_factor,
                    roughness: material.roughness_factor,
                    has_texture: u32::from(texture.is_some()),
                    _pad: 0,
                };
                let buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Material Buffer"),
                        contents: bytemuck::bytes_of(&params),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
                create_textured_bind_group(
                    device,
                    "Material Bind Group",
                    &self.material_layout,
                    &buffer,
                    texture.map_or(&self.white.view, |t| &t.view),
                    &self.sampler,
                )
            })
            .collect();

        let meshes = model
            .meshes
            .iter()
            .map(|mesh| {
                let vertices: Vec<Vertex> = mesh
                    .positions
                    .iter()
                    .zip(&mesh.normals)
                    .zip(&mesh.uvs)
                    .map(|((p, n), uv)| Vertex {
                        position: *p,
                        normal: *n,
                        uv: *uv,
                    })
                    .collect();
                GpuMesh {
                    vertex_buffer: device.create_buffer_init(
                        &wgpu::util::BufferInitDescriptor {
                            label: Some("Mesh Vertex Buffer"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        },
                    ),
                    index_buffer: device.create_buffer_init(
                        &wgpu::util::BufferInitDescriptor {
                            label: Some("Mesh Index Buffer"),
                            contents: bytemuck::cast_slice(&mesh.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        },
                    ),
                    index_count: mesh.indices.len() as u32,
                    material: mesh.material,
                }
            })
            .collect();

        log::debug!(
            "uploaded model: {} mesh(es), {} texture(s)",
            model.meshes.len(),
            textures.len()
        );
        GpuModel {
            source: Arc::clone(model),
            meshes,
            material_bind_groups,
            _textures: textures,
        }
    }

    /// Clear both targets and draw backdrop then model.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        pass.set_pipeline(&self.background_pipeline);
        pass.set_bind_group(0, &self.background_bind_group, &[]);
        pass.draw(0..3, 0..1);

        let Some(model) = &self.model else {
            return;
        };
        pass.set_pipeline(&self.mesh_pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        for mesh in &model.meshes {
            let Some(material) = model.material_bind_groups.get(mesh.material)
            else {
                continue;
            };
            pass.set_bind_group(1, material, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

fn create_scene_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera: &wgpu::Buffer,
    environment: &wgpu::Buffer,
    env_view: &wgpu::TextureView,
    env_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: environment.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(env_view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(env_sampler),
            },
        ],
    })
}

fn create_textured_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    params: &wgpu::Buffer,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    buffers: &[wgpu::VertexBufferLayout<'_>],
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: if depth_write {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
