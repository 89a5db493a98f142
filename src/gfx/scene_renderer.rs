//! Session-scoped rendering resources
//!
//! Everything the GPU holds on behalf of one AR session lives behind
//! [`SessionRenderer`]: mesh and uniform buffers, material bindings, the
//! camera-feed background texture, and the pipelines that draw them. Only
//! the session lifecycle manager creates or disposes one, and disposal is
//! the last step of teardown, after the frame loop is cancelled and the
//! capture stream is stopped.

use std::sync::Arc;

use log::debug;
use wgpu::util::DeviceExt;

use super::scene::ArScene;
use super::vertex::Vertex3D;
use crate::capture::CaptureFrame;
use crate::gfx::geometry::generate_ring;
use crate::gfx::material::{Material, MaterialBindings};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Per-frame global data shared by every draw in the session.
/// Must match the `Globals` struct in `shaders/lit.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    light_intensity: f32,
    light_color: [f32; 3],
    _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct TransformUniform {
    model: [[f32; 4]; 4],
}

/// The render half of a session, owned by the session lifecycle manager.
///
/// The depth format of the render pass the engine drives is fixed at
/// [`crate::gfx::render_engine::DEPTH_FORMAT`].
pub trait SessionRenderer {
    /// Uploads per-tick state (camera, transforms, materials, background
    /// frame) to the GPU.
    fn prepare(&mut self, scene: &mut ArScene, background: Option<&CaptureFrame>);

    /// Records this session's draws into the frame's main render pass.
    fn draw(&mut self, scene: &ArScene, pass: &mut wgpu::RenderPass<'_>);

    /// Releases all GPU resources. The manager calls this exactly once per
    /// session, on every exit path.
    fn dispose(self: Box<Self>);
}

struct PartBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl PartBuffers {
    fn new(device: &wgpu::Device, vertices: &[Vertex3D], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

struct BackgroundLayer {
    pipeline: wgpu::RenderPipeline,
    layout: BindGroupLayoutWithDesc,
    sampler: wgpu::Sampler,
    texture: Option<wgpu::Texture>,
    bind_group: Option<wgpu::BindGroup>,
    size: (u32, u32),
}

impl BackgroundLayer {
    fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Background Bind Group Layout");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/background.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&layout.layout],
            push_constant_ranges: &[],
        });

        // Drawn first, beneath the scene: depth writes off, test always.
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(surface_format.into())],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: super::render_engine::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Background Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            sampler,
            texture: None,
            bind_group: None,
            size: (0, 0),
        }
    }

    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &CaptureFrame) {
        if self.texture.is_none() || self.size != (frame.width, frame.height) {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Background Frame Texture"),
                size: wgpu::Extent3d {
                    width: frame.width,
                    height: frame.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.bind_group = Some(
                BindGroupBuilder::new(&self.layout)
                    .resource(wgpu::BindingResource::TextureView(&view))
                    .resource(wgpu::BindingResource::Sampler(&self.sampler))
                    .create(device, "Background Bind Group"),
            );
            self.texture = Some(texture);
            self.size = (frame.width, frame.height);
        }

        if let Some(texture) = &self.texture {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &frame.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * frame.width),
                    rows_per_image: Some(frame.height),
                },
                wgpu::Extent3d {
                    width: frame.width,
                    height: frame.height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }
}

/// GPU realization of an [`ArScene`].
pub struct SceneGraphics {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    pipeline: wgpu::RenderPipeline,
    global_ubo: UniformBuffer<GlobalUniform>,
    global_bind_group: wgpu::BindGroup,

    model_parts: Vec<PartBuffers>,
    model_transform: UniformBuffer<TransformUniform>,
    model_transform_bind_group: wgpu::BindGroup,

    reticle_buffers: PartBuffers,
    reticle_material: Material,
    reticle_transform: UniformBuffer<TransformUniform>,
    reticle_transform_bind_group: wgpu::BindGroup,

    background: BackgroundLayer,
    background_ready: bool,
}

impl SceneGraphics {
    /// Builds all GPU resources for a freshly assembled scene.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        scene: &mut ArScene,
    ) -> Self {
        let global_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Globals Bind Group Layout");
        let transform_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");
        let material_layout = MaterialBindings::new(&device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lit.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[
                &global_layout.layout,
                &transform_layout.layout,
                material_layout.bind_group_layout(),
            ],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // No culling: the reticle ring is double-sided and the dish
                // solids are closed, so depth testing does the work.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: super::render_engine::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let global_ubo = UniformBuffer::<GlobalUniform>::new(&device);
        let global_bind_group = BindGroupBuilder::new(&global_layout)
            .resource(global_ubo.binding_resource())
            .create(&device, "Globals Bind Group");

        // Model geometry and materials.
        let mut model_parts = Vec::with_capacity(scene.model.parts.len());
        for (index, part) in scene.model.parts.iter_mut().enumerate() {
            model_parts.push(PartBuffers::new(
                &device,
                &part.geometry.to_vertices(),
                &part.geometry.indices,
                &format!("Model Part {index}"),
            ));
            part.material.update_gpu_resources(&device, &queue);
        }

        let model_transform = UniformBuffer::<TransformUniform>::new(&device);
        let model_transform_bind_group = BindGroupBuilder::new(&transform_layout)
            .resource(model_transform.binding_resource())
            .create(&device, "Model Transform Bind Group");

        // Placement cursor: a flat ring, sized in meters.
        let ring = generate_ring(0.08, 0.1, 32);
        let reticle_buffers =
            PartBuffers::new(&device, &ring.to_vertices(), &ring.indices, "Reticle");
        let mut reticle_material = Material::new("reticle", [0.1, 1.0, 0.3, 0.8], 0.0, 1.0);
        reticle_material.update_gpu_resources(&device, &queue);

        let reticle_transform = UniformBuffer::<TransformUniform>::new(&device);
        let reticle_transform_bind_group = BindGroupBuilder::new(&transform_layout)
            .resource(reticle_transform.binding_resource())
            .create(&device, "Reticle Transform Bind Group");

        let background = BackgroundLayer::new(&device, surface_format);

        debug!(
            "session renderer created ({} model parts)",
            model_parts.len()
        );

        Self {
            device,
            queue,
            pipeline,
            global_ubo,
            global_bind_group,
            model_parts,
            model_transform,
            model_transform_bind_group,
            reticle_buffers,
            reticle_material,
            reticle_transform,
            reticle_transform_bind_group,
            background,
            background_ready: false,
        }
    }
}

impl SessionRenderer for SceneGraphics {
    fn prepare(&mut self, scene: &mut ArScene, background: Option<&CaptureFrame>) {
        let camera = scene.camera.uniform();
        self.global_ubo.update_content(
            &self.queue,
            GlobalUniform {
                view_position: camera.view_position,
                view_proj: camera.view_proj,
                light_position: scene.light.position,
                light_intensity: scene.light.intensity,
                light_color: scene.light.color,
                _padding: 0.0,
            },
        );

        self.model_transform.update_content(
            &self.queue,
            TransformUniform {
                model: scene.model.model_matrix().into(),
            },
        );
        self.reticle_transform.update_content(
            &self.queue,
            TransformUniform {
                model: scene.reticle.pose.into(),
            },
        );

        for part in scene.model.parts.iter_mut() {
            part.material.update_gpu_resources(&self.device, &self.queue);
        }

        if let Some(frame) = background {
            self.background.upload(&self.device, &self.queue, frame);
            self.background_ready = true;
        }
    }

    fn draw(&mut self, scene: &ArScene, pass: &mut wgpu::RenderPass<'_>) {
        if self.background_ready {
            if let Some(bind_group) = &self.background.bind_group {
                pass.set_pipeline(&self.background.pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);

        if scene.model.visible {
            pass.set_bind_group(1, &self.model_transform_bind_group, &[]);
            for (buffers, part) in self.model_parts.iter().zip(scene.model.parts.iter()) {
                let Some(material_bind_group) = part.material.bind_group() else {
                    continue;
                };
                pass.set_bind_group(2, material_bind_group, &[]);
                pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..buffers.index_count, 0, 0..1);
            }
        }

        if scene.reticle.visible {
            if let Some(material_bind_group) = self.reticle_material.bind_group() {
                pass.set_bind_group(1, &self.reticle_transform_bind_group, &[]);
                pass.set_bind_group(2, material_bind_group, &[]);
                pass.set_vertex_buffer(0, self.reticle_buffers.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    self.reticle_buffers.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..self.reticle_buffers.index_count, 0, 0..1);
            }
        }
    }

    fn dispose(self: Box<Self>) {
        // wgpu resources release on drop; the explicit hook exists so the
        // manager controls when that happens relative to capture teardown.
        debug!("session renderer disposed");
    }
}
