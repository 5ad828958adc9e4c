use wgpu::util::DeviceExt;
use wgpu::*;

use crate::controller::frame_loop::SceneRenderer;
use crate::error::RenderError;
use crate::model::{Camera, Scene};
use crate::ui;
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::gpu_init::{surface_config, GpuContext};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const SKY: Color = Color { r: 0.53, g: 0.81, b: 0.92, a: 1.0 };

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad: [f32; 3],
}

impl Default for LightingUniform {
    /// Soft white ambient plus one directional light from (10, 10, 10).
    fn default() -> Self {
        Self {
            sun_dir: glam::Vec3::new(10.0, 10.0, 10.0).normalize().to_array(),
            sun_intensity: 0.5,
            ambient: 0.8,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub transform: [[f32; 4]; 4],
}

impl TransformUniform {
    fn new(transform: glam::Mat4) -> Self {
        Self { transform: transform.to_cols_array_2d() }
    }
}

pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub bind_group: BindGroup,
}

/// A mesh on the GPU with its own model transform.
struct DrawObject {
    mesh: MeshBuffer,
    transform_buffer: Buffer,
    bind_group: BindGroup,
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("lighting_buffer"),
        contents: bytemuck::bytes_of(&LightingUniform::default()),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX), uniform_entry(1, ShaderStages::FRAGMENT)],
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, bind_group }
}

pub fn create_scene_pipeline(
    device: &Device,
    format: TextureFormat,
    camera_layout: &BindGroupLayout,
    object_layout: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[camera_layout, object_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::ALPHA_BLENDING), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            // double-sided
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// wgpu backend for the animation loop: the lit scene plus the egui HUD.
pub struct GpuRenderer {
    gpu: GpuContext,
    width: u32,
    height: u32,
    depth_view: TextureView,
    pipeline: RenderPipeline,
    camera: CameraResources,
    object_layout: BindGroupLayout,
    raft: Option<DrawObject>,
    ocean: Option<DrawObject>,
    egui_ctx: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    pixels_per_point: f32,
}

impl GpuRenderer {
    pub fn new(gpu: GpuContext) -> Self {
        let device = gpu.device.as_ref();
        let (width, height) = (gpu.config.width, gpu.config.height);

        let camera = create_camera_resources(device);
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, ShaderStages::VERTEX)],
        });
        let pipeline = create_scene_pipeline(device, gpu.format, &camera.bind_group_layout, &object_layout);
        let (_, depth_view) = create_depth_texture(device, width, height);

        let egui_ctx = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            gpu,
            width,
            height,
            depth_view,
            pipeline,
            camera,
            object_layout,
            raft: None,
            ocean: None,
            egui_ctx,
            egui_renderer,
            pixels_per_point: 1.0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point.max(0.1);
        self.egui_ctx.set_pixels_per_point(self.pixels_per_point);
    }

    fn upload_object(&self, mesh: &Mesh, dynamic: bool, label: &str) -> DrawObject {
        let device = self.gpu.device.as_ref();
        let mesh = if dynamic { mesh.upload_dynamic(device) } else { mesh.upload(device) };

        let transform_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&TransformUniform::new(glam::Mat4::IDENTITY)),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[BindGroupEntry { binding: 0, resource: transform_buffer.as_entire_binding() }],
        });

        DrawObject { mesh, transform_buffer, bind_group }
    }

    /// Bring GPU buffers in line with the scene.
    fn sync_scene(&mut self, scene: &Scene, camera: &Camera) {
        let queue = self.gpu.queue.as_ref();

        let camera_uniform = CameraUniform { view_proj: camera.view_proj().to_cols_array_2d() };
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        match scene.raft() {
            Some(raft) if !raft.mesh.is_empty() => {
                if self.raft.is_none() {
                    tracing::debug!("uploading raft mesh ({} indices)", raft.mesh.indices.len());
                    self.raft = Some(self.upload_object(&raft.mesh, false, "raft"));
                }
                if let Some(object) = &self.raft {
                    let transform = TransformUniform::new(raft.transform());
                    self.gpu.queue.write_buffer(&object.transform_buffer, 0, bytemuck::bytes_of(&transform));
                }
            }
            _ => self.raft = None,
        }

        match &scene.ocean {
            Some(ocean) if !ocean.is_empty() => {
                if self.ocean.is_none() {
                    self.ocean = Some(self.upload_object(&ocean.mesh(), true, "ocean"));
                } else if let Some(object) = self.ocean.as_ref().filter(|_| ocean.is_dirty()) {
                    let vertices = ocean.vertices();
                    self.gpu.queue.write_buffer(&object.mesh.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
                }
            }
            _ => self.ocean = None,
        }
    }

    fn acquire_frame(&mut self) -> Result<SurfaceTexture, RenderError> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
                Ok(self.gpu.surface.get_current_texture()?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SceneRenderer for GpuRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        self.sync_scene(scene, camera);

        let raw_input = ui::raw_input(scene.stats.elapsed, self.width, self.height, self.pixels_per_point);
        let mut full_output = ui::build_hud(&self.egui_ctx, raw_input, scene, camera);
        let egui_primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), self.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: self.pixels_per_point,
        };

        let frame = self.acquire_frame()?;
        let device = self.gpu.device.as_ref();
        let queue = self.gpu.queue.as_ref();

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Clear(SKY), store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.bind_group, &[]);

            for object in [&self.ocean, &self.raft].into_iter().flatten() {
                if object.mesh.index_count == 0 {
                    continue;
                }
                rp.set_bind_group(1, &object.bind_group, &[]);
                rp.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..object.mesh.index_count, 0, 0..1);
            }
        }

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        tracing::debug!("resizing surface to {width}x{height}");

        self.width = width;
        self.height = height;
        self.gpu.config = surface_config(self.gpu.format, self.gpu.config.alpha_mode, width, height);
        self.gpu.surface.configure(&self.gpu.device, &self.gpu.config);
        self.depth_view = create_depth_texture(&self.gpu.device, width, height).1;
    }
}
