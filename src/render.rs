//! Normal-mapped mesh rendering with depth testing.
//!
//! This module provides [`LitPass`], which draws the scene each frame: the
//! tangent-space lit mesh, then a small unlit cube at every light.
//!
//! # Architecture
//!
//! Both pipelines share two bind groups:
//! - **Group 0**: scene uniforms (view-projection matrix, light colors)
//! - **Group 1**: color texture and normal map with their samplers (lit mesh only)
//!
//! The lit mesh's vertex stream is rebuilt on the CPU every frame by
//! [`emit_object`] and uploaded with `Queue::write_buffer`; its index buffer
//! is built once, since the quad topology never changes.
//!
//! # Shading stage
//!
//! The lit pipelines are compiled from a WGSL file loaded at runtime (see
//! [`ShaderFile`]). The file must define entry points `vs` and `fs` and read
//! the [`LitVertex`] layout. If it cannot be loaded or compiled the mesh is
//! skipped while the light markers still render. Edits to the file are picked
//! up by [`LitPass::check_reload`]; a failed recompile keeps the previous
//! pipelines.
//!
//! # Fill mode
//!
//! Every pipeline exists in a solid variant and, when the adapter supports
//! [`wgpu::PolygonMode::Line`], a wireframe variant. Without line support the
//! solid variant is used for both modes.

use std::path::Path;

use crate::camera::Projection;
use crate::gpu::GpuContext;
use crate::light::LIGHT_COUNT;
use crate::scene::{FillMode, SceneState};
use crate::shader_source::{ShaderError, ShaderFile};
use crate::shading::{LitVertex, LitVertexBuffer, emit_object, quad_indices};
use crate::texture::Texture;

/// Depth buffer format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame uniforms shared by all pipelines.
///
/// # WGSL Declaration
///
/// ```wgsl
/// struct Scene {
///     view_proj: mat4x4f,
///     light_colors: array<vec4f, 3>,
/// }
/// @group(0) @binding(0) var<uniform> scene: Scene;
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// RGBA color of each light, in attribute slot order.
    pub light_colors: [[f32; 4]; LIGHT_COUNT],
}

impl SceneUniforms {
    pub fn new(scene: &SceneState, projection: &Projection, aspect: f32) -> Self {
        let view_proj = projection.matrix(aspect) * scene.camera.view_matrix();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_colors: scene.lights.colors(),
        }
    }
}

/// Vertex of a light marker cube.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl MarkerVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MarkerVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Builds the marker cubes for every light.
pub fn marker_vertices(scene: &SceneState) -> Vec<MarkerVertex> {
    scene
        .lights
        .iter()
        .flat_map(|light| {
            let color = light.color.to_array();
            light.marker_quads().map(|p| MarkerVertex {
                position: p.to_array(),
                color,
            })
        })
        .collect()
}

/// A solid pipeline and its optional wireframe twin.
struct PipelinePair {
    solid: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
}

impl PipelinePair {
    fn select(&self, mode: FillMode) -> &wgpu::RenderPipeline {
        match mode {
            FillMode::Wireframe => self.wireframe.as_ref().unwrap_or(&self.solid),
            FillMode::Solid => &self.solid,
        }
    }
}

/// What varies between the lit and marker pipelines.
struct PipelineDesc<'a> {
    label: &'a str,
    module: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    vertex: wgpu::VertexBufferLayout<'static>,
    cull_mode: Option<wgpu::Face>,
}

fn create_pipeline(
    gpu: &GpuContext,
    desc: &PipelineDesc,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(desc.layout),
            vertex: wgpu::VertexState {
                module: desc.module,
                entry_point: Some("vs"),
                buffers: &[desc.vertex.clone()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: desc.module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

fn create_pipeline_pair(gpu: &GpuContext, desc: &PipelineDesc) -> PipelinePair {
    let solid = create_pipeline(gpu, desc, wgpu::PolygonMode::Fill);
    let wireframe = gpu
        .capabilities
        .polygon_mode_line
        .then(|| create_pipeline(gpu, desc, wgpu::PolygonMode::Line));
    PipelinePair { solid, wireframe }
}

/// Compiles the lit pipelines from WGSL source.
///
/// wgpu reports invalid shaders through its error handler, which panics by
/// default, so compilation runs under `catch_unwind`.
fn compile_lit_pipelines(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    source: &str,
) -> Result<PipelinePair, ShaderError> {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let module = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Lit Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        create_pipeline_pair(
            gpu,
            &PipelineDesc {
                label: "Lit Pipeline",
                module: &module,
                layout,
                vertex: LitVertex::LAYOUT,
                // The cylinder's outside is wound clockwise; cull the inside.
                cull_mode: Some(wgpu::Face::Front),
            },
        )
    }));

    result.map_err(|panic| {
        let msg = panic
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "shader compilation panicked".to_string());
        ShaderError::Compile(msg)
    })
}

/// Draws the lit mesh and the light markers.
pub struct LitPass {
    projection: Projection,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    lit_layout: wgpu::PipelineLayout,
    lit_pipelines: Option<PipelinePair>,
    shader: Option<ShaderFile>,
    marker_pipelines: PipelinePair,
    lit_vertices: LitVertexBuffer,
    lit_vertex_buffer: wgpu::Buffer,
    lit_index_buffer: wgpu::Buffer,
    lit_index_count: u32,
    marker_vertex_buffer: wgpu::Buffer,
    marker_index_buffer: wgpu::Buffer,
    marker_index_count: u32,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    // Kept alive for the bind group.
    #[allow(dead_code)]
    textures: [Texture; 2],
}

impl LitPass {
    /// Creates every GPU resource for `scene`.
    ///
    /// `color` and `normal_map` may be `None` if they failed to load; neutral
    /// stand-ins are bound instead. The shading stage is read from
    /// `shader_path`, limited to `max_shader_bytes`; failures there are logged
    /// and leave the mesh undrawn.
    pub fn new(
        gpu: &GpuContext,
        scene: &SceneState,
        color: Option<Texture>,
        normal_map: Option<Texture>,
        shader_path: &Path,
        max_shader_bytes: usize,
    ) -> Self {
        use wgpu::util::DeviceExt;
        let device = &gpu.device;

        // Scene uniforms (group 0)
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Color texture and normal map (group 1)
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    texture_entry(0),
                    sampler_entry(1),
                    texture_entry(2),
                    sampler_entry(3),
                ],
            });

        let color = color.unwrap_or_else(|| Texture::white(gpu));
        let normal_map = normal_map.unwrap_or_else(|| Texture::flat_normal_map(gpu));

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&color.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&normal_map.sampler),
                },
            ],
        });

        // Lit pipelines, compiled from the external shading stage
        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = match ShaderFile::load(shader_path, max_shader_bytes) {
            Ok(shader) => Some(shader),
            Err(e) => {
                log::error!("unable to load {}: {}", shader_path.display(), e);
                None
            }
        };

        let lit_pipelines = shader.as_ref().and_then(|shader| {
            match compile_lit_pipelines(gpu, &lit_layout, shader.source()) {
                Ok(pipelines) => {
                    log::info!("compiled {}", shader.path().display());
                    Some(pipelines)
                }
                Err(e) => {
                    log::error!("unable to compile {}: {}", shader.path().display(), e);
                    None
                }
            }
        });

        // Marker pipelines, built in
        let marker_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Marker Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/marker.wgsl").into()),
        });

        let marker_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Marker Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let marker_pipelines = create_pipeline_pair(
            gpu,
            &PipelineDesc {
                label: "Marker Pipeline",
                module: &marker_shader,
                layout: &marker_layout,
                vertex: MarkerVertex::LAYOUT,
                cull_mode: None,
            },
        );

        // Geometry
        let vertex_count = scene.object.len();
        let lit_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lit Vertex Buffer"),
            size: (vertex_count * std::mem::size_of::<LitVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let lit_indices = quad_indices(vertex_count);
        let lit_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lit Index Buffer"),
            contents: bytemuck::cast_slice(&lit_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let markers = marker_vertices(scene);
        let marker_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Marker Vertex Buffer"),
            contents: bytemuck::cast_slice(&markers),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let marker_indices = quad_indices(markers.len());
        let marker_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Marker Index Buffer"),
            contents: bytemuck::cast_slice(&marker_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let depth_view = Self::create_depth_view(gpu);

        Self {
            projection: Projection::default(),
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            lit_layout,
            lit_pipelines,
            shader,
            marker_pipelines,
            lit_vertices: LitVertexBuffer::with_capacity(vertex_count),
            lit_vertex_buffer,
            lit_index_buffer,
            lit_index_count: lit_indices.len() as u32,
            marker_vertex_buffer,
            marker_index_buffer,
            marker_index_count: marker_indices.len() as u32,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            textures: [color, normal_map],
        }
    }

    /// Whether the shading stage is loaded and the mesh will be drawn.
    pub fn has_shading_stage(&self) -> bool {
        self.lit_pipelines.is_some()
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Recompiles the shading stage if its file changed on disk.
    pub fn check_reload(&mut self, gpu: &GpuContext) {
        let Some(shader) = self.shader.as_mut() else {
            return;
        };
        if !shader.check_reload() {
            return;
        }

        log::info!("reloading {}", shader.path().display());
        match compile_lit_pipelines(gpu, &self.lit_layout, shader.source()) {
            Ok(pipelines) => {
                self.lit_pipelines = Some(pipelines);
                log::info!("shader compiled successfully");
            }
            Err(e) => log::warn!("{}; keeping previous version", e),
        }
    }

    /// Uploads this frame's uniforms and vertex data.
    fn upload(&mut self, gpu: &GpuContext, scene: &SceneState) {
        let uniforms = SceneUniforms::new(scene, &self.projection, gpu.aspect());
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        self.lit_vertices.clear();
        emit_object(&scene.object, &scene.lights, &mut self.lit_vertices);
        gpu.queue
            .write_buffer(&self.lit_vertex_buffer, 0, self.lit_vertices.as_bytes());

        let markers = marker_vertices(scene);
        gpu.queue.write_buffer(
            &self.marker_vertex_buffer,
            0,
            bytemuck::cast_slice(&markers),
        );
    }

    /// Renders one frame of `scene` to the window surface and presents it.
    pub fn render(&mut self, gpu: &GpuContext, scene: &SceneState) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);
        self.upload(gpu, scene);

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if let Some(pipelines) = &self.lit_pipelines {
                render_pass.set_pipeline(pipelines.select(scene.fill_mode));
                render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.lit_vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.lit_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.lit_index_count, 0, 0..1);
            }

            render_pass.set_pipeline(self.marker_pipelines.select(scene.fill_mode));
            render_pass.set_vertex_buffer(0, self.marker_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.marker_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.marker_index_count, 0, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DEFAULT_CYLINDER_SEGMENTS;
    use glam::Vec3;

    fn scene() -> SceneState {
        SceneState::with_cylinder(DEFAULT_CYLINDER_SEGMENTS).unwrap()
    }

    #[test]
    fn uniforms_carry_light_colors_and_camera() {
        let scene = scene();
        let projection = Projection::default();
        let uniforms = SceneUniforms::new(&scene, &projection, 4.0 / 3.0);

        assert_eq!(uniforms.light_colors, scene.lights.colors());
        let expected = projection.matrix(4.0 / 3.0) * scene.camera.view_matrix();
        assert_eq!(uniforms.view_proj, expected.to_cols_array_2d());
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 112);
    }

    #[test]
    fn one_colored_cube_per_light() {
        let scene = scene();
        let markers = marker_vertices(&scene);
        assert_eq!(markers.len(), LIGHT_COUNT * 24);

        for (light, cube) in scene.lights.iter().zip(markers.chunks(24)) {
            for v in cube {
                assert_eq!(v.color, light.color.to_array());
                let d = Vec3::from(v.position) - light.position();
                assert!(d.abs().max_element() <= crate::light::MARKER_HALF_SIZE + 1e-6);
            }
        }
    }

    #[test]
    fn marker_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<MarkerVertex>(), 28);
        assert_eq!(MarkerVertex::LAYOUT.array_stride, 28);
    }
}
