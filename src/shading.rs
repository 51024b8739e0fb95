//! Per-frame tangent-space light vectors.
//!
//! Every frame, each vertex of the mesh receives one light vector per light,
//! expressed in that vertex's tangent space. The fragment stage reads them as
//! interpolated per-vertex attributes next to the texture coordinate.
//!
//! The computation talks to the graphics backend only through
//! [`AttributeSink`], so it runs the same against the GPU vertex stream
//! ([`LitVertexBuffer`]) and against a recorder in tests.
//!
//! # Vertex Layout
//!
//! [`LitVertex`] is 56 bytes:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | texcoord  | Float32x2 | 12     | 1               |
//! | light 0   | Float32x3 | 20     | 2               |
//! | light 1   | Float32x3 | 32     | 3               |
//! | light 2   | Float32x3 | 44     | 4               |

use glam::{Vec2, Vec3};

use crate::light::{LIGHT_COUNT, LightRig};
use crate::math::transform_by_basis;
use crate::mesh::{Object, Vertex};
use crate::tangent::QUAD_VERTICES;

/// Receives per-vertex attributes in submission order.
///
/// For each vertex the pipeline sends every light vector, then the texture
/// coordinate, then the position. The position completes the vertex.
pub trait AttributeSink {
    /// Sets the tangent-space light vector for attribute slot `slot`.
    fn light_vector(&mut self, slot: usize, vector: Vec3);
    /// Sets the texture coordinate.
    fn texcoord(&mut self, texcoord: Vec2);
    /// Emits a vertex at `position` with the attributes set so far.
    fn vertex(&mut self, position: Vec3);
}

/// Vector from a vertex to a light, with Y negated.
///
/// The normal map's vertical axis points the opposite way from world-space Y.
pub fn light_direction(light: Vec3, vertex: Vec3) -> Vec3 {
    let d = light - vertex;
    Vec3::new(d.x, -d.y, d.z)
}

/// Tangent-space light vector for one vertex and one light position.
pub fn tangent_light_vector(vertex: &Vertex, light: Vec3) -> Vec3 {
    transform_by_basis(light_direction(light, vertex.position), &vertex.basis)
}

/// Sends every vertex of `object`, lit by `lights`, to `sink`.
pub fn emit_object(object: &Object, lights: &LightRig, sink: &mut impl AttributeSink) {
    for vertex in object.vertices() {
        for (slot, light) in lights.iter().enumerate() {
            sink.light_vector(slot, tangent_light_vector(vertex, light.position()));
        }
        sink.texcoord(vertex.texcoord);
        sink.vertex(vertex.position);
    }
}

/// One vertex of the lit mesh as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub light_vectors: [[f32; 3]; LIGHT_COUNT],
}

impl LitVertex {
    /// Vertex buffer layout matching the table in the module docs.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<LitVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // texcoord
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // light vectors, one slot per light
            wgpu::VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 44,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    /// Number of vertex attributes the layout uses.
    pub const ATTRIBUTE_COUNT: u32 = 2 + LIGHT_COUNT as u32;
}

/// Collects submitted attributes into a [`LitVertex`] list.
///
/// The buffer keeps its allocation between frames; call [`clear`](Self::clear)
/// before re-emitting.
#[derive(Debug, Default)]
pub struct LitVertexBuffer {
    pending: LitVertex,
    vertices: Vec<LitVertex>,
}

impl LitVertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: LitVertex::default(),
            vertices: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.pending = LitVertex::default();
    }

    pub fn vertices(&self) -> &[LitVertex] {
        &self.vertices
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl AttributeSink for LitVertexBuffer {
    fn light_vector(&mut self, slot: usize, vector: Vec3) {
        self.pending.light_vectors[slot] = vector.to_array();
    }

    fn texcoord(&mut self, texcoord: Vec2) {
        self.pending.texcoord = texcoord.to_array();
    }

    fn vertex(&mut self, position: Vec3) {
        self.pending.position = position.to_array();
        self.vertices.push(self.pending);
    }
}

/// Triangle indices drawing every group of four vertices as one quad.
///
/// Each quad `a b c d` becomes `a b c` and `c d a`, keeping its winding. No
/// index ever refers to a vertex of another quad.
///
/// `vertex_count` must not exceed [`MAX_VERTICES`](crate::tangent::MAX_VERTICES), which
/// [`Object`] enforces when its bases are computed.
pub fn quad_indices(vertex_count: usize) -> Vec<u32> {
    (0..(vertex_count / QUAD_VERTICES) as u32)
        .flat_map(|face| {
            let i = face * QUAD_VERTICES as u32;
            [i, i + 1, i + 2, i + 2, i + 3, i]
        })
        .collect()
}
