//! CPU-side quad meshes with per-vertex tangent-space bases.
//!
//! This module provides the geometry the tangent pipeline works on:
//!
//! - [`Vertex`]: position, texture coordinate and tangent-space [`Basis`]
//! - [`Object`]: an owned, ordered list of vertices where every four
//!   consecutive vertices form one quad face
//! - [`MeshError`]: raised when a mesh does not describe whole quads
//!
//! # Building meshes
//!
//! Vertices are appended one at a time, then the bases are computed once:
//!
//! ```
//! use normalmap::{Object, Vertex, Vec2, Vec3};
//!
//! let mut quad = Object::new();
//! quad.add_vertex(Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 0.0)));
//! quad.add_vertex(Vertex::new(Vec3::new(0.0, -1.0, 0.0), Vec2::new(0.0, 1.0)));
//! quad.add_vertex(Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec2::new(1.0, 1.0)));
//! quad.add_vertex(Vertex::new(Vec3::new(1.0, 1.0, 0.0), Vec2::new(1.0, 0.0)));
//! quad.compute_tangent_bases().unwrap();
//!
//! assert_eq!(quad.face_count(), 1);
//! ```
//!
//! The demo itself only ever draws [`Object::default_cylinder`].

use std::f32::consts::TAU;

use crate::math::Basis;
use crate::tangent::{self, QUAD_VERTICES};
use glam::{Vec2, Vec3};

/// Segment count of the demo cylinder (12° per face).
pub const DEFAULT_CYLINDER_SEGMENTS: u32 = 30;

/// Errors that can occur while building a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh has no vertices.
    Empty,
    /// The vertex count is not a multiple of four.
    NotQuads { vertex_count: usize },
    /// A procedural generator was asked for zero segments.
    NoSegments,
    /// More vertices than a `u32` index buffer can address.
    TooManyVertices { vertex_count: usize },
}

impl std::fmt::Display for MeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::Empty => write!(f, "mesh has no vertices"),
            MeshError::NotQuads { vertex_count } => write!(
                f,
                "bad vertex count ({}): quad meshes need a multiple of {}",
                vertex_count, QUAD_VERTICES
            ),
            MeshError::NoSegments => write!(f, "cylinder needs at least one segment"),
            MeshError::TooManyVertices { vertex_count } => write!(
                f,
                "too many vertices ({}): at most {} can be indexed",
                vertex_count,
                tangent::MAX_VERTICES
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// A mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Model-space position.
    pub position: Vec3,
    /// Texture coordinate shared by the color texture and the normal map.
    pub texcoord: Vec2,
    /// Tangent-space basis, identity until [`Object::compute_tangent_bases`] runs.
    pub basis: Basis,
}

impl Vertex {
    pub fn new(position: Vec3, texcoord: Vec2) -> Self {
        Self {
            position,
            texcoord,
            basis: Basis::IDENTITY,
        }
    }
}

/// A quad-faced mesh that owns its vertices.
#[derive(Clone, Debug, Default)]
pub struct Object {
    /// Object origin. Geometry is drawn without offsetting by it.
    pub position: Vec3,
    vertices: Vec<Vertex>,
}

impl Object {
    /// Creates an empty object at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex after all existing ones.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of complete quad faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / QUAD_VERTICES
    }

    /// Computes the tangent-space basis of every vertex.
    ///
    /// See [`crate::tangent`] for the sharing policy between adjacent faces.
    pub fn compute_tangent_bases(&mut self) -> Result<(), MeshError> {
        tangent::compute_tangent_bases(&mut self.vertices)
    }

    /// Generates the wall of a closed cylinder with radius 1 spanning
    /// `y = -1..1`, with its tangent bases already computed.
    ///
    /// Each segment is one quad, emitted top-left, bottom-left, bottom-right,
    /// top-right when seen from outside. Texture `s` wraps once around the
    /// cylinder, `t` runs from the top (0) to the bottom (1).
    pub fn cylinder(segments: u32) -> Result<Self, MeshError> {
        if segments == 0 {
            return Err(MeshError::NoSegments);
        }
        // Checked before allocating anything.
        tangent::validate_quad_count((segments as usize).saturating_mul(QUAD_VERTICES))?;

        let step = TAU / segments as f32;
        let s_step = 1.0 / segments as f32;
        let mut obj = Object::new();

        for k in 0..segments {
            let (s1, c1) = (k as f32 * step).sin_cos();
            let (s2, c2) = ((k + 1) as f32 * step).sin_cos();
            let s = k as f32 * s_step;

            obj.add_vertex(Vertex::new(Vec3::new(c1, 1.0, s1), Vec2::new(s, 0.0)));
            obj.add_vertex(Vertex::new(Vec3::new(c1, -1.0, s1), Vec2::new(s, 1.0)));
            obj.add_vertex(Vertex::new(
                Vec3::new(c2, -1.0, s2),
                Vec2::new(s + s_step, 1.0),
            ));
            obj.add_vertex(Vertex::new(
                Vec3::new(c2, 1.0, s2),
                Vec2::new(s + s_step, 0.0),
            ));
        }

        obj.compute_tangent_bases()?;
        Ok(obj)
    }

    /// The cylinder drawn by the demo.
    pub fn default_cylinder() -> Result<Self, MeshError> {
        Self::cylinder(DEFAULT_CYLINDER_SEGMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_object_is_empty_at_origin() {
        let obj = Object::new();
        assert!(obj.is_empty());
        assert_eq!(obj.position, Vec3::ZERO);
        assert_eq!(obj.face_count(), 0);
    }

    #[test]
    fn add_vertex_preserves_order() {
        let mut obj = Object::new();
        for i in 0..10 {
            obj.add_vertex(Vertex::new(Vec3::splat(i as f32), Vec2::ZERO));
        }
        assert_eq!(obj.len(), 10);
        for (i, v) in obj.vertices().iter().enumerate() {
            assert_eq!(v.position, Vec3::splat(i as f32));
            assert_eq!(v.basis, Basis::IDENTITY);
        }
    }

    #[test]
    fn compute_bases_rejects_partial_quads() {
        let mut obj = Object::new();
        for _ in 0..6 {
            obj.add_vertex(Vertex::new(Vec3::ZERO, Vec2::ZERO));
        }
        assert_eq!(
            obj.compute_tangent_bases(),
            Err(MeshError::NotQuads { vertex_count: 6 })
        );
        assert_eq!(Object::new().compute_tangent_bases(), Err(MeshError::Empty));
    }

    #[test]
    fn default_cylinder_layout() {
        let cylinder = Object::default_cylinder().unwrap();
        assert_eq!(cylinder.len(), 120);
        assert_eq!(cylinder.face_count(), 30);

        for v in cylinder.vertices() {
            let radius = Vec2::new(v.position.x, v.position.z).length();
            assert!((radius - 1.0).abs() < 1e-5);
            assert!(v.position.y == 1.0 || v.position.y == -1.0);
            // Top row samples t = 0, bottom row t = 1.
            assert_eq!(v.texcoord.y, if v.position.y > 0.0 { 0.0 } else { 1.0 });
        }

        let first = &cylinder.vertices()[0];
        assert_eq!(first.position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(first.texcoord, Vec2::ZERO);
        let last = &cylinder.vertices()[119];
        assert!((last.texcoord.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_segment_cylinder_is_rejected() {
        assert_eq!(Object::cylinder(0).unwrap_err(), MeshError::NoSegments);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_cylinder_is_rejected_before_building() {
        let segments = u32::MAX / 2;
        assert_eq!(
            Object::cylinder(segments).unwrap_err(),
            MeshError::TooManyVertices {
                vertex_count: segments as usize * 4
            }
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            MeshError::NotQuads { vertex_count: 7 }.to_string(),
            "bad vertex count (7): quad meshes need a multiple of 4"
        );
    }
}
