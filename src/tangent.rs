//! Per-vertex tangent-space bases for quad meshes.
//!
//! Vertices are consumed in groups of four, one quad face per group, laid out
//! as a strip: vertex 0 and 1 form the leading edge of a face and vertex 2 and
//! 3 its trailing edge, which is the leading edge of the next face.
//!
//! For a face starting at index `i`:
//!
//! - tangent `s = normalize(p[i+3] - p[i])`
//! - bitangent `t = normalize(p[i+1] - p[i])`
//! - normal `n = s × t`
//!
//! The basis is written to `i` and `i+1`, and also to `i-1` and `i-2`: the
//! trailing edge of the previous face takes the basis of the face that follows
//! it. Once every face has been visited, the last two vertices copy the bases
//! of the first two, closing the seam of a cyclic strip such as a cylinder wall.
//! The order matters; the seam copy must run after the full pass.

use crate::math::{Basis, cross, normalize};
use crate::mesh::{MeshError, Vertex};

/// Number of vertices per quad face.
pub const QUAD_VERTICES: usize = 4;

/// Largest vertex count whose indices all fit in a `u32` index buffer.
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Checks that `vertex_count` describes a non-empty list of quads that can be
/// indexed with `u32`.
pub fn validate_quad_count(vertex_count: usize) -> Result<(), MeshError> {
    if vertex_count == 0 {
        return Err(MeshError::Empty);
    }
    if vertex_count > MAX_VERTICES {
        return Err(MeshError::TooManyVertices { vertex_count });
    }
    if vertex_count % QUAD_VERTICES != 0 {
        return Err(MeshError::NotQuads { vertex_count });
    }
    Ok(())
}

/// Computes the basis of one quad face.
pub fn face_basis(face: &[Vertex; QUAD_VERTICES]) -> Basis {
    let mut s = face[3].position - face[0].position;
    let mut t = face[1].position - face[0].position;
    normalize(&mut s);
    normalize(&mut t);
    let n = cross(s, t);
    Basis::new(s, t, n)
}

/// Fills in the basis of every vertex.
///
/// Fails without touching any vertex when the count is zero or not a multiple
/// of four.
pub fn compute_tangent_bases(vertices: &mut [Vertex]) -> Result<(), MeshError> {
    validate_quad_count(vertices.len())?;

    for i in (0..vertices.len()).step_by(QUAD_VERTICES) {
        let face = [vertices[i], vertices[i + 1], vertices[i + 2], vertices[i + 3]];
        let basis = face_basis(&face);

        vertices[i].basis = basis;
        vertices[i + 1].basis = basis;
        if i > 0 {
            vertices[i - 1].basis = basis;
            vertices[i - 2].basis = basis;
        }
    }

    let n = vertices.len();
    vertices[n - 1].basis = vertices[0].basis;
    vertices[n - 2].basis = vertices[1].basis;

    log::debug!(
        "computed tangent bases for {} faces",
        vertices.len() / QUAD_VERTICES
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::dot;
    use crate::mesh::Object;
    use glam::{Vec2, Vec3};

    const EPS: f32 = 1e-5;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(Vec3::new(x, y, z), Vec2::ZERO)
    }

    /// A flat quad in the XY plane, wound like a cylinder segment.
    fn flat_quad(x0: f32, x1: f32) -> [Vertex; 4] {
        [
            vertex(x0, 1.0, 0.0),
            vertex(x0, -1.0, 0.0),
            vertex(x1, -1.0, 0.0),
            vertex(x1, 1.0, 0.0),
        ]
    }

    #[test]
    fn single_face_basis() {
        let mut verts = flat_quad(0.0, 2.0);
        compute_tangent_bases(&mut verts).unwrap();

        let expected = Basis::new(Vec3::X, Vec3::NEG_Y, Vec3::NEG_Z);
        assert_eq!(face_basis(&flat_quad(0.0, 2.0)), expected);
        for v in &verts {
            assert_eq!(v.basis, expected);
        }
    }

    #[test]
    fn rejects_counts_that_are_not_quads() {
        for count in [1, 2, 3, 5, 6, 7, 9, 11] {
            let mut verts = vec![vertex(0.0, 0.0, 0.0); count];
            assert_eq!(
                compute_tangent_bases(&mut verts),
                Err(MeshError::NotQuads {
                    vertex_count: count
                })
            );
            // Nothing was written.
            assert!(verts.iter().all(|v| v.basis == Basis::IDENTITY));
        }
        assert_eq!(compute_tangent_bases(&mut []), Err(MeshError::Empty));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn counts_past_u32_indices_are_rejected() {
        assert!(validate_quad_count(1 << 31).is_ok());
        let vertex_count = MAX_VERTICES + 1;
        assert_eq!(vertex_count % QUAD_VERTICES, 0);
        assert_eq!(
            validate_quad_count(vertex_count),
            Err(MeshError::TooManyVertices { vertex_count })
        );
    }

    #[test]
    fn trailing_vertices_take_the_next_face_basis() {
        // Two faces of a strip that bends at x = 1.
        let mut verts: Vec<Vertex> = flat_quad(0.0, 1.0).into();
        verts.extend([
            vertex(1.0, 1.0, 0.0),
            vertex(1.0, -1.0, 0.0),
            vertex(1.0, -1.0, 1.0),
            vertex(1.0, 1.0, 1.0),
        ]);
        compute_tangent_bases(&mut verts).unwrap();

        let second = face_basis(&[verts[4], verts[5], verts[6], verts[7]]);
        assert_eq!(second.tangent, Vec3::Z);
        assert_eq!(verts[2].basis, second);
        assert_eq!(verts[3].basis, second);
        assert_eq!(verts[4].basis, second);
        assert_eq!(verts[5].basis, second);

        // The seam copy wraps the first face back onto the last two vertices.
        assert_eq!(verts[7].basis, verts[0].basis);
        assert_eq!(verts[6].basis, verts[1].basis);
        assert_eq!(verts[0].basis.tangent, Vec3::X);
    }

    #[test]
    fn closed_cylinder_shares_bases_across_edges_and_seam() {
        for segments in [2, 3, 8, 30] {
            let cylinder = Object::cylinder(segments).unwrap();
            let v = cylinder.vertices();
            let n = v.len();
            assert_eq!(n, segments as usize * 4);

            for face in 1..segments as usize {
                let i = face * 4;
                assert_eq!(v[i - 1].basis, v[i].basis);
                assert_eq!(v[i - 2].basis, v[i + 1].basis);
            }
            assert_eq!(v[n - 1].basis, v[0].basis);
            assert_eq!(v[n - 2].basis, v[1].basis);
        }
    }

    #[test]
    fn cylinder_bases_are_orthonormal_and_face_outwards() {
        let cylinder = Object::default_cylinder().unwrap();
        for v in cylinder.vertices() {
            let b = v.basis;
            assert!((b.tangent.length() - 1.0).abs() < EPS);
            assert!((b.bitangent.length() - 1.0).abs() < EPS);
            assert!((b.normal.length() - 1.0).abs() < EPS);
            assert!(dot(b.tangent, b.bitangent).abs() < EPS);
            assert!(dot(b.tangent, b.normal).abs() < EPS);

            // Bitangent runs down the wall, normal points away from the axis.
            assert!((b.bitangent - Vec3::NEG_Y).length() < EPS);
            let radial = Vec3::new(v.position.x, 0.0, v.position.z);
            assert!(dot(b.normal, radial) > 0.9);
        }
    }
}
