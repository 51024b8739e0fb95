//! Small vector helpers and the per-vertex tangent-space basis.
//!
//! Vectors are [`glam::Vec3`]. The free functions mirror the handful of
//! operations the tangent pipeline needs, so the basis builder and the shading
//! pipeline read the same way the math is written down.
//!
//! # Basis convention
//!
//! A [`Basis`] stores the tangent, bitangent and normal as the *rows* of a 3×3
//! matrix. Transforming a world-space vector by the basis projects it onto each
//! axis, producing its components in tangent space:
//!
//! ```
//! use normalmap::{Basis, Vec3, transform_by_basis};
//!
//! let basis = Basis::new(Vec3::Z, Vec3::NEG_Y, Vec3::X);
//! let v = transform_by_basis(Vec3::new(1.0, 2.0, 3.0), &basis);
//! assert_eq!(v, Vec3::new(3.0, -2.0, 1.0));
//! ```

use glam::Vec3;

/// Dot product of two vectors.
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Cross product `a × b`.
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// Scales `v` to unit length in place.
///
/// There is no zero-length check: normalizing the zero vector produces
/// non-finite components.
pub fn normalize(v: &mut Vec3) {
    let f = 1.0 / dot(*v, *v).sqrt();
    *v *= f;
}

/// Expresses `v` in the frame described by `basis`.
pub fn transform_by_basis(v: Vec3, basis: &Basis) -> Vec3 {
    Vec3::new(
        dot(v, basis.tangent),
        dot(v, basis.bitangent),
        dot(v, basis.normal),
    )
}

/// Tangent-space basis of a vertex: tangent, bitangent and normal as matrix rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    /// Row 0, the direction of increasing texture `s`.
    pub tangent: Vec3,
    /// Row 1, the direction of increasing texture `t`.
    pub bitangent: Vec3,
    /// Row 2, `tangent × bitangent`.
    pub normal: Vec3,
}

impl Default for Basis {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Basis {
    /// The world axes; tangent space equals world space.
    pub const IDENTITY: Self = Self {
        tangent: Vec3::X,
        bitangent: Vec3::Y,
        normal: Vec3::Z,
    };

    pub fn new(tangent: Vec3, bitangent: Vec3, normal: Vec3) -> Self {
        Self {
            tangent,
            bitangent,
            normal,
        }
    }

    /// Transforms a world-space vector into this tangent space.
    pub fn transform(&self, v: Vec3) -> Vec3 {
        transform_by_basis(v, self)
    }

    /// The nine matrix entries in row-major order.
    pub fn to_rows_array(&self) -> [f32; 9] {
        [
            self.tangent.x,
            self.tangent.y,
            self.tangent.z,
            self.bitangent.x,
            self.bitangent.y,
            self.bitangent.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn normalize_yields_unit_length_same_direction() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(120.0, -7.5, 33.0),
        ] {
            let mut n = v;
            normalize(&mut n);
            assert!((n.length() - 1.0).abs() < EPS);
            // Parallel and pointing the same way.
            assert!(cross(n, v).length() < EPS * v.length());
            assert!(dot(n, v) > 0.0);
        }
    }

    #[test]
    fn normalize_zero_vector_is_not_finite() {
        let mut v = Vec3::ZERO;
        normalize(&mut v);
        assert!(!v.is_finite());
    }

    #[test]
    fn cross_is_orthogonal_to_inputs() {
        let pairs = [
            (Vec3::X, Vec3::Y),
            (Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 2.0)),
            (Vec3::new(0.3, -0.9, 0.1), Vec3::new(0.0, 0.0, -1.0)),
        ];
        for (a, b) in pairs {
            let c = cross(a, b);
            assert!(dot(c, a).abs() < EPS);
            assert!(dot(c, b).abs() < EPS);
        }
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
    }

    #[test]
    fn dot_and_cross_agree_with_glam() {
        let a = Vec3::new(1.5, -2.0, 0.25);
        let b = Vec3::new(-0.5, 4.0, 8.0);
        assert!((dot(a, b) - a.dot(b)).abs() < EPS);
        assert!((cross(a, b) - a.cross(b)).length() < EPS);
    }

    #[test]
    fn identity_basis_leaves_vectors_unchanged() {
        let v = Vec3::new(0.2, -1.4, 9.0);
        assert_eq!(Basis::IDENTITY.transform(v), v);
    }

    #[test]
    fn transform_projects_onto_rows() {
        let basis = Basis::new(Vec3::Z, Vec3::NEG_Y, Vec3::X);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(transform_by_basis(v, &basis), Vec3::new(3.0, -2.0, 1.0));
        assert_eq!(basis.transform(v), Vec3::new(3.0, -2.0, 1.0));
    }

    #[test]
    fn rows_array_is_row_major() {
        let basis = Basis::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        assert_eq!(
            basis.to_rows_array(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }
}
