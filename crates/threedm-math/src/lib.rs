#![warn(missing_docs)]

//! Math types for the threedm import kernel.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! 3D CAD geometry: points, vectors, directions, placements, and
//! tolerance constants.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position plus axis-angle rotation, as used for placing circle and
/// plane-like primitives in a CAD document.
///
/// The rotation axis is stored unnormalized and may be the zero vector,
/// which encodes "no rotation needed" (the angle is then 0° or 180°).
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Position of the primitive's local origin.
    pub position: Point3,
    /// Rotation axis (not necessarily unit length, may be zero).
    pub axis: Vec3,
    /// Rotation angle in degrees.
    pub angle_deg: f64,
}

impl Placement {
    /// Placement with no rotation.
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            axis: Vec3::zeros(),
            angle_deg: 0.0,
        }
    }

    /// Placement that rotates the world +Z axis onto `normal` and then
    /// translates to `center`.
    ///
    /// Axis = +Z × normal, angle = ∠(+Z, normal) in degrees. When the
    /// normal is parallel to ±Z the cross product vanishes; the axis is
    /// left zero and the angle is 0° or 180°.
    pub fn from_center_normal(center: Point3, normal: Vec3) -> Self {
        let z = Vec3::z();
        let axis = z.cross(&normal);
        let norm = normal.norm();
        let angle_deg = if norm < 1e-30 {
            0.0
        } else {
            (z.dot(&normal) / norm).clamp(-1.0, 1.0).acos().to_degrees()
        };
        Self {
            position: center,
            axis,
            angle_deg,
        }
    }

    /// Convert to an affine transform (rotate, then translate).
    ///
    /// A zero axis with a 180° angle picks an arbitrary in-plane axis so
    /// the flip is still well defined; a zero axis with a 0° angle is a
    /// pure translation.
    pub fn to_transform(&self) -> Transform {
        let translation =
            Transform::translation(self.position.x, self.position.y, self.position.z);
        let angle = self.angle_deg.to_radians();
        if angle.abs() < 1e-12 {
            return translation;
        }
        let axis = if self.axis.norm() < 1e-12 {
            // Normal anti-parallel to +Z: any axis in the XY plane works.
            Dir3::new_normalize(Vec3::x())
        } else {
            Dir3::new_normalize(self.axis)
        };
        translation.then(&Transform::rotation_about_axis(&axis, angle))
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
