#![warn(missing_docs)]

//! Math types for the ribloft geometry core.
//!
//! Thin wrappers around nalgebra providing the domain types the rib
//! generation pipeline works in: points, vectors, directions, affine
//! transforms, axis-aligned bounding boxes, and tolerance constants.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Geometric epsilon used throughout the pipeline.
///
/// Extents below this are treated as degenerate, and scale factors are
/// floored here on active axes so a collapsed envelope never produces
/// zero-size geometry.
pub const EPSILON: f64 = 1e-7;

/// Linear interpolation between two points.
pub fn lerp_point(a: &Point3, b: &Point3, fraction: f64) -> Point3 {
    a + (b - a) * fraction
}

/// Linear interpolation between two vectors.
pub fn lerp_vec(a: &Vec3, b: &Vec3, fraction: f64) -> Vec3 {
    a + (b - a) * fraction
}

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

    /// Translation by `delta`.
    pub fn translation(delta: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = delta.x;
        m[(1, 3)] = delta.y;
        m[(2, 3)] = delta.z;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)` about the origin.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Non-uniform scale about a pivot point.
    ///
    /// Points at the pivot stay fixed; everything else scales away from or
    /// towards it per axis.
    pub fn scale_about(scale: &Vec3, pivot: &Point3) -> Self {
        let to_origin = Self::translation(&(-pivot.coords));
        let s = Self::scale(scale.x, scale.y, scale.z);
        let back = Self::translation(&pivot.coords);
        back.then(&s).then(&to_origin)
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

    /// Rotation about an axis through an arbitrary point.
    pub fn rotation_about_point(axis: &Dir3, angle: f64, center: &Point3) -> Self {
        let to_origin = Self::translation(&(-center.coords));
        let rot = Self::rotation_about_axis(axis, angle);
        let back = Self::translation(&center.coords);
        back.then(&rot).then(&to_origin)
    }

    /// Compose: apply `other` first, then `self`.
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

/// An axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundBox3 {
    /// Create a box from two corners. The corners are not reordered.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// An empty box: +inf mins, -inf maxes. Growing it with points or
    /// other boxes produces the tight bound.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Tight bound of a point set. Empty input yields [`BoundBox3::empty`].
    pub fn from_points<'a, I: IntoIterator<Item = &'a Point3>>(points: I) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.grow(p);
        }
        bb
    }

    /// Whether the box holds at least one point.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Expand to contain a point.
    pub fn grow(&mut self, p: &Point3) {
        for i in 0..3 {
            if p[i] < self.min[i] {
                self.min[i] = p[i];
            }
            if p[i] > self.max[i] {
                self.max[i] = p[i];
            }
        }
    }

    /// Expand to contain another box.
    pub fn add(&mut self, other: &BoundBox3) {
        self.grow(&other.min);
        self.grow(&other.max);
    }

    /// Extent along axis `i` (0 = x, 1 = y, 2 = z).
    pub fn length(&self, i: usize) -> f64 {
        self.max[i] - self.min[i]
    }

    /// Extent along all three axes.
    pub fn lengths(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Per-axis flags for "this box has a meaningful extent on this axis".
    pub fn active_axes(&self, epsilon: f64) -> [bool; 3] {
        [
            self.length(0) > epsilon,
            self.length(1) > epsilon,
            self.length(2) > epsilon,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_lerp_point() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, -4.0, 2.0);
        let mid = lerp_point(&a, &b, 0.5);
        assert_relative_eq!(mid.x, 5.0);
        assert_relative_eq!(mid.y, -2.0);
        assert_relative_eq!(mid.z, 1.0);
        assert_relative_eq!((lerp_point(&a, &b, 0.0) - a).norm(), 0.0);
        assert_relative_eq!((lerp_point(&a, &b, 1.0) - b).norm(), 0.0);
    }

    #[test]
    fn test_scale_about_pivot() {
        let t = Transform::scale_about(&Vec3::new(2.0, 1.0, 1.0), &Point3::new(1.0, 0.0, 0.0));
        // Pivot stays fixed
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        // A point 1 unit right of the pivot moves to 2 units right
        let q = t.apply_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(q.x, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_point() {
        let axis = Dir3::new_normalize(Vec3::z());
        let center = Point3::new(1.0, 1.0, 0.0);
        let t = Transform::rotation_about_point(&axis, PI / 2.0, &center);
        let p = t.apply_point(&Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boundbox_grow() {
        let mut bb = BoundBox3::empty();
        assert!(!bb.is_valid());
        bb.grow(&Point3::new(1.0, 2.0, 3.0));
        bb.grow(&Point3::new(-1.0, 0.0, 5.0));
        assert!(bb.is_valid());
        assert_relative_eq!(bb.length(0), 2.0);
        assert_relative_eq!(bb.length(1), 2.0);
        assert_relative_eq!(bb.length(2), 2.0);
        assert_relative_eq!(bb.center().z, 4.0);
    }

    #[test]
    fn test_boundbox_active_axes() {
        let bb = BoundBox3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 3.0, 0.0));
        let flags = bb.active_axes(EPSILON);
        assert_eq!(flags, [true, true, false]);
    }

    #[test]
    fn test_transform_vec_ignores_translation() {
        let t = Transform::translation(&Vec3::new(10.0, 0.0, 0.0));
        let v = t.apply_vec(&Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 2.0);
    }
}
