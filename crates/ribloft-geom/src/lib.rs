#![warn(missing_docs)]

//! Parametric curve and plane geometry for the ribloft core.
//!
//! Provides the [`Curve3d`] trait the rest of the pipeline consumes,
//! the [`Plane`] type, and plane–curve intersection by sampling with
//! bisection refinement.

use ribloft_math::{BoundBox3, Dir3, Point3, Vec3, EPSILON};

/// Sampling density multiplier for arc-length tables and intersection scans.
const SCAN_SAMPLES: usize = 64;

// =============================================================================
// Curve trait
// =============================================================================

/// A parametric curve in 3D space.
///
/// Arc-length queries and discretization have sampling-based default
/// implementations; analytic curves may override them.
pub trait Curve3d: Send + Sync + std::fmt::Debug {
    /// Evaluate the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// Tangent vector at parameter `t` (not normalized).
    fn tangent(&self, t: f64) -> Vec3 {
        let (t_min, t_max) = self.domain();
        let dt = (t_max - t_min) * 1e-7;
        let p0 = self.evaluate((t - dt).max(t_min));
        let p1 = self.evaluate((t + dt).min(t_max));
        (p1 - p0) / (2.0 * dt)
    }

    /// Parameter domain as `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Approximate arc length over the whole domain.
    fn length(&self) -> f64 {
        arc_length_table(self).last().map(|e| e.1).unwrap_or(0.0)
    }

    /// Parameter at the given arc length from the start of the domain.
    ///
    /// The length is clamped to `[0, total]`.
    fn parameter_by_length(&self, len: f64) -> f64 {
        let table = arc_length_table(self);
        let total = table.last().map(|e| e.1).unwrap_or(0.0);
        let target = len.clamp(0.0, total);
        for pair in table.windows(2) {
            let (t0, l0) = pair[0];
            let (t1, l1) = pair[1];
            if target <= l1 {
                if l1 - l0 < EPSILON {
                    return t0;
                }
                let f = (target - l0) / (l1 - l0);
                return t0 + f * (t1 - t0);
            }
        }
        self.domain().1
    }

    /// Discretize into `n` points evenly spaced by arc length,
    /// including both endpoints. `n` must be at least 2.
    fn discretize(&self, n: usize) -> Vec<Point3> {
        debug_assert!(n >= 2);
        let total = self.length();
        (0..n)
            .map(|i| {
                let len = total * i as f64 / (n - 1) as f64;
                self.evaluate(self.parameter_by_length(len))
            })
            .collect()
    }

    /// Tight axis-aligned bound of a dense sampling of the curve.
    fn bounds(&self) -> BoundBox3 {
        let (t_min, t_max) = self.domain();
        let mut bb = BoundBox3::empty();
        for i in 0..=SCAN_SAMPLES {
            let t = t_min + (t_max - t_min) * i as f64 / SCAN_SAMPLES as f64;
            bb.grow(&self.evaluate(t));
        }
        bb
    }

    /// Clone this curve into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Curve3d>;
}

impl Clone for Box<dyn Curve3d> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Cumulative chord-length table over a uniform parameter sampling.
fn arc_length_table(curve: &(impl Curve3d + ?Sized)) -> Vec<(f64, f64)> {
    let (t_min, t_max) = curve.domain();
    arc_length_table_between(curve, t_min, t_max)
}

fn arc_length_table_between(
    curve: &(impl Curve3d + ?Sized),
    t_min: f64,
    t_max: f64,
) -> Vec<(f64, f64)> {
    let mut table = Vec::with_capacity(SCAN_SAMPLES + 1);
    let mut acc = 0.0;
    let mut prev = curve.evaluate(t_min);
    table.push((t_min, 0.0));
    for i in 1..=SCAN_SAMPLES {
        let t = t_min + (t_max - t_min) * i as f64 / SCAN_SAMPLES as f64;
        let p = curve.evaluate(t);
        acc += (p - prev).norm();
        table.push((t, acc));
        prev = p;
    }
    table
}

/// Arc length of a curve restricted to `[t_min, t_max]`.
pub fn length_between(curve: &dyn Curve3d, t_min: f64, t_max: f64) -> f64 {
    arc_length_table_between(curve, t_min, t_max)
        .last()
        .map(|e| e.1)
        .unwrap_or(0.0)
}

/// Parameter at the given arc length measured from `t_min`, restricted to
/// `[t_min, t_max]`.
pub fn parameter_by_length_between(curve: &dyn Curve3d, t_min: f64, t_max: f64, len: f64) -> f64 {
    let table = arc_length_table_between(curve, t_min, t_max);
    let total = table.last().map(|e| e.1).unwrap_or(0.0);
    let target = len.clamp(0.0, total);
    for pair in table.windows(2) {
        let (t0, l0) = pair[0];
        let (t1, l1) = pair[1];
        if target <= l1 {
            if l1 - l0 < EPSILON {
                return t0;
            }
            let f = (target - l0) / (l1 - l0);
            return t0 + f * (t1 - t0);
        }
    }
    t_max
}

/// Discretize `[t_min, t_max]` into `n` points evenly spaced by arc length,
/// including both endpoints.
pub fn discretize_between(curve: &dyn Curve3d, t_min: f64, t_max: f64, n: usize) -> Vec<Point3> {
    debug_assert!(n >= 2);
    let total = length_between(curve, t_min, t_max);
    (0..n)
        .map(|i| {
            let len = total * i as f64 / (n - 1) as f64;
            curve.evaluate(parameter_by_length_between(curve, t_min, t_max, len))
        })
        .collect()
}

// =============================================================================
// Plane
// =============================================================================

/// An infinite plane defined by an origin point and a unit normal.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Origin point on the plane.
    pub origin: Point3,
    /// Unit normal.
    pub normal: Dir3,
}

impl Plane {
    /// Create a plane from origin and (not necessarily unit) normal.
    pub fn new(origin: Point3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: Dir3::new_normalize(normal),
        }
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal.as_ref())
    }

    /// Intersect the infinite line `p + t * dir` with this plane.
    ///
    /// Returns `None` when the line is parallel to the plane (no unique
    /// intersection).
    pub fn intersect_line(&self, p: &Point3, dir: &Vec3) -> Option<Point3> {
        let denom = dir.dot(self.normal.as_ref());
        if denom.abs() < EPSILON {
            return None;
        }
        let t = -self.signed_distance(p) / denom;
        Some(p + dir * t)
    }

    /// Intersect a curve with this plane over the parameter range
    /// `[t_min, t_max]`.
    ///
    /// Scans the signed distance along a uniform sampling and refines every
    /// sign change by bisection. Tangential touches that never cross the
    /// plane contribute nothing, matching how a kernel intersector treats a
    /// degenerate tangency.
    pub fn intersect_curve(
        &self,
        curve: &dyn Curve3d,
        t_min: f64,
        t_max: f64,
    ) -> Vec<(f64, Point3)> {
        let mut hits = Vec::new();
        if t_max - t_min < EPSILON {
            return hits;
        }
        let mut prev_t = t_min;
        let mut prev_d = self.signed_distance(&curve.evaluate(t_min));
        if prev_d.abs() < EPSILON {
            hits.push((t_min, curve.evaluate(t_min)));
        }
        for i in 1..=SCAN_SAMPLES {
            let t = t_min + (t_max - t_min) * i as f64 / SCAN_SAMPLES as f64;
            let d = self.signed_distance(&curve.evaluate(t));
            if d.abs() < EPSILON {
                if prev_d.abs() >= EPSILON {
                    hits.push((t, curve.evaluate(t)));
                }
            } else if prev_d.abs() >= EPSILON && (d > 0.0) != (prev_d > 0.0) {
                let root = self.bisect(curve, prev_t, t);
                hits.push((root, curve.evaluate(root)));
            }
            prev_t = t;
            prev_d = d;
        }
        hits
    }

    /// Bisection refinement of a bracketed plane crossing.
    fn bisect(&self, curve: &dyn Curve3d, mut lo: f64, mut hi: f64) -> f64 {
        let mut d_lo = self.signed_distance(&curve.evaluate(lo));
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let d_mid = self.signed_distance(&curve.evaluate(mid));
            if d_mid.abs() < 1e-12 {
                return mid;
            }
            if (d_mid > 0.0) == (d_lo > 0.0) {
                lo = mid;
                d_lo = d_mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}
