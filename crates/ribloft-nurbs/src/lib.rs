#![warn(missing_docs)]

//! B-spline curve evaluation and fitting for the ribloft core.
//!
//! A single [`BSplineCurve`] type carries the decomposed control-point
//! representation the rib pipeline blends pole-wise: poles, distinct knots
//! with multiplicities, degree, weights, and the periodic flag. Evaluation
//! uses De Boor's algorithm in homogeneous coordinates; fitting a curve
//! through sample points uses global interpolation with chord-length
//! parameterization.

use nalgebra::DMatrix;
use ribloft_geom::Curve3d;
use ribloft_math::{Point3, Vec3};

// =============================================================================
// Knot vector utilities
// =============================================================================

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, clamped to the valid
/// range; `t` at the end of the domain maps to the last valid span.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Compute the `degree + 1` non-zero basis function values at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            if denom.abs() < 1e-30 {
                // Zero-length knot interval
                n[j] = saved;
                continue;
            }
            let temp = n[r] / denom;
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Collapse a flat knot vector into distinct values + multiplicities.
fn compress_knots(flat: &[f64]) -> (Vec<f64>, Vec<u32>) {
    let mut knots = Vec::new();
    let mut mults = Vec::new();
    for &k in flat {
        match knots.last() {
            Some(&last) if (k - last) < 1e-12 => {
                *mults.last_mut().unwrap() += 1;
            }
            _ => {
                knots.push(k);
                mults.push(1);
            }
        }
    }
    (knots, mults)
}

// =============================================================================
// B-spline curve
// =============================================================================

/// A (possibly rational, possibly periodic) B-spline curve in 3D.
///
/// Knots are stored as distinct values with multiplicities, mirroring the
/// decomposed representation the blending pipeline preserves when it
/// rebuilds a curve from blended poles.
#[derive(Debug, Clone)]
pub struct BSplineCurve {
    /// Control points.
    pub poles: Vec<Point3>,
    /// One weight per pole; all 1.0 for a non-rational curve.
    pub weights: Vec<f64>,
    /// Distinct knot values, strictly increasing.
    pub knots: Vec<f64>,
    /// Multiplicity of each distinct knot.
    pub mults: Vec<u32>,
    /// Polynomial degree.
    pub degree: usize,
    /// True when the curve closes smoothly and pole indices wrap.
    pub periodic: bool,
}

impl BSplineCurve {
    /// Build a curve from its full decomposed representation.
    ///
    /// # Panics
    /// Panics if the expanded knot count does not match the pole count for
    /// a non-periodic curve, or if weights/poles lengths differ.
    pub fn from_poles_mults_knots(
        poles: Vec<Point3>,
        mults: Vec<u32>,
        knots: Vec<f64>,
        periodic: bool,
        degree: usize,
        weights: Vec<f64>,
    ) -> Self {
        assert_eq!(poles.len(), weights.len(), "one weight per pole required");
        assert_eq!(knots.len(), mults.len(), "one multiplicity per knot");
        let total: u32 = mults.iter().sum();
        if !periodic {
            assert_eq!(
                total as usize,
                poles.len() + degree + 1,
                "knot count {} does not match {} poles of degree {}",
                total,
                poles.len(),
                degree
            );
        }
        Self {
            poles,
            weights,
            knots,
            mults,
            degree,
            periodic,
        }
    }

    /// Clamped uniform non-rational curve over the given poles.
    pub fn clamped_uniform(poles: Vec<Point3>, degree: usize) -> Self {
        let n = poles.len();
        assert!(n > degree, "need more poles than the degree");
        let n_internal = n - degree - 1;
        let mut knots = vec![0.0];
        let mut mults = vec![degree as u32 + 1];
        for i in 1..=n_internal {
            knots.push(i as f64 / (n_internal + 1) as f64);
            mults.push(1);
        }
        knots.push(1.0);
        mults.push(degree as u32 + 1);
        let weights = vec![1.0; n];
        Self::from_poles_mults_knots(poles, mults, knots, false, degree, weights)
    }

    /// Straight line segment as a degree-1 curve over `[0, 1]`.
    pub fn line(start: Point3, end: Point3) -> Self {
        Self::clamped_uniform(vec![start, end], 1)
    }

    /// Degree-1 curve through a point sequence (a polyline).
    pub fn polyline(points: Vec<Point3>) -> Self {
        assert!(points.len() >= 2);
        Self::clamped_uniform(points, 1)
    }

    /// Expanded (flat) knot vector.
    pub fn flat_knots(&self) -> Vec<f64> {
        let mut flat = Vec::new();
        for (&k, &m) in self.knots.iter().zip(self.mults.iter()) {
            for _ in 0..m {
                flat.push(k);
            }
        }
        flat
    }

    /// True when any weight differs from 1.
    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|w| (w - 1.0).abs() > 1e-12)
    }

    /// Number of poles.
    pub fn num_poles(&self) -> usize {
        self.poles.len()
    }

    /// Parameter domain `(t_min, t_max)`.
    pub fn parameter_domain(&self) -> (f64, f64) {
        let flat = self.flat_knots();
        let last = flat.len() - self.degree - 1;
        (flat[self.degree], flat[last])
    }

    /// Evaluate the curve at parameter `t` using De Boor's algorithm in
    /// homogeneous coordinates. Pole indices wrap on periodic curves.
    pub fn eval(&self, t: f64) -> Point3 {
        let flat = self.flat_knots();
        let n = flat.len() - self.degree - 2;
        let t = t.clamp(flat[self.degree], flat[n + 1]);
        let span = find_span(&flat, n, self.degree, t);
        let basis = basis_functions(&flat, span, self.degree, t);

        let mut hx = 0.0;
        let mut hy = 0.0;
        let mut hz = 0.0;
        let mut hw = 0.0;
        for (i, &b) in basis.iter().enumerate() {
            let idx = (span - self.degree + i) % self.poles.len();
            let w = self.weights[idx];
            let p = &self.poles[idx];
            hx += b * w * p.x;
            hy += b * w * p.y;
            hz += b * w * p.z;
            hw += b * w;
        }
        if hw.abs() < 1e-30 {
            Point3::origin()
        } else {
            Point3::new(hx / hw, hy / hw, hz / hw)
        }
    }

    /// Fit a curve through the given sample points.
    ///
    /// Global interpolation with chord-length parameterization and averaged
    /// knots; the solved curve passes through every sample. Degree is 3,
    /// reduced when fewer points are supplied.
    pub fn approximate(points: &[Point3]) -> Self {
        let n = points.len();
        assert!(n >= 2, "need at least two points to fit a curve");
        let degree = 3.min(n - 1);

        // Chord-length parameters
        let mut params = vec![0.0; n];
        let mut total = 0.0;
        for k in 1..n {
            total += (points[k] - points[k - 1]).norm();
        }
        if total < 1e-12 {
            // All points coincident; any parameterization works
            for (k, p) in params.iter_mut().enumerate() {
                *p = k as f64 / (n - 1) as f64;
            }
        } else {
            let mut acc = 0.0;
            for k in 1..n {
                acc += (points[k] - points[k - 1]).norm();
                params[k] = acc / total;
            }
            params[n - 1] = 1.0;
        }

        // Averaged knot vector (clamped)
        let mut flat = vec![0.0; degree + 1];
        for j in 1..(n - degree) {
            let avg: f64 = params[j..j + degree].iter().sum::<f64>() / degree as f64;
            flat.push(avg);
        }
        flat.extend(std::iter::repeat(1.0).take(degree + 1));

        // Solve the collocation system N * P = Q per coordinate
        let last = n - 1;
        let mut mat = DMatrix::<f64>::zeros(n, n);
        for (k, &u) in params.iter().enumerate() {
            let span = find_span(&flat, last, degree, u);
            let basis = basis_functions(&flat, span, degree, u);
            for (i, &b) in basis.iter().enumerate() {
                mat[(k, span - degree + i)] = b;
            }
        }
        let mut rhs = DMatrix::<f64>::zeros(n, 3);
        for (k, p) in points.iter().enumerate() {
            rhs[(k, 0)] = p.x;
            rhs[(k, 1)] = p.y;
            rhs[(k, 2)] = p.z;
        }
        let lu = mat.lu();
        let sol = lu
            .solve(&rhs)
            .unwrap_or_else(|| DMatrix::from_fn(n, 3, |r, c| rhs[(r, c)]));

        let poles: Vec<Point3> = (0..n)
            .map(|i| Point3::new(sol[(i, 0)], sol[(i, 1)], sol[(i, 2)]))
            .collect();
        let (knots, mults) = compress_knots(&flat);
        Self::from_poles_mults_knots(poles, mults, knots, false, degree, vec![1.0; n])
    }
}

impl Curve3d for BSplineCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        self.eval(t)
    }

    fn domain(&self) -> (f64, f64) {
        self.parameter_domain()
    }

    fn clone_box(&self) -> Box<dyn Curve3d> {
        Box::new(self.clone())
    }
}

// =============================================================================
// B-spline surface
// =============================================================================

/// A non-rational tensor-product B-spline surface.
///
/// Used as the skinned patch a loft produces: each row of the control grid
/// is one rib cross-section. Control points are stored row-major:
/// `control[v_idx * n_u + u_idx]`.
#[derive(Debug, Clone)]
pub struct BSplineSurface {
    /// Control points in row-major order.
    pub control: Vec<Point3>,
    /// Number of control points in the u direction (along a rib).
    pub n_u: usize,
    /// Number of control points in the v direction (across ribs).
    pub n_v: usize,
    /// Flat knot vector in u.
    pub knots_u: Vec<f64>,
    /// Flat knot vector in v.
    pub knots_v: Vec<f64>,
    /// Degree in u.
    pub degree_u: usize,
    /// Degree in v.
    pub degree_v: usize,
}

fn clamped_uniform_knots(n: usize, degree: usize) -> Vec<f64> {
    let n_internal = n - degree - 1;
    let mut knots = vec![0.0; degree + 1];
    for i in 1..=n_internal {
        knots.push(i as f64 / (n_internal + 1) as f64);
    }
    knots.extend(std::iter::repeat(1.0).take(degree + 1));
    knots
}

impl BSplineSurface {
    /// Skin a surface over a grid of section rows.
    ///
    /// Every row must have the same point count. Degrees are capped by the
    /// available point counts; knot vectors are clamped uniform.
    ///
    /// # Panics
    /// Panics on fewer than 2 rows, empty rows, or ragged rows.
    pub fn skinned(rows: &[Vec<Point3>], degree_u: usize, degree_v: usize) -> Self {
        assert!(rows.len() >= 2, "need at least two rows to skin");
        let n_u = rows[0].len();
        assert!(n_u >= 2, "need at least two points per row");
        assert!(
            rows.iter().all(|r| r.len() == n_u),
            "all rows must have the same point count"
        );
        let n_v = rows.len();
        let degree_u = degree_u.min(n_u - 1).max(1);
        let degree_v = degree_v.min(n_v - 1).max(1);
        let control: Vec<Point3> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self {
            control,
            n_u,
            n_v,
            knots_u: clamped_uniform_knots(n_u, degree_u),
            knots_v: clamped_uniform_knots(n_v, degree_v),
            degree_u,
            degree_v,
        }
    }

    fn cp(&self, u_idx: usize, v_idx: usize) -> &Point3 {
        &self.control[v_idx * self.n_u + u_idx]
    }

    /// Evaluate the surface at `(u, v)` using tensor-product De Boor.
    pub fn eval(&self, u: f64, v: f64) -> Point3 {
        let nu = self.n_u - 1;
        let nv = self.n_v - 1;
        let u = u.clamp(self.knots_u[self.degree_u], self.knots_u[nu + 1]);
        let v = v.clamp(self.knots_v[self.degree_v], self.knots_v[nv + 1]);

        let span_u = find_span(&self.knots_u, nu, self.degree_u, u);
        let span_v = find_span(&self.knots_v, nv, self.degree_v, v);
        let basis_u = basis_functions(&self.knots_u, span_u, self.degree_u, u);
        let basis_v = basis_functions(&self.knots_v, span_v, self.degree_v, v);

        let mut point = Point3::origin();
        for (j, &bv) in basis_v.iter().enumerate() {
            let v_idx = span_v - self.degree_v + j;
            for (i, &bu) in basis_u.iter().enumerate() {
                let u_idx = span_u - self.degree_u + i;
                let w = bu * bv;
                let cp = self.cp(u_idx, v_idx);
                point.x += w * cp.x;
                point.y += w * cp.y;
                point.z += w * cp.z;
            }
        }
        point
    }

    /// Finite-difference surface normal at `(u, v)`.
    pub fn normal(&self, u: f64, v: f64) -> Vec3 {
        let du = 1e-6;
        let dv = 1e-6;
        let p0 = self.eval(u, v);
        let pu = self.eval((u + du).min(1.0), v);
        let pv = self.eval(u, (v + dv).min(1.0));
        let n = (pu - p0).cross(&(pv - p0));
        if n.norm() < 1e-15 {
            Vec3::z()
        } else {
            n.normalize()
        }
    }
}
