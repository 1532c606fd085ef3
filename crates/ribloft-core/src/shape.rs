//! Value-level shape model: edges, wires, faces, shells, solids.
//!
//! Everything here is transient data produced by a recompute; nothing is
//! cached or shared between runs.

use ribloft_geom::{discretize_between, length_between, parameter_by_length_between};
use ribloft_math::{BoundBox3, Point3, Transform, Vec3, EPSILON};
use ribloft_nurbs::{BSplineCurve, BSplineSurface};

use crate::error::{Result, RibloftError};

// =============================================================================
// Edge
// =============================================================================

/// A B-spline curve restricted to a parameter range.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The underlying curve.
    pub curve: BSplineCurve,
    /// First parameter of the trimmed range.
    pub first: f64,
    /// Last parameter of the trimmed range.
    pub last: f64,
}

impl Edge {
    /// An edge covering the curve's whole parameter domain.
    pub fn new(curve: BSplineCurve) -> Self {
        let (first, last) = curve.parameter_domain();
        Self { curve, first, last }
    }

    /// An edge over an explicit parameter range.
    pub fn trimmed(curve: BSplineCurve, first: f64, last: f64) -> Self {
        Self { curve, first, last }
    }

    /// A straight edge between two points.
    pub fn line(a: Point3, b: Point3) -> Self {
        Self::new(BSplineCurve::line(a, b))
    }

    /// Point at the start of the trimmed range.
    pub fn start_point(&self) -> Point3 {
        self.curve.eval(self.first)
    }

    /// Point at the end of the trimmed range.
    pub fn end_point(&self) -> Point3 {
        self.curve.eval(self.last)
    }

    /// Arc length over the trimmed range.
    pub fn length(&self) -> f64 {
        length_between(&self.curve, self.first, self.last)
    }

    /// Parameter at the given arc length from the start of the range.
    pub fn parameter_at_length(&self, len: f64) -> f64 {
        parameter_by_length_between(&self.curve, self.first, self.last, len)
    }

    /// `n` points spaced uniformly by arc length, endpoints included.
    pub fn discretize(&self, n: usize) -> Vec<Point3> {
        discretize_between(&self.curve, self.first, self.last, n)
    }

    /// Number of control points of the underlying curve.
    pub fn num_poles(&self) -> usize {
        self.curve.num_poles()
    }

    /// Split the trimmed range into `k` equal parameter sub-ranges.
    pub fn split_equal(&self, k: usize) -> Vec<Edge> {
        let k = k.max(1);
        let step = (self.last - self.first) / k as f64;
        (0..k)
            .map(|i| {
                Edge::trimmed(
                    self.curve.clone(),
                    self.first + i as f64 * step,
                    self.first + (i + 1) as f64 * step,
                )
            })
            .collect()
    }

    /// Apply an affine transform by mapping the control points.
    pub fn transformed(&self, t: &Transform) -> Edge {
        let mut curve = self.curve.clone();
        for p in &mut curve.poles {
            *p = t.apply_point(p);
        }
        Edge {
            curve,
            first: self.first,
            last: self.last,
        }
    }

    /// Axis-aligned bounds of the trimmed range.
    pub fn bounds(&self) -> BoundBox3 {
        BoundBox3::from_points(&self.discretize(32))
    }
}

// =============================================================================
// Wire
// =============================================================================

/// An ordered run of edges.
#[derive(Debug, Clone)]
pub struct Wire {
    /// Edges in traversal order.
    pub edges: Vec<Edge>,
}

impl Wire {
    /// Wrap a list of edges without checking adjacency.
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// A wire of one edge.
    pub fn from_edge(edge: Edge) -> Self {
        Self { edges: vec![edge] }
    }

    /// Build a wire, verifying that consecutive edges chain end to start.
    pub fn chain(edges: Vec<Edge>) -> Result<Self> {
        if edges.is_empty() {
            return Err(RibloftError::OpenWire);
        }
        for pair in edges.windows(2) {
            let gap = (pair[1].start_point() - pair[0].end_point()).norm();
            if gap > EPSILON * 100.0 {
                return Err(RibloftError::OpenWire);
            }
        }
        Ok(Self { edges })
    }

    /// True when the last edge ends where the first one starts.
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => {
                (last.end_point() - first.start_point()).norm() <= EPSILON * 100.0
            }
            _ => false,
        }
    }

    /// Combined length of all edges.
    pub fn length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// `per_edge` arc-length samples on each edge, concatenated. The
    /// shared junction point between consecutive edges appears once.
    pub fn discretize(&self, per_edge: usize) -> Vec<Point3> {
        let mut points = Vec::new();
        for (i, edge) in self.edges.iter().enumerate() {
            let samples = edge.discretize(per_edge.max(2));
            let skip = usize::from(i > 0);
            points.extend(samples.into_iter().skip(skip));
        }
        points
    }

    /// Exactly `n` samples spaced uniformly by arc length over the whole
    /// wire, endpoints included. Lofting needs equal row lengths across
    /// wires whose edge counts differ.
    pub fn sample_uniform(&self, n: usize) -> Vec<Point3> {
        if self.edges.is_empty() {
            return Vec::new();
        }
        let n = n.max(2);
        let total = self.length();
        let lengths: Vec<f64> = self.edges.iter().map(Edge::length).collect();
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let mut target = total * i as f64 / (n - 1) as f64;
            let mut idx = 0;
            while idx + 1 < lengths.len() && target > lengths[idx] {
                target -= lengths[idx];
                idx += 1;
            }
            let edge = &self.edges[idx];
            let t = edge.parameter_at_length(target.min(lengths[idx]));
            points.push(edge.curve.eval(t));
        }
        points
    }

    /// Apply an affine transform to every edge.
    pub fn transformed(&self, t: &Transform) -> Wire {
        Wire {
            edges: self.edges.iter().map(|e| e.transformed(t)).collect(),
        }
    }

    /// Axis-aligned bounds over all edges.
    pub fn bounds(&self) -> BoundBox3 {
        let mut bb = BoundBox3::empty();
        for e in &self.edges {
            bb.add(&e.bounds());
        }
        bb
    }
}

// =============================================================================
// Rib
// =============================================================================

/// One cross-section of a rib run: a wire (or several, when the source
/// edges do not chain) tagged with its normalized position.
#[derive(Debug, Clone)]
pub struct Rib {
    /// The section geometry.
    pub wires: Vec<Wire>,
    /// Normalized position along the run.
    pub fraction: f64,
}

impl Rib {
    /// A single-wire rib.
    pub fn from_wire(wire: Wire, fraction: f64) -> Self {
        Self {
            wires: vec![wire],
            fraction,
        }
    }

    /// The section wire when the rib is a proper single wire.
    pub fn single_wire(&self) -> Result<&Wire> {
        match self.wires.as_slice() {
            [w] => Ok(w),
            _ => Err(RibloftError::OpenWire),
        }
    }

    /// Bounds over all wires.
    pub fn bounds(&self) -> BoundBox3 {
        let mut bb = BoundBox3::empty();
        for w in &self.wires {
            bb.add(&w.bounds());
        }
        bb
    }

    /// Apply an affine transform to every wire.
    pub fn transformed(&self, t: &Transform) -> Rib {
        Rib {
            wires: self.wires.iter().map(|w| w.transformed(t)).collect(),
            fraction: self.fraction,
        }
    }
}

// =============================================================================
// Face / Shell / Solid / Shape
// =============================================================================

/// A surface patch bounded by wires.
#[derive(Debug, Clone)]
pub enum Face {
    /// A skinned B-spline patch across a run of section wires.
    Skin {
        /// The patch geometry.
        surface: BSplineSurface,
    },
    /// A planar cap over a closed boundary wire.
    PlanarCap {
        /// The closed boundary.
        wire: Wire,
        /// Cap plane normal.
        normal: Vec3,
    },
}

/// A connected set of faces.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Member faces.
    pub faces: Vec<Face>,
}

/// A shell sealed by caps on both ends.
#[derive(Debug, Clone)]
pub struct Solid {
    /// The enclosing shell, caps included.
    pub shell: Shell,
}

/// The result of a recompute, by decreasing completeness.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Closed volume.
    Solid(Solid),
    /// Open or unsealed face set.
    Shell(Shell),
    /// Lofted faces without shell assembly.
    Surface(Vec<Face>),
    /// Bare section wires; the fallback when lofting is off or failed.
    Compound(Vec<Wire>),
}

impl Shape {
    /// All wires when the shape is a compound.
    pub fn as_compound(&self) -> Option<&[Wire]> {
        match self {
            Shape::Compound(wires) => Some(wires),
            _ => None,
        }
    }

    /// Number of faces carried by the shape, 0 for compounds.
    pub fn face_count(&self) -> usize {
        match self {
            Shape::Solid(s) => s.shell.faces.len(),
            Shape::Shell(s) => s.faces.len(),
            Shape::Surface(faces) => faces.len(),
            Shape::Compound(_) => 0,
        }
    }
}
