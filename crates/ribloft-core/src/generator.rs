//! The rib sequence generator: axis, path, segment and middle modes.

use ribloft_geom::Curve3d;
use ribloft_math::{lerp_point, lerp_vec, BoundBox3, Dir3, Point3, Transform, Vec3, EPSILON};

use crate::blend::{blend_networks, BlendMode, BlendSource};
use crate::config::RibConfig;
use crate::envelope::{envelope_from_intersections, PointReduction};
use crate::error::RibloftError;
use crate::loft::make_surface_solid;
use crate::scaling::scale_by_envelope;
use crate::shape::{Edge, Rib, Shape, Shell, Solid, Wire};

/// Lifecycle of a generator between recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecomputeState {
    /// Never recomputed.
    #[default]
    Idle,
    /// A recompute is running; nested requests are dropped.
    Computing,
    /// The last recompute finished.
    Done,
}

/// What to generate ribs between or along.
#[derive(Debug, Clone)]
pub enum RibInput {
    /// Sweep copies of a base profile along a straight axis through the
    /// hull envelope.
    Axis {
        /// Profile wires to replicate.
        base: Vec<Wire>,
        /// Curves bounding the sweep, one wire per hull curve.
        hull_curves: Vec<Wire>,
        /// Sweep direction; zero means infer from the base shape.
        axis: Vec3,
    },
    /// Sweep copies of a base profile along a curved path.
    Path {
        /// Profile wires to replicate.
        base: Vec<Wire>,
        /// Direction axis of the base profile; zero means infer.
        base_normal: Vec3,
        /// Ordered path edges, traversed start to end.
        path: Vec<Edge>,
        /// Curves bounding the sweep, may be empty.
        hull_curves: Vec<Wire>,
    },
    /// Blend interior ribs between two boundary shapes.
    Segment {
        /// Edges of the first boundary shape.
        shape1: Vec<Edge>,
        /// Edges of the second boundary shape.
        shape2: Vec<Edge>,
        /// Curves bounding the blend, may be empty.
        hull_curves: Vec<Wire>,
        /// Optional sweep path; blended ribs are re-positioned onto it.
        path: Vec<Edge>,
        /// Direction axis of the first shape; zero means infer.
        normal1: Vec3,
        /// Direction axis of the second shape; zero means infer.
        normal2: Vec3,
    },
    /// A single halfway rib between two boundary shapes, optionally
    /// lofted to both.
    Middle {
        /// Edges of the first boundary shape.
        shape1: Vec<Edge>,
        /// Edges of the second boundary shape.
        shape2: Vec<Edge>,
        /// Direction axis of the first shape; zero means infer.
        normal1: Vec3,
        /// Direction axis of the second shape; zero means infer.
        normal2: Vec3,
    },
}

/// Drives recomputes and holds the re-entrancy guard.
#[derive(Debug, Default)]
pub struct RibGenerator {
    state: RecomputeState,
}

impl RibGenerator {
    /// A generator that has never run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecomputeState {
        self.state
    }

    /// Run one recompute.
    ///
    /// Returns `None` when a recompute is already running, when the
    /// input/config combination is unusable, or when generation produced
    /// nothing. Never panics on bad geometry.
    pub fn recompute(&mut self, input: &RibInput, config: &RibConfig) -> Option<Shape> {
        if self.state == RecomputeState::Computing {
            log::warn!("recompute already running, dropping nested request");
            return None;
        }
        self.state = RecomputeState::Computing;
        let shape = generate(input, config);
        self.state = RecomputeState::Done;
        shape
    }
}

/// One-shot generation without a persistent guard.
pub fn generate(input: &RibInput, config: &RibConfig) -> Option<Shape> {
    match input {
        RibInput::Axis {
            base,
            hull_curves,
            axis,
        } => axis_array(base, hull_curves, *axis, config),
        RibInput::Path {
            base,
            base_normal,
            path,
            hull_curves,
        } => path_array(base, *base_normal, path, hull_curves, config),
        RibInput::Segment {
            shape1,
            shape2,
            hull_curves,
            path,
            normal1,
            normal2,
        } => segment(shape1, shape2, hull_curves, path, *normal1, *normal2, config),
        RibInput::Middle {
            shape1,
            shape2,
            normal1,
            normal2,
        } => middle(shape1, shape2, *normal1, *normal2, config),
    }
}

/// Default direction axis of a shape: the flattest bounding-box axis,
/// or Z when the shape has volume everywhere.
pub fn infer_normal(bounds: &BoundBox3) -> Vec3 {
    if !bounds.is_valid() || bounds.length(0) < EPSILON {
        Vec3::x()
    } else if bounds.length(1) < EPSILON {
        Vec3::y()
    } else {
        Vec3::z()
    }
}

fn effective_normal(given: Vec3, bounds: &BoundBox3) -> Vec3 {
    if given.norm() < EPSILON {
        infer_normal(bounds)
    } else {
        given
    }
}

fn hull_axis_flags(hulls: &[Wire]) -> (Vec<[bool; 3]>, [bool; 3], BoundBox3) {
    let mut per_curve = Vec::with_capacity(hulls.len());
    let mut union = BoundBox3::empty();
    for h in hulls {
        let bb = h.bounds();
        per_curve.push(bb.active_axes(EPSILON));
        union.add(&bb);
    }
    let sum = if union.is_valid() {
        union.active_axes(EPSILON)
    } else {
        [false; 3]
    };
    (per_curve, sum, union)
}

fn bounds_of_wires(wires: &[Wire]) -> BoundBox3 {
    let mut bb = BoundBox3::empty();
    for w in wires {
        bb.add(&w.bounds());
    }
    bb
}

fn rotate_rib(rib: &Rib, center: &Point3, axis: &Vec3, angle_deg: f64) -> Rib {
    if axis.norm() < EPSILON || angle_deg == 0.0 {
        return rib.clone();
    }
    let t = Transform::rotation_about_point(
        &Dir3::new_normalize(*axis),
        angle_deg.to_radians(),
        center,
    );
    rib.transformed(&t)
}

fn finish(ribs: Vec<Rib>, config: &RibConfig) -> Option<Shape> {
    if ribs.is_empty() {
        return None;
    }
    if (config.want_surface || config.want_solid) && ribs.len() > 1 {
        Some(make_surface_solid(
            &ribs,
            config.want_solid,
            config.loft_max_degree,
            config.loft_max_segment_size,
        ))
    } else {
        Some(Shape::Compound(
            ribs.into_iter().flat_map(|r| r.wires).collect(),
        ))
    }
}

// =============================================================================
// Axis mode
// =============================================================================

/// The region the fractions walk through: the per-axis intersection of
/// the flagged hull bounds, falling back to the first hull where no
/// curve constrained an axis.
fn sweep_region(hulls: &[Wire], per_curve: &[[bool; 3]]) -> BoundBox3 {
    let mut min = [f64::NEG_INFINITY; 3];
    let mut max = [f64::INFINITY; 3];
    for (h, flags) in hulls.iter().zip(per_curve.iter()) {
        let bb = h.bounds();
        let bb_min = [bb.min.x, bb.min.y, bb.min.z];
        let bb_max = [bb.max.x, bb.max.y, bb.max.z];
        for axis in 0..3 {
            if flags[axis] {
                min[axis] = min[axis].max(bb_min[axis]);
                max[axis] = max[axis].min(bb_max[axis]);
            }
        }
    }
    let first = hulls[0].bounds();
    let first_min = [first.min.x, first.min.y, first.min.z];
    let first_max = [first.max.x, first.max.y, first.max.z];
    for axis in 0..3 {
        if min[axis] == f64::NEG_INFINITY {
            min[axis] = first_min[axis];
        }
        if max[axis] == f64::INFINITY {
            max[axis] = first_max[axis];
        }
    }
    BoundBox3::new(
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
    )
}

fn axis_array(base: &[Wire], hulls: &[Wire], axis: Vec3, config: &RibConfig) -> Option<Shape> {
    if base.is_empty() || hulls.is_empty() {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig(
                "axis array needs a base shape and at least one hull curve".to_string()
            )
        );
        return None;
    }
    if config.item_count == 0 && config.explicit_fractions.is_empty() {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig("axis array with zero items".to_string())
        );
        return None;
    }
    let axis = effective_normal(axis, &bounds_of_wires(base));

    let (per_curve, sum_flags, _) = hull_axis_flags(hulls);
    let region = sweep_region(hulls, &per_curve);

    let area = region.lengths();
    let delta = area.component_mul(&axis) - (config.offset_start + config.offset_end) * axis;
    let mut start = region.min;
    if axis.x < 0.0 {
        start.x = region.max.x;
    }
    if axis.y < 0.0 {
        start.y = region.max.y;
    }
    if axis.z < 0.0 {
        start.z = region.max.z;
    }
    let pos0 = start + config.offset_start * axis;

    let fractions: Vec<f64> = if config.explicit_fractions.is_empty() {
        let n = config.item_count;
        (0..n)
            .map(|x| {
                if n > 1 {
                    config.distribution.apply(x as f64 / (n - 1) as f64)
                } else {
                    0.0
                }
            })
            .collect()
    } else {
        config.explicit_fractions.clone()
    };

    let mut ribs = Vec::with_capacity(fractions.len());
    for (x, &d) in fractions.iter().enumerate() {
        let posvec = pos0 + delta * d;
        let Some(env) = envelope_from_intersections(
            hulls,
            &posvec,
            &axis,
            Some(&per_curve),
            PointReduction::Nearest,
        ) else {
            log::warn!(
                "{}, skipping rib",
                RibloftError::UndefinedEnvelope { fraction: d }
            );
            continue;
        };
        let rib = Rib {
            wires: base.to_vec(),
            fraction: d,
        };
        let mut rib = scale_by_envelope(&rib, &env, sum_flags);
        let center = rib.bounds().center();
        if let Some(&twist) = config.explicit_twists.get(x) {
            rib = rotate_rib(&rib, &center, &axis, twist);
        } else if config.twist_angle != 0.0 {
            rib = rotate_rib(&rib, &center, &axis, config.twist_angle * d);
        }
        ribs.push(rib);
    }
    finish(ribs, config)
}

// =============================================================================
// Path mode
// =============================================================================

fn path_array(
    base: &[Wire],
    base_normal: Vec3,
    path: &[Edge],
    hulls: &[Wire],
    config: &RibConfig,
) -> Option<Shape> {
    if base.is_empty() || path.is_empty() || config.item_count == 0 {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig(
                "path array needs a base shape, a path and at least one item".to_string()
            )
        );
        return None;
    }
    let base_bounds = bounds_of_wires(base);
    let normal = effective_normal(base_normal, &base_bounds);
    let base_center = base_bounds.center();

    let (per_curve, mut sum_flags, union) = hull_axis_flags(hulls);
    if union.is_valid() {
        let switches = config.scale_switches();
        for axis in 0..3 {
            sum_flags[axis] = sum_flags[axis] && switches[axis];
        }
    }

    let lengths: Vec<f64> = path.iter().map(Edge::length).collect();
    let total: f64 = lengths.iter().sum();
    let items = config.item_count;

    let mut ribs = Vec::with_capacity(items);
    for n in 0..items {
        let mut plen = config.offset_start;
        if items > 1 {
            plen += (total - config.offset_start - config.offset_end) * n as f64
                / (items - 1) as f64;
        }
        let fraction = if items > 1 {
            n as f64 / (items - 1) as f64
        } else {
            0.0
        };

        let mut walked = plen;
        let mut hit = None;
        for (edge, &len) in path.iter().zip(lengths.iter()) {
            if walked > len {
                walked -= len;
            } else {
                let t = edge.parameter_at_length(walked);
                hit = Some((edge.curve.eval(t), edge.curve.tangent(t)));
                break;
            }
        }
        // Offsets past the end of the path produce no rib there.
        let Some((posvec, mut direction)) = hit else {
            continue;
        };

        let mut rib = Rib {
            wires: base.to_vec(),
            fraction,
        };
        let rotaxis = normal.cross(&direction);
        if rotaxis.norm() > EPSILON {
            let angle = normal.angle(&direction).to_degrees();
            rib = rotate_rib(&rib, &base_center, &rotaxis, angle);
        }
        rib = rib.transformed(&Transform::translation(&(posvec - Point3::origin())));

        if config.twist_angle != 0.0 && n > 0 {
            rib = rotate_rib(
                &rib,
                &posvec,
                &direction,
                config.twist_angle * n as f64 / items as f64,
            );
        }

        if !hulls.is_empty() {
            // A disabled scale switch redirects the envelope query onto
            // that fixed unit axis.
            if !config.scale_x {
                direction = Vec3::x();
            }
            if !config.scale_y {
                direction = Vec3::y();
            }
            if !config.scale_z {
                direction = Vec3::z();
            }
            if let Some(env) = envelope_from_intersections(
                hulls,
                &posvec,
                &direction,
                Some(&per_curve),
                PointReduction::Nearest,
            ) {
                rib = scale_by_envelope(&rib, &env, sum_flags);
            }
        }
        ribs.push(rib);
    }
    finish(ribs, config)
}

// =============================================================================
// Segment mode
// =============================================================================

fn network_rib(edges: &[Edge], fraction: f64) -> Rib {
    match Wire::chain(edges.to_vec()) {
        Ok(wire) => Rib::from_wire(wire, fraction),
        Err(_) => Rib {
            wires: edges.iter().cloned().map(Wire::from_edge).collect(),
            fraction,
        },
    }
}

fn network_bounds(edges: &[Edge]) -> BoundBox3 {
    let mut bb = BoundBox3::empty();
    for e in edges {
        bb.add(&e.bounds());
    }
    bb
}

fn segment(
    shape1: &[Edge],
    shape2: &[Edge],
    hulls: &[Wire],
    path: &[Edge],
    normal1: Vec3,
    normal2: Vec3,
    config: &RibConfig,
) -> Option<Shape> {
    if shape1.is_empty() || shape2.is_empty() {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig("segment needs two boundary shapes".to_string())
        );
        return None;
    }
    if config.interpolation_point_count <= 1 {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig(
                "segment needs at least 2 interpolation points".to_string()
            )
        );
        return None;
    }
    if config.item_count == 0 {
        return None;
    }

    let bounds1 = network_bounds(shape1);
    let bounds2 = network_bounds(shape2);
    let source = BlendSource {
        edges1: shape1.to_vec(),
        edges2: shape2.to_vec(),
        normal1: effective_normal(normal1, &bounds1),
        normal2: effective_normal(normal2, &bounds2),
        center1: bounds1.center(),
        center2: bounds2.center(),
    };

    let items = config.item_count;
    let boundary_ribs = config.want_surface || config.want_solid;

    let mut ribs = Vec::with_capacity(items + 2);
    if boundary_ribs {
        ribs.push(network_rib(shape1, 0.0));
    }
    for i in 1..=items {
        let fraction = config
            .distribution
            .apply(i as f64 / (items + 1) as f64);
        ribs.push(blend_networks(
            &source,
            fraction,
            BlendMode::MidPlane,
            config.force_discretized_interpolation,
            config.twist_compensation_angle,
            config.twist_reverse,
            config.interpolation_points(),
        ));
    }
    if boundary_ribs {
        ribs.push(network_rib(shape2, 1.0));
    }

    // Without a path only the interior ribs move; the boundary shapes
    // stay untouched. A path re-positions every rib, boundaries included.
    let (per_curve, sum_flags, _) = hull_axis_flags(hulls);
    let path_lengths: Vec<f64> = path.iter().map(Edge::length).collect();
    let path_total: f64 = path_lengths.iter().sum();
    let lo = if path.is_empty() {
        usize::from(boundary_ribs)
    } else {
        0
    };
    let hi = ribs.len() - lo;
    for rib in &mut ribs[lo..hi] {
        let d = rib.fraction;
        let mut normal_d = lerp_vec(&source.normal1, &source.normal2, d);
        let pivot = lerp_point(&source.center1, &source.center2, d);
        if config.twist_angle != 0.0 {
            *rib = rotate_rib(rib, &pivot, &normal_d, config.twist_angle * d);
        }

        if path_total > 0.0 {
            let mut walked = d * path_total;
            for (edge, &len) in path.iter().zip(path_lengths.iter()) {
                if walked > len {
                    walked -= len;
                } else {
                    let t = edge.parameter_at_length(walked);
                    let tangent = edge.curve.tangent(t);
                    let posvec = edge.curve.eval(t);
                    let rotaxis = normal_d.cross(&tangent);
                    if rotaxis.norm() > EPSILON {
                        let angle = normal_d.angle(&tangent).to_degrees();
                        *rib = rotate_rib(rib, &pivot, &rotaxis, angle);
                    }
                    *rib = rib.transformed(&Transform::translation(&(posvec - pivot)));
                    normal_d = tangent;
                    break;
                }
            }
        }

        if !hulls.is_empty() {
            let center = rib.bounds().center();
            if let Some(env) = envelope_from_intersections(
                hulls,
                &center,
                &normal_d,
                Some(&per_curve),
                PointReduction::MostDistant,
            ) {
                *rib = scale_by_envelope(rib, &env, sum_flags);
            }
        }
    }
    finish(ribs, config)
}

// =============================================================================
// Interpolated middle
// =============================================================================

fn middle(
    shape1: &[Edge],
    shape2: &[Edge],
    normal1: Vec3,
    normal2: Vec3,
    config: &RibConfig,
) -> Option<Shape> {
    if shape1.is_empty() || shape2.is_empty() {
        log::warn!(
            "{}",
            RibloftError::InvalidConfig("interpolated middle needs two boundary shapes".to_string())
        );
        return None;
    }
    if config.interpolation_point_count <= 1 {
        return None;
    }

    let bounds1 = network_bounds(shape1);
    let bounds2 = network_bounds(shape2);
    let source = BlendSource {
        edges1: shape1.to_vec(),
        edges2: shape2.to_vec(),
        normal1: effective_normal(normal1, &bounds1),
        normal2: effective_normal(normal2, &bounds2),
        center1: bounds1.center(),
        center2: bounds2.center(),
    };

    // The halfway rib ignores the distribution; it always sits at 0.5.
    let mid = blend_networks(
        &source,
        0.5,
        BlendMode::NormalProjected,
        config.force_discretized_interpolation,
        config.twist_compensation_angle,
        config.twist_reverse,
        config.interpolation_points(),
    );

    if !(config.want_surface || config.want_solid) {
        return Some(Shape::Compound(mid.wires));
    }

    let rib1 = network_rib(shape1, 0.0);
    let rib2 = network_rib(shape2, 1.0);
    let half1 = make_surface_solid(
        &[rib1.clone(), mid.clone()],
        false,
        config.loft_max_degree,
        config.loft_max_segment_size,
    );
    let half2 = make_surface_solid(
        &[mid, rib2.clone()],
        false,
        config.loft_max_degree,
        config.loft_max_segment_size,
    );
    let mut faces = Vec::new();
    for half in [half1, half2] {
        match half {
            Shape::Surface(f) => faces.extend(f),
            other => return Some(other),
        }
    }

    if config.want_solid {
        let cap1 = crate::loft::cap_rib(&rib1)
            .map_err(|e| log::error!("{e}"))
            .ok();
        let cap2 = crate::loft::cap_rib(&rib2)
            .map_err(|e| log::error!("{e}"))
            .ok();
        let sealed = cap1.is_some() && cap2.is_some();
        faces.extend(cap1);
        faces.extend(cap2);
        let shell = Shell { faces };
        if sealed {
            return Some(Shape::Solid(Solid { shell }));
        }
        log::error!("creating solid failed, leaving an open shell");
        return Some(Shape::Shell(shell));
    }
    Some(Shape::Surface(faces))
}
