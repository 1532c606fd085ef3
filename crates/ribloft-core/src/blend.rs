//! Blending two boundary networks into intermediate rib sections.

use ribloft_geom::Plane;
use ribloft_math::{lerp_point, lerp_vec, Dir3, Point3, Transform, Vec3, EPSILON};
use ribloft_nurbs::BSplineCurve;

use crate::network::{edges_to_points, match_networks, reorder_edges, reorder_points, Correspondence};
use crate::shape::{Edge, Rib, Wire};

/// Where an interior point lands between its two boundary points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Intersect the chord with the blended mid-plane.
    MidPlane,
    /// Project each end along its own normal and average.
    NormalProjected,
}

/// Everything a blend needs to know about the two boundary shapes.
#[derive(Debug, Clone)]
pub struct BlendSource {
    /// Edges of the first boundary shape.
    pub edges1: Vec<Edge>,
    /// Edges of the second boundary shape.
    pub edges2: Vec<Edge>,
    /// Direction axis of the first shape.
    pub normal1: Vec3,
    /// Direction axis of the second shape.
    pub normal2: Vec3,
    /// Bounding-box center of the first shape.
    pub center1: Point3,
    /// Bounding-box center of the second shape.
    pub center2: Point3,
}

/// Linear point blend.
pub fn vector_middle(a: &Point3, b: &Point3, fraction: f64) -> Point3 {
    lerp_point(a, b, fraction)
}

/// Blend by intersecting the chord `a -> b` with a section plane,
/// falling back to the linear blend when there is no unique hit.
pub fn vector_middle_plane(a: &Point3, b: &Point3, fraction: f64, plane: &Plane) -> Point3 {
    let chord = b - a;
    if chord.norm() < EPSILON {
        return *a;
    }
    match plane.intersect_line(a, &chord) {
        Some(p) => p,
        None => vector_middle(a, b, fraction),
    }
}

/// One side of the normal projection: `v2` pushed along `n2` onto the
/// plane through `v1` whose normal is `n1` rotated a quarter turn about
/// the common axis of the two normals.
fn vector_middle_plane_normal1(v1: &Point3, v2: &Point3, n1: &Vec3, n2: &Vec3) -> Point3 {
    let axis = n1.cross(n2);
    let normal90 = if axis.norm() < EPSILON {
        *n1
    } else {
        let rot =
            Transform::rotation_about_axis(&Dir3::new_normalize(axis), std::f64::consts::FRAC_PI_2);
        rot.apply_vec(n1)
    };
    let plane = Plane::new(*v1, normal90);
    match plane.intersect_line(v2, n2) {
        Some(p) => p,
        None => *v1,
    }
}

/// Two-sided normal-projection blend.
///
/// Fractions 0 and 1 return the endpoints verbatim; every interior
/// fraction gets the symmetric average of the two one-sided projections.
pub fn vector_middle_plane_normal(
    a: &Point3,
    b: &Point3,
    fraction: f64,
    n1: &Vec3,
    n2: &Vec3,
) -> Point3 {
    if fraction == 0.0 {
        return *a;
    }
    if fraction == 1.0 {
        return *b;
    }
    let p1 = vector_middle_plane_normal1(a, b, n1, n2);
    let p2 = vector_middle_plane_normal1(b, a, n2, n1);
    vector_middle(&p1, &p2, 0.5)
}

/// The section plane at a fraction: blended center, blended normal.
pub fn mid_plane(source: &BlendSource, fraction: f64) -> Plane {
    let origin = lerp_point(&source.center1, &source.center2, fraction);
    let normal = lerp_vec(&source.normal1, &source.normal2, fraction);
    Plane::new(origin, normal)
}

fn blend_point(source: &BlendSource, mode: BlendMode, plane: &Plane, fraction: f64, a: &Point3, b: &Point3) -> Point3 {
    match mode {
        BlendMode::MidPlane => vector_middle_plane(a, b, fraction, plane),
        BlendMode::NormalProjected => {
            vector_middle_plane_normal(a, b, fraction, &source.normal1, &source.normal2)
        }
    }
}

fn assemble_rib(curves: Vec<BSplineCurve>, fraction: f64) -> Rib {
    let edges: Vec<Edge> = curves.into_iter().map(Edge::new).collect();
    match Wire::chain(edges.clone()) {
        Ok(wire) => Rib::from_wire(wire, fraction),
        Err(_) => Rib {
            wires: edges.into_iter().map(Wire::from_edge).collect(),
            fraction,
        },
    }
}

/// Build the rib at `fraction` between the two boundary networks.
///
/// Congruent networks are blended pole by pole, keeping the first
/// network's degree, knots, multiplicities, weights and periodicity.
/// Everything else is sampled per `correspondence` and re-fitted through
/// the blended samples. `twist_comp_deg` compensates a rotational offset
/// between the boundary shapes; the pole-level part of it only applies
/// to single-edge shapes.
#[allow(clippy::too_many_arguments)]
pub fn blend_rib(
    source: &BlendSource,
    fraction: f64,
    mode: BlendMode,
    correspondence: Correspondence,
    twist_comp_deg: f64,
    twist_reverse: bool,
    interpolation_points: usize,
) -> Rib {
    let plane = mid_plane(source, fraction);
    let pole_twist = if source.edges2.len() > 1 {
        0.0
    } else {
        twist_comp_deg
    };

    let curves = match correspondence {
        Correspondence::Congruent => {
            let edges2 = reorder_edges(&source.edges2, twist_comp_deg, twist_reverse);
            // The reorder can shift a pole-count mismatch onto an index
            // where the unreordered networks happened to agree; pairing
            // poles across such edges is impossible, so fall back to
            // sampling.
            let pairable = source.edges1.len() == edges2.len()
                && source
                    .edges1
                    .iter()
                    .zip(edges2.iter())
                    .all(|(a, b)| a.num_poles() == b.num_poles());
            if !pairable {
                return blend_rib(
                    source,
                    fraction,
                    mode,
                    match_networks(&source.edges1, &source.edges2, true),
                    twist_comp_deg,
                    twist_reverse,
                    interpolation_points,
                );
            }
            source
                .edges1
                .iter()
                .zip(edges2.iter())
                .map(|(e1, e2)| {
                    let poles2 = reorder_points(&e2.curve.poles, pole_twist, twist_reverse);
                    let new_poles: Vec<Point3> = e1
                        .curve
                        .poles
                        .iter()
                        .zip(poles2.iter())
                        .map(|(a, b)| blend_point(source, mode, &plane, fraction, a, b))
                        .collect();
                    BSplineCurve::from_poles_mults_knots(
                        new_poles,
                        e1.curve.mults.clone(),
                        e1.curve.knots.clone(),
                        e1.curve.periodic,
                        e1.curve.degree,
                        e1.curve.weights.clone(),
                    )
                })
                .collect()
        }
        Correspondence::Sampled { splits_a, splits_b } => {
            let rows1 = edges_to_points(&source.edges1, splits_a, interpolation_points, 0.0, false);
            let rows2 = edges_to_points(
                &source.edges2,
                splits_b,
                interpolation_points,
                twist_comp_deg,
                twist_reverse,
            );
            rows1
                .iter()
                .zip(rows2.iter())
                .map(|(r1, r2)| {
                    let r2 = reorder_points(r2, pole_twist, twist_reverse);
                    let samples: Vec<Point3> = r1
                        .iter()
                        .zip(r2.iter())
                        .map(|(a, b)| blend_point(source, mode, &plane, fraction, a, b))
                        .collect();
                    BSplineCurve::approximate(&samples)
                })
                .collect()
        }
    };
    assemble_rib(curves, fraction)
}

/// Convenience: decide the correspondence and blend in one call.
pub fn blend_networks(
    source: &BlendSource,
    fraction: f64,
    mode: BlendMode,
    force_sampled: bool,
    twist_comp_deg: f64,
    twist_reverse: bool,
    interpolation_points: usize,
) -> Rib {
    let correspondence = match_networks(&source.edges1, &source.edges2, force_sampled);
    blend_rib(
        source,
        fraction,
        mode,
        correspondence,
        twist_comp_deg,
        twist_reverse,
        interpolation_points,
    )
}
