#![warn(missing_docs)]

//! Curved shape generation from boundary curves.
//!
//! Facade over the ribloft member crates: re-exports the geometry and
//! core types and offers one-call constructors for the four generator
//! modes.

pub use ribloft_core::{
    blend_networks, envelope_from_intersections, generate, make_surface_solid, match_networks,
    plan_segments, scale_by_envelope, BlendMode, BlendSource, Correspondence, Distribution,
    DistributionKind, Edge, Envelope, Face, PointReduction, RecomputeState, Rib, RibConfig,
    RibGenerator, RibInput, RibloftError, Shape, Shell, Solid, Wire,
};
pub use ribloft_geom::{Curve3d, Plane};
pub use ribloft_math::{BoundBox3, Dir3, Point3, Transform, Vec3, EPSILON};
pub use ribloft_nurbs::{BSplineCurve, BSplineSurface};

/// Sweep a base profile along a straight axis, scaled into the hull
/// envelope at every position.
pub fn make_curved_array(
    base: Vec<Wire>,
    hull_curves: Vec<Wire>,
    axis: Vec3,
    config: &RibConfig,
) -> Option<Shape> {
    RibGenerator::new().recompute(
        &RibInput::Axis {
            base,
            hull_curves,
            axis,
        },
        config,
    )
}

/// Sweep a base profile along a path, oriented by the path tangent.
pub fn make_curved_path_array(
    base: Vec<Wire>,
    base_normal: Vec3,
    path: Vec<Edge>,
    hull_curves: Vec<Wire>,
    config: &RibConfig,
) -> Option<Shape> {
    RibGenerator::new().recompute(
        &RibInput::Path {
            base,
            base_normal,
            path,
            hull_curves,
        },
        config,
    )
}

/// Interpolate ribs between two boundary shapes, optionally swept along
/// a path.
#[allow(clippy::too_many_arguments)]
pub fn make_curved_segment(
    shape1: Vec<Edge>,
    shape2: Vec<Edge>,
    hull_curves: Vec<Wire>,
    path: Vec<Edge>,
    normal1: Vec3,
    normal2: Vec3,
    config: &RibConfig,
) -> Option<Shape> {
    RibGenerator::new().recompute(
        &RibInput::Segment {
            shape1,
            shape2,
            hull_curves,
            path,
            normal1,
            normal2,
        },
        config,
    )
}

/// Build the halfway rib between two boundary shapes, optionally lofted
/// to both and sealed.
pub fn make_interpolated_middle(
    shape1: Vec<Edge>,
    shape2: Vec<Edge>,
    normal1: Vec3,
    normal2: Vec3,
    config: &RibConfig,
) -> Option<Shape> {
    RibGenerator::new().recompute(
        &RibInput::Middle {
            shape1,
            shape2,
            normal1,
            normal2,
        },
        config,
    )
}
