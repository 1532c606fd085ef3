//! Anisotropic scaling of a section into its envelope.

use ribloft_math::{Transform, Vec3, EPSILON};

use crate::envelope::Envelope;
use crate::shape::Rib;

/// Scale a rib so its bounds match the envelope, then re-anchor it.
///
/// Per axis: when the axis is flagged and the rib has extent there, the
/// factor is envelope extent over rib extent. Degenerate factors collapse
/// to `EPSILON` on flagged axes and to 1 on unflagged ones. The rib is
/// scaled about its own bounding-box center and afterwards translated so
/// that on every flagged axis its minimum lands on the envelope minimum.
pub fn scale_by_envelope(rib: &Rib, env: &Envelope, flags: [bool; 3]) -> Rib {
    let base = rib.bounds();
    if !base.is_valid() {
        return rib.clone();
    }

    let mut scale = Vec3::new(1.0, 1.0, 1.0);
    for axis in 0..3 {
        if flags[axis] && base.length(axis) > EPSILON {
            scale[axis] = env.length(axis) / base.length(axis);
        }
        if scale[axis] < EPSILON {
            scale[axis] = if flags[axis] { EPSILON } else { 1.0 };
        }
    }

    let scaled = rib.transformed(&Transform::scale_about(&scale, &base.center()));

    let scaled_bounds = scaled.bounds();
    let mut shift = Vec3::zeros();
    for axis in 0..3 {
        if flags[axis] {
            shift[axis] = env.min[axis] - scaled_bounds.min[axis];
        }
    }
    scaled.transformed(&Transform::translation(&shift))
}
