//! Cross-section envelopes from plane/hull-curve intersections.

use ribloft_geom::Plane;
use ribloft_math::{Point3, Vec3, EPSILON};

use crate::shape::Wire;

/// How more than two intersection points on one hull curve collapse to two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointReduction {
    /// Keep the two points closest to the section position.
    Nearest,
    /// Keep the two points spanning the largest mutual distance.
    MostDistant,
}

/// Axis-aligned extents a rib must be scaled into at one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Lower corner per axis.
    pub min: [f64; 3],
    /// Upper corner per axis.
    pub max: [f64; 3],
    /// Axes that received at least one contribution.
    pub active: [bool; 3],
}

impl Envelope {
    /// Extent along axis `i`.
    pub fn length(&self, i: usize) -> f64 {
        self.max[i] - self.min[i]
    }

    /// Extents as a vector.
    pub fn lengths(&self) -> Vec3 {
        Vec3::new(self.length(0), self.length(1), self.length(2))
    }

    /// Lower corner as a point.
    pub fn min_point(&self) -> Point3 {
        Point3::new(self.min[0], self.min[1], self.min[2])
    }

    /// Center of the envelope box.
    pub fn center(&self) -> Point3 {
        Point3::new(
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        )
    }
}

fn reduce(points: &mut Vec<Point3>, candidate: Point3, pos: &Point3, reduction: PointReduction) {
    if points.len() < 2 {
        points.push(candidate);
        return;
    }
    match reduction {
        PointReduction::Nearest => {
            let dist_c = (pos - candidate).norm();
            let dist0 = (pos - points[0]).norm();
            let dist1 = (pos - points[1]).norm();
            if dist_c < dist0 || dist_c < dist1 {
                if dist1 < dist0 {
                    points[0] = candidate;
                } else {
                    points[1] = candidate;
                }
            }
        }
        PointReduction::MostDistant => {
            let span = (points[0] - points[1]).norm();
            let dist0 = (candidate - points[0]).norm();
            let dist1 = (candidate - points[1]).norm();
            if span < dist0 || span < dist1 {
                if dist1 > dist0 {
                    points[0] = candidate;
                } else {
                    points[1] = candidate;
                }
            }
        }
    }
}

/// Intersect every hull curve with the section plane at `pos`/`normal`
/// and collect the axis-aligned envelope of the surviving points.
///
/// Each hull curve is a wire; intersections are gathered across all of
/// its edges, on each edge's underlying curve and only inside its
/// trimmed range. A hull curve whose edges all miss the plane makes the
/// whole section undefined. When a curve yields more than two points
/// they are reduced to two per `reduction`. The per-curve `axis_flags`
/// suppress an axis contribution, but only for curves hit in more than
/// one point; single-point hits always count on every axis. Axes nobody
/// touched come back inactive with zero bounds.
pub fn envelope_from_intersections(
    hulls: &[Wire],
    pos: &Point3,
    normal: &Vec3,
    axis_flags: Option<&[[bool; 3]]>,
    reduction: PointReduction,
) -> Option<Envelope> {
    if hulls.is_empty() || normal.norm() < EPSILON {
        return None;
    }
    let plane = Plane::new(*pos, normal.normalize());

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];

    for (n, hull) in hulls.iter().enumerate() {
        let mut points: Vec<Point3> = Vec::new();
        for edge in &hull.edges {
            let (lo, hi) = (edge.first.min(edge.last), edge.first.max(edge.last));
            for (t, p) in plane.intersect_curve(&edge.curve, lo - EPSILON, hi + EPSILON) {
                if t >= lo - EPSILON && t <= hi + EPSILON {
                    reduce(&mut points, p, pos, reduction);
                }
            }
        }
        if points.is_empty() {
            return None;
        }

        let mut flags = [true; 3];
        if points.len() > 1 {
            if let Some(per_curve) = axis_flags {
                flags = per_curve[n];
            }
        }
        for p in &points {
            let coords = [p.x, p.y, p.z];
            for axis in 0..3 {
                if flags[axis] {
                    min[axis] = min[axis].min(coords[axis]);
                    max[axis] = max[axis].max(coords[axis]);
                }
            }
        }
    }

    let mut active = [true; 3];
    for axis in 0..3 {
        if min[axis] == f64::INFINITY || max[axis] == f64::NEG_INFINITY {
            min[axis] = 0.0;
            max[axis] = 0.0;
            active[axis] = false;
        }
    }
    Some(Envelope { min, max, active })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Edge;
    use approx::assert_relative_eq;
    use ribloft_nurbs::BSplineCurve;

    fn line_edge(a: Point3, b: Point3) -> Wire {
        Wire::from_edge(Edge::new(BSplineCurve::line(a, b)))
    }

    #[test]
    fn test_two_lines_span_envelope() {
        // Hull lines y = 1 and y = -1 in the XZ plane, cut at x = 2
        let top = line_edge(Point3::new(0.0, 1.0, 0.0), Point3::new(10.0, 1.0, 0.0));
        let bottom = line_edge(Point3::new(0.0, -1.0, 0.0), Point3::new(10.0, -1.0, 0.0));
        let env = envelope_from_intersections(
            &[top, bottom],
            &Point3::new(2.0, 0.0, 0.0),
            &Vec3::x(),
            None,
            PointReduction::Nearest,
        )
        .unwrap();
        assert_relative_eq!(env.min[1], -1.0, epsilon = 1e-6);
        assert_relative_eq!(env.max[1], 1.0, epsilon = 1e-6);
        assert_relative_eq!(env.length(1), 2.0, epsilon = 1e-6);
        assert!(env.active[1]);
        // Nothing varied in z
        assert_relative_eq!(env.length(2), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_plane_missing_a_hull_is_none() {
        let short = line_edge(Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let env = envelope_from_intersections(
            &[short],
            &Point3::new(5.0, 0.0, 0.0),
            &Vec3::x(),
            None,
            PointReduction::Nearest,
        );
        assert!(env.is_none());
    }

    #[test]
    fn test_untouched_axis_collapses_to_zero() {
        let l = line_edge(Point3::new(0.0, 2.0, 0.0), Point3::new(10.0, 2.0, 0.0));
        let env = envelope_from_intersections(
            &[l],
            &Point3::new(3.0, 0.0, 0.0),
            &Vec3::x(),
            None,
            PointReduction::Nearest,
        )
        .unwrap();
        // Single hit: y bounds collapse onto the hit, z is a point too
        assert_relative_eq!(env.min[1], 2.0, epsilon = 1e-6);
        assert_relative_eq!(env.max[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_flags_suppress_contribution() {
        let top = line_edge(Point3::new(0.0, 1.0, 0.0), Point3::new(10.0, 1.0, 0.0));
        let bottom = line_edge(Point3::new(0.0, -1.0, 0.0), Point3::new(10.0, -1.0, 0.0));
        // One curve shape carrying both hits, y suppressed
        let wavy = Wire::from_edge(Edge::new(BSplineCurve::polyline(vec![
            Point3::new(0.0, 3.0, 0.0),
            Point3::new(5.0, -3.0, 0.0),
            Point3::new(10.0, 3.0, 0.0),
        ])));
        let flags = [[true, true, true], [true, true, true], [true, false, true]];
        let env = envelope_from_intersections(
            &[top, bottom, wavy],
            &Point3::new(2.0, 0.0, 0.0),
            &Vec3::x(),
            Some(&flags),
            PointReduction::Nearest,
        )
        .unwrap();
        // The wavy curve crosses y = 0 once here, so it is a single hit
        // and the flags do not apply; the straight hulls still set +-1.
        assert!(env.max[1] >= 1.0 - 1e-6);
    }

    #[test]
    fn test_multi_edge_hull_counts_as_one_curve() {
        // One hull wire of two chained edges; the section at x = 8 only
        // meets the second edge, which is enough for the curve to count.
        let hull = Wire::new(vec![
            Edge::line(Point3::new(0.0, 1.0, 0.0), Point3::new(4.0, 1.0, 0.0)),
            Edge::line(Point3::new(4.0, 1.0, 0.0), Point3::new(10.0, 2.0, 0.0)),
        ]);
        let env = envelope_from_intersections(
            &[hull],
            &Point3::new(8.0, 0.0, 0.0),
            &Vec3::x(),
            None,
            PointReduction::Nearest,
        )
        .unwrap();
        assert_relative_eq!(env.max[1], 1.0 + 4.0 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nearest_reduction_keeps_closest_pair() {
        let mut pts = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 0.0, 0.0)];
        reduce(
            &mut pts,
            Point3::new(0.2, 0.0, 0.0),
            &Point3::origin(),
            PointReduction::Nearest,
        );
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert!(xs.contains(&0.2));
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn test_most_distant_reduction_widens_pair() {
        let mut pts = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 0.0, 0.0)];
        reduce(
            &mut pts,
            Point3::new(5.0, 0.0, 0.0),
            &Point3::origin(),
            PointReduction::MostDistant,
        );
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert!(xs.contains(&5.0));
        assert!(xs.contains(&-1.0));
    }
}
