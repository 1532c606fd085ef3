//! Correspondence between two boundary curve networks, plus the twist
//! reordering applied before poles or samples are paired up.

use ribloft_math::{Point3, EPSILON};

use crate::shape::Edge;

/// How two boundary networks can be paired for blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correspondence {
    /// Same edge count and pole count per edge index; poles can be
    /// blended one to one, keeping the first network's basis.
    Congruent,
    /// Networks differ structurally; both sides are split into the same
    /// number of sub-edges and blended through fixed-count samples.
    Sampled {
        /// Sub-edges each first-network edge is split into.
        splits_a: usize,
        /// Sub-edges each second-network edge is split into.
        splits_b: usize,
    },
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// Decide how networks `a` and `b` are paired.
///
/// `force_sampled` skips the congruence test entirely.
pub fn match_networks(a: &[Edge], b: &[Edge], force_sampled: bool) -> Correspondence {
    let congruent = !force_sampled
        && a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(ea, eb)| ea.num_poles() == eb.num_poles());
    if congruent {
        Correspondence::Congruent
    } else {
        let common = lcm(a.len().max(1), b.len().max(1));
        Correspondence::Sampled {
            splits_a: common / a.len().max(1),
            splits_b: common / b.len().max(1),
        }
    }
}

fn shift_start(n: usize, twist_deg: f64) -> usize {
    let raw = (n as f64 * twist_deg / 360.0) as i64;
    raw.rem_euclid(n as i64) as usize
}

/// Cyclically reorder a shape's edges by a twist angle.
///
/// A positive twist of `360 * k / n` degrees starts the walk `k` edges
/// later; `reverse` walks the cycle backwards from the same start.
/// Single-edge lists come back unchanged.
pub fn reorder_edges(edges: &[Edge], twist_deg: f64, reverse: bool) -> Vec<Edge> {
    let n = edges.len();
    if n <= 1 {
        return edges.to_vec();
    }
    let start = shift_start(n, twist_deg);
    let mut out = Vec::with_capacity(n);
    if reverse {
        for i in (0..=start).rev() {
            out.push(edges[i].clone());
        }
        for i in ((start + 1)..n).rev() {
            out.push(edges[i].clone());
        }
    } else {
        for i in start..n {
            out.push(edges[i].clone());
        }
        for i in 0..start {
            out.push(edges[i].clone());
        }
    }
    out
}

/// Cyclically reorder a point sequence by a twist angle.
///
/// Closed sequences (first point repeated at the end) stay closed: the
/// duplicate closing point follows the rotation and sits at the new
/// start. No twist and no reversal is the identity.
pub fn reorder_points(points: &[Point3], twist_deg: f64, reverse: bool) -> Vec<Point3> {
    if twist_deg == 0.0 && !reverse {
        return points.to_vec();
    }
    let mut n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let closed = n >= 2 && (points[0] - points[n - 1]).norm() < EPSILON;
    if closed {
        n -= 1;
    }
    let start = shift_start(n, twist_deg);
    let mut out = Vec::with_capacity(points.len());
    if reverse {
        for i in (0..=start).rev() {
            out.push(points[i]);
        }
        for i in ((start + 1)..n).rev() {
            out.push(points[i]);
        }
    } else {
        for i in start..n {
            out.push(points[i]);
        }
        for i in 0..start {
            out.push(points[i]);
        }
    }
    if closed {
        out.push(points[start]);
    }
    out
}

/// Sample a reordered network into per-sub-edge point rows.
///
/// Every edge is reordered by the twist, split into `splits` equal
/// parameter ranges and each range discretized into `points_per_edge`
/// arc-length samples. The result has `edges.len() * splits` rows.
pub fn edges_to_points(
    edges: &[Edge],
    splits: usize,
    points_per_edge: usize,
    twist_deg: f64,
    reverse: bool,
) -> Vec<Vec<Point3>> {
    let reordered = reorder_edges(edges, twist_deg, reverse);
    let mut rows = Vec::with_capacity(reordered.len() * splits.max(1));
    for edge in &reordered {
        for part in edge.split_equal(splits.max(1)) {
            rows.push(part.discretize(points_per_edge.max(2)));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ribloft_nurbs::BSplineCurve;

    fn square_edges() -> Vec<Edge> {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        vec![
            Edge::line(p[0], p[1]),
            Edge::line(p[1], p[2]),
            Edge::line(p[2], p[3]),
            Edge::line(p[3], p[0]),
        ]
    }

    #[test]
    fn test_congruent_identical_networks() {
        let a = square_edges();
        let b = square_edges();
        assert_eq!(match_networks(&a, &b, false), Correspondence::Congruent);
    }

    #[test]
    fn test_force_sampled_bypasses_congruence() {
        let a = square_edges();
        let b = square_edges();
        assert_eq!(
            match_networks(&a, &b, true),
            Correspondence::Sampled {
                splits_a: 1,
                splits_b: 1
            }
        );
    }

    #[test]
    fn test_lcm_split_counts() {
        let a = square_edges();
        let b = vec![
            Edge::line(Point3::origin(), Point3::new(1.0, 0.0, 0.0)),
            Edge::line(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)),
            Edge::line(Point3::new(1.0, 1.0, 0.0), Point3::origin()),
        ];
        // 4 and 3 edges share 12 sub-edges
        assert_eq!(
            match_networks(&a, &b, false),
            Correspondence::Sampled {
                splits_a: 3,
                splits_b: 4
            }
        );
    }

    #[test]
    fn test_pole_count_mismatch_is_sampled() {
        let a = vec![Edge::line(Point3::origin(), Point3::new(1.0, 0.0, 0.0))];
        let b = vec![Edge::new(BSplineCurve::polyline(vec![
            Point3::origin(),
            Point3::new(0.5, 0.5, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]))];
        assert!(matches!(
            match_networks(&a, &b, false),
            Correspondence::Sampled { .. }
        ));
    }

    #[test]
    fn test_reorder_edges_quarter_turn() {
        let edges = square_edges();
        let out = reorder_edges(&edges, 90.0, false);
        assert_relative_eq!(
            (out[0].start_point() - edges[1].start_point()).norm(),
            0.0,
            epsilon = 1e-9
        );
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_reorder_edges_identity() {
        let edges = square_edges();
        let out = reorder_edges(&edges, 0.0, false);
        for (a, b) in edges.iter().zip(out.iter()) {
            assert_relative_eq!((a.start_point() - b.start_point()).norm(), 0.0);
        }
    }

    #[test]
    fn test_reorder_points_closed_stays_closed() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let out = reorder_points(&points, 90.0, false);
        assert_eq!(out.len(), 5);
        assert_relative_eq!((out[0] - out[4]).norm(), 0.0, epsilon = 1e-9);
        assert_relative_eq!((out[0] - points[1]).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reorder_points_negative_twist_wraps() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let out = reorder_points(&points, -90.0, false);
        assert_relative_eq!((out[0] - points[3]).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_edges_to_points_row_count() {
        let edges = square_edges();
        let rows = edges_to_points(&edges, 3, 8, 0.0, false);
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.len() == 8));
    }
}
