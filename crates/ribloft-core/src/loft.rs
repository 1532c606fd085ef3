//! Segmented lofting of rib runs into surfaces, shells and solids.

use ribloft_math::{Point3, Vec3};
use ribloft_nurbs::BSplineSurface;

use crate::error::{Result, RibloftError};
use crate::shape::{Face, Rib, Shape, Shell, Solid, Wire};

/// Samples taken along each section wire when skinning a segment.
const SKIN_SAMPLES: usize = 33;

/// Partition `n` ribs into contiguous runs no longer than `max`.
///
/// Full runs are taken greedily. A remainder at least half the limit
/// becomes its own run; a smaller one is merged with the final full run
/// and the union split near-equal in half. `max == 0` disables
/// segmentation.
pub fn plan_segments(n: usize, max: usize) -> Vec<usize> {
    if max == 0 || n <= max {
        return vec![n];
    }
    let full = n / max;
    let rem = n % max;
    let mut runs = vec![max; full];
    if rem > 0 {
        if rem * 2 >= max {
            runs.push(rem);
        } else {
            let combined = runs.pop().unwrap_or(0) + rem;
            runs.push(combined - combined / 2);
            runs.push(combined / 2);
        }
    }
    runs
}

/// Newell's method for the mean normal of a closed boundary.
fn boundary_normal(points: &[Point3]) -> Vec3 {
    if points.len() < 3 {
        return Vec3::z();
    }
    let mut n = Vec3::zeros();
    for i in 0..points.len() {
        let current = points[i];
        let next = points[(i + 1) % points.len()];
        n.x += (current.y - next.y) * (current.z + next.z);
        n.y += (current.z - next.z) * (current.x + next.x);
        n.z += (current.x - next.x) * (current.y + next.y);
    }
    if n.norm() < 1e-12 {
        Vec3::z()
    } else {
        n.normalize()
    }
}

/// Skin one contiguous run of section wires into a face.
fn skin_segment(wires: &[&Wire], max_degree: usize) -> Result<Face> {
    if wires.len() < 2 {
        return Err(RibloftError::EmptyRibSet(wires.len()));
    }
    let rows: Vec<Vec<Point3>> = wires.iter().map(|w| w.sample_uniform(SKIN_SAMPLES)).collect();
    if rows.iter().any(|r| r.len() < 2) {
        return Err(RibloftError::LoftFailed(
            "degenerate section wire".to_string(),
        ));
    }
    let degree_v = max_degree.min(wires.len() - 1).max(1);
    let surface = BSplineSurface::skinned(&rows, 3, degree_v);
    Ok(Face::Skin { surface })
}

/// Cap a rib with a planar face when its wire is closed.
pub(crate) fn cap_rib(rib: &Rib) -> Result<Face> {
    let wire = rib
        .single_wire()
        .map_err(|_| RibloftError::UnbuildableFace("rib is not a single wire".to_string()))?
        .clone();
    if !wire.is_closed() {
        return Err(RibloftError::UnbuildableFace(
            "end wire is not closed".to_string(),
        ));
    }
    let normal = boundary_normal(&wire.sample_uniform(SKIN_SAMPLES));
    Ok(Face::PlanarCap { wire, normal })
}

/// Loft a run of ribs into the best shape the input allows.
///
/// Ribs that are not single wires make lofting impossible; the result is
/// then the raw wire compound. Segments longer than `max_segment_size`
/// ribs are skinned independently, sharing their boundary rib with the
/// next segment. With `want_solid` the two end wires are capped when
/// closed, and the shell is sealed only when both caps were buildable.
/// Every failure degrades to the next best shape; nothing panics.
pub fn make_surface_solid(
    ribs: &[Rib],
    want_solid: bool,
    max_degree: usize,
    max_segment_size: usize,
) -> Shape {
    let all_wires: Vec<Wire> = ribs.iter().flat_map(|r| r.wires.clone()).collect();

    let mut section_wires: Vec<&Wire> = Vec::with_capacity(ribs.len());
    for rib in ribs {
        match rib.single_wire() {
            Ok(w) => section_wires.push(w),
            Err(e) => {
                log::error!("{e}, surface creation is not possible");
                return Shape::Compound(all_wires);
            }
        }
    }
    if section_wires.len() < 2 {
        log::error!("{}", RibloftError::EmptyRibSet(section_wires.len()));
        return Shape::Compound(all_wires);
    }

    let mut faces = Vec::new();
    let mut start = 0usize;
    for (k, run) in plan_segments(section_wires.len(), max_segment_size)
        .into_iter()
        .enumerate()
    {
        // Adjacent segments share a boundary rib so the patches connect.
        let lo = if k == 0 { 0 } else { start - 1 };
        let hi = start + run;
        match skin_segment(&section_wires[lo..hi], max_degree) {
            Ok(face) => faces.push(face),
            Err(e) => {
                log::error!("{e}, creation of surface is not possible");
                return Shape::Compound(all_wires);
            }
        }
        start = hi;
    }

    if want_solid {
        let cap1 = cap_rib(&ribs[0]).map_err(|e| log::error!("{e}")).ok();
        let cap2 = cap_rib(&ribs[ribs.len() - 1])
            .map_err(|e| log::error!("{e}"))
            .ok();
        let sealed = cap1.is_some() && cap2.is_some();
        faces.extend(cap1);
        faces.extend(cap2);
        let shell = Shell { faces };
        if sealed {
            return Shape::Solid(Solid { shell });
        }
        log::error!("creating solid failed, leaving an open shell");
        return Shape::Shell(shell);
    }

    Shape::Surface(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Edge;
    use approx::assert_relative_eq;

    fn square_rib(x: f64, size: f64, fraction: f64) -> Rib {
        let h = size / 2.0;
        let p = [
            Point3::new(x, -h, -h),
            Point3::new(x, h, -h),
            Point3::new(x, h, h),
            Point3::new(x, -h, h),
        ];
        Rib::from_wire(
            Wire::new(vec![
                Edge::line(p[0], p[1]),
                Edge::line(p[1], p[2]),
                Edge::line(p[2], p[3]),
                Edge::line(p[3], p[0]),
            ]),
            fraction,
        )
    }

    fn rib_run(n: usize) -> Vec<Rib> {
        (0..n)
            .map(|i| square_rib(i as f64, 2.0, i as f64 / (n - 1) as f64))
            .collect()
    }

    #[test]
    fn test_plan_segments_no_split_needed() {
        assert_eq!(plan_segments(10, 16), vec![10]);
        assert_eq!(plan_segments(16, 16), vec![16]);
        assert_eq!(plan_segments(40, 0), vec![40]);
    }

    #[test]
    fn test_plan_segments_forty_by_sixteen() {
        assert_eq!(plan_segments(40, 16), vec![16, 16, 8]);
    }

    #[test]
    fn test_plan_segments_small_remainder_balances() {
        assert_eq!(plan_segments(17, 16), vec![9, 8]);
        assert_eq!(plan_segments(34, 16), vec![16, 9, 9]);
    }

    #[test]
    fn test_loft_two_ribs_gives_one_face() {
        let ribs = rib_run(2);
        let shape = make_surface_solid(&ribs, false, 5, 16);
        assert_eq!(shape.face_count(), 1);
    }

    #[test]
    fn test_segmented_loft_face_count() {
        let ribs = rib_run(40);
        let shape = make_surface_solid(&ribs, false, 5, 16);
        assert_eq!(shape.face_count(), 3);
    }

    #[test]
    fn test_solid_from_closed_ribs() {
        let ribs = rib_run(5);
        let shape = make_surface_solid(&ribs, true, 5, 16);
        match shape {
            Shape::Solid(solid) => {
                // one skin plus two caps
                assert_eq!(solid.shell.faces.len(), 3);
            }
            other => panic!("expected a solid, got {other:?}"),
        }
    }

    #[test]
    fn test_open_ribs_cannot_seal() {
        let open = |x: f64, fraction: f64| {
            Rib::from_wire(
                Wire::from_edge(Edge::line(
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x, 1.0, 0.0),
                )),
                fraction,
            )
        };
        let ribs = vec![open(0.0, 0.0), open(1.0, 1.0)];
        let shape = make_surface_solid(&ribs, true, 5, 16);
        assert!(matches!(shape, Shape::Shell(_)));
    }

    #[test]
    fn test_skin_surface_interpolates_corner_sections() {
        let ribs = rib_run(3);
        let shape = make_surface_solid(&ribs, false, 5, 16);
        match shape {
            Shape::Surface(faces) => match &faces[0] {
                Face::Skin { surface } => {
                    let p = surface.eval(0.0, 0.0);
                    assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
                    let q = surface.eval(0.0, 1.0);
                    assert_relative_eq!(q.x, 2.0, epsilon = 1e-9);
                }
                other => panic!("expected a skin face, got {other:?}"),
            },
            other => panic!("expected a surface, got {other:?}"),
        }
    }

    #[test]
    fn test_single_rib_falls_back_to_compound() {
        let ribs = rib_run(2);
        let shape = make_surface_solid(&ribs[..1], false, 5, 16);
        assert!(matches!(shape, Shape::Compound(_)));
    }

    #[test]
    fn test_multi_wire_rib_falls_back_to_compound() {
        let mut ribs = rib_run(3);
        ribs[1] = Rib {
            wires: vec![
                Wire::from_edge(Edge::line(
                    Point3::new(1.0, -1.0, 0.0),
                    Point3::new(1.0, 1.0, 0.0),
                )),
                Wire::from_edge(Edge::line(
                    Point3::new(1.0, 0.0, -1.0),
                    Point3::new(1.0, 0.0, 1.0),
                )),
            ],
            fraction: 0.5,
        };
        let shape = make_surface_solid(&ribs, true, 5, 16);
        match shape {
            Shape::Compound(wires) => assert_eq!(wires.len(), 4),
            other => panic!("expected a compound, got {other:?}"),
        }
    }

    #[test]
    fn test_cap_rejects_open_wire() {
        let open = Rib::from_wire(
            Wire::from_edge(Edge::line(Point3::origin(), Point3::new(0.0, 1.0, 0.0))),
            0.0,
        );
        assert!(matches!(
            cap_rib(&open),
            Err(RibloftError::UnbuildableFace(_))
        ));
    }
}
