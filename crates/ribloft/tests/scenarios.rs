//! End-to-end generator scenarios.

use approx::assert_relative_eq;
use ribloft::{
    make_curved_array, Distribution, DistributionKind, Edge, Point3, RibConfig, Shape, Vec3, Wire,
};

fn square_profile(size: f64) -> Vec<Wire> {
    let h = size / 2.0;
    let p = [
        Point3::new(0.0, -h, -h),
        Point3::new(0.0, h, -h),
        Point3::new(0.0, h, h),
        Point3::new(0.0, -h, h),
    ];
    vec![Wire::new(vec![
        Edge::line(p[0], p[1]),
        Edge::line(p[1], p[2]),
        Edge::line(p[2], p[3]),
        Edge::line(p[3], p[0]),
    ])]
}

/// Two straight hull lines at z = -1 and z = 1 running along x.
fn tube_hulls(length: f64) -> Vec<Wire> {
    vec![
        Wire::from_edge(Edge::line(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(length, 0.0, -1.0),
        )),
        Wire::from_edge(Edge::line(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(length, 0.0, 1.0),
        )),
    ]
}

#[test]
fn uniform_tube_has_five_equal_ribs() {
    let config = RibConfig {
        item_count: 5,
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), tube_hulls(10.0), Vec3::x(), &config)
        .expect("array generation");
    let wires = match &shape {
        Shape::Compound(wires) => wires,
        other => panic!("expected a compound, got {other:?}"),
    };
    assert_eq!(wires.len(), 5);
    for (i, w) in wires.iter().enumerate() {
        let bb = w.bounds();
        assert_relative_eq!(bb.center().x, 10.0 * i as f64 / 4.0, epsilon = 1e-6);
        // Constant envelope keeps every rib the same size
        assert_relative_eq!(bb.length(2), 2.0, epsilon = 1e-5);
    }
}

#[test]
fn elliptic_distribution_places_ribs() {
    let config = RibConfig {
        item_count: 3,
        distribution: Distribution::new(DistributionKind::Elliptic),
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), tube_hulls(10.0), Vec3::x(), &config)
        .expect("array generation");
    let wires = match &shape {
        Shape::Compound(wires) => wires,
        other => panic!("expected a compound, got {other:?}"),
    };
    assert_eq!(wires.len(), 3);
    // elliptic maps 0, 0.5, 1 to 1, sqrt(0.75), 0
    let expected = [10.0, 10.0 * 0.75_f64.sqrt(), 0.0];
    for (w, x) in wires.iter().zip(expected) {
        assert_relative_eq!(w.bounds().center().x, x, epsilon = 1e-4);
    }
}

#[test]
fn explicit_fractions_override_item_count() {
    let config = RibConfig {
        item_count: 7,
        explicit_fractions: vec![0.0, 0.3, 1.0],
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), tube_hulls(10.0), Vec3::x(), &config)
        .expect("array generation");
    let wires = match &shape {
        Shape::Compound(wires) => wires,
        other => panic!("expected a compound, got {other:?}"),
    };
    assert_eq!(wires.len(), 3);
    let centers: Vec<f64> = wires.iter().map(|w| w.bounds().center().x).collect();
    assert_relative_eq!(centers[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(centers[1], 3.0, epsilon = 1e-6);
    assert_relative_eq!(centers[2], 10.0, epsilon = 1e-6);
}

#[test]
fn long_rib_run_lofts_in_three_segments() {
    let config = RibConfig {
        item_count: 40,
        want_surface: true,
        loft_max_segment_size: 16,
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), tube_hulls(10.0), Vec3::x(), &config)
        .expect("array generation");
    match shape {
        Shape::Surface(faces) => assert_eq!(faces.len(), 3),
        other => panic!("expected a surface, got {other:?}"),
    }
}

#[test]
fn missed_hull_position_drops_exactly_one_rib() {
    // The lower hull stops at x = 4, so the plane at x = 8 misses it.
    let hulls = vec![
        Wire::from_edge(Edge::line(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(4.0, 0.0, -1.0),
        )),
        Wire::from_edge(Edge::line(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(10.0, 0.0, 1.0),
        )),
    ];
    let config = RibConfig {
        explicit_fractions: vec![0.0, 0.5, 2.0],
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), hulls, Vec3::x(), &config)
        .expect("array generation");
    let wires = match &shape {
        Shape::Compound(wires) => wires,
        other => panic!("expected a compound, got {other:?}"),
    };
    assert_eq!(wires.len(), 2);
    assert_relative_eq!(wires[0].bounds().center().x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(wires[1].bounds().center().x, 2.0, epsilon = 1e-6);
}

#[test]
fn solid_tube_is_sealed() {
    let config = RibConfig {
        item_count: 5,
        want_solid: true,
        ..RibConfig::default()
    };
    let shape = make_curved_array(square_profile(2.0), tube_hulls(10.0), Vec3::x(), &config)
        .expect("array generation");
    match shape {
        Shape::Solid(solid) => assert_eq!(solid.shell.faces.len(), 3),
        other => panic!("expected a solid, got {other:?}"),
    }
}
