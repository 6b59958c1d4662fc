//! Level 3: Edge Path Geometry
//!
//! Tests the public geometry entry point for each routing category.

mod common;

use slint_graph_canvas::{
    compute_path, ArcArrow, ArrowConfig, ArrowParams, ArrowRenderer, ArrowShape, EdgeShape,
    Path, PathCommand, Point, RenderFrame, RoundedShape, RoutingCategory, Size,
};
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

fn frame(x: f64, y: f64, direction: f64) -> RenderFrame {
    RenderFrame::new(Point::new(x, y), Size::new(10.0, 10.0), direction)
}

/// Every point a path passes through, control points included.
fn points(path: &Path) -> Vec<Point> {
    path.commands()
        .iter()
        .flat_map(|cmd| match *cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
            PathCommand::CubicTo { ctrl1, ctrl2, to } => vec![ctrl1, ctrl2, to],
            PathCommand::ArcTo { to, .. } => vec![to],
            PathCommand::Close => vec![],
        })
        .collect()
}

#[test]
fn test_straight_line_leaves_arrow_gap() {
    let mut shape = EdgeShape::straight();
    shape.arrow_mut().offset = 10.0;

    let edge = compute_path(
        &frame(0.0, 0.0, 0.0),
        &frame(100.0, 100.0, 0.0),
        RoutingCategory::Line,
        &shape,
    );

    let line = edge.path_string();
    assert!(line.starts_with("M 0 0 L 15 0 "), "got {}", line);
    assert_eq!(edge.line.end(), Some(Point::new(85.0, 100.0)));
    assert_eq!(
        edge.target_arrow.map(|a| a.to_string()).as_deref(),
        Some("M 100 100 L 85 96 L 85 104 Z")
    );
}

#[test]
fn test_port_cycle_is_closed_loop() {
    let edge = compute_path(
        &frame(0.0, 0.0, 0.0),
        &frame(0.0, 0.0, 0.0),
        RoutingCategory::PortCycle,
        &EdgeShape::default(),
    );

    assert!(!edge.is_empty());
    assert!(edge.line.arc_count() >= 2);
    // Back onto the stem, stopping at the base of the target arrow
    assert_eq!(edge.line.start(), Some(Point::ZERO));
    assert_eq!(edge.line.end(), Some(Point::new(15.0, 0.0)));
    assert!(edge.target_arrow.is_some());
    // The loop reaches out in the port direction
    assert!(edge.midpoint.x > 30.0);
}

#[test]
fn test_port_cycle_follows_port_direction() {
    let edge = compute_path(
        &frame(50.0, 50.0, FRAC_PI_2),
        &frame(50.0, 50.0, FRAC_PI_2),
        RoutingCategory::PortCycle,
        &EdgeShape::straight(),
    );

    assert!((edge.midpoint.x - 50.0).abs() < 1e-6);
    assert!(edge.midpoint.y > 80.0);
}

#[test]
fn test_node_cycle_detours_around_node() {
    for shape in [EdgeShape::bezier(), EdgeShape::straight(), EdgeShape::vertical()] {
        let edge = compute_path(
            &frame(100.0, 25.0, 0.0),
            &frame(0.0, 25.0, 0.0),
            RoutingCategory::NodeCycle,
            &shape,
        );

        // Polyline detours put the midpoint exactly one detour distance out
        if !matches!(shape, EdgeShape::Bezier(_)) {
            let chord_mid = Point::new(50.0, 25.0);
            assert!((edge.midpoint.distance(chord_mid) - 100.0).abs() < 1e-6);
        }
        assert!(edge.midpoint.y < -50.0);
        let top = points(&edge.line)
            .into_iter()
            .map(|p| p.y)
            .fold(f64::INFINITY, f64::min);
        assert!(top <= -75.0 + 1e-6, "route must leave the node, top = {}", top);
    }
}

/// Orthogonal shapes with sharp corners, paired with the port direction they
/// route along.
fn sharp_orthogonal() -> [(EdgeShape, f64); 2] {
    let sharp = RoundedShape {
        roundness: 0.0,
        ..Default::default()
    };
    [
        (EdgeShape::Horizontal(sharp.clone()), 0.0),
        (EdgeShape::Vertical(sharp), FRAC_PI_2),
    ]
}

fn assert_mirrored(forward: &Path, mirrored: &Path, mirror: impl Fn(Point) -> Point) {
    let expected: Vec<Point> = points(forward).into_iter().map(mirror).collect();
    let actual = points(mirrored);
    assert_eq!(expected.len(), actual.len(), "{} vs {}", forward, mirrored);
    for (e, a) in expected.iter().zip(&actual) {
        assert!(e.distance(*a) < 1e-6, "{} vs {}", forward, mirrored);
    }
}

#[test]
fn test_orthogonal_routes_mirror_with_their_endpoints() {
    for (shape, dir) in sharp_orthogonal() {
        let forward = compute_path(
            &frame(0.0, 0.0, dir),
            &frame(100.0, 100.0, dir),
            RoutingCategory::Line,
            &shape,
        );

        // Reflected across x = 50: positions and directions flip horizontally
        let across_x = compute_path(
            &frame(100.0, 0.0, PI - dir),
            &frame(0.0, 100.0, PI - dir),
            RoutingCategory::Line,
            &shape,
        );
        let flip_x = |p: Point| Point::new(100.0 - p.x, p.y);
        assert_mirrored(&forward.line, &across_x.line, flip_x);
        assert!(across_x.midpoint.distance(flip_x(forward.midpoint)) < 1e-6);

        // Reflected across y = 50
        let across_y = compute_path(
            &frame(0.0, 100.0, -dir),
            &frame(100.0, 0.0, -dir),
            RoutingCategory::Line,
            &shape,
        );
        let flip_y = |p: Point| Point::new(p.x, 100.0 - p.y);
        assert_mirrored(&forward.line, &across_y.line, flip_y);
        assert!(across_y.midpoint.distance(flip_y(forward.midpoint)) < 1e-6);
    }
}

#[test]
fn test_orthogonal_route_stays_between_ports_when_flipped() {
    for (shape, dir) in sharp_orthogonal() {
        let edge = compute_path(
            &frame(100.0, 100.0, PI + dir),
            &frame(0.0, 0.0, PI + dir),
            RoutingCategory::Line,
            &shape,
        );
        for p in points(&edge.line) {
            assert!(
                (-1e-6..=100.0 + 1e-6).contains(&p.x) && (-1e-6..=100.0 + 1e-6).contains(&p.y),
                "{} leaves the box at {:?}",
                edge.line,
                p
            );
        }
    }
}

#[test]
fn test_vertical_route_wraps_when_target_is_above() {
    let sharp = RoundedShape {
        roundness: 0.0,
        ..Default::default()
    };
    // Both ports face down but the target sits above the source
    let edge = compute_path(
        &frame(0.0, 0.0, FRAC_PI_2),
        &frame(100.0, -100.0, FRAC_PI_2),
        RoutingCategory::Line,
        &EdgeShape::Vertical(sharp),
    );

    assert_eq!(
        edge.path_string(),
        "M 0 0 L 0 30 L 50 30 L 50 -130 L 100 -130 L 100 -115"
    );
}

#[test]
fn test_source_arrow_and_no_target_arrow() {
    let shape = EdgeShape::straight().with_arrow(ArrowConfig {
        source: true,
        target: false,
        ..Default::default()
    });
    let edge = compute_path(
        &frame(0.0, 0.0, 0.0),
        &frame(200.0, 0.0, 0.0),
        RoutingCategory::Line,
        &shape,
    );

    assert!(edge.source_arrow.is_some());
    assert!(edge.target_arrow.is_none());
    assert_eq!(edge.line.start(), Some(Point::new(15.0, 0.0)));
    assert_eq!(edge.line.end(), Some(Point::new(200.0, 0.0)));
}

#[test]
fn test_arrow_shapes() {
    let base = ArrowConfig::default();
    let custom = ArrowConfig {
        shape: ArrowShape::Custom(Rc::new(ArcArrow { radius: 5.0 })),
        ..Default::default()
    };
    let arc = ArrowConfig {
        shape: ArrowShape::Arc { radius: 5.0 },
        ..Default::default()
    };

    let render = |arrow: ArrowConfig| {
        compute_path(
            &frame(0.0, 0.0, 0.0),
            &frame(100.0, 0.0, 0.0),
            RoutingCategory::Line,
            &EdgeShape::bezier().with_arrow(arrow),
        )
        .target_arrow
        .map(|a| a.to_string())
    };

    let triangle = render(base).unwrap();
    assert!(triangle.ends_with('Z'));
    assert_eq!(render(custom), render(arc));

    let direct = ArcArrow { radius: 5.0 }.render(&ArrowParams {
        tip: Point::new(100.0, 0.0),
        direction: Point::new(1.0, 0.0),
        length: 15.0,
        width: 4.0,
    });
    assert!(direct.arc_count() > 0);
}

#[test]
fn test_paths_are_deterministic() {
    let source = frame(12.5, -3.0, 0.7);
    let target = frame(-40.0, 90.0, -2.1);
    for shape in [
        EdgeShape::bezier(),
        EdgeShape::straight(),
        EdgeShape::horizontal(),
        EdgeShape::vertical(),
    ] {
        let first = compute_path(&source, &target, RoutingCategory::Line, &shape);
        for _ in 0..3 {
            let again = compute_path(&source, &target, RoutingCategory::Line, &shape);
            assert_eq!(again.path_string(), first.path_string());
        }
    }
}
