//! SVG path values for edges and arrowheads.
//!
//! Geometry is built as a list of [`PathCommand`]s and only turned into an
//! SVG path string at the end, so the same path can be mirrored into content
//! space or mapped onto the screen without re-running the routing.

use crate::geom::Point;
use crate::viewport::ViewportTransform;
use std::fmt;

/// One SVG path command with absolute coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// Circular arc (`A r r 0 large_arc sweep x y`).
    ArcTo {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// An SVG path made of absolute commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, to: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(to));
        self
    }

    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(to));
        self
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
        self
    }

    pub fn arc_to(&mut self, radius: f64, large_arc: bool, sweep: bool, to: Point) -> &mut Self {
        self.commands.push(PathCommand::ArcTo {
            radius,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Number of arc commands in the path.
    pub fn arc_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::ArcTo { .. }))
            .count()
    }

    /// First point of the path, if any.
    pub fn start(&self) -> Option<Point> {
        match self.commands.first() {
            Some(PathCommand::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    /// Last explicit end point of the path, if any.
    pub fn end(&self) -> Option<Point> {
        self.commands.iter().rev().find_map(|c| match *c {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::CubicTo { to, .. } | PathCommand::ArcTo { to, .. } => Some(to),
            PathCommand::Close => None,
        })
    }

    /// Apply a point mapping that scales lengths uniformly by `radius_scale`.
    ///
    /// `mirrored` must be true when the mapping reverses orientation (a flip
    /// along exactly one axis); arc sweep flags are inverted in that case.
    pub(crate) fn mapped<F>(&self, map: F, radius_scale: f64, mirrored: bool) -> Path
    where
        F: Fn(Point) -> Point,
    {
        let commands = self
            .commands
            .iter()
            .map(|c| match *c {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(map(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(map(p)),
                PathCommand::CubicTo { ctrl1, ctrl2, to } => PathCommand::CubicTo {
                    ctrl1: map(ctrl1),
                    ctrl2: map(ctrl2),
                    to: map(to),
                },
                PathCommand::ArcTo {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => PathCommand::ArcTo {
                    radius: radius * radius_scale,
                    large_arc,
                    sweep: sweep != mirrored,
                    to: map(to),
                },
                PathCommand::Close => PathCommand::Close,
            })
            .collect();
        Path { commands }
    }

    /// Map a content-space path into screen space.
    pub fn transformed(&self, viewport: &ViewportTransform) -> Path {
        self.mapped(
            |p| viewport.point_to_screen(p),
            viewport.absolute_scale(),
            false,
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match *command {
                PathCommand::MoveTo(p) => write!(f, "M {} {}", fmt_number(p.x), fmt_number(p.y))?,
                PathCommand::LineTo(p) => write!(f, "L {} {}", fmt_number(p.x), fmt_number(p.y))?,
                PathCommand::CubicTo { ctrl1, ctrl2, to } => write!(
                    f,
                    "C {} {} {} {} {} {}",
                    fmt_number(ctrl1.x),
                    fmt_number(ctrl1.y),
                    fmt_number(ctrl2.x),
                    fmt_number(ctrl2.y),
                    fmt_number(to.x),
                    fmt_number(to.y)
                )?,
                PathCommand::ArcTo {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => write!(
                    f,
                    "A {r} {r} 0 {} {} {} {}",
                    u8::from(large_arc),
                    u8::from(sweep),
                    fmt_number(to.x),
                    fmt_number(to.y),
                    r = fmt_number(radius)
                )?,
                PathCommand::Close => f.write_str("Z")?,
            }
        }
        Ok(())
    }
}

/// Stringify a coordinate with at most three fractional digits.
///
/// Keeps path strings stable across platforms and free of `-0` and float
/// noise such as `6.123233995736766e-17` from `cos(π/2)`.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Build a polyline through `points` whose interior corners are rounded.
///
/// Each corner is replaced by `L a C corner corner b`, where `a` and `b` sit
/// `r = min(roundness, |in| / 2, |out| / 2)` away from the corner along the
/// incoming and outgoing segments. Halving the segment lengths keeps two
/// neighbouring roundings from overlapping.
///
/// # Arguments
/// * `points` - Waypoints in drawing order
/// * `roundness` - Requested corner radius (0 for sharp corners)
pub fn rounded_path(points: &[Point], roundness: f64) -> Path {
    let mut path = Path::new();
    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);

    if rest.is_empty() {
        return path;
    }

    let last = points.len() - 1;
    for i in 1..last {
        let prev = points[i - 1];
        let corner = points[i];
        let next = points[i + 1];

        let incoming = corner.distance(prev);
        let outgoing = next.distance(corner);
        let radius = roundness.min(incoming / 2.0).min(outgoing / 2.0);

        if radius <= 0.0 {
            path.line_to(corner);
            continue;
        }

        let a = corner - (corner - prev) * (radius / incoming);
        let b = corner + (next - corner) * (radius / outgoing);
        path.line_to(a).cubic_to(corner, corner, b);
    }

    path.line_to(points[last]);
    path
}

/// Cubic bezier curve used to locate landmarks on curved edges
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f64) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x
            + 3.0 * mt2 * t * self.p1.x
            + 3.0 * mt * t2 * self.p2.x
            + t3 * self.p3.x;
        let y = mt3 * self.p0.y
            + 3.0 * mt2 * t * self.p1.y
            + 3.0 * mt * t2 * self.p2.y
            + t3 * self.p3.y;

        Point::new(x, y)
    }
}
