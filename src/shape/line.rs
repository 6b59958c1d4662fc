//! Routes between ports of different nodes.
//!
//! All functions work in the [`LocalFrame`]: the source sits at the origin and
//! the target at `frame.to`.

use super::frame::LocalFrame;
use super::{arrows, ArrowConfig, EdgePath};
use crate::geom::Point;
use crate::path::{rounded_path, CubicBezier, Path};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

/// Ends of a polyline route: arrow tips trimmed by the arrow length, and the
/// first/last bend pushed out by the arrow gap.
pub(crate) struct Ends {
    pub begin_arrow: Point,
    pub begin_line: Point,
    pub end_line: Point,
    pub end_arrow: Point,
}

impl Ends {
    pub fn new(frame: &LocalFrame, arrow: &ArrowConfig) -> Self {
        let gap = arrow.gap();
        Self {
            begin_arrow: if arrow.source {
                frame.from_vect * arrow.length
            } else {
                Point::ZERO
            },
            begin_line: frame.from_vect * gap,
            end_line: frame.to - frame.to_vect * gap,
            end_arrow: if arrow.target {
                frame.to - frame.to_vect * arrow.length
            } else {
                frame.to
            },
        }
    }
}

pub(crate) fn line_arrows(frame: &LocalFrame, arrow: &ArrowConfig) -> (Option<Path>, Option<Path>) {
    arrows(arrow, Point::ZERO, frame.from_vect, frame.to, -frame.to_vect)
}

pub(crate) fn bezier(frame: &LocalFrame, arrow: &ArrowConfig, curvature: f64) -> EdgePath {
    let ends = Ends::new(frame, arrow);
    let pb = ends.begin_arrow;
    let pe = ends.end_arrow;
    let c1 = pb + frame.from_vect * curvature;
    let c2 = pe - frame.to_vect * curvature;

    let mut line = Path::new();
    line.move_to(pb).cubic_to(c1, c2, pe);

    let (source_arrow, target_arrow) = line_arrows(frame, arrow);
    EdgePath {
        line,
        midpoint: CubicBezier::new(pb, c1, c2, pe).eval(0.5),
        source_arrow,
        target_arrow,
    }
}

pub(crate) fn straight(frame: &LocalFrame, arrow: &ArrowConfig, roundness: f64) -> EdgePath {
    let ends = Ends::new(frame, arrow);
    let points = [ends.begin_arrow, ends.begin_line, ends.end_line, ends.end_arrow];

    let (source_arrow, target_arrow) = line_arrows(frame, arrow);
    EdgePath {
        line: rounded_path(&points, roundness),
        midpoint: ends.begin_line.midpoint(ends.end_line),
        source_arrow,
        target_arrow,
    }
}

// Port directions like pi/2 leave a ~1e-17 residue on the other axis
fn faces_backward(component: f64) -> bool {
    component < -1e-9
}

/// Where the two jog waypoints sit along the routing axis.
///
/// `begin` and `end` are the line's first and last bend on that axis and `to`
/// is the target coordinate. `from_back` / `to_back` tell whether the source
/// leaves or the target arrives against the axis.
fn jog_positions(
    begin: f64,
    end: f64,
    to: f64,
    gap: f64,
    from_back: bool,
    to_back: bool,
) -> (f64, f64) {
    match (from_back, to_back) {
        (false, false) => {
            let x = ((begin + end) / 2.0).max(gap);
            (x, to - x)
        }
        // Wrap around both ends
        (true, true) => (-gap, to + gap),
        // Target is entered from beyond its far side
        (false, true) => {
            let x = begin.max(end);
            (x, x)
        }
        (true, false) => {
            let x = begin.min(end);
            (x, x)
        }
    }
}

/// Orthogonal route. A horizontal route leaves along x, jogs across at half
/// the vertical distance and arrives along x; a vertical one swaps the axes.
///
/// Only the local port directions decide the jog. An end whose direction
/// points against the local axis loops out by the arrow gap before turning,
/// so mirrored endpoints give mirrored routes.
pub(crate) fn orthogonal(
    frame: &LocalFrame,
    arrow: &ArrowConfig,
    roundness: f64,
    axis: Axis,
) -> EdgePath {
    let ends = Ends::new(frame, arrow);
    let gap = arrow.gap();
    let bl = ends.begin_line;
    let el = ends.end_line;

    let (mut points, jog_start, jog_end) = match axis {
        Axis::Horizontal => {
            let (jb, je) = jog_positions(
                bl.x,
                el.x,
                frame.to.x,
                gap,
                faces_backward(frame.from_vect.x),
                faces_backward(frame.to_vect.x),
            );
            let mid_y = frame.to.y / 2.0;
            let a = Point::new(jb, mid_y);
            let b = Point::new(je, mid_y);
            (
                vec![
                    ends.begin_arrow,
                    bl,
                    Point::new(jb, bl.y),
                    a,
                    b,
                    Point::new(je, el.y),
                    el,
                    ends.end_arrow,
                ],
                a,
                b,
            )
        }
        Axis::Vertical => {
            let (jb, je) = jog_positions(
                bl.y,
                el.y,
                frame.to.y,
                gap,
                faces_backward(frame.from_vect.y),
                faces_backward(frame.to_vect.y),
            );
            let mid_x = frame.to.x / 2.0;
            let a = Point::new(mid_x, jb);
            let b = Point::new(mid_x, je);
            (
                vec![
                    ends.begin_arrow,
                    bl,
                    Point::new(bl.x, jb),
                    a,
                    b,
                    Point::new(el.x, je),
                    el,
                    ends.end_arrow,
                ],
                a,
                b,
            )
        }
    };
    points.dedup_by(|a, b| a.distance(*b) < 1e-9);

    let (source_arrow, target_arrow) = line_arrows(frame, arrow);
    EdgePath {
        line: rounded_path(&points, roundness),
        midpoint: jog_start.midpoint(jog_end),
        source_arrow,
        target_arrow,
    }
}
