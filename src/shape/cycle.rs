//! Loops for edges that start and end on the same port.
//!
//! The loop is drawn along +x and rotated onto the port direction: a short
//! stem, a small bend away from the port axis, a large circle around the far
//! end and the mirrored bend back onto the stem.

use super::frame::{rotate, LocalFrame};
use super::{arrows, ArrowConfig, CycleConfig, EdgePath};
use crate::geom::Point;
use crate::path::Path;

pub(crate) fn port_loop(frame: &LocalFrame, arrow: &ArrowConfig, cycle: &CycleConfig) -> EdgePath {
    let dir = frame.from_vect;
    let place = |x: f64, y: f64| rotate(Point::new(x, y), dir, Point::ZERO);

    let gap = arrow.gap();
    let r = cycle.small_radius;
    let big = cycle.radius;

    // The small bends are tangent to both the stem and the outer circle
    let center_x = gap + (big * big + 2.0 * big * r).sqrt();
    let bend = Point::new(gap, r);
    let touch = bend + (Point::new(center_x, 0.0) - bend) * (r / (big + r));

    let begin = if arrow.source { arrow.length } else { 0.0 };
    let end = if arrow.target { arrow.length } else { 0.0 };

    let mut line = Path::new();
    line.move_to(place(begin, 0.0))
        .line_to(place(gap, 0.0))
        .arc_to(r, false, true, place(touch.x, touch.y))
        .arc_to(big, true, false, place(touch.x, -touch.y))
        .arc_to(r, false, true, place(gap, 0.0))
        .line_to(place(end, 0.0));

    let (source_arrow, target_arrow) = arrows(arrow, Point::ZERO, dir, Point::ZERO, dir);
    EdgePath {
        line,
        midpoint: place(center_x + big, 0.0),
        source_arrow,
        target_arrow,
    }
}
