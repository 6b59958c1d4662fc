//! Routes between two different ports of the same node.
//!
//! A direct line would cut through the node, so the route is pushed out by
//! the configured detour vector (given in content space) before returning.

use super::frame::LocalFrame;
use super::line::{line_arrows, Ends};
use super::{ArrowConfig, DetourConfig, EdgePath};
use crate::geom::Point;
use crate::path::{rounded_path, Path};

fn detour_vector(frame: &LocalFrame, detour: &DetourConfig) -> Point {
    frame.flip_vector(Point::from_angle(detour.direction) * detour.distance)
}

pub(crate) fn polyline(
    frame: &LocalFrame,
    arrow: &ArrowConfig,
    detour: &DetourConfig,
    roundness: f64,
) -> EdgePath {
    let ends = Ends::new(frame, arrow);
    let dv = detour_vector(frame, detour);
    let out = ends.begin_line + dv;
    let back = ends.end_line + dv;

    let points = [
        ends.begin_arrow,
        ends.begin_line,
        out,
        back,
        ends.end_line,
        ends.end_arrow,
    ];

    let (source_arrow, target_arrow) = line_arrows(frame, arrow);
    EdgePath {
        line: rounded_path(&points, roundness),
        midpoint: out.midpoint(back),
        source_arrow,
        target_arrow,
    }
}

pub(crate) fn bezier(
    frame: &LocalFrame,
    arrow: &ArrowConfig,
    detour: &DetourConfig,
    curvature: f64,
) -> EdgePath {
    let ends = Ends::new(frame, arrow);
    let dv = detour_vector(frame, detour);
    let pb = ends.begin_arrow;
    let pe = ends.end_arrow;
    let c1 = pb + frame.from_vect * curvature;
    let c2 = pe - frame.to_vect * curvature;
    let mid = (c1 + dv).midpoint(c2 + dv);

    let mut line = Path::new();
    line.move_to(pb)
        .cubic_to(c1, c1 + dv, mid)
        .cubic_to(c2 + dv, c2, pe);

    let (source_arrow, target_arrow) = line_arrows(frame, arrow);
    EdgePath {
        line,
        midpoint: mid,
        source_arrow,
        target_arrow,
    }
}
