//! Direction flipping between content space and the local authoring frame.
//!
//! Every edge is authored as if it ran from the origin towards the
//! bottom-right: the target sits at `(|dx|, |dy|)` and each port direction is
//! mirrored accordingly. [`LocalFrame::to_content`] maps the finished
//! geometry back.

use super::{EdgePath, RenderFrame};
use crate::geom::Point;
use crate::path::Path;

/// Rotate `point` around `center` by the angle of the unit `vector`.
pub(crate) fn rotate(point: Point, vector: Point, center: Point) -> Point {
    let rel = point - center;
    Point::new(
        center.x + rel.x * vector.x - rel.y * vector.y,
        center.y + rel.x * vector.y + rel.y * vector.x,
    )
}

/// Unit vector of `angle`, mirrored by the flip factors.
pub(crate) fn flip_direction(angle: f64, flip_x: f64, flip_y: f64) -> Point {
    Point::new(flip_x * angle.cos(), flip_y * angle.sin())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LocalFrame {
    origin: Point,
    pub flip_x: f64,
    pub flip_y: f64,
    /// Target position in the local frame (both coordinates >= 0).
    pub to: Point,
    pub from_vect: Point,
    pub to_vect: Point,
}

impl LocalFrame {
    pub fn new(source: &RenderFrame, target: &RenderFrame) -> Self {
        let delta = target.center - source.center;
        let flip_x = if delta.x < 0.0 { -1.0 } else { 1.0 };
        let flip_y = if delta.y < 0.0 { -1.0 } else { 1.0 };

        Self {
            origin: source.center,
            flip_x,
            flip_y,
            to: Point::new(delta.x.abs(), delta.y.abs()),
            from_vect: flip_direction(source.direction, flip_x, flip_y),
            to_vect: flip_direction(target.direction, flip_x, flip_y),
        }
    }

    /// Express a content-space vector (e.g. a detour offset) locally.
    pub fn flip_vector(&self, vector: Point) -> Point {
        Point::new(vector.x * self.flip_x, vector.y * self.flip_y)
    }

    pub fn to_content(&self, point: Point) -> Point {
        self.origin + self.flip_vector(point)
    }

    fn path_to_content(&self, path: &Path) -> Path {
        let mirrored = self.flip_x * self.flip_y < 0.0;
        path.mapped(|p| self.to_content(p), 1.0, mirrored)
    }

    pub fn edge_to_content(&self, local: EdgePath) -> EdgePath {
        EdgePath {
            line: self.path_to_content(&local.line),
            midpoint: self.to_content(local.midpoint),
            source_arrow: local.source_arrow.map(|p| self.path_to_content(&p)),
            target_arrow: local.target_arrow.map(|p| self.path_to_content(&p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Size;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn frame(x: f64, y: f64, direction: f64) -> RenderFrame {
        RenderFrame {
            center: Point::new(x, y),
            size: Size::ZERO,
            direction,
        }
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = rotate(Point::new(10.0, 0.0), Point::from_angle(FRAC_PI_2), Point::ZERO);
        assert!(close(p, Point::new(0.0, 10.0)));

        let q = rotate(Point::new(12.0, 5.0), Point::from_angle(PI), Point::new(10.0, 5.0));
        assert!(close(q, Point::new(8.0, 5.0)));
    }

    #[test]
    fn test_forward_frame_is_not_flipped() {
        let f = LocalFrame::new(&frame(0.0, 0.0, 0.0), &frame(100.0, 50.0, 0.0));
        assert_eq!(f.flip_x, 1.0);
        assert_eq!(f.flip_y, 1.0);
        assert_eq!(f.to, Point::new(100.0, 50.0));
        assert_eq!(f.from_vect, Point::new(1.0, 0.0));
    }

    #[test]
    fn test_backward_frame_mirrors_directions() {
        let f = LocalFrame::new(&frame(100.0, 100.0, 0.0), &frame(0.0, 40.0, 0.0));
        assert_eq!(f.flip_x, -1.0);
        assert_eq!(f.flip_y, -1.0);
        assert_eq!(f.to, Point::new(100.0, 60.0));
        assert_eq!(f.from_vect.x, -1.0);
        assert!(close(f.to_content(f.to), Point::new(0.0, 40.0)));
        assert!(close(f.to_content(Point::ZERO), Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_single_axis_flip_mirrors_arcs() {
        let f = LocalFrame::new(&frame(0.0, 0.0, 0.0), &frame(-10.0, 10.0, 0.0));
        let mut line = Path::new();
        line.move_to(Point::ZERO)
            .arc_to(5.0, false, true, Point::new(10.0, 10.0));

        let edge = f.edge_to_content(EdgePath {
            line,
            midpoint: Point::new(5.0, 5.0),
            source_arrow: None,
            target_arrow: None,
        });

        assert_eq!(edge.line.to_string(), "M 0 0 A 5 5 0 0 0 -10 10");
        assert!(close(edge.midpoint, Point::new(-5.0, 5.0)));
    }
}
