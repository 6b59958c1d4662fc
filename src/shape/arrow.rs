//! Arrowhead shapes.
//!
//! An arrow is anchored at its tip and extends `length` along `direction`
//! (a unit vector pointing from the tip towards the line). The edge line is
//! trimmed so it ends where the arrow's base begins.

use super::frame::rotate;
use crate::geom::Point;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Placement of one arrowhead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowParams {
    pub tip: Point,
    /// Unit vector from the tip towards the arrow base.
    pub direction: Point,
    pub length: f64,
    /// Half of the base width.
    pub width: f64,
}

impl ArrowParams {
    /// Map a point given in arrow space (tip at origin, base along +x).
    fn place(&self, x: f64, y: f64) -> Point {
        rotate(Point::new(x, y), self.direction, Point::ZERO) + self.tip
    }
}

/// Renders an arrowhead path.
///
/// Implement this to plug custom arrowheads into [`ArrowShape::Custom`].
pub trait ArrowRenderer {
    fn render(&self, params: &ArrowParams) -> Path;
}

/// Filled triangle.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriangleArrow;

impl ArrowRenderer for TriangleArrow {
    fn render(&self, params: &ArrowParams) -> Path {
        let mut path = Path::new();
        path.move_to(params.place(0.0, 0.0))
            .line_to(params.place(params.length, params.width))
            .line_to(params.place(params.length, -params.width))
            .close();
        path
    }
}

/// Triangle whose base is a concave arc of `radius`.
#[derive(Clone, Copy, Debug)]
pub struct ArcArrow {
    pub radius: f64,
}

impl ArrowRenderer for ArcArrow {
    fn render(&self, params: &ArrowParams) -> Path {
        // An arc cannot span a chord longer than its diameter
        let radius = self.radius.max(params.width);
        let mut path = Path::new();
        path.move_to(params.place(0.0, 0.0))
            .line_to(params.place(params.length, params.width))
            .arc_to(radius, false, true, params.place(params.length, -params.width))
            .close();
        path
    }
}

/// Triangle with a notch cut into its base; `notch` is the fraction of the
/// length at which the notch sits.
#[derive(Clone, Copy, Debug)]
pub struct WedgeArrow {
    pub notch: f64,
}

impl ArrowRenderer for WedgeArrow {
    fn render(&self, params: &ArrowParams) -> Path {
        let notch = self.notch.clamp(0.0, 1.0) * params.length;
        let mut path = Path::new();
        path.move_to(params.place(0.0, 0.0))
            .line_to(params.place(params.length, params.width))
            .line_to(params.place(notch, 0.0))
            .line_to(params.place(params.length, -params.width))
            .close();
        path
    }
}

fn default_arc_radius() -> f64 {
    10.0
}

fn default_notch() -> f64 {
    0.7
}

/// Arrowhead selection for an edge shape.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArrowShape {
    #[default]
    Triangle,
    Arc {
        #[serde(default = "default_arc_radius")]
        radius: f64,
    },
    Wedge {
        #[serde(default = "default_notch")]
        notch: f64,
    },
    /// Application-provided renderer; not serializable.
    #[serde(skip)]
    Custom(Rc<dyn ArrowRenderer>),
}

impl ArrowShape {
    pub fn render(&self, params: &ArrowParams) -> Path {
        match self {
            Self::Triangle => TriangleArrow.render(params),
            Self::Arc { radius } => ArcArrow { radius: *radius }.render(params),
            Self::Wedge { notch } => WedgeArrow { notch: *notch }.render(params),
            Self::Custom(renderer) => renderer.render(params),
        }
    }
}

impl fmt::Debug for ArrowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triangle => write!(f, "Triangle"),
            Self::Arc { radius } => f.debug_struct("Arc").field("radius", radius).finish(),
            Self::Wedge { notch } => f.debug_struct("Wedge").field("notch", notch).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for ArrowShape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Triangle, Self::Triangle) => true,
            (Self::Arc { radius: a }, Self::Arc { radius: b }) => a == b,
            (Self::Wedge { notch: a }, Self::Wedge { notch: b }) => a == b,
            (Self::Custom(a), Self::Custom(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(direction: Point) -> ArrowParams {
        ArrowParams {
            tip: Point::new(100.0, 100.0),
            direction,
            length: 15.0,
            width: 4.0,
        }
    }

    #[test]
    fn test_triangle_pointing_right() {
        // Base to the left of the tip: the arrow points right
        let path = ArrowShape::Triangle.render(&params(Point::new(-1.0, 0.0)));
        assert_eq!(path.to_string(), "M 100 100 L 85 96 L 85 104 Z");
    }

    #[test]
    fn test_triangle_pointing_down() {
        let path = TriangleArrow.render(&params(Point::new(0.0, -1.0)));
        assert_eq!(path.to_string(), "M 100 100 L 104 85 L 96 85 Z");
    }

    #[test]
    fn test_arc_arrow_uses_arc_base() {
        let path = ArrowShape::Arc { radius: 10.0 }.render(&params(Point::new(1.0, 0.0)));
        assert_eq!(path.to_string(), "M 100 100 L 115 104 A 10 10 0 0 1 115 96 Z");
        assert_eq!(path.arc_count(), 1);
    }

    #[test]
    fn test_arc_arrow_radius_never_below_width() {
        let path = ArcArrow { radius: 1.0 }.render(&params(Point::new(1.0, 0.0)));
        assert!(path.to_string().contains("A 4 4 0 0 1"));
    }

    #[test]
    fn test_wedge_arrow_has_notch() {
        let path = ArrowShape::Wedge { notch: 0.5 }.render(&params(Point::new(1.0, 0.0)));
        assert_eq!(
            path.to_string(),
            "M 100 100 L 115 104 L 107.5 100 L 115 96 Z"
        );
    }

    #[test]
    fn test_custom_renderer() {
        struct Dot;

        impl ArrowRenderer for Dot {
            fn render(&self, params: &ArrowParams) -> Path {
                let mut path = Path::new();
                path.move_to(params.tip);
                path
            }
        }

        let renderer: Rc<dyn ArrowRenderer> = Rc::new(Dot);
        let shape = ArrowShape::Custom(renderer.clone());

        assert_eq!(shape.render(&params(Point::new(1.0, 0.0))).to_string(), "M 100 100");
        assert_eq!(shape, ArrowShape::Custom(renderer));
        assert_ne!(shape, ArrowShape::Custom(Rc::new(Dot)));
    }

    #[test]
    fn test_arrow_shape_serde() {
        let shape: ArrowShape = serde_json::from_str(r#"{"type":"arc"}"#).unwrap();
        assert_eq!(shape, ArrowShape::Arc { radius: 10.0 });

        let json = serde_json::to_string(&ArrowShape::Wedge { notch: 0.25 }).unwrap();
        assert_eq!(json, r#"{"type":"wedge","notch":0.25}"#);
    }
}
