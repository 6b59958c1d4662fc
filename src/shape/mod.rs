//! Edge path geometry.
//!
//! [`compute_path`] turns two port render frames, the routing category and an
//! [`EdgeShape`] into an [`EdgePath`]: the line, its midpoint and optional
//! arrowheads. Every function here is pure, so equal inputs always give
//! byte-identical path strings.
//!
//! The routing category is derived from endpoint identity:
//!
//! - [`RoutingCategory::Line`] - ports on different nodes
//! - [`RoutingCategory::NodeCycle`] - different ports of one node, routed
//!   around the node along the configured detour
//! - [`RoutingCategory::PortCycle`] - both ends on one port, drawn as a loop

pub mod arrow;
mod cycle;
mod detour;
pub mod frame;
mod line;

use crate::geom::{Point, Size};
use crate::ids::{NodeId, PortId};
use crate::path::Path;
use crate::viewport::ViewportTransform;
use serde::{Deserialize, Serialize};

pub use arrow::{ArcArrow, ArrowParams, ArrowRenderer, ArrowShape, TriangleArrow, WedgeArrow};

use frame::LocalFrame;

/// Position, size and facing direction of a port, as consumed by the
/// geometry functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Anchor point of the port in content space.
    pub center: Point,
    pub size: Size,
    /// Facing direction in radians.
    pub direction: f64,
}

impl RenderFrame {
    pub fn new(center: Point, size: Size, direction: f64) -> Self {
        Self {
            center,
            size,
            direction,
        }
    }
}

/// How an edge must be routed, decided by comparing its endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingCategory {
    Line,
    NodeCycle,
    PortCycle,
}

impl RoutingCategory {
    pub fn classify(
        source_port: PortId,
        target_port: PortId,
        source_node: NodeId,
        target_node: NodeId,
    ) -> Self {
        if source_port == target_port {
            Self::PortCycle
        } else if source_node == target_node {
            Self::NodeCycle
        } else {
            Self::Line
        }
    }
}

/// Arrowhead configuration shared by all shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    /// Draw an arrow at the source end.
    pub source: bool,
    /// Draw an arrow at the target end.
    pub target: bool,
    pub length: f64,
    /// Half of the arrow base width.
    pub width: f64,
    /// Extra straight run between the arrow base and the first bend.
    pub offset: f64,
    pub shape: ArrowShape,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            source: false,
            target: true,
            length: 15.0,
            width: 4.0,
            offset: 15.0,
            shape: ArrowShape::Triangle,
        }
    }
}

impl ArrowConfig {
    /// Distance from an endpoint to the first bend of a polyline route.
    pub fn gap(&self) -> f64 {
        self.length + self.offset
    }
}

/// Loop radii for edges whose two ends are the same port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Radius of the bends hugging the port.
    pub small_radius: f64,
    /// Radius of the outer loop.
    pub radius: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            small_radius: 15.0,
            radius: 30.0,
        }
    }
}

/// Outward routing for edges between two ports of the same node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetourConfig {
    pub distance: f64,
    /// Absolute direction of the detour in radians (default: up).
    pub direction: f64,
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            distance: 100.0,
            direction: -std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Cubic bezier edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BezierShape {
    pub arrow: ArrowConfig,
    pub cycle: CycleConfig,
    pub detour: DetourConfig,
    /// Distance of the control points from the endpoints.
    pub curvature: f64,
}

impl Default for BezierShape {
    fn default() -> Self {
        Self {
            arrow: ArrowConfig::default(),
            cycle: CycleConfig::default(),
            detour: DetourConfig::default(),
            curvature: 90.0,
        }
    }
}

/// Polyline edges with rounded corners (straight, horizontal, vertical).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundedShape {
    pub arrow: ArrowConfig,
    pub cycle: CycleConfig,
    pub detour: DetourConfig,
    pub roundness: f64,
}

impl Default for RoundedShape {
    fn default() -> Self {
        Self {
            arrow: ArrowConfig::default(),
            cycle: CycleConfig::default(),
            detour: DetourConfig::default(),
            roundness: 10.0,
        }
    }
}

/// Shape configuration of an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EdgeShape {
    Bezier(BezierShape),
    Straight(RoundedShape),
    /// Orthogonal route with a vertical jog.
    Horizontal(RoundedShape),
    /// Orthogonal route with a horizontal jog.
    Vertical(RoundedShape),
}

impl Default for EdgeShape {
    fn default() -> Self {
        Self::Bezier(BezierShape::default())
    }
}

impl EdgeShape {
    pub fn bezier() -> Self {
        Self::Bezier(BezierShape::default())
    }

    pub fn straight() -> Self {
        Self::Straight(RoundedShape::default())
    }

    pub fn horizontal() -> Self {
        Self::Horizontal(RoundedShape::default())
    }

    pub fn vertical() -> Self {
        Self::Vertical(RoundedShape::default())
    }

    pub fn arrow(&self) -> &ArrowConfig {
        match self {
            Self::Bezier(s) => &s.arrow,
            Self::Straight(s) | Self::Horizontal(s) | Self::Vertical(s) => &s.arrow,
        }
    }

    pub fn arrow_mut(&mut self) -> &mut ArrowConfig {
        match self {
            Self::Bezier(s) => &mut s.arrow,
            Self::Straight(s) | Self::Horizontal(s) | Self::Vertical(s) => &mut s.arrow,
        }
    }

    pub fn cycle(&self) -> &CycleConfig {
        match self {
            Self::Bezier(s) => &s.cycle,
            Self::Straight(s) | Self::Horizontal(s) | Self::Vertical(s) => &s.cycle,
        }
    }

    pub fn detour(&self) -> &DetourConfig {
        match self {
            Self::Bezier(s) => &s.detour,
            Self::Straight(s) | Self::Horizontal(s) | Self::Vertical(s) => &s.detour,
        }
    }

    /// Builder-style arrow override.
    pub fn with_arrow(mut self, arrow: ArrowConfig) -> Self {
        *self.arrow_mut() = arrow;
        self
    }
}

/// Renderable geometry of one edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgePath {
    pub line: Path,
    /// Landmark in the middle of the route (e.g. for labels).
    pub midpoint: Point,
    pub source_arrow: Option<Path>,
    pub target_arrow: Option<Path>,
}

impl EdgePath {
    /// Nothing to draw; used for collapsed edges.
    pub fn empty(at: Point) -> Self {
        Self {
            line: Path::new(),
            midpoint: at,
            source_arrow: None,
            target_arrow: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// SVG path string of the line.
    pub fn path_string(&self) -> String {
        self.line.to_string()
    }

    /// Map the whole edge from content space to screen space.
    pub fn transformed(&self, viewport: &ViewportTransform) -> EdgePath {
        EdgePath {
            line: self.line.transformed(viewport),
            midpoint: viewport.point_to_screen(self.midpoint),
            source_arrow: self.source_arrow.as_ref().map(|p| p.transformed(viewport)),
            target_arrow: self.target_arrow.as_ref().map(|p| p.transformed(viewport)),
        }
    }
}

/// Compute the geometry of an edge between two ports.
///
/// # Arguments
/// * `source` - Render frame of the source port
/// * `target` - Render frame of the target port
/// * `category` - Routing category from [`RoutingCategory::classify`]
/// * `shape` - Shape configuration of the edge
///
/// # Returns
/// The edge geometry in content space. A [`RoutingCategory::Line`] edge
/// whose endpoints coincide yields an empty path.
pub fn compute_path(
    source: &RenderFrame,
    target: &RenderFrame,
    category: RoutingCategory,
    shape: &EdgeShape,
) -> EdgePath {
    let frame = LocalFrame::new(source, target);

    let local = match category {
        RoutingCategory::Line => {
            if source.center == target.center {
                return EdgePath::empty(source.center);
            }
            match shape {
                EdgeShape::Bezier(s) => line::bezier(&frame, &s.arrow, s.curvature),
                EdgeShape::Straight(s) => line::straight(&frame, &s.arrow, s.roundness),
                EdgeShape::Horizontal(s) => {
                    line::orthogonal(&frame, &s.arrow, s.roundness, line::Axis::Horizontal)
                }
                EdgeShape::Vertical(s) => {
                    line::orthogonal(&frame, &s.arrow, s.roundness, line::Axis::Vertical)
                }
            }
        }
        RoutingCategory::NodeCycle => match shape {
            EdgeShape::Bezier(s) => detour::bezier(&frame, &s.arrow, &s.detour, s.curvature),
            EdgeShape::Straight(s) | EdgeShape::Horizontal(s) | EdgeShape::Vertical(s) => {
                detour::polyline(&frame, &s.arrow, &s.detour, s.roundness)
            }
        },
        RoutingCategory::PortCycle => cycle::port_loop(&frame, shape.arrow(), shape.cycle()),
    };

    frame.edge_to_content(local)
}

/// Arrowheads for a route whose ends are `begin` (source side, leaving along
/// `from_vect`) and `end` (target side, arriving along `to_vect`).
pub(crate) fn arrows(
    arrow: &ArrowConfig,
    source_tip: Point,
    source_dir: Point,
    target_tip: Point,
    target_dir: Point,
) -> (Option<Path>, Option<Path>) {
    let render = |tip: Point, direction: Point| {
        arrow.shape.render(&ArrowParams {
            tip,
            direction,
            length: arrow.length,
            width: arrow.width,
        })
    };
    (
        arrow.source.then(|| render(source_tip, source_dir)),
        arrow.target.then(|| render(target_tip, target_dir)),
    )
}
