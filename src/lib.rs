//! # Slint Graph Canvas
//!
//! Core of an interactive node/edge canvas: a validated graph store with
//! lifecycle notifications, a pan/zoom viewport transform and a pure edge
//! path engine, plus a reference consumer that mirrors everything into Slint
//! models.
//!
//! ## Features
//!
//! - **Graph store** - Nodes, ports and edges with ordered adjacency indices
//!   and cascading removal
//! - **Controller** - The single mutation entry point; validates requests,
//!   assigns ids and priorities and emits typed notifications
//! - **Edge geometry** - Bezier, straight and orthogonal lines, detours around
//!   a node and loops on a single port, with configurable arrowheads
//! - **Viewport** - Content/screen mapping with pivot-preserving zoom
//! - **Slint binding** - [`CanvasView`] keeps `VecModel`s of node placements
//!   and edge paths in screen space
//!
//! ## Quick Start
//!
//! ```
//! use slint_graph_canvas::{
//!     compute_path, AddEdgeRequest, AddNodeRequest, AddPortRequest, EdgeShape,
//!     GraphStoreController, Point, RenderFrame, RoutingCategory, Size,
//! };
//!
//! let controller = GraphStoreController::<&str>::new();
//! let a = controller.add_node(AddNodeRequest::new("source", 0.0, 0.0)).unwrap();
//! let b = controller.add_node(AddNodeRequest::new("sink", 200.0, 100.0)).unwrap();
//! let out = controller.add_port(AddPortRequest::new("out", a)).unwrap();
//! let inp = controller.add_port(AddPortRequest::new("in", b)).unwrap();
//! let edge = controller.add_edge(AddEdgeRequest::new(out, inp)).unwrap();
//! assert_eq!(controller.graph().routing_category(edge), Some(RoutingCategory::Line));
//!
//! let path = compute_path(
//!     &RenderFrame::new(Point::new(0.0, 0.0), Size::ZERO, 0.0),
//!     &RenderFrame::new(Point::new(200.0, 100.0), Size::ZERO, 0.0),
//!     RoutingCategory::Line,
//!     &EdgeShape::straight(),
//! );
//! assert!(path.path_string().starts_with("M 0 0"));
//! ```

pub mod config;
pub mod consumer;
pub mod controller;
pub mod error;
pub mod events;
pub mod geom;
pub mod graph;
pub mod ids;
pub mod path;
pub mod shape;
pub mod state;
pub mod store;
pub mod view;
pub mod viewport;

pub use config::{CanvasConfig, PriorityStrategy};
pub use consumer::{attach_consumer, ConsumerBinding, RenderConsumer};
pub use controller::{
    AddEdgeRequest, AddNodeRequest, AddPortRequest, GraphStoreController, UpdateEdgeRequest,
    UpdateNodeRequest, UpdatePortRequest,
};
pub use error::{Error, Result};
pub use events::{EventHandler, GraphEventHandlers, Subscription};
pub use geom::{Point, Rect, Size};
pub use graph::Graph;
pub use ids::{EdgeId, EntityId, EntityKind, IdGenerator, NodeId, PortId};
pub use path::{CubicBezier, Path, PathCommand};
pub use shape::{
    compute_path, ArcArrow, ArrowConfig, ArrowParams, ArrowRenderer, ArrowShape, BezierShape,
    CycleConfig, DetourConfig, EdgePath, EdgeShape, RenderFrame, RoundedShape, RoutingCategory,
    TriangleArrow, WedgeArrow,
};
pub use state::{GeometryCache, StoredPort};
pub use store::{AdjacencyKey, Cascade, CenterFn, Edge, GraphStore, Node, Port};
pub use view::{CanvasView, EdgeRenderData, EdgeRow, NodePlacement, NodeRow};
pub use viewport::{MatrixPatch, TransformMatrix, ViewportTransform};
