//! Reference render consumer backed by Slint models.
//!
//! [`CanvasView`] listens to a [`GraphStoreController`], keeps node
//! placements and edge geometry current, and can mirror both into Slint
//! `VecModel`s in screen space.
//!
//! # Example
//!
//! ```ignore
//! let controller = GraphStoreController::<MyNode>::new();
//! let (view, _binding) = CanvasView::attach(&controller);
//!
//! // Size reports from the UI drive frame resolution
//! window.on_node_size_changed(CanvasView::node_size_callback(&view));
//! window.on_port_rect_changed(CanvasView::port_rect_callback(&view));
//!
//! let edges = Rc::new(VecModel::<EdgeItem>::default());
//! view.borrow_mut().bind_edge_model(edges.clone(), |row| EdgeItem {
//!     id: row.id.0 as i32,
//!     path: row.path.clone(),
//!     arrow: row.target_arrow.clone(),
//! });
//! window.set_edges(ModelRc::from(edges));
//! ```

use crate::consumer::{attach_consumer, ConsumerBinding, RenderConsumer};
use crate::controller::GraphStoreController;
use crate::error::Result;
use crate::geom::{Point, Size};
use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId, PortId};
use crate::shape::{EdgePath, RoutingCategory};
use crate::state::GeometryCache;
use crate::viewport::{TransformMatrix, ViewportTransform};
use indexmap::IndexMap;
use slint::{Model, SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Internal trait for auto-syncing rows to Slint models.
trait ModelSyncer<R> {
    fn sync(&self, rows: &[R]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<R, P, F> ModelSyncer<R> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&R) -> P,
{
    fn sync(&self, rows: &[R]) {
        // Update existing rows or add new ones
        for (i, row) in rows.iter().enumerate() {
            let item = (self.constructor)(row);
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > rows.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Where a node element is drawn, in content space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePlacement {
    pub id: NodeId,
    pub top_left: Point,
    pub size: Size,
    pub priority: i32,
}

/// Rendered geometry of one edge, in content space.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRenderData {
    pub id: EdgeId,
    pub category: RoutingCategory,
    pub path: EdgePath,
    pub priority: i32,
}

/// Screen-space node row handed to the node model constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRow {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub priority: i32,
}

/// Screen-space edge row handed to the edge model constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRow {
    pub id: EdgeId,
    pub path: SharedString,
    /// Empty when the end has no arrowhead.
    pub source_arrow: SharedString,
    pub target_arrow: SharedString,
    pub label_x: f32,
    pub label_y: f32,
    pub priority: i32,
}

/// Keeps render data in step with the graph.
///
/// Edges are rendered as soon as both port frames can be resolved, which
/// requires their rectangles to have been reported through
/// [`handle_port_report`](Self::handle_port_report). Edges waiting for a
/// report are skipped and picked up by the report.
///
/// Bound models list rows by priority, lowest first, then by insertion, so a
/// Slint `for` loop stacks higher priorities on top.
pub struct CanvasView<E> {
    graph: Graph<E>,
    cache: GeometryCache,
    viewport: ViewportTransform,
    nodes: IndexMap<NodeId, NodePlacement>,
    edges: IndexMap<EdgeId, EdgeRenderData>,
    node_syncer: Option<Box<dyn ModelSyncer<NodeRow>>>,
    edge_syncer: Option<Box<dyn ModelSyncer<EdgeRow>>>,
}

impl<E: 'static> CanvasView<E> {
    /// Create a view, fill it from the controller's current graph and
    /// subscribe it to all further changes.
    pub fn attach(controller: &GraphStoreController<E>) -> (Rc<RefCell<Self>>, ConsumerBinding) {
        let mut view = Self::new(controller.graph());
        view.rebuild();
        let view = Rc::new(RefCell::new(view));
        let binding = attach_consumer(controller, view.clone());
        (view, binding)
    }

    /// Slint callback for node size reports: `(node_id, width, height)`.
    pub fn node_size_callback(view: &Rc<RefCell<Self>>) -> impl Fn(i32, f32, f32) + Clone {
        let view = view.clone();
        move |id, width, height| {
            if let Ok(raw) = u64::try_from(id) {
                view.borrow_mut()
                    .handle_node_size_report(NodeId(raw), width.into(), height.into());
            }
        }
    }

    /// Slint callback for port reports:
    /// `(port_id, rel_x, rel_y, width, height)` relative to the node.
    pub fn port_rect_callback(view: &Rc<RefCell<Self>>) -> impl Fn(i32, f32, f32, f32, f32) + Clone {
        let view = view.clone();
        move |id, rel_x, rel_y, width, height| {
            if let Ok(raw) = u64::try_from(id) {
                view.borrow_mut().handle_port_report(
                    PortId(raw),
                    rel_x.into(),
                    rel_y.into(),
                    width.into(),
                    height.into(),
                );
            }
        }
    }
}

impl<E> CanvasView<E> {
    pub fn new(graph: Graph<E>) -> Self {
        Self {
            graph,
            cache: GeometryCache::new(),
            viewport: ViewportTransform::new(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            node_syncer: None,
            edge_syncer: None,
        }
    }

    /// Bind to a Slint model for automatic node synchronization.
    ///
    /// # Arguments
    /// * `model` - The VecModel to sync to
    /// * `constructor` - Builds a model item from a screen-space row
    pub fn bind_node_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&NodeRow) -> P + 'static,
    {
        self.node_syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
        self.sync_nodes();
    }

    /// Bind to a Slint model for automatic edge synchronization.
    pub fn bind_edge_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&EdgeRow) -> P + 'static,
    {
        self.edge_syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
        self.sync_edges();
    }

    pub fn graph(&self) -> &Graph<E> {
        &self.graph
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn node(&self, id: NodeId) -> Option<&NodePlacement> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRenderData> {
        self.edges.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodePlacement> + '_ {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeRenderData> + '_ {
        self.edges.values()
    }

    // === Viewport ===

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    /// Start from the viewport stored in a [`CanvasConfig`](crate::CanvasConfig).
    pub fn with_viewport(mut self, matrix: TransformMatrix) -> Result<Self> {
        self.viewport.set_matrix(matrix)?;
        Ok(self)
    }

    pub fn set_viewport(&mut self, matrix: TransformMatrix) -> Result<()> {
        self.viewport.set_matrix(matrix)?;
        self.sync_all();
        Ok(())
    }

    /// Pan the view, see [`ViewportTransform::shift`].
    pub fn shift(&mut self, dx: f64, dy: f64) {
        self.viewport.shift(dx, dy);
        self.sync_all();
    }

    /// Zoom by `factor` around the content point `(cx, cy)`, which keeps its
    /// screen position. See [`ViewportTransform::scale`].
    pub fn scale(&mut self, factor: f64, cx: f64, cy: f64) -> Result<()> {
        self.viewport.scale(factor, cx, cy)?;
        self.sync_all();
        Ok(())
    }

    /// Zoom by `factor` around a screen position such as the mouse cursor.
    pub fn scale_at_screen_point(&mut self, factor: f64, sx: f64, sy: f64) -> Result<()> {
        let (cx, cy) = self.viewport.to_content(sx, sy);
        self.scale(factor, cx, cy)
    }

    /// Edge geometry mapped to screen space.
    pub fn screen_path(&self, id: EdgeId) -> Option<EdgePath> {
        self.edges
            .get(&id)
            .map(|data| data.path.transformed(&self.viewport))
    }

    // === Size reports ===

    pub fn handle_node_size_report(&mut self, id: NodeId, width: f64, height: f64) {
        self.cache.handle_node_size_report(id, width, height);
        if !self.place_node(id) {
            return;
        }
        let graph = self.graph.clone();
        self.render_adjacent(&graph, id);
        self.sync_all();
    }

    /// Record a port rectangle relative to its node's top-left corner.
    pub fn handle_port_report(
        &mut self,
        id: PortId,
        rel_x: f64,
        rel_y: f64,
        width: f64,
        height: f64,
    ) {
        let Some(node_id) = self.graph.with_store(|store| store.port(id).map(|p| p.node_id)) else {
            debug!("Ignoring report for unknown port {}", id);
            return;
        };
        self.cache
            .handle_port_report(id, node_id, rel_x, rel_y, width, height);
        let graph = self.graph.clone();
        self.render_adjacent(&graph, id);
        self.sync_edges();
    }

    /// Recompute everything from the current graph state.
    pub fn rebuild(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        let graph = self.graph.clone();
        for id in graph.node_ids() {
            self.place_node(id);
        }
        for id in graph.edge_ids() {
            self.render_edge(&graph, id);
        }
        self.sync_all();
    }

    // === Rendering ===

    /// Refresh the placement of a node; false if the node is gone.
    fn place_node(&mut self, id: NodeId) -> bool {
        let placement = self.graph.with_store(|store| {
            store.node(id).map(|node| NodePlacement {
                id,
                top_left: self.cache.node_top_left(node),
                size: self.cache.node_size(id),
                priority: node.priority,
            })
        });
        match placement {
            Some(placement) => {
                self.nodes.insert(id, placement);
                true
            }
            None => false,
        }
    }

    fn render_edge(&mut self, graph: &Graph<E>, id: EdgeId) {
        let rendered = graph.with_store(|store| {
            let priority = store.edge(id)?.priority;
            let (category, path) = self.cache.compute_edge_path(store, id)?;
            Some(EdgeRenderData {
                id,
                category,
                path,
                priority,
            })
        });
        match rendered {
            Some(data) => {
                self.edges.insert(id, data);
            }
            None => {
                debug!("Deferring edge {} until its port frames are reported", id);
                self.edges.shift_remove(&id);
            }
        }
    }

    fn render_adjacent(&mut self, graph: &Graph<E>, key: impl Into<crate::store::AdjacencyKey>) {
        if let Ok(edges) = graph.adjacent_edges(key) {
            for id in edges {
                self.render_edge(graph, id);
            }
        }
    }

    // === Model sync ===

    fn sync_all(&self) {
        self.sync_nodes();
        self.sync_edges();
    }

    fn sync_nodes(&self) {
        let Some(syncer) = &self.node_syncer else {
            return;
        };
        let mut placements: Vec<&NodePlacement> = self.nodes.values().collect();
        placements.sort_by_key(|p| p.priority);

        let scale = self.viewport.absolute_scale();
        let rows: Vec<NodeRow> = placements
            .into_iter()
            .map(|p| {
                let screen = self.viewport.point_to_screen(p.top_left);
                NodeRow {
                    id: p.id,
                    x: screen.x as f32,
                    y: screen.y as f32,
                    width: (p.size.width * scale) as f32,
                    height: (p.size.height * scale) as f32,
                    priority: p.priority,
                }
            })
            .collect();
        syncer.sync(&rows);
    }

    fn sync_edges(&self) {
        let Some(syncer) = &self.edge_syncer else {
            return;
        };
        let mut edges: Vec<&EdgeRenderData> = self.edges.values().collect();
        edges.sort_by_key(|e| e.priority);

        let rows: Vec<EdgeRow> = edges
            .into_iter()
            .map(|e| {
                let screen = e.path.transformed(&self.viewport);
                let arrow = |path: &Option<crate::path::Path>| {
                    path.as_ref()
                        .map(|p| SharedString::from(p.to_string().as_str()))
                        .unwrap_or_default()
                };
                EdgeRow {
                    id: e.id,
                    path: SharedString::from(screen.path_string().as_str()),
                    source_arrow: arrow(&screen.source_arrow),
                    target_arrow: arrow(&screen.target_arrow),
                    label_x: screen.midpoint.x as f32,
                    label_y: screen.midpoint.y as f32,
                    priority: e.priority,
                }
            })
            .collect();
        syncer.sync(&rows);
    }
}

impl<E> RenderConsumer<E> for CanvasView<E> {
    fn on_node_added(&mut self, _: &Graph<E>, id: NodeId) {
        self.place_node(id);
        self.sync_nodes();
    }

    fn on_node_coordinates_updated(&mut self, graph: &Graph<E>, id: NodeId) {
        self.place_node(id);
        self.render_adjacent(graph, id);
        self.sync_all();
    }

    fn on_node_priority_updated(&mut self, _: &Graph<E>, id: NodeId) {
        self.place_node(id);
        self.sync_nodes();
    }

    fn on_node_removed(&mut self, _: &Graph<E>, id: NodeId) {
        self.nodes.shift_remove(&id);
        self.cache.forget_node(id);
        self.sync_nodes();
    }

    fn on_port_updated(&mut self, graph: &Graph<E>, id: PortId) {
        self.render_adjacent(graph, id);
        self.sync_edges();
    }

    fn on_port_removed(&mut self, _: &Graph<E>, id: PortId) {
        self.cache.forget_port(id);
    }

    fn on_edge_added(&mut self, graph: &Graph<E>, id: EdgeId) {
        self.render_edge(graph, id);
        self.sync_edges();
    }

    fn on_edge_shape_updated(&mut self, graph: &Graph<E>, id: EdgeId) {
        self.render_edge(graph, id);
        self.sync_edges();
    }

    fn on_edge_priority_updated(&mut self, graph: &Graph<E>, id: EdgeId) {
        if let (Some(data), Some(edge)) = (self.edges.get_mut(&id), graph.get_edge(id)) {
            data.priority = edge.priority;
        }
        self.sync_edges();
    }

    fn on_edge_adjacency_updated(&mut self, graph: &Graph<E>, id: EdgeId) {
        self.render_edge(graph, id);
        self.sync_edges();
    }

    fn on_edge_removed(&mut self, _: &Graph<E>, id: EdgeId) {
        self.edges.shift_remove(&id);
        self.sync_edges();
    }

    fn on_clear(&mut self, _: &Graph<E>) {
        self.nodes.clear();
        self.edges.clear();
        self.cache.clear();
        self.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{
        AddEdgeRequest, AddNodeRequest, AddPortRequest, UpdateEdgeRequest, UpdateNodeRequest,
    };
    use crate::shape::EdgeShape;
    use crate::store::CenterFn;

    /// Two 100x50 nodes, each with one 10x10 port, joined by a straight edge.
    fn setup() -> (
        GraphStoreController<()>,
        Rc<RefCell<CanvasView<()>>>,
        ConsumerBinding,
        EdgeId,
    ) {
        let controller = GraphStoreController::<()>::new();
        let (view, binding) = CanvasView::attach(&controller);

        let a = controller.add_node(AddNodeRequest::new((), 50.0, 25.0)).unwrap();
        let b = controller.add_node(AddNodeRequest::new((), 250.0, 125.0)).unwrap();
        let pa = controller.add_port(AddPortRequest::new((), a)).unwrap();
        let pb = controller
            .add_port(AddPortRequest::new((), b).with_center_fn(CenterFn::TopLeft))
            .unwrap();
        let e = controller
            .add_edge(AddEdgeRequest::new(pa, pb).with_shape(EdgeShape::straight()))
            .unwrap();

        {
            let mut v = view.borrow_mut();
            v.handle_node_size_report(a, 100.0, 50.0);
            v.handle_node_size_report(b, 100.0, 50.0);
            v.handle_port_report(pa, 95.0, 20.0, 10.0, 10.0);
            v.handle_port_report(pb, 0.0, 25.0, 10.0, 10.0);
        }
        (controller, view, binding, e)
    }

    // ========================================================================
    // Render data
    // ========================================================================

    #[test]
    fn test_edge_waits_for_port_reports() {
        let controller = GraphStoreController::<()>::new();
        let (view, _binding) = CanvasView::attach(&controller);

        let n = controller.add_node(AddNodeRequest::new((), 0.0, 0.0)).unwrap();
        let p = controller.add_port(AddPortRequest::new((), n)).unwrap();
        let e = controller.add_edge(AddEdgeRequest::new(p, p)).unwrap();
        assert!(view.borrow().edge(e).is_none());

        view.borrow_mut().handle_port_report(p, 0.0, 0.0, 10.0, 10.0);
        let view = view.borrow();
        let data = view.edge(e).unwrap();
        assert_eq!(data.category, RoutingCategory::PortCycle);
        assert!(!data.path.is_empty());
    }

    #[test]
    fn test_node_move_rerenders_edges() {
        let (controller, view, _binding, e) = setup();
        let before = view.borrow().edge(e).unwrap().path.midpoint;
        assert_eq!(before, Point::new(150.0, 75.0));

        controller
            .update_node(NodeId(1), UpdateNodeRequest::coordinates(250.0, 25.0))
            .unwrap();

        let view = view.borrow();
        assert_eq!(view.node(NodeId(1)).unwrap().top_left, Point::new(200.0, 0.0));
        assert_ne!(view.edge(e).unwrap().path.midpoint, before);
    }

    #[test]
    fn test_removal_drops_render_data() {
        let (controller, view, _binding, e) = setup();
        controller.remove_node(NodeId(1)).unwrap();

        let view = view.borrow();
        assert!(view.node(NodeId(1)).is_none());
        assert!(view.edge(e).is_none());
        assert!(!view.cache().port_rects.contains_key(&PortId(1)));
        assert!(view.cache().port_rects.contains_key(&PortId(0)));
    }

    #[test]
    fn test_attach_picks_up_existing_graph() {
        let controller = GraphStoreController::<()>::new();
        controller.add_node(AddNodeRequest::new((), 10.0, 10.0)).unwrap();

        let (view, _binding) = CanvasView::attach(&controller);
        assert_eq!(view.borrow().nodes().count(), 1);
    }

    // ========================================================================
    // Model sync
    // ========================================================================

    #[test]
    fn test_edge_model_rows_in_screen_space() {
        let (_controller, view, _binding, e) = setup();
        let model = Rc::new(VecModel::<EdgeRow>::default());
        view.borrow_mut().bind_edge_model(model.clone(), |row| row.clone());

        view.borrow_mut()
            .set_viewport(TransformMatrix {
                scale: 2.0,
                x: 10.0,
                y: 0.0,
            })
            .unwrap();

        assert_eq!(model.row_count(), 1);
        let row = model.row_data(0).unwrap();
        assert_eq!(row.id, e);
        assert!(row.path.as_str().starts_with("M 210 50"));
        assert_eq!((row.label_x, row.label_y), (310.0, 150.0));
        assert!(row.source_arrow.is_empty());
        assert!(!row.target_arrow.is_empty());
    }

    #[test]
    fn test_rows_ordered_by_priority() {
        let (controller, view, _binding, e) = setup();
        let other = controller
            .add_edge(AddEdgeRequest::new(PortId(1), PortId(0)))
            .unwrap();
        let model = Rc::new(VecModel::<EdgeId>::default());
        view.borrow_mut().bind_edge_model(model.clone(), |row| row.id);
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![e, other]);

        controller
            .update_edge(e, UpdateEdgeRequest::priority(5))
            .unwrap();
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![other, e]);

        controller.remove_edge(other).unwrap();
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![e]);
    }

    #[test]
    fn test_node_model_and_clear() {
        let (controller, view, _binding, _) = setup();
        let model = Rc::new(VecModel::<NodeRow>::default());
        view.borrow_mut().bind_node_model(model.clone(), |row| row.clone());
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.row_data(1).unwrap().x, 200.0);

        view.borrow_mut().shift(5.0, 0.0);
        assert_eq!(model.row_data(1).unwrap().x, 205.0);

        controller.clear();
        assert_eq!(model.row_count(), 0);
        assert!(view.borrow().cache().node_sizes.is_empty());
    }

    #[test]
    fn test_zoom_pivots() {
        let (_controller, view, _binding, _) = setup();
        let model = Rc::new(VecModel::<NodeRow>::default());
        view.borrow_mut().bind_node_model(model.clone(), |row| row.clone());
        view.borrow_mut().shift(10.0, 20.0);

        // Node 1's top-left corner (200, 100) is drawn at (210, 120)
        view.borrow_mut()
            .scale_at_screen_point(2.0, 210.0, 120.0)
            .unwrap();
        let row = model.row_data(1).unwrap();
        assert_eq!((row.x, row.y, row.width), (210.0, 120.0, 200.0));
        let row = model.row_data(0).unwrap();
        assert_eq!((row.x, row.y), (-190.0, -80.0));

        // The plain variant takes the pivot in content units
        view.borrow_mut().scale(0.5, 200.0, 100.0).unwrap();
        let row = model.row_data(1).unwrap();
        assert_eq!((row.x, row.y, row.width), (210.0, 120.0, 100.0));
        assert_eq!(view.borrow().viewport().to_screen(0.0, 0.0), (10.0, 20.0));
    }

    #[test]
    fn test_size_callbacks() {
        let (_controller, view, _binding, _) = setup();
        let on_size = CanvasView::node_size_callback(&view);
        on_size(0, 40.0, 20.0);
        on_size(-1, 1.0, 1.0);

        let view = view.borrow();
        assert_eq!(view.node(NodeId(0)).unwrap().size, Size::new(40.0, 20.0));
        assert_eq!(view.node(NodeId(0)).unwrap().top_left, Point::new(30.0, 15.0));
    }
}
