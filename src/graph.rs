use crate::error::Result;
use crate::ids::{EdgeId, NodeId, PortId};
use crate::shape::RoutingCategory;
use crate::store::{AdjacencyKey, Edge, GraphStore, Node, Port};
use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Read-only view of the graph shared with render consumers.
///
/// Cloning is cheap: every clone looks at the same store as the controller
/// that created it, so lookups always see the latest state.
///
/// # Example
///
/// ```
/// use slint_graph_canvas::{AddNodeRequest, GraphStoreController};
///
/// let controller = GraphStoreController::<&str>::new();
/// let graph = controller.graph();
///
/// let id = controller.add_node(AddNodeRequest::new("a", 10.0, 20.0)).unwrap();
/// assert_eq!(graph.get_node(id).map(|n| n.x), Some(10.0));
/// ```
pub struct Graph<E> {
    store: Rc<RefCell<GraphStore<E>>>,
}

impl<E> Clone for Graph<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<E> Graph<E> {
    pub(crate) fn new(store: Rc<RefCell<GraphStore<E>>>) -> Self {
        Self { store }
    }

    /// Run `f` against the underlying store without cloning records.
    pub fn with_store<R>(&self, f: impl FnOnce(&GraphStore<E>) -> R) -> R {
        f(&self.store.borrow())
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.store.borrow().edge(id).cloned()
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.store.borrow().has_node(id)
    }

    pub fn has_port(&self, id: PortId) -> bool {
        self.store.borrow().has_port(id)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.store.borrow().has_edge(id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.store.borrow().node_ids().collect()
    }

    pub fn port_ids(&self) -> Vec<PortId> {
        self.store.borrow().port_ids().collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.store.borrow().edge_ids().collect()
    }

    pub fn node_port_ids(&self, id: NodeId) -> Result<Vec<PortId>> {
        self.store.borrow().node_port_ids(id)
    }

    pub fn port_incoming_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.store.borrow().port_incoming_edge_ids(id)
    }

    pub fn port_outgoing_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.store.borrow().port_outgoing_edge_ids(id)
    }

    pub fn port_cycle_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.store.borrow().port_cycle_edge_ids(id)
    }

    pub fn node_incoming_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.store.borrow().node_incoming_edge_ids(id)
    }

    pub fn node_outgoing_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.store.borrow().node_outgoing_edge_ids(id)
    }

    pub fn node_cycle_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.store.borrow().node_cycle_edge_ids(id)
    }

    /// Edges touching a node or port; `NotFound` for an unknown id.
    pub fn adjacent_edges(&self, key: impl Into<AdjacencyKey>) -> Result<IndexSet<EdgeId>> {
        self.store.borrow().adjacent_edges(key)
    }

    /// Routing category of an edge, derived from its endpoints.
    pub fn routing_category(&self, id: EdgeId) -> Option<RoutingCategory> {
        let store = self.store.borrow();
        let edge = store.edge(id)?;
        let source = store.port(edge.source)?;
        let target = store.port(edge.target)?;
        Some(RoutingCategory::classify(
            source.id,
            target.id,
            source.node_id,
            target.node_id,
        ))
    }
}

impl<E: Clone> Graph<E> {
    pub fn get_node(&self, id: NodeId) -> Option<Node<E>> {
        self.store.borrow().node(id).cloned()
    }

    pub fn get_port(&self, id: PortId) -> Option<Port<E>> {
        self.store.borrow().port(id).cloned()
    }

    /// Deep copy of the whole store, e.g. for before/after comparisons.
    pub fn snapshot(&self) -> GraphStore<E> {
        self.store.borrow().clone()
    }
}
