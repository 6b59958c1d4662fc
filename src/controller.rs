//! Validating front-end of the graph store.
//!
//! [`GraphStoreController`] is the only way callers mutate the graph. It
//! assigns ids, fills in defaults, writes to the [`GraphStore`] and emits the
//! lifecycle notifications render consumers listen to.
//!
//! Notification order:
//!
//! - additions and updates emit `after_*` once the store holds the new state;
//! - removals emit `before_*` while the old state is still readable, edges
//!   first, then ports, then the node;
//! - a failed call emits nothing and leaves the store unchanged.
//!
//! # Example
//!
//! ```
//! use slint_graph_canvas::{AddEdgeRequest, AddNodeRequest, AddPortRequest, GraphStoreController};
//!
//! let controller = GraphStoreController::<&str>::new();
//! let removed = std::rc::Rc::new(std::cell::Cell::new(0));
//! controller.events().before_edge_removed.subscribe({
//!     let removed = removed.clone();
//!     move |_| removed.set(removed.get() + 1)
//! });
//!
//! let a = controller.add_node(AddNodeRequest::new("a", 0.0, 0.0)).unwrap();
//! let b = controller.add_node(AddNodeRequest::new("b", 200.0, 0.0)).unwrap();
//! let out = controller.add_port(AddPortRequest::new("out", a)).unwrap();
//! let inp = controller.add_port(AddPortRequest::new("in", b)).unwrap();
//! controller.add_edge(AddEdgeRequest::new(out, inp)).unwrap();
//!
//! controller.remove_node(b).unwrap();
//! assert_eq!(removed.get(), 1);
//! ```

use crate::config::{CanvasConfig, PriorityStrategy};
use crate::error::{Error, Result};
use crate::events::{graph_events, EventEmitter, GraphEventHandlers, GraphEvents};
use crate::graph::Graph;
use crate::ids::{EdgeId, IdGenerator, NodeId, PortId};
use crate::shape::EdgeShape;
use crate::store::{Cascade, CenterFn, Edge, GraphStore, Node, Port};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

// === Requests ===

pub struct AddNodeRequest<E> {
    pub id: Option<NodeId>,
    pub element: E,
    pub x: f64,
    pub y: f64,
    pub center_fn: Option<CenterFn>,
    pub priority: Option<i32>,
}

impl<E> AddNodeRequest<E> {
    pub fn new(element: E, x: f64, y: f64) -> Self {
        Self {
            id: None,
            element,
            x,
            y,
            center_fn: None,
            priority: None,
        }
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_center_fn(mut self, center_fn: CenterFn) -> Self {
        self.center_fn = Some(center_fn);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Fields left as `None` keep their current value.
#[derive(Clone, Debug, Default)]
pub struct UpdateNodeRequest {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub priority: Option<i32>,
    pub center_fn: Option<CenterFn>,
}

impl UpdateNodeRequest {
    pub fn coordinates(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn priority(priority: i32) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn center_fn(center_fn: CenterFn) -> Self {
        Self {
            center_fn: Some(center_fn),
            ..Default::default()
        }
    }
}

pub struct AddPortRequest<E> {
    pub id: Option<PortId>,
    pub element: E,
    pub node_id: NodeId,
    pub center_fn: Option<CenterFn>,
    pub direction: Option<f64>,
}

impl<E> AddPortRequest<E> {
    pub fn new(element: E, node_id: NodeId) -> Self {
        Self {
            id: None,
            element,
            node_id,
            center_fn: None,
            direction: None,
        }
    }

    pub fn with_id(mut self, id: PortId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_center_fn(mut self, center_fn: CenterFn) -> Self {
        self.center_fn = Some(center_fn);
        self
    }

    pub fn with_direction(mut self, direction: f64) -> Self {
        self.direction = Some(direction);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct UpdatePortRequest {
    pub direction: Option<f64>,
    pub center_fn: Option<CenterFn>,
}

impl UpdatePortRequest {
    pub fn direction(direction: f64) -> Self {
        Self {
            direction: Some(direction),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct AddEdgeRequest {
    pub id: Option<EdgeId>,
    pub source: PortId,
    pub target: PortId,
    pub shape: Option<EdgeShape>,
    pub priority: Option<i32>,
}

impl AddEdgeRequest {
    pub fn new(source: PortId, target: PortId) -> Self {
        Self {
            id: None,
            source,
            target,
            shape: None,
            priority: None,
        }
    }

    pub fn with_id(mut self, id: EdgeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_shape(mut self, shape: EdgeShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct UpdateEdgeRequest {
    pub source: Option<PortId>,
    pub target: Option<PortId>,
    pub shape: Option<EdgeShape>,
    pub priority: Option<i32>,
}

impl UpdateEdgeRequest {
    pub fn shape(shape: EdgeShape) -> Self {
        Self {
            shape: Some(shape),
            ..Default::default()
        }
    }

    pub fn priority(priority: i32) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn endpoints(source: PortId, target: PortId) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            ..Default::default()
        }
    }
}

// === Controller ===

#[derive(Clone, Debug, Default)]
struct PriorityCounter {
    strategy: PriorityStrategy,
    next: i32,
}

impl PriorityCounter {
    fn new(strategy: PriorityStrategy) -> Self {
        Self { strategy, next: 0 }
    }

    fn next(&mut self) -> i32 {
        match self.strategy {
            PriorityStrategy::Constant(value) => value,
            PriorityStrategy::Incremental => {
                let value = self.next;
                self.next = self.next.wrapping_add(1);
                value
            }
        }
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

#[derive(Clone, Debug, Default)]
struct Generators {
    nodes: IdGenerator<NodeId>,
    ports: IdGenerator<PortId>,
    edges: IdGenerator<EdgeId>,
}

#[derive(Debug, Default)]
struct Defaults {
    edge_shape: EdgeShape,
    node_priority: PriorityCounter,
    edge_priority: PriorityCounter,
}

/// Mutation API over a shared [`GraphStore`].
///
/// Clone this controller to share it across callbacks; all clones drive the
/// same store and the same notification channels.
///
/// Listeners run synchronously inside the mutating call and must not call
/// back into the controller.
pub struct GraphStoreController<E> {
    store: Rc<RefCell<GraphStore<E>>>,
    events: Rc<GraphEvents>,
    handlers: GraphEventHandlers,
    generators: Rc<RefCell<Generators>>,
    defaults: Rc<RefCell<Defaults>>,
}

impl<E> Clone for GraphStoreController<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            events: self.events.clone(),
            handlers: self.handlers.clone(),
            generators: self.generators.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<E> Default for GraphStoreController<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> GraphStoreController<E> {
    /// Create a controller over an empty store with default settings.
    pub fn new() -> Self {
        Self::with_config(&CanvasConfig::default())
    }

    pub fn with_config(config: &CanvasConfig) -> Self {
        let (events, handlers) = graph_events();
        Self {
            store: Rc::new(RefCell::new(GraphStore::new())),
            events: Rc::new(events),
            handlers,
            generators: Rc::new(RefCell::new(Generators::default())),
            defaults: Rc::new(RefCell::new(Defaults {
                edge_shape: config.default_edge_shape.clone(),
                node_priority: PriorityCounter::new(config.node_priority),
                edge_priority: PriorityCounter::new(config.edge_priority),
            })),
        }
    }

    /// Replace the id generators, e.g. to start numbering at an offset.
    pub fn with_generators(
        self,
        nodes: IdGenerator<NodeId>,
        ports: IdGenerator<PortId>,
        edges: IdGenerator<EdgeId>,
    ) -> Self {
        *self.generators.borrow_mut() = Generators {
            nodes,
            ports,
            edges,
        };
        self
    }

    /// Read-only facade over the same store.
    pub fn graph(&self) -> Graph<E> {
        Graph::new(self.store.clone())
    }

    /// Subscription side of every notification channel.
    pub fn events(&self) -> &GraphEventHandlers {
        &self.handlers
    }

    /// Shape used by [`add_edge`](Self::add_edge) when the request has none.
    pub fn set_default_edge_shape(&self, shape: EdgeShape) {
        self.defaults.borrow_mut().edge_shape = shape;
    }

    // === Nodes ===

    pub fn add_node(&self, request: AddNodeRequest<E>) -> Result<NodeId> {
        let id = match request.id {
            Some(id) if self.store.borrow().has_node(id) => return Err(Error::duplicate(id)),
            Some(id) => id,
            None => {
                let store = self.store.borrow();
                self.generators.borrow_mut().nodes.create(|id| store.has_node(id))
            }
        };
        let priority = request
            .priority
            .unwrap_or_else(|| self.defaults.borrow_mut().node_priority.next());

        self.store.borrow_mut().add_node(Node {
            id,
            element: request.element,
            x: request.x,
            y: request.y,
            center_fn: request.center_fn.unwrap_or_default(),
            priority,
        })?;
        debug!("Added node {} at ({}, {})", id, request.x, request.y);

        self.emit(&self.events.after_node_added, "after_node_added", id);
        Ok(id)
    }

    pub fn update_node(&self, id: NodeId, request: UpdateNodeRequest) -> Result<()> {
        let moved = request.x.is_some() || request.y.is_some() || request.center_fn.is_some();
        {
            let mut store = self.store.borrow_mut();
            let (x, y) = match store.node(id) {
                Some(node) => (request.x.unwrap_or(node.x), request.y.unwrap_or(node.y)),
                None => return Err(Error::not_found(id)),
            };
            if request.x.is_some() || request.y.is_some() {
                store.update_node_coordinates(id, x, y)?;
            }
            if let Some(center_fn) = request.center_fn {
                store.update_node_center_fn(id, center_fn)?;
            }
            if let Some(priority) = request.priority {
                store.update_node_priority(id, priority)?;
            }
        }
        debug!("Updated node {}", id);

        if moved {
            self.emit(
                &self.events.after_node_coordinates_updated,
                "after_node_coordinates_updated",
                id,
            );
        }
        if request.priority.is_some() {
            self.emit(
                &self.events.after_node_priority_updated,
                "after_node_priority_updated",
                id,
            );
        }
        Ok(())
    }

    /// Remove a node, its ports and every edge attached to them.
    pub fn remove_node(&self, id: NodeId) -> Result<()> {
        let cascade = self.store.borrow().cascade_for_node(id)?;
        self.emit_before_removal(&cascade);
        self.store.borrow_mut().remove_node(id)?;
        debug!(
            "Removed node {} with {} port(s) and {} edge(s)",
            id,
            cascade.ports.len(),
            cascade.edges.len()
        );
        Ok(())
    }

    // === Ports ===

    pub fn add_port(&self, request: AddPortRequest<E>) -> Result<PortId> {
        let id = match request.id {
            Some(id) if self.store.borrow().has_port(id) => return Err(Error::duplicate(id)),
            Some(id) => id,
            None => {
                let store = self.store.borrow();
                self.generators.borrow_mut().ports.create(|id| store.has_port(id))
            }
        };

        self.store.borrow_mut().add_port(Port {
            id,
            node_id: request.node_id,
            element: request.element,
            center_fn: request.center_fn.unwrap_or_default(),
            direction: request.direction.unwrap_or(0.0),
        })?;
        debug!("Added port {} on node {}", id, request.node_id);

        self.emit(&self.events.after_port_added, "after_port_added", id);
        Ok(id)
    }

    pub fn update_port(&self, id: PortId, request: UpdatePortRequest) -> Result<()> {
        let changed = request.direction.is_some() || request.center_fn.is_some();
        {
            let mut store = self.store.borrow_mut();
            if !store.has_port(id) {
                return Err(Error::not_found(id));
            }
            if let Some(direction) = request.direction {
                store.update_port_direction(id, direction)?;
            }
            if let Some(center_fn) = request.center_fn {
                store.update_port_center_fn(id, center_fn)?;
            }
        }
        debug!("Updated port {}", id);

        if changed {
            self.emit(&self.events.after_port_updated, "after_port_updated", id);
        }
        Ok(())
    }

    /// Remove a port and every edge using it.
    pub fn remove_port(&self, id: PortId) -> Result<()> {
        let cascade = self.store.borrow().cascade_for_port(id)?;
        self.emit_before_removal(&cascade);
        self.store.borrow_mut().remove_port(id)?;
        debug!("Removed port {} with {} edge(s)", id, cascade.edges.len());
        Ok(())
    }

    // === Edges ===

    pub fn add_edge(&self, request: AddEdgeRequest) -> Result<EdgeId> {
        let id = match request.id {
            Some(id) if self.store.borrow().has_edge(id) => return Err(Error::duplicate(id)),
            Some(id) => id,
            None => {
                let store = self.store.borrow();
                self.generators.borrow_mut().edges.create(|id| store.has_edge(id))
            }
        };
        {
            let store = self.store.borrow();
            for port in [request.source, request.target] {
                if !store.has_port(port) {
                    return Err(Error::invalid_reference(id, port));
                }
            }
        }

        let (shape, priority) = {
            let mut defaults = self.defaults.borrow_mut();
            let shape = request
                .shape
                .unwrap_or_else(|| defaults.edge_shape.clone());
            let priority = match request.priority {
                Some(priority) => priority,
                None => defaults.edge_priority.next(),
            };
            (shape, priority)
        };

        self.store.borrow_mut().add_edge(Edge {
            id,
            source: request.source,
            target: request.target,
            shape,
            priority,
        })?;
        debug!(
            "Added edge {} from port {} to port {}",
            id, request.source, request.target
        );

        self.emit(&self.events.after_edge_added, "after_edge_added", id);
        Ok(id)
    }

    pub fn update_edge(&self, id: EdgeId, request: UpdateEdgeRequest) -> Result<()> {
        let repointed = request.source.is_some() || request.target.is_some();
        let reshaped = request.shape.is_some();
        {
            let mut store = self.store.borrow_mut();
            let (source, target) = match store.edge(id) {
                Some(edge) => (
                    request.source.unwrap_or(edge.source),
                    request.target.unwrap_or(edge.target),
                ),
                None => return Err(Error::not_found(id)),
            };
            // The only update that can fail goes first, so a rejected
            // request changes nothing
            if repointed {
                store.update_edge_endpoints(id, source, target)?;
            }
            if let Some(shape) = request.shape {
                store.update_edge_shape(id, shape)?;
            }
            if let Some(priority) = request.priority {
                store.update_edge_priority(id, priority)?;
            }
        }
        debug!("Updated edge {}", id);

        if repointed {
            self.emit(
                &self.events.after_edge_adjacency_updated,
                "after_edge_adjacency_updated",
                id,
            );
        }
        if reshaped {
            self.emit(
                &self.events.after_edge_shape_updated,
                "after_edge_shape_updated",
                id,
            );
        }
        if request.priority.is_some() {
            self.emit(
                &self.events.after_edge_priority_updated,
                "after_edge_priority_updated",
                id,
            );
        }
        Ok(())
    }

    pub fn remove_edge(&self, id: EdgeId) -> Result<()> {
        let cascade = self.store.borrow().cascade_for_edge(id)?;
        self.emit_before_removal(&cascade);
        self.store.borrow_mut().remove_edge(id)?;
        debug!("Removed edge {}", id);
        Ok(())
    }

    /// Drop the whole graph in one step and restart id and priority counters.
    ///
    /// Only `before_clear` is emitted; there are no per-entity notifications.
    pub fn clear(&self) {
        trace!("Emitting before_clear");
        self.events.before_clear.emit(&());

        self.store.borrow_mut().clear();
        {
            let mut generators = self.generators.borrow_mut();
            generators.nodes.reset();
            generators.ports.reset();
            generators.edges.reset();
        }
        {
            let mut defaults = self.defaults.borrow_mut();
            defaults.node_priority.reset();
            defaults.edge_priority.reset();
        }
        debug!("Cleared graph");
    }

    // === Emission ===

    fn emit<K: std::fmt::Display + 'static>(
        &self,
        channel: &EventEmitter<K>,
        name: &str,
        id: K,
    ) {
        trace!("Emitting {} for {}", name, id);
        channel.emit(&id);
    }

    fn emit_before_removal(&self, cascade: &Cascade) {
        for id in &cascade.edges {
            self.emit(&self.events.before_edge_removed, "before_edge_removed", *id);
        }
        for id in &cascade.ports {
            self.emit(&self.events.before_port_removed, "before_port_removed", *id);
        }
        for id in &cascade.nodes {
            self.emit(&self.events.before_node_removed, "before_node_removed", *id);
        }
    }
}
