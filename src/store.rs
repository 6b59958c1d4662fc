//! Node, port and edge registry with adjacency indices.
//!
//! [`GraphStore`] is the plain data layer: every mutation validates first and
//! then writes, so a failed call leaves the store untouched. It emits no
//! notifications; that is the job of
//! [`GraphStoreController`](crate::controller::GraphStoreController).
//!
//! Removal always goes through one routine: the `cascade_for_*` accessors
//! compute the ordered list of entities a removal takes out, and
//! `apply_cascade` deletes exactly that list.

use crate::error::{Error, Result};
use crate::geom::{Point, Size};
use crate::ids::{EdgeId, NodeId, PortId};
use crate::shape::EdgeShape;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::rc::Rc;

/// Maps an element size to the point inside the element that is aligned with
/// the entity's position.
#[derive(Clone, Default)]
pub enum CenterFn {
    /// Middle of the element.
    #[default]
    Center,
    /// The element's top-left corner.
    TopLeft,
    Custom(Rc<dyn Fn(Size) -> Point>),
}

impl CenterFn {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Size) -> Point + 'static,
    {
        Self::Custom(Rc::new(f))
    }

    pub fn apply(&self, size: Size) -> Point {
        match self {
            Self::Center => Point::new(size.width / 2.0, size.height / 2.0),
            Self::TopLeft => Point::ZERO,
            Self::Custom(f) => f(size),
        }
    }
}

impl fmt::Debug for CenterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => write!(f, "Center"),
            Self::TopLeft => write!(f, "TopLeft"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for CenterFn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Center, Self::Center) | (Self::TopLeft, Self::TopLeft) => true,
            (Self::Custom(a), Self::Custom(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node<E> {
    pub id: NodeId,
    pub element: E,
    pub x: f64,
    pub y: f64,
    pub center_fn: CenterFn,
    pub priority: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Port<E> {
    pub id: PortId,
    pub node_id: NodeId,
    pub element: E,
    pub center_fn: CenterFn,
    /// Facing direction in radians.
    pub direction: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: PortId,
    pub target: PortId,
    pub shape: EdgeShape,
    pub priority: i32,
}

impl Edge {
    /// Both ends on the same port.
    pub fn is_port_cycle(&self) -> bool {
        self.source == self.target
    }
}

/// Key for [`GraphStore::adjacent_edges`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdjacencyKey {
    Node(NodeId),
    Port(PortId),
}

impl From<NodeId> for AdjacencyKey {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<PortId> for AdjacencyKey {
    fn from(id: PortId) -> Self {
        Self::Port(id)
    }
}

/// Everything a removal takes out, in notification order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cascade {
    pub edges: Vec<EdgeId>,
    pub ports: Vec<PortId>,
    pub nodes: Vec<NodeId>,
}

impl Cascade {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.ports.is_empty() && self.nodes.is_empty()
    }
}

/// In-memory graph registry.
///
/// Generic over `E`, the externally owned element handle attached to nodes
/// and ports. The store only clones and compares it.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphStore<E> {
    nodes: IndexMap<NodeId, Node<E>>,
    ports: IndexMap<PortId, Port<E>>,
    edges: IndexMap<EdgeId, Edge>,
    node_ports: IndexMap<NodeId, IndexSet<PortId>>,
    port_incoming: IndexMap<PortId, IndexSet<EdgeId>>,
    port_outgoing: IndexMap<PortId, IndexSet<EdgeId>>,
    port_cycles: IndexMap<PortId, IndexSet<EdgeId>>,
}

impl<E> Default for GraphStore<E> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            ports: IndexMap::new(),
            edges: IndexMap::new(),
            node_ports: IndexMap::new(),
            port_incoming: IndexMap::new(),
            port_outgoing: IndexMap::new(),
            port_cycles: IndexMap::new(),
        }
    }
}

impl<E> GraphStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    // === Nodes ===

    pub fn add_node(&mut self, node: Node<E>) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::duplicate(node.id));
        }
        self.node_ports.insert(node.id, IndexSet::new());
        self.nodes.insert(node.id, node);
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<E>> {
        self.nodes.get_mut(&id).ok_or_else(|| Error::not_found(id))
    }

    pub fn update_node_coordinates(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        let node = self.node_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    pub fn update_node_priority(&mut self, id: NodeId, priority: i32) -> Result<()> {
        self.node_mut(id)?.priority = priority;
        Ok(())
    }

    pub fn update_node_center_fn(&mut self, id: NodeId, center_fn: CenterFn) -> Result<()> {
        self.node_mut(id)?.center_fn = center_fn;
        Ok(())
    }

    /// Remove a node together with its ports and their edges.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Cascade> {
        let cascade = self.cascade_for_node(id)?;
        self.apply_cascade(&cascade);
        Ok(cascade)
    }

    // === Ports ===

    pub fn add_port(&mut self, port: Port<E>) -> Result<()> {
        if self.ports.contains_key(&port.id) {
            return Err(Error::duplicate(port.id));
        }
        let Some(owned) = self.node_ports.get_mut(&port.node_id) else {
            return Err(Error::invalid_reference(port.id, port.node_id));
        };
        owned.insert(port.id);
        self.port_incoming.insert(port.id, IndexSet::new());
        self.port_outgoing.insert(port.id, IndexSet::new());
        self.port_cycles.insert(port.id, IndexSet::new());
        self.ports.insert(port.id, port);
        Ok(())
    }

    fn port_mut(&mut self, id: PortId) -> Result<&mut Port<E>> {
        self.ports.get_mut(&id).ok_or_else(|| Error::not_found(id))
    }

    pub fn update_port_direction(&mut self, id: PortId, direction: f64) -> Result<()> {
        self.port_mut(id)?.direction = direction;
        Ok(())
    }

    pub fn update_port_center_fn(&mut self, id: PortId, center_fn: CenterFn) -> Result<()> {
        self.port_mut(id)?.center_fn = center_fn;
        Ok(())
    }

    /// Remove a port together with every edge using it.
    pub fn remove_port(&mut self, id: PortId) -> Result<Cascade> {
        let cascade = self.cascade_for_port(id)?;
        self.apply_cascade(&cascade);
        Ok(cascade)
    }

    // === Edges ===

    fn check_endpoints(&self, id: EdgeId, source: PortId, target: PortId) -> Result<()> {
        for port in [source, target] {
            if !self.ports.contains_key(&port) {
                return Err(Error::invalid_reference(id, port));
            }
        }
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(Error::duplicate(edge.id));
        }
        self.check_endpoints(edge.id, edge.source, edge.target)?;
        self.attach(edge.id, edge.source, edge.target);
        self.edges.insert(edge.id, edge);
        Ok(())
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        self.edges.get_mut(&id).ok_or_else(|| Error::not_found(id))
    }

    pub fn update_edge_shape(&mut self, id: EdgeId, shape: EdgeShape) -> Result<()> {
        self.edge_mut(id)?.shape = shape;
        Ok(())
    }

    pub fn update_edge_priority(&mut self, id: EdgeId, priority: i32) -> Result<()> {
        self.edge_mut(id)?.priority = priority;
        Ok(())
    }

    /// Re-point an edge to new endpoints, keeping the adjacency indices in step.
    pub fn update_edge_endpoints(&mut self, id: EdgeId, source: PortId, target: PortId) -> Result<()> {
        let (old_source, old_target) = match self.edges.get(&id) {
            Some(edge) => (edge.source, edge.target),
            None => return Err(Error::not_found(id)),
        };
        self.check_endpoints(id, source, target)?;

        self.detach(id, old_source, old_target);
        self.attach(id, source, target);
        let edge = self.edge_mut(id)?;
        edge.source = source;
        edge.target = target;
        Ok(())
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Cascade> {
        let cascade = self.cascade_for_edge(id)?;
        self.apply_cascade(&cascade);
        Ok(cascade)
    }

    fn attach(&mut self, id: EdgeId, source: PortId, target: PortId) {
        if source == target {
            if let Some(set) = self.port_cycles.get_mut(&source) {
                set.insert(id);
            }
        } else {
            if let Some(set) = self.port_outgoing.get_mut(&source) {
                set.insert(id);
            }
            if let Some(set) = self.port_incoming.get_mut(&target) {
                set.insert(id);
            }
        }
    }

    fn detach(&mut self, id: EdgeId, source: PortId, target: PortId) {
        if source == target {
            if let Some(set) = self.port_cycles.get_mut(&source) {
                set.shift_remove(&id);
            }
        } else {
            if let Some(set) = self.port_outgoing.get_mut(&source) {
                set.shift_remove(&id);
            }
            if let Some(set) = self.port_incoming.get_mut(&target) {
                set.shift_remove(&id);
            }
        }
    }

    // === Cascade ===

    pub fn cascade_for_node(&self, id: NodeId) -> Result<Cascade> {
        let ports = self.node_ports.get(&id).ok_or_else(|| Error::not_found(id))?;
        let mut edges = IndexSet::new();
        for port in ports {
            edges.extend(self.port_edges(*port));
        }
        Ok(Cascade {
            edges: edges.into_iter().collect(),
            ports: ports.iter().copied().collect(),
            nodes: vec![id],
        })
    }

    pub fn cascade_for_port(&self, id: PortId) -> Result<Cascade> {
        if !self.ports.contains_key(&id) {
            return Err(Error::not_found(id));
        }
        Ok(Cascade {
            edges: self.port_edges(id).collect(),
            ports: vec![id],
            nodes: Vec::new(),
        })
    }

    pub fn cascade_for_edge(&self, id: EdgeId) -> Result<Cascade> {
        if !self.edges.contains_key(&id) {
            return Err(Error::not_found(id));
        }
        Ok(Cascade {
            edges: vec![id],
            ..Default::default()
        })
    }

    /// Delete everything listed in `cascade`: edges first, then ports, then
    /// nodes, so no index ever points at a missing entity.
    fn apply_cascade(&mut self, cascade: &Cascade) {
        for id in &cascade.edges {
            if let Some(edge) = self.edges.shift_remove(id) {
                self.detach(*id, edge.source, edge.target);
            }
        }
        for id in &cascade.ports {
            if let Some(port) = self.ports.shift_remove(id) {
                if let Some(owned) = self.node_ports.get_mut(&port.node_id) {
                    owned.shift_remove(id);
                }
            }
            self.port_incoming.shift_remove(id);
            self.port_outgoing.shift_remove(id);
            self.port_cycles.shift_remove(id);
        }
        for id in &cascade.nodes {
            self.nodes.shift_remove(id);
            self.node_ports.shift_remove(id);
        }
    }

    /// Drop everything at once, without computing cascades.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.ports.clear();
        self.edges.clear();
        self.node_ports.clear();
        self.port_incoming.clear();
        self.port_outgoing.clear();
        self.port_cycles.clear();
    }

    // === Read access ===

    pub fn node(&self, id: NodeId) -> Option<&Node<E>> {
        self.nodes.get(&id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port<E>> {
        self.ports.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn has_port(&self, id: PortId) -> bool {
        self.ports.contains_key(&id)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<E>> + '_ {
        self.nodes.values()
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port<E>> + '_ {
        self.ports.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn port_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.ports.keys().copied()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ports.is_empty() && self.edges.is_empty()
    }

    pub fn node_port_ids(&self, id: NodeId) -> Result<Vec<PortId>> {
        self.node_ports
            .get(&id)
            .map(|ports| ports.iter().copied().collect())
            .ok_or_else(|| Error::not_found(id))
    }

    fn port_index(
        &self,
        index: &IndexMap<PortId, IndexSet<EdgeId>>,
        id: PortId,
    ) -> Result<Vec<EdgeId>> {
        index
            .get(&id)
            .map(|edges| edges.iter().copied().collect())
            .ok_or_else(|| Error::not_found(id))
    }

    pub fn port_incoming_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.port_index(&self.port_incoming, id)
    }

    pub fn port_outgoing_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.port_index(&self.port_outgoing, id)
    }

    pub fn port_cycle_edge_ids(&self, id: PortId) -> Result<Vec<EdgeId>> {
        self.port_index(&self.port_cycles, id)
    }

    /// Edges entering the node from a port of another node.
    pub fn node_incoming_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.node_edges_where(id, |store, edge| {
            store.port_node(edge.source) != Some(id) && store.port_node(edge.target) == Some(id)
        })
    }

    /// Edges leaving the node towards a port of another node.
    pub fn node_outgoing_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.node_edges_where(id, |store, edge| {
            store.port_node(edge.source) == Some(id) && store.port_node(edge.target) != Some(id)
        })
    }

    /// Edges whose both ends are ports of the node.
    pub fn node_cycle_edge_ids(&self, id: NodeId) -> Result<Vec<EdgeId>> {
        self.node_edges_where(id, |store, edge| {
            store.port_node(edge.source) == Some(id) && store.port_node(edge.target) == Some(id)
        })
    }

    fn node_edges_where<F>(&self, id: NodeId, keep: F) -> Result<Vec<EdgeId>>
    where
        F: Fn(&Self, &Edge) -> bool,
    {
        Ok(self
            .adjacent_edges(id)?
            .into_iter()
            .filter(|edge_id| self.edges.get(edge_id).is_some_and(|edge| keep(self, edge)))
            .collect())
    }

    fn port_node(&self, port: PortId) -> Option<NodeId> {
        self.ports.get(&port).map(|p| p.node_id)
    }

    /// Outgoing, then incoming, then cycle edges of a port.
    fn port_edges(&self, id: PortId) -> impl Iterator<Item = EdgeId> + '_ {
        [&self.port_outgoing, &self.port_incoming, &self.port_cycles]
            .into_iter()
            .filter_map(move |index| index.get(&id))
            .flat_map(|edges| edges.iter().copied())
    }

    /// Every edge touching a node or a port.
    ///
    /// For a port the order is outgoing, incoming, then cycle edges; for a
    /// node it is the union over its ports in port order. An edge between
    /// two ports of the same node appears once.
    pub fn adjacent_edges(&self, key: impl Into<AdjacencyKey>) -> Result<IndexSet<EdgeId>> {
        match key.into() {
            AdjacencyKey::Port(id) => {
                if !self.ports.contains_key(&id) {
                    return Err(Error::not_found(id));
                }
                Ok(self.port_edges(id).collect())
            }
            AdjacencyKey::Node(id) => {
                let ports = self.node_ports.get(&id).ok_or_else(|| Error::not_found(id))?;
                Ok(ports.iter().flat_map(|port| self.port_edges(*port)).collect())
            }
        }
    }
}
