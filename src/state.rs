use crate::geom::{Point, Rect, Size};
use crate::ids::{EdgeId, NodeId, PortId};
use crate::shape::{compute_path, EdgePath, RenderFrame, RoutingCategory};
use crate::store::{GraphStore, Node};
use std::collections::HashMap;

/// Port rectangle as reported by the UI, relative to its node's top-left
/// corner in content units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoredPort {
    pub node_id: NodeId,
    pub rect: Rect,
}

/// Element sizes reported by the UI.
///
/// The store only knows where a node is anchored; the actual extent of node
/// and port elements comes from layout, so it is cached here and combined
/// with the store records to resolve render frames.
#[derive(Clone, Debug, Default)]
pub struct GeometryCache {
    pub node_sizes: HashMap<NodeId, Size>,
    pub port_rects: HashMap<PortId, StoredPort>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard handler for node size reports from Slint.
    pub fn handle_node_size_report(&mut self, id: NodeId, width: f64, height: f64) {
        self.node_sizes.insert(id, Size::new(width, height));
    }

    /// Standard handler for port rectangle reports from Slint.
    pub fn handle_port_report(
        &mut self,
        port_id: PortId,
        node_id: NodeId,
        rel_x: f64,
        rel_y: f64,
        width: f64,
        height: f64,
    ) {
        self.port_rects.insert(
            port_id,
            StoredPort {
                node_id,
                rect: Rect::new(rel_x, rel_y, width, height),
            },
        );
    }

    pub fn forget_node(&mut self, id: NodeId) {
        self.node_sizes.remove(&id);
        self.port_rects.retain(|_, port| port.node_id != id);
    }

    pub fn forget_port(&mut self, id: PortId) {
        self.port_rects.remove(&id);
    }

    pub fn clear(&mut self) {
        self.node_sizes.clear();
        self.port_rects.clear();
    }

    pub fn node_size(&self, id: NodeId) -> Size {
        self.node_sizes.get(&id).copied().unwrap_or(Size::ZERO)
    }

    /// Top-left corner of a node element; an unreported size counts as zero.
    pub fn node_top_left<E>(&self, node: &Node<E>) -> Point {
        Point::new(node.x, node.y) - node.center_fn.apply(self.node_size(node.id))
    }

    /// Resolve the render frame of a port, or `None` while its rectangle has
    /// not been reported.
    pub fn port_frame<E>(&self, store: &GraphStore<E>, id: PortId) -> Option<RenderFrame> {
        let port = store.port(id)?;
        let node = store.node(port.node_id)?;
        let stored = self.port_rects.get(&id)?;

        let size = stored.rect.size();
        let center =
            self.node_top_left(node) + stored.rect.origin() + port.center_fn.apply(size);
        Some(RenderFrame::new(center, size, port.direction))
    }

    /// Compute the content-space geometry of an edge.
    ///
    /// Returns `None` if the edge is unknown or either port frame cannot be
    /// resolved yet.
    pub fn compute_edge_path<E>(&self, store: &GraphStore<E>, id: EdgeId) -> Option<(RoutingCategory, EdgePath)> {
        let edge = store.edge(id)?;
        let source = store.port(edge.source)?;
        let target = store.port(edge.target)?;
        let category =
            RoutingCategory::classify(source.id, target.id, source.node_id, target.node_id);

        let source_frame = self.port_frame(store, edge.source)?;
        let target_frame = self.port_frame(store, edge.target)?;
        Some((
            category,
            compute_path(&source_frame, &target_frame, category, &edge.shape),
        ))
    }
}
