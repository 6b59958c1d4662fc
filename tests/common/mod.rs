//! Common test utilities for integration tests.

#![allow(dead_code)]

use slint_graph_canvas::{
    AddEdgeRequest, AddNodeRequest, AddPortRequest, EdgeId, GraphStoreController, NodeId, PortId,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Install a tracing subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every notification a controller emits, as `channel:id` strings in
/// emission order.
#[derive(Default, Clone)]
pub struct NotificationRecorder {
    pub log: Rc<RefCell<Vec<String>>>,
}

impl NotificationRecorder {
    pub fn attach<E: 'static>(controller: &GraphStoreController<E>) -> Self {
        let recorder = Self::default();
        let events = controller.events();

        macro_rules! record {
            ($($name:ident),*) => {
                $(
                    events.$name.subscribe({
                        let log = recorder.log.clone();
                        move |id| log.borrow_mut().push(format!("{}:{}", stringify!($name), id))
                    });
                )*
            };
        }
        record!(
            after_node_added,
            after_node_coordinates_updated,
            after_node_priority_updated,
            before_node_removed,
            after_port_added,
            after_port_updated,
            before_port_removed,
            after_edge_added,
            after_edge_shape_updated,
            after_edge_priority_updated,
            after_edge_adjacency_updated,
            before_edge_removed
        );
        events.before_clear.subscribe({
            let log = recorder.log.clone();
            move |_| log.borrow_mut().push("before_clear".to_string())
        });
        recorder
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Entries starting with `prefix`, e.g. `"before_"`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Ids created by [`build_sample_graph`].
pub struct SampleGraph {
    pub nodes: [NodeId; 3],
    /// Ports: n0 -> [p0, p1], n1 -> [p2], n2 -> [p3]
    pub ports: [PortId; 4],
    /// Edges: e0 p0->p2, e1 p2->p3, e2 p0->p1 (node cycle), e3 p3->p3 (port cycle)
    pub edges: [EdgeId; 4],
}

/// Three nodes in a row with one edge of every routing category.
pub fn build_sample_graph(controller: &GraphStoreController<&'static str>) -> SampleGraph {
    let n0 = controller.add_node(AddNodeRequest::new("n0", 0.0, 0.0)).unwrap();
    let n1 = controller.add_node(AddNodeRequest::new("n1", 200.0, 0.0)).unwrap();
    let n2 = controller.add_node(AddNodeRequest::new("n2", 400.0, 0.0)).unwrap();

    let p0 = controller.add_port(AddPortRequest::new("p0", n0)).unwrap();
    let p1 = controller.add_port(AddPortRequest::new("p1", n0)).unwrap();
    let p2 = controller.add_port(AddPortRequest::new("p2", n1)).unwrap();
    let p3 = controller.add_port(AddPortRequest::new("p3", n2)).unwrap();

    let e0 = controller.add_edge(AddEdgeRequest::new(p0, p2)).unwrap();
    let e1 = controller.add_edge(AddEdgeRequest::new(p2, p3)).unwrap();
    let e2 = controller.add_edge(AddEdgeRequest::new(p0, p1)).unwrap();
    let e3 = controller.add_edge(AddEdgeRequest::new(p3, p3)).unwrap();

    SampleGraph {
        nodes: [n0, n1, n2],
        ports: [p0, p1, p2, p3],
        edges: [e0, e1, e2, e3],
    }
}
