//! Contract between the graph controller and whatever renders the graph.
//!
//! A [`RenderConsumer`] receives one call per notification together with a
//! [`Graph`] facade it can query. Removal hooks run while the entity is still
//! in the store; every other hook runs after the store has changed.

use crate::controller::GraphStoreController;
use crate::events::Subscription;
use crate::graph::Graph;
use crate::ids::{EdgeId, NodeId, PortId};
use std::cell::RefCell;
use std::rc::Rc;

/// Receiver for graph lifecycle notifications. All methods default to no-ops.
#[allow(unused_variables)]
pub trait RenderConsumer<E> {
    fn on_node_added(&mut self, graph: &Graph<E>, id: NodeId) {}
    fn on_node_coordinates_updated(&mut self, graph: &Graph<E>, id: NodeId) {}
    fn on_node_priority_updated(&mut self, graph: &Graph<E>, id: NodeId) {}
    fn on_node_removed(&mut self, graph: &Graph<E>, id: NodeId) {}

    fn on_port_added(&mut self, graph: &Graph<E>, id: PortId) {}
    fn on_port_updated(&mut self, graph: &Graph<E>, id: PortId) {}
    fn on_port_removed(&mut self, graph: &Graph<E>, id: PortId) {}

    fn on_edge_added(&mut self, graph: &Graph<E>, id: EdgeId) {}
    fn on_edge_shape_updated(&mut self, graph: &Graph<E>, id: EdgeId) {}
    fn on_edge_priority_updated(&mut self, graph: &Graph<E>, id: EdgeId) {}
    fn on_edge_adjacency_updated(&mut self, graph: &Graph<E>, id: EdgeId) {}
    fn on_edge_removed(&mut self, graph: &Graph<E>, id: EdgeId) {}

    /// The whole graph is about to be dropped.
    fn on_clear(&mut self, graph: &Graph<E>) {}
}

/// Subscriptions created by [`attach_consumer`].
#[derive(Debug)]
pub struct ConsumerBinding {
    subscriptions: Vec<Subscription>,
}

impl ConsumerBinding {
    /// Stop delivering notifications to the consumer.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
    }
}

/// Subscribe `consumer` to every channel of `controller`.
///
/// # Arguments
/// * `controller` - The controller whose notifications are forwarded
/// * `consumer` - Shared consumer; it is borrowed mutably for each call
///
/// # Returns
/// A binding that removes all subscriptions on [`ConsumerBinding::detach`].
pub fn attach_consumer<E, C>(
    controller: &GraphStoreController<E>,
    consumer: Rc<RefCell<C>>,
) -> ConsumerBinding
where
    E: 'static,
    C: RenderConsumer<E> + 'static,
{
    let events = controller.events();
    let graph = controller.graph();
    let mut subscriptions = Vec::new();

    macro_rules! forward {
        ($($channel:ident => $method:ident),* $(,)?) => {
            $(
                subscriptions.push(events.$channel.subscribe({
                    let consumer = consumer.clone();
                    let graph = graph.clone();
                    move |id| consumer.borrow_mut().$method(&graph, *id)
                }));
            )*
        };
    }

    forward! {
        after_node_added => on_node_added,
        after_node_coordinates_updated => on_node_coordinates_updated,
        after_node_priority_updated => on_node_priority_updated,
        before_node_removed => on_node_removed,
        after_port_added => on_port_added,
        after_port_updated => on_port_updated,
        before_port_removed => on_port_removed,
        after_edge_added => on_edge_added,
        after_edge_shape_updated => on_edge_shape_updated,
        after_edge_priority_updated => on_edge_priority_updated,
        after_edge_adjacency_updated => on_edge_adjacency_updated,
        before_edge_removed => on_edge_removed,
    }
    subscriptions.push(events.before_clear.subscribe({
        let consumer = consumer.clone();
        move |_| consumer.borrow_mut().on_clear(&graph)
    }));

    ConsumerBinding { subscriptions }
}
