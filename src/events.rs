//! Typed publish/subscribe channels for graph lifecycle notifications.
//!
//! Each channel is a pair: an [`EventEmitter`] kept by the controller and an
//! [`EventHandler`] handed to subscribers. Listeners are called in
//! subscription order. Unsubscribing from inside a listener is allowed; a
//! listener removed mid-emission is not called for the rest of that emission.

use crate::ids::{EdgeId, NodeId, PortId};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slots<T> {
    next_key: u64,
    listeners: IndexMap<u64, Listener<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            next_key: 0,
            listeners: IndexMap::new(),
        }
    }
}

/// Sending side of a channel.
pub struct EventEmitter<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

/// Subscribing side of a channel. Cheap to clone.
pub struct EventHandler<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

/// Create a connected emitter/handler pair.
pub fn channel<T: 'static>() -> (EventEmitter<T>, EventHandler<T>) {
    let slots = Rc::new(RefCell::new(Slots::default()));
    (
        EventEmitter {
            slots: slots.clone(),
        },
        EventHandler { slots },
    )
}

impl<T: 'static> EventEmitter<T> {
    /// Call every listener with `payload`.
    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<(u64, Listener<T>)> = self
            .slots
            .borrow()
            .listeners
            .iter()
            .map(|(key, listener)| (*key, listener.clone()))
            .collect();

        for (key, listener) in snapshot {
            if !self.slots.borrow().listeners.contains_key(&key) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(payload),
                Err(_) => tracing::warn!(key, "Skipping listener re-entered during emission"),
            };
        }
    }

    pub fn listener_count(&self) -> usize {
        self.slots.borrow().listeners.len()
    }
}

impl<T: 'static> EventHandler<T> {
    /// Register a listener. Keep the returned [`Subscription`] to remove it
    /// later; dropping the handle leaves the listener in place.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        let key = slots.next_key;
        slots.next_key += 1;
        slots.listeners.insert(key, Rc::new(RefCell::new(listener)));

        let weak: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription {
            remove: Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().listeners.shift_remove(&key);
                }
            }),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.slots.borrow().listeners.len()
    }
}

/// Handle for removing one listener.
pub struct Subscription {
    remove: Box<dyn FnOnce()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

macro_rules! graph_channels {
    ($($(#[$meta:meta])* $name:ident: $payload:ty),* $(,)?) => {
        /// Emitting side of every graph notification channel.
        pub struct GraphEvents {
            $(pub(crate) $name: EventEmitter<$payload>,)*
        }

        /// Subscribing side of every graph notification channel.
        #[derive(Clone)]
        pub struct GraphEventHandlers {
            $($(#[$meta])* pub $name: EventHandler<$payload>,)*
        }

        /// Create the full set of connected graph channels.
        pub fn graph_events() -> (GraphEvents, GraphEventHandlers) {
            $(let $name = channel::<$payload>();)*
            (
                GraphEvents { $($name: $name.0,)* },
                GraphEventHandlers { $($name: $name.1,)* },
            )
        }
    };
}

graph_channels! {
    after_node_added: NodeId,
    /// Coordinates or center function changed.
    after_node_coordinates_updated: NodeId,
    after_node_priority_updated: NodeId,
    before_node_removed: NodeId,
    after_port_added: PortId,
    /// Direction or center function changed.
    after_port_updated: PortId,
    before_port_removed: PortId,
    after_edge_added: EdgeId,
    after_edge_shape_updated: EdgeId,
    after_edge_priority_updated: EdgeId,
    /// Source or target port changed.
    after_edge_adjacency_updated: EdgeId,
    before_edge_removed: EdgeId,
    before_clear: (),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn FnMut(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |name: &str| -> Box<dyn FnMut(&u32)> {
                let log = log.clone();
                let name = name.to_string();
                Box::new(move |v: &u32| log.borrow_mut().push(format!("{}:{}", name, v)))
            }
        };
        (log, make)
    }

    #[test]
    fn test_fan_out_in_subscription_order() {
        let (emitter, handler) = channel::<u32>();
        let (log, make) = recorder();

        handler.subscribe(make("a"));
        handler.subscribe(make("b"));
        emitter.emit(&7);

        assert_eq!(*log.borrow(), vec!["a:7", "b:7"]);
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_unsubscribe_leaves_others() {
        let (emitter, handler) = channel::<u32>();
        let (log, make) = recorder();

        let a = handler.subscribe(make("a"));
        handler.subscribe(make("b"));
        a.unsubscribe();
        emitter.emit(&1);

        assert_eq!(*log.borrow(), vec!["b:1"]);
        assert_eq!(handler.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribe_from_inside_listener() {
        let (emitter, handler) = channel::<u32>();
        let (log, make) = recorder();

        let own: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let later: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let sub = handler.subscribe({
            let own = own.clone();
            let later = later.clone();
            let log = log.clone();
            move |v: &u32| {
                log.borrow_mut().push(format!("once:{}", v));
                if let Some(s) = own.borrow_mut().take() {
                    s.unsubscribe();
                }
                // Removing a listener that has not run yet skips it
                if let Some(s) = later.borrow_mut().take() {
                    s.unsubscribe();
                }
            }
        });
        *own.borrow_mut() = Some(sub);
        *later.borrow_mut() = Some(handler.subscribe(make("removed")));
        handler.subscribe(make("kept"));

        emitter.emit(&1);
        emitter.emit(&2);

        assert_eq!(*log.borrow(), vec!["once:1", "kept:1", "kept:2"]);
    }

    #[test]
    fn test_graph_events_are_connected() {
        let (events, handlers) = graph_events();
        let seen = Rc::new(RefCell::new(Vec::new()));

        handlers.before_node_removed.subscribe({
            let seen = seen.clone();
            move |id: &NodeId| seen.borrow_mut().push(*id)
        });
        events.before_node_removed.emit(&NodeId(4));
        events.after_node_added.emit(&NodeId(5));

        assert_eq!(*seen.borrow(), vec![NodeId(4)]);
    }
}
