//! Typed identifiers and the id generator.
//!
//! Nodes, ports and edges live in separate namespaces. Ids are either
//! supplied by the caller or drawn from an [`IdGenerator`], which is handed an
//! "is taken" predicate so it never returns an id that is currently live.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// The namespace an id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Port,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Port => write!(f, "port"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// Common behaviour of the three id newtypes.
pub trait EntityId: Copy + Eq + std::hash::Hash + fmt::Debug + fmt::Display + 'static {
    const KIND: EntityKind;

    fn from_raw(raw: u64) -> Self;
    fn raw(self) -> u64;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a node.
    NodeId,
    EntityKind::Node
);
entity_id!(
    /// Identifier of a port.
    PortId,
    EntityKind::Port
);
entity_id!(
    /// Identifier of an edge.
    EdgeId,
    EntityKind::Edge
);

/// Hands out fresh ids for one namespace.
///
/// The generator keeps a counter and skips every value the supplied
/// predicate reports as taken, so caller-supplied ids and generated ids can
/// be mixed freely.
///
/// # Example
///
/// ```
/// use slint_graph_canvas::{IdGenerator, NodeId};
///
/// let mut ids = IdGenerator::<NodeId>::new();
/// let taken = [NodeId(0), NodeId(1)];
/// assert_eq!(ids.create(|id| taken.contains(&id)), NodeId(2));
/// ```
#[derive(Debug)]
pub struct IdGenerator<K> {
    counter: u64,
    _kind: PhantomData<K>,
}

impl<K> Default for IdGenerator<K> {
    fn default() -> Self {
        Self {
            counter: 0,
            _kind: PhantomData,
        }
    }
}

impl<K> Clone for IdGenerator<K> {
    fn clone(&self) -> Self {
        Self {
            counter: self.counter,
            _kind: PhantomData,
        }
    }
}

impl<K: EntityId> IdGenerator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `first` instead of zero.
    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: first,
            _kind: PhantomData,
        }
    }

    /// Return the next id for which `is_taken` is false.
    pub fn create<F>(&mut self, is_taken: F) -> K
    where
        F: Fn(K) -> bool,
    {
        loop {
            let candidate = K::from_raw(self.counter);
            self.counter = self.counter.wrapping_add(1);
            if !is_taken(candidate) {
                return candidate;
            }
        }
    }

    /// Rewind the counter to zero.
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
