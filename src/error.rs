use crate::ids::EntityKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the graph controller, the store and the viewport.
///
/// Every failing call leaves the state it was invoked on unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} {id} already exists")]
    DuplicateId { kind: EntityKind, id: u64 },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    #[error("{kind} {id} references missing {referenced_kind} {referenced_id}")]
    InvalidReference {
        kind: EntityKind,
        id: u64,
        referenced_kind: EntityKind,
        referenced_id: u64,
    },

    #[error("Invalid viewport scale: {0}")]
    InvalidScale(f64),

    #[error("Invalid canvas config: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn duplicate<K: crate::ids::EntityId>(id: K) -> Self {
        Error::DuplicateId {
            kind: K::KIND,
            id: id.raw(),
        }
    }

    pub(crate) fn not_found<K: crate::ids::EntityId>(id: K) -> Self {
        Error::NotFound {
            kind: K::KIND,
            id: id.raw(),
        }
    }

    pub(crate) fn invalid_reference<K, R>(id: K, referenced: R) -> Self
    where
        K: crate::ids::EntityId,
        R: crate::ids::EntityId,
    {
        Error::InvalidReference {
            kind: K::KIND,
            id: id.raw(),
            referenced_kind: R::KIND,
            referenced_id: referenced.raw(),
        }
    }
}
