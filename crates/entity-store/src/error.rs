use thiserror::Error;

use crate::EntityId;

/// Errors that can occur when merging into the entity store.
#[derive(Debug, Error)]
pub enum EntityStoreError {
    /// The collection was not configured when the store was created.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// An entity without an `id` was given where one is required.
    #[error("Entity at position {position} in collection {collection} has no id")]
    MissingId { collection: String, position: usize },

    /// The merge would leave two entities with the same id in a collection.
    #[error("Duplicate id {id} in collection {collection}")]
    DuplicateId { collection: String, id: EntityId },
}

/// Result type for entity store operations.
pub type Result<T> = std::result::Result<T, EntityStoreError>;
