//! Normalized entity store.
//!
//! The store maps a fixed set of collection names to ordered sequences of
//! entities. It is mutated only through [`EntityStore::apply_merge`] and
//! [`EntityStore::apply_normalized`], under one of the [`MergeStrategy`]
//! variants, and read through cheap [`StoreState`] snapshots.

pub mod config;
pub mod entity;
pub mod error;
pub mod merge;
pub mod state;
pub mod store;

pub use common::EntityId;
pub use config::{DEFAULT_COLLECTIONS, StoreConfig};
pub use entity::Entity;
pub use error::{EntityStoreError, Result};
pub use merge::{MergeStrategy, merge_entities};
pub use state::{Batch, CollectionRef, StoreState, token_slot};
pub use store::EntityStore;
