//! Immutable snapshots of the store contents.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{Entity, EntityId, StoreConfig};

/// Shared handle to one collection's entities.
///
/// Every merge that touches a collection installs a fresh `Arc`, so pointer
/// identity tells readers whether the collection changed.
pub type CollectionRef = Arc<Vec<Entity>>;

/// Entities grouped by destination collection, as produced by normalization.
pub type Batch = BTreeMap<String, Vec<Entity>>;

/// Name of the store slot holding the token of the given type.
pub fn token_slot(token_type: &str) -> String {
    format!("{token_type}Token")
}

/// A point-in-time view of every collection and token slot.
///
/// Cloning is cheap: collections are shared behind `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    collections: HashMap<String, CollectionRef>,
    tokens: HashMap<String, String>,
    revision: u64,
}

impl StoreState {
    /// Creates a state with every configured collection empty.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            collections: config
                .collections
                .iter()
                .map(|name| (name.clone(), Arc::new(Vec::new())))
                .collect(),
            tokens: HashMap::new(),
            revision: 0,
        }
    }

    /// Returns the shared handle of a collection.
    pub fn collection(&self, name: &str) -> Option<&CollectionRef> {
        self.collections.get(name)
    }

    /// Returns a collection's entities, or an empty slice if unknown.
    pub fn entities(&self, name: &str) -> &[Entity] {
        self.collections
            .get(name)
            .map(|entities| entities.as_slice())
            .unwrap_or(&[])
    }

    /// Finds an entity by id.
    pub fn find(&self, name: &str, id: &EntityId) -> Option<&Entity> {
        self.entities(name)
            .iter()
            .find(|entity| entity.id().as_ref() == Some(id))
    }

    /// Returns true if the collection was configured.
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Returns the configured collection names, sorted.
    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the token of the given type, e.g. `"user"` reads `userToken`.
    pub fn token(&self, token_type: &str) -> Option<&str> {
        self.tokens.get(&token_slot(token_type)).map(String::as_str)
    }

    /// Number of merges applied since the store was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Renders every collection as a JSON object keyed by collection name.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for name in self.collection_names() {
            let entities = self
                .entities(name)
                .iter()
                .cloned()
                .map(Entity::into_value)
                .collect();
            out.insert(name.to_string(), Value::Array(entities));
        }
        Value::Object(out)
    }

    pub(crate) fn install(&mut self, name: &str, entities: Vec<Entity>) {
        self.collections.insert(name.to_string(), Arc::new(entities));
    }

    pub(crate) fn set_token(&mut self, token_type: &str, token: String) {
        self.tokens.insert(token_slot(token_type), token);
    }

    pub(crate) fn bump_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub(crate) fn reset(&mut self) {
        for entities in self.collections.values_mut() {
            *entities = Arc::new(Vec::new());
        }
        self.tokens.clear();
        self.revision += 1;
    }
}
