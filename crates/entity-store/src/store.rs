use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    Batch, Entity, EntityStoreError, MergeStrategy, Result, StoreConfig, StoreState,
    merge::merge_entities,
};

/// Session-lifetime store of every configured collection.
///
/// Cloning yields another handle to the same store. Readers take
/// [`StoreState`] snapshots; writers go through the merge methods, each of
/// which is atomic with respect to the others.
#[derive(Clone)]
pub struct EntityStore {
    state: Arc<RwLock<StoreState>>,
}

impl EntityStore {
    /// Creates a store with every configured collection empty.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::new(&config))),
        }
    }

    /// Returns the current contents.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Returns the number of merges applied so far.
    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision()
    }

    /// Merges entities into one collection.
    ///
    /// Returns the collection length after the merge.
    #[tracing::instrument(skip(self, entities), fields(incoming = entities.len()))]
    pub async fn apply_merge(
        &self,
        collection: &str,
        entities: Vec<Entity>,
        strategy: MergeStrategy,
    ) -> Result<usize> {
        let mut batch = Batch::new();
        batch.insert(collection.to_string(), entities);

        let mut state = self.state.write().await;
        merge_batch(&mut state, batch, strategy)?;
        Ok(state.entities(collection).len())
    }

    /// Merges a normalized batch, one collection at a time, all or nothing.
    ///
    /// Every collection is validated before any is written, so a failing
    /// batch leaves the store untouched. Returns the new revision.
    #[tracing::instrument(skip(self, batch), fields(collections = batch.len()))]
    pub async fn apply_normalized(&self, batch: Batch, strategy: MergeStrategy) -> Result<u64> {
        let mut state = self.state.write().await;
        merge_batch(&mut state, batch, strategy)
    }

    /// Stores an auth token under its typed slot.
    pub async fn set_token(&self, token_type: &str, token: impl Into<String>) {
        self.state.write().await.set_token(token_type, token.into());
    }

    /// Reads the token of the given type.
    pub async fn token(&self, token_type: &str) -> Option<String> {
        self.state.read().await.token(token_type).map(str::to_string)
    }

    /// Empties every collection and token slot, keeping the collection set.
    pub async fn clear(&self) {
        self.state.write().await.reset();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

/// Validates every collection of `batch`, then installs them all.
fn merge_batch(state: &mut StoreState, batch: Batch, strategy: MergeStrategy) -> Result<u64> {
    let mut merged = Vec::with_capacity(batch.len());
    for (collection, entities) in batch {
        if !state.has_collection(&collection) {
            return Err(EntityStoreError::UnknownCollection(collection));
        }
        let incoming = entities.len();
        let entities =
            merge_entities(&collection, state.entities(&collection), entities, strategy)?;
        metrics::counter!("entity_store_entities_merged").increment(incoming as u64);
        merged.push((collection, entities));
    }

    for (collection, entities) in merged {
        tracing::debug!(%collection, len = entities.len(), %strategy, "collection merged");
        state.install(&collection, entities);
    }

    metrics::counter!("entity_store_merges_total", "strategy" => strategy.as_str())
        .increment(1);
    Ok(state.bump_revision())
}
