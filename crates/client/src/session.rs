//! Explicit application context: store, errors, orchestrator and views.

use entity_store::{EntityStore, StoreState};
use orchestrator::{ErrorAggregator, ErrorSet, Orchestrator, RequestHandle, RequestIntent, Transport};
use selectors::{DerivedViewCache, Views};

use crate::Result;
use crate::config::Config;

/// Everything one client needs, created at start and torn down explicitly.
///
/// There is no process-wide store: components receive the session (or the
/// parts they need) by reference.
pub struct Session<T: Transport> {
    orchestrator: Orchestrator<T>,
    views: Views,
}

impl<T: Transport> Session<T> {
    /// Creates the store from `config`, seeds the configured token and starts
    /// the orchestrator. Must be called inside a tokio runtime.
    pub async fn start(config: &Config, transport: T) -> Self {
        let store = EntityStore::new(config.store.clone());
        if let Some(token) = &config.token {
            store.set_token(&config.token_type, token.as_str()).await;
        }

        let orchestrator = Orchestrator::start(store, ErrorAggregator::new(), transport);
        tracing::info!(
            api_url = %config.api_url,
            collections = config.store.collections.len(),
            "session started"
        );

        Self {
            orchestrator,
            views: Views::new(DerivedViewCache::new()),
        }
    }

    /// Schedules a request intent.
    pub fn dispatch(&self, intent: RequestIntent) -> RequestHandle {
        self.orchestrator.dispatch(intent)
    }

    pub fn store(&self) -> &EntityStore {
        self.orchestrator.store()
    }

    pub fn errors(&self) -> &ErrorAggregator {
        self.orchestrator.errors()
    }

    pub fn orchestrator(&self) -> &Orchestrator<T> {
        &self.orchestrator
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Current store contents.
    pub async fn state(&self) -> StoreState {
        self.store().snapshot().await
    }

    /// Current error set.
    pub async fn current_errors(&self) -> ErrorSet {
        self.errors().errors().await
    }

    /// Drains in-flight requests, then drops cached views and store contents.
    pub async fn shutdown(self) -> Result<()> {
        let store = self.store().clone();
        let errors = self.errors().clone();

        self.orchestrator.shutdown().await?;
        self.views.cache().clear();
        store.clear().await;
        errors.clear().await;

        tracing::info!("session shut down");
        Ok(())
    }
}
