//! Request intents: declarative descriptions of one network operation.

use std::sync::Arc;

use common::{Method, RequestId};
use entity_store::{MergeStrategy, StoreState};
use normalizer::{Normalized, NormalizerSpec};
use serde_json::Value;

use crate::Completion;

/// Callback run after a request completes, with the store as it stands after
/// the completion was applied.
pub type Hook = Arc<dyn Fn(&StoreState, &Completion) + Send + Sync>;

/// Custom normalization function: payload in, batch out.
pub type NormalizeFn = Arc<dyn Fn(&Value) -> normalizer::Result<Normalized> + Send + Sync>;

/// How a successful payload is turned into store entities.
#[derive(Clone)]
pub enum Normalizer {
    /// Declarative field-to-collection mapping.
    Spec(NormalizerSpec),
    /// Arbitrary function, for payloads a spec cannot describe.
    Custom(NormalizeFn),
}

impl Normalizer {
    /// Runs the normalizer against a payload.
    pub fn run(&self, payload: &Value, root_collection: &str) -> normalizer::Result<Normalized> {
        match self {
            Normalizer::Spec(spec) => normalizer::normalize(payload, root_collection, spec),
            Normalizer::Custom(normalize) => normalize(payload),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::Spec(NormalizerSpec::new())
    }
}

impl From<NormalizerSpec> for Normalizer {
    fn from(spec: NormalizerSpec) -> Self {
        Normalizer::Spec(spec)
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Normalizer::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Normalizer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One desired network operation plus how its outcome is applied.
///
/// ```
/// use entity_store::MergeStrategy;
/// use orchestrator::RequestIntent;
/// use serde_json::json;
///
/// let intent = RequestIntent::patch("bookings/b1")
///     .body(json!({"isCancelled": true}))
///     .merge(MergeStrategy::MergeById);
/// assert_eq!(intent.target_collection(), "bookings");
/// ```
#[derive(Clone)]
pub struct RequestIntent {
    pub id: RequestId,
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Target collection; derived from the path when unset.
    pub key: Option<String>,
    pub normalizer: Normalizer,
    pub merge: MergeStrategy,
    /// Resolve from the current store contents without a transport call.
    pub local: bool,
    /// Join an identical in-flight deduplicating request instead of sending.
    pub dedupe: bool,
    /// Token slot attached to the outgoing request, e.g. `"user"`.
    pub token_type: Option<String>,
    pub(crate) on_success: Option<Hook>,
    pub(crate) on_fail: Option<Hook>,
}

impl RequestIntent {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: path.into(),
            body: None,
            key: None,
            normalizer: Normalizer::default(),
            merge: MergeStrategy::default(),
            local: false,
            dedupe: false,
            token_type: None,
            on_success: None,
            on_fail: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Overrides the collection the payload is normalized into.
    pub fn key(mut self, collection: impl Into<String>) -> Self {
        self.key = Some(collection.into());
        self
    }

    pub fn normalizer(mut self, normalizer: impl Into<Normalizer>) -> Self {
        self.normalizer = normalizer.into();
        self
    }

    /// Normalizes with a custom function instead of a spec.
    pub fn normalize_with<F>(mut self, normalize: F) -> Self
    where
        F: Fn(&Value) -> normalizer::Result<Normalized> + Send + Sync + 'static,
    {
        self.normalizer = Normalizer::Custom(Arc::new(normalize));
        self
    }

    pub fn merge(mut self, strategy: MergeStrategy) -> Self {
        self.merge = strategy;
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StoreState, &Completion) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_fail<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StoreState, &Completion) + Send + Sync + 'static,
    {
        self.on_fail = Some(Arc::new(hook));
        self
    }

    /// Collection the payload lands in: `key`, else the first path segment.
    pub fn target_collection(&self) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => collection_from_path(&self.path).to_string(),
        }
    }

    /// Identity used for opt-in deduplication.
    pub fn dedupe_key(&self) -> String {
        format!("{} {}", self.method, route_path(&self.path))
    }
}

impl std::fmt::Debug for RequestIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestIntent")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body)
            .field("key", &self.key)
            .field("normalizer", &self.normalizer)
            .field("merge", &self.merge)
            .field("local", &self.local)
            .field("dedupe", &self.dedupe)
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

/// Path without leading slashes, as used for routing and deduplication.
pub fn route_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// First segment of a path: `/bookings/b1?x=1` gives `bookings`.
pub fn collection_from_path(path: &str) -> &str {
    let path = route_path(path);
    let end = path.find(['/', '?']).unwrap_or(path.len());
    &path[..end]
}
