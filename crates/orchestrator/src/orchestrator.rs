//! Orchestrator: one task per dispatched intent, one writer for completions.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use common::RequestId;
use entity_store::EntityStore;
use normalizer::Normalized;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::aggregator::{ErrorAggregator, ErrorSet};
use crate::completion::{Completion, FailureKind, Outcome};
use crate::error::OrchestratorError;
use crate::intent::{Hook, RequestIntent};
use crate::state::{RequestState, StatusTable};
use crate::transport::{OutgoingRequest, Transport};

type SharedCompletion = Shared<BoxFuture<'static, Option<Completion>>>;

/// Work handed from request tasks to the completion writer.
///
/// Routing is a plain `match` in [`Inner::apply`].
enum DataAction {
    /// Answer a `local` intent from the current store contents.
    ResolveLocal { intent: RequestIntent },

    /// Normalize and merge a successful payload.
    Succeed {
        intent: RequestIntent,
        payload: Value,
    },

    /// Replace the error set.
    Fail {
        intent: RequestIntent,
        kind: FailureKind,
        errors: ErrorSet,
    },
}

struct Envelope {
    action: DataAction,
    reply: oneshot::Sender<Completion>,
}

/// Hooks of intents that joined a deduplicated request.
#[derive(Default)]
struct JoinedHooks {
    on_success: Vec<Hook>,
    on_fail: Vec<Hook>,
}

struct InFlight {
    request_id: RequestId,
    completion: SharedCompletion,
    joined: JoinedHooks,
}

struct Inner<T: Transport> {
    store: EntityStore,
    errors: ErrorAggregator,
    transport: T,
    statuses: Mutex<StatusTable>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// Handle to a dispatched request.
///
/// Dropping the handle does not cancel the request: it still runs to
/// completion and still writes to the store.
#[derive(Clone)]
pub struct RequestHandle {
    request_id: RequestId,
    deduplicated: bool,
    completion: SharedCompletion,
}

impl RequestHandle {
    /// Id of the request doing the work; for a deduplicated dispatch this
    /// is the request that was already in flight.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns true if this dispatch joined an in-flight request.
    pub fn is_deduplicated(&self) -> bool {
        self.deduplicated
    }

    /// Waits for the request's completion.
    pub async fn completion(&self) -> Result<Completion, OrchestratorError> {
        self.completion
            .clone()
            .await
            .ok_or(OrchestratorError::Closed)
    }
}

/// Turns request intents into store mutations and caller callbacks.
///
/// Every dispatch runs as an independent tokio task, so transport calls
/// overlap freely. Their completions are funneled through a channel to a
/// single writer task that applies them one at a time: whichever completion
/// arrives last wins, regardless of dispatch order.
pub struct Orchestrator<T: Transport> {
    inner: Arc<Inner<T>>,
    sender: mpsc::UnboundedSender<Envelope>,
    writer: JoinHandle<()>,
}

impl<T: Transport> Orchestrator<T> {
    /// Starts the completion writer. Must be called inside a tokio runtime.
    pub fn start(store: EntityStore, errors: ErrorAggregator, transport: T) -> Self {
        let inner = Arc::new(Inner {
            store,
            errors,
            transport,
            statuses: Mutex::new(StatusTable::default()),
            in_flight: Mutex::new(HashMap::new()),
        });
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(Arc::clone(&inner).run_writer(receiver));

        tracing::info!("orchestrator started");
        Self {
            inner,
            sender,
            writer,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.inner.store
    }

    pub fn errors(&self) -> &ErrorAggregator {
        &self.inner.errors
    }

    /// Returns the lifecycle state of a request.
    ///
    /// Finished requests are forgotten once
    /// [`RETAINED_FINISHED_REQUESTS`](crate::RETAINED_FINISHED_REQUESTS)
    /// newer ones have finished.
    pub fn status(&self, request_id: RequestId) -> Option<RequestState> {
        self.inner.statuses.lock().get(request_id)
    }

    /// Number of requests whose state is currently tracked.
    pub fn tracked_requests(&self) -> usize {
        self.inner.statuses.lock().len()
    }

    /// Number of deduplicating requests currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Schedules an intent and returns immediately.
    ///
    /// Without `dedupe`, every call runs its own request, even when an
    /// identical one is already in flight.
    #[tracing::instrument(skip(self, intent), fields(request_id = %intent.id, method = %intent.method, path = %intent.path))]
    pub fn dispatch(&self, intent: RequestIntent) -> RequestHandle {
        metrics::counter!("requests_dispatched_total").increment(1);

        let (reply, receiver) = oneshot::channel();
        let completion: SharedCompletion = receiver.map(|result| result.ok()).boxed().shared();
        let request_id = intent.id;

        if intent.dedupe {
            let mut in_flight = self.inner.in_flight.lock();
            let key = intent.dedupe_key();
            if let Some(existing) = in_flight.get_mut(&key) {
                metrics::counter!("requests_deduplicated_total").increment(1);
                tracing::debug!(joined = %existing.request_id, "joined in-flight request");
                if let Some(hook) = intent.on_success {
                    existing.joined.on_success.push(hook);
                }
                if let Some(hook) = intent.on_fail {
                    existing.joined.on_fail.push(hook);
                }
                return RequestHandle {
                    request_id: existing.request_id,
                    deduplicated: true,
                    completion: existing.completion.clone(),
                };
            }
            in_flight.insert(
                key,
                InFlight {
                    request_id,
                    completion: completion.clone(),
                    joined: JoinedHooks::default(),
                },
            );
        }

        self.inner
            .statuses
            .lock()
            .set(request_id, RequestState::Dispatched);

        let inner = Arc::clone(&self.inner);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let fallback = intent.clone();
            let action = match AssertUnwindSafe(inner.execute(intent)).catch_unwind().await {
                Ok(action) => action,
                Err(_) => {
                    tracing::error!(%request_id, "request task panicked");
                    DataAction::Fail {
                        intent: fallback,
                        kind: FailureKind::Transport,
                        errors: ErrorSet::global("Request failed unexpectedly"),
                    }
                }
            };
            if sender.send(Envelope { action, reply }).is_err() {
                tracing::error!(%request_id, "completion writer stopped, dropping completion");
            }
        });

        RequestHandle {
            request_id,
            deduplicated: false,
            completion,
        }
    }

    /// Closes the dispatch side and waits until every in-flight request has
    /// been applied.
    pub async fn shutdown(self) -> Result<(), OrchestratorError> {
        drop(self.sender);
        self.writer
            .await
            .map_err(|e| OrchestratorError::Writer(e.to_string()))?;
        tracing::info!("orchestrator stopped");
        Ok(())
    }
}

/// Runs the intent's normalizer, turning a panic in a custom one into an
/// error message.
fn normalize(intent: &RequestIntent, payload: &Value, collection: &str) -> Result<Normalized, String> {
    match catch_unwind(AssertUnwindSafe(|| intent.normalizer.run(payload, collection))) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => {
            tracing::error!(request_id = %intent.id, "normalizer panicked");
            Err("Normalizer failed unexpectedly".to_string())
        }
    }
}

impl<T: Transport> Inner<T> {
    fn transition(&self, request_id: RequestId, next: RequestState) {
        let current = self
            .statuses
            .lock()
            .set(request_id, next)
            .unwrap_or_default();
        if !current.can_transition_to(next) {
            tracing::warn!(%request_id, from = %current, to = %next, "unexpected request transition");
        }
    }

    /// Runs the transport leg of an intent; never touches the store.
    async fn execute(&self, intent: RequestIntent) -> DataAction {
        self.transition(intent.id, RequestState::InFlight);

        if intent.local {
            return DataAction::ResolveLocal { intent };
        }

        let token = match &intent.token_type {
            Some(token_type) => {
                let token = self.store.token(token_type).await;
                if token.is_none() {
                    tracing::debug!(%token_type, "no token stored, sending without one");
                }
                token
            }
            None => None,
        };

        let request = OutgoingRequest {
            method: intent.method,
            path: intent.path.clone(),
            body: intent.body.clone(),
            token,
        };

        let started = Instant::now();
        let result = self.transport.send(request).await;
        metrics::histogram!("request_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok(response) => match response.into_result() {
                Ok(payload) => DataAction::Succeed { intent, payload },
                Err(errors) => DataAction::Fail {
                    intent,
                    kind: FailureKind::Validation,
                    errors,
                },
            },
            Err(e) => DataAction::Fail {
                intent,
                kind: FailureKind::Transport,
                errors: ErrorSet::global(e.to_string()),
            },
        }
    }

    async fn run_writer(self: Arc<Self>, mut receiver: mpsc::UnboundedReceiver<Envelope>) {
        while let Some(Envelope { action, reply }) = receiver.recv().await {
            let (completion, intent) = self.apply(action).await;

            let joined = if intent.dedupe {
                self.release_dedupe(&intent)
            } else {
                JoinedHooks::default()
            };

            let state = self.store.snapshot().await;
            let (own, others) = if completion.is_success() {
                (&intent.on_success, &joined.on_success)
            } else {
                (&intent.on_fail, &joined.on_fail)
            };
            for hook in own.iter().chain(others.iter()) {
                if catch_unwind(AssertUnwindSafe(|| hook(&state, &completion))).is_err() {
                    tracing::error!(request_id = %completion.request_id, "completion hook panicked");
                }
            }

            // The caller may have dropped its handle.
            let _ = reply.send(completion);
        }
    }

    fn release_dedupe(&self, intent: &RequestIntent) -> JoinedHooks {
        let mut in_flight = self.in_flight.lock();
        let key = intent.dedupe_key();
        match in_flight.get(&key) {
            Some(entry) if entry.request_id == intent.id => in_flight
                .remove(&key)
                .map(|entry| entry.joined)
                .unwrap_or_default(),
            _ => JoinedHooks::default(),
        }
    }

    async fn apply(&self, action: DataAction) -> (Completion, RequestIntent) {
        match action {
            DataAction::ResolveLocal { intent } => {
                let completion = self.resolve_local(&intent).await;
                (completion, intent)
            }
            DataAction::Succeed { intent, payload } => {
                let completion = self.succeed(&intent, payload).await;
                (completion, intent)
            }
            DataAction::Fail {
                intent,
                kind,
                errors,
            } => {
                let completion = self.fail(&intent, kind, errors).await;
                (completion, intent)
            }
        }
    }

    async fn resolve_local(&self, intent: &RequestIntent) -> Completion {
        let collection = intent.target_collection();
        let state = self.store.snapshot().await;
        if !state.has_collection(&collection) {
            return self
                .fail(
                    intent,
                    FailureKind::Completion,
                    ErrorSet::global(format!("Unknown collection: {collection}")),
                )
                .await;
        }

        let payload = Value::Array(
            state
                .entities(&collection)
                .iter()
                .cloned()
                .map(|entity| entity.into_value())
                .collect(),
        );
        self.finish_success(intent, collection, payload, None)
    }

    async fn succeed(&self, intent: &RequestIntent, payload: Value) -> Completion {
        let collection = intent.target_collection();

        let normalized = match normalize(intent, &payload, &collection) {
            Ok(normalized) => normalized,
            Err(message) => {
                return self
                    .fail(intent, FailureKind::Completion, ErrorSet::global(message))
                    .await;
            }
        };

        let revision = if normalized.is_empty() {
            None
        } else {
            match self.store.apply_normalized(normalized, intent.merge).await {
                Ok(revision) => Some(revision),
                Err(e) => {
                    return self
                        .fail(intent, FailureKind::Completion, ErrorSet::global(e.to_string()))
                        .await;
                }
            }
        };

        self.finish_success(intent, collection, payload, revision)
    }

    fn finish_success(
        &self,
        intent: &RequestIntent,
        collection: String,
        payload: Value,
        revision: Option<u64>,
    ) -> Completion {
        self.transition(intent.id, RequestState::Succeeded);
        metrics::counter!("requests_succeeded_total").increment(1);
        tracing::info!(
            request_id = %intent.id,
            method = %intent.method,
            path = %intent.path,
            %collection,
            ?revision,
            "request succeeded"
        );

        Completion {
            request_id: intent.id,
            method: intent.method,
            path: intent.path.clone(),
            collection,
            outcome: Outcome::Success { payload, revision },
        }
    }

    async fn fail(&self, intent: &RequestIntent, kind: FailureKind, errors: ErrorSet) -> Completion {
        self.errors.set_errors(errors.clone()).await;
        self.transition(intent.id, RequestState::Failed);
        metrics::counter!("requests_failed_total", "kind" => kind.as_str()).increment(1);
        tracing::warn!(
            request_id = %intent.id,
            method = %intent.method,
            path = %intent.path,
            kind = kind.as_str(),
            ?errors,
            "request failed"
        );

        Completion {
            request_id: intent.id,
            method: intent.method,
            path: intent.path.clone(),
            collection: intent.target_collection(),
            outcome: Outcome::Fail { kind, errors },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RETAINED_FINISHED_REQUESTS;
    use crate::transport::{ApiResponse, InMemoryTransport};
    use common::Method;
    use entity_store::{MergeStrategy, StoreConfig};
    use normalizer::NormalizerSpec;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Orchestrator<InMemoryTransport>, InMemoryTransport) {
        let store = EntityStore::new(StoreConfig::new([
            "bookings", "offerers", "users", "venues",
        ]));
        let transport = InMemoryTransport::new();
        let orchestrator = Orchestrator::start(store, ErrorAggregator::new(), transport.clone());
        (orchestrator, transport)
    }

    #[tokio::test]
    async fn test_success_normalizes_and_merges() {
        let (orchestrator, transport) = setup();
        transport.respond(
            Method::Get,
            "venues",
            ApiResponse::data(json!([
                {"id": "v1", "managingOffererId": "o1", "managingOfferer": {"id": "o1"}}
            ])),
        );

        let handle = orchestrator.dispatch(
            RequestIntent::get("/venues")
                .normalizer(NormalizerSpec::new().field("managingOfferer", "offerers")),
        );
        let completion = handle.completion().await.unwrap();

        assert!(completion.is_success());
        assert_eq!(completion.collection, "venues");
        assert_eq!(
            orchestrator.status(handle.request_id()),
            Some(RequestState::Succeeded)
        );
        let state = orchestrator.store().snapshot().await;
        assert_eq!(
            state.to_json()["venues"],
            json!([{"id": "v1", "managingOffererId": "o1"}])
        );
        assert_eq!(state.to_json()["offerers"], json!([{"id": "o1"}]));
    }

    #[tokio::test]
    async fn test_validation_failure_passes_errors_through() {
        let (orchestrator, transport) = setup();
        let errors = ErrorSet::new()
            .with("name", "Required")
            .with("siret", "Invalid");
        transport.respond(Method::Post, "offerers", ApiResponse::errors(errors.clone()));

        let completion = orchestrator
            .dispatch(RequestIntent::post("offerers").body(json!({"name": ""})))
            .completion()
            .await
            .unwrap();

        assert_eq!(completion.failure_kind(), Some(FailureKind::Validation));
        assert_eq!(completion.errors(), Some(&errors));
        assert_eq!(orchestrator.errors().errors().await, errors);
    }

    #[tokio::test]
    async fn test_merge_failure_becomes_global_error() {
        let (orchestrator, transport) = setup();
        transport.respond(
            Method::Get,
            "things",
            ApiResponse::data(json!([{"id": "t1"}])),
        );

        let completion = orchestrator
            .dispatch(RequestIntent::get("things"))
            .completion()
            .await
            .unwrap();

        assert_eq!(completion.failure_kind(), Some(FailureKind::Completion));
        let errors = orchestrator.errors().errors().await;
        assert_eq!(errors.global_messages(), ["Unknown collection: things"]);
    }

    #[tokio::test]
    async fn test_local_intent_skips_transport() {
        let (orchestrator, transport) = setup();
        orchestrator
            .store()
            .apply_merge(
                "users",
                vec![entity_store::Entity::with_id("u1")],
                MergeStrategy::ReplaceCollection,
            )
            .await
            .unwrap();
        let revision = orchestrator.store().revision().await;

        let completion = orchestrator
            .dispatch(RequestIntent::get("users/me").key("users").local())
            .completion()
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 0);
        assert_eq!(completion.payload(), Some(&json!([{"id": "u1"}])));
        assert_eq!(
            completion.outcome,
            Outcome::Success {
                payload: json!([{"id": "u1"}]),
                revision: None
            }
        );
        assert_eq!(orchestrator.store().revision().await, revision);
    }

    #[tokio::test]
    async fn test_token_is_attached_from_store() {
        let (orchestrator, transport) = setup();
        transport.respond(Method::Get, "users/me", ApiResponse::data(json!({"id": "u1"})));
        orchestrator.store().set_token("user", "secret").await;

        orchestrator
            .dispatch(RequestIntent::get("users/me").token_type("user"))
            .completion()
            .await
            .unwrap();
        orchestrator
            .dispatch(RequestIntent::get("users/me").token_type("admin"))
            .completion()
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].token.as_deref(), Some("secret"));
        assert_eq!(requests[1].token, None);
    }

    #[tokio::test]
    async fn test_hooks_see_store_after_merge() {
        let (orchestrator, transport) = setup();
        transport.respond(
            Method::Get,
            "bookings",
            ApiResponse::data(json!([{"id": "b1"}])),
        );
        transport.fail(Method::Get, "venues", "offline");

        let seen = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));

        let seen_in_hook = Arc::clone(&seen);
        orchestrator
            .dispatch(RequestIntent::get("bookings").on_success(move |state, completion| {
                assert!(completion.is_success());
                seen_in_hook.store(state.entities("bookings").len(), Ordering::SeqCst);
            }))
            .completion()
            .await
            .unwrap();

        let failed_in_hook = Arc::clone(&failed);
        let succeeded_in_hook = Arc::clone(&seen);
        orchestrator
            .dispatch(
                RequestIntent::get("venues")
                    .on_success(move |_, _| {
                        succeeded_in_hook.fetch_add(100, Ordering::SeqCst);
                    })
                    .on_fail(move |_, completion| {
                        assert_eq!(completion.failure_kind(), Some(FailureKind::Transport));
                        failed_in_hook.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .completion()
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_hook_does_not_stop_the_writer() {
        let (orchestrator, transport) = setup();
        transport.respond(Method::Get, "bookings", ApiResponse::data(json!([])));

        orchestrator
            .dispatch(RequestIntent::get("bookings").on_success(|_, _| panic!("boom")))
            .completion()
            .await
            .unwrap();
        let after = orchestrator
            .dispatch(RequestIntent::get("bookings"))
            .completion()
            .await
            .unwrap();

        assert!(after.is_success());
    }

    #[tokio::test]
    async fn test_panicking_normalizer_does_not_stop_the_writer() {
        let (orchestrator, transport) = setup();
        transport.respond(
            Method::Get,
            "bookings",
            ApiResponse::data(json!([{"id": "b1"}])),
        );

        let failed = orchestrator
            .dispatch(RequestIntent::get("bookings").normalize_with(|_| panic!("bad payload")))
            .completion()
            .await
            .unwrap();
        assert_eq!(failed.failure_kind(), Some(FailureKind::Completion));
        assert_eq!(
            orchestrator.errors().errors().await.global_messages(),
            ["Normalizer failed unexpectedly"]
        );

        let after = orchestrator
            .dispatch(RequestIntent::get("bookings"))
            .completion()
            .await
            .unwrap();
        assert!(after.is_success());
        assert_eq!(
            orchestrator.store().snapshot().await.entities("bookings").len(),
            1
        );
    }

    /// Panics on its first call, then answers normally.
    #[derive(Clone, Default)]
    struct PanicOnceTransport {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Transport for PanicOnceTransport {
        async fn send(
            &self,
            _request: OutgoingRequest,
        ) -> Result<ApiResponse, crate::transport::TransportError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("connection pool poisoned");
            }
            Ok(ApiResponse::data(json!([{"id": "b1"}])))
        }
    }

    #[tokio::test]
    async fn test_panicking_transport_fails_the_request_and_releases_dedupe() {
        let store = EntityStore::new(StoreConfig::new(["bookings"]));
        let orchestrator =
            Orchestrator::start(store, ErrorAggregator::new(), PanicOnceTransport::default());

        let first = orchestrator.dispatch(RequestIntent::get("bookings").dedupe(true));
        let completion = first.completion().await.unwrap();
        assert_eq!(completion.failure_kind(), Some(FailureKind::Transport));
        assert_eq!(
            orchestrator.status(first.request_id()),
            Some(RequestState::Failed)
        );
        assert_eq!(orchestrator.in_flight_count(), 0);

        let second = orchestrator.dispatch(RequestIntent::get("bookings").dedupe(true));
        assert!(!second.is_deduplicated());
        assert!(second.completion().await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_finished_statuses_are_bounded() {
        let (orchestrator, transport) = setup();
        transport.respond(Method::Get, "bookings", ApiResponse::data(json!([])));

        let mut handles = Vec::new();
        for _ in 0..RETAINED_FINISHED_REQUESTS + 10 {
            let handle = orchestrator.dispatch(RequestIntent::get("bookings"));
            handle.completion().await.unwrap();
            handles.push(handle);
        }

        assert_eq!(orchestrator.tracked_requests(), RETAINED_FINISHED_REQUESTS);
        assert_eq!(orchestrator.status(handles[0].request_id()), None);
        let last = handles.last().unwrap();
        assert_eq!(
            orchestrator.status(last.request_id()),
            Some(RequestState::Succeeded)
        );
    }

    #[tokio::test]
    async fn test_dedupe_joins_in_flight_request() {
        let (orchestrator, transport) = setup();
        transport.respond_once_after(
            Method::Get,
            "bookings",
            ApiResponse::data(json!([{"id": "b1"}])),
            std::time::Duration::from_millis(50),
        );
        let hooks = Arc::new(AtomicUsize::new(0));
        let first_hook = Arc::clone(&hooks);
        let second_hook = Arc::clone(&hooks);

        let first = orchestrator.dispatch(
            RequestIntent::get("bookings")
                .dedupe(true)
                .on_success(move |_, _| {
                    first_hook.fetch_add(1, Ordering::SeqCst);
                }),
        );
        let second = orchestrator.dispatch(
            RequestIntent::get("/bookings")
                .dedupe(true)
                .on_success(move |_, _| {
                    second_hook.fetch_add(1, Ordering::SeqCst);
                }),
        );

        assert!(second.is_deduplicated());
        assert_eq!(first.request_id(), second.request_id());

        let a = first.completion().await.unwrap();
        let b = second.completion().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(hooks.load(Ordering::SeqCst), 2);
        assert_eq!(orchestrator.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_drains_in_flight_requests() {
        let (orchestrator, transport) = setup();
        transport.respond_once_after(
            Method::Get,
            "bookings",
            ApiResponse::data(json!([{"id": "b1"}])),
            std::time::Duration::from_millis(20),
        );
        let store = orchestrator.store().clone();

        let handle = orchestrator.dispatch(RequestIntent::get("bookings"));
        orchestrator.shutdown().await.unwrap();

        assert!(handle.completion().await.unwrap().is_success());
        assert_eq!(store.snapshot().await.entities("bookings").len(), 1);
    }
}
