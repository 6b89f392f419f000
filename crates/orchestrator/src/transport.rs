//! Transport interface and an in-memory implementation for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::Method;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ErrorSet;
use crate::intent::route_path;

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Auth token looked up from the store, if the intent asked for one.
    pub token: Option<String>,
}

/// Body of a completed call: `{data}` on success, `{errors}` on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorSet>,
}

impl ApiResponse {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn errors(errors: ErrorSet) -> Self {
        Self {
            data: None,
            errors: Some(errors),
        }
    }

    /// Splits into payload or validation errors.
    ///
    /// A present `data` wins; a response carrying neither is a success with
    /// a `null` payload.
    pub fn into_result(self) -> Result<Value, ErrorSet> {
        match (self.data, self.errors) {
            (Some(data), _) => Ok(data),
            (None, Some(errors)) => Err(errors),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// The call itself failed: connection refused, unreadable body, ...
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes outgoing requests.
///
/// Implementations own every transport concern (timeouts, TLS, retries at
/// the socket level); the orchestrator only sees the final result.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<ApiResponse, TransportError>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Route {
    queued: VecDeque<Scripted>,
    fallback: Option<Scripted>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    routes: HashMap<(Method, String), Route>,
    requests: Vec<OutgoingRequest>,
}

/// Scripted transport for testing.
///
/// Responses are registered per method and path. One-shot responses are
/// consumed in order before the standing response is used; unknown routes
/// fail with a transport error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<InMemoryTransportState>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, method: Method, path: &str, update: impl FnOnce(&mut Route)) {
        let mut state = self.state.lock();
        let route = state
            .routes
            .entry((method, route_path(path).to_string()))
            .or_default();
        update(route);
    }

    /// Answers every call to the route with `response`.
    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) {
        self.route(method, path, |route| {
            route.fallback = Some(Scripted {
                result: Ok(response),
                delay: None,
            });
        });
    }

    /// Answers the next unanswered call to the route with `response`.
    pub fn respond_once(&self, method: Method, path: &str, response: ApiResponse) {
        self.respond_once_after(method, path, response, Duration::ZERO);
    }

    /// Like [`respond_once`](Self::respond_once), completing after `delay`.
    pub fn respond_once_after(
        &self,
        method: Method,
        path: &str,
        response: ApiResponse,
        delay: Duration,
    ) {
        self.route(method, path, |route| {
            route.queued.push_back(Scripted {
                result: Ok(response),
                delay: (!delay.is_zero()).then_some(delay),
            });
        });
    }

    /// Fails every call to the route with a transport error.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.route(method, path, |route| {
            route.fallback = Some(Scripted {
                result: Err(TransportError::new(message)),
                delay: None,
            });
        });
    }

    /// Fails the next unanswered call to the route.
    pub fn fail_once(&self, method: Method, path: &str, message: &str) {
        self.route(method, path, |route| {
            route.queued.push_back(Scripted {
                result: Err(TransportError::new(message)),
                delay: None,
            });
        });
    }

    /// Returns every request sent so far, in arrival order.
    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, TransportError> {
        let scripted = {
            let mut state = self.state.lock();
            let key = (request.method, route_path(&request.path).to_string());
            let scripted = state
                .routes
                .get_mut(&key)
                .and_then(|route| route.queued.pop_front().or_else(|| route.fallback.clone()));
            state.requests.push(request.clone());
            scripted
        };

        let Some(scripted) = scripted else {
            return Err(TransportError::new(format!(
                "no route for {} {}",
                request.method, request.path
            )));
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.result
    }
}
