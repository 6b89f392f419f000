//! Terminal outcome of a request intent.

use common::{Method, RequestId};
use serde_json::Value;

use crate::ErrorSet;

/// Why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The transport call itself failed; the error set holds one `global` message.
    Transport,

    /// The server rejected the request with field-keyed messages.
    Validation,

    /// The response arrived but could not be normalized or merged.
    Completion,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Validation => "validation",
            FailureKind::Completion => "completion",
        }
    }
}

/// What happened to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The payload was normalized and merged.
    ///
    /// `revision` is the store revision after the merge, or `None` when
    /// nothing was written (local intents, empty payloads).
    Success {
        payload: Value,
        revision: Option<u64>,
    },

    /// The error aggregator now holds `errors`.
    Fail { kind: FailureKind, errors: ErrorSet },
}

/// Completion event handed to hooks and returned from request handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    /// Collection the payload was normalized into.
    pub collection: String,
    pub outcome: Outcome,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Returns the raw payload of a successful request.
    pub fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success { payload, .. } => Some(payload),
            Outcome::Fail { .. } => None,
        }
    }

    /// Returns the error set of a failed request.
    pub fn errors(&self) -> Option<&ErrorSet> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Fail { errors, .. } => Some(errors),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Fail { kind, .. } => Some(*kind),
        }
    }
}
