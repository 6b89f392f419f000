//! Orchestrator error types.

use thiserror::Error;

/// Errors surfaced by the orchestrator itself.
///
/// Request failures are not errors here: they complete with
/// [`Outcome::Fail`](crate::Outcome::Fail).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// The writer stopped before the request completed.
    #[error("Orchestrator closed before the request completed")]
    Closed,

    /// The writer task terminated abnormally.
    #[error("Completion writer failed: {0}")]
    Writer(String),
}

/// Convenience type alias for orchestrator results.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
