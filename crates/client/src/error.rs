//! Client error types.

use normalizer::NormalizerError;
use orchestrator::OrchestratorError;
use thiserror::Error;

/// Errors from setting up and driving a session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Normalizer(#[from] NormalizerError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// The metrics recorder could not be installed.
    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
