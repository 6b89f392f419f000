//! Normalizer error types.

use thiserror::Error;

/// Errors that can occur while normalizing a payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizerError {
    /// A value expected to be an entity is not a JSON object.
    #[error("Expected an entity object for collection {collection}, found {found}")]
    InvalidEntity {
        collection: String,
        found: &'static str,
    },

    /// The normalizer spec is malformed.
    #[error("Invalid normalizer spec: {0}")]
    InvalidSpec(String),
}

/// Result type for normalizer operations.
pub type Result<T> = std::result::Result<T, NormalizerError>;

pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
