//! Error aggregator: holds the error set of the latest failed request.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// Field name carrying errors that belong to no particular field.
pub const GLOBAL_ERROR_KEY: &str = "global";

/// Field-keyed error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, Vec<String>>);

impl ErrorSet {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding one `global` message.
    pub fn global(message: impl Into<String>) -> Self {
        Self::new().with(GLOBAL_ERROR_KEY, message)
    }

    /// Adds a message for a field.
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(field, message);
        self
    }

    /// Appends a message to a field's list.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns the messages for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the `global` messages.
    pub fn global_messages(&self) -> &[String] {
        self.get(GLOBAL_ERROR_KEY)
    }

    /// Iterates over field names with at least one message.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reads the error shapes servers send back.
    ///
    /// Accepts `{field: "msg"}`, `{field: ["m1", "m2"]}` and arrays of such
    /// objects. Anything else becomes a `global` message.
    pub fn from_value(value: &Value) -> Self {
        let mut set = Self::new();
        set.absorb(value);
        set
    }

    fn absorb(&mut self, value: &Value) {
        match value {
            Value::Null => {}
            Value::Object(fields) => {
                for (field, messages) in fields {
                    match messages {
                        Value::Array(items) => {
                            for item in items {
                                self.push(field.as_str(), message_text(item));
                            }
                        }
                        other => self.push(field.as_str(), message_text(other)),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.absorb(item);
                }
            }
            other => self.push(GLOBAL_ERROR_KEY, message_text(other)),
        }
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for ErrorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// Holds the most recent error set.
///
/// Every failed completion replaces the contents wholesale; there is no
/// per-field merge and no tracking of which request produced them.
#[derive(Debug, Clone, Default)]
pub struct ErrorAggregator {
    current: Arc<RwLock<ErrorSet>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current error set.
    pub async fn set_errors(&self, errors: ErrorSet) {
        *self.current.write().await = errors;
    }

    /// Returns a copy of the current error set.
    pub async fn errors(&self) -> ErrorSet {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) {
        self.current.write().await.0.clear();
    }
}
