//! Normalizer specs: which embedded fields go to which collection.

use serde::Deserialize;
use serde_json::Value;

use crate::error::kind_of;
use crate::{NormalizerError, Result};

/// Destination of one embedded field.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Collection receiving the embedded entities.
    pub collection: String,

    /// Spec applied to the embedded entities themselves.
    pub nested: Option<NormalizerSpec>,
}

/// Mapping from embedded field name to destination collection.
///
/// ```
/// use normalizer::NormalizerSpec;
///
/// let spec = NormalizerSpec::new()
///     .field("managingOfferer", "offerers")
///     .nested("stocks", "stocks", NormalizerSpec::new().field("offer", "offers"));
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct NormalizerSpec {
    rules: Vec<(String, Rule)>,
}

impl NormalizerSpec {
    /// Creates an empty spec; payloads pass through unflattened.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends entities embedded under `field` to `collection`.
    pub fn field(self, field: impl Into<String>, collection: impl Into<String>) -> Self {
        self.rule(
            field,
            Rule {
                collection: collection.into(),
                nested: None,
            },
        )
    }

    /// Like [`field`](Self::field), normalizing the embedded entities with `nested`.
    pub fn nested(
        self,
        field: impl Into<String>,
        collection: impl Into<String>,
        nested: NormalizerSpec,
    ) -> Self {
        self.rule(
            field,
            Rule {
                collection: collection.into(),
                nested: Some(nested),
            },
        )
    }

    fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        let field = field.into();
        self.rules.retain(|(existing, _)| *existing != field);
        self.rules.push((field, rule));
        self
    }

    /// Returns the rule for a field.
    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rule)| rule)
    }

    /// Iterates over `(field, rule)` pairs in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(field, rule)| (field.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses the JSON form used by the front end.
    ///
    /// Each value is either a collection name or
    /// `{"stateKey": <collection>, "normalizer": <spec>}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(NormalizerError::InvalidSpec(format!(
                "expected an object, found {}",
                kind_of(value)
            )));
        };

        let mut spec = NormalizerSpec::new();
        for (field, rule) in fields {
            spec = match rule {
                Value::String(collection) => spec.field(field.as_str(), collection.as_str()),
                Value::Object(config) => {
                    let collection = config
                        .get("stateKey")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            NormalizerError::InvalidSpec(format!(
                                "field {field} is missing a stateKey"
                            ))
                        })?;
                    match config.get("normalizer") {
                        Some(nested) => {
                            spec.nested(field.as_str(), collection, Self::from_value(nested)?)
                        }
                        None => spec.field(field.as_str(), collection),
                    }
                }
                other => {
                    return Err(NormalizerError::InvalidSpec(format!(
                        "field {field} maps to a {}",
                        kind_of(other)
                    )));
                }
            };
        }
        Ok(spec)
    }
}

impl TryFrom<Value> for NormalizerSpec {
    type Error = NormalizerError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}
