use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EntityId;

/// An open record belonging to one collection.
///
/// Only the `id` field has meaning to the store; every other field is
/// collection-specific. Foreign keys are scalar id fields such as `venueId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Creates an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity holding only the given id.
    pub fn with_id(id: impl Into<EntityId>) -> Self {
        let mut entity = Self::new();
        entity.set("id", Value::String(id.into().as_str().to_string()));
        entity
    }

    /// Wraps a JSON value, returning `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Returns the entity id, if present and scalar.
    pub fn id(&self) -> Option<EntityId> {
        self.foreign_key("id")
    }

    /// Reads a scalar id-like field (`id`, `venueId`, ...).
    pub fn foreign_key(&self, field: &str) -> Option<EntityId> {
        match self.0.get(field)? {
            Value::String(s) => Some(EntityId::new(s.as_str())),
            Value::Number(n) => Some(EntityId::new(n.to_string())),
            _ => None,
        }
    }

    /// Returns a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field as a string slice.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns a field as a boolean.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Shallow-overwrites this entity with every field of `other`.
    ///
    /// Fields absent from `other` survive untouched.
    pub fn patch(&mut self, other: &Entity) {
        for (field, value) in &other.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Returns the underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Iterates over field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Converts the entity back into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
