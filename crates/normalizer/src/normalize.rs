use std::collections::HashMap;

use entity_store::{Batch, Entity, EntityId};
use serde_json::{Map, Value};

use crate::error::kind_of;
use crate::{NormalizerError, NormalizerSpec, Result};

/// Flat entities per collection, ordered by collection name.
pub type Normalized = Batch;

/// Flattens `payload` into per-collection entity sequences.
///
/// The payload shape decides where top-level entities go:
/// - an array holds entities of `root_collection`;
/// - an object with an `id` is a single entity of `root_collection`;
/// - an object without an `id` is an envelope keyed by collection name;
/// - `null` yields an empty batch.
///
/// A root array always names the root collection, even when empty. A null
/// or empty embedded field names nothing.
///
/// Fields named in `spec` are removed from their parent and their entities
/// appended to the rule's collection, recursively. Scalar foreign keys stay
/// where they are. Entities reaching the same collection twice are folded by
/// id, later fields winning.
pub fn normalize(
    payload: &Value,
    root_collection: &str,
    spec: &NormalizerSpec,
) -> Result<Normalized> {
    let mut collector = Collector::default();

    match payload {
        Value::Null => {}
        Value::Array(items) => collector.collect_many(root_collection, items, spec)?,
        Value::Object(fields) if fields.contains_key("id") => {
            collector.collect(root_collection, fields.clone(), spec)?
        }
        Value::Object(envelope) => {
            for (collection, value) in envelope {
                match value {
                    Value::Array(items) => collector.collect_many(collection, items, spec)?,
                    Value::Object(fields) => collector.collect(collection, fields.clone(), spec)?,
                    Value::Null => collector.touch(collection),
                    other => {
                        return Err(NormalizerError::InvalidEntity {
                            collection: collection.clone(),
                            found: kind_of(other),
                        });
                    }
                }
            }
        }
        other => {
            return Err(NormalizerError::InvalidEntity {
                collection: root_collection.to_string(),
                found: kind_of(other),
            });
        }
    }

    Ok(collector.finish())
}

#[derive(Default)]
struct Collector {
    collections: HashMap<String, Bucket>,
}

#[derive(Default)]
struct Bucket {
    entities: Vec<Entity>,
    positions: HashMap<EntityId, usize>,
}

impl Collector {
    fn touch(&mut self, collection: &str) {
        self.collections.entry(collection.to_string()).or_default();
    }

    fn collect_many(
        &mut self,
        collection: &str,
        items: &[Value],
        spec: &NormalizerSpec,
    ) -> Result<()> {
        self.touch(collection);
        for item in items {
            match item {
                Value::Object(fields) => self.collect(collection, fields.clone(), spec)?,
                other => {
                    return Err(NormalizerError::InvalidEntity {
                        collection: collection.to_string(),
                        found: kind_of(other),
                    });
                }
            }
        }
        Ok(())
    }

    fn collect(
        &mut self,
        collection: &str,
        fields: Map<String, Value>,
        spec: &NormalizerSpec,
    ) -> Result<()> {
        let mut entity = Entity::from(fields);

        let mut embedded = Vec::new();
        for (field, rule) in spec.rules() {
            let is_embedded = match entity.get(field) {
                Some(Value::Object(_)) | Some(Value::Null) => true,
                Some(Value::Array(items)) => items.iter().all(Value::is_object),
                _ => false,
            };
            if is_embedded && let Some(value) = entity.remove(field) {
                embedded.push((rule, value));
            }
        }

        self.push(collection, entity);

        let empty = NormalizerSpec::new();
        for (rule, value) in embedded {
            let nested = rule.nested.as_ref().unwrap_or(&empty);
            // A null or empty embed names no entities, so the rule's
            // collection is left out of the batch.
            match value {
                Value::Object(fields) => self.collect(&rule.collection, fields, nested)?,
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(fields) = item {
                            self.collect(&rule.collection, fields, nested)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn push(&mut self, collection: &str, entity: Entity) {
        let bucket = self.collections.entry(collection.to_string()).or_default();
        match entity.id() {
            Some(id) => match bucket.positions.get(&id) {
                Some(&at) => bucket.entities[at].patch(&entity),
                None => {
                    bucket.positions.insert(id, bucket.entities.len());
                    bucket.entities.push(entity);
                }
            },
            None => bucket.entities.push(entity),
        }
    }

    fn finish(self) -> Normalized {
        self.collections
            .into_iter()
            .map(|(collection, bucket)| (collection, bucket.entities))
            .collect()
    }
}
