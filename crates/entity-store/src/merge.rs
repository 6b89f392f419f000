//! Merge strategies for combining incoming entities with a collection.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, EntityStoreError, Result};

/// How a completed fetch's entities are combined into their collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// The collection becomes exactly the incoming sequence.
    #[default]
    ReplaceCollection,

    /// Existing entities with a matching id are shallow-overwritten,
    /// unknown ids are appended.
    MergeById,

    /// Incoming entities are patched onto existing ones at the same offset.
    ///
    /// Only meant for responses that carry no ids but line up positionally.
    MergeByPosition,
}

impl MergeStrategy {
    /// Returns the strategy name as used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::ReplaceCollection => "replace",
            MergeStrategy::MergeById => "by-id",
            MergeStrategy::MergeByPosition => "by-position",
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "replace" => Ok(MergeStrategy::ReplaceCollection),
            "by-id" => Ok(MergeStrategy::MergeById),
            "by-position" => Ok(MergeStrategy::MergeByPosition),
            other => Err(format!("unknown merge strategy: {other}")),
        }
    }
}

/// Computes the new contents of `collection` without touching the store.
///
/// The returned sequence has unique ids; on error nothing should be written.
pub fn merge_entities(
    collection: &str,
    existing: &[Entity],
    incoming: Vec<Entity>,
    strategy: MergeStrategy,
) -> Result<Vec<Entity>> {
    match strategy {
        MergeStrategy::ReplaceCollection => fold_by_id(collection, Vec::new(), incoming),
        MergeStrategy::MergeById => fold_by_id(collection, existing.to_vec(), incoming),
        MergeStrategy::MergeByPosition => patch_by_position(collection, existing, incoming),
    }
}

fn fold_by_id(collection: &str, base: Vec<Entity>, incoming: Vec<Entity>) -> Result<Vec<Entity>> {
    let mut index: HashMap<EntityId, usize> = base
        .iter()
        .enumerate()
        .filter_map(|(position, entity)| entity.id().map(|id| (id, position)))
        .collect();
    let mut merged = base;

    for (position, entity) in incoming.into_iter().enumerate() {
        let id = entity.id().ok_or_else(|| EntityStoreError::MissingId {
            collection: collection.to_string(),
            position,
        })?;

        match index.get(&id) {
            Some(&at) => merged[at].patch(&entity),
            None => {
                index.insert(id, merged.len());
                merged.push(entity);
            }
        }
    }

    Ok(merged)
}

fn patch_by_position(
    collection: &str,
    existing: &[Entity],
    incoming: Vec<Entity>,
) -> Result<Vec<Entity>> {
    let mut merged = existing.to_vec();

    for (position, entity) in incoming.into_iter().enumerate() {
        if let Some(target) = merged.get_mut(position) {
            target.patch(&entity);
        } else {
            if entity.id().is_none() {
                return Err(EntityStoreError::MissingId {
                    collection: collection.to_string(),
                    position,
                });
            }
            merged.push(entity);
        }
    }

    let mut seen = HashSet::new();
    for id in merged.iter().filter_map(Entity::id) {
        if !seen.insert(id.clone()) {
            return Err(EntityStoreError::DuplicateId {
                collection: collection.to_string(),
                id,
            });
        }
    }

    Ok(merged)
}
