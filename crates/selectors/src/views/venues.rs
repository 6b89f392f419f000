//! Venues managed by one offerer.

use entity_store::{Entity, EntityId};

use crate::{CachedSelector, collection, create_cached_selector};

/// Arguments of the venues view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueQuery {
    pub offerer_id: EntityId,
}

impl VenueQuery {
    pub fn new(offerer_id: impl Into<EntityId>) -> Self {
        Self {
            offerer_id: offerer_id.into(),
        }
    }
}

pub(crate) fn selector() -> CachedSelector<VenueQuery, Vec<Entity>> {
    create_cached_selector(
        vec![collection("venues")],
        |inputs, query: &VenueQuery| venues_for_offerer(inputs[0], &query.offerer_id),
        |query: &VenueQuery| query.offerer_id.to_string(),
    )
}

/// Venues whose `managingOffererId` is `offerer_id`, sorted by name.
pub fn venues_for_offerer(venues: &[Entity], offerer_id: &EntityId) -> Vec<Entity> {
    let mut matching: Vec<&Entity> = venues
        .iter()
        .filter(|v| v.foreign_key("managingOffererId").as_ref() == Some(offerer_id))
        .collect();
    matching.sort_by(|a, b| a.get_str("name").unwrap_or("").cmp(b.get_str("name").unwrap_or("")));
    matching.into_iter().cloned().collect()
}
