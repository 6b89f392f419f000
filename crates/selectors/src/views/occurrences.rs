//! Event occurrences filtered by venue and event, latest first.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use entity_store::{Entity, EntityId};

use crate::{CachedSelector, collection, composite_key, create_cached_selector};

/// Arguments of the event occurrences view. `None` means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceQuery {
    pub venue_id: Option<EntityId>,
    pub event_id: Option<EntityId>,
}

impl OccurrenceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn venue(mut self, venue_id: impl Into<EntityId>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    pub fn event(mut self, event_id: impl Into<EntityId>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Cache key, `venue/event` with empty parts for missing filters.
    pub fn key(&self) -> String {
        composite_key(&[
            self.venue_id.as_ref().map(EntityId::as_str),
            self.event_id.as_ref().map(EntityId::as_str),
        ])
    }
}

pub(crate) fn selector() -> CachedSelector<OccurrenceQuery, Vec<Entity>> {
    create_cached_selector(
        vec![collection("eventOccurrences")],
        |inputs, query: &OccurrenceQuery| event_occurrences(inputs[0], query),
        OccurrenceQuery::key,
    )
}

fn beginning(occurrence: &Entity) -> Option<DateTime<FixedOffset>> {
    occurrence
        .get_str("beginningDatetime")
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
}

/// Filters occurrences by venue and event and sorts them by
/// `beginningDatetime`, latest first. Occurrences without a parsable date
/// come last, in their original order.
pub fn event_occurrences(occurrences: &[Entity], query: &OccurrenceQuery) -> Vec<Entity> {
    let mut dated: Vec<(Option<DateTime<FixedOffset>>, &Entity)> = occurrences
        .iter()
        .filter(|o| {
            query
                .venue_id
                .as_ref()
                .is_none_or(|venue_id| o.foreign_key("venueId").as_ref() == Some(venue_id))
        })
        .filter(|o| {
            query
                .event_id
                .as_ref()
                .is_none_or(|event_id| o.foreign_key("eventId").as_ref() == Some(event_id))
        })
        .map(|o| (beginning(o), o))
        .collect();

    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    dated.into_iter().map(|(_, o)| o.clone()).collect()
}
