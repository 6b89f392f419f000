//! Derived views used by the admin front end's read paths.

pub mod bookings;
pub mod occurrences;
pub mod venues;

use entity_store::Entity;

use crate::{CachedSelector, DerivedViewCache};

pub use bookings::{BookingQuery, active_bookings_for_offer};
pub use occurrences::{OccurrenceQuery, event_occurrences};
pub use venues::{VenueQuery, venues_for_offerer};

/// The concrete selectors, sharing one cache.
#[derive(Debug, Clone)]
pub struct Views {
    pub event_occurrences: CachedSelector<OccurrenceQuery, Vec<Entity>>,
    pub venues_for_offerer: CachedSelector<VenueQuery, Vec<Entity>>,
    pub active_bookings_for_offer: CachedSelector<BookingQuery, Vec<Entity>>,
    cache: DerivedViewCache,
}

impl Views {
    pub fn new(cache: DerivedViewCache) -> Self {
        Self {
            event_occurrences: occurrences::selector().with_cache(cache.clone(), "eventOccurrences"),
            venues_for_offerer: venues::selector().with_cache(cache.clone(), "venuesForOfferer"),
            active_bookings_for_offer: bookings::selector()
                .with_cache(cache.clone(), "activeBookingsForOffer"),
            cache,
        }
    }

    pub fn cache(&self) -> &DerivedViewCache {
        &self.cache
    }
}

impl Default for Views {
    fn default() -> Self {
        Self::new(DerivedViewCache::new())
    }
}
