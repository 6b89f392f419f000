//! Active bookings of one offer, joined through stocks.

use std::collections::HashSet;

use entity_store::{Entity, EntityId};

use crate::{CachedSelector, collection, create_cached_selector};

/// Arguments of the active bookings view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingQuery {
    pub offer_id: EntityId,
}

impl BookingQuery {
    pub fn new(offer_id: impl Into<EntityId>) -> Self {
        Self {
            offer_id: offer_id.into(),
        }
    }
}

pub(crate) fn selector() -> CachedSelector<BookingQuery, Vec<Entity>> {
    create_cached_selector(
        vec![collection("bookings"), collection("stocks")],
        |inputs, query: &BookingQuery| active_bookings_for_offer(inputs[0], inputs[1], &query.offer_id),
        |query: &BookingQuery| query.offer_id.to_string(),
    )
}

/// Bookings that are not cancelled and whose stock belongs to `offer_id`.
///
/// Bookings keep their store order. A booking whose stock is not in the
/// store is left out.
pub fn active_bookings_for_offer(
    bookings: &[Entity],
    stocks: &[Entity],
    offer_id: &EntityId,
) -> Vec<Entity> {
    let offer_stocks: HashSet<EntityId> = stocks
        .iter()
        .filter(|s| s.foreign_key("offerId").as_ref() == Some(offer_id))
        .filter_map(Entity::id)
        .collect();

    bookings
        .iter()
        .filter(|b| !b.get_bool("isCancelled").unwrap_or(false))
        .filter(|b| {
            b.foreign_key("stockId")
                .is_some_and(|stock_id| offer_stocks.contains(&stock_id))
        })
        .cloned()
        .collect()
}
