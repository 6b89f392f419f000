//! Integration tests: EntityStore merges → Views → cached results.

use std::sync::Arc;

use entity_store::{Entity, EntityStore, MergeStrategy, StoreConfig};
use selectors::{BookingQuery, OccurrenceQuery, VenueQuery, Views};
use serde_json::{Value, json};

fn entities(values: Vec<Value>) -> Vec<Entity> {
    values.into_iter().filter_map(Entity::from_value).collect()
}

/// Helper to set up a store with occurrences, venues, stocks and bookings.
async fn setup() -> (EntityStore, Views) {
    let store = EntityStore::new(StoreConfig::default());
    let fixtures = [
        (
            "eventOccurrences",
            vec![
                json!({"id": "e1", "venueId": "v1", "eventId": "ev1", "beginningDatetime": "2018-07-01T20:00:00Z"}),
                json!({"id": "e2", "venueId": "v1", "eventId": "ev1", "beginningDatetime": "2018-07-04T20:00:00Z"}),
                json!({"id": "e3", "venueId": "v2", "eventId": "ev2", "beginningDatetime": "2018-07-02T20:00:00Z"}),
            ],
        ),
        (
            "venues",
            vec![
                json!({"id": "v1", "name": "Zénith", "managingOffererId": "o1"}),
                json!({"id": "v2", "name": "Arena", "managingOffererId": "o1"}),
            ],
        ),
        (
            "stocks",
            vec![
                json!({"id": "s1", "offerId": "of1"}),
                json!({"id": "s2", "offerId": "of2"}),
            ],
        ),
        (
            "bookings",
            vec![
                json!({"id": "b1", "stockId": "s1", "isCancelled": false}),
                json!({"id": "b2", "stockId": "s2", "isCancelled": false}),
            ],
        ),
    ];
    for (collection, values) in fixtures {
        store
            .apply_merge(collection, entities(values), MergeStrategy::ReplaceCollection)
            .await
            .unwrap();
    }
    (store, Views::default())
}

#[tokio::test]
async fn test_identical_arguments_compute_exactly_once() {
    let (store, views) = setup().await;
    let state = store.snapshot().await;
    let query = OccurrenceQuery::new().venue("v1").event("ev1");

    let first = views.event_occurrences.select(&state, &query);
    let second = views.event_occurrences.select(&state, &query);
    let again = views
        .event_occurrences
        .select(&store.snapshot().await, &query.clone());

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(views.event_occurrences.recomputations(), 1);
    let ids: Vec<_> = first.iter().filter_map(Entity::id).map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["e2", "e1"]);
}

#[tokio::test]
async fn test_merge_into_dependency_recomputes() {
    let (store, views) = setup().await;
    let query = OccurrenceQuery::new().venue("v1");
    let before = views
        .event_occurrences
        .select(&store.snapshot().await, &query);

    store
        .apply_merge(
            "eventOccurrences",
            entities(vec![json!({"id": "e4", "venueId": "v1", "beginningDatetime": "2018-08-01T20:00:00Z"})]),
            MergeStrategy::MergeById,
        )
        .await
        .unwrap();
    let after = views
        .event_occurrences
        .select(&store.snapshot().await, &query);

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.len(), 2);
    assert_eq!(after.len(), 3);
    assert_eq!(after[0].get_str("id"), Some("e4"));
    assert_eq!(views.event_occurrences.recomputations(), 2);
}

#[tokio::test]
async fn test_unrelated_merge_keeps_views_cached() {
    let (store, views) = setup().await;
    let venues = views
        .venues_for_offerer
        .select(&store.snapshot().await, &VenueQuery::new("o1"));

    store
        .apply_merge("bookings", Vec::new(), MergeStrategy::ReplaceCollection)
        .await
        .unwrap();
    let again = views
        .venues_for_offerer
        .select(&store.snapshot().await, &VenueQuery::new("o1"));

    assert!(Arc::ptr_eq(&venues, &again));
    assert_eq!(views.venues_for_offerer.recomputations(), 1);
    let names: Vec<_> = venues.iter().filter_map(|v| v.get_str("name")).collect();
    assert_eq!(names, vec!["Arena", "Zénith"]);
}

#[tokio::test]
async fn test_join_view_tracks_both_collections() {
    let (store, views) = setup().await;
    let query = BookingQuery::new("of1");

    let first = views
        .active_bookings_for_offer
        .select(&store.snapshot().await, &query);
    assert_eq!(first.len(), 1);

    store
        .apply_merge(
            "stocks",
            entities(vec![json!({"id": "s2", "offerId": "of1"})]),
            MergeStrategy::MergeById,
        )
        .await
        .unwrap();
    let second = views
        .active_bookings_for_offer
        .select(&store.snapshot().await, &query);

    assert_eq!(second.len(), 2);
    assert_eq!(views.active_bookings_for_offer.recomputations(), 2);
}

#[tokio::test]
async fn test_views_share_one_cache() {
    let (store, views) = setup().await;
    let state = store.snapshot().await;

    views.event_occurrences.select(&state, &OccurrenceQuery::new());
    views.event_occurrences.select(&state, &OccurrenceQuery::new().venue("v2"));
    views.venues_for_offerer.select(&state, &VenueQuery::new("o1"));
    views.active_bookings_for_offer.select(&state, &BookingQuery::new("of1"));

    assert_eq!(views.cache().len(), 4);
    assert_eq!(views.cache().invalidate("eventOccurrences"), 2);

    views.event_occurrences.select(&state, &OccurrenceQuery::new());
    assert_eq!(views.event_occurrences.recomputations(), 3);
}
