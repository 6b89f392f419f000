//! Integration tests: Session → Orchestrator → store → derived views.

use std::sync::Arc;

use client::{Config, Session};
use common::Method;
use entity_store::{MergeStrategy, StoreConfig};
use normalizer::NormalizerSpec;
use orchestrator::{ApiResponse, InMemoryTransport, RequestIntent};
use selectors::{OccurrenceQuery, VenueQuery};
use serde_json::json;

/// Helper to start a session over the default collections with a user token.
async fn setup() -> (Session<InMemoryTransport>, InMemoryTransport) {
    let config = Config {
        token: Some("secret".to_string()),
        ..Config::default()
    };
    let transport = InMemoryTransport::new();
    let session = Session::start(&config, transport.clone()).await;
    (session, transport)
}

#[tokio::test]
async fn test_fetched_offerers_feed_venue_view() {
    let (session, transport) = setup().await;
    transport.respond(
        Method::Get,
        "offerers",
        ApiResponse::data(json!([{
            "id": "o1",
            "name": "Compagnie",
            "managedVenues": [
                {"id": "v1", "name": "Salle B", "managingOffererId": "o1"},
                {"id": "v2", "name": "Salle A", "managingOffererId": "o1"}
            ]
        }])),
    );

    session
        .dispatch(
            RequestIntent::get("offerers")
                .normalizer(NormalizerSpec::new().field("managedVenues", "venues"))
                .token_type("user"),
        )
        .completion()
        .await
        .unwrap();

    let state = session.state().await;
    let venues = session
        .views()
        .venues_for_offerer
        .select(&state, &VenueQuery::new("o1"));
    let names: Vec<_> = venues.iter().filter_map(|v| v.get_str("name")).collect();
    assert_eq!(names, vec!["Salle A", "Salle B"]);
    assert_eq!(transport.requests()[0].token.as_deref(), Some("secret"));
}

#[tokio::test]
async fn test_view_recomputes_only_after_relevant_completion() {
    let (session, transport) = setup().await;
    transport.respond_once(
        Method::Get,
        "eventOccurrences",
        ApiResponse::data(json!([
            {"id": "e1", "venueId": "v1", "beginningDatetime": "2018-07-01T20:00:00Z"}
        ])),
    );
    transport.respond_once(
        Method::Get,
        "eventOccurrences",
        ApiResponse::data(json!([
            {"id": "e2", "venueId": "v1", "beginningDatetime": "2018-07-05T20:00:00Z"}
        ])),
    );
    transport.respond(Method::Get, "bookings", ApiResponse::data(json!([])));
    let view = &session.views().event_occurrences;
    let query = OccurrenceQuery::new().venue("v1");

    session
        .dispatch(RequestIntent::get("eventOccurrences"))
        .completion()
        .await
        .unwrap();
    let first = view.select(&session.state().await, &query);

    session
        .dispatch(RequestIntent::get("bookings"))
        .completion()
        .await
        .unwrap();
    let unchanged = view.select(&session.state().await, &query);
    assert!(Arc::ptr_eq(&first, &unchanged));
    assert_eq!(view.recomputations(), 1);

    session
        .dispatch(RequestIntent::get("eventOccurrences").merge(MergeStrategy::MergeById))
        .completion()
        .await
        .unwrap();
    let merged = view.select(&session.state().await, &query);
    let ids: Vec<_> = merged.iter().filter_map(|o| o.get_str("id")).collect();
    assert_eq!(ids, vec!["e2", "e1"]);
    assert_eq!(view.recomputations(), 2);
}

#[tokio::test]
async fn test_shutdown_clears_session_state() {
    let config = Config {
        store: StoreConfig::new(["bookings"]),
        ..Config::default()
    };
    let transport = InMemoryTransport::new();
    transport.fail(Method::Get, "bookings", "offline");
    let session = Session::start(&config, transport).await;
    let store = session.store().clone();
    let errors = session.errors().clone();

    session
        .dispatch(RequestIntent::get("bookings"))
        .completion()
        .await
        .unwrap();
    assert!(!errors.errors().await.is_empty());

    session.shutdown().await.unwrap();
    assert!(errors.errors().await.is_empty());
    assert_eq!(store.snapshot().await.collection_names(), vec!["bookings"]);
}
