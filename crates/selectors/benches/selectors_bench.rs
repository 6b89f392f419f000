use criterion::{Criterion, criterion_group, criterion_main};
use entity_store::{Entity, MergeStrategy, StoreConfig, StoreState};
use selectors::{OccurrenceQuery, Views, event_occurrences};
use serde_json::json;

fn occurrences(n: usize) -> Vec<Entity> {
    (0..n)
        .map(|i| {
            Entity::from_value(json!({
                "id": format!("e{i}"),
                "venueId": format!("v{}", i % 10),
                "eventId": format!("ev{}", i % 50),
                "beginningDatetime": format!("2018-07-{:02}T20:00:00Z", i % 28 + 1),
            }))
            .unwrap()
        })
        .collect()
}

fn populated_state(n: usize) -> StoreState {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let store = entity_store::EntityStore::new(StoreConfig::default());
        store
            .apply_merge("eventOccurrences", occurrences(n), MergeStrategy::ReplaceCollection)
            .await
            .unwrap();
        store.snapshot().await
    })
}

fn bench_uncached_10000(c: &mut Criterion) {
    let all = occurrences(10_000);
    let query = OccurrenceQuery::new().venue("v3");

    c.bench_function("views/occurrences_uncached_10000", |b| {
        b.iter(|| event_occurrences(&all, &query));
    });
}

fn bench_cached_10000(c: &mut Criterion) {
    let state = populated_state(10_000);
    let views = Views::default();
    let query = OccurrenceQuery::new().venue("v3");

    c.bench_function("views/occurrences_cached_10000", |b| {
        b.iter(|| views.event_occurrences.select(&state, &query));
    });
}

criterion_group!(benches, bench_uncached_10000, bench_cached_10000);
criterion_main!(benches);
