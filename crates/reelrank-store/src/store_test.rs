use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reelrank_core::{FilterSpec, MediaKind, MergeSummary, PostRecord, PostSink, SortKey, ViewParams};

use super::{AggregationStore, StoreEvent};
use crate::error::StoreError;

const NOW: i64 = 1_760_000_000;
const DAY: i64 = 86_400;

fn post(id: &str, views: u64, age_days: i64) -> PostRecord {
    PostRecord::new(id, NOW - age_days * DAY).with_counts(views, views / 20, views / 200)
}

fn ids(posts: &[reelrank_core::ScoredPost]) -> Vec<String> {
    posts.iter().map(|scored| scored.post.id.clone()).collect()
}

#[test]
fn merge_counts_added_and_updated() {
    let store = AggregationStore::new();

    let first = store.merge(vec![post("a", 100, 1), post("b", 200, 2)]);
    assert_eq!(first, MergeSummary { added: 2, updated: 0 });

    let second = store.merge(vec![post("b", 250, 2), post("c", 300, 3)]);
    assert_eq!(second, MergeSummary { added: 1, updated: 1 });

    assert_eq!(store.len(), 3);
    assert_eq!(store.get("b").map(|p| p.views), Some(250));
}

#[test]
fn records_keep_first_seen_order() {
    let store = AggregationStore::new();
    store.merge(vec![post("z", 1, 1), post("a", 2, 1)]);
    store.merge(vec![post("m", 3, 1), post("z", 4, 1)]);

    let order: Vec<String> = store.get_all().into_iter().map(|p| p.id).collect();
    assert_eq!(order, ["z", "a", "m"]);
}

#[test]
fn merge_reconciles_partial_fragments() {
    let store = AggregationStore::new();
    store.merge(vec![PostRecord::new("abc", NOW - DAY)
        .with_counts(5_000, 0, 0)
        .with_caption("first light")]);
    store.merge(vec![PostRecord::new("abc", NOW - DAY).with_counts(0, 400, 25)]);

    let merged = store.get("abc").expect("record should exist");
    assert_eq!((merged.views, merged.likes, merged.comments), (5_000, 400, 25));
    assert_eq!(merged.caption, "first light");
    assert!((merged.engagement_rate - 0.085).abs() < 1e-12);
}

#[test]
fn empty_ids_are_ignored() {
    let store = AggregationStore::new();
    let summary = store.merge(vec![PostRecord::new("", NOW)]);
    assert_eq!(summary, MergeSummary::default());
    assert!(store.is_empty());
}

#[test]
fn clear_removes_everything() {
    let store = AggregationStore::new();
    store.merge(vec![post("a", 1, 1)]);
    store.clear();

    assert!(store.is_empty());
    assert!(store.get("a").is_none());
    assert!(store.get_all().is_empty());
}

#[test]
fn processed_view_is_memoized_until_mutation() {
    let store = AggregationStore::new();
    store.merge(vec![post("a", 1_000, 1), post("b", 5_000, 40)]);
    let params = ViewParams::default();

    let first = store.processed_at(&params, NOW).expect("valid params");
    let second = store.processed_at(&params, NOW + 10 * DAY).expect("valid params");
    assert!(Arc::ptr_eq(&first, &second));

    store.merge(vec![post("c", 10, 1)]);
    let third = store.processed_at(&params, NOW).expect("valid params");
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.len(), 3);
}

#[test]
fn different_params_recompute_the_view() {
    let store = AggregationStore::new();
    store.merge(vec![post("a", 1_000, 1), post("b", 5_000, 40)]);

    let by_score = store.processed_at(&ViewParams::default(), NOW).expect("valid");
    let by_views = store
        .processed_at(
            &ViewParams {
                sort_by: SortKey::Views,
                ..ViewParams::default()
            },
            NOW,
        )
        .expect("valid");

    assert!(!Arc::ptr_eq(&by_score, &by_views));
    assert_eq!(ids(&by_views), ["b", "a"]);
}

#[test]
fn unchanged_remerge_keeps_the_cached_view() {
    let store = AggregationStore::new();
    let batch = vec![post("a", 1_000, 1)];
    store.merge(batch.clone());
    let params = ViewParams::default();

    let before = store.processed_at(&params, NOW).expect("valid");
    let summary = store.merge(batch);
    let after = store.processed_at(&params, NOW).expect("valid");

    assert_eq!(summary, MergeSummary { added: 0, updated: 1 });
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn clear_invalidates_the_cached_view() {
    let store = AggregationStore::new();
    store.merge(vec![post("a", 1_000, 1)]);
    let params = ViewParams::default();
    assert_eq!(store.processed_at(&params, NOW).expect("valid").len(), 1);

    store.clear();
    assert!(store.processed_at(&params, NOW).expect("valid").is_empty());
}

#[test]
fn invalid_half_life_is_rejected() {
    let store = AggregationStore::new();
    for half_life in [0.0, 0.5, 366.0, f64::NAN] {
        let params = ViewParams {
            half_life_days: half_life,
            ..ViewParams::default()
        };
        let err = store.get_processed(&params).unwrap_err();
        assert!(matches!(err, StoreError::InvalidHalfLife(_)), "{half_life}: {err:?}");
    }
}

#[test]
fn inverted_view_range_is_rejected() {
    let store = AggregationStore::new();
    let params = ViewParams {
        filter: FilterSpec {
            min_views: Some(500),
            max_views: Some(100),
            ..FilterSpec::default()
        },
        ..ViewParams::default()
    };
    assert_eq!(
        store.get_processed(&params).unwrap_err(),
        StoreError::InvalidViewRange { min: 500, max: 100 }
    );
}

#[test]
fn observers_see_merges_and_clears() {
    let store = AggregationStore::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |event| sink.lock().unwrap().push(*event));

    store.merge(vec![post("a", 1, 1)]);
    store.merge(Vec::new());
    store.clear();

    let seen = events.lock().unwrap().clone();
    assert_eq!(
        seen,
        [
            StoreEvent::Merged(MergeSummary { added: 1, updated: 0 }),
            StoreEvent::Cleared,
        ]
    );
}

#[test]
fn observers_can_read_the_store() {
    let store = Arc::new(AggregationStore::new());
    let observed_len = Arc::new(AtomicUsize::new(0));
    let reader = Arc::clone(&store);
    let slot = Arc::clone(&observed_len);
    store.subscribe(move |_| slot.store(reader.len(), Ordering::SeqCst));

    store.merge(vec![post("a", 1, 1), post("b", 1, 1)]);

    assert_eq!(observed_len.load(Ordering::SeqCst), 2);
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = AggregationStore::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let id = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.merge(vec![post("a", 1, 1)]);
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.merge(vec![post("b", 1, 1)]);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn observers_can_mutate_the_store() {
    let store = Arc::new(AggregationStore::new());
    let writer = Arc::clone(&store);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |event| {
        sink.lock().unwrap().push(*event);
        if matches!(event, StoreEvent::Merged(_)) {
            writer.clear();
        }
    });

    store.merge(vec![post("a", 1, 1)]);

    assert!(store.is_empty());
    let seen = events.lock().unwrap().clone();
    assert_eq!(
        seen,
        [
            StoreEvent::Merged(MergeSummary { added: 1, updated: 0 }),
            StoreEvent::Cleared,
        ]
    );
}

#[test]
fn observers_can_subscribe_during_notification() {
    let store = Arc::new(AggregationStore::new());
    let registrar = Arc::clone(&store);
    let late_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&late_calls);
    store.subscribe(move |_| {
        let counter = Arc::clone(&counter);
        registrar.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    });

    store.merge(vec![post("a", 1, 1)]);
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);

    store.merge(vec![post("b", 1, 1)]);
    assert_eq!(late_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn sequential_merges_match_a_single_combined_merge() {
    let first = vec![post("a", 100, 1).with_caption("x"), post("b", 200, 2)];
    let second = vec![post("b", 250, 2).with_caption("y"), post("c", 300, 3)];

    let sequential = AggregationStore::new();
    sequential.merge(first.clone());
    sequential.merge(second.clone());

    let combined = AggregationStore::new();
    combined.merge([first, second.clone()].concat());

    assert_eq!(sequential.len(), combined.len());
    assert_eq!(sequential.get_all(), combined.get_all());

    let before = sequential.get_all();
    let summary = sequential.merge(second);
    assert_eq!(summary.added, 0);
    assert_eq!(sequential.get_all(), before);
}

#[test]
fn store_is_usable_as_a_shared_sink() {
    let store = Arc::new(AggregationStore::new());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let sink = Arc::clone(&store);
            std::thread::spawn(move || {
                let batch = (0..25)
                    .map(|n| post(&format!("w{worker}_{n}"), 10, 1))
                    .collect();
                PostSink::merge(&sink, batch)
            })
        })
        .collect();

    let added: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker panicked").added)
        .sum();
    assert_eq!(added, 100);
    assert_eq!(store.len(), 100);
}

#[test]
fn media_kind_updates_flow_into_filtered_views() {
    let store = AggregationStore::new();
    store.merge(vec![post("a", 1_000, 1)]);
    store.merge(vec![post("a", 1_000, 1).with_media_kind(MediaKind::Reel)]);

    let params = ViewParams {
        filter: FilterSpec {
            media: reelrank_core::TypeFilter::VideoOnly,
            ..FilterSpec::default()
        },
        ..ViewParams::default()
    };
    assert_eq!(ids(&store.processed_at(&params, NOW).expect("valid")), ["a"]);
}
