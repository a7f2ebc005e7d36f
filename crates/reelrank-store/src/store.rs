//! The aggregation store: one record per post id, a memoized processed
//! view, and change observers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reelrank_core::{
    is_valid_half_life, MergeSummary, PostRecord, PostSink, ScoredPost, ViewParams,
};

use crate::error::StoreError;
use crate::merge::smart_merge;
use crate::view::build_view;

/// Handle returned by [`AggregationStore::subscribe`].
pub type SubscriptionId = u64;

/// Change notification delivered to observers after the store is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Merged(MergeSummary),
    Cleared,
}

type Observer = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Memo key for the processed view. `revision` moves on every mutation, so
/// a stale view can never match.
#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    revision: u64,
    record_count: usize,
    params: ViewParams,
}

#[derive(Debug)]
struct CachedView {
    key: ViewKey,
    posts: Arc<Vec<ScoredPost>>,
}

/// Records and the view derived from them share one lock so they are
/// always invalidated together.
#[derive(Debug, Default)]
struct Records {
    posts: Vec<PostRecord>,
    index: HashMap<String, usize>,
    revision: u64,
    view: Option<CachedView>,
}

impl Records {
    fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.view = None;
    }
}

/// Thread-safe collection of unique posts keyed by id.
///
/// Posts keep the order in which their id was first seen. Re-sightings are
/// reconciled with [`smart_merge`].
#[derive(Default)]
pub struct AggregationStore {
    records: Mutex<Records>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for AggregationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl AggregationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a batch and returns how many ids were added vs. updated.
    ///
    /// Every record whose id already exists counts as updated, even if the
    /// merge left it unchanged. Records with an empty id are ignored.
    /// Observers are notified after every lock is released, and only when
    /// the batch touched at least one record.
    pub fn merge(&self, batch: Vec<PostRecord>) -> MergeSummary {
        let batch_len = batch.len();
        let summary = {
            let mut guard = self.lock_records();
            let records = &mut *guard;
            let mut summary = MergeSummary::default();
            let mut mutated = false;

            for post in batch {
                if post.id.is_empty() {
                    continue;
                }
                match records.index.get(&post.id).copied() {
                    Some(slot) => {
                        let existing = &mut records.posts[slot];
                        let before = existing.clone();
                        smart_merge(existing, post);
                        mutated |= *existing != before;
                        summary.updated += 1;
                    }
                    None => {
                        records.index.insert(post.id.clone(), records.posts.len());
                        records.posts.push(post);
                        mutated = true;
                        summary.added += 1;
                    }
                }
            }

            if mutated {
                records.invalidate();
            }
            summary
        };

        tracing::debug!(
            batch = batch_len,
            added = summary.added,
            updated = summary.updated,
            "merged batch into store"
        );
        if summary.changed() {
            self.notify(&StoreEvent::Merged(summary));
        }
        summary
    }

    /// Snapshot of every record in first-seen order.
    #[must_use]
    pub fn get_all(&self) -> Vec<PostRecord> {
        self.lock_records().posts.clone()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<PostRecord> {
        let records = self.lock_records();
        records
            .index
            .get(id)
            .and_then(|&slot| records.posts.get(slot))
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every record and drops the memoized view.
    pub fn clear(&self) {
        let removed = {
            let mut records = self.lock_records();
            let removed = records.posts.len();
            records.posts.clear();
            records.index.clear();
            records.invalidate();
            removed
        };
        tracing::info!(removed, "store cleared");
        self.notify(&StoreEvent::Cleared);
    }

    /// Filtered, scored and sorted view of the store.
    ///
    /// Repeated calls with equal parameters and no intervening mutation
    /// return the same shared allocation without recomputing. Scores use the
    /// wall-clock time of the call that computed the view.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidHalfLife`] when the half-life is outside
    /// `1..=365` days, or [`StoreError::InvalidViewRange`] when `min_views`
    /// exceeds `max_views`.
    pub fn get_processed(&self, params: &ViewParams) -> Result<Arc<Vec<ScoredPost>>, StoreError> {
        self.processed_at(params, chrono::Utc::now().timestamp())
    }

    /// [`get_processed`](Self::get_processed) against an explicit `now`
    /// (Unix seconds) used when the view has to be recomputed.
    ///
    /// # Errors
    ///
    /// Same as [`get_processed`](Self::get_processed).
    pub fn processed_at(
        &self,
        params: &ViewParams,
        now: i64,
    ) -> Result<Arc<Vec<ScoredPost>>, StoreError> {
        validate(params)?;

        let mut records = self.lock_records();
        let key = ViewKey {
            revision: records.revision,
            record_count: records.posts.len(),
            params: params.clone(),
        };
        if let Some(cached) = records.view.as_ref().filter(|cached| cached.key == key) {
            return Ok(Arc::clone(&cached.posts));
        }

        let posts = Arc::new(build_view(&records.posts, params, now));
        tracing::debug!(
            records = records.posts.len(),
            visible = posts.len(),
            sort = %params.sort_by,
            "recomputed processed view"
        );
        records.view = Some(CachedView {
            key,
            posts: Arc::clone(&posts),
        });
        Ok(posts)
    }

    /// Registers a callback invoked after every effective merge and clear.
    ///
    /// Callbacks run on the mutating thread with no store lock held, so they
    /// may read, mutate, subscribe or unsubscribe. A subscription change made
    /// during a notification takes effect from the next event.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.lock_observers().push((id, Arc::new(observer)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    fn notify(&self, event: &StoreEvent) {
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(event);
        }
    }

    // A panic while holding either lock cannot leave the data structurally
    // invalid, so poisoned locks are recovered.
    fn lock_records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PostSink for AggregationStore {
    fn merge(&self, batch: Vec<PostRecord>) -> MergeSummary {
        AggregationStore::merge(self, batch)
    }
}

fn validate(params: &ViewParams) -> Result<(), StoreError> {
    if !is_valid_half_life(params.half_life_days) {
        return Err(StoreError::InvalidHalfLife(params.half_life_days));
    }
    if let (Some(min), Some(max)) = (params.filter.min_views, params.filter.max_views) {
        if min > max {
            return Err(StoreError::InvalidViewRange { min, max });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
