use serde::Serialize;

use crate::posts::PostRecord;

/// Outcome of merging one batch into a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

impl MergeSummary {
    /// Returns `true` if the batch touched at least one record.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }

    pub fn absorb(&mut self, other: MergeSummary) {
        self.added += other.added;
        self.updated += other.updated;
    }
}

/// Destination for batches of normalized posts.
///
/// Implementations must tolerate being called repeatedly and concurrently.
pub trait PostSink {
    fn merge(&self, batch: Vec<PostRecord>) -> MergeSummary;
}

impl<T: PostSink + ?Sized> PostSink for std::sync::Arc<T> {
    fn merge(&self, batch: Vec<PostRecord>) -> MergeSummary {
        (**self).merge(batch)
    }
}
