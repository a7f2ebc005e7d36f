//! Pure computation of a processed view: filter, score, sort.

use std::cmp::Ordering;

use reelrank_core::{PostRecord, ScoredPost, SortKey, ViewParams};

use crate::filter::CompiledFilter;
use crate::scoring::ScoringPass;

/// Builds the processed view of `posts` as of `now` (Unix seconds).
///
/// Every post in the result is scored against the same `now`. The sort is
/// stable, so posts that compare equal keep their insertion order in both
/// directions.
#[must_use]
pub fn build_view(posts: &[PostRecord], params: &ViewParams, now: i64) -> Vec<ScoredPost> {
    let pass = ScoringPass::new(params.half_life_days, now);
    let filter = CompiledFilter::new(&params.filter);

    let mut view: Vec<ScoredPost> = posts
        .iter()
        .filter(|post| filter.matches(post))
        .map(|post| pass.apply(post.clone()))
        .collect();

    view.sort_by(|a, b| {
        let ordering = compare(a, b, params.sort_by);
        if params.sort_ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    view
}

fn compare(a: &ScoredPost, b: &ScoredPost, key: SortKey) -> Ordering {
    match key {
        SortKey::Score => a.score.total_cmp(&b.score),
        SortKey::Views => a.post.views.cmp(&b.post.views),
        SortKey::Likes => a.post.likes.cmp(&b.post.likes),
        SortKey::Comments => a.post.comments.cmp(&b.post.comments),
        SortKey::Date => a.post.timestamp.cmp(&b.post.timestamp),
    }
}
