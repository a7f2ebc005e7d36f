//! Predicate form of [`FilterSpec`], prepared once per view computation.

use chrono::NaiveDate;
use reelrank_core::{FilterSpec, PostRecord, TypeFilter};

/// A [`FilterSpec`] with dates resolved to Unix-second bounds and the
/// caption needle lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    media: TypeFilter,
    min_views: Option<u64>,
    max_views: Option<u64>,
    from_secs: Option<i64>,
    /// Exclusive: midnight UTC after the last included day.
    until_secs: Option<i64>,
    needle: Option<String>,
}

impl CompiledFilter {
    #[must_use]
    pub fn new(spec: &FilterSpec) -> Self {
        Self {
            media: spec.media,
            min_views: spec.min_views,
            max_views: spec.max_views,
            from_secs: spec.date_from.and_then(midnight_utc),
            until_secs: spec
                .date_to
                .and_then(|day| day.succ_opt())
                .and_then(midnight_utc),
            needle: spec
                .caption_contains
                .as_deref()
                .filter(|needle| !needle.is_empty())
                .map(str::to_lowercase),
        }
    }

    #[must_use]
    pub fn matches(&self, post: &PostRecord) -> bool {
        let media_ok = match self.media {
            TypeFilter::All => true,
            TypeFilter::VideoOnly => post.is_video,
            TypeFilter::PhotoOnly => !post.is_video,
        };
        media_ok
            && self.min_views.is_none_or(|min| post.views >= min)
            && self.max_views.is_none_or(|max| post.views <= max)
            && self.from_secs.is_none_or(|from| post.timestamp >= from)
            && self.until_secs.is_none_or(|until| post.timestamp < until)
            && self
                .needle
                .as_deref()
                .is_none_or(|needle| post.caption.to_lowercase().contains(needle))
    }
}

fn midnight_utc(day: NaiveDate) -> Option<i64> {
    day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp())
}
