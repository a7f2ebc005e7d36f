//! Field-wise reconciliation of two sightings of the same post.
//!
//! Different endpoints expose different subsets of a post's fields, so a
//! later fragment may lack counters or text an earlier one had. Incoming
//! values win unless they are weaker than what is already known:
//!
//! - a `0` counter never replaces a positive one,
//! - an empty string never replaces a non-empty one,
//! - an estimated timestamp never replaces an authoritative one.
//!
//! Booleans and the media kind always take the incoming value. Derived
//! fields are recomputed afterwards.

use reelrank_core::PostRecord;

/// Merges `incoming` into `existing` in place. Both must share an `id`.
pub fn smart_merge(existing: &mut PostRecord, incoming: PostRecord) {
    debug_assert_eq!(existing.id, incoming.id);

    let PostRecord {
        id: _,
        timestamp,
        timestamp_estimated,
        views,
        likes,
        comments,
        caption,
        owner,
        thumbnail,
        is_video,
        media_kind,
        engagement_rate: _,
        canonical_url: _,
    } = incoming;

    merge_timestamp(existing, timestamp, timestamp_estimated);
    keep_stronger_count(&mut existing.views, views);
    keep_stronger_count(&mut existing.likes, likes);
    keep_stronger_count(&mut existing.comments, comments);
    keep_stronger_text(&mut existing.caption, caption);
    keep_stronger_text(&mut existing.owner, owner);
    keep_stronger_text(&mut existing.thumbnail, thumbnail);
    existing.is_video = is_video;
    existing.media_kind = media_kind;

    existing.refresh_derived();
}

fn merge_timestamp(existing: &mut PostRecord, timestamp: i64, estimated: bool) {
    if estimated && !existing.timestamp_estimated && existing.timestamp > 0 {
        return;
    }
    if timestamp <= 0 && existing.timestamp > 0 {
        return;
    }
    existing.timestamp = timestamp;
    existing.timestamp_estimated = estimated;
}

fn keep_stronger_count(slot: &mut u64, incoming: u64) {
    if incoming == 0 && *slot > 0 {
        return;
    }
    *slot = incoming;
}

fn keep_stronger_text(slot: &mut String, incoming: String) {
    if incoming.is_empty() && !slot.is_empty() {
        return;
    }
    *slot = incoming;
}
