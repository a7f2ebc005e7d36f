//! Recognition and normalization of a single post node.

use reelrank_core::{MediaKind, PostRecord};
use serde_json::{Map, Value};

use crate::context::ExtractionContext;
use crate::fields::{
    any_present, first_count, first_text, COMMENT_COUNT, CODE, IS_VIDEO, LIKE_COUNT, MEDIA_TYPE,
    MEDIA_TYPE_VIDEO, PRIMARY_KEY, PRODUCT_TYPE, PRODUCT_TYPE_REEL, SHORTCODE, THUMBNAIL_URL,
    VIEW_COUNT,
};
use crate::timestamp::resolve_timestamp;

/// Result of inspecting one JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Post(Box<PostRecord>),
    NotAPost(Rejection),
}

/// Why an object was not treated as a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Neither `shortcode` nor a string `code` is present.
    MissingIdentifier,
    /// `code` is a number: a platform error code, not a shortcode.
    NumericCode,
    /// An identifier is present but no media field backs it up.
    Uncorroborated,
}

/// Decides whether `node` is a post and normalizes it if so.
///
/// `ctx` must already include the node's own caption and owner (see
/// [`ExtractionContext::descend`]). `now` stands in for the creation time
/// when no source field yields one.
#[must_use]
pub fn classify_node(
    node: &Map<String, Value>,
    ctx: ExtractionContext<'_>,
    now: i64,
) -> Classification {
    let Some(id) = identifier(node) else {
        return Classification::NotAPost(Rejection::MissingIdentifier);
    };
    if node.get(CODE).is_some_and(Value::is_number) {
        return Classification::NotAPost(Rejection::NumericCode);
    }
    if !is_corroborated(node) {
        return Classification::NotAPost(Rejection::Uncorroborated);
    }

    let resolved = resolve_timestamp(node, now);
    let media_kind = media_kind(node);

    let mut post = PostRecord::new(id, resolved.secs);
    post.timestamp_estimated = resolved.is_estimated();
    post.views = first_count(node, VIEW_COUNT).unwrap_or(0);
    post.likes = first_count(node, LIKE_COUNT).unwrap_or(0);
    post.comments = first_count(node, COMMENT_COUNT).unwrap_or(0);
    post.caption = ctx.caption.unwrap_or_default().trim().to_string();
    post.owner = ctx.owner.unwrap_or_default().trim().to_lowercase();
    post.thumbnail = first_text(node, THUMBNAIL_URL)
        .unwrap_or_default()
        .to_string();
    post.media_kind = media_kind;
    post.is_video = media_kind.is_video();
    post.refresh_derived();

    Classification::Post(Box::new(post))
}

/// `shortcode`, else `code`, as a non-blank string.
fn identifier(node: &Map<String, Value>) -> Option<&str> {
    [SHORTCODE, CODE]
        .iter()
        .filter_map(|key| node.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
}

/// An identifier alone is not enough: generic objects carry `code` too.
fn is_corroborated(node: &Map<String, Value>) -> bool {
    any_present(node, PRIMARY_KEY)
        || node.get(MEDIA_TYPE).is_some_and(|v| !v.is_null())
        || node.get(IS_VIDEO).is_some_and(|v| !v.is_null())
        || first_text(node, THUMBNAIL_URL).is_some()
}

fn media_kind(node: &Map<String, Value>) -> MediaKind {
    if node.get(PRODUCT_TYPE).and_then(Value::as_str) == Some(PRODUCT_TYPE_REEL) {
        return MediaKind::Reel;
    }
    let flagged_video = node.get(IS_VIDEO).and_then(Value::as_bool) == Some(true);
    let typed_video = node.get(MEDIA_TYPE).and_then(Value::as_u64) == Some(MEDIA_TYPE_VIDEO);
    if flagged_video || typed_video {
        MediaKind::Video
    } else {
        MediaKind::Photo
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
