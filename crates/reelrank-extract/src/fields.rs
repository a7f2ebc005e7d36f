//! Field-name variants per logical attribute.
//!
//! Each API generation names the same attribute differently (GraphQL edges,
//! the v1 private API, the web feed). Every table lists its variants in
//! priority order and the first one present wins.

use serde_json::{Map, Value};

/// Path from a node to a nested value. Digit segments index into arrays.
pub(crate) type FieldPath = &'static [&'static str];

pub(crate) const SHORTCODE: &str = "shortcode";
pub(crate) const CODE: &str = "code";
pub(crate) const IS_VIDEO: &str = "is_video";
pub(crate) const MEDIA_TYPE: &str = "media_type";
pub(crate) const PRODUCT_TYPE: &str = "product_type";

/// `media_type` value the v1 API uses for video.
pub(crate) const MEDIA_TYPE_VIDEO: u64 = 2;
/// `product_type` value for reels.
pub(crate) const PRODUCT_TYPE_REEL: &str = "clips";

pub(crate) const PRIMARY_KEY: &[FieldPath] = &[&["pk"], &["id"]];

pub(crate) const VIEW_COUNT: &[FieldPath] = &[
    &["video_view_count"],
    &["play_count"],
    &["video_play_count"],
    &["view_count"],
];

pub(crate) const LIKE_COUNT: &[FieldPath] = &[
    &["edge_media_preview_like", "count"],
    &["edge_liked_by", "count"],
    &["like_count"],
];

pub(crate) const COMMENT_COUNT: &[FieldPath] = &[
    &["edge_media_to_comment", "count"],
    &["edge_media_to_parent_comment", "count"],
    &["comment_count"],
];

pub(crate) const CAPTION_TEXT: &[FieldPath] = &[
    &["edge_media_to_caption", "edges", "0", "node", "text"],
    &["caption", "text"],
    &["caption"],
];

pub(crate) const OWNER_HANDLE: &[FieldPath] = &[&["owner", "username"], &["user", "username"]];

pub(crate) const THUMBNAIL_URL: &[FieldPath] = &[
    &["display_url"],
    &["thumbnail_url"],
    &["thumbnail_src"],
    &["image_versions2", "candidates", "0", "url"],
    &[
        "carousel_media",
        "0",
        "image_versions2",
        "candidates",
        "0",
        "url",
    ],
];

pub(crate) const CAPTURE_TIMESTAMP: FieldPath = &["taken_at_timestamp"];
pub(crate) const ALTERNATE_TIMESTAMP: FieldPath = &["taken_at"];
pub(crate) const DEVICE_TIMESTAMP: FieldPath = &["device_timestamp"];
pub(crate) const CREATION_TIMESTAMP: FieldPath = &["creation_time"];
pub(crate) const CAPTION_TIMESTAMP: &[FieldPath] =
    &[&["caption", "created_at"], &["caption", "created_at_utc"]];

/// Resolves `path` against `node`, returning `None` if any segment is missing.
pub(crate) fn lookup<'a>(node: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = node.get(*first)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns `true` if any variant resolves to a non-null value.
pub(crate) fn any_present(node: &Map<String, Value>, variants: &[FieldPath]) -> bool {
    variants
        .iter()
        .filter_map(|path| lookup(node, path))
        .any(|value| !value.is_null())
}

/// First variant holding a usable counter, even if that counter is zero.
pub(crate) fn first_count(node: &Map<String, Value>, variants: &[FieldPath]) -> Option<u64> {
    variants
        .iter()
        .filter_map(|path| lookup(node, path))
        .find_map(as_count)
}

/// First variant holding a non-blank string.
pub(crate) fn first_text<'a>(
    node: &'a Map<String, Value>,
    variants: &[FieldPath],
) -> Option<&'a str> {
    variants
        .iter()
        .filter_map(|path| lookup(node, path))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
}

/// Interprets a JSON value as a non-negative counter.
///
/// Accepts integers, non-negative floats (truncated) and digit strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
