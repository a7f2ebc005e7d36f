//! Parameters for the store's processed view.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;
pub const MIN_HALF_LIFE_DAYS: f64 = 1.0;
pub const MAX_HALF_LIFE_DAYS: f64 = 365.0;

/// Returns `true` if `days` is a finite half-life within `1..=365`.
#[must_use]
pub fn is_valid_half_life(days: f64) -> bool {
    days.is_finite() && (MIN_HALF_LIFE_DAYS..=MAX_HALF_LIFE_DAYS).contains(&days)
}

/// Field the processed view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Score,
    Views,
    Likes,
    Comments,
    Date,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Score => write!(f, "score"),
            SortKey::Views => write!(f, "views"),
            SortKey::Likes => write!(f, "likes"),
            SortKey::Comments => write!(f, "comments"),
            SortKey::Date => write!(f, "date"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(SortKey::Score),
            "views" => Ok(SortKey::Views),
            "likes" => Ok(SortKey::Likes),
            "comments" => Ok(SortKey::Comments),
            "date" | "timestamp" => Ok(SortKey::Date),
            other => Err(format!(
                "unknown sort key \"{other}\" (expected score, views, likes, comments or date)"
            )),
        }
    }
}

/// Media-type restriction applied by [`FilterSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeFilter {
    #[default]
    All,
    VideoOnly,
    PhotoOnly,
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "video" | "videos" | "video-only" | "reels" => Ok(TypeFilter::VideoOnly),
            "photo" | "photos" | "photo-only" => Ok(TypeFilter::PhotoOnly),
            other => Err(format!(
                "unknown media type \"{other}\" (expected all, video or photo)"
            )),
        }
    }
}

/// Filters applied before sorting. `None` bounds are open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(rename = "type")]
    pub media: TypeFilter,
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
    /// First UTC day included.
    pub date_from: Option<NaiveDate>,
    /// Last UTC day included.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive caption substring. Empty matches everything.
    pub caption_contains: Option<String>,
}

/// Everything that shapes one processed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    pub half_life_days: f64,
    pub sort_by: SortKey,
    pub sort_ascending: bool,
    pub filter: FilterSpec,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            sort_by: SortKey::Score,
            sort_ascending: false,
            filter: FilterSpec::default(),
        }
    }
}
