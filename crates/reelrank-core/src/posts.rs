use serde::{Deserialize, Serialize};

/// Prefix for canonical post links; the post id and a trailing slash follow.
pub const CANONICAL_URL_BASE: &str = "https://www.instagram.com/reel/";

/// Media category of a post as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Short-form vertical video (`product_type == "clips"`).
    Reel,
    /// Any other video media.
    Video,
    Photo,
}

impl MediaKind {
    #[must_use]
    pub fn is_video(self) -> bool {
        !matches!(self, MediaKind::Photo)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Reel => write!(f, "reel"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Photo => write!(f, "photo"),
        }
    }
}

/// Canonical, deduplicated representation of one collected post.
///
/// Counters use `0` for "unknown". That is indistinguishable from a confirmed
/// zero, which the store's merge policy accounts for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Platform shortcode, e.g. `"C9xYz12AbCd"`. Immutable once assigned.
    pub id: String,
    /// Creation time in Unix seconds.
    pub timestamp: i64,
    /// `true` when no source field carried a timestamp and `timestamp` is the
    /// extraction time. Only usable for rough ordering.
    #[serde(default)]
    pub timestamp_estimated: bool,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub caption: String,
    /// Lowercase owner handle, empty when unknown.
    pub owner: String,
    pub thumbnail: String,
    pub is_video: bool,
    pub media_kind: MediaKind,
    /// `(likes + comments) / views`, or `0.0` without views.
    pub engagement_rate: f64,
    pub canonical_url: String,
}

impl PostRecord {
    /// Creates a photo record with zeroed counters and empty text fields.
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        let id = id.into();
        let canonical_url = canonical_url_for(&id);
        Self {
            id,
            timestamp,
            timestamp_estimated: false,
            views: 0,
            likes: 0,
            comments: 0,
            caption: String::new(),
            owner: String::new(),
            thumbnail: String::new(),
            is_video: false,
            media_kind: MediaKind::Photo,
            engagement_rate: 0.0,
            canonical_url,
        }
    }

    #[must_use]
    pub fn with_counts(mut self, views: u64, likes: u64, comments: u64) -> Self {
        self.views = views;
        self.likes = likes;
        self.comments = comments;
        self.refresh_derived();
        self
    }

    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = owner.to_lowercase();
        self
    }

    #[must_use]
    pub fn with_media_kind(mut self, kind: MediaKind) -> Self {
        self.media_kind = kind;
        self.is_video = kind.is_video();
        self
    }

    /// Recomputes `engagement_rate` and `canonical_url` from the current fields.
    pub fn refresh_derived(&mut self) {
        self.engagement_rate = engagement_rate(self.views, self.likes, self.comments);
        self.canonical_url = canonical_url_for(&self.id);
    }
}

/// `(likes + comments) / views`, guarded against zero views.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    likes.saturating_add(comments) as f64 / views as f64
}

#[must_use]
pub fn canonical_url_for(id: &str) -> String {
    format!("{CANONICAL_URL_BASE}{id}/")
}

/// A [`PostRecord`] with its decayed score for one processed-view computation.
///
/// The score is never stored on the record itself; it depends on wall-clock
/// time and the half-life in effect when the view was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    #[serde(flatten)]
    pub post: PostRecord,
    pub score: f64,
}

impl ScoredPost {
    /// Score used for ranking terms: the decayed score, or raw views when the
    /// post could not be scored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weight(&self) -> f64 {
        if self.score > 0.0 {
            self.score
        } else {
            self.post.views as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_canonical_url_from_id() {
        let post = PostRecord::new("C9xYz12AbCd", 1_700_000_000);
        assert_eq!(
            post.canonical_url,
            "https://www.instagram.com/reel/C9xYz12AbCd/"
        );
        assert_eq!(post.media_kind, MediaKind::Photo);
        assert!(!post.is_video);
    }

    #[test]
    fn engagement_rate_is_zero_without_views() {
        assert_eq!(engagement_rate(0, 10, 5), 0.0);
    }

    #[test]
    fn engagement_rate_divides_interactions_by_views() {
        let post = PostRecord::new("abc", 1).with_counts(1_000, 40, 10);
        assert!((post.engagement_rate - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn with_owner_lowercases_handle() {
        let post = PostRecord::new("abc", 1).with_owner("SomeCreator");
        assert_eq!(post.owner, "somecreator");
    }

    #[test]
    fn reel_and_video_kinds_are_video() {
        assert!(MediaKind::Reel.is_video());
        assert!(MediaKind::Video.is_video());
        assert!(!MediaKind::Photo.is_video());
    }

    #[test]
    fn weight_falls_back_to_views_when_unscored() {
        let scored = ScoredPost {
            post: PostRecord::new("abc", 1).with_counts(700, 0, 0),
            score: 0.0,
        };
        assert!((scored.weight() - 700.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_with_camel_case_names_and_flattened_score() {
        let scored = ScoredPost {
            post: PostRecord::new("abc", 1_700_000_000)
                .with_counts(100, 5, 5)
                .with_media_kind(MediaKind::Reel),
            score: 42.0,
        };
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["isVideo"], true);
        assert_eq!(value["mediaKind"], "reel");
        assert_eq!(value["canonicalUrl"], "https://www.instagram.com/reel/abc/");
        assert_eq!(value["score"], 42.0);
    }
}
