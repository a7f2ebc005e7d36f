//! Time-decayed popularity score.
//!
//! `score = views * 2^(-age_days / half_life_days)`: a post's score halves
//! for every half-life of age, so recent posts can outrank older ones with
//! more raw views.

use reelrank_core::{PostRecord, ScoredPost};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Decayed score for one post as of `now` (Unix seconds).
///
/// Returns `0.0` without views, without a timestamp, or for a non-positive
/// half-life. Future timestamps (clock skew) score their raw views.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn decayed_score(views: u64, timestamp: i64, half_life_days: f64, now: i64) -> f64 {
    if views == 0 || timestamp == 0 || half_life_days.is_nan() || half_life_days <= 0.0 {
        return 0.0;
    }
    let views = views as f64;
    let age_days = now.saturating_sub(timestamp) as f64 / SECONDS_PER_DAY;
    if age_days < 0.0 {
        return views;
    }
    views * (-age_days / half_life_days).exp2()
}

/// One scoring pass: a fixed `now` shared by every post in the pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPass {
    half_life_days: f64,
    now: i64,
}

impl ScoringPass {
    #[must_use]
    pub fn new(half_life_days: f64, now: i64) -> Self {
        Self {
            half_life_days,
            now,
        }
    }

    /// A pass anchored at the current wall-clock time.
    #[must_use]
    pub fn starting_now(half_life_days: f64) -> Self {
        Self::new(half_life_days, chrono::Utc::now().timestamp())
    }

    #[must_use]
    pub fn now(&self) -> i64 {
        self.now
    }

    #[must_use]
    pub fn score(&self, post: &PostRecord) -> f64 {
        decayed_score(post.views, post.timestamp, self.half_life_days, self.now)
    }

    #[must_use]
    pub fn apply(&self, post: PostRecord) -> ScoredPost {
        let score = self.score(&post);
        ScoredPost { post, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000;
    const DAY: i64 = 86_400;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fresh_post_keeps_its_views() {
        approx(decayed_score(1_000, NOW, 30.0, NOW), 1_000.0);
    }

    #[test]
    fn one_half_life_halves_the_score() {
        approx(decayed_score(1_000, NOW - 30 * DAY, 30.0, NOW), 500.0);
    }

    #[test]
    fn ten_half_lives_is_nearly_zero() {
        let score = decayed_score(1_000, NOW - 300 * DAY, 30.0, NOW);
        assert!(score < 1.0, "expected ~0.98, got {score}");
        approx(score, 1_000.0 / 1_024.0);
    }

    #[test]
    fn zero_views_score_zero() {
        assert_eq!(decayed_score(0, NOW - DAY, 30.0, NOW), 0.0);
        assert_eq!(decayed_score(0, NOW, 1.0, NOW), 0.0);
    }

    #[test]
    fn missing_timestamp_scores_zero() {
        assert_eq!(decayed_score(1_000, 0, 30.0, NOW), 0.0);
    }

    #[test]
    fn future_timestamp_is_undecayed() {
        approx(decayed_score(1_000, NOW + 3 * DAY, 30.0, NOW), 1_000.0);
    }

    #[test]
    fn non_positive_half_life_scores_zero() {
        assert_eq!(decayed_score(1_000, NOW - DAY, 0.0, NOW), 0.0);
        assert_eq!(decayed_score(1_000, NOW - DAY, f64::NAN, NOW), 0.0);
    }

    #[test]
    fn shorter_half_life_favors_recent_posts() {
        let recent = decayed_score(10_000, NOW - 2 * DAY, 7.0, NOW);
        let older = decayed_score(40_000, NOW - 30 * DAY, 7.0, NOW);
        assert!(recent > older, "recent {recent} should beat older {older}");
    }

    #[test]
    fn pass_scores_posts_against_one_instant() {
        let pass = ScoringPass::new(30.0, NOW);
        let post = PostRecord::new("abc", NOW - 30 * DAY).with_counts(2_000, 0, 0);
        let scored = pass.apply(post);
        approx(scored.score, 1_000.0);
        assert_eq!(pass.now(), NOW);
    }
}
