//! Monthly performance buckets for charting views and score over time.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};
use reelrank_core::ScoredPost;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// UTC calendar month, `YYYY-MM`.
    pub month: String,
    pub post_count: usize,
    pub total_views: u64,
    pub avg_score: f64,
}

/// Groups posts by the UTC month of their timestamp, oldest month first.
///
/// Posts without a usable timestamp are left out.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn monthly_performance(posts: &[ScoredPost]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), (usize, u64, f64)> = BTreeMap::new();

    for scored in posts {
        if scored.post.timestamp <= 0 {
            continue;
        }
        let Some(created) = DateTime::from_timestamp(scored.post.timestamp, 0) else {
            continue;
        };
        let bucket = months
            .entry((created.year(), created.month()))
            .or_insert((0, 0, 0.0));
        bucket.0 += 1;
        bucket.1 = bucket.1.saturating_add(scored.post.views);
        bucket.2 += scored.score;
    }

    months
        .into_iter()
        .map(|((year, month), (post_count, total_views, score_sum))| MonthlyBucket {
            month: format!("{year:04}-{month:02}"),
            post_count,
            total_views,
            avg_score: score_sum / post_count as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelrank_core::PostRecord;

    fn scored(id: &str, timestamp: i64, views: u64, score: f64) -> ScoredPost {
        ScoredPost {
            post: PostRecord::new(id, timestamp).with_counts(views, 0, 0),
            score,
        }
    }

    // 2024-01-31T23:59:59Z and 2024-02-01T00:00:00Z
    const END_OF_JAN: i64 = 1_706_745_599;
    const START_OF_FEB: i64 = 1_706_745_600;

    #[test]
    fn buckets_are_chronological_by_utc_month() {
        let posts = vec![
            scored("feb", START_OF_FEB, 300, 30.0),
            scored("jan_a", END_OF_JAN, 100, 10.0),
            scored("jan_b", END_OF_JAN - 86_400, 50, 20.0),
        ];

        let buckets = monthly_performance(&posts);

        assert_eq!(
            buckets,
            vec![
                MonthlyBucket {
                    month: "2024-01".to_string(),
                    post_count: 2,
                    total_views: 150,
                    avg_score: 15.0,
                },
                MonthlyBucket {
                    month: "2024-02".to_string(),
                    post_count: 1,
                    total_views: 300,
                    avg_score: 30.0,
                },
            ]
        );
    }

    #[test]
    fn posts_without_timestamp_are_skipped() {
        let posts = vec![scored("unknown", 0, 999, 0.0)];
        assert!(monthly_performance(&posts).is_empty());
    }

    #[test]
    fn empty_input_gives_no_buckets() {
        assert!(monthly_performance(&[]).is_empty());
    }
}
