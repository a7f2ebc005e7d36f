//! Table and JSON rendering for the CLI subcommands.

use reelrank_core::ScoredPost;
use reelrank_store::{MonthlyBucket, TermStat, TrendReport};

use crate::format::{ago, compact, compact_count, percent, truncate};

const CAPTION_WIDTH: usize = 48;

/// Prints the first `limit` posts of a processed view.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn print_ranked(
    posts: &[ScoredPost],
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let shown = &posts[..limit.map_or(posts.len(), |n| n.min(posts.len()))];

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("no posts matched; check the payload files and filters");
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    println!(
        "{:<5}{:<14}{:<7}{:>9}{:>9}{:>8}{:>9}{:>8}  {:<11}CAPTION",
        "#", "ID", "TYPE", "VIEWS", "LIKES", "CMTS", "SCORE", "ENG", "POSTED"
    );
    for (rank, scored) in shown.iter().enumerate() {
        let post = &scored.post;
        println!(
            "{:<5}{:<14}{:<7}{:>9}{:>9}{:>8}{:>9}{:>8}  {:<11}{}",
            rank + 1,
            post.id,
            post.media_kind.to_string(),
            compact_count(post.views),
            compact_count(post.likes),
            compact_count(post.comments),
            compact(scored.score),
            percent(post.engagement_rate),
            ago(post.timestamp, now),
            truncate(&post.caption, CAPTION_WIDTH),
        );
    }
    println!("{} of {} posts", shown.len(), posts.len());
    Ok(())
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn print_trends(report: &TrendReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    print_terms("KEYWORDS", &report.keywords);
    println!();
    print_terms("HASHTAGS", &report.hashtags);
    Ok(())
}

fn print_terms(title: &str, terms: &[TermStat]) {
    println!("{title}");
    if terms.is_empty() {
        println!("  (no term appears in at least two posts)");
        return;
    }
    println!("  {:<28}{:>7}{:>11}{:>11}", "TERM", "POSTS", "AVG SCORE", "TOTAL");
    for term in terms {
        println!(
            "  {:<28}{:>7}{:>11}{:>11}",
            truncate(&term.term, 26),
            term.count,
            compact(term.avg_score),
            compact(term.total_score),
        );
    }
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn print_monthly(buckets: &[MonthlyBucket], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(buckets)?);
        return Ok(());
    }
    if buckets.is_empty() {
        println!("no dated posts to summarize");
        return Ok(());
    }
    println!("{:<10}{:>7}{:>11}{:>11}", "MONTH", "POSTS", "VIEWS", "AVG SCORE");
    for bucket in buckets {
        println!(
            "{:<10}{:>7}{:>11}{:>11}",
            bucket.month,
            bucket.post_count,
            compact_count(bucket.total_views),
            compact(bucket.avg_score),
        );
    }
    Ok(())
}
