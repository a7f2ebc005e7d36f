//! Concurrent ingestion of captured payload files into one store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reelrank_extract::{IngestOutcome, IngestionPipeline};
use reelrank_store::AggregationStore;

/// Totals for one `ingest_files` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IngestReport {
    pub files_read: usize,
    pub files_failed: usize,
    pub payloads: usize,
    pub payloads_skipped: usize,
    pub added: usize,
    pub updated: usize,
}

#[derive(Debug, Default)]
struct FileOutcome {
    payloads: usize,
    skipped: usize,
    added: usize,
    updated: usize,
}

/// Splits a file into payloads: one per non-blank line for `.jsonl` and
/// `.ndjson`, otherwise the whole file.
pub(crate) fn split_payloads<'a>(path: &Path, contents: &'a str) -> Vec<&'a str> {
    let line_delimited = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson"));

    if line_delimited {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    } else if contents.trim().is_empty() {
        Vec::new()
    } else {
        vec![contents]
    }
}

/// Reads every file and feeds its payloads through `pipeline` into `store`,
/// at most `max_concurrent` files at a time.
///
/// Unreadable files are logged and counted, not propagated.
///
/// # Errors
///
/// Returns an error only when no file could be read at all.
pub(crate) async fn ingest_files(
    pipeline: Arc<IngestionPipeline>,
    store: Arc<AggregationStore>,
    paths: &[PathBuf],
    max_concurrent: usize,
) -> anyhow::Result<IngestReport> {
    let results: Vec<(&PathBuf, anyhow::Result<FileOutcome>)> = stream::iter(paths)
        .map(|path| {
            let fut = ingest_file(Arc::clone(&pipeline), Arc::clone(&store), path.clone());
            async move { (path, fut.await) }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = IngestReport::default();
    for (path, result) in results {
        match result {
            Ok(outcome) => {
                report.files_read += 1;
                report.payloads += outcome.payloads;
                report.payloads_skipped += outcome.skipped;
                report.added += outcome.added;
                report.updated += outcome.updated;
            }
            Err(e) => {
                report.files_failed += 1;
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable payload file");
            }
        }
    }

    if report.files_read == 0 && report.files_failed > 0 {
        anyhow::bail!("none of the {} payload files could be read", report.files_failed);
    }

    tracing::info!(
        files = report.files_read,
        failed = report.files_failed,
        payloads = report.payloads,
        skipped = report.payloads_skipped,
        added = report.added,
        updated = report.updated,
        "ingestion finished"
    );
    Ok(report)
}

async fn ingest_file(
    pipeline: Arc<IngestionPipeline>,
    store: Arc<AggregationStore>,
    path: PathBuf,
) -> anyhow::Result<FileOutcome> {
    let contents = tokio::fs::read_to_string(&path).await?;

    // Extraction is CPU-bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        let source = path.display().to_string();
        let mut outcome = FileOutcome::default();
        for raw in split_payloads(&path, &contents) {
            outcome.payloads += 1;
            match pipeline.ingest_into(raw, &source, &*store) {
                IngestOutcome::Skipped => outcome.skipped += 1,
                IngestOutcome::Empty => {}
                IngestOutcome::Forwarded { summary, .. } => {
                    outcome.added += summary.added;
                    outcome.updated += summary.updated;
                }
            }
        }
        tracing::debug!(path = %source, payloads = outcome.payloads, "file ingested");
        outcome
    })
    .await?;

    Ok(outcome)
}
