//! Raw payload ingestion: parse, extract, forward.

use std::sync::atomic::{AtomicU64, Ordering};

use reelrank_core::{AppConfig, MergeSummary, PostRecord, PostSink};
use serde_json::Value;

use crate::error::ExtractError;
use crate::tree::{Extraction, TreeExtractor};

/// Default upper bound on a single payload, in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 32 * 1024 * 1024;

/// What happened to one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Malformed, oversized, or scalar payload; nothing was extracted.
    Skipped,
    /// Parsed fine but contained no in-scope posts.
    Empty,
    /// Posts were extracted and merged into the sink.
    Forwarded { posts: usize, summary: MergeSummary },
}

/// Snapshot of the pipeline's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub payloads_received: u64,
    pub payloads_skipped: u64,
    pub posts_extracted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    skipped: AtomicU64,
    extracted: AtomicU64,
}

/// Turns raw response bodies into batches of posts.
///
/// Stateless apart from its counters, so one pipeline can be shared by every
/// task feeding payloads. Each payload is processed to completion on the
/// calling thread.
#[derive(Debug)]
pub struct IngestionPipeline {
    extractor: TreeExtractor,
    max_payload_bytes: usize,
    counters: Counters,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new(TreeExtractor::default(), DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(extractor: TreeExtractor, max_payload_bytes: usize) -> Self {
        Self {
            extractor,
            max_payload_bytes,
            counters: Counters::default(),
        }
    }

    /// Builds a pipeline from the configured depth limit, payload limit and
    /// profile scope.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let extractor =
            TreeExtractor::new(config.max_depth).with_profile(config.profile.as_deref());
        Self::new(extractor, config.max_payload_bytes)
    }

    #[must_use]
    pub fn extractor(&self) -> &TreeExtractor {
        &self.extractor
    }

    /// Parses `raw` and extracts its posts, using `now` as the fallback
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::PayloadTooLarge`] before parsing oversized
    /// input, [`ExtractError::Parse`] for malformed or over-nested JSON, and
    /// [`ExtractError::NotStructured`] when the root is a scalar.
    pub fn extract_at(&self, raw: &str, source: &str, now: i64) -> Result<Extraction, ExtractError> {
        if raw.len() > self.max_payload_bytes {
            return Err(ExtractError::PayloadTooLarge {
                bytes: raw.len(),
                limit: self.max_payload_bytes,
            });
        }

        let root: Value = serde_json::from_str(raw).map_err(|source_err| ExtractError::Parse {
            context: source.to_string(),
            source: source_err,
        })?;

        let kind = match &root {
            Value::Object(_) | Value::Array(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("boolean"),
            Value::Number(_) => Some("number"),
            Value::String(_) => Some("string"),
        };
        if let Some(kind) = kind {
            return Err(ExtractError::NotStructured { kind });
        }

        Ok(self.extractor.extract(&root, now))
    }

    /// Parses `raw` and extracts its posts at the current time.
    ///
    /// # Errors
    ///
    /// See [`IngestionPipeline::extract_at`].
    pub fn extract(&self, raw: &str, source: &str) -> Result<Vec<PostRecord>, ExtractError> {
        self.extract_at(raw, source, chrono::Utc::now().timestamp())
            .map(|extraction| extraction.posts)
    }

    /// Processes one payload and forwards its posts to `sink`.
    ///
    /// Never fails: a bad payload is logged, counted and skipped so it cannot
    /// interrupt the payloads after it.
    pub fn ingest_into<S>(&self, raw: &str, source: &str, sink: &S) -> IngestOutcome
    where
        S: PostSink + ?Sized,
    {
        self.ingest_into_at(raw, source, sink, chrono::Utc::now().timestamp())
    }

    /// [`IngestionPipeline::ingest_into`] with an explicit extraction time.
    pub fn ingest_into_at<S>(&self, raw: &str, source: &str, sink: &S, now: i64) -> IngestOutcome
    where
        S: PostSink + ?Sized,
    {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let extraction = match self.extract_at(raw, source, now) {
            Ok(extraction) => extraction,
            Err(e) => {
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(source, bytes = raw.len(), error = %e, "skipping payload");
                return IngestOutcome::Skipped;
            }
        };

        if extraction.truncated_branches > 0 {
            tracing::debug!(
                source,
                truncated = extraction.truncated_branches,
                max_depth = self.extractor.max_depth(),
                "payload nested deeper than the traversal limit"
            );
        }

        let posts = extraction.posts.len();
        if posts == 0 {
            return IngestOutcome::Empty;
        }

        self.counters
            .extracted
            .fetch_add(u64::try_from(posts).unwrap_or(u64::MAX), Ordering::Relaxed);

        let summary = sink.merge(extraction.posts);
        tracing::debug!(
            source,
            posts,
            added = summary.added,
            updated = summary.updated,
            out_of_scope = extraction.out_of_scope,
            "merged payload"
        );

        IngestOutcome::Forwarded { posts, summary }
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            payloads_received: self.counters.received.load(Ordering::Relaxed),
            payloads_skipped: self.counters.skipped.load(Ordering::Relaxed),
            posts_extracted: self.counters.extracted.load(Ordering::Relaxed),
        }
    }
}
