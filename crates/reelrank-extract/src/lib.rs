//! Extraction and normalization engine.
//!
//! Walks arbitrary JSON response bodies, recognizes post-like objects across
//! the platform's schema generations, and normalizes them into
//! [`reelrank_core::PostRecord`]s. Per-payload deduplication happens here;
//! cross-payload reconciliation is the store's job.

pub mod context;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod scope;
pub mod timestamp;
pub mod tree;

mod fields;

pub use context::ExtractionContext;
pub use error::ExtractError;
pub use normalize::{classify_node, Classification, Rejection};
pub use pipeline::{IngestOutcome, IngestionPipeline, PipelineStats};
pub use scope::profile_from_page_url;
pub use timestamp::{decode_primary_key, ResolvedTimestamp, TimestampSource, IG_EPOCH_SECS};
pub use tree::{Extraction, TreeExtractor, DEFAULT_MAX_DEPTH};
