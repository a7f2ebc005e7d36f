//! Incremental aggregation store for normalized posts.
//!
//! Reconciles fragments of the same post arriving across many payloads,
//! scores the collection with a time-decayed popularity model, and derives
//! keyword/hashtag trends and monthly performance from the processed view.

pub mod error;
pub mod filter;
pub mod merge;
pub mod performance;
pub mod scoring;
pub mod store;
pub mod trends;
pub mod view;

pub use error::StoreError;
pub use filter::CompiledFilter;
pub use merge::smart_merge;
pub use performance::{monthly_performance, MonthlyBucket};
pub use scoring::{decayed_score, ScoringPass};
pub use store::{AggregationStore, StoreEvent, SubscriptionId};
pub use trends::{analyze_trends, TermStat, TrendReport};
pub use view::build_view;
