//! Shared domain types and configuration for reelrank.
//!
//! The extraction engine and the aggregation store never depend on each
//! other; both speak the types defined here and meet at [`PostSink`].

pub mod app_config;
pub mod config;
pub mod error;
pub mod posts;
pub mod query;
pub mod sink;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use posts::{MediaKind, PostRecord, ScoredPost};
pub use query::{
    is_valid_half_life, FilterSpec, SortKey, TypeFilter, ViewParams, DEFAULT_HALF_LIFE_DAYS,
    MAX_HALF_LIFE_DAYS, MIN_HALF_LIFE_DAYS,
};
pub use sink::{MergeSummary, PostSink};
