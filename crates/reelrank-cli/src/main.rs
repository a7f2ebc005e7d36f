mod format;
mod ingest;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use reelrank_core::{AppConfig, FilterSpec, SortKey, TypeFilter, ViewParams};
use reelrank_extract::{profile_from_page_url, IngestionPipeline, TreeExtractor};
use reelrank_store::{analyze_trends, monthly_performance, AggregationStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reelrank")]
#[command(about = "Rank captured social-media posts by time-decayed popularity")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank collected posts by decayed score or a raw counter
    Rank {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// Maximum number of posts to print
        #[arg(long)]
        limit: Option<usize>,
        /// Print the processed view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank caption keywords and hashtags that recur across posts
    Trends {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// Terms per category (overrides `REELRANK_TREND_TOP_N`)
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Summarize post count, views and average score per month
    Monthly {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Captured payload files; `.jsonl` and `.ndjson` hold one payload per line
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Keep only posts owned by this handle (overrides `REELRANK_PROFILE`)
    #[arg(long)]
    profile: Option<String>,
    /// Derive the profile scope from the page the payloads were captured on
    #[arg(long, conflicts_with = "profile")]
    page_url: Option<String>,
    /// Files ingested at once (overrides `REELRANK_MAX_CONCURRENT_FILES`)
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Sort key: score, views, likes, comments or date
    #[arg(long, default_value_t = SortKey::Score)]
    sort: SortKey,
    /// Sort ascending instead of descending
    #[arg(long)]
    asc: bool,
    /// Half-life in days, 1 to 365 (overrides `REELRANK_HALF_LIFE_DAYS`)
    #[arg(long)]
    half_life: Option<f64>,
    /// Media type: all, video or photo
    #[arg(long = "type", value_name = "TYPE", default_value = "all")]
    media: TypeFilter,
    #[arg(long)]
    min_views: Option<u64>,
    #[arg(long)]
    max_views: Option<u64>,
    /// First day included (UTC)
    #[arg(long, value_name = "YYYY-MM-DD")]
    from: Option<NaiveDate>,
    /// Last day included (UTC)
    #[arg(long, value_name = "YYYY-MM-DD")]
    to: Option<NaiveDate>,
    /// Case-insensitive caption substring
    #[arg(long)]
    search: Option<String>,
}

impl ViewArgs {
    fn params(&self, config: &AppConfig) -> ViewParams {
        ViewParams {
            half_life_days: self.half_life.unwrap_or(config.half_life_days),
            sort_by: self.sort,
            sort_ascending: self.asc,
            filter: FilterSpec {
                media: self.media,
                min_views: self.min_views,
                max_views: self.max_views,
                date_from: self.from,
                date_to: self.to,
                caption_contains: self.search.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = reelrank_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Rank {
            input,
            view,
            limit,
            json,
        } => {
            let store = load_store(&config, &input).await?;
            let posts = store.get_processed(&view.params(&config))?;
            report::print_ranked(&posts, limit, json)?;
        }
        Commands::Trends {
            input,
            view,
            top,
            json,
        } => {
            let store = load_store(&config, &input).await?;
            let posts = store.get_processed(&view.params(&config))?;
            let trends = analyze_trends(&posts, top.unwrap_or(config.trend_top_n));
            report::print_trends(&trends, json)?;
        }
        Commands::Monthly { input, view, json } => {
            let store = load_store(&config, &input).await?;
            let posts = store.get_processed(&view.params(&config))?;
            report::print_monthly(&monthly_performance(&posts), json)?;
        }
    }

    Ok(())
}

/// Resolves the profile scope: `--profile`, then `--page-url`, then config.
fn resolve_profile(config: &AppConfig, input: &InputArgs) -> anyhow::Result<Option<String>> {
    if let Some(profile) = &input.profile {
        return Ok(Some(profile.clone()));
    }
    if let Some(url) = &input.page_url {
        let profile = profile_from_page_url(url)
            .ok_or_else(|| anyhow::anyhow!("no profile handle in page URL '{url}'"))?;
        return Ok(Some(profile));
    }
    Ok(config.profile.clone())
}

async fn load_store(config: &AppConfig, input: &InputArgs) -> anyhow::Result<Arc<AggregationStore>> {
    let profile = resolve_profile(config, input)?;
    let extractor = TreeExtractor::new(config.max_depth).with_profile(profile.as_deref());
    let pipeline = Arc::new(IngestionPipeline::new(extractor, config.max_payload_bytes));
    let store = Arc::new(AggregationStore::new());

    let concurrency = input.concurrency.unwrap_or(config.max_concurrent_files);
    ingest::ingest_files(
        Arc::clone(&pipeline),
        Arc::clone(&store),
        &input.paths,
        concurrency,
    )
    .await?;

    let stats = pipeline.stats();
    tracing::info!(
        profile = profile.as_deref().unwrap_or("-"),
        payloads = stats.payloads_received,
        skipped = stats.payloads_skipped,
        extracted = stats.posts_extracted,
        unique = store.len(),
        "store loaded"
    );
    Ok(store)
}
