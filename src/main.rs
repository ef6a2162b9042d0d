//! # AI Pulse Feed
//!
//! Aggregates AI news and social chatter into a single JSON artifact for a
//! static dashboard.
//!
//! ## Sources
//!
//! - News syndication feeds (RSS 2.0 and Atom), ranked by keyword fit,
//!   recency and source trust
//! - Social posts from selected accounts via an RSS mirror, enriched with
//!   public engagement counters
//! - Forum threads from a JSON search API, ranked by score and discussion
//!
//! ## Usage
//!
//! ```sh
//! ai_pulse_feed -o public/data.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture, once per source class:
//! 1. **Fetching**: Download every configured source concurrently
//! 2. **Extraction**: Tolerant pattern-based parsing into candidates
//! 3. **Scoring**: Dedup, class-specific scores and quality gates
//! 4. **Output**: Rank, truncate and write one JSON file

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod curated;
mod dedup;
mod extract;
mod fetcher;
mod models;
mod outputs;
mod pipelines;
mod scoring;
mod utils;

use aggregator::Aggregator;
use cli::Cli;
use config::Config;
use fetcher::HttpFetcher;
use outputs::{json, validate};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_pulse_feed starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output, ?args.config, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            info!("No config file given; using built-in sources");
            Config::default()
        }
    };
    if args.no_image_backfill {
        config.news.backfill_images = false;
    }
    if args.no_image_check {
        config.news.verify_images = false;
    }
    if args.no_metrics {
        config.social.enrich_metrics = false;
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }

    let output_dir = args
        .output
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_writable_dir(output_dir).await?;

    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let output = Aggregator::new(&fetcher, &config).run().await;

    for problem in validate::check(&output, &config) {
        warn!(%problem, "Artifact check failed");
    }

    json::write_aggregate(&output, &args.output).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = output.articles.len(),
        x_viral = output.x_viral.items.len(),
        reddit_viral = output.reddit_viral.items.len(),
        "Execution complete"
    );

    Ok(())
}
