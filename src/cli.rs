//! Command-line interface definitions.
//!
//! Every option has a matching field in [`Config`](crate::config::Config);
//! flags given here override the YAML file.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one aggregation run.
///
/// # Examples
///
/// ```sh
/// # Defaults: built-in sources, write public/data.json
/// ai_pulse_feed
///
/// # Custom sources and output path
/// ai_pulse_feed -c sources.yaml -o site/data.json
///
/// # Quick run without per-item lookups
/// ai_pulse_feed --no-image-backfill --no-image-check --no-metrics
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON artifact to write
    #[arg(short, long, env = "AI_PULSE_OUTPUT", default_value = "public/data.json")]
    pub output: PathBuf,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip fetching article pages for missing news images
    #[arg(long)]
    pub no_image_backfill: bool,

    /// Keep news image URLs without checking that they still serve an image
    #[arg(long)]
    pub no_image_check: bool,

    /// Skip the per-post social metrics lookup (posts then carry zero counters)
    #[arg(long)]
    pub no_metrics: bool,

    /// Upper bound on concurrent requests per stage
    #[arg(long)]
    pub concurrency: Option<usize>,
}
