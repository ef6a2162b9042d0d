//! Static pipeline configuration.
//!
//! Every fixed list the pipelines rely on (feed sources, social accounts,
//! forum queries, keyword sets) and every tunable threshold lives in one
//! immutable [`Config`] value. [`Config::default`] carries the built-in
//! lists; a YAML file may override any subset of fields.
//!
//! # Example override
//!
//! ```yaml
//! news:
//!   max_age_hours: 36
//! forum:
//!   queries: ["openai", "local llm"]
//!   min_score: 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

/// Identifying client header sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 ai-pulse-feed-bot";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A labelled syndication feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    /// Display name written to each article's `source` field.
    pub label: String,
    pub url: String,
}

impl FeedSource {
    fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// Root configuration passed to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    /// Upper bound on in-flight requests per fan-out stage.
    pub concurrency: usize,
    /// Keyword set shared by news and social relevance scoring.
    pub keywords: Vec<String>,
    pub news: NewsConfig,
    pub social: SocialConfig,
    pub forum: ForumConfig,
}

/// News (syndication feed) pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub feeds: Vec<FeedSource>,
    pub brand_keywords: Vec<String>,
    pub timeout_secs: u64,
    /// Blocks read from each feed; bounds work on oversized feeds.
    pub max_blocks_per_feed: usize,
    pub max_age_hours: f64,
    pub target_count: usize,
    /// Follow article links to find a preview image when the feed has none.
    pub backfill_images: bool,
    pub image_timeout_secs: u64,
    /// Blank selected image URLs that do not answer with an `image/*` type.
    pub verify_images: bool,
    pub image_check_timeout_secs: u64,
    pub reason: String,
}

/// Social (per-account RSS mirror) pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub accounts: Vec<String>,
    /// Base of the RSS mirror; feeds live at `{mirror_base}/{account}/rss`.
    pub mirror_base: String,
    /// Public metrics endpoint; `{id}` is replaced by the status id.
    pub metrics_url_template: String,
    pub enrich_metrics: bool,
    pub fallback_keywords: Vec<String>,
    pub timeout_secs: u64,
    pub metrics_timeout_secs: u64,
    pub max_blocks_per_account: usize,
    pub max_headline_chars: usize,
    pub max_age_hours: f64,
    pub min_views: u64,
    pub target_count: usize,
    pub note: String,
}

/// Forum (JSON search API) pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub queries: Vec<String>,
    /// Search endpoint; `{query}` is replaced by the url-encoded query.
    pub search_url_template: String,
    /// Host prefixed to each permalink to build the item link.
    pub link_base: String,
    pub timeout_secs: u64,
    pub max_headline_chars: usize,
    pub max_age_days: f64,
    pub min_score: i64,
    pub target_count: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 6,
            keywords: strings(&[
                "ai",
                "artificial intelligence",
                "machine learning",
                "llm",
                "model",
                "agent",
                "robot",
                "openai",
                "anthropic",
                "deepmind",
                "nvidia",
                "grok",
                "chatgpt",
                "gemini",
                "claude",
            ]),
            news: NewsConfig::default(),
            social: SocialConfig::default(),
            forum: ForumConfig::default(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                FeedSource::new("OpenAI", "https://openai.com/news/rss.xml"),
                FeedSource::new("Anthropic", "https://www.anthropic.com/news/rss.xml"),
                FeedSource::new("Google AI Blog", "https://blog.google/technology/ai/rss/"),
                FeedSource::new(
                    "MIT Technology Review",
                    "https://www.technologyreview.com/topic/artificial-intelligence/feed/",
                ),
                FeedSource::new("VentureBeat", "https://venturebeat.com/category/ai/feed/"),
                FeedSource::new(
                    "TechCrunch",
                    "https://techcrunch.com/category/artificial-intelligence/feed/",
                ),
                FeedSource::new(
                    "Ars Technica",
                    "https://feeds.arstechnica.com/arstechnica/technology-lab",
                ),
                FeedSource::new(
                    "The Register",
                    "https://www.theregister.com/software/ai_ml/headlines.atom",
                ),
                FeedSource::new("AI News", "https://www.artificialintelligence-news.com/feed/"),
                FeedSource::new("Hugging Face", "https://huggingface.co/blog/feed.xml"),
            ],
            brand_keywords: strings(&[
                "openai",
                "anthropic",
                "deepmind",
                "nvidia",
                "gemini",
                "chatgpt",
            ]),
            timeout_secs: 18,
            max_blocks_per_feed: 24,
            max_age_hours: 24.0,
            target_count: 20,
            backfill_images: true,
            image_timeout_secs: 8,
            verify_images: true,
            image_check_timeout_secs: 12,
            reason: "Ranked by keyword relevance, recency, and source trust.".to_string(),
        }
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            accounts: strings(&[
                "OpenAI",
                "sama",
                "AnthropicAI",
                "GoogleDeepMind",
                "NVIDIAAI",
                "xai",
            ]),
            mirror_base: "https://nitter.net".to_string(),
            metrics_url_template: "https://api.fxtwitter.com/status/{id}".to_string(),
            enrich_metrics: true,
            fallback_keywords: strings(&[
                "gpt",
                "agi",
                "humanoid",
                "neural",
                "robotics",
                "inference",
            ]),
            timeout_secs: 12,
            metrics_timeout_secs: 8,
            max_blocks_per_account: 20,
            max_headline_chars: 220,
            max_age_hours: 7.0 * 24.0,
            min_views: 10_000,
            target_count: 10,
            note: "Top AI-related posts from selected X accounts (RSS mirror).".to_string(),
        }
    }
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            queries: strings(&[
                "artificial intelligence",
                "openai",
                "chatgpt",
                "claude ai",
                "gemini ai",
                "local llm",
            ]),
            search_url_template:
                "https://www.reddit.com/search.json?q={query}&sort=top&t=week&limit=25"
                    .to_string(),
            link_base: "https://reddit.com".to_string(),
            timeout_secs: 12,
            max_headline_chars: 240,
            max_age_days: 365.0,
            min_score: 50,
            target_count: 10,
        }
    }
}

impl Config {
    /// Parse a YAML document, filling unspecified fields from [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error when the document does not match the schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a YAML configuration file.
    ///
    /// Keys missing from the file keep their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Yaml`] if it is not a valid configuration document.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Yaml {
            path: display,
            source,
        })?;
        info!(
            feeds = config.news.feeds.len(),
            accounts = config.social.accounts.len(),
            queries = config.forum.queries.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}
