//! Runs the three pipelines and assembles the artifact.

use crate::config::Config;
use crate::fetcher::Fetch;
use crate::models::{AggregateOutput, ForumPanel, SocialPanel, to_iso};
use crate::pipelines::forum::subreddits_of;
use crate::pipelines::{ForumPipeline, NewsPipeline, SocialPipeline};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

pub struct Aggregator<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a Config,
}

impl<'a, F: Fetch> Aggregator<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Self {
        Self { fetcher, config }
    }

    pub async fn run(&self) -> AggregateOutput {
        self.run_at(Utc::now()).await
    }

    /// Build the artifact as of `now`.
    ///
    /// The pipelines run concurrently and independently; a class whose sources
    /// are all down still yields its (empty) section.
    #[instrument(level = "info", skip_all, fields(now = %now))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> AggregateOutput {
        let news = NewsPipeline::new(self.fetcher, self.config);
        let social = SocialPipeline::new(self.fetcher, self.config);
        let forum = ForumPipeline::new(self.fetcher, self.config);

        let (articles, x_items, reddit_items) =
            tokio::join!(news.run(now), social.run(now), forum.run(now));

        info!(
            articles = articles.len(),
            x_viral = x_items.len(),
            reddit_viral = reddit_items.len(),
            "Aggregation complete"
        );

        let generated_at = to_iso(&now);
        AggregateOutput {
            articles,
            x_viral: SocialPanel {
                generated_at: generated_at.clone(),
                note: self.config.social.note.clone(),
                items: x_items,
            },
            reddit_viral: ForumPanel {
                generated_at,
                subreddits: subreddits_of(&reddit_items),
                items: reddit_items,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedSource;
    use crate::fetcher::stub::StubFetcher;
    use chrono::TimeZone;

    const FEED: &str = r#"<rss><channel>
        <item><title>OpenAI ships a new model</title><link>https://news.test/a</link>
        <pubDate>Tue, 10 Jun 2025 10:00:00 +0000</pubDate></item>
        </channel></rss>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.news.feeds = vec![FeedSource {
            label: "News Test".into(),
            url: "https://news.test/rss".into(),
        }];
        config.news.backfill_images = false;
        config.social.accounts = vec!["nobody".into()];
        config.forum.queries = vec!["llm".into()];
        config
    }

    #[tokio::test]
    async fn test_forum_down_leaves_other_sections_intact() {
        let fetcher = StubFetcher::new().with("https://news.test/rss", FEED);
        let out = Aggregator::new(&fetcher, &config()).run_at(now()).await;

        assert_eq!(out.articles.len(), 1);
        assert_eq!(out.articles[0].link, "https://news.test/a");
        assert!(out.reddit_viral.items.is_empty());
        assert!(out.reddit_viral.subreddits.is_empty());
        // social falls back entirely to the reserve
        assert_eq!(out.x_viral.items.len(), config().social.target_count);
        assert_eq!(out.x_viral.generated_at, to_iso(&now()));
        assert_eq!(out.reddit_viral.generated_at, out.x_viral.generated_at);
    }

    #[tokio::test]
    async fn test_everything_down_still_serializes() {
        let fetcher = StubFetcher::new();
        let out = Aggregator::new(&fetcher, &config()).run_at(now()).await;
        assert!(out.articles.is_empty());

        let value = serde_json::to_value(&out).unwrap();
        assert!(value["articles"].as_array().unwrap().is_empty());
        assert!(value["x_viral"]["note"].is_string());
        assert!(value["reddit_viral"]["items"].as_array().unwrap().is_empty());
    }
}
