//! Forum pipeline over the JSON search API.
//!
//! Search responses already carry structured posts, so there is no markup
//! extraction here: `data.children[].data` maps field for field onto
//! [`ForumCandidate`], with score and comment counts defaulting to zero.

use crate::config::{Config, ForumConfig};
use crate::dedup::dedup_by_link;
use crate::extract::truncate_chars;
use crate::fetcher::Fetch;
use crate::models::{ForumCandidate, ForumItem, to_iso};
use crate::scoring;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::secs;

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Default, Deserialize)]
struct Child {
    #[serde(default)]
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
struct Post {
    title: Option<String>,
    permalink: Option<String>,
    subreddit: Option<String>,
    score: Option<i64>,
    num_comments: Option<i64>,
    created_utc: Option<f64>,
}

/// Map one search response onto candidates.
///
/// Posts without a title or permalink are dropped; a response that does not
/// look like a listing at all yields nothing.
pub fn parse_search(
    doc: Value,
    link_base: &str,
    max_headline_chars: usize,
) -> Vec<ForumCandidate> {
    let listing: Listing = match serde_json::from_value(doc) {
        Ok(l) => l,
        Err(e) => {
            warn!(error = %e, "Search response is not a listing");
            return Vec::new();
        }
    };

    listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            let post = child.data;
            let headline = post
                .title
                .map(|t| html_escape::decode_html_entities(t.trim()).to_string())
                .filter(|t| !t.is_empty())?;
            let permalink = post.permalink.filter(|p| !p.is_empty())?;
            Some(ForumCandidate {
                headline: truncate_chars(&headline, max_headline_chars),
                link: format!("{}{}", link_base.trim_end_matches('/'), permalink),
                subreddit: post.subreddit.unwrap_or_default(),
                published: post
                    .created_utc
                    .and_then(|ts| DateTime::from_timestamp(ts as i64, 0)),
                score: post.score.unwrap_or(0),
                comments: post.num_comments.unwrap_or(0),
            })
        })
        .collect()
}

/// Sort by platform score, then comment count (both descending) and truncate.
pub fn rank(mut items: Vec<ForumItem>, target: usize) -> Vec<ForumItem> {
    items.sort_by(|a, b| (b.score, b.comments).cmp(&(a.score, a.comments)));
    items.truncate(target);
    items
}

/// Distinct communities on the panel, in order of first appearance.
pub fn subreddits_of(items: &[ForumItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.subreddit.clone())
        .filter(|s| !s.is_empty())
        .unique()
        .collect()
}

fn to_item(candidate: ForumCandidate) -> ForumItem {
    ForumItem {
        viral_score: scoring::forum_viral_score(candidate.score, candidate.comments),
        headline: candidate.headline,
        link: candidate.link,
        subreddit: candidate.subreddit,
        published_at: candidate.published.as_ref().map(to_iso),
        score: candidate.score,
        comments: candidate.comments,
    }
}

/// Runs the forum class end to end.
pub struct ForumPipeline<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a ForumConfig,
    concurrency: usize,
}

impl<'a, F: Fetch> ForumPipeline<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Self {
        Self {
            fetcher,
            config: &config.forum,
            concurrency: config.concurrency.max(1),
        }
    }

    fn search_url(&self, query: &str) -> String {
        self.config
            .search_url_template
            .replace("{query}", &urlencoding::encode(query))
    }

    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str) -> Vec<ForumCandidate> {
        let url = self.search_url(query);
        match self
            .fetcher
            .fetch_json(&url, secs(self.config.timeout_secs))
            .await
        {
            Ok(doc) => {
                let candidates =
                    parse_search(doc, &self.config.link_base, self.config.max_headline_chars);
                debug!(count = candidates.len(), "Extracted search results");
                candidates
            }
            Err(e) => {
                warn!(%url, error = %e, "Search unavailable; skipping");
                Vec::new()
            }
        }
    }

    /// Search every configured query, then filter and rank the union.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, now: DateTime<Utc>) -> Vec<ForumItem> {
        let candidates: Vec<ForumCandidate> = stream::iter(self.config.queries.iter())
            .map(|q| self.search(q))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();
        let extracted = candidates.len();

        let max_age_hours = self.config.max_age_days * 24.0;
        let qualifying: Vec<ForumItem> = dedup_by_link(candidates)
            .into_iter()
            .filter(|c| {
                c.published
                    .as_ref()
                    .is_none_or(|p| scoring::age_hours(p, &now) <= max_age_hours)
            })
            .filter(|c| c.score >= self.config.min_score)
            .map(to_item)
            .collect();
        let qualified = qualifying.len();

        let items = rank(qualifying, self.config.target_count);
        info!(extracted, qualified, selected = items.len(), "Forum pipeline complete");
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::stub::StubFetcher;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn post(
        title: &str,
        permalink: &str,
        sub: &str,
        score: i64,
        comments: i64,
        created: f64,
    ) -> Value {
        json!({"kind": "t3", "data": {
            "title": title, "permalink": permalink, "subreddit": sub,
            "score": score, "num_comments": comments, "created_utc": created
        }})
    }

    fn listing(children: Vec<Value>) -> String {
        json!({"kind": "Listing", "data": {"children": children}}).to_string()
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.forum.queries = vec!["open ai".into(), "llm".into()];
        config.forum.search_url_template = "https://forum.test/search.json?q={query}".into();
        config
    }

    #[test]
    fn test_parse_search_defaults_and_drops() {
        let doc = json!({"data": {"children": [
            {"data": {"title": "Only a title &amp; more", "permalink": "/r/x/comments/1/"}},
            {"data": {"permalink": "/r/x/comments/2/"}},
            {"data": {"title": "No permalink"}},
        ]}});
        let out = parse_search(doc, "https://reddit.com", 240);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].headline, "Only a title & more");
        assert_eq!(out[0].link, "https://reddit.com/r/x/comments/1/");
        assert_eq!((out[0].score, out[0].comments), (0, 0));
        assert_eq!(out[0].published, None);
        assert_eq!(out[0].subreddit, "");
    }

    #[test]
    fn test_parse_search_rejects_non_listing() {
        assert!(parse_search(json!([1, 2, 3]), "https://reddit.com", 240).is_empty());
        assert!(parse_search(json!({}), "https://reddit.com", 240).is_empty());
    }

    #[test]
    fn test_rank_and_subreddits() {
        let item = |link: &str, sub: &str, score, comments| ForumItem {
            headline: link.into(),
            link: link.into(),
            subreddit: sub.into(),
            published_at: None,
            score,
            comments,
            viral_score: 0,
        };
        let ranked = rank(
            vec![
                item("a", "OpenAI", 100, 5),
                item("b", "singularity", 300, 1),
                item("c", "OpenAI", 100, 9),
                item("d", "LocalLLaMA", 50, 0),
            ],
            3,
        );
        let order: Vec<_> = ranked.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(subreddits_of(&ranked), vec!["singularity", "OpenAI"]);
    }

    #[tokio::test]
    async fn test_run_filters_dedups_and_scores() {
        let fresh = now().timestamp() as f64 - 3600.0;
        let ancient = now().timestamp() as f64 - 400.0 * 86_400.0;
        let fetcher = StubFetcher::new()
            .with(
                "https://forum.test/search.json?q=open%20ai",
                &listing(vec![
                    post("Big thread", "/r/OpenAI/comments/1/", "OpenAI", 1000, 10, fresh),
                    post("Too old", "/r/OpenAI/comments/2/", "OpenAI", 9000, 900, ancient),
                    post("Too small", "/r/OpenAI/comments/3/", "OpenAI", 49, 500, fresh),
                ]),
            )
            .with(
                "https://forum.test/search.json?q=llm",
                &listing(vec![post(
                    "Big thread (again)",
                    "/r/OpenAI/comments/1/",
                    "OpenAI",
                    1200,
                    12,
                    fresh,
                )]),
            );
        let items = ForumPipeline::new(&fetcher, &config()).run(now()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline, "Big thread (again)");
        assert_eq!(items[0].link, "https://reddit.com/r/OpenAI/comments/1/");
        assert_eq!(items[0].viral_score, scoring::forum_viral_score(1200, 12));
        assert!(items[0].published_at.is_some());
    }

    #[tokio::test]
    async fn test_later_query_wins_even_when_it_answers_first() {
        let fresh = now().timestamp() as f64 - 3600.0;
        let fetcher = StubFetcher::new()
            .with(
                "https://forum.test/search.json?q=open%20ai",
                &listing(vec![
                    post("From slow", "/r/OpenAI/comments/1/", "OpenAI", 500, 10, fresh),
                    post("Slow only", "/r/singularity/comments/2/", "singularity", 500, 10, fresh),
                ]),
            )
            .with_delay(
                "https://forum.test/search.json?q=open%20ai",
                std::time::Duration::from_millis(80),
            )
            .with(
                "https://forum.test/search.json?q=llm",
                &listing(vec![
                    post("From fast", "/r/OpenAI/comments/1/", "OpenAI", 500, 10, fresh),
                    post("Fast only", "/r/LocalLLaMA/comments/3/", "LocalLLaMA", 500, 10, fresh),
                ]),
            );
        let items = ForumPipeline::new(&fetcher, &config()).run(now()).await;
        let heads: Vec<_> = items.iter().map(|i| i.headline.as_str()).collect();
        assert_eq!(heads, vec!["From fast", "Slow only", "Fast only"]);
        assert_eq!(subreddits_of(&items), vec!["OpenAI", "singularity", "LocalLLaMA"]);
    }

    #[tokio::test]
    async fn test_run_unreachable_is_empty() {
        let fetcher = StubFetcher::new()
            .with("https://forum.test/search.json?q=llm", "<html>blocked</html>");
        let items = ForumPipeline::new(&fetcher, &config()).run(now()).await;
        assert!(items.is_empty());
    }
}
