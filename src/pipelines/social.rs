//! Social pipeline over per-account RSS mirrors.
//!
//! Each account's mirror feed yields posts; relevant and recent posts are
//! enriched with public engagement counters looked up by the status id in the
//! post link, then gated on views, scored, ranked and truncated. A short panel
//! is topped up from the curated reserve in [`crate::curated`].

use crate::config::{Config, SocialConfig};
use crate::curated::social_reserve;
use crate::dedup::dedup_by_link;
use crate::extract::{self, DATE, LINK, TITLE};
use crate::fetcher::Fetch;
use crate::models::{Engagement, SocialCandidate, SocialItem, to_iso};
use crate::scoring;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use super::secs;

static RE_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/status(?:es)?/(\d+)").expect("static pattern compiles"));

/// Numeric status id embedded in a post link.
pub fn status_id(link: &str) -> Option<&str> {
    RE_STATUS
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract posts from one account's mirror feed.
///
/// Headlines are kept whole; they are shortened only once the post is scored.
pub fn parse_account_feed(xml: &str, account: &str, max_blocks: usize) -> Vec<SocialCandidate> {
    extract::segment_blocks(xml)
        .into_iter()
        .take(max_blocks)
        .filter_map(|block| {
            let headline = extract::extract_first(block, &TITLE).unwrap_or_default();
            let link = extract::extract_first(block, &LINK).unwrap_or_default();
            if headline.is_empty() || link.is_empty() {
                return None;
            }
            Some(SocialCandidate {
                headline,
                link,
                author: account.to_string(),
                published: extract::extract_first(block, &DATE)
                    .as_deref()
                    .and_then(extract::parse_timestamp),
                metrics: Engagement::default(),
            })
        })
        .collect()
}

fn counter(obj: &Value, keys: &[&str]) -> u64 {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => s.trim().parse().ok(),
            Value::Object(_) => v.get("count").map(counter_value),
            _ => None,
        })
        .unwrap_or(0)
}

fn counter_value(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Read engagement counters from a metrics lookup response.
///
/// Accepts the post object either at the root or under `tweet`, and the
/// common spellings of each counter. Missing counters are zero.
pub fn parse_metrics(doc: &Value) -> Engagement {
    let post = doc.get("tweet").unwrap_or(doc);
    Engagement {
        likes: counter(post, &["likes", "favorite_count"]),
        reposts: counter(post, &["retweets", "reposts", "retweet_count"]),
        replies: counter(post, &["replies", "reply_count", "conversation_count"]),
        views: counter(post, &["views", "view_count"]),
    }
}

/// Sort by views, score, likes, reposts (all descending) and truncate.
pub fn rank(mut items: Vec<SocialItem>, target: usize) -> Vec<SocialItem> {
    items.sort_by(|a, b| {
        (b.views, b.score, b.likes, b.reposts).cmp(&(a.views, a.score, a.likes, a.reposts))
    });
    items.truncate(target);
    items
}

/// Top a short panel up to `target` from `reserve`, then re-rank.
///
/// Reserve entries whose link is already on the panel are skipped.
pub fn backfill_from_reserve(
    mut items: Vec<SocialItem>,
    reserve: Vec<SocialItem>,
    target: usize,
) -> Vec<SocialItem> {
    if items.len() >= target {
        return items;
    }
    let mut present: HashSet<String> = items.iter().map(|i| i.link.clone()).collect();
    for candidate in reserve {
        if items.len() >= target {
            break;
        }
        if present.insert(candidate.link.clone()) {
            items.push(candidate);
        }
    }
    rank(items, target)
}

fn to_item(
    candidate: SocialCandidate,
    keyword_hits: u32,
    max_headline_chars: usize,
) -> SocialItem {
    let m = candidate.metrics;
    SocialItem {
        headline: extract::truncate_chars(&candidate.headline, max_headline_chars),
        link: candidate.link,
        author: candidate.author,
        published_at: candidate.published.as_ref().map(to_iso),
        likes: m.likes,
        views: m.views,
        reposts: m.reposts,
        replies: m.replies,
        keyword_hits,
        score: scoring::social_score(keyword_hits, &m),
    }
}

/// Runs the social class end to end.
pub struct SocialPipeline<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a SocialConfig,
    keywords: &'a [String],
    concurrency: usize,
}

impl<'a, F: Fetch> SocialPipeline<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Self {
        Self {
            fetcher,
            config: &config.social,
            keywords: &config.keywords,
            concurrency: config.concurrency.max(1),
        }
    }

    fn feed_url(&self, account: &str) -> String {
        format!("{}/{}/rss", self.config.mirror_base.trim_end_matches('/'), account)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_account(&self, account: &str) -> Vec<SocialCandidate> {
        let url = self.feed_url(account);
        match self
            .fetcher
            .fetch_text(&url, secs(self.config.timeout_secs))
            .await
        {
            Ok(xml) => parse_account_feed(&xml, account, self.config.max_blocks_per_account),
            Err(e) => {
                warn!(%url, error = %e, "Account feed unavailable; skipping");
                Vec::new()
            }
        }
    }

    /// Look up public counters for one post. Any failure yields zeros.
    async fn lookup_metrics(&self, link: &str) -> Engagement {
        let Some(id) = status_id(link) else {
            debug!(%link, "No status id in link; metrics default to zero");
            return Engagement::default();
        };
        let url = self.config.metrics_url_template.replace("{id}", id);
        match self
            .fetcher
            .fetch_json(&url, secs(self.config.metrics_timeout_secs))
            .await
        {
            Ok(doc) => parse_metrics(&doc),
            Err(e) => {
                debug!(%url, error = %e, "Metrics lookup failed; using zero counters");
                Engagement::default()
            }
        }
    }

    /// Fetch, gate, enrich, score and rank every configured account.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, now: DateTime<Utc>) -> Vec<SocialItem> {
        let candidates: Vec<SocialCandidate> = stream::iter(self.config.accounts.iter())
            .map(|account| self.fetch_account(account))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();
        let extracted = candidates.len();
        let unique = dedup_by_link(candidates);

        let relevant: Vec<(SocialCandidate, u32)> = unique
            .into_iter()
            .filter_map(|c| {
                let lower = c.headline.to_lowercase();
                let hits = extract::count_hits(&lower, self.keywords);
                scoring::social_is_relevant(&lower, hits, &self.config.fallback_keywords)
                    .then_some((c, hits))
            })
            .filter(|(c, _)| {
                c.published
                    .as_ref()
                    .is_none_or(|p| scoring::age_hours(p, &now) <= self.config.max_age_hours)
            })
            .collect();
        let gated = relevant.len();

        let enriched: Vec<(SocialCandidate, u32)> = if self.config.enrich_metrics {
            stream::iter(relevant)
                .map(|(mut c, hits)| async move {
                    c.metrics = self.lookup_metrics(&c.link).await;
                    (c, hits)
                })
                .buffered(self.concurrency)
                .collect()
                .await
        } else {
            relevant
        };

        let qualifying: Vec<SocialItem> = enriched
            .into_iter()
            .filter(|(c, _)| c.metrics.views >= self.config.min_views)
            .map(|(c, hits)| to_item(c, hits, self.config.max_headline_chars))
            .collect();
        let live = qualifying.len();

        let ranked = rank(qualifying, self.config.target_count);
        let reserve = social_reserve(self.keywords);
        let items = backfill_from_reserve(ranked, reserve, self.config.target_count);
        let reserve_used = items.len().saturating_sub(live.min(self.config.target_count));
        if reserve_used > 0 {
            info!(reserve_used, "Social panel short of target; added curated reserve posts");
        }

        info!(
            extracted,
            gated,
            live,
            selected = items.len(),
            "Social pipeline complete"
        );
        items
    }
}
