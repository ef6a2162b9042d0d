//! News pipeline over RSS/Atom syndication feeds.
//!
//! Articles are scored on keyword fit and recency, filtered to the last
//! `max_age_hours` (undated articles are kept), ranked and truncated. Only the
//! selected articles that still lack an image get a preview image lookup, which
//! keeps the number of outbound page requests bounded by the target count.

use crate::config::{Config, FeedSource, NewsConfig};
use crate::dedup::dedup_by_link;
use crate::extract::{self, DATE, LINK, TITLE};
use crate::fetcher::{Fetch, MetaRequest};
use crate::models::{NewsCandidate, NewsItem};
use crate::scoring::{self, NewsScore};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::secs;

/// Extract candidates from one feed document.
///
/// Reads at most `max_blocks` item/entry blocks. Blocks without a headline or
/// link are dropped.
pub fn parse_feed(xml: &str, label: &str, max_blocks: usize) -> Vec<NewsCandidate> {
    extract::segment_blocks(xml)
        .into_iter()
        .take(max_blocks)
        .filter_map(|block| {
            let headline = extract::extract_first(block, &TITLE).unwrap_or_default();
            let link = extract::extract_first(block, &LINK).unwrap_or_default();
            if headline.is_empty() || link.is_empty() {
                debug!(
                    source = label,
                    block = %truncate_for_log(block, 120),
                    "Dropping block without headline or link"
                );
                return None;
            }
            let published = extract::extract_first(block, &DATE)
                .as_deref()
                .and_then(extract::parse_timestamp);
            Some(NewsCandidate {
                headline,
                link,
                source: label.to_string(),
                published,
                image_url: extract::extract_image(block),
            })
        })
        .collect()
}

/// Whether an article is within the freshness window. Undated articles pass.
pub fn is_fresh(candidate: &NewsCandidate, now: &DateTime<Utc>, max_age_hours: f64) -> bool {
    candidate
        .published
        .as_ref()
        .is_none_or(|p| scoring::age_hours(p, now) <= max_age_hours)
}

/// Sort by ranking, then virality, then fit (all descending) and truncate.
pub fn rank(
    mut scored: Vec<(NewsCandidate, NewsScore)>,
    target: usize,
) -> Vec<(NewsCandidate, NewsScore)> {
    scored.sort_by(|(_, a), (_, b)| {
        (b.ranking, b.virality, b.fit).cmp(&(a.ranking, a.virality, a.fit))
    });
    scored.truncate(target);
    scored
}

fn to_item(
    candidate: NewsCandidate,
    score: NewsScore,
    now: &DateTime<Utc>,
    reason: &str,
) -> NewsItem {
    NewsItem {
        date: candidate.published.unwrap_or(*now).format("%Y-%m-%d").to_string(),
        headline: candidate.headline,
        link: candidate.link,
        source: candidate.source,
        image_url: candidate.image_url.unwrap_or_default(),
        ranking: score.ranking,
        virality: score.virality,
        fit: score.fit,
        reason: reason.to_string(),
    }
}

/// Runs the news class end to end.
pub struct NewsPipeline<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a NewsConfig,
    keywords: &'a [String],
    concurrency: usize,
}

impl<'a, F: Fetch> NewsPipeline<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Self {
        Self {
            fetcher,
            config: &config.news,
            keywords: &config.keywords,
            concurrency: config.concurrency.max(1),
        }
    }

    #[instrument(level = "info", skip_all, fields(source = %feed.label))]
    async fn fetch_feed(&self, feed: &FeedSource) -> Vec<NewsCandidate> {
        match self
            .fetcher
            .fetch_text(&feed.url, secs(self.config.timeout_secs))
            .await
        {
            Ok(xml) => {
                let candidates = parse_feed(&xml, &feed.label, self.config.max_blocks_per_feed);
                debug!(count = candidates.len(), "Extracted feed candidates");
                candidates
            }
            Err(e) => {
                warn!(url = %feed.url, error = %e, "Feed unavailable; skipping");
                Vec::new()
            }
        }
    }

    /// Follow the article link and look for a preview image.
    async fn lookup_image(&self, link: &str) -> Option<String> {
        match self
            .fetcher
            .fetch_text(link, secs(self.config.image_timeout_secs))
            .await
        {
            Ok(html) => extract::preview_image(&html, link),
            Err(e) => {
                debug!(%link, error = %e, "Preview image lookup failed");
                None
            }
        }
    }

    async fn backfill_images(
        &self,
        selected: Vec<(NewsCandidate, NewsScore)>,
    ) -> Vec<(NewsCandidate, NewsScore)> {
        stream::iter(selected)
            .map(|(mut candidate, score)| async move {
                if candidate.image_url.is_none() {
                    candidate.image_url = self.lookup_image(&candidate.link).await;
                }
                (candidate, score)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Whether `url` answers like an image.
    ///
    /// A HEAD response counts when it carries an `image/*` type, or no type
    /// but a non-zero length. Otherwise a one-byte ranged GET decides.
    async fn image_responds(&self, url: &str) -> bool {
        let timeout = secs(self.config.image_check_timeout_secs);
        if let Ok(meta) = self.fetcher.fetch_meta(url, MetaRequest::Head, timeout).await {
            let untyped_body =
                meta.content_type.is_none() && meta.content_length.is_some_and(|n| n > 0);
            if meta.is_image() || untyped_body {
                return true;
            }
        }
        match self
            .fetcher
            .fetch_meta(url, MetaRequest::RangedGet, timeout)
            .await
        {
            Ok(meta) => meta.is_image(),
            Err(e) => {
                debug!(%url, error = %e, "Image check failed");
                false
            }
        }
    }

    /// Blank every selected image URL that does not serve an image.
    /// Each distinct URL is checked once.
    async fn verify_images(
        &self,
        mut selected: Vec<(NewsCandidate, NewsScore)>,
    ) -> Vec<(NewsCandidate, NewsScore)> {
        let urls: Vec<String> = selected
            .iter()
            .filter_map(|(c, _)| c.image_url.clone())
            .unique()
            .collect();
        let verdicts: HashMap<String, bool> = stream::iter(urls)
            .map(|url| async move {
                let ok = self.image_responds(&url).await;
                (url, ok)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut removed = 0usize;
        for (candidate, _) in &mut selected {
            let broken = candidate
                .image_url
                .as_ref()
                .is_some_and(|u| !verdicts.get(u).copied().unwrap_or(false));
            if broken {
                candidate.image_url = None;
                removed += 1;
            }
        }
        debug!(checked = verdicts.len(), removed, "Verified image URLs");
        selected
    }

    /// Fetch, score, filter and rank every configured feed.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, now: DateTime<Utc>) -> Vec<NewsItem> {
        let candidates: Vec<NewsCandidate> = stream::iter(self.config.feeds.iter())
            .map(|feed| self.fetch_feed(feed))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();
        let extracted = candidates.len();

        let unique = dedup_by_link(candidates);
        let deduped = unique.len();

        let scored: Vec<(NewsCandidate, NewsScore)> = unique
            .into_iter()
            .map(|c| {
                let score = scoring::score_news(
                    &c.headline,
                    c.published.as_ref(),
                    &now,
                    self.keywords,
                    &self.config.brand_keywords,
                );
                (c, score)
            })
            .filter(|(c, _)| is_fresh(c, &now, self.config.max_age_hours))
            .collect();
        let fresh = scored.len();

        let mut selected = rank(scored, self.config.target_count);
        if self.config.backfill_images {
            selected = self.backfill_images(selected).await;
        }
        if self.config.verify_images {
            selected = self.verify_images(selected).await;
        }

        let items: Vec<NewsItem> = selected
            .into_iter()
            .map(|(c, s)| to_item(c, s, &now, &self.config.reason))
            .collect();

        info!(
            extracted,
            deduped,
            fresh,
            selected = items.len(),
            with_image = items.iter().filter(|i| !i.image_url.is_empty()).count(),
            "News pipeline complete"
        );
        items
    }
}
