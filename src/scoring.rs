//! Source-specific relevance and virality scores.
//!
//! The formulas are part of the output contract: the dashboard compares
//! scores across runs, so every constant and every rounding step below has to
//! stay exactly as written. All scores are integers with inclusive bounds.

use crate::extract::count_hits;
use crate::models::Engagement;
use chrono::{DateTime, Utc};

/// Age assumed for news items whose feed gave no usable timestamp.
pub const UNDATED_AGE_HOURS: f64 = 48.0;

/// Component scores for one news article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsScore {
    /// 1..=99, blended from the other two plus the brand bonus.
    pub ranking: u32,
    /// 30..=100, recency decay.
    pub virality: u32,
    /// 45..=100, keyword relevance.
    pub fit: u32,
}

/// Hours elapsed since `published`, never negative.
pub fn age_hours(published: &DateTime<Utc>, now: &DateTime<Utc>) -> f64 {
    let secs = (*now - *published).num_milliseconds() as f64 / 1000.0;
    (secs / 3600.0).max(0.0)
}

pub fn news_fit(keyword_hits: u32) -> u32 {
    (45 + 9 * keyword_hits).min(100)
}

pub fn news_virality(age_hours: f64) -> u32 {
    let decayed = (100.0 - age_hours.min(72.0) * 0.8).trunc() as i64;
    decayed.max(30) as u32
}

/// Blend fit and virality; ties at .5 round to even.
pub fn news_ranking(fit: u32, virality: u32, brand_bonus: u32) -> u32 {
    let raw = 0.55 * fit as f64 + 0.45 * virality as f64 + brand_bonus as f64;
    (raw.round_ties_even() as i64).clamp(1, 99) as u32
}

/// Score a news headline against the keyword and brand sets.
pub fn score_news(
    headline: &str,
    published: Option<&DateTime<Utc>>,
    now: &DateTime<Utc>,
    keywords: &[String],
    brands: &[String],
) -> NewsScore {
    let lower = headline.to_lowercase();
    let fit = news_fit(count_hits(&lower, keywords));
    let age = published.map_or(UNDATED_AGE_HOURS, |p| age_hours(p, now));
    let virality = news_virality(age);
    let brand_bonus = if count_hits(&lower, brands) > 0 { 8 } else { 0 };
    NewsScore {
        ranking: news_ranking(fit, virality, brand_bonus),
        virality,
        fit,
    }
}

/// Weighted engagement: `likes + 2*reposts + 1.2*replies + 0.02*views`.
pub fn social_engagement(m: &Engagement) -> f64 {
    m.likes as f64 + 2.0 * m.reposts as f64 + 1.2 * m.replies as f64 + 0.02 * m.views as f64
}

pub fn social_score(keyword_hits: u32, m: &Engagement) -> u32 {
    let raw = 12.0 * keyword_hits as f64 + 26.0 * (social_engagement(m) + 1.0).log10();
    (raw.trunc() as u32).min(100)
}

/// Relevance gate applied before social scoring.
///
/// A post passes when it hits the main keyword set or, failing that, the
/// narrower fallback set.
pub fn social_is_relevant(headline_lower: &str, keyword_hits: u32, fallback: &[String]) -> bool {
    keyword_hits > 0 || count_hits(headline_lower, fallback) > 0
}

pub fn forum_viral_score(score: i64, comments: i64) -> u32 {
    let raw = (0.04 * score as f64 + 0.6 * comments as f64).trunc();
    (raw.max(0.0) as u32).min(100)
}
