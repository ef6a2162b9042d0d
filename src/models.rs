//! Data models shared by the three source-class pipelines.
//!
//! Candidates are produced by the feed extractors and only mutated by field
//! backfill. Output items are the serialized shape the dashboard frontend
//! reads, so their field names are a fixed contract:
//!
//! - [`NewsItem`] lands in `articles`
//! - [`SocialItem`] lands in `x_viral.items`
//! - [`ForumItem`] lands in `reddit_viral.items`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything carrying a canonical link, the identity key for deduplication.
pub trait Linked {
    fn link(&self) -> &str;
}

/// A news candidate extracted from one syndication feed block.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsCandidate {
    pub headline: String,
    pub link: String,
    /// Label of the feed the block came from.
    pub source: String,
    pub published: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// A social post extracted from an account's RSS mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialCandidate {
    pub headline: String,
    pub link: String,
    pub author: String,
    pub published: Option<DateTime<Utc>>,
    pub metrics: Engagement,
}

/// Public engagement counters for one social post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    pub views: u64,
}

/// A forum thread read from a JSON search response.
#[derive(Debug, Clone, PartialEq)]
pub struct ForumCandidate {
    pub headline: String,
    pub link: String,
    pub subreddit: String,
    pub published: Option<DateTime<Utc>>,
    pub score: i64,
    pub comments: i64,
}

impl Linked for NewsCandidate {
    fn link(&self) -> &str {
        &self.link
    }
}

impl Linked for SocialCandidate {
    fn link(&self) -> &str {
        &self.link
    }
}

impl Linked for ForumCandidate {
    fn link(&self) -> &str {
        &self.link
    }
}

impl Linked for NewsItem {
    fn link(&self) -> &str {
        &self.link
    }
}

impl Linked for SocialItem {
    fn link(&self) -> &str {
        &self.link
    }
}

impl Linked for ForumItem {
    fn link(&self) -> &str {
        &self.link
    }
}

/// A ranked news article as written to `articles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
    pub source: String,
    /// Publication date (`YYYY-MM-DD`), or the run date when the feed had none.
    pub date: String,
    /// Empty when neither the feed nor the article page offered an image.
    pub image_url: String,
    pub ranking: u32,
    pub virality: u32,
    pub fit: u32,
    pub reason: String,
}

/// A ranked social post as written to `x_viral.items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialItem {
    pub headline: String,
    pub link: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub likes: u64,
    pub views: u64,
    pub reposts: u64,
    pub replies: u64,
    pub keyword_hits: u32,
    pub score: u32,
}

/// A ranked forum thread as written to `reddit_viral.items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumItem {
    pub headline: String,
    pub link: String,
    pub subreddit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub score: i64,
    pub comments: i64,
    pub viral_score: u32,
}

/// The `x_viral` panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPanel {
    pub generated_at: String,
    pub note: String,
    pub items: Vec<SocialItem>,
}

/// The `reddit_viral` panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPanel {
    pub generated_at: String,
    pub subreddits: Vec<String>,
    pub items: Vec<ForumItem>,
}

/// The complete artifact produced by one run.
///
/// Built fresh every run; it replaces whatever artifact was there before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOutput {
    pub articles: Vec<NewsItem>,
    pub x_viral: SocialPanel,
    pub reddit_viral: ForumPanel,
}

/// Format a timestamp the way every panel reports time (RFC 3339, UTC).
pub fn to_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_social_item_omits_missing_published_at() {
        let item = SocialItem {
            headline: "h".into(),
            link: "https://x.com/a/status/1".into(),
            author: "a".into(),
            published_at: None,
            likes: 1,
            views: 2,
            reposts: 3,
            replies: 4,
            keyword_hits: 0,
            score: 5,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("published_at").is_none());
        assert_eq!(json["keyword_hits"], 0);
        assert_eq!(json["views"], 2);
    }

    #[test]
    fn test_aggregate_top_level_keys() {
        let out = AggregateOutput {
            articles: vec![],
            x_viral: SocialPanel {
                generated_at: "t".into(),
                note: "n".into(),
                items: vec![],
            },
            reddit_viral: ForumPanel {
                generated_at: "t".into(),
                subreddits: vec![],
                items: vec![],
            },
        };
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["articles"].is_array());
        assert!(json["x_viral"]["items"].is_array());
        assert!(json["reddit_viral"]["subreddits"].is_array());
    }

    #[test]
    fn test_to_iso_is_utc() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(to_iso(&ts), "2026-03-01T12:00:00+00:00");
    }
}
