//! The three source-class pipelines.
//!
//! Each pipeline chains the same stages over its own source class:
//!
//! 1. **Fetch**: download every configured source, bounded by a timeout
//! 2. **Extract**: turn each document into candidates
//! 3. **Dedup**: one candidate per link, last write wins
//! 4. **Score** and **Filter**: class-specific formulas and gates
//! 5. **Rank**: stable multi-key sort, then truncate to the target count
//!
//! | Class | Module | Source | Target |
//! |-------|--------|--------|--------|
//! | News | [`news`] | Syndication feeds (RSS/Atom) | 20 |
//! | Social | [`social`] | Per-account RSS mirror + metrics lookup | 10 |
//! | Forum | [`forum`] | JSON search API | 10 |
//!
//! Pipelines never fail as a whole. A source that cannot be fetched is logged
//! and skipped; if every source fails the pipeline returns an empty result.
//!
//! Fetches fan out with `buffered`, which yields results in configuration
//! order regardless of completion order, so selection is deterministic.

pub mod forum;
pub mod news;
pub mod social;

pub use forum::ForumPipeline;
pub use news::NewsPipeline;
pub use social::SocialPipeline;

use std::time::Duration;

pub(crate) fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
