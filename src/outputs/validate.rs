//! Sanity checks run on the finished artifact before it is written.
//!
//! Violations never block the write; the caller logs each one as a warning.

use crate::config::Config;
use crate::models::{AggregateOutput, Linked};
use std::collections::HashSet;
use std::ops::RangeInclusive;

fn check_links<T: Linked>(section: &str, items: &[T], problems: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for item in items {
        let link = item.link();
        if link.is_empty() {
            problems.push(format!("{section}: item with empty link"));
        } else if !seen.insert(link) {
            problems.push(format!("{section}: duplicate link {link}"));
        }
    }
}

fn check_len(section: &str, len: usize, target: usize, problems: &mut Vec<String>) {
    if len > target {
        problems.push(format!("{section}: {len} items exceeds target {target}"));
    }
}

fn check_range(
    section: &str,
    field: &str,
    link: &str,
    value: u32,
    range: RangeInclusive<u32>,
    problems: &mut Vec<String>,
) {
    if !range.contains(&value) {
        problems.push(format!("{section}: {field}={value} out of range for {link}"));
    }
}

/// Return a description of every problem found in `output`.
pub fn check(output: &AggregateOutput, config: &Config) -> Vec<String> {
    let mut problems = Vec::new();

    let news = &output.articles;
    check_len("articles", news.len(), config.news.target_count, &mut problems);
    check_links("articles", news, &mut problems);
    for a in news {
        if a.headline.is_empty() {
            problems.push(format!("articles: empty headline for {}", a.link));
        }
        check_range("articles", "ranking", &a.link, a.ranking, 1..=99, &mut problems);
        check_range("articles", "virality", &a.link, a.virality, 30..=100, &mut problems);
        check_range("articles", "fit", &a.link, a.fit, 45..=100, &mut problems);
    }

    let social = &output.x_viral.items;
    check_len("x_viral", social.len(), config.social.target_count, &mut problems);
    check_links("x_viral", social, &mut problems);
    for s in social {
        if s.headline.is_empty() {
            problems.push(format!("x_viral: empty headline for {}", s.link));
        }
        check_range("x_viral", "score", &s.link, s.score, 0..=100, &mut problems);
    }

    let forum = &output.reddit_viral.items;
    check_len("reddit_viral", forum.len(), config.forum.target_count, &mut problems);
    check_links("reddit_viral", forum, &mut problems);
    for r in forum {
        if r.headline.is_empty() {
            problems.push(format!("reddit_viral: empty headline for {}", r.link));
        }
        let viral = r.viral_score;
        check_range("reddit_viral", "viral_score", &r.link, viral, 0..=100, &mut problems);
        if !r.subreddit.is_empty() && !output.reddit_viral.subreddits.contains(&r.subreddit) {
            problems.push(format!("reddit_viral: subreddit {} not listed", r.subreddit));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForumItem, ForumPanel, NewsItem, SocialPanel};

    fn article(link: &str, ranking: u32) -> NewsItem {
        NewsItem {
            headline: "OpenAI news".into(),
            link: link.into(),
            source: "Test".into(),
            date: "2025-06-10".into(),
            image_url: String::new(),
            ranking,
            virality: 98,
            fit: 54,
            reason: "r".into(),
        }
    }

    fn output(
        articles: Vec<NewsItem>,
        forum: Vec<ForumItem>,
        subreddits: Vec<String>,
    ) -> AggregateOutput {
        AggregateOutput {
            articles,
            x_viral: SocialPanel {
                generated_at: "2025-06-10T12:00:00+00:00".into(),
                note: "n".into(),
                items: Vec::new(),
            },
            reddit_viral: ForumPanel {
                generated_at: "2025-06-10T12:00:00+00:00".into(),
                subreddits,
                items: forum,
            },
        }
    }

    #[test]
    fn test_clean_output_has_no_problems() {
        let articles = vec![article("https://a", 70), article("https://b", 65)];
        let out = output(articles, Vec::new(), Vec::new());
        assert!(check(&out, &Config::default()).is_empty());
    }

    #[test]
    fn test_reports_duplicates_and_ranges() {
        let articles = vec![article("https://a", 70), article("https://a", 0)];
        let out = output(articles, Vec::new(), Vec::new());
        let problems = check(&out, &Config::default());
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("duplicate link https://a")));
        assert!(problems.iter().any(|p| p.contains("ranking=0")));
    }

    #[test]
    fn test_reports_oversized_section_and_unlisted_subreddit() {
        let mut config = Config::default();
        config.news.target_count = 1;
        let forum = vec![ForumItem {
            headline: "thread".into(),
            link: "https://reddit.com/r/x/1".into(),
            subreddit: "OpenAI".into(),
            published_at: None,
            score: 100,
            comments: 3,
            viral_score: 5,
        }];
        let articles = vec![article("https://a", 70), article("https://b", 65)];
        let out = output(articles, forum, Vec::new());
        let problems = check(&out, &config);
        assert!(problems.iter().any(|p| p.contains("exceeds target 1")));
        assert!(problems.iter().any(|p| p.contains("subreddit OpenAI not listed")));
    }
}
