//! Tolerant field extraction for syndication markup.
//!
//! Feeds in the wild mix RSS 2.0, Atom and assorted namespaces, and plenty of
//! them are not well-formed. Instead of a strict XML parser this module
//! segments a document into `<item>`/`<entry>` blocks and pulls each field
//! with an ordered list of regex alternatives: the first alternative with a
//! non-empty capture wins.
//!
//! Article pages (for preview image lookup) are real HTML and go through
//! `scraper` instead.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static RE_ITEM: Lazy<Regex> = Lazy::new(|| re(r"(?i)<item[\s\S]*?</item>"));
static RE_ENTRY: Lazy<Regex> = Lazy::new(|| re(r"(?i)<entry[\s\S]*?</entry>"));
static RE_CDATA: Lazy<Regex> = Lazy::new(|| re(r"(?s)<!\[CDATA\[(.*?)\]\]>"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| re(r"<[^>]+>"));
static RE_WS: Lazy<Regex> = Lazy::new(|| re(r"\s+"));

/// `<title>` text, attributes allowed.
pub static TITLE: Lazy<Vec<Regex>> = Lazy::new(|| vec![re(r"(?is)<title[^>]*>(.*?)</title>")]);

/// RSS text link first, then the Atom `href` form.
pub static LINK: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        re(r"(?is)<link>(.*?)</link>"),
        re(r#"(?is)<link[^>]*href=["']([^"']+)["']"#),
    ]
});

/// RSS `pubDate`, then Atom `published`, then Atom `updated`.
pub static DATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        re(r"(?is)<pubDate>(.*?)</pubDate>"),
        re(r"(?is)<published>(.*?)</published>"),
        re(r"(?is)<updated>(.*?)</updated>"),
    ]
});

static IMAGE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        re(r#"(?is)<media:content[^>]*url=["']([^"']+)["']"#),
        re(r#"(?is)<enclosure[^>]*url=["']([^"']+)["']"#),
        re(r#"(?is)<media:thumbnail[^>]*url=["']([^"']+)["']"#),
        re(r#"(?is)<img[^>]*src=["']([^"']+)["']"#),
    ]
});

/// Unwrap CDATA, strip tags, decode entities and collapse whitespace.
///
/// Decoding runs after stripping, so escaped text such as `&lt;50%` comes out
/// as a literal `<50%`.
pub fn clean(raw: &str) -> String {
    let unwrapped = RE_CDATA.replace_all(raw, "$1");
    let stripped = RE_TAG.replace_all(&unwrapped, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}

/// Return the cleaned capture of the first pattern that matches with a
/// non-empty group.
pub fn extract_first(block: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|p| {
        p.captures(block)
            .and_then(|c| c.get(1))
            .filter(|m| !m.as_str().is_empty())
            .map(|m| clean(m.as_str()))
    })
}

/// Split a feed into RSS `<item>` blocks followed by Atom `<entry>` blocks.
pub fn segment_blocks(doc: &str) -> Vec<&str> {
    RE_ITEM
        .find_iter(doc)
        .chain(RE_ENTRY.find_iter(doc))
        .map(|m| m.as_str())
        .collect()
}

/// Parse a feed timestamp.
///
/// Tries ISO-8601 (RFC 3339, then a colon-less offset form) and two
/// RFC-822 style layouts. ISO-8601 without any offset is taken as UTC.
/// Returns `None` when none of them fit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .or_else(|_| DateTime::parse_from_str(s, "%a, %d %b %Y %H:%M:%S %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Accept only absolute http(s) raster image URLs.
fn usable_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http") && !lower.ends_with(".svg")
}

/// Pick the first usable image referenced by a feed block.
///
/// Candidates are tried in order (`media:content`, `enclosure`,
/// `media:thumbnail`, inline `<img>`); a rejected candidate falls through to
/// the next one.
pub fn extract_image(block: &str) -> Option<String> {
    IMAGE.iter().find_map(|p| {
        p.captures(block)
            .and_then(|c| c.get(1))
            .map(|m| html_escape::decode_html_entities(m.as_str().trim()).to_string())
            .filter(|u| usable_image(u))
    })
}

/// Scan an article page for its preview image.
///
/// Looks at `og:image`, then `twitter:image`, then `<link rel="image_src">`.
/// Relative URLs are resolved against `page_url`.
pub fn preview_image(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let candidates = [
        (r#"meta[property="og:image"]"#, "content"),
        (r#"meta[name="twitter:image"]"#, "content"),
        (r#"link[rel="image_src"]"#, "href"),
    ];

    candidates.iter().find_map(|(css, attr)| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .filter_map(|v| match &base {
                Some(b) => b.join(v).ok().map(|u| u.to_string()),
                None => Url::parse(v).ok().map(|u| u.to_string()),
            })
            .find(|u| usable_image(u))
    })
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Count how many terms occur in the lower-cased text.
pub fn count_hits(text_lower: &str, terms: &[String]) -> u32 {
    terms
        .iter()
        .filter(|t| text_lower.contains(t.to_lowercase().as_str()))
        .count() as u32
}
