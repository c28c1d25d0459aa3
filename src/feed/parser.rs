//! Feed body parsing: dialect detection, item extraction, validation.
//!
//! Pure code — no I/O. One feed body plus its [`Source`] goes in, zero
//! or more [`NewsItem`]s come out. Malformed or unrecognized documents
//! never error: they yield [`ParseOutcome::Unrecognized`], which the
//! pipeline currently treats the same as an empty feed.

use chrono::{DateTime, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use crate::feed::xml::{extract_link, extract_text, parse_document, XmlNode};
use crate::types::{NewsItem, Source};
use crate::util::{strip_html, truncate};

/// Summary length bound, in characters, after HTML stripping.
const SUMMARY_MAX_CHARS: usize = 200;

/// Minimum title length; shorter titles are junk in practice.
const MIN_TITLE_CHARS: usize = 5;

/// Hex characters kept from the SHA-256 digest for item ids.
const ID_LEN: usize = 16;

/// Outcome of parsing one feed body.
///
/// Keeps "parsed, possibly empty" distinguishable from "not a feed at
/// all". The pipeline collapses both to zero items today, but call
/// sites that want to surface malformed feeds later can match on this
/// without any signature change.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The document matched a known dialect. Zero items means a
    /// legitimately empty feed.
    Parsed(Vec<NewsItem>),
    /// The document could not be read as RSS or Atom.
    Unrecognized,
}

impl ParseOutcome {
    /// Items on success, empty on an unrecognized document.
    pub fn into_items(self) -> Vec<NewsItem> {
        match self {
            ParseOutcome::Parsed(items) => items,
            ParseOutcome::Unrecognized => Vec::new(),
        }
    }
}

/// Parses one feed body into canonical items, in document order.
///
/// Dialect is detected structurally, never from a version attribute:
/// a `channel` child means RSS (`channel > item*`), a root named `feed`
/// means Atom (`feed > entry*`). Items are pre-sort and pre-cap; the
/// fetcher applies the per-source cap and the pipeline sorts globally.
pub fn parse_feed(xml: &str, source: &Source) -> ParseOutcome {
    let Some(root) = parse_document(xml) else {
        tracing::debug!(source = %source.name, "Feed body is not well-formed XML");
        return ParseOutcome::Unrecognized;
    };

    if let Some(channel) = root.child("channel") {
        let items = channel
            .children
            .iter()
            .filter(|n| n.name == "item")
            .filter_map(|n| rss_item(n, source))
            .collect();
        return ParseOutcome::Parsed(items);
    }

    if root.name == "feed" {
        let entries = root
            .children
            .iter()
            .filter(|n| n.name == "entry")
            .filter_map(|n| atom_entry(n, source))
            .collect();
        return ParseOutcome::Parsed(entries);
    }

    tracing::debug!(source = %source.name, root = %root.name, "Unrecognized feed dialect");
    ParseOutcome::Unrecognized
}

/// One RSS 2.0 `<item>`: `title`, `link` (plain text), `pubDate`, and
/// `content:encoded` preferred over `description` for the summary.
fn rss_item(item: &XmlNode, source: &Source) -> Option<NewsItem> {
    let title = strip_html(&extract_text(&item.field("title")));
    let url = extract_link(&item.field("link")).unwrap_or_default();
    let published = parse_date(&extract_text(&item.field("pubDate")));
    let rich = extract_text(&item.field("content:encoded"));
    let plain = extract_text(&item.field("description"));
    build_item(title, url, published, &rich, &plain, source)
}

/// One Atom `<entry>`: `title`, `link*` (href attribute), `published`
/// falling back to `updated`, and `content` preferred over `summary`.
fn atom_entry(entry: &XmlNode, source: &Source) -> Option<NewsItem> {
    let title = strip_html(&extract_text(&entry.field("title")));
    let url = extract_link(&entry.field("link")).unwrap_or_default();
    let published = parse_date(&extract_text(&entry.field("published")))
        .or_else(|| parse_date(&extract_text(&entry.field("updated"))));
    let rich = extract_text(&entry.field("content"));
    let plain = extract_text(&entry.field("summary"));
    build_item(title, url, published, &rich, &plain, source)
}

/// Validates one extracted item and assembles the canonical shape.
///
/// Drop rules, applied in order: empty title, empty link, no parseable
/// date, title equal to "comments" (a link-aggregator discussion link,
/// not an article), title under 5 characters.
fn build_item(
    title: String,
    url: String,
    published: Option<DateTime<Utc>>,
    rich: &str,
    plain: &str,
    source: &Source,
) -> Option<NewsItem> {
    if title.is_empty() {
        return None;
    }
    if url.is_empty() {
        return None;
    }
    let published_at = published?;
    if title.eq_ignore_ascii_case("comments") {
        return None;
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return None;
    }

    let stripped_rich = strip_html(rich);
    let summary_source = if stripped_rich.is_empty() {
        strip_html(plain)
    } else {
        stripped_rich
    };

    Some(NewsItem {
        id: generate_id(&url, &source.name),
        title,
        summary: truncate(&summary_source, SUMMARY_MAX_CHARS),
        source: source.name.clone(),
        url,
        published_at,
        category: source.category,
    })
}

/// Derives a short, stable item id from the article URL and source name.
///
/// Pure function: the same `(url, source)` pair always yields the same
/// id across runs, which is what makes items deduplicable downstream.
/// Both fields feed the digest so the same article syndicated by two
/// sources keeps two distinct ids.
pub fn generate_id(url: &str, source_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"|");
    hasher.update(source_name.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{:x}", digest);
    hex[..ID_LEN].to_string()
}

/// Parses a feed date string, accepting RFC 2822 (`pubDate`) and
/// ISO-8601/RFC 3339 (`published`/`updated`), plus the offset-less
/// ISO form some feeds emit (assumed UTC). Anything else is `None`
/// and the item is dropped.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Feeds routinely emit a weekday that contradicts the date, which
    // chrono rejects. The weekday is optional in RFC 2822, so retry
    // with it removed.
    if let Some((_, tail)) = raw.split_once(',') {
        if let Ok(dt) = DateTime::parse_from_rfc2822(tail.trim()) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}
