//! Core data shapes shared across the crate.
//!
//! Everything here is a plain value: constructed fresh per aggregation
//! call, serializable for the `--json` output path, and free of any
//! behavior beyond display/parsing glue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of source categories.
///
/// Every configured source is assigned exactly one category, and every
/// item inherits its source's category verbatim. The set is closed on
/// purpose: downstream rendering keys off these four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Dev,
    Ai,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::Dev => "dev",
            Category::Ai => "ai",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category string is not one of the closed set.
#[derive(Debug, Clone, Error)]
#[error("unknown category '{0}' (expected tech, dev, ai or general)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tech" => Ok(Category::Tech),
            "dev" => Ok(Category::Dev),
            "ai" => Ok(Category::Ai),
            "general" => Ok(Category::General),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// One configured external feed.
///
/// Immutable config data, loaded once at startup. `name` doubles as the
/// per-source branding/dedup key downstream, so it must be unique within
/// a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub category: Category,
}

/// The normalized article representation produced regardless of feed dialect.
///
/// Invariants (enforced by the parser, relied on by consumers):
/// - `title`, `url` and `source` are non-empty
/// - `title` is HTML-stripped and at least 5 characters
/// - `summary` is HTML-stripped and truncated to a fixed bound
/// - `id` is a pure function of `(url, source)` — stable across runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub category: Category,
}

/// A per-source failure record. Never aborts aggregation; the pipeline
/// collects one of these for each source that failed to fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedError {
    pub source: String,
    pub message: String,
}

/// The sole externally visible output of the aggregation pipeline.
///
/// `items` is sorted by `published_at` descending and contains nothing
/// older than the configured age cutoff. `errors` holds one entry per
/// failed source, in no particular order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchResult {
    pub items: Vec<NewsItem>,
    pub errors: Vec<FeedError>,
}
