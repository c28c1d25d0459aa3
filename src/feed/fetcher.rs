//! Per-source HTTP fetching and the aggregation pipeline.
//!
//! Every source is fetched independently: a failure (DNS, timeout,
//! non-2xx, oversized body) becomes a [`FeedError`] for that source and
//! never aborts, cancels, or delays the others. The pipeline waits for
//! all sources to settle, so total failure still returns a value — an
//! empty item list with one error per source.

use chrono::{Duration, Utc};
use futures::future;
use futures::stream::StreamExt;
use thiserror::Error;

use crate::feed::parser::parse_feed;
use crate::sources::Registry;
use crate::types::{FeedError, FetchResult, NewsItem, Source};

/// Fixed client identifier sent with every request. Several feed
/// providers reject empty or library-default user agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-request timeout.
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Response body size cap. Bounds the cost of a misbehaving feed the
/// same way the per-source item cap does.
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching one source.
///
/// These never escape the pipeline: each is flattened into a
/// [`FeedError`] naming its source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP {code}: {reason}")]
    HttpStatus { code: u16, reason: String },
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response exceeded {0} bytes")]
    ResponseTooLarge(usize),
}

/// Result of fetching one source: its items, or the error that stopped it.
#[derive(Debug)]
pub struct SourceFetch {
    pub items: Vec<NewsItem>,
    pub error: Option<FeedError>,
}

/// Builds the shared HTTP client with the fixed user agent.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Fetches and parses a single source.
///
/// Never returns an error: failures are folded into the returned
/// [`SourceFetch`], where `error` being set implies `items` is empty.
/// On success the item list is truncated to `max_items` in document
/// order.
pub async fn fetch_source(
    client: &reqwest::Client,
    source: &Source,
    max_items: usize,
) -> SourceFetch {
    match fetch_and_parse(client, source, max_items).await {
        Ok(items) => {
            tracing::debug!(source = %source.name, items = items.len(), "Fetched feed");
            SourceFetch { items, error: None }
        }
        Err(e) => {
            tracing::warn!(source = %source.name, error = %e, "Feed fetch failed");
            SourceFetch {
                items: Vec::new(),
                error: Some(FeedError {
                    source: source.name.clone(),
                    message: e.to_string(),
                }),
            }
        }
    }
}

async fn fetch_and_parse(
    client: &reqwest::Client,
    source: &Source,
    max_items: usize,
) -> Result<Vec<NewsItem>, FetchError> {
    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(&source.url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
    let xml = String::from_utf8_lossy(&bytes);

    // Malformed XML deliberately yields zero items without an error,
    // matching how a legitimately empty feed looks. ParseOutcome keeps
    // the two distinguishable if this ever needs to change.
    let mut items = parse_feed(&xml, source).into_items();
    if items.len() > max_items {
        items.truncate(max_items);
    }
    Ok(items)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Fetches every configured source concurrently and returns the merged,
/// age-filtered, recency-sorted result.
///
/// All fetches run in parallel, so wall-clock cost is bounded by the
/// slowest source, not the sum. There is no fail-fast: the pipeline
/// waits for every source to settle and reports per-source errors
/// alongside whatever items were recovered. Idempotent and safe to run
/// concurrently with itself — each call owns all of its state.
pub async fn fetch_all_news(client: &reqwest::Client, registry: &Registry) -> FetchResult {
    let fetches = registry
        .sources
        .iter()
        .map(|source| fetch_source(client, source, registry.max_items_per_source));
    let results = future::join_all(fetches).await;

    let mut items = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        items.extend(result.items);
        if let Some(error) = result.error {
            errors.push(error);
        }
    }

    let items = sort_by_date(filter_by_age(items, registry.max_age_days));
    tracing::info!(
        sources = registry.sources.len(),
        items = items.len(),
        errors = errors.len(),
        "Aggregation complete"
    );
    FetchResult { items, errors }
}

/// Drops items older than `now - max_age_days`.
fn filter_by_age(items: Vec<NewsItem>, max_age_days: i64) -> Vec<NewsItem> {
    let cutoff = Utc::now() - Duration::days(max_age_days);
    items.into_iter().filter(|i| i.published_at >= cutoff).collect()
}

/// Sorts newest-first. The sort is stable, so equal timestamps keep
/// their concatenation order.
fn sort_by_date(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items
}
