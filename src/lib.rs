//! newswire aggregates items from a fixed set of external RSS/Atom
//! feeds, normalizes them into one canonical item shape, and returns a
//! ranked, age-filtered result even when some feeds fail or return
//! malformed XML.
//!
//! The single entry point is [`fetch_all_news`]: it fans out one HTTP
//! request per configured source, parses each response tolerantly, and
//! merges everything into a [`FetchResult`] carrying both the sorted
//! items and a per-source error list. A failing source degrades
//! completeness of the result, never correctness — nothing in this
//! crate is a fatal condition.

pub mod config;
pub mod feed;
pub mod sources;
pub mod types;
pub mod util;

pub use feed::{build_client, fetch_all_news};
pub use sources::Registry;
pub use types::{Category, FeedError, FetchResult, NewsItem, Source};
