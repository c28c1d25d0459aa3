//! Feed aggregation: fetching, parsing, and merging RSS/Atom sources.
//!
//! The module is organized into three submodules:
//!
//! - `xml` - Tolerant XML decoding into a generic element tree
//! - `parser` - Dialect detection, item extraction, and validation
//! - `fetcher` - Concurrent HTTP retrieval and the aggregation pipeline
//!
//! Control flow: registry → fetcher (N concurrent requests) → parser
//! (per response) → merge/filter/sort → [`crate::types::FetchResult`].

mod fetcher;
mod parser;
mod xml;

pub use fetcher::{build_client, fetch_all_news, fetch_source, FetchError, SourceFetch, USER_AGENT};
pub use parser::{generate_id, parse_date, parse_feed, ParseOutcome};
