//! Built-in source registry and its tunables.
//!
//! The source list is static configuration data, not logic: it is an
//! input to the pipeline, passed explicitly rather than read from a
//! module-level singleton. A deployment can replace it via a TOML file
//! (see [`crate::config`]) without touching any pipeline code.

use crate::types::{Category, Source};

/// Maximum age of news items in days.
pub const MAX_AGE_DAYS: i64 = 5;

/// Maximum items retained per source.
pub const MAX_ITEMS_PER_SOURCE: usize = 20;

/// The source list plus the two aggregation tunables.
///
/// Carried by value through the pipeline so tests (and alternate
/// deployments) can substitute their own sources and limits.
#[derive(Debug, Clone)]
pub struct Registry {
    pub sources: Vec<Source>,
    pub max_age_days: i64,
    pub max_items_per_source: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            max_age_days: MAX_AGE_DAYS,
            max_items_per_source: MAX_ITEMS_PER_SOURCE,
        }
    }
}

fn source(name: &str, url: &str, category: Category) -> Source {
    Source {
        name: name.to_string(),
        url: url.to_string(),
        category,
    }
}

/// The nine production feeds.
pub fn default_sources() -> Vec<Source> {
    vec![
        source("Hacker News", "https://news.ycombinator.com/rss", Category::Tech),
        source("AP", "https://feedx.net/rss/ap.xml", Category::General),
        source(
            "BBC Tech",
            "https://feeds.bbci.co.uk/news/technology/rss.xml",
            Category::Tech,
        ),
        source("NPR News", "https://feeds.npr.org/1001/rss.xml", Category::General),
        source("NPR Tech", "https://feeds.npr.org/1019/rss.xml", Category::Tech),
        source(
            "DR Nyheder",
            "https://www.dr.dk/nyheder/service/feeds/allenyheder",
            Category::General,
        ),
        source(
            "MIT Tech AI",
            "https://www.technologyreview.com/topic/artificial-intelligence/feed",
            Category::Ai,
        ),
        source(
            "VentureBeat AI",
            "https://venturebeat.com/category/ai/feed/",
            Category::Ai,
        ),
        source("VS Code", "https://code.visualstudio.com/feed.xml", Category::Dev),
    ]
}
