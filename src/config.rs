//! Optional TOML file overriding the built-in source registry.
//!
//! A deployment can point `--sources` at a file like:
//!
//! ```toml
//! max_age_days = 3
//! max_items_per_source = 10
//!
//! [[sources]]
//! name = "Example"
//! url = "https://example.com/feed.xml"
//! category = "dev"
//! ```
//!
//! A missing file yields `Registry::default()`; any omitted key falls
//! back to the built-in value, and an empty `sources` array falls back
//! to the built-in source list.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::sources::{default_sources, Registry, MAX_AGE_DAYS, MAX_ITEMS_PER_SOURCE};
use crate::types::Source;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read sources file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in sources file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Sources file exceeds maximum allowed size.
    #[error("Sources file too large: {0}")]
    TooLarge(String),
}

/// Maximum sources file size (1 MB).
const MAX_FILE_SIZE: u64 = 1_048_576;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RegistryFile {
    max_age_days: i64,
    max_items_per_source: usize,
    sources: Vec<Source>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self {
            max_age_days: MAX_AGE_DAYS,
            max_items_per_source: MAX_ITEMS_PER_SOURCE,
            sources: Vec::new(),
        }
    }
}

/// Loads a registry from a TOML file.
///
/// - Missing file → `Ok(Registry::default())`
/// - Empty file → `Ok(Registry::default())`
/// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
/// - No `[[sources]]` entries → built-in source list with file tunables
pub fn load_registry(path: &Path) -> Result<Registry, ConfigError> {
    // Check file size before reading to bound memory use on a corrupted file
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_FILE_SIZE => {
            return Err(ConfigError::TooLarge(format!(
                "Sources file is {} bytes (max {} bytes)",
                meta.len(),
                MAX_FILE_SIZE
            )));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No sources file found, using defaults");
            return Ok(Registry::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
        Ok(_) => {}
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // Race: file deleted between metadata and read
            tracing::debug!(path = %path.display(), "Sources file disappeared, using defaults");
            return Ok(Registry::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    if content.trim().is_empty() {
        tracing::debug!(path = %path.display(), "Sources file is empty, using defaults");
        return Ok(Registry::default());
    }

    let file: RegistryFile = toml::from_str(&content)?;
    let sources = if file.sources.is_empty() {
        default_sources()
    } else {
        file.sources
    };

    tracing::info!(
        path = %path.display(),
        sources = sources.len(),
        max_age_days = file.max_age_days,
        "Loaded source registry"
    );
    Ok(Registry {
        sources,
        max_age_days: file.max_age_days,
        max_items_per_source: file.max_items_per_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newswire_test_nonexistent_sources.toml");
        let registry = load_registry(path).unwrap();
        assert_eq!(registry.sources.len(), 9);
        assert_eq!(registry.max_age_days, 5);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("newswire_sources_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");
        std::fs::write(&path, "").unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.sources.len(), 9);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_tunables_only_keeps_builtin_sources() {
        let dir = std::env::temp_dir().join("newswire_sources_test_tunables");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");
        std::fs::write(&path, "max_age_days = 2\nmax_items_per_source = 7\n").unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.max_age_days, 2);
        assert_eq!(registry.max_items_per_source, 7);
        assert_eq!(registry.sources.len(), 9);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_registry_file() {
        let dir = std::env::temp_dir().join("newswire_sources_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");

        let content = r#"
max_age_days = 3

[[sources]]
name = "Custom Feed"
url = "https://custom.example.com/rss"
category = "ai"
"#;
        std::fs::write(&path, content).unwrap();

        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.max_age_days, 3);
        assert_eq!(registry.max_items_per_source, 20); // default
        assert_eq!(registry.sources.len(), 1);
        assert_eq!(registry.sources[0].name, "Custom Feed");
        assert_eq!(registry.sources[0].category, Category::Ai);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("newswire_sources_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = load_registry(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_category_returns_error() {
        let dir = std::env::temp_dir().join("newswire_sources_test_badcat");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");
        std::fs::write(
            &path,
            "[[sources]]\nname = \"X\"\nurl = \"https://x.com\"\ncategory = \"sports\"\n",
        )
        .unwrap();

        let result = load_registry(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("newswire_sources_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sources.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let result = load_registry(&path);
        assert!(matches!(result, Err(ConfigError::TooLarge(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
