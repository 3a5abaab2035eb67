//! Splitting and ingestion configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default maximum section length, in characters.
pub const DEFAULT_MAX_SECTION_LENGTH: usize = 1000;
/// Default distance scanned past the nominal cut for a sentence ending.
pub const DEFAULT_SENTENCE_SEARCH_LIMIT: usize = 100;
/// Default number of characters repeated between consecutive sections.
pub const DEFAULT_SECTION_OVERLAP: usize = 100;
/// Default number of sections handed to a sink per upload.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Thresholds for the boundary scanner. All lengths count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub max_section_length: usize,
    pub sentence_search_limit: usize,
    pub section_overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_section_length: DEFAULT_MAX_SECTION_LENGTH,
            sentence_search_limit: DEFAULT_SENTENCE_SEARCH_LIMIT,
            section_overlap: DEFAULT_SECTION_OVERLAP,
        }
    }
}

impl SplitConfig {
    pub fn new(
        max_section_length: usize,
        sentence_search_limit: usize,
        section_overlap: usize,
    ) -> Result<Self> {
        let config = Self {
            max_section_length,
            sentence_search_limit,
            section_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds under which the scanner could not make forward progress.
    pub fn validate(&self) -> Result<()> {
        if self.max_section_length <= self.section_overlap {
            return Err(Error::InvalidInput(format!(
                "max_section_length ({}) must be greater than section_overlap ({})",
                self.max_section_length, self.section_overlap
            )));
        }
        Ok(())
    }
}

/// Per-run ingestion settings: scanner thresholds plus the values stamped on
/// every section and the sink batch size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    #[serde(flatten)]
    pub split: SplitConfig,
    /// Opaque value copied into every section's `category` field.
    pub category: Option<String>,
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            split: SplitConfig::default(),
            category: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl IngestConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::debug!("Loaded ingest configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SplitConfig::default();
        assert_eq!(config.max_section_length, 1000);
        assert_eq!(config.sentence_search_limit, 100);
        assert_eq!(config.section_overlap, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_section() {
        assert!(matches!(
            SplitConfig::new(100, 10, 100),
            Err(Error::InvalidInput(_))
        ));
        assert!(SplitConfig::new(101, 10, 100).is_ok());
    }

    #[test]
    fn test_ingest_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prepdocs.json");
        std::fs::write(&path, r#"{"max_section_length": 500, "category": "manuals"}"#).unwrap();

        let config = IngestConfig::from_file(&path).unwrap();
        assert_eq!(config.split.max_section_length, 500);
        assert_eq!(config.split.section_overlap, DEFAULT_SECTION_OVERLAP);
        assert_eq!(config.category.as_deref(), Some("manuals"));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_ingest_config_rejects_zero_batch() {
        let config = IngestConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
