//! DocGraph Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults for every extraction limit and threshold.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Extraction pipeline configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    ///
    /// Every variable that is set wins, even when it repeats the default.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = env_parse::<usize>("DOCGRAPH_MAX_PAGES")? {
            self.extraction.limits.max_pages = value;
        }
        if let Some(value) = env_parse::<usize>("DOCGRAPH_MAX_CONCEPTS")? {
            self.extraction.limits.max_concepts = value;
        }
        if let Some(value) = env_parse::<usize>("DOCGRAPH_MAX_RELATIONSHIPS")? {
            self.extraction.limits.max_relationships = value;
        }

        // Logging
        if let Ok(level) = std::env::var("DOCGRAPH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = env_parse::<bool>("DOCGRAPH_LOG_JSON")? {
            self.logging.json_format = json;
        }

        Ok(self)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Hard resource bounds
    pub limits: LimitsConfig,

    /// Section classification
    pub sections: SectionConfig,

    /// Concept candidate generation
    pub candidates: CandidateConfig,

    /// Relationship extraction
    pub relationships: RelationshipConfig,
}

impl ExtractionConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        };

        if self.limits.max_pages == 0 {
            return Err(invalid("extraction.limits.max_pages", "0".to_string()));
        }
        if self.candidates.window_words == 0 {
            return Err(invalid("extraction.candidates.window_words", "0".to_string()));
        }
        let min_strength = self.relationships.min_strength;
        if !(0.0..=1.0).contains(&min_strength) {
            return Err(invalid(
                "extraction.relationships.min_strength",
                min_strength.to_string(),
            ));
        }
        Ok(())
    }
}

/// Hard bounds that keep one extraction call bounded in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Pages processed per document
    pub max_pages: usize,

    /// Candidates accepted before post-processing
    pub max_raw_candidates: usize,

    /// Concepts kept after diversity selection
    pub max_concepts: usize,

    /// Relationships kept after deduplication
    pub max_relationships: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_raw_candidates: 150,
            max_concepts: 80,
            max_relationships: 100,
        }
    }
}

/// Section classifier thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SectionConfig {
    /// Spans above this size are headings
    pub large_font_size: f32,

    /// Bold spans above this size are headings
    pub medium_font_size: f32,

    /// Spans longer than this are never headings
    pub max_heading_chars: usize,

    /// Maximum section body length in characters
    pub content_char_cap: usize,

    /// Length of the synthetic section used when no heading is found
    pub fallback_content_chars: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            large_font_size: 16.0,
            medium_font_size: 14.0,
            max_heading_chars: 150,
            content_char_cap: 2000,
            fallback_content_chars: 1000,
        }
    }
}

/// Candidate generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CandidateConfig {
    /// Words per scan window (windows overlap by half)
    pub window_words: usize,

    /// Pages shorter than this are not scanned for patterns
    pub min_page_chars: usize,

    /// Characters of context kept on each side of a match
    pub context_chars: usize,

    /// Section titles with more words are not concepts
    pub max_heading_words: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            window_words: 800,
            min_page_chars: 100,
            context_chars: 200,
            max_heading_words: 8,
        }
    }
}

/// Relationship extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelationshipConfig {
    /// How far before a relation phrase the source concept is searched
    pub source_window_chars: usize,

    /// Co-occurrence distance for proximity relationships
    pub proximity_window_chars: usize,

    /// Concepts further apart (in pages) are never proximity-linked
    pub max_page_gap: u32,

    /// Relationships weaker than this are discarded
    pub min_strength: f32,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            source_window_chars: 300,
            proximity_window_chars: 200,
            max_page_gap: 3,
            min_strength: 0.3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.limits.max_pages, 50);
        assert_eq!(config.extraction.limits.max_raw_candidates, 150);
        assert_eq!(config.extraction.limits.max_concepts, 80);
        assert_eq!(config.extraction.limits.max_relationships, 100);
        assert_eq!(config.extraction.candidates.window_words, 800);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [extraction.limits]
            max_concepts = 20

            [logging]
            json_format = true
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.limits.max_concepts, 20);
        assert_eq!(config.extraction.limits.max_pages, 50);
        assert_eq!(config.extraction.relationships.min_strength, 0.3);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[extraction.limits]\nmax_pages = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        assert!(ExtractionConfig::default().validate().is_ok());

        let mut config = ExtractionConfig::default();
        config.relationships.min_strength = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key.ends_with("min_strength")));

        let mut config = ExtractionConfig::default();
        config.candidates.window_words = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_equal_to_default_still_overrides_file() {
        let file = AppConfig::from_toml_str("[extraction.limits]\nmax_relationships = 10").unwrap();
        assert_eq!(file.extraction.limits.max_relationships, 10);

        std::env::set_var("DOCGRAPH_MAX_RELATIONSHIPS", "100");
        let merged = file.with_env_override();
        std::env::remove_var("DOCGRAPH_MAX_RELATIONSHIPS");

        assert_eq!(merged.unwrap().extraction.limits.max_relationships, 100);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/docgraph.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
