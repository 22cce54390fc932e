//! Taxo Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults matching the upstream feature extraction conventions. The
//! resulting `AppConfig` is built once per run and passed explicitly to the
//! parsers and extractors; nothing here is global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest inter-term gap the predicate pivot table covers
pub const MAX_PIVOT_GAP: usize = 6;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Term import thresholds
    pub import: ImportConfig,

    /// Feature vector layout
    pub features: FeatureConfig,

    /// Relation building parameters
    pub relations: RelationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("TAXO_MIN_SCORE") {
            config.import.min_score = parse_var("TAXO_MIN_SCORE", value)?;
        }
        if let Ok(value) = std::env::var("TAXO_MIN_COUNT") {
            config.import.min_count = parse_var("TAXO_MIN_COUNT", value)?;
        }
        if let Ok(value) = std::env::var("TAXO_WINDOW_WIDTH") {
            config.relations.window_width = parse_var("TAXO_WINDOW_WIDTH", value)?;
        }
        if let Ok(value) = std::env::var("TAXO_MAX_PREDICATE_GAP") {
            config.relations.max_predicate_gap = parse_var("TAXO_MAX_PREDICATE_GAP", value)?;
        }
        if let Ok(value) = std::env::var("TAXO_PRUNE") {
            config.relations.prune = parse_var("TAXO_PRUNE", value)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(value) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", value)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.import.min_score != defaults.import.min_score {
            self.import.min_score = env_config.import.min_score;
        }
        if env_config.import.min_count != defaults.import.min_count {
            self.import.min_count = env_config.import.min_count;
        }
        if env_config.relations.window_width != defaults.relations.window_width {
            self.relations.window_width = env_config.relations.window_width;
        }
        if env_config.relations.max_predicate_gap != defaults.relations.max_predicate_gap {
            self.relations.max_predicate_gap = env_config.relations.max_predicate_gap;
        }
        if env_config.relations.prune != defaults.relations.prune {
            self.relations.prune = env_config.relations.prune;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != defaults.logging.json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        Ok(self)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.import.min_score.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "import.min_score".to_string(),
                value: self.import.min_score.to_string(),
            });
        }
        if self.relations.window_width < 2 {
            return Err(ConfigError::InvalidValue {
                key: "relations.window_width".to_string(),
                value: self.relations.window_width.to_string(),
            });
        }
        if self.relations.max_predicate_gap > MAX_PIVOT_GAP {
            return Err(ConfigError::InvalidValue {
                key: "relations.max_predicate_gap".to_string(),
                value: self.relations.max_predicate_gap.to_string(),
            });
        }
        if self.features.token_separator.is_empty() {
            return Err(ConfigError::MissingRequired(
                "features.token_separator".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Thresholds applied when importing the term table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Minimum technology score
    pub min_score: f32,

    /// Minimum occurrence count
    pub min_count: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            min_count: 2,
        }
    }
}

/// Names of the context features and token conventions of the feature table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Token span of the term in its sentence, formatted `start-end`
    pub sentence_location: String,

    /// The three tokens before the term
    pub prev_tokens: String,

    /// The three tokens after the term
    pub next_tokens: String,

    /// Verb preceding the term
    pub prev_verb: String,

    /// Containing sentence or unit of the term
    pub unit_location: String,

    /// Filler used in token windows at sentence boundaries
    pub boundary_marker: String,

    /// Separator joining tokens inside one feature value
    pub token_separator: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sentence_location: "sent_loc".to_string(),
            prev_tokens: "prev_n3".to_string(),
            next_tokens: "next_n3".to_string(),
            prev_verb: "prev_V".to_string(),
            unit_location: "doc_loc".to_string(),
            boundary_marker: "^".to_string(),
            token_separator: "_".to_string(),
        }
    }
}

/// Relation building parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Number of vectors in view at once
    pub window_width: usize,

    /// Largest token gap for which a predicate is searched
    pub max_predicate_gap: usize,

    /// Drop weak co-occurrences of highly connected terms
    pub prune: bool,

    /// Partner count from which a term's co-occurrences are pruned
    pub prune_min_partners: usize,

    /// Co-occurrences below this count are pruned
    pub prune_min_count: u32,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            window_width: 2,
            max_predicate_gap: MAX_PIVOT_GAP,
            prune: false,
            prune_min_partners: 25,
            prune_min_count: 3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
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

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigError> for crate::TaxoError {
    fn from(err: ConfigError) -> Self {
        crate::TaxoError::ConfigError(err.to_string())
    }
}
