//! `Tagdex` Configuration Module
//!
//! Provides configuration file support via `tagdex.toml`, environment variables,
//! and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (API)
//! 2. Environment variables (`TAGDEX_*`)
//! 3. Configuration file (`tagdex.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Tag validation limits applied at ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum length of a single `key=value` tag in bytes (0 = unlimited).
    pub max_tag_length: usize,
    /// Maximum number of tags per series (0 = unlimited).
    pub max_tags: usize,
}

/// Tag query configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum accepted length of a regex pattern.
    pub max_regex_pattern_len: usize,
    /// Size limit handed to the regex compiler, in bytes.
    pub regex_size_limit: usize,
    /// Maximum number of expressions in one query.
    pub max_expressions: usize,
    /// Reject queries where no expression requires a non-empty value.
    ///
    /// Such a query cannot be answered from the postings of any single tag
    /// and would need a full index scan.
    pub require_selecting_expression: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_regex_pattern_len: 256,
            regex_size_limit: 1 << 20,
            max_expressions: 64,
            require_selecting_expression: true,
        }
    }
}

/// Logging configuration section.
///
/// The library only emits `tracing` events; the embedding process installs the
/// subscriber and reads these values to configure it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main `Tagdex` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TagdexConfig {
    /// Tag validation configuration.
    pub validation: ValidationConfig,
    /// Tag query configuration.
    pub query: QueryConfig,
    /// Logging configuration, consumed by the embedding binary when it
    /// installs its `tracing` subscriber; the library only validates it.
    pub logging: LoggingConfig,
}

impl TagdexConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("tagdex.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("TAGDEX_").split("__").lowercase(true));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.max_regex_pattern_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "query.max_regex_pattern_len".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.query.regex_size_limit < 1024 {
            return Err(ConfigError::InvalidValue {
                key: "query.regex_size_limit".to_string(),
                message: format!(
                    "value {} must be >= 1024",
                    self.query.regex_size_limit
                ),
            });
        }

        if self.query.max_expressions == 0 || self.query.max_expressions > 1024 {
            return Err(ConfigError::InvalidValue {
                key: "query.max_expressions".to_string(),
                message: format!(
                    "value {} is out of range [1, 1024]",
                    self.query.max_expressions
                ),
            });
        }

        // "a=b" is the shortest tag that can ever validate
        if self.validation.max_tag_length != 0 && self.validation.max_tag_length < 3 {
            return Err(ConfigError::InvalidValue {
                key: "validation.max_tag_length".to_string(),
                message: format!(
                    "value {} must be 0 (unlimited) or >= 3",
                    self.validation.max_tag_length
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
