//! Error types for `Tagdex`.
//!
//! Validation failures are reported before a record reaches the index, so
//! every variant here describes input that was rejected as a whole.

use thiserror::Error;

/// Result type alias for `Tagdex` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `Tagdex` operations.
///
/// Error codes follow the pattern `TAGDEX-XXX` for easy debugging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A tag is not valid UTF-8 (TAGDEX-001).
    #[error("[TAGDEX-001] Tag #{index} is not valid UTF-8")]
    InvalidUtf8 {
        /// Position of the offending tag in its batch.
        index: usize,
    },

    /// A tag violates the `key=value` grammar (TAGDEX-002).
    #[error("[TAGDEX-002] Invalid tag format '{tag}': {reason}")]
    InvalidTagFormat {
        /// The offending tag.
        tag: String,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// Ingestion metadata of a metric is invalid (TAGDEX-003).
    #[error("[TAGDEX-003] Invalid metric: {0}")]
    InvalidMetric(String),

    /// An expression could not be constructed (TAGDEX-004).
    #[error("[TAGDEX-004] Invalid expression: {0}")]
    InvalidExpression(String),

    /// A set of expressions does not form a usable query (TAGDEX-005).
    #[error("[TAGDEX-005] Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error (TAGDEX-006).
    #[error("[TAGDEX-006] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "TAGDEX-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidUtf8 { .. } => "TAGDEX-001",
            Self::InvalidTagFormat { .. } => "TAGDEX-002",
            Self::InvalidMetric(_) => "TAGDEX-003",
            Self::InvalidExpression(_) => "TAGDEX-004",
            Self::InvalidQuery(_) => "TAGDEX-005",
            Self::Config(_) => "TAGDEX-006",
        }
    }

    /// Returns true if this error rejects an ingested record.
    ///
    /// Query and configuration errors are caller mistakes and never reach
    /// the ingestion path.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUtf8 { .. } | Self::InvalidTagFormat { .. } | Self::InvalidMetric(_)
        )
    }

    pub(crate) fn tag_format(tag: &str, reason: &'static str) -> Self {
        Self::InvalidTagFormat {
            tag: tag.to_string(),
            reason,
        }
    }
}

/// Conversion from configuration errors.
impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Conversion from regex compilation errors.
impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::InvalidExpression(err.to_string())
    }
}
