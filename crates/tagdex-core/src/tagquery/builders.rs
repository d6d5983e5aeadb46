//! Builder methods for creating Expression instances.

use regex::{Regex, RegexBuilder};

use super::{Expression, Operator};
use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::schema::{key_violation, NAME_TAG_KEY};

impl Expression {
    /// Creates a normalized expression with default query limits.
    ///
    /// `key=` becomes an absence check and `key!=` a presence check. Since
    /// every series has a name, asking for its absence yields `MatchNone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] for a key no valid tag can carry,
    /// a value given to a presence or absence check, an oversized or invalid
    /// pattern, or a `MatchNone` request.
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(key, operator, value, &QueryConfig::default())
    }

    /// Like [`Expression::new`] with explicit regex limits.
    ///
    /// # Errors
    ///
    /// Same as [`Expression::new`].
    pub fn with_config(
        key: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        config: &QueryConfig,
    ) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if let Some(reason) = key_violation(&key) {
            return Err(Error::InvalidExpression(format!(
                "'{key}{operator}{value}': {reason}"
            )));
        }

        let expr = match operator {
            Operator::Presence | Operator::Absence if !value.is_empty() => {
                return Err(Error::InvalidExpression(format!(
                    "'{key}': {operator:?} takes no value, got '{value}'"
                )));
            }
            Operator::Equal if !value.is_empty() => Self::equal(key, value),
            Operator::Equal | Operator::Absence if key == NAME_TAG_KEY => {
                Self::match_none(key, value, operator)
            }
            Operator::Equal | Operator::Absence => Self::absence(key),
            Operator::NotEqual if !value.is_empty() => Self::not_equal(key, value),
            Operator::NotEqual | Operator::Presence => Self::presence(key),
            Operator::Match => {
                let re = compile_pattern(&value, config)?;
                Self::Match { key, value, re }
            }
            Operator::NotMatch => {
                let re = compile_pattern(&value, config)?;
                Self::NotMatch { key, value, re }
            }
            Operator::MatchNone => {
                return Err(Error::InvalidExpression(format!(
                    "'{key}': match-none cannot be requested directly"
                )));
            }
        };
        Ok(expr)
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a not-equal expression.
    #[must_use]
    pub fn not_equal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotEqual {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a pattern match expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if the pattern does not compile.
    pub fn matches(key: impl Into<String>, pattern: impl Into<String>) -> Result<Self> {
        let value = pattern.into();
        let re = compile_pattern(&value, &QueryConfig::default())?;
        Ok(Self::Match {
            key: key.into(),
            value,
            re,
        })
    }

    /// Creates a negated pattern match expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if the pattern does not compile.
    pub fn not_matches(key: impl Into<String>, pattern: impl Into<String>) -> Result<Self> {
        let value = pattern.into();
        let re = compile_pattern(&value, &QueryConfig::default())?;
        Ok(Self::NotMatch {
            key: key.into(),
            value,
            re,
        })
    }

    /// Creates a tag presence expression.
    #[must_use]
    pub fn presence(key: impl Into<String>) -> Self {
        Self::Presence { key: key.into() }
    }

    /// Creates a tag absence expression.
    #[must_use]
    pub fn absence(key: impl Into<String>) -> Self {
        Self::Absence { key: key.into() }
    }

    /// Creates an unsatisfiable expression remembering what was requested.
    #[must_use]
    pub fn match_none(
        key: impl Into<String>,
        value: impl Into<String>,
        original_operator: Operator,
    ) -> Self {
        Self::MatchNone {
            key: key.into(),
            value: value.into(),
            original_operator,
        }
    }
}

/// Compiles a tag pattern anchored at the start of the value.
fn compile_pattern(pattern: &str, config: &QueryConfig) -> Result<Regex> {
    if pattern.len() > config.max_regex_pattern_len {
        return Err(Error::InvalidExpression(format!(
            "pattern length {} exceeds limit {}",
            pattern.len(),
            config.max_regex_pattern_len
        )));
    }

    let anchored = if pattern.starts_with('^') {
        pattern.to_string()
    } else {
        format!("^(?:{pattern})")
    };

    RegexBuilder::new(&anchored)
        .size_limit(config.regex_size_limit)
        .build()
        .map_err(Error::from)
}
