//! Tag query expressions and the tri-state decision algebra.
//!
//! An [`Expression`] is one predicate over a single tag key. Each expression
//! compiles into a [`MetricDefinitionFilter`] that returns a
//! [`FilterDecision`] for one series; a [`TagQuery`] ANDs them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagdex_core::tagquery::{Expression, Operator, TagQuery};
//!
//! let query = TagQuery::new(vec![
//!     Expression::new("name", Operator::Match, "cpu\\..*")?,
//!     Expression::new("dc", Operator::NotEqual, "us")?,
//! ])?;
//!
//! let hits: Vec<_> = query.filter(definitions.iter()).collect();
//! ```

mod builders;
mod matching;
mod query;

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use query::TagQuery;

/// Reusable evaluator compiled from an [`Expression`].
///
/// Called with the series' value for the key (`""` when absent) and every
/// value the series carries under that key.
pub type MetricDefinitionFilter = Arc<dyn Fn(&str, &[&str]) -> FilterDecision + Send + Sync>;

/// Verdict of one expression for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDecision {
    /// The series satisfies the expression.
    Pass,
    /// The series is excluded.
    Fail,
    /// Undecided; the expression's default decision applies.
    None,
}

impl FilterDecision {
    /// Replaces `None` with `default`.
    #[must_use]
    pub fn or_default(self, default: Self) -> Self {
        match self {
            Self::None => default,
            decided => decided,
        }
    }

    /// Combines two verdicts of an AND: `Fail` absorbs, `Pass` is neutral.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Fail, _) | (_, Self::Fail) => Self::Fail,
            (Self::Pass, decided) | (decided, Self::Pass) => decided,
            (Self::None, Self::None) => Self::None,
        }
    }
}

impl From<bool> for FilterDecision {
    fn from(passes: bool) -> Self {
        if passes {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// Operators of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `key=value`
    Equal,
    /// `key!=value`
    NotEqual,
    /// `key=~pattern`
    Match,
    /// `key!=~pattern`
    NotMatch,
    /// `key!=` (tag is present)
    Presence,
    /// `key=` (tag is absent)
    Absence,
    /// Never matches.
    MatchNone,
}

impl Operator {
    /// Textual token written between key and value.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equal | Self::Absence => "=",
            Self::NotEqual | Self::Presence => "!=",
            Self::Match => "=~",
            Self::NotMatch => "!=~",
            Self::MatchNone => "!;",
        }
    }

    /// Appends the operator token to `builder`.
    pub fn string_into_builder(self, builder: &mut String) {
        builder.push_str(self.token());
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A predicate over one tag key.
///
/// The key `name` addresses the metric name.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Value equals `value`.
    Equal {
        /// Tag key.
        key: String,
        /// Expected value.
        value: String,
    },
    /// Value differs from `value`.
    NotEqual {
        /// Tag key.
        key: String,
        /// Rejected value.
        value: String,
    },
    /// Value matches the pattern.
    Match {
        /// Tag key.
        key: String,
        /// Pattern text as written.
        value: String,
        /// Compiled, start-anchored pattern.
        re: Regex,
    },
    /// Value does not match the pattern.
    NotMatch {
        /// Tag key.
        key: String,
        /// Pattern text as written.
        value: String,
        /// Compiled, start-anchored pattern.
        re: Regex,
    },
    /// The series carries the tag.
    Presence {
        /// Tag key.
        key: String,
    },
    /// The series does not carry the tag.
    Absence {
        /// Tag key.
        key: String,
    },
    /// Unsatisfiable predicate.
    ///
    /// Keeps the requested operator and value only to print itself back.
    MatchNone {
        /// Tag key.
        key: String,
        /// Value as requested.
        value: String,
        /// Operator as requested.
        original_operator: Operator,
    },
}

impl Expression {
    /// Tag key of the expression.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Equal { key, .. }
            | Self::NotEqual { key, .. }
            | Self::Match { key, .. }
            | Self::NotMatch { key, .. }
            | Self::Presence { key }
            | Self::Absence { key }
            | Self::MatchNone { key, .. } => key,
        }
    }

    /// Literal or pattern text; empty for presence checks.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Equal { value, .. }
            | Self::NotEqual { value, .. }
            | Self::Match { value, .. }
            | Self::NotMatch { value, .. }
            | Self::MatchNone { value, .. } => value,
            Self::Presence { .. } | Self::Absence { .. } => "",
        }
    }

    /// Operator of the expression; always `MatchNone` for unsatisfiable ones.
    #[must_use]
    pub fn operator(&self) -> Operator {
        match self {
            Self::Equal { .. } => Operator::Equal,
            Self::NotEqual { .. } => Operator::NotEqual,
            Self::Match { .. } => Operator::Match,
            Self::NotMatch { .. } => Operator::NotMatch,
            Self::Presence { .. } => Operator::Presence,
            Self::Absence { .. } => Operator::Absence,
            Self::MatchNone { .. } => Operator::MatchNone,
        }
    }

    /// Appends the canonical `key<op>value` text to `builder`.
    pub fn string_into_builder(&self, builder: &mut String) {
        builder.push_str(self.key());
        match self {
            Self::MatchNone {
                original_operator, ..
            } => original_operator.string_into_builder(builder),
            other => other.operator().string_into_builder(builder),
        }
        builder.push_str(self.value());
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = String::new();
        self.string_into_builder(&mut builder);
        f.write_str(&builder)
    }
}
