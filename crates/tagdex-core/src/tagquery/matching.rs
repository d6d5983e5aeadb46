//! Per-variant evaluation rules and compiled filters.

use std::sync::Arc;

use super::{Expression, FilterDecision, MetricDefinitionFilter};

impl Expression {
    /// True when a series lacking the key can never satisfy the expression.
    #[must_use]
    pub fn requires_non_empty_value(&self) -> bool {
        match self {
            Self::Equal { value, .. } => !value.is_empty(),
            Self::Match { .. } | Self::Presence { .. } | Self::MatchNone { .. } => true,
            Self::NotEqual { .. } | Self::NotMatch { .. } | Self::Absence { .. } => false,
        }
    }

    /// True when only the presence of the key matters, not its value.
    #[must_use]
    pub fn operates_on_tag(&self) -> bool {
        matches!(self, Self::Presence { .. } | Self::Absence { .. })
    }

    /// True when the value is a pattern.
    #[must_use]
    pub fn has_re(&self) -> bool {
        matches!(self, Self::Match { .. } | Self::NotMatch { .. })
    }

    /// Evaluates the expression against one concrete tag value.
    #[must_use]
    pub fn value_passes(&self, candidate: &str) -> bool {
        match self {
            Self::Equal { value, .. } => candidate == value.as_str(),
            Self::NotEqual { value, .. } => candidate != value.as_str(),
            Self::Match { re, .. } => re.is_match(candidate),
            Self::NotMatch { re, .. } => !re.is_match(candidate),
            Self::Presence { .. } => !candidate.is_empty(),
            Self::Absence { .. } => candidate.is_empty(),
            Self::MatchNone { .. } => false,
        }
    }

    /// Verdict for a series that does not carry the key.
    #[must_use]
    pub fn default_decision(&self) -> FilterDecision {
        match self {
            Self::Equal { value, .. } if value.is_empty() => FilterDecision::Pass,
            Self::Equal { .. } | Self::Match { .. } | Self::Presence { .. } => FilterDecision::Fail,
            Self::NotEqual { .. } | Self::NotMatch { .. } | Self::Absence { .. } => {
                FilterDecision::Pass
            }
            Self::MatchNone { .. } => FilterDecision::Fail,
        }
    }

    /// Compiles the expression into a reusable, stateless filter.
    ///
    /// The filter answers `None` for a series without the key. Positive
    /// expressions pass if any value of the key passes, negated ones only if
    /// every value does.
    #[must_use]
    pub fn metric_definition_filter(&self) -> MetricDefinitionFilter {
        match self {
            Self::Equal { value, .. } => {
                let value = value.clone();
                Arc::new(move |candidate: &str, values: &[&str]| {
                    decide(candidate, values, Quantifier::Any, |v| v == value)
                })
            }
            Self::NotEqual { value, .. } => {
                let value = value.clone();
                Arc::new(move |candidate: &str, values: &[&str]| {
                    decide(candidate, values, Quantifier::All, |v| v != value)
                })
            }
            Self::Match { re, .. } => {
                let re = re.clone();
                Arc::new(move |candidate: &str, values: &[&str]| {
                    decide(candidate, values, Quantifier::Any, |v| re.is_match(v))
                })
            }
            Self::NotMatch { re, .. } => {
                let re = re.clone();
                Arc::new(move |candidate: &str, values: &[&str]| {
                    decide(candidate, values, Quantifier::All, |v| !re.is_match(v))
                })
            }
            Self::Presence { .. } => Arc::new(|candidate: &str, values: &[&str]| {
                decide(candidate, values, Quantifier::Any, |v| !v.is_empty())
            }),
            Self::Absence { .. } => Arc::new(|candidate: &str, values: &[&str]| {
                decide(candidate, values, Quantifier::All, str::is_empty)
            }),
            Self::MatchNone { .. } => Arc::new(|_: &str, _: &[&str]| FilterDecision::Fail),
        }
    }
}

#[derive(Clone, Copy)]
enum Quantifier {
    Any,
    All,
}

/// Applies `passes` to the values a series carries under a key.
///
/// `values` supersedes `candidate` when non-empty; an empty `candidate` with
/// no values means the key is absent.
fn decide(
    candidate: &str,
    values: &[&str],
    quantifier: Quantifier,
    passes: impl Fn(&str) -> bool,
) -> FilterDecision {
    if values.is_empty() {
        if candidate.is_empty() {
            return FilterDecision::None;
        }
        return passes(candidate).into();
    }
    match quantifier {
        Quantifier::Any => values.iter().copied().any(passes).into(),
        Quantifier::All => values.iter().copied().all(passes).into(),
    }
}
