//! AND-combination of expressions into one verdict per series.

use std::fmt;

use super::{Expression, FilterDecision, MetricDefinitionFilter, Operator};
use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::schema::{MetricDefinition, KEY_VALUE_SEPARATOR, NAME_TAG_KEY};

/// A set of expressions with implicit AND semantics.
///
/// Every expression is compiled once at construction; evaluation only calls
/// the shared filters, so one query can serve any number of scan threads.
#[derive(Clone)]
pub struct TagQuery {
    expressions: Vec<Expression>,
    filters: Vec<MetricDefinitionFilter>,
    from: i64,
}

impl TagQuery {
    /// Creates a query with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the expressions do not form a
    /// usable query.
    pub fn new(expressions: Vec<Expression>) -> Result<Self> {
        Self::with_config(expressions, &QueryConfig::default())
    }

    /// Creates a query enforcing the given limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] when there are no expressions, too
    /// many, or (if required) none that selects a non-empty value.
    pub fn with_config(expressions: Vec<Expression>, config: &QueryConfig) -> Result<Self> {
        if expressions.is_empty() {
            return Err(Error::InvalidQuery(
                "a query needs at least one expression".to_string(),
            ));
        }
        if expressions.len() > config.max_expressions {
            return Err(Error::InvalidQuery(format!(
                "{} expressions exceed the limit of {}",
                expressions.len(),
                config.max_expressions
            )));
        }
        if config.require_selecting_expression
            && !expressions.iter().any(Expression::requires_non_empty_value)
        {
            return Err(Error::InvalidQuery(
                "at least one expression must require a non-empty value".to_string(),
            ));
        }

        let filters = expressions
            .iter()
            .map(Expression::metric_definition_filter)
            .collect();
        let query = Self {
            expressions,
            filters,
            from: i64::MIN,
        };
        if query.is_unsatisfiable() {
            tracing::debug!(query = %query, "query contains match-none, result is empty");
        }
        Ok(query)
    }

    /// Only accept series updated at or after `from`.
    #[must_use]
    pub fn with_from(mut self, from: i64) -> Self {
        self.from = from;
        self
    }

    /// The expressions in evaluation order.
    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Lower bound on a series' last update.
    #[must_use]
    pub fn from(&self) -> i64 {
        self.from
    }

    /// True if no series can ever match.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.expressions
            .iter()
            .any(|e| e.operator() == Operator::MatchNone)
    }

    /// Evaluates the query against a name and unsorted `key=value` tags.
    ///
    /// Returns `Pass` or `Fail`, never `None`.
    #[must_use]
    pub fn evaluate<'v>(&self, name: &'v str, tags: &[&'v str]) -> FilterDecision {
        self.decide(|key, out| {
            if key == NAME_TAG_KEY {
                out.push(name);
                return;
            }
            out.extend(tags.iter().copied().filter_map(|tag| {
                tag.strip_prefix(key)
                    .and_then(|rest| rest.strip_prefix(KEY_VALUE_SEPARATOR))
            }));
        })
    }

    /// True if the definition satisfies every expression.
    #[must_use]
    pub fn matches(&self, def: &MetricDefinition) -> bool {
        def.last_update() >= self.from
            && self.decide(|key, out| out.extend(def.tag_values(key))) == FilterDecision::Pass
    }

    /// Keeps the definitions that satisfy the query.
    pub fn filter<'a, I>(&'a self, defs: I) -> impl Iterator<Item = &'a MetricDefinition> + 'a
    where
        I: IntoIterator<Item = &'a MetricDefinition>,
        I::IntoIter: 'a,
    {
        // an unsatisfiable query ends the scan at the first candidate
        let unsatisfiable = self.is_unsatisfiable();
        defs.into_iter()
            .take_while(move |_| !unsatisfiable)
            .filter(move |def| self.matches(def))
    }

    /// Runs every filter, resolving `None` to the expression's default and
    /// stopping at the first `Fail`.
    fn decide<'v, F>(&self, mut values_for: F) -> FilterDecision
    where
        F: FnMut(&str, &mut Vec<&'v str>),
    {
        let mut values: Vec<&'v str> = Vec::new();
        for (expr, filter) in self.expressions.iter().zip(&self.filters) {
            values.clear();
            values_for(expr.key(), &mut values);
            let candidate = values.first().copied().unwrap_or("");
            let decision =
                filter(candidate, values.as_slice()).or_default(expr.default_decision());
            if decision == FilterDecision::Fail {
                return FilterDecision::Fail;
            }
        }
        FilterDecision::Pass
    }
}

impl fmt::Debug for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagQuery")
            .field("expressions", &self.expressions)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Expressions sorted by their canonical text, comma separated.
impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.expressions.iter().map(ToString::to_string).collect();
        parts.sort_unstable();
        f.write_str(&parts.join(","))
    }
}
