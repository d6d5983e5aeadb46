//! # `Tagdex` Core
//!
//! Series identity and tag-query filtering for multi-dimensional metric indexes.
//!
//! A series is identified by its name and a set of `key=value` tags. `Tagdex`
//! turns that pair into one canonical text, `name;k1=v1;k2=v2`, with tags
//! sorted, and hashes it into the fixed-size id used as the index's primary
//! key. Queries are sets of tag predicates evaluated with a tri-state
//! decision algebra, so an index can prune series by key presence before it
//! looks at values.
//!
//! ## Features
//!
//! - **Canonical identity**: order-independent `NameWithTags` in one buffer
//! - **Zero-copy views**: name and tags borrow from that buffer
//! - **Tag validation**: fail-fast, with distinct encoding and format errors
//! - **Tag queries**: `=`, `!=`, `=~`, `!=~`, presence, absence, match-none
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tagdex_core::{Expression, MetricData, MetricDefinition, Operator, TagQuery};
//!
//! let data = MetricData::new(1, "disk.used", 10).with_tags(["host=a", "dc=eu"]);
//! let def = MetricDefinition::from_metric_data(&data)?;
//! assert_eq!(def.name_with_tags(), "disk.used;dc=eu;host=a");
//!
//! let query = TagQuery::new(vec![
//!     Expression::new("dc", Operator::Equal, "eu")?,
//!     Expression::new("host", Operator::Match, "a|b")?,
//! ])?;
//! assert!(query.matches(&def));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
#[cfg(test)]
mod config_tests;
pub mod error;
#[cfg(test)]
mod error_tests;
pub mod schema;
pub mod tagquery;

pub use config::{ConfigError, LoggingConfig, QueryConfig, TagdexConfig, ValidationConfig};
pub use error::{Error, Result};
pub use schema::{
    parse_tags, sanitize_name_as_tag_value, validate_tag, validate_tags, MKey, MetricData,
    MetricDefinition, TagValidator,
};
pub use tagquery::{Expression, FilterDecision, MetricDefinitionFilter, Operator, TagQuery};
