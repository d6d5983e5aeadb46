//! Series identity: tag validation and canonical `name;k=v` construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagdex_core::schema::{MetricData, MetricDefinition};
//!
//! let data = MetricData::new(1, "cpu.user", 10).with_tags(["host=a", "dc=eu"]);
//! let def = MetricDefinition::from_metric_data(&data)?;
//!
//! assert_eq!(def.name_with_tags(), "cpu.user;dc=eu;host=a");
//! ```

mod metric;
mod validation;

pub use metric::{MKey, MetricData, MetricDefinition, VALID_MTYPES};
pub(crate) use validation::key_violation;
pub use validation::{
    parse_tags, sanitize_name_as_tag_value, validate_tag, validate_tags, TagValidator,
};

/// Marker prefix reserved for internal identities and regex tag values.
pub const RESERVED_MARKER: char = '~';

/// Separator between the name and each tag in `NameWithTags`.
pub const TAG_SEPARATOR: char = ';';

/// Separator between a tag's key and value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Tag key carrying the metric name.
pub const NAME_TAG_KEY: &str = "name";

/// Characters a tag key must not contain besides the separators.
pub(crate) const KEY_OPERATOR_CHARS: [char; 2] = ['!', '^'];
