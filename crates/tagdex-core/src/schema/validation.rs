//! Tag validation and name sanitization.

use super::{KEY_OPERATOR_CHARS, KEY_VALUE_SEPARATOR, RESERVED_MARKER, TAG_SEPARATOR};
use crate::config::ValidationConfig;
use crate::error::{Error, Result};

/// Validates a batch of raw tags with default limits.
///
/// Tags are checked left to right and the first offending tag is reported.
/// Within a tag the encoding check runs before the structural checks.
///
/// # Errors
///
/// Returns [`Error::InvalidUtf8`] or [`Error::InvalidTagFormat`] for the first
/// invalid tag.
pub fn validate_tags<T: AsRef<[u8]>>(tags: &[T]) -> Result<()> {
    TagValidator::default().validate(tags)
}

/// Validates raw byte tags and converts them into owned strings.
///
/// The byte buffers are reused, no tag text is copied.
///
/// # Errors
///
/// Same as [`validate_tags`].
pub fn parse_tags(raw: Vec<Vec<u8>>) -> Result<Vec<String>> {
    TagValidator::default().parse(raw)
}

/// Checks the `key=value` grammar of a single tag.
///
/// A valid tag has a non-empty key, a `=`, and a non-empty value. The value
/// may contain further `=`. `;` is rejected anywhere, the key must not start
/// with `~` nor contain `!` or `^`, and the value must not start with `~`.
///
/// # Errors
///
/// Returns [`Error::InvalidTagFormat`] naming the violated rule.
pub fn validate_tag(tag: &str) -> Result<()> {
    let Some((key, value)) = tag.split_once(KEY_VALUE_SEPARATOR) else {
        return Err(Error::tag_format(tag, "missing '=' separator"));
    };
    if let Some(reason) = key_violation(key) {
        return Err(Error::tag_format(tag, reason));
    }
    if value.is_empty() {
        return Err(Error::tag_format(tag, "empty value"));
    }
    if value.contains(TAG_SEPARATOR) {
        return Err(Error::tag_format(tag, "';' is reserved"));
    }
    if value.starts_with(RESERVED_MARKER) {
        return Err(Error::tag_format(tag, "value starts with '~'"));
    }
    Ok(())
}

/// Returns the rule a tag key breaks, if any.
///
/// Query keys go through the same rules, so an expression can only name a
/// key some valid tag could carry.
pub(crate) fn key_violation(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        Some("empty key")
    } else if key.contains(KEY_VALUE_SEPARATOR) {
        Some("key contains '='")
    } else if key.contains(TAG_SEPARATOR) {
        Some("';' is reserved")
    } else if key.starts_with(RESERVED_MARKER) {
        Some("key starts with '~'")
    } else if key.contains(KEY_OPERATOR_CHARS) {
        Some("key contains '!' or '^'")
    } else {
        None
    }
}

/// Strips every leading `~` from a metric name.
///
/// Names starting with the marker denote internal identities. The result
/// borrows from the input, so a marker-free name comes back as-is.
#[must_use]
pub fn sanitize_name_as_tag_value(name: &str) -> &str {
    name.trim_start_matches(RESERVED_MARKER)
}

/// Tag validator with configurable per-series limits.
#[derive(Debug, Clone, Default)]
pub struct TagValidator {
    config: ValidationConfig,
}

impl TagValidator {
    /// Creates a validator enforcing the given limits.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates a batch of raw tags.
    ///
    /// # Errors
    ///
    /// Returns the error for the first invalid tag, or
    /// [`Error::InvalidTagFormat`] if the batch exceeds `max_tags`.
    pub fn validate<T: AsRef<[u8]>>(&self, tags: &[T]) -> Result<()> {
        for (index, raw) in tags.iter().enumerate() {
            let tag = std::str::from_utf8(raw.as_ref()).map_err(|_| {
                tracing::debug!(index, "rejecting tag with invalid UTF-8");
                Error::InvalidUtf8 { index }
            })?;
            self.validate_one(tag)?;
        }
        self.check_count(tags.len())
    }

    /// Validates raw byte tags and converts them into strings in place.
    ///
    /// # Errors
    ///
    /// Same as [`TagValidator::validate`].
    pub fn parse(&self, raw: Vec<Vec<u8>>) -> Result<Vec<String>> {
        let count = raw.len();
        let tags = raw
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| {
                let tag = String::from_utf8(bytes).map_err(|_| {
                    tracing::debug!(index, "rejecting tag with invalid UTF-8");
                    Error::InvalidUtf8 { index }
                })?;
                self.validate_one(&tag)?;
                Ok(tag)
            })
            .collect::<Result<Vec<_>>>()?;
        self.check_count(count)?;
        Ok(tags)
    }

    fn validate_one(&self, tag: &str) -> Result<()> {
        let checked = validate_tag(tag).and_then(|()| {
            if self.config.max_tag_length != 0 && tag.len() > self.config.max_tag_length {
                Err(Error::tag_format(tag, "tag exceeds maximum length"))
            } else {
                Ok(())
            }
        });
        if let Err(ref err) = checked {
            tracing::debug!(%err, "rejecting tag");
        }
        checked
    }

    fn check_count(&self, count: usize) -> Result<()> {
        if self.config.max_tags != 0 && count > self.config.max_tags {
            tracing::debug!(count, max = self.config.max_tags, "rejecting tag batch");
            return Err(Error::InvalidTagFormat {
                tag: format!("<{count} tags>"),
                reason: "too many tags",
            });
        }
        Ok(())
    }
}
