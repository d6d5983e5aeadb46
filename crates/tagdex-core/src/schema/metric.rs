//! Ingestion records and canonical series definitions.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::validation::{sanitize_name_as_tag_value, TagValidator};
use super::{KEY_VALUE_SEPARATOR, NAME_TAG_KEY, TAG_SEPARATOR};
use crate::error::{Error, Result};

/// Metric types accepted at ingestion.
pub const VALID_MTYPES: [&str; 5] = ["gauge", "rate", "count", "counter", "timestamp"];

/// Fixed-size series id, the primary key of the index.
///
/// Rendered as `<org>.<32 lowercase hex digits>`, the only form `FromStr`
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MKey {
    /// Owning organization.
    pub org: u32,
    /// Truncated SHA-256 over the org id and the canonical identity text.
    pub key: [u8; 16],
}

impl MKey {
    /// Computes the id of a series from its org and `NameWithTags` text.
    #[must_use]
    pub fn new(org: u32, name_with_tags: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(org.to_be_bytes());
        hasher.update(name_with_tags.as_bytes());
        let digest = hasher.finalize();

        let mut key = [0u8; 16];
        key.copy_from_slice(&digest[..16]);
        Self { org, key }
    }
}

impl fmt::Display for MKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.org, hex::encode(self.key))
    }
}

impl FromStr for MKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMetric(format!("invalid series id '{s}'"));

        let (org_text, key) = s.split_once('.').ok_or_else(invalid)?;
        let org = org_text.parse::<u32>().map_err(|_| invalid())?;
        // only the text `Display` writes: no sign, no leading zeros, lowercase hex
        if org.to_string() != org_text || key.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(invalid());
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(key, &mut bytes).map_err(|_| invalid())?;
        Ok(Self { org, key: bytes })
    }
}

impl From<MKey> for String {
    fn from(mkey: MKey) -> Self {
        mkey.to_string()
    }
}

impl TryFrom<String> for MKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A raw ingestion record: unsorted, unvalidated tags plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricData {
    /// Owning organization.
    pub org_id: u32,
    /// Metric name.
    pub name: String,
    /// Reporting interval in seconds.
    pub interval: u32,
    /// Sample value.
    #[serde(default)]
    pub value: f64,
    /// Unit of the value.
    #[serde(default)]
    pub unit: String,
    /// Sample timestamp in seconds.
    #[serde(default)]
    pub time: i64,
    /// Metric type, one of [`VALID_MTYPES`].
    pub mtype: String,
    /// `key=value` tags in ingestion order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MetricData {
    /// Creates a gauge record without tags.
    #[must_use]
    pub fn new(org_id: u32, name: impl Into<String>, interval: u32) -> Self {
        Self {
            org_id,
            name: name.into(),
            interval,
            value: 0.0,
            unit: String::new(),
            time: 0,
            mtype: "gauge".to_string(),
            tags: Vec::new(),
        }
    }

    /// Replaces the tags of this record.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Validates metadata and tags with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetric`] for bad metadata, or the tag error of
    /// the first invalid tag.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&TagValidator::default())
    }

    /// Validates metadata and tags using the given tag validator.
    ///
    /// # Errors
    ///
    /// Same as [`MetricData::validate`].
    pub fn validate_with(&self, validator: &TagValidator) -> Result<()> {
        if self.org_id == 0 {
            return Err(self.reject("org_id must not be 0"));
        }
        if self.name.is_empty() {
            return Err(self.reject("name must not be empty"));
        }
        if self.interval == 0 {
            return Err(self.reject("interval must not be 0"));
        }
        if !VALID_MTYPES.contains(&self.mtype.as_str()) {
            return Err(self.reject("unknown mtype"));
        }
        validator.validate(&self.tags)
    }

    fn reject(&self, reason: &str) -> Error {
        tracing::debug!(name = %self.name, org_id = self.org_id, reason, "rejecting metric");
        Error::InvalidMetric(format!("{reason} (metric '{}')", self.name))
    }
}

/// One indexed series with its canonical identity.
///
/// The name and every tag are byte ranges of a single `NameWithTags` buffer
/// of the form `<name>[;<key>=<value>]*`, tags sorted and unique. Accessors
/// hand out `&str` views borrowed from the definition, so a published
/// definition can only be replaced whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    id: MKey,
    org_id: u32,
    interval: u32,
    unit: String,
    mtype: String,
    last_update: i64,
    name_with_tags: String,
    name: Range<usize>,
    tags: Vec<Range<usize>>,
}

impl MetricDefinition {
    /// Builds a definition from a name and already validated tags.
    ///
    /// A `name=` tag is dropped from the tag set; its value is used as the
    /// name only when `name` is empty.
    #[must_use]
    pub fn new<S: AsRef<str>>(org_id: u32, name: &str, tags: &[S]) -> Self {
        let mut def = Self {
            id: MKey {
                org: org_id,
                key: [0; 16],
            },
            org_id,
            interval: 0,
            unit: String::new(),
            mtype: "gauge".to_string(),
            last_update: 0,
            name_with_tags: String::new(),
            name: 0..0,
            tags: Vec::new(),
        };
        def.build_identity(name, tags);
        def
    }

    /// Validates an ingestion record and builds its definition.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the record; nothing is built then.
    pub fn from_metric_data(data: &MetricData) -> Result<Self> {
        Self::from_metric_data_with(data, &TagValidator::default())
    }

    /// Like [`MetricDefinition::from_metric_data`] with custom tag limits.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the record.
    pub fn from_metric_data_with(data: &MetricData, validator: &TagValidator) -> Result<Self> {
        data.validate_with(validator)?;

        let mut def = Self::new(data.org_id, &data.name, &data.tags);
        def.interval = data.interval;
        def.unit.clone_from(&data.unit);
        def.mtype.clone_from(&data.mtype);
        def.last_update = data.time;
        Ok(def)
    }

    /// Rebuilds the canonical identity from the current name and tags.
    ///
    /// Idempotent: the buffer and id come out byte-identical.
    pub fn set_id(&mut self) {
        let name = self.name().to_string();
        let tags: Vec<String> = self.tags().map(str::to_string).collect();
        self.build_identity(&name, &tags);
    }

    fn build_identity<S: AsRef<str>>(&mut self, name: &str, tags: &[S]) {
        let mut name_override: Option<&str> = None;
        let mut sorted: Vec<&str> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.as_ref();
            match name_tag_value(tag) {
                Some(value) => {
                    name_override = Some(name_override.map_or(value, |cur| cur.min(value)));
                }
                None => sorted.push(tag),
            }
        }
        sorted.sort_unstable();
        sorted.dedup();

        let name = match name_override {
            Some(value) if name.is_empty() => {
                tracing::trace!(name = value, "taking metric name from name tag");
                value
            }
            _ => name,
        };

        let capacity = name.len() + sorted.iter().map(|t| t.len() + 1).sum::<usize>();
        let mut buf = String::with_capacity(capacity);
        buf.push_str(name);
        let name_range = 0..buf.len();

        let mut ranges = Vec::with_capacity(sorted.len());
        for tag in sorted {
            buf.push(TAG_SEPARATOR);
            let start = buf.len();
            buf.push_str(tag);
            ranges.push(start..buf.len());
        }

        self.id = MKey::new(self.org_id, &buf);
        self.name_with_tags = buf;
        self.name = name_range;
        self.tags = ranges;
    }

    /// Sets the reporting interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub fn with_last_update(mut self, last_update: i64) -> Self {
        self.last_update = last_update;
        self
    }

    /// Series id.
    #[must_use]
    pub fn id(&self) -> MKey {
        self.id
    }

    /// Owning organization.
    #[must_use]
    pub fn org_id(&self) -> u32 {
        self.org_id
    }

    /// Reporting interval in seconds.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Unit of the values.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Metric type.
    #[must_use]
    pub fn mtype(&self) -> &str {
        &self.mtype
    }

    /// Timestamp of the last ingested sample.
    #[must_use]
    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    /// Metric name, a view into [`MetricDefinition::name_with_tags`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name_with_tags[self.name.clone()]
    }

    /// Canonical identity text `<name>[;<key>=<value>]*`.
    #[must_use]
    pub fn name_with_tags(&self) -> &str {
        &self.name_with_tags
    }

    /// Sorted `key=value` tags, views into the identity buffer.
    pub fn tags(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.tags.iter().map(|r| &self.name_with_tags[r.clone()])
    }

    /// Number of tags.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Values of every tag with the given key, in sorted order.
    ///
    /// Tags sharing a key are contiguous in the sorted tag list, so the
    /// lookup is a binary search. The `name` key yields the metric name.
    pub fn tag_values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        let name = (key == NAME_TAG_KEY).then(|| self.name());
        let range = if name.is_some() {
            0..0
        } else {
            let start = self.tags.partition_point(|r| {
                cmp_key(&self.name_with_tags[r.clone()], key) == Ordering::Less
            });
            let end = self.tags.partition_point(|r| {
                cmp_key(&self.name_with_tags[r.clone()], key) != Ordering::Greater
            });
            start..end
        };
        let skip = key.len() + 1;
        name.into_iter().chain(
            self.tags[range]
                .iter()
                .map(move |r| &self.name_with_tags[r.start + skip..r.end]),
        )
    }

    /// The name with every leading `~` removed.
    #[must_use]
    pub fn name_sanitized_as_tag_value(&self) -> &str {
        sanitize_name_as_tag_value(self.name())
    }
}

/// Returns the value of a `name=` tag.
fn name_tag_value(tag: &str) -> Option<&str> {
    tag.strip_prefix(NAME_TAG_KEY)?
        .strip_prefix(KEY_VALUE_SEPARATOR)
}

/// Orders a tag against the `key=` prefix; tags carrying the key compare equal.
fn cmp_key(tag: &str, key: &str) -> Ordering {
    let prefix_len = key.len() + 1;
    tag.as_bytes()
        .iter()
        .take(prefix_len)
        .cmp(key.as_bytes().iter().chain(&[KEY_VALUE_SEPARATOR as u8]))
}
