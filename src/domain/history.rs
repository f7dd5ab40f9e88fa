//! Audit rows and the combined history view built from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scalar fields of one snapshot, keyed by column name
pub type Fields = BTreeMap<String, serde_json::Value>;

/// Which row family an audit row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFamily {
    /// The work item's own fields
    Object,
    /// The association row's fields
    Mapping,
}

/// One audit record, written for every mutation of an entity or association row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// Per-entity version, starting at 1 and strictly increasing
    pub version: u32,

    pub created_at: DateTime<Utc>,

    /// Every other column of the row
    #[serde(flatten)]
    pub fields: Fields,
}

impl HistoryRow {
    pub fn new(version: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            version,
            created_at,
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Errors parsing a compound version label
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("Empty version label")]
    Empty,

    #[error("Invalid version component '{0}'")]
    InvalidComponent(String),

    #[error("Too many version components in '{0}'")]
    TooManyComponents(String),
}

/// A two-part `object.mapping` version label.
///
/// Serialized as `"N.M"`, or `"N"` when the history has no mapping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CompoundVersion {
    pub object: u32,
    pub mapping: Option<u32>,
}

impl CompoundVersion {
    pub fn new(object: u32, mapping: Option<u32>) -> Self {
        Self { object, mapping }
    }
}

impl std::fmt::Display for CompoundVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mapping {
            Some(mapping) => write!(f, "{}.{}", self.object, mapping),
            None => write!(f, "{}", self.object),
        }
    }
}

impl std::str::FromStr for CompoundVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut parts = s.split('.');
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent(part.to_string()))
        };

        let object = parse(parts.next().unwrap_or_default())?;
        let mapping = parts.next().map(parse).transpose()?;
        if parts.next().is_some() {
            return Err(VersionParseError::TooManyComponents(s.to_string()));
        }

        Ok(Self { object, mapping })
    }
}

impl From<CompoundVersion> for String {
    fn from(version: CompoundVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for CompoundVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One step of an association's combined history.
///
/// `object` and `mapping` hold only the fields that changed at this step
/// (every field for the first entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedHistoryEntry {
    pub version: CompoundVersion,
    pub object: Fields,
    pub mapping: Fields,
    pub created_at: DateTime<Utc>,
}
