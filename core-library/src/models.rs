//! Domain models for the work catalog
//!
//! This module contains the catalog entities and their validation. The
//! metadata payload keeps a fixed set of known fields plus an open `extra`
//! map, so whatever the metadata source returns is passed through to the
//! catalog unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// ID Types
// =============================================================================

/// Number of digits in a rendered work code
pub const WORK_CODE_DIGITS: usize = 6;

/// Largest identifier that still renders as a six digit code
pub const MAX_WORK_ID: u32 = 999_999;

/// Numeric identifier of an external work (`RJ123456` -> `123456`)
///
/// `Display` renders the full `RJ######` form; [`WorkId::code`] renders the
/// zero-padded digits alone, which is what URL templates and asset names use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(u32);

impl WorkId {
    /// Wraps a raw identifier
    ///
    /// Returns `None` for zero or anything wider than six digits.
    pub fn new(raw: u32) -> Option<Self> {
        (1..=MAX_WORK_ID).contains(&raw).then_some(Self(raw))
    }

    /// The raw numeric value
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Zero-padded six digit code (`000123`)
    pub fn code(&self) -> String {
        format!("{:0width$}", self.0, width = WORK_CODE_DIGITS)
    }

    /// The value stored in `INTEGER` columns
    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }

    /// Converts a stored column value back into an identifier
    pub fn from_i64(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().and_then(Self::new)
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RJ{}", self.code())
    }
}

impl FromStr for WorkId {
    type Err = String;

    /// Parses either `RJ123456` or the bare digits `123456`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("RJ").unwrap_or(s);
        if digits.len() != WORK_CODE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("'{}' is not a six digit work code", s));
        }
        digits
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("'{}' is not a valid work identifier", s))
    }
}

// =============================================================================
// Metadata Payload
// =============================================================================

/// Circle (publisher) of a work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub id: i64,
    pub name: String,
}

/// Descriptive tag attached to a work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Voice actor credited on a work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceActor {
    pub name: String,
}

/// Metadata returned by a metadata source for one work
///
/// Unknown fields are captured in `extra` and stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkMetadata {
    pub title: String,
    #[serde(default)]
    pub circle: Option<Circle>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub vas: Vec<VoiceActor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkMetadata {
    /// Creates a payload with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            circle: None,
            tags: Vec::new(),
            vas: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Validate metadata fields
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Work title cannot be empty".to_string());
        }

        if let Some(circle) = &self.circle {
            if circle.name.trim().is_empty() {
                return Err("Circle name cannot be empty".to_string());
            }
        }

        if self.tags.iter().any(|t| t.name.trim().is_empty()) {
            return Err("Tag names cannot be empty".to_string());
        }

        if self.vas.iter().any(|va| va.name.trim().is_empty()) {
            return Err("Voice actor names cannot be empty".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// A catalog entry: a work, the folder it was created from, and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub id: WorkId,
    /// Folder path relative to the content root
    pub dir: String,
    #[serde(flatten)]
    pub metadata: WorkMetadata,
}

impl WorkRecord {
    /// Builds a record from fetched metadata, injecting the folder name
    ///
    /// `id` and `dir` keys carried in the payload's `extra` map are dropped:
    /// the folder-derived identifier and the folder itself are authoritative.
    pub fn new(id: WorkId, dir: impl Into<String>, mut metadata: WorkMetadata) -> Self {
        metadata.extra.remove("id");
        metadata.extra.remove("dir");
        Self {
            id,
            dir: dir.into(),
            metadata,
        }
    }

    /// Validate record fields
    pub fn validate(&self) -> Result<(), String> {
        if self.dir.trim().is_empty() {
            return Err("Work directory cannot be empty".to_string());
        }
        self.metadata.validate()
    }
}

/// The `{id, dir}` projection of a catalog record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkEntry {
    pub id: WorkId,
    pub dir: String,
}
