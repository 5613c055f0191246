//! Versioned snapshot serialization.
//!
//! # Responsibility
//! - Define the whole-state wire object used for persistence and export.
//! - Parse snapshots tolerantly and normalize entries from older schemas.
//!
//! # Invariants
//! - A snapshot is accepted whenever it is a JSON object carrying an
//!   `activities` array; unknown fields are ignored, missing ones default.
//! - Load normalization never discards line arrays that came with an entry.
//! - Archive payloads are opaque; nothing is merged out of them.

use crate::model::activity::Activity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tag identifying snapshots produced by this system.
pub const SNAPSHOT_KIND: &str = "OPSCAL_TRACKER";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot parse/serialize failure.
#[derive(Debug)]
pub enum SnapshotError {
    /// Input is not valid JSON or an activity fails typed validation.
    Parse(serde_json::Error),
    /// Input parsed but carries no `activities` array.
    MissingActivities,
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "snapshot is not valid: {err}"),
            Self::MissingActivities => write!(f, "snapshot carries no activities array"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MissingActivities => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Imported older base kept aside as an opaque labeled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveRecord {
    #[serde(deserialize_with = "crate::model::entry::lenient_timestamp")]
    pub ts: Option<DateTime<Utc>>,
    pub label: String,
    /// Whole imported snapshot, untouched.
    pub data: serde_json::Value,
}

/// Serializable whole-state object: the unit of export/import/persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(
        alias = "savedAt",
        deserialize_with = "crate::model::entry::lenient_timestamp"
    )]
    pub exported_at: Option<DateTime<Utc>>,
    /// Selected period at export time; absent in hand-built bases.
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub activities: Vec<Activity>,
    pub archives: Vec<ArchiveRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            kind: SNAPSHOT_KIND.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: None,
            year: None,
            month: None,
            activities: Vec::new(),
            archives: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Builds an export snapshot stamped with the current time.
    pub fn export(
        year: i32,
        month: u32,
        activities: Vec<Activity>,
        archives: Vec<ArchiveRecord>,
    ) -> Self {
        Self {
            exported_at: Some(Utc::now()),
            year: Some(year),
            month: Some(month),
            activities,
            archives,
            ..Self::default()
        }
    }

    /// Serializes to the pretty JSON text handed to the download/storage layer.
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses snapshot text, requiring only the `activities` array.
    ///
    /// Activities go through typed deserialization, so structurally broken
    /// activity objects fail here instead of surfacing later. Everything
    /// else is tolerant: missing entry fields default and legacy scalar
    /// amounts are adopted into line arrays.
    pub fn from_json(text: &str) -> SnapshotResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value
            .get("activities")
            .is_some_and(serde_json::Value::is_array)
        {
            return Err(SnapshotError::MissingActivities);
        }
        let mut snapshot: Snapshot = serde_json::from_value(value)?;
        snapshot.normalize();
        Ok(snapshot)
    }

    /// Normalizes every loaded entry: mirrors missing fields already
    /// defaulted by serde; positive legacy scalars seed line arrays once.
    pub fn normalize(&mut self) {
        self.month = self.month.map(|m| m.min(11));
        for activity in &mut self.activities {
            for months in activity.entries.values_mut() {
                for entry in months.values_mut() {
                    entry.adopt_legacy_lines();
                }
            }
        }
    }
}
