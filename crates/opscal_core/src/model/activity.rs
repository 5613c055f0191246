//! Activity domain model.
//!
//! # Responsibility
//! - Define the recurring obligation record and its due specification.
//! - Provide lazy entry access and the append-only follow-up log.
//!
//! # Invariants
//! - `id` is stable and never reused for another activity.
//! - `due_day`, when present, is clamped to `[1, 31]` at write time.
//! - Entries are created lazily and never deleted individually.
//! - Follow-ups are append-only and never mutated after append.

use crate::calendar::clamp_day;
use crate::model::entry::Entry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for an activity.
///
/// String-typed on the wire so ids minted by older bases import untouched.
pub type ActivityId = String;

/// Display-only recurrence label; due-date logic keys off [`DueType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    #[default]
    Monthly,
    Annual,
    /// Imported bases may carry labels this build does not know.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Monthly => "Monthly",
            Self::Annual => "Annual",
            Self::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// Due-date rule attached to an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DueType {
    /// No deadline; the activity never turns overdue.
    #[default]
    None,
    /// Due on `due_day` of every month.
    MonthlyDay,
    /// Due on `due_day` of `due_month` only.
    AnnualMonthDay,
}

/// Append-only follow-up log item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowUp {
    pub ts: DateTime<Utc>,
    /// Free-form type tag ("supplier chase", "internal reminder", ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub next_action: String,
    /// Free text as typed into a date field; not interpreted by core.
    pub next_date: String,
}

impl Default for FollowUp {
    fn default() -> Self {
        Self {
            ts: Utc::now(),
            kind: String::new(),
            text: String::new(),
            next_action: String::new(),
            next_date: String::new(),
        }
    }
}

/// Visibility of one evidence channel on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceStatus {
    /// Reference recorded (required or not).
    Ok,
    /// Required by the activity but not yet recorded.
    Missing,
    /// Not required and not recorded; views omit the marker.
    Hidden,
}

/// A recurring HR/finance obligation tracked on the 12-month grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub category: String,
    pub title: String,
    pub owner: String,
    pub supplier: String,
    pub periodicity: Periodicity,
    pub due_type: DueType,
    /// Nominal day of month, clamped to `[1, 31]`; `None` = no day set.
    pub due_day: Option<u32>,
    /// Zero-based month, meaningful only for `DueType::AnnualMonthDay`.
    pub due_month: u32,
    pub notes: String,
    /// Whether evidence channel A must be referenced on each cell.
    pub require_a: bool,
    /// Whether evidence channel B must be referenced on each cell.
    pub require_b: bool,
    /// Inactive activities are excluded from applicability and totals.
    pub active: bool,
    /// Sparse `year -> month -> Entry` ledger.
    pub entries: BTreeMap<i32, BTreeMap<u32, Entry>>,
    pub follow_ups: Vec<FollowUp>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: String::new(),
            title: String::new(),
            owner: String::new(),
            supplier: String::new(),
            periodicity: Periodicity::Monthly,
            due_type: DueType::None,
            due_day: None,
            due_month: 0,
            notes: String::new(),
            require_a: false,
            require_b: false,
            active: true,
            entries: BTreeMap::new(),
            follow_ups: Vec::new(),
        }
    }
}

impl Activity {
    /// Creates an active activity with a fresh stable id.
    pub fn new(category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: category.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the due rule, clamping the day at this write boundary.
    pub fn set_due(&mut self, due_type: DueType, day: Option<u32>, month: u32) {
        self.due_type = due_type;
        self.due_day = match due_type {
            DueType::None => None,
            _ => clamp_day(day),
        };
        self.due_month = month.min(11);
    }

    /// Read access to a month entry; absent months stay absent.
    pub fn entry(&self, year: i32, month: u32) -> Option<&Entry> {
        self.entries.get(&year).and_then(|months| months.get(&month))
    }

    /// Write access; the entry is created empty on first use.
    pub fn entry_mut(&mut self, year: i32, month: u32) -> &mut Entry {
        self.entries.entry(year).or_default().entry(month).or_default()
    }

    /// Appends a follow-up record. History is never rewritten.
    pub fn push_follow_up(&mut self, item: FollowUp) {
        self.follow_ups.push(item);
    }

    /// Per-channel evidence status for one cell.
    ///
    /// A recorded reference is always `Ok`; a required-but-empty channel is
    /// `Missing`; an optional empty channel is `Hidden`.
    pub fn evidence_state(&self, entry: Option<&Entry>) -> (EvidenceStatus, EvidenceStatus) {
        let channel = |required: bool, filled: bool| {
            if filled {
                EvidenceStatus::Ok
            } else if required {
                EvidenceStatus::Missing
            } else {
                EvidenceStatus::Hidden
            }
        };
        let a_filled = entry.is_some_and(|e| !e.evidence.channel_a.trim().is_empty());
        let b_filled = entry.is_some_and(|e| !e.evidence.channel_b.trim().is_empty());
        (
            channel(self.require_a, a_filled),
            channel(self.require_b, b_filled),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, DueType, EvidenceStatus};
    use crate::model::entry::Entry;

    #[test]
    fn new_activity_defaults() {
        let activity = Activity::new("Benefits", "Health plan invoice check");
        assert!(!activity.id.is_empty());
        assert!(activity.active);
        assert_eq!(activity.due_type, DueType::None);
        assert!(activity.entries.is_empty());
        assert!(activity.follow_ups.is_empty());
    }

    #[test]
    fn set_due_clamps_day_and_month() {
        let mut activity = Activity::new("Suppliers", "Invoice check");
        activity.set_due(DueType::MonthlyDay, Some(45), 14);
        assert_eq!(activity.due_day, Some(31));
        assert_eq!(activity.due_month, 11);

        activity.set_due(DueType::None, Some(10), 2);
        assert_eq!(activity.due_day, None);
    }

    #[test]
    fn entry_mut_creates_lazily() {
        let mut activity = Activity::new("Suppliers", "Invoice check");
        assert!(activity.entry(2024, 3).is_none());
        activity.entry_mut(2024, 3).note = "checked".into();
        assert_eq!(activity.entry(2024, 3).map(|e| e.note.as_str()), Some("checked"));
    }

    #[test]
    fn evidence_state_follows_requirements() {
        let mut activity = Activity::new("Benefits", "Invoice check");
        activity.require_a = true;

        let (a, b) = activity.evidence_state(None);
        assert_eq!(a, EvidenceStatus::Missing);
        assert_eq!(b, EvidenceStatus::Hidden);

        let mut entry = Entry::default();
        entry.evidence.channel_a = "TCK-10".into();
        entry.evidence.channel_b = "REF-7".into();
        let (a, b) = activity.evidence_state(Some(&entry));
        assert_eq!(a, EvidenceStatus::Ok);
        assert_eq!(b, EvidenceStatus::Ok);
    }
}
