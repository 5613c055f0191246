//! Tracker application state and use-case operations.
//!
//! # Responsibility
//! - Hold the in-memory activity set plus the selected (year, month).
//! - Provide the mutating operations the UI layer calls: activity CRUD,
//!   cell updates, follow-ups, filtering/sorting, snapshot import/export.
//!
//! # Invariants
//! - Every line-array mutation and its mirror recomputation happen inside
//!   one operation, before any reader runs.
//! - Activity deletion is the only way an individual ledger disappears.
//! - Import never merges archive payloads into live activities.

use crate::model::activity::{Activity, ActivityId, DueType, FollowUp, Periodicity};
use crate::model::entry::{Entry, Evidence};
use crate::model::money::{normalize_lines, LineDraft, MoneyLine};
use crate::propagate::{propagate_provision, DEFAULT_HORIZON};
use crate::report::{month_totals, summarize_month, MonthSummary, MonthTotals};
use crate::schedule::{due_date, is_applicable};
use crate::snapshot::{ArchiveRecord, Snapshot, SnapshotResult};
use chrono::{Datelike, Local, NaiveDateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Boundary rejection for tracker mutations.
///
/// Core queries stay total; only user-facing mutations can be rejected,
/// and a rejection leaves the tracker unchanged.
#[derive(Debug, PartialEq, Eq)]
pub enum TrackerError {
    /// Activity title is required.
    EmptyTitle,
    /// Follow-up text is required.
    EmptyFollowUpText,
    /// Target activity does not exist.
    ActivityNotFound(ActivityId),
    /// Cell edits are only allowed on applicable months.
    NotApplicable { month: u32 },
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "activity title must not be empty"),
            Self::EmptyFollowUpText => write!(f, "follow-up text must not be empty"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::NotApplicable { month } => {
                write!(f, "activity is not applicable in month {month}")
            }
        }
    }
}

impl Error for TrackerError {}

/// Import strategy for a previously exported base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Wholesale substitution of activities, archives and selected period.
    Replace,
    /// Keep definitional fields, start a fresh ledger.
    Structure,
    /// Keep definitional fields and seed the selected month from the
    /// source month's legacy scalar amounts.
    StructureWithValues,
    /// Leave live data untouched; file the snapshot as an opaque archive.
    ArchiveAll,
}

/// Form input for creating or editing an activity definition.
#[derive(Debug, Clone, Default)]
pub struct ActivityDraft {
    /// `None` creates a new activity; `Some` edits an existing one.
    pub id: Option<ActivityId>,
    pub category: String,
    pub title: String,
    pub owner: String,
    pub supplier: String,
    pub periodicity: Periodicity,
    pub due_type: DueType,
    pub due_day: Option<u32>,
    pub due_month: u32,
    pub notes: String,
    pub require_a: bool,
    pub require_b: bool,
    pub active: bool,
}

/// Form input for one month-cell edit.
#[derive(Debug, Clone, Default)]
pub struct CellUpdate {
    pub done: bool,
    pub provisions: Vec<LineDraft>,
    pub payments: Vec<LineDraft>,
    pub note: String,
    pub evidence: Evidence,
}

/// Form input for one follow-up record.
#[derive(Debug, Clone, Default)]
pub struct FollowUpDraft {
    pub kind: String,
    pub text: String,
    pub next_action: String,
    pub next_date: String,
}

/// Grid filter settings.
#[derive(Debug, Clone)]
pub struct ActivityFilter {
    /// Exact category match, case-insensitive; empty matches all.
    pub category: String,
    /// Substring match on owner, case-insensitive.
    pub owner: String,
    /// Substring match on supplier, case-insensitive.
    pub supplier: String,
    /// Exact periodicity match; `None` matches all.
    pub periodicity: Option<Periodicity>,
    /// Substring match over title and notes, case-insensitive.
    pub text: String,
    /// Keep only activities whose selected-month entry is not done.
    pub only_pending: bool,
    /// Keep only activities applicable to the selected month.
    pub only_applicable: bool,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            category: String::new(),
            owner: String::new(),
            supplier: String::new(),
            periodicity: None,
            text: String::new(),
            only_pending: false,
            only_applicable: true,
        }
    }
}

/// Whole application state: selected period, activity set, archives.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    pub year: i32,
    pub month: u32,
    pub activities: Vec<Activity>,
    pub archives: Vec<ArchiveRecord>,
}

impl Tracker {
    /// Empty tracker positioned on the given period.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.min(11),
            activities: Vec::new(),
            archives: Vec::new(),
        }
    }

    /// Tracker seeded with a small supplier/benefits base, positioned on
    /// the current month. Used by the probe binary and fresh installs.
    pub fn seed_demo() -> Self {
        let today = Local::now().date_naive();
        let mut tracker = Self::new(today.year(), today.month0());

        let mut seed = |category: &str, title: &str, supplier: &str, day: u32| {
            let mut activity = Activity::new(category, title);
            activity.owner = "HR/Finance".to_string();
            activity.supplier = supplier.to_string();
            activity.set_due(DueType::MonthlyDay, Some(day), 0);
            activity.require_a = true;
            activity.require_b = true;
            tracker.activities.push(activity);
        };

        seed("Suppliers", "Payroll provider invoice check", "Acme Payroll", 10);
        seed("Suppliers", "Staffing agency invoice check", "TempWork Ltd", 10);
        seed("Benefits", "Health plan invoice check", "CareFirst Health", 10);
        seed("Benefits", "Meal voucher purchase", "LunchCard", 3);
        seed("Benefits", "Life insurance invoice check", "SafeLife", 10);

        let mut annual = Activity::new("Annual", "Yearly earnings statement filing");
        annual.owner = "Payroll".to_string();
        annual.periodicity = Periodicity::Annual;
        annual.set_due(DueType::AnnualMonthDay, Some(28), 1);
        tracker.activities.push(annual);

        tracker
    }

    /// Moves the selected period; out-of-range months clamp to December.
    pub fn select_period(&mut self, year: i32, month: u32) {
        self.year = year;
        self.month = month.min(11);
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    fn activity_mut(&mut self, id: &str) -> Option<&mut Activity> {
        self.activities.iter_mut().find(|a| a.id == id)
    }

    /// Creates or edits an activity definition from form input.
    ///
    /// New activities are prepended so they surface at the top of the grid.
    /// An empty title is rejected and the tracker is left unchanged; an
    /// empty category falls back to `"Other"`.
    pub fn upsert_activity(&mut self, draft: ActivityDraft) -> TrackerResult<ActivityId> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(TrackerError::EmptyTitle);
        }
        let category = {
            let trimmed = draft.category.trim();
            if trimmed.is_empty() {
                "Other".to_string()
            } else {
                trimmed.to_string()
            }
        };

        let apply = |activity: &mut Activity| {
            activity.category = category.clone();
            activity.title = title.clone();
            activity.owner = draft.owner.trim().to_string();
            activity.supplier = draft.supplier.trim().to_string();
            activity.periodicity = draft.periodicity;
            activity.set_due(draft.due_type, draft.due_day, draft.due_month);
            activity.notes = draft.notes.trim().to_string();
            activity.require_a = draft.require_a;
            activity.require_b = draft.require_b;
            activity.active = draft.active;
        };

        let id = match &draft.id {
            Some(id) => {
                let activity = self
                    .activity_mut(id)
                    .ok_or_else(|| TrackerError::ActivityNotFound(id.clone()))?;
                apply(activity);
                id.clone()
            }
            None => {
                let mut activity = Activity::new("", "");
                apply(&mut activity);
                let id = activity.id.clone();
                self.activities.insert(0, activity);
                id
            }
        };

        info!("event=activity_saved module=tracker status=ok id={id}");
        Ok(id)
    }

    /// Deletes an activity and its whole ledger. Returns false when the id
    /// is unknown.
    pub fn delete_activity(&mut self, id: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        let deleted = self.activities.len() != before;
        if deleted {
            info!("event=activity_deleted module=tracker status=ok id={id}");
        }
        deleted
    }

    /// Applies one month-cell edit as a single unit.
    ///
    /// Order of effects: completion transition (stamping `done_at`), line
    /// normalization + mirror recomputation, the completed-without-payment
    /// policy, note/evidence updates, then forward propagation of the
    /// resulting provisioned total into the next six months.
    pub fn update_entry(
        &mut self,
        id: &str,
        year: i32,
        month: u32,
        update: CellUpdate,
    ) -> TrackerResult<()> {
        let activity = self
            .activity_mut(id)
            .ok_or_else(|| TrackerError::ActivityNotFound(id.to_string()))?;
        if !is_applicable(activity, month) {
            return Err(TrackerError::NotApplicable { month });
        }

        let entry = activity.entry_mut(year, month);
        entry.set_done(update.done, Utc::now());
        entry.set_lines(
            normalize_lines(&update.provisions),
            normalize_lines(&update.payments),
        );
        apply_done_payment_policy(entry);
        entry.note = update.note.trim().to_string();
        entry.evidence = Evidence {
            channel_a: update.evidence.channel_a.trim().to_string(),
            channel_b: update.evidence.channel_b.trim().to_string(),
        };

        let base = entry.provisioned_total();
        propagate_provision(activity, year, month, base, DEFAULT_HORIZON);

        info!("event=entry_updated module=tracker status=ok id={id} year={year} month={month}");
        Ok(())
    }

    /// Appends a follow-up record to the activity's history.
    pub fn add_follow_up(&mut self, id: &str, draft: FollowUpDraft) -> TrackerResult<()> {
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(TrackerError::EmptyFollowUpText);
        }
        let activity = self
            .activity_mut(id)
            .ok_or_else(|| TrackerError::ActivityNotFound(id.to_string()))?;
        activity.push_follow_up(FollowUp {
            ts: Utc::now(),
            kind: draft.kind.trim().to_string(),
            text,
            next_action: draft.next_action.trim().to_string(),
            next_date: draft.next_date.trim().to_string(),
        });
        info!("event=follow_up_added module=tracker status=ok id={id}");
        Ok(())
    }

    /// Active activities passing the given grid filter, in grid order.
    pub fn filtered(&self, filter: &ActivityFilter) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| self.matches(a, filter))
            .collect()
    }

    fn matches(&self, activity: &Activity, filter: &ActivityFilter) -> bool {
        if !activity.active {
            return false;
        }
        if !filter.category.is_empty()
            && !activity.category.eq_ignore_ascii_case(&filter.category)
        {
            return false;
        }
        if !contains_ci(&activity.owner, &filter.owner) {
            return false;
        }
        if !contains_ci(&activity.supplier, &filter.supplier) {
            return false;
        }
        if let Some(periodicity) = filter.periodicity {
            if activity.periodicity != periodicity {
                return false;
            }
        }
        if !filter.text.is_empty() {
            let haystack = format!("{} {}", activity.title, activity.notes).to_lowercase();
            if !haystack.contains(&filter.text.to_lowercase()) {
                return false;
            }
        }
        if filter.only_applicable && !is_applicable(activity, self.month) {
            return false;
        }
        if filter.only_pending {
            let done = activity
                .entry(self.year, self.month)
                .is_some_and(|e| e.done);
            if done {
                return false;
            }
        }
        true
    }

    /// Orders activities by the selected month's due date, no-deadline last.
    pub fn sort_by_due_date(&mut self) {
        let (year, month) = (self.year, self.month);
        self.activities.sort_by(|a, b| {
            match (due_date(a, year, month), due_date(b, year, month)) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (Some(_), None) => std::cmp::Ordering::Less,
                (Some(da), Some(db)) => da.cmp(&db),
            }
        });
    }

    /// Roll-up of the selected period against an explicit clock.
    pub fn summary_at(&self, now: NaiveDateTime) -> MonthSummary {
        summarize_month(&self.activities, self.year, self.month, now)
    }

    /// Roll-up of the selected period against the wall clock.
    pub fn summary(&self) -> MonthSummary {
        self.summary_at(Local::now().naive_local())
    }

    /// Money totals for an arbitrary (year, month) pair, as used by exports.
    pub fn totals_for(&self, year: i32, month: u32) -> MonthTotals {
        month_totals(&self.activities, year, month, Local::now().naive_local())
    }

    /// Builds the export snapshot of the whole state.
    pub fn export_snapshot(&self) -> Snapshot {
        info!(
            "event=snapshot_exported module=tracker status=ok activities={}",
            self.activities.len()
        );
        Snapshot::export(
            self.year,
            self.month,
            self.activities.clone(),
            self.archives.clone(),
        )
    }

    /// Imports snapshot text under the given mode.
    ///
    /// Parse failures leave the tracker unchanged.
    pub fn import_snapshot(&mut self, text: &str, mode: ImportMode) -> SnapshotResult<()> {
        let snapshot = Snapshot::from_json(text)?;
        let imported = snapshot.activities.len();

        match mode {
            ImportMode::Replace => {
                if let Some(year) = snapshot.year {
                    self.year = year;
                }
                if let Some(month) = snapshot.month {
                    self.month = month.min(11);
                }
                self.activities = snapshot.activities;
                self.archives = snapshot.archives;
            }
            ImportMode::Structure => {
                self.activities = snapshot
                    .activities
                    .into_iter()
                    .map(strip_to_structure)
                    .collect();
            }
            ImportMode::StructureWithValues => {
                let src_year = snapshot.year.unwrap_or(self.year);
                let src_month = snapshot.month.unwrap_or(self.month);
                let (year, month) = (self.year, self.month);
                self.activities = snapshot
                    .activities
                    .into_iter()
                    .map(|activity| {
                        seed_structure_with_values(activity, src_year, src_month, year, month)
                    })
                    .collect();
            }
            ImportMode::ArchiveAll => {
                // Raw text parsed once more so the archive keeps the
                // snapshot byte-faithful, including fields core ignores.
                let data: serde_json::Value = serde_json::from_str(text)?;
                let label = format!(
                    "Imported archive: {}-{:02}",
                    snapshot.year.map_or_else(|| "?".to_string(), |y| y.to_string()),
                    snapshot.month.unwrap_or(0) + 1
                );
                self.archives.push(ArchiveRecord {
                    ts: Some(Utc::now()),
                    label,
                    data,
                });
            }
        }

        info!(
            "event=snapshot_imported module=tracker status=ok mode={mode:?} activities={imported}"
        );
        Ok(())
    }
}

/// Completed cells with no recorded payment execute their full provision.
///
/// Seeds one automatic payment line so the assumption becomes visible and
/// editable, then recomputes the mirrors.
fn apply_done_payment_policy(entry: &mut Entry) {
    let provisioned = entry.provisioned_total();
    if entry.done && entry.payments.is_empty() && provisioned > 0.0 {
        entry
            .payments
            .push(MoneyLine::with_note(provisioned, "Auto (completed)"));
        entry.recompute_mirrors();
    }
}

/// Keeps definitional fields, drops ledger and history.
fn strip_to_structure(mut activity: Activity) -> Activity {
    activity.entries.clear();
    activity.follow_ups.clear();
    activity
}

/// Structure import that additionally seeds the target month from the
/// source month's legacy scalar amounts (not-done, cleared evidence).
fn seed_structure_with_values(
    activity: Activity,
    src_year: i32,
    src_month: u32,
    target_year: i32,
    target_month: u32,
) -> Activity {
    let source = activity
        .entry(src_year, src_month)
        .or_else(|| activity.entry(target_year, target_month))
        .cloned();

    let mut activity = strip_to_structure(activity);
    let mut entry = Entry::default();

    if let Some(source) = source {
        entry.provisioned = source
            .provisioned
            .filter(|v| v.is_finite())
            .or_else(|| source.value.filter(|v| v.is_finite()));
        entry.executed = source.executed.filter(|v| v.is_finite());
        entry.value = entry.provisioned;
        entry.note = source.note;
    }

    *activity.entry_mut(target_year, target_month) = entry;
    activity
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{ActivityDraft, Tracker, TrackerError};

    #[test]
    fn upsert_rejects_empty_title() {
        let mut tracker = Tracker::new(2024, 0);
        let err = tracker
            .upsert_activity(ActivityDraft {
                title: "   ".into(),
                active: true,
                ..ActivityDraft::default()
            })
            .unwrap_err();
        assert_eq!(err, TrackerError::EmptyTitle);
        assert!(tracker.activities.is_empty());
    }

    #[test]
    fn upsert_defaults_empty_category() {
        let mut tracker = Tracker::new(2024, 0);
        let id = tracker
            .upsert_activity(ActivityDraft {
                title: "Quarterly filing".into(),
                active: true,
                ..ActivityDraft::default()
            })
            .expect("saved");
        assert_eq!(tracker.activity(&id).map(|a| a.category.as_str()), Some("Other"));
    }

    #[test]
    fn new_activities_are_prepended() {
        let mut tracker = Tracker::new(2024, 0);
        for title in ["first", "second"] {
            tracker
                .upsert_activity(ActivityDraft {
                    title: title.into(),
                    active: true,
                    ..ActivityDraft::default()
                })
                .expect("saved");
        }
        assert_eq!(tracker.activities[0].title, "second");
        assert_eq!(tracker.activities[1].title, "first");
    }
}
