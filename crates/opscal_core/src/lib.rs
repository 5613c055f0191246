//! Core domain logic for OpsCal, an operational compliance calendar.
//! This crate is the single source of truth for business invariants.

pub mod calendar;
pub mod logging;
pub mod model;
pub mod propagate;
pub mod report;
pub mod schedule;
pub mod service;
pub mod snapshot;

pub use calendar::{add_months, clamp_day, days_in_month, end_of_day, MONTH_ABBR};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{Activity, ActivityId, DueType, EvidenceStatus, FollowUp, Periodicity};
pub use model::entry::{Entry, Evidence};
pub use model::money::{
    format_amount_input, format_currency, normalize_lines, parse_decimal, sum_lines, LineDraft,
    MoneyLine,
};
pub use propagate::{propagate_provision, DEFAULT_HORIZON};
pub use report::{month_totals, summarize_month, MonthSummary, MonthTotals};
pub use schedule::{
    continuity_through_month, due_date, due_text, has_gap_before, is_applicable, is_overdue,
    is_overdue_at,
};
pub use service::export::{
    follow_up_email, snapshot_file_name, snapshot_text, spreadsheet_file_name, spreadsheet_html,
};
pub use service::tracker::{
    ActivityDraft, ActivityFilter, CellUpdate, FollowUpDraft, ImportMode, Tracker, TrackerError,
    TrackerResult,
};
pub use snapshot::{ArchiveRecord, Snapshot, SnapshotError, SnapshotResult, SNAPSHOT_KIND};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
