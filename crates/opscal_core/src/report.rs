//! Month roll-ups across the activity set.
//!
//! # Responsibility
//! - Count done/overdue/pending across the applicable subset of a month.
//! - Sum provisioned and executed totals and derive the signed gap.
//!
//! # Invariants
//! - done + overdue + pending always equals the applicable count.
//! - Inactive and non-applicable activities contribute nothing.
//! - Only positive totals enter the money sums.

use crate::model::activity::Activity;
use crate::schedule::{is_applicable, is_overdue_at};
use chrono::NaiveDateTime;

/// Roll-up of one (year, month) across the activity set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthSummary {
    pub applicable: usize,
    pub done: usize,
    pub overdue: usize,
    pub pending: usize,
    pub provisioned: f64,
    pub executed: f64,
    /// Signed: positive means under-executed, negative over-executed.
    pub gap: f64,
}

/// Money-only projection used by exports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthTotals {
    pub provisioned: f64,
    pub executed: f64,
    pub gap: f64,
}

/// Rolls up the given month against an explicit clock.
///
/// Every applicable activity lands in exactly one of done/overdue/pending:
/// done wins, then overdue (past due and not done), the rest is pending.
pub fn summarize_month(
    activities: &[Activity],
    year: i32,
    month: u32,
    now: NaiveDateTime,
) -> MonthSummary {
    let mut summary = MonthSummary::default();

    for activity in activities {
        if !activity.active || !is_applicable(activity, month) {
            continue;
        }
        summary.applicable += 1;

        let entry = activity.entry(year, month);
        let done = entry.is_some_and(|e| e.done);
        if done {
            summary.done += 1;
        } else if is_overdue_at(activity, year, month, now) {
            summary.overdue += 1;
        } else {
            summary.pending += 1;
        }

        if let Some(entry) = entry {
            let provisioned = entry.provisioned_total();
            let executed = entry.executed_total();
            if provisioned > 0.0 {
                summary.provisioned += provisioned;
            }
            if executed > 0.0 {
                summary.executed += executed;
            }
        }
    }

    summary.gap = summary.provisioned - summary.executed;
    summary
}

/// Provisioned/executed/gap for an arbitrary (year, month) pair.
pub fn month_totals(
    activities: &[Activity],
    year: i32,
    month: u32,
    now: NaiveDateTime,
) -> MonthTotals {
    let summary = summarize_month(activities, year, month, now);
    MonthTotals {
        provisioned: summary.provisioned,
        executed: summary.executed,
        gap: summary.gap,
    }
}
