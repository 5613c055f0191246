//! Applicability and due-date engine.
//!
//! # Responsibility
//! - Decide whether an activity applies to a month and when it is due.
//! - Derive overdue, gap and continuity status for grid and reports.
//!
//! # Invariants
//! - All functions are pure queries over `(activity[, year, month])`.
//! - Overdue status is evaluated against the live clock, never cached.
//! - A completed entry is never overdue, regardless of its due date.

use crate::calendar::{clamp_day, end_of_day, MONTH_ABBR};
use crate::model::activity::{Activity, DueType, Periodicity};
use chrono::{Local, NaiveDateTime};

/// Whether the activity applies to the given zero-based month.
///
/// Annual activities without a month-scoped due rule stay applicable in
/// every month; callers rely on this behavior as-is.
pub fn is_applicable(activity: &Activity, month: u32) -> bool {
    if !activity.active {
        return false;
    }
    if activity.periodicity == Periodicity::Annual && activity.due_type == DueType::AnnualMonthDay {
        return activity.due_month == month;
    }
    true
}

/// End-of-day due timestamp for the given (year, month), or `None` when no
/// deadline resolves there.
pub fn due_date(activity: &Activity, year: i32, month: u32) -> Option<NaiveDateTime> {
    if !activity.active {
        return None;
    }
    match activity.due_type {
        DueType::MonthlyDay => {
            let day = clamp_day(activity.due_day)?;
            end_of_day(year, month, day)
        }
        DueType::AnnualMonthDay => {
            let day = clamp_day(activity.due_day)?;
            if activity.due_month != month {
                return None;
            }
            end_of_day(year, activity.due_month, day)
        }
        DueType::None => None,
    }
}

/// Overdue status against an explicit clock.
pub fn is_overdue_at(activity: &Activity, year: i32, month: u32, now: NaiveDateTime) -> bool {
    if !is_applicable(activity, month) {
        return false;
    }
    let Some(due) = due_date(activity, year, month) else {
        return false;
    };
    if activity.entry(year, month).is_some_and(|e| e.done) {
        return false;
    }
    now > due
}

/// Overdue status against the wall clock.
pub fn is_overdue(activity: &Activity, year: i32, month: u32) -> bool {
    is_overdue_at(activity, year, month, Local::now().naive_local())
}

/// True when an earlier applicable month of the same year is not done.
///
/// A month with no entry counts as not done. Feeds the "gap" visual state
/// only; totals never consult this.
pub fn has_gap_before(activity: &Activity, year: i32, month: u32) -> bool {
    (0..month).any(|m| {
        is_applicable(activity, m) && !activity.entry(year, m).is_some_and(|e| e.done)
    })
}

/// Last month index of the unbroken applicable-and-done prefix of the year.
///
/// Scans January to December, stopping at the first applicable month that
/// is not done; `None` means no applicable month was completed before the
/// first break. Encodes "on track through month X".
pub fn continuity_through_month(activity: &Activity, year: i32) -> Option<u32> {
    let mut last = None;
    for month in 0..12 {
        if !is_applicable(activity, month) {
            continue;
        }
        if !activity.entry(year, month).is_some_and(|e| e.done) {
            break;
        }
        last = Some(month);
    }
    last
}

/// Human label for the due rule ("Day 10", "Feb day 28", "No deadline").
pub fn due_text(activity: &Activity) -> String {
    match activity.due_type {
        DueType::MonthlyDay => match clamp_day(activity.due_day) {
            Some(day) => format!("Day {day}"),
            None => "No deadline".to_string(),
        },
        DueType::AnnualMonthDay => match clamp_day(activity.due_day) {
            Some(day) if activity.due_month <= 11 => {
                format!("{} day {day}", MONTH_ABBR[activity.due_month as usize])
            }
            _ => "No deadline".to_string(),
        },
        DueType::None => "No deadline".to_string(),
    }
}
