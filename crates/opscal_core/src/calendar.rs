//! Month/day arithmetic shared by scheduling and propagation.
//!
//! # Responsibility
//! - Provide the `(year, month)` carry arithmetic used when walking the grid.
//! - Resolve nominal due days against real month lengths.
//!
//! # Invariants
//! - Months are zero-based (`0 = Jan .. 11 = Dec`) everywhere in core.
//! - `add_months` carries the year via floor division on 12.
//! - Helpers are total: out-of-range input is normalized, never rejected.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

/// Three-letter month labels used by exports and due-date text.
pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Advances `(year, month)` by `n` months, carrying the year on overflow.
pub fn add_months(year: i32, month: u32, n: u32) -> (i32, u32) {
    let total = month + n;
    (year + (total / 12) as i32, total % 12)
}

/// Clamps a nominal due day into `[1, 31]`.
///
/// Returns `None` for zero or absent input; callers treat that as "no
/// deadline". Calendar overflow (day 31 in February) is resolved later by
/// [`end_of_day`], not here.
pub fn clamp_day(day: Option<u32>) -> Option<u32> {
    match day {
        None | Some(0) => None,
        Some(d) if d > 31 => Some(31),
        Some(d) => Some(d),
    }
}

/// Number of days in the given zero-based month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// End-of-day timestamp on `day` within the given month, staying in-month.
///
/// Days past the month's end resolve to its last day, so a nominal day 31
/// never rolls into the next month.
pub fn end_of_day(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    if month > 11 {
        return None;
    }
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month + 1, day)
        .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
}
