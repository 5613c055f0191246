use chrono::{NaiveDate, NaiveDateTime};
use opscal_core::{
    continuity_through_month, due_date, due_text, has_gap_before, is_applicable, is_overdue_at,
    Activity, DueType, Periodicity,
};

fn monthly_activity(day: u32) -> Activity {
    let mut activity = Activity::new("Suppliers", "Invoice check");
    activity.set_due(DueType::MonthlyDay, Some(day), 0);
    activity
}

fn annual_activity(month: u32, day: u32) -> Activity {
    let mut activity = Activity::new("Annual", "Yearly filing");
    activity.periodicity = Periodicity::Annual;
    activity.set_due(DueType::AnnualMonthDay, Some(day), month);
    activity
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid test timestamp")
}

#[test]
fn inactive_activities_never_apply() {
    let mut activity = monthly_activity(10);
    activity.active = false;
    for month in 0..12 {
        assert!(!is_applicable(&activity, month));
    }
}

#[test]
fn annual_with_month_scoped_due_applies_only_in_its_month() {
    let activity = annual_activity(1, 28);
    assert!(is_applicable(&activity, 1));
    for month in (0..12).filter(|m| *m != 1) {
        assert!(!is_applicable(&activity, month));
    }
}

#[test]
fn annual_without_month_scoped_due_applies_every_month() {
    // Preserved quirk: an annual activity with a monthly due rule stays
    // applicable in all twelve months.
    let mut activity = monthly_activity(10);
    activity.periodicity = Periodicity::Annual;
    for month in 0..12 {
        assert!(is_applicable(&activity, month));
    }
}

#[test]
fn monthly_due_date_is_end_of_day() {
    let activity = monthly_activity(10);
    let due = due_date(&activity, 2024, 2).expect("march due date");
    assert_eq!(due.date(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    assert!(due > at(2024, 3, 10, 23));
}

#[test]
fn due_day_31_resolves_within_february() {
    let activity = monthly_activity(31);
    let due = due_date(&activity, 2025, 1).expect("february due date");
    assert_eq!(due.date(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
}

#[test]
fn annual_due_date_resolves_only_in_its_month() {
    let activity = annual_activity(10, 30);
    assert!(due_date(&activity, 2024, 10).is_some());
    assert_eq!(due_date(&activity, 2024, 9), None);
}

#[test]
fn no_due_rule_means_no_due_date() {
    let activity = Activity::new("Misc", "Ad-hoc check");
    assert_eq!(due_date(&activity, 2024, 5), None);
    assert!(!is_overdue_at(&activity, 2024, 5, at(2030, 1, 1, 0)));
}

#[test]
fn overdue_only_after_the_deadline_and_while_not_done() {
    let mut activity = monthly_activity(10);

    assert!(!is_overdue_at(&activity, 2024, 0, at(2024, 1, 9, 12)));
    assert!(is_overdue_at(&activity, 2024, 0, at(2024, 1, 11, 0)));

    activity.entry_mut(2024, 0).done = true;
    assert!(!is_overdue_at(&activity, 2024, 0, at(2024, 1, 11, 0)));
}

#[test]
fn overdue_is_false_for_non_applicable_months() {
    let activity = annual_activity(1, 10);
    assert!(!is_overdue_at(&activity, 2024, 5, at(2030, 1, 1, 0)));
}

#[test]
fn gap_counts_earlier_applicable_undone_months() {
    let mut activity = monthly_activity(10);
    activity.entry_mut(2024, 0).done = true;
    // Month 1 has no entry at all: still a gap.
    activity.entry_mut(2024, 2).done = true;

    assert!(!has_gap_before(&activity, 2024, 1));
    assert!(has_gap_before(&activity, 2024, 2));
    assert!(has_gap_before(&activity, 2024, 5));
}

#[test]
fn continuity_stops_at_first_incomplete_applicable_month() {
    let mut activity = monthly_activity(10);
    assert_eq!(continuity_through_month(&activity, 2024), None);

    activity.entry_mut(2024, 0).done = true;
    activity.entry_mut(2024, 1).done = true;
    activity.entry_mut(2024, 3).done = true;
    assert_eq!(continuity_through_month(&activity, 2024), Some(1));
}

#[test]
fn continuity_skips_non_applicable_months() {
    let mut activity = annual_activity(2, 15);
    activity.entry_mut(2024, 2).done = true;
    // Only March applies; the unbroken prefix runs through December.
    assert_eq!(continuity_through_month(&activity, 2024), Some(2));
}

#[test]
fn due_text_labels() {
    assert_eq!(due_text(&monthly_activity(10)), "Day 10");
    assert_eq!(due_text(&annual_activity(1, 28)), "Feb day 28");
    assert_eq!(due_text(&Activity::new("Misc", "Ad-hoc")), "No deadline");
}
