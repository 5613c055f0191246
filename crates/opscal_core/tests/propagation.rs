use opscal_core::{propagate_provision, Activity, MoneyLine, DEFAULT_HORIZON};

fn activity() -> Activity {
    Activity::new("Suppliers", "Invoice check")
}

#[test]
fn propagate_seeds_following_empty_months() {
    let mut activity = activity();
    propagate_provision(&mut activity, 2024, 0, 300.0, DEFAULT_HORIZON);

    for month in 1..=6 {
        let entry = activity.entry(2024, month).expect("seeded entry");
        assert_eq!(entry.provisioned_total(), 300.0);
        assert_eq!(entry.provisions, vec![MoneyLine::amount(300.0)]);
        assert_eq!(entry.provisioned, Some(300.0));
        assert_eq!(entry.value, Some(300.0));
        assert!(!entry.done);
    }
    // The edited month itself is never touched.
    assert!(activity.entry(2024, 0).is_none());
    assert!(activity.entry(2024, 7).is_none());
}

#[test]
fn propagate_carries_the_year() {
    let mut activity = activity();
    propagate_provision(&mut activity, 2024, 10, 150.0, DEFAULT_HORIZON);

    assert_eq!(
        activity.entry(2024, 11).map(|e| e.provisioned_total()),
        Some(150.0)
    );
    for month in 0..=4 {
        assert_eq!(
            activity.entry(2025, month).map(|e| e.provisioned_total()),
            Some(150.0)
        );
    }
}

#[test]
fn propagate_never_overwrites_nonzero_months() {
    let mut activity = activity();
    propagate_provision(&mut activity, 2024, 0, 300.0, DEFAULT_HORIZON);

    // User reworks month 3 by hand.
    activity
        .entry_mut(2024, 3)
        .set_lines(vec![MoneyLine::amount(500.0)], vec![]);

    propagate_provision(&mut activity, 2024, 0, 300.0, DEFAULT_HORIZON);
    assert_eq!(
        activity.entry(2024, 3).map(|e| e.provisioned_total()),
        Some(500.0)
    );
    assert_eq!(
        activity.entry(2024, 4).map(|e| e.provisioned_total()),
        Some(300.0)
    );
}

#[test]
fn propagate_is_idempotent() {
    let mut once = activity();
    propagate_provision(&mut once, 2024, 0, 300.0, DEFAULT_HORIZON);

    let mut twice = once.clone();
    propagate_provision(&mut twice, 2024, 0, 300.0, DEFAULT_HORIZON);

    assert_eq!(once, twice);
}

#[test]
fn propagate_ignores_non_positive_baselines() {
    for base in [0.0, -10.0, f64::NAN] {
        let mut activity = activity();
        propagate_provision(&mut activity, 2024, 0, base, DEFAULT_HORIZON);
        assert!(activity.entries.is_empty());
    }
}

#[test]
fn propagate_ignores_applicability() {
    use opscal_core::{DueType, Periodicity};

    let mut activity = activity();
    activity.periodicity = Periodicity::Annual;
    activity.set_due(DueType::AnnualMonthDay, Some(28), 1);

    propagate_provision(&mut activity, 2024, 1, 900.0, 3);
    // Months 2..4 are not applicable for this annual activity, yet they
    // are still seeded; the grid decides what to show.
    for month in 2..=4 {
        assert_eq!(
            activity.entry(2024, month).map(|e| e.provisioned_total()),
            Some(900.0)
        );
    }
}
