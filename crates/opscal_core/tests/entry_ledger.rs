use opscal_core::{normalize_lines, Entry, LineDraft, MoneyLine};
use chrono::Utc;

#[test]
fn provisioned_total_prefers_lines() {
    let mut entry = Entry::default();
    entry.set_lines(
        vec![MoneyLine::amount(100.0), MoneyLine::amount(50.0)],
        vec![],
    );
    assert_eq!(entry.provisioned_total(), 150.0);
}

#[test]
fn provisioned_total_falls_back_to_legacy_fields() {
    let entry = Entry {
        provisioned: Some(120.0),
        value: Some(999.0),
        ..Entry::default()
    };
    assert_eq!(entry.provisioned_total(), 120.0);

    let oldest = Entry {
        value: Some(80.0),
        ..Entry::default()
    };
    assert_eq!(oldest.provisioned_total(), 80.0);

    assert_eq!(Entry::default().provisioned_total(), 0.0);
}

#[test]
fn executed_total_falls_back_to_provision_when_done() {
    let mut entry = Entry::default();
    entry.set_lines(
        vec![MoneyLine::amount(100.0), MoneyLine::amount(50.0)],
        vec![],
    );
    assert_eq!(entry.executed_total(), 0.0);

    entry.set_done(true, Utc::now());
    assert_eq!(entry.executed_total(), 150.0);
}

#[test]
fn executed_total_prefers_payment_lines_over_done_policy() {
    let mut entry = Entry::default();
    entry.set_lines(vec![MoneyLine::amount(200.0)], vec![MoneyLine::amount(180.0)]);
    entry.set_done(true, Utc::now());
    assert_eq!(entry.executed_total(), 180.0);
}

#[test]
fn legacy_mirrors_are_never_stale_after_line_mutation() {
    let mut entry = Entry {
        provisioned: Some(10.0),
        executed: Some(5.0),
        value: Some(10.0),
        ..Entry::default()
    };

    entry.set_lines(
        vec![MoneyLine::amount(300.0), MoneyLine::amount(25.5)],
        vec![MoneyLine::amount(100.0)],
    );
    assert_eq!(entry.provisioned, Some(325.5));
    assert_eq!(entry.executed, Some(100.0));
    assert_eq!(entry.value, Some(325.5));

    entry.set_lines(vec![], vec![]);
    assert_eq!(entry.provisioned, None);
    assert_eq!(entry.executed, None);
    assert_eq!(entry.value, None);
}

#[test]
fn set_lines_keeps_surviving_order() {
    let drafts = vec![
        LineDraft::new("300,00", "base fee"),
        LineDraft::new("", ""),
        LineDraft::new("12,50", "adjustment"),
        LineDraft::new("", "awaiting credit note"),
    ];
    let lines = normalize_lines(&drafts);
    assert_eq!(
        lines,
        vec![
            MoneyLine::with_note(300.0, "base fee"),
            MoneyLine::with_note(12.5, "adjustment"),
            MoneyLine {
                amount: None,
                note: "awaiting credit note".into()
            },
        ]
    );
}

#[test]
fn loaded_legacy_entry_normalizes_without_losing_lines() {
    let json = serde_json::json!({
        "done": true,
        "doneAt": "2024-03-05T12:00:00Z",
        "value": 400.0,
        "provisions": [{ "amount": 250.0, "note": "kept" }]
    });
    let entry: Entry = serde_json::from_value(json).expect("legacy entry loads");

    // Missing fields default; the provided line array is untouched.
    assert_eq!(entry.provisions, vec![MoneyLine::with_note(250.0, "kept")]);
    assert!(entry.payments.is_empty());
    assert_eq!(entry.note, "");
    assert_eq!(entry.evidence.channel_a, "");
    assert!(entry.done_at.is_some());

    // Lines win over the stale legacy scalar.
    assert_eq!(entry.provisioned_total(), 250.0);
}

#[test]
fn done_at_tolerates_legacy_empty_string() {
    let json = serde_json::json!({ "done": false, "doneAt": "" });
    let entry: Entry = serde_json::from_value(json).expect("tolerant doneAt");
    assert_eq!(entry.done_at, None);
}
