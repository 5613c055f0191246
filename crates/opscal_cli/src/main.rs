//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `opscal_core` linkage.
//! - Print a seeded month roll-up for quick local sanity checks.

use opscal_core::Tracker;

fn main() {
    println!("opscal_core version={}", opscal_core::core_version());

    let tracker = Tracker::seed_demo();
    let summary = tracker.summary();
    println!(
        "period={}-{:02} applicable={} done={} overdue={} pending={}",
        tracker.year,
        tracker.month + 1,
        summary.applicable,
        summary.done,
        summary.overdue,
        summary.pending
    );
}
