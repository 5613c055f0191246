//! Forward propagation of provisioned baselines.
//!
//! # Responsibility
//! - Seed a provisioned baseline into the following empty months after a
//!   cell edit, so recurring amounts do not need re-typing.
//!
//! # Invariants
//! - A target month whose provisioned total is already nonzero is never
//!   touched; propagation fills gaps, it never clobbers user data.
//! - Running the same propagation twice yields the same state (seeded
//!   months are nonzero on the second pass).
//! - Applicability is deliberately not consulted; entries are seeded
//!   blindly and the grid decides what to show.

use crate::calendar::add_months;
use crate::model::activity::Activity;
use crate::model::money::MoneyLine;

/// How many months ahead a cell edit propagates its provisioned total.
pub const DEFAULT_HORIZON: u32 = 6;

/// Seeds `base` into the next `horizon` months where nothing is provisioned.
///
/// No-op when `base` is non-finite or not positive. Each seeded month gets
/// a single provision line plus the matching legacy mirrors; months with a
/// nonzero provisioned total are left exactly as they are.
pub fn propagate_provision(
    activity: &mut Activity,
    year: i32,
    month: u32,
    base: f64,
    horizon: u32,
) {
    if !base.is_finite() || base <= 0.0 {
        return;
    }

    for step in 1..=horizon {
        let (target_year, target_month) = add_months(year, month, step);
        let entry = activity.entry_mut(target_year, target_month);

        if entry.provisioned_total() != 0.0 {
            continue;
        }
        if entry.provisions.is_empty() {
            entry.provisions.push(MoneyLine::amount(base));
        }
        entry.provisioned = Some(base);
        entry.value = Some(base);
    }
}
