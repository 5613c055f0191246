//! Month entry ledger.
//!
//! # Responsibility
//! - Hold completion state, provision/payment lines and evidence references
//!   for one (activity, year, month) cell.
//! - Keep the legacy scalar mirrors (`value`, `provisioned`, `executed`)
//!   consistent with the canonical line arrays.
//!
//! # Invariants
//! - The line arrays are the canonical amount store; the mirrors are
//!   derived projections recomputed on every line mutation.
//! - An empty line array leaves its mirror absent (`None`), never `Some(0)`,
//!   so the legacy fallback chain stays observable.
//! - `done_at` is set exactly on the false -> true transition of `done` and
//!   cleared on the way back.

use crate::model::money::{sum_lines, MoneyLine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// References into the two external evidence channels (e.g. ticket ids).
///
/// Independent of the requirement flags on the owning activity: a reference
/// may be recorded even when the channel is not required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Evidence {
    pub channel_a: String,
    pub channel_b: String,
}

/// Ledger record for one activity in one (year, month) cell.
///
/// Every field carries a serde default so entries written by older schema
/// versions normalize on load without losing accompanying line arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    pub done: bool,
    /// Set exactly when `done` flips to true; cleared when it flips back.
    #[serde(deserialize_with = "lenient_timestamp")]
    pub done_at: Option<DateTime<Utc>>,
    /// Oldest schema only knew `value` (= provisioned).
    pub value: Option<f64>,
    /// Mirror of the provision-line sum; `None` while no lines exist.
    pub provisioned: Option<f64>,
    /// Mirror of the payment-line sum; `None` while no lines exist.
    pub executed: Option<f64>,
    /// Planned amounts, ordered as entered.
    pub provisions: Vec<MoneyLine>,
    /// Actual amounts, ordered as entered.
    pub payments: Vec<MoneyLine>,
    pub note: String,
    pub evidence: Evidence,
}

impl Entry {
    /// Total planned amount with the legacy fallback chain:
    /// line sum -> `provisioned` -> `value` -> 0.
    pub fn provisioned_total(&self) -> f64 {
        if !self.provisions.is_empty() {
            return sum_lines(&self.provisions);
        }
        if let Some(p) = self.provisioned.filter(|v| v.is_finite()) {
            return p;
        }
        if let Some(v) = self.value.filter(|v| v.is_finite()) {
            return v;
        }
        0.0
    }

    /// Total executed amount with the legacy fallback chain:
    /// payment sum -> `executed` -> (when done) `provisioned_total` -> 0.
    ///
    /// A completed task with no recorded execution is assumed to have
    /// executed its full provision.
    pub fn executed_total(&self) -> f64 {
        if !self.payments.is_empty() {
            return sum_lines(&self.payments);
        }
        if let Some(e) = self.executed.filter(|v| v.is_finite()) {
            return e;
        }
        if self.done {
            return self.provisioned_total();
        }
        0.0
    }

    /// Replaces both line arrays and recomputes the mirrors as one unit.
    ///
    /// Callers hand in already-normalized lines (see
    /// [`crate::model::money::normalize_lines`]); surviving order is kept.
    pub fn set_lines(&mut self, provisions: Vec<MoneyLine>, payments: Vec<MoneyLine>) {
        self.provisions = provisions;
        self.payments = payments;
        self.recompute_mirrors();
    }

    /// Recomputes `provisioned`/`executed`/`value` from the line arrays.
    ///
    /// Must run synchronously after any line mutation, before any reader.
    pub fn recompute_mirrors(&mut self) {
        self.provisioned = if self.provisions.is_empty() {
            None
        } else {
            Some(sum_lines(&self.provisions))
        };
        self.executed = if self.payments.is_empty() {
            None
        } else {
            Some(sum_lines(&self.payments))
        };
        self.value = self.provisioned;
    }

    /// Seeds line arrays from positive legacy scalars on old entries.
    ///
    /// Runs at snapshot load so bases written before the multi-line schema
    /// show their amounts as editable lines. Entries that already carry
    /// lines are left untouched.
    pub fn adopt_legacy_lines(&mut self) {
        let prov = self.provisioned_total();
        if self.provisions.is_empty() && prov.is_finite() && prov > 0.0 {
            self.provisions.push(MoneyLine::amount(prov));
        }
        if let Some(exec) = self.executed.filter(|v| v.is_finite() && *v > 0.0) {
            if self.payments.is_empty() {
                self.payments.push(MoneyLine::amount(exec));
            }
        }
    }

    /// Flips completion state, stamping or clearing `done_at`.
    pub fn set_done(&mut self, done: bool, now: DateTime<Utc>) {
        if done && !self.done {
            self.done_at = Some(now);
        }
        if !done {
            self.done_at = None;
        }
        self.done = done;
    }
}

/// Accepts RFC 3339 strings, empty strings and nulls for `doneAt`.
///
/// Older bases persisted `doneAt: ""` for "never completed"; anything
/// unparsable normalizes to `None` instead of failing the load.
pub(crate) fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|text| {
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
