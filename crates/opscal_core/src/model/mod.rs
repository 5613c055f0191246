//! Domain model for the operational compliance calendar.
//!
//! # Responsibility
//! - Define the canonical activity / entry / money-line structures.
//! - Keep the multi-line ledger and its legacy scalar mirrors consistent.
//!
//! # Invariants
//! - Every activity is identified by a stable string id.
//! - Line arrays are the canonical amount store; legacy fields are derived.
//! - Loading an older base normalizes missing fields instead of failing.

pub mod activity;
pub mod entry;
pub mod money;
