//! Use-case services over the domain core.
//!
//! # Responsibility
//! - Hold the explicit application state (`Tracker`) and its operations.
//! - Build the text payloads consumed by the outer IO layer.
//!
//! # Invariants
//! - The rendering layer never mutates domain state except through these
//!   operations.

pub mod export;
pub mod tracker;
