//! Monetary line items and locale-aware amount parsing.
//!
//! # Responsibility
//! - Define the provision/payment line shape shared by the entry ledger.
//! - Parse user-entered amounts (`.` thousands separator, `,` decimal).
//! - Render currency text for exports.
//!
//! # Invariants
//! - Invalid or empty amount input parses to `None`, never to zero.
//! - A normalized line keeps either a valid non-negative amount or a
//!   non-empty note; everything else is silently dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One planned (provision) or actual (payment) amount with a free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MoneyLine {
    /// `None` means "no value", which is distinct from zero.
    pub amount: Option<f64>,
    pub note: String,
}

impl MoneyLine {
    /// Line carrying only an amount.
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            note: String::new(),
        }
    }

    /// Line carrying an amount and a note.
    pub fn with_note(amount: f64, note: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            note: note.into(),
        }
    }
}

/// Unparsed line input as typed into the cell form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineDraft {
    pub amount: String,
    pub note: String,
}

impl LineDraft {
    pub fn new(amount: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            note: note.into(),
        }
    }
}

/// Parses a locale-formatted decimal (`1.234,56` -> `1234.56`).
///
/// Whitespace and thousands dots are stripped, the decimal comma becomes a
/// dot. Empty or non-numeric input yields `None`.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = WHITESPACE_RE
        .replace_all(trimmed, "")
        .replace('.', "")
        .replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Sum of the valid (finite) amounts in a line array.
pub fn sum_lines(lines: &[MoneyLine]) -> f64 {
    lines
        .iter()
        .filter_map(|line| line.amount)
        .filter(|v| v.is_finite())
        .sum()
}

/// Applies the line-survival rule to a set of drafts.
///
/// A draft survives with a valid non-negative amount, or amount-less with a
/// non-empty note. Surviving lines keep their relative order.
pub fn normalize_lines(drafts: &[LineDraft]) -> Vec<MoneyLine> {
    let mut lines = Vec::new();
    for draft in drafts {
        let amount = parse_decimal(&draft.amount).filter(|v| *v >= 0.0);
        let note = draft.note.trim().to_string();
        match amount {
            Some(value) => lines.push(MoneyLine {
                amount: Some(value),
                note,
            }),
            None if !note.is_empty() => lines.push(MoneyLine { amount: None, note }),
            None => {}
        }
    }
    lines
}

/// Renders an amount as locale currency text (`R$ 1.234,56`).
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("R$ {sign}{grouped},{frac:02}")
}

/// Renders an amount back into form-input style (`1234,5`), empty for none.
pub fn format_amount_input(amount: Option<f64>) -> String {
    match amount {
        Some(v) if v.is_finite() => {
            let rounded = (v * 100.0).round() / 100.0;
            rounded.to_string().replace('.', ",")
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_amount_input, format_currency, normalize_lines, parse_decimal, sum_lines, LineDraft,
        MoneyLine,
    };

    #[test]
    fn parse_decimal_accepts_locale_formats() {
        assert_eq!(parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal("300"), Some(300.0));
        assert_eq!(parse_decimal(" 2 500,00 "), Some(2500.0));
        assert_eq!(parse_decimal("0"), Some(0.0));
    }

    #[test]
    fn parse_decimal_rejects_garbage_as_no_value() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("12,3,4"), None);
    }

    #[test]
    fn sum_lines_skips_missing_amounts() {
        let lines = vec![
            MoneyLine::amount(100.0),
            MoneyLine {
                amount: None,
                note: "awaiting invoice".into(),
            },
            MoneyLine::amount(50.0),
        ];
        assert_eq!(sum_lines(&lines), 150.0);
    }

    #[test]
    fn normalize_lines_survival_rule() {
        let drafts = vec![
            LineDraft::new("100,00", ""),
            LineDraft::new("", "note only"),
            LineDraft::new("", "  "),
            LineDraft::new("-5", ""),
            LineDraft::new("-5", "negative but noted"),
        ];
        let lines = normalize_lines(&drafts);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].amount, Some(100.0));
        assert_eq!(lines[1].amount, None);
        assert_eq!(lines[1].note, "note only");
        assert_eq!(lines[2].amount, None);
        assert_eq!(lines[2].note, "negative but noted");
    }

    #[test]
    fn format_currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(1234.5), "R$ 1.234,50");
        assert_eq!(format_currency(-20.0), "R$ -20,00");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
    }

    #[test]
    fn format_amount_input_roundtrips_comma() {
        assert_eq!(format_amount_input(Some(1234.5)), "1234,5");
        assert_eq!(format_amount_input(None), "");
    }
}
