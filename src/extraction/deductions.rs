//! Capture of unrecognized deduction lines.
//!
//! Inside a deductions section, any line with an amount whose label names no
//! known tax category becomes a [`DeductionLine`] in the extraction's
//! additional fields.

use tracing::debug;

use super::columns::{self, AmountToken, ColumnLayout};
use super::fields;
use crate::models::DeductionLine;

/// Maximum length of a normalized deduction key.
pub const MAX_KEY_LEN: usize = 50;

const SECTION_EXIT_MARKERS: [&str; 4] = ["net pay", "important notes", "basis of pay", "taxable"];

const MISSPELLINGS: [(&str, &str); 5] = [
    ("miscellanous", "Miscellaneous"),
    ("deducton", "Deduction"),
    ("insurence", "Insurance"),
    ("reimbursment", "Reimbursement"),
    ("retirment", "Retirement"),
];

/// Tracks whether the scan is inside a deductions section.
#[derive(Debug, Default)]
pub struct DeductionSection {
    active: bool,
}

impl DeductionSection {
    /// Updates the section state for a line and reports whether the line
    /// is a section boundary that carries no deduction of its own.
    pub fn observe(&mut self, lower: &str, tokens: &[AmountToken]) -> bool {
        if tokens.is_empty() && lower.contains("deductions") {
            self.active = true;
            return true;
        }
        if SECTION_EXIT_MARKERS.iter().any(|marker| lower.contains(marker)) {
            self.active = false;
            return true;
        }
        false
    }

    /// Returns true while inside a deductions section.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Builds a deduction line from a section line, if its label is usable.
pub fn capture(
    line: &str,
    tokens: &[AmountToken],
    layout: Option<&ColumnLayout>,
) -> Option<DeductionLine> {
    let first = tokens.first()?;
    if fields::mentions_known_category(line) {
        return None;
    }

    let label = clean_label(&line[..first.start]);
    if label.chars().count() <= 2 || !label.chars().any(char::is_alphabetic) {
        return None;
    }
    if label.to_lowercase().starts_with("total") {
        return None;
    }

    let name = correct_spelling(&label);
    let key = normalize_key(&name);
    if key.is_empty() {
        return None;
    }

    let selected = columns::select(layout, tokens);
    let amount = selected.this_period?;
    debug!(key = %key, amount = %amount, "Captured additional deduction");
    Some(DeductionLine {
        key,
        name,
        amount,
        ytd_amount: selected.year_to_date,
    })
}

/// Adds a captured line, keeping the first entry per key unless it was
/// zero and the new one is not.
pub fn merge(lines: &mut Vec<DeductionLine>, line: DeductionLine) {
    match lines.iter_mut().find(|existing| existing.key == line.key) {
        Some(existing) if existing.amount.is_zero() && !line.amount.is_zero() => *existing = line,
        Some(_) => {}
        None => lines.push(line),
    }
}

/// Keeps letters, digits and spaces; collapses runs of whitespace.
fn clean_label(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces known misspelled words with their corrected form.
pub fn correct_spelling(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            MISSPELLINGS
                .iter()
                .find(|(wrong, _)| *wrong == lower)
                .map(|(_, right)| right.to_string())
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases, strips punctuation, joins words with `_` and truncates.
///
/// # Examples
///
/// ```
/// use payroll_engine::extraction::normalize_key;
///
/// assert_eq!(normalize_key("Dental Plan (Pre-Tax)"), "dental_plan_pretax");
/// ```
pub fn normalize_key(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let joined = stripped.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined.chars().take(MAX_KEY_LEN).collect();
    truncated.trim_end_matches('_').to_string()
}
