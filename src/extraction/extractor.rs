//! Paystub field extraction.
//!
//! This module provides [`extract_fields`], which turns the linearized text of
//! a paystub into an [`ExtractedFieldSet`], and [`extract_from_bytes`] for raw
//! uploaded documents.

use tracing::{debug, info};

use super::columns::{self, ColumnLayout, ColumnValues};
use super::deductions::{self, DeductionSection};
use super::dates;
use super::fields::{self, KnownField};
use super::patterns::RE_STATE_INCOME;
use crate::error::{EngineError, EngineResult};
use crate::models::ExtractedFieldSet;

/// First words of two-word state names.
const TWO_WORD_STATE_PREFIXES: [&str; 5] = ["new", "north", "south", "west", "rhode"];

/// Extracts structured fields from paystub text.
///
/// The scan is line based. A header line naming this-period and year-to-date
/// columns sets the column order for the lines after it, until the next
/// header. Each known field takes its values from the first matching line
/// that carries an amount. Unrecognized lines inside a deductions section
/// become additional fields. Dates and the state tax name are found by
/// scanning the whole document.
///
/// Extraction is deterministic and never fails; missing data leaves fields
/// empty.
///
/// # Examples
///
/// ```
/// use payroll_engine::extraction::extract_fields;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let text = "Description   This Period   Year to Date\n\
///             Gross Pay     2,500.00      2,500.00\n";
/// let fields = extract_fields(text);
/// assert_eq!(fields.total_gross_pay, Some(Decimal::from_str("2500.00").unwrap()));
/// assert_eq!(fields.ytd_gross_pay, Some(Decimal::from_str("2500.00").unwrap()));
/// ```
pub fn extract_fields(text: &str) -> ExtractedFieldSet {
    let mut result = ExtractedFieldSet::default();
    let mut layout: Option<ColumnLayout> = None;
    let mut section = DeductionSection::default();

    for raw in text.split(['\n', '\r', '\u{c}']) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        let tokens = columns::amounts(line);
        let boundary = section.observe(&lower, &tokens);

        if tokens.is_empty() {
            if let Some(detected) = ColumnLayout::detect(line) {
                layout = Some(detected);
            }
            continue;
        }

        let matched = fields::matching_fields(line);
        if !matched.is_empty() {
            let values = columns::select(layout.as_ref(), &tokens);
            for field in matched {
                assign(&mut result, field, values);
            }
            continue;
        }

        if section.is_active() && !boundary {
            if let Some(deduction) = deductions::capture(line, &tokens, layout.as_ref()) {
                deductions::merge(&mut result.additional_fields, deduction);
            }
        }
    }

    result.state_tax_name = text
        .split(['\n', '\r', '\u{c}'])
        .find_map(state_tax_name);
    let (start, end) = dates::period_dates(text);
    result.period_start_date = start;
    result.period_end_date = end;

    debug!(
        gross = ?result.total_gross_pay,
        net = ?result.total_net_pay,
        additional_fields = result.additional_fields.len(),
        has_layout = layout.is_some(),
        "Extracted paystub fields"
    );
    result
}

/// Extracts fields from an uploaded document's bytes.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] when the bytes are empty or are not
/// UTF-8 text.
pub fn extract_from_bytes(bytes: &[u8]) -> EngineResult<ExtractedFieldSet> {
    if bytes.is_empty() {
        return Err(EngineError::invalid_input("document", "document is empty"));
    }
    let text = std::str::from_utf8(bytes).map_err(|e| {
        EngineError::invalid_input("document", format!("document is not readable text: {}", e))
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let fields = extract_fields(text);
    info!(
        bytes = bytes.len(),
        additional_fields = fields.additional_fields.len(),
        "Extracted fields from document"
    );
    Ok(fields)
}

/// Stores a line's values in a field unless an earlier line already did.
fn assign(result: &mut ExtractedFieldSet, field: KnownField, values: ColumnValues) {
    let (current, ytd) = match field {
        KnownField::GrossPay => (&mut result.total_gross_pay, &mut result.ytd_gross_pay),
        KnownField::NetPay => (&mut result.total_net_pay, &mut result.ytd_net_pay),
        KnownField::FederalTax => (&mut result.federal_tax_withheld, &mut result.ytd_federal_tax),
        KnownField::StateTax => (&mut result.state_tax_withheld, &mut result.ytd_state_tax),
        KnownField::LocalTax => (&mut result.local_tax_withheld, &mut result.ytd_local_tax),
        KnownField::SocialSecurity => (
            &mut result.social_security_withheld,
            &mut result.ytd_social_security,
        ),
        KnownField::Medicare => (&mut result.medicare_withheld, &mut result.ytd_medicare),
    };
    if current.is_some() || values.this_period.is_none() {
        return;
    }
    debug!(field = ?field, this_period = ?values.this_period, "Matched field");
    *current = values.this_period;
    *ytd = values.year_to_date;
}

/// Builds `<Name> State Income` from the words before `state income`.
fn state_tax_name(line: &str) -> Option<String> {
    let start = RE_STATE_INCOME.as_ref()?.find(line)?.start();
    let words: Vec<&str> = line[..start].split_whitespace().collect();
    let last = *words.last()?;
    if !last.chars().all(char::is_alphabetic) {
        return None;
    }
    let name = match words.len().checked_sub(2).map(|i| words[i]) {
        Some(prefix) if TWO_WORD_STATE_PREFIXES.contains(&prefix.to_lowercase().as_str()) => {
            format!("{} {}", title_case(prefix), title_case(last))
        }
        _ => title_case(last),
    };
    Some(format!("{} State Income", name))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
