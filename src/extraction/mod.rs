//! Paystub document field extraction.
//!
//! This module recovers financial fields (gross and net pay, each tax
//! category, pay period dates, custom deductions) from the linearized text of
//! a paystub whose layout and column order are not known in advance.
//!
//! # Example
//!
//! ```
//! use payroll_engine::extraction::extract_fields;
//!
//! let fields = extract_fields("Voluntary Deductions\nParking 25.00 75.00\nNet Pay 1,000.00");
//! assert_eq!(fields.additional_fields[0].key, "parking");
//! ```

mod columns;
mod dates;
mod deductions;
mod extractor;
mod fields;
mod patterns;

pub use columns::{AmountToken, ColumnLayout, ColumnValues, amounts, select};
pub use dates::{parse_date, period_dates};
pub use deductions::{MAX_KEY_LEN, correct_spelling, normalize_key};
pub use extractor::{extract_fields, extract_from_bytes};
pub use fields::{KnownField, matching_fields};
