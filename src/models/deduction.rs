//! Deduction models.
//!
//! [`DeductionLine`] is the typed `(key, name, amount, ytd)` association used
//! wherever an open-ended list of named amounts travels through the engine:
//! custom deductions on a payroll request and unrecognized deduction lines
//! recovered from a paystub document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A named deduction amount with an optional year-to-date companion.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DeductionLine;
/// use rust_decimal::Decimal;
///
/// let parking = DeductionLine::new("parking", "Parking", Decimal::new(2500, 2));
/// assert_eq!(parking.amount.to_string(), "25.00");
/// assert!(parking.ytd_amount.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Normalized key (lowercase, underscores); never validated against a known list.
    pub key: String,
    /// Human-readable name used when the deduction is displayed.
    pub name: String,
    /// Amount for this period.
    pub amount: Decimal,
    /// Year-to-date amount when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ytd_amount: Option<Decimal>,
}

impl DeductionLine {
    /// Creates a deduction line without a YTD amount.
    pub fn new(key: impl Into<String>, name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            amount,
            ytd_amount: None,
        }
    }

    /// Sets the YTD amount.
    pub fn with_ytd(mut self, ytd_amount: Decimal) -> Self {
        self.ytd_amount = Some(ytd_amount);
        self
    }

    /// Serializes a list of deduction lines to the JSON blob stored with a record.
    pub fn encode_list(lines: &[DeductionLine]) -> EngineResult<String> {
        serde_json::to_string(lines)
            .map_err(|e| EngineError::persistence("encode_custom_deductions", e.to_string()))
    }

    /// Reads back a JSON blob produced by [`DeductionLine::encode_list`].
    ///
    /// An empty or whitespace-only blob decodes to an empty list.
    pub fn decode_list(blob: &str) -> EngineResult<Vec<DeductionLine>> {
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(blob)
            .map_err(|e| EngineError::invalid_input("custom_deductions", e.to_string()))
    }
}

/// The fixed (non-tax) deductions of a payroll request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductions {
    /// Health insurance premium withheld this period.
    #[serde(default)]
    pub health_insurance: Decimal,
    /// Retirement plan contribution withheld this period.
    #[serde(default)]
    pub retirement: Decimal,
    /// Any other lump-sum deduction.
    #[serde(default)]
    pub other: Decimal,
}

impl StandardDeductions {
    /// Sum of all standard deductions.
    pub fn total(&self) -> Decimal {
        self.health_insurance + self.retirement + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_with_ytd_sets_amount() {
        let line = DeductionLine::new("parking", "Parking", dec("25.00")).with_ytd(dec("75.00"));
        assert_eq!(line.ytd_amount, Some(dec("75.00")));
    }

    #[test]
    fn test_encode_then_decode_preserves_unknown_keys() {
        let lines = vec![
            DeductionLine::new("garnishment_court_order_17", "Garnishment", dec("120.00")),
            DeductionLine::new("gym", "Gym", dec("15.50")).with_ytd(dec("46.50")),
        ];
        let blob = DeductionLine::encode_list(&lines).unwrap();
        assert!(blob.contains("\"key\":\"garnishment_court_order_17\""));
        assert_eq!(DeductionLine::decode_list(&blob).unwrap(), lines);
    }

    #[test]
    fn test_serialization_skips_missing_ytd() {
        let json = serde_json::to_string(&DeductionLine::new("gym", "Gym", dec("15.50"))).unwrap();
        assert!(!json.contains("ytd_amount"));
        assert!(json.contains("\"amount\":\"15.50\""));
    }

    #[test]
    fn test_decode_blank_blob_is_empty() {
        assert!(DeductionLine::decode_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_decode_garbage_is_invalid_input() {
        let err = DeductionLine::decode_list("{not json").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_standard_deductions_total() {
        let deductions = StandardDeductions {
            health_insurance: dec("150.00"),
            retirement: dec("200.00"),
            other: dec("10.25"),
        };
        assert_eq!(deductions.total(), dec("360.25"));
    }

    #[test]
    fn test_standard_deductions_default_from_empty_json() {
        let deductions: StandardDeductions = serde_json::from_str("{}").unwrap();
        assert_eq!(deductions.total(), Decimal::ZERO);
    }
}
