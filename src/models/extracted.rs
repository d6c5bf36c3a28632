//! Fields recovered from a paystub document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionLine;

/// The structured result of scanning one paystub document.
///
/// Every field is optional: a missing label or an unparseable amount simply
/// leaves the field empty. Amounts are unsigned magnitudes. The set is never
/// persisted; a caller promotes it with
/// [`crate::models::ReferenceTaxPeriod::from_extracted`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFieldSet {
    /// Gross pay for the period.
    pub total_gross_pay: Option<Decimal>,
    /// Gross pay year to date.
    pub ytd_gross_pay: Option<Decimal>,
    /// Net pay for the period.
    pub total_net_pay: Option<Decimal>,
    /// Net pay year to date.
    pub ytd_net_pay: Option<Decimal>,
    /// Federal income tax withheld for the period.
    pub federal_tax_withheld: Option<Decimal>,
    /// Federal income tax year to date.
    pub ytd_federal_tax: Option<Decimal>,
    /// State income tax withheld for the period.
    pub state_tax_withheld: Option<Decimal>,
    /// State income tax year to date.
    pub ytd_state_tax: Option<Decimal>,
    /// Display name of the state tax (e.g. "California State Income").
    pub state_tax_name: Option<String>,
    /// Local income tax withheld for the period.
    pub local_tax_withheld: Option<Decimal>,
    /// Local income tax year to date.
    pub ytd_local_tax: Option<Decimal>,
    /// Social Security withheld for the period.
    pub social_security_withheld: Option<Decimal>,
    /// Social Security year to date.
    pub ytd_social_security: Option<Decimal>,
    /// Medicare withheld for the period.
    pub medicare_withheld: Option<Decimal>,
    /// Medicare year to date.
    pub ytd_medicare: Option<Decimal>,
    /// First day of the pay period.
    pub period_start_date: Option<NaiveDate>,
    /// Last day of the pay period.
    pub period_end_date: Option<NaiveDate>,
    /// Deduction lines that matched no known category.
    #[serde(default)]
    pub additional_fields: Vec<DeductionLine>,
}

impl ExtractedFieldSet {
    /// Returns the additional deduction line with the given key.
    pub fn additional_field(&self, key: &str) -> Option<&DeductionLine> {
        self.additional_fields.iter().find(|line| line.key == key)
    }
}
