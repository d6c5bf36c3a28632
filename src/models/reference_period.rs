//! Reference tax period model.
//!
//! A reference tax period is a historical paystub whose withholding the
//! engine replicates as effective rates for future payrolls.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DeductionLine, ExtractedFieldSet, OpeningYtdBalances};
use crate::calculation::ensure_within_limit;
use crate::error::{EngineError, EngineResult};

/// Historical withholding used to derive effective tax rates.
///
/// A `None` or zero Social Security or Medicare amount means the employee is
/// exempt from that category going forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTaxPeriod {
    /// The employee the period belongs to.
    pub employee_id: String,
    /// First day of the reference period.
    pub period_start: NaiveDate,
    /// Last day of the reference period.
    pub period_end: NaiveDate,
    /// Gross pay of the reference period.
    #[serde(default)]
    pub total_gross_pay: Option<Decimal>,
    /// Net pay of the reference period.
    #[serde(default)]
    pub total_net_pay: Option<Decimal>,
    /// Federal income tax withheld.
    #[serde(default)]
    pub federal_tax_withheld: Option<Decimal>,
    /// State income tax withheld.
    #[serde(default)]
    pub state_tax_withheld: Option<Decimal>,
    /// Display name of the state tax.
    #[serde(default)]
    pub state_tax_name: Option<String>,
    /// Local income tax withheld.
    #[serde(default)]
    pub local_tax_withheld: Option<Decimal>,
    /// Social Security withheld.
    #[serde(default)]
    pub social_security_withheld: Option<Decimal>,
    /// Medicare withheld.
    #[serde(default)]
    pub medicare_withheld: Option<Decimal>,
    /// Other deductions shown on the reference paystub.
    #[serde(default)]
    pub additional_fields: Vec<DeductionLine>,
    /// Year-to-date totals printed on the reference paystub.
    ///
    /// Used to open the employee's YTD accumulator when no payroll has been
    /// generated yet for the year the period ends in.
    #[serde(default)]
    pub ytd_balances: Option<OpeningYtdBalances>,
}

impl ReferenceTaxPeriod {
    /// Promotes an extraction result into a reference period.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] naming the first missing field
    /// when the extraction lacks total gross pay or either period date.
    ///
    /// YTD totals are carried over only when the paystub shows a YTD gross;
    /// YTD categories it does not show open at zero.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{ExtractedFieldSet, ReferenceTaxPeriod};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let extracted = ExtractedFieldSet {
    ///     total_gross_pay: Some(Decimal::new(500000, 2)),
    ///     federal_tax_withheld: Some(Decimal::new(50000, 2)),
    ///     period_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     period_end_date: NaiveDate::from_ymd_opt(2024, 1, 15),
    ///     ..Default::default()
    /// };
    /// let period = ReferenceTaxPeriod::from_extracted("emp_001", &extracted).unwrap();
    /// assert_eq!(period.federal_tax_withheld, Some(Decimal::new(50000, 2)));
    /// ```
    pub fn from_extracted(
        employee_id: impl Into<String>,
        extracted: &ExtractedFieldSet,
    ) -> EngineResult<Self> {
        let total_gross_pay = extracted
            .total_gross_pay
            .ok_or_else(|| missing("total_gross_pay"))?;
        let period_start = extracted
            .period_start_date
            .ok_or_else(|| missing("period_start_date"))?;
        let period_end = extracted
            .period_end_date
            .ok_or_else(|| missing("period_end_date"))?;

        Ok(Self {
            employee_id: employee_id.into(),
            period_start,
            period_end,
            total_gross_pay: Some(total_gross_pay),
            total_net_pay: extracted.total_net_pay,
            federal_tax_withheld: extracted.federal_tax_withheld,
            state_tax_withheld: extracted.state_tax_withheld,
            state_tax_name: extracted.state_tax_name.clone(),
            local_tax_withheld: extracted.local_tax_withheld,
            social_security_withheld: extracted.social_security_withheld,
            medicare_withheld: extracted.medicare_withheld,
            additional_fields: extracted.additional_fields.clone(),
            ytd_balances: extracted.ytd_gross_pay.map(|gross_pay| OpeningYtdBalances {
                gross_pay,
                federal_tax: extracted.ytd_federal_tax.unwrap_or(Decimal::ZERO),
                state_tax: extracted.ytd_state_tax.unwrap_or(Decimal::ZERO),
                local_tax: extracted.ytd_local_tax.unwrap_or(Decimal::ZERO),
                social_security: extracted.ytd_social_security.unwrap_or(Decimal::ZERO),
                medicare: extracted.ytd_medicare.unwrap_or(Decimal::ZERO),
                additional_medicare: Decimal::ZERO,
                net_pay: extracted.ytd_net_pay.unwrap_or(Decimal::ZERO),
            }),
        })
    }

    /// Checks dates and amounts before the period is stored.
    pub fn validate(&self) -> EngineResult<()> {
        if self.period_start > self.period_end {
            return Err(EngineError::invalid_input(
                "period_start",
                format!(
                    "period start {} is after period end {}",
                    self.period_start, self.period_end
                ),
            ));
        }
        let amounts = [
            ("total_gross_pay", self.total_gross_pay),
            ("total_net_pay", self.total_net_pay),
            ("federal_tax_withheld", self.federal_tax_withheld),
            ("state_tax_withheld", self.state_tax_withheld),
            ("local_tax_withheld", self.local_tax_withheld),
            ("social_security_withheld", self.social_security_withheld),
            ("medicare_withheld", self.medicare_withheld),
        ];
        for (field, amount) in amounts {
            let Some(amount) = amount else { continue };
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not be negative, found {}", amount),
                ));
            }
            ensure_within_limit(field, amount)?;
        }
        match &self.ytd_balances {
            Some(balances) => balances.validate(),
            None => Ok(()),
        }
    }

    /// Returns the reference gross pay when it can be used as a divisor.
    pub fn usable_gross(&self) -> Option<Decimal> {
        self.total_gross_pay.filter(|gross| !gross.is_zero())
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::invalid_input(field, "required to create a reference tax period")
}
