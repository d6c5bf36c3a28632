//! Request and preview types for payroll generation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::ensure_within_limit;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, DeductionLine, OpeningYtdBalances, PayrollStatus, StandardDeductions,
    TaxBreakdown, YtdSnapshot,
};

/// Everything needed to generate one payroll.
///
/// # Example
///
/// ```
/// use payroll_engine::payroll::GeneratePayrollRequest;
///
/// let json = r#"{
///     "employee_id": "emp_001",
///     "gross_pay": "6000.00",
///     "pay_period_start": "2024-01-01",
///     "pay_period_end": "2024-01-15",
///     "pay_date": "2024-01-19",
///     "custom_deductions": [
///         { "key": "parking", "name": "Parking", "amount": "25.00" }
///     ]
/// }"#;
/// let request: GeneratePayrollRequest = serde_json::from_str(json).unwrap();
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayrollRequest {
    /// The employee to pay.
    pub employee_id: String,
    /// Gross pay for the period; required.
    #[serde(default)]
    pub gross_pay: Option<Decimal>,
    /// First day of the pay period.
    pub pay_period_start: NaiveDate,
    /// Last day of the pay period.
    pub pay_period_end: NaiveDate,
    /// The date the payroll is paid.
    pub pay_date: NaiveDate,
    /// Standard non-tax deductions.
    #[serde(default)]
    pub deductions: StandardDeductions,
    /// Free-form deductions, accepted verbatim.
    #[serde(default)]
    pub custom_deductions: Vec<DeductionLine>,
    /// Balances carried over from a previous payroll system, applied only to
    /// the first payroll of a year.
    #[serde(default)]
    pub opening_ytd: Option<OpeningYtdBalances>,
}

impl GeneratePayrollRequest {
    /// Checks the request and returns the gross pay.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] when the employee id is blank,
    /// gross pay is missing or negative, any deduction is negative, or the
    /// period starts after it ends.
    pub fn validate(&self) -> EngineResult<Decimal> {
        if self.employee_id.trim().is_empty() {
            return Err(EngineError::invalid_input("employee_id", "must not be blank"));
        }

        let gross_pay = self
            .gross_pay
            .ok_or_else(|| EngineError::invalid_input("gross_pay", "is required"))?;
        money_amount("gross_pay", gross_pay)?;

        money_amount("deductions.health_insurance", self.deductions.health_insurance)?;
        money_amount("deductions.retirement", self.deductions.retirement)?;
        money_amount("deductions.other", self.deductions.other)?;
        for line in &self.custom_deductions {
            money_amount(&format!("custom_deductions.{}", line.key), line.amount)?;
        }

        if self.pay_period_start > self.pay_period_end {
            return Err(EngineError::invalid_input(
                "pay_period_start",
                format!(
                    "period start {} is after period end {}",
                    self.pay_period_start, self.pay_period_end
                ),
            ));
        }

        Ok(gross_pay)
    }

    /// Sum of the custom deduction amounts.
    pub fn custom_deductions_total(&self) -> Decimal {
        self.custom_deductions.iter().map(|line| line.amount).sum()
    }
}

fn money_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, found {}", amount),
        ));
    }
    ensure_within_limit(field, amount)
}

/// The outcome of a payroll computation that was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPreview {
    /// The employee the preview is for.
    pub employee_id: String,
    /// The employee's classification, for display only.
    pub employee_type: String,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Withholding for the period.
    pub taxes: TaxBreakdown,
    /// State tax display name from the reference period.
    pub state_tax_name: Option<String>,
    /// Taxes plus every deduction, rounded to cents.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions; may be negative.
    pub net_pay: Decimal,
    /// YTD totals as they would stand after this payroll.
    pub ytd: YtdSnapshot,
    /// The status the record would receive.
    pub status: PayrollStatus,
    /// Explanation of every calculated amount.
    pub audit_trace: AuditTrace,
}
