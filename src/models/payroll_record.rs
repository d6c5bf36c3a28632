//! Payroll record models.
//!
//! A [`PayrollRecord`] is the committed result of one payroll generation. It
//! carries the tax breakdown, deductions, net pay, the YTD snapshot frozen at
//! generation time, and the audit trace explaining every amount.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, DeductionLine, StandardDeductions, TaxBreakdown, YtdSnapshot};
use crate::error::EngineResult;

/// The processing status of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// The payroll was generated without conditions needing attention.
    Processed,
    /// The payroll was generated but must be reviewed before payment
    /// (e.g. deductions exceed gross pay).
    NeedsReview,
}

/// A committed payroll for one employee and one pay period.
///
/// Records are immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for this payroll.
    pub id: Uuid,
    /// The employee paid.
    pub employee_id: String,
    /// First day of the pay period.
    pub pay_period_start: NaiveDate,
    /// Last day of the pay period.
    pub pay_period_end: NaiveDate,
    /// The date the payroll is paid; its year selects the YTD accumulator.
    pub pay_date: NaiveDate,
    /// Gross pay for the period.
    pub gross_pay: Decimal,
    /// Withholding for the period.
    pub taxes: TaxBreakdown,
    /// State tax display name taken from the reference period.
    pub state_tax_name: Option<String>,
    /// Standard non-tax deductions.
    pub deductions: StandardDeductions,
    /// Free-form deductions, accepted verbatim.
    pub custom_deductions: Vec<DeductionLine>,
    /// Taxes plus every deduction, rounded to cents.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions; may be negative.
    pub net_pay: Decimal,
    /// YTD totals including this payroll.
    pub ytd: YtdSnapshot,
    /// Processing status.
    pub status: PayrollStatus,
    /// Explanation of every calculated amount.
    pub audit_trace: AuditTrace,
    /// When the record was generated.
    pub created_at: DateTime<Utc>,
    /// The engine version that produced the record.
    pub engine_version: String,
}

impl PayrollRecord {
    /// Serializes the custom deductions for redisplay.
    ///
    /// The blob can be read back with [`DeductionLine::decode_list`].
    pub fn custom_deductions_json(&self) -> EngineResult<String> {
        DeductionLine::encode_list(&self.custom_deductions)
    }

    /// Returns the calendar year the record's YTD totals belong to.
    pub fn ytd_year(&self) -> i32 {
        self.pay_date.year()
    }
}
