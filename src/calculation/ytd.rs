//! Year-to-date accumulation.
//!
//! This module provides [`accumulate`], the pure additive merge of one
//! payroll into an employee's YTD totals. The caller commits the result
//! together with the payroll record it accompanies.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::rounding::checked_money_add;
use crate::error::{EngineError, EngineResult};
use crate::models::{TaxBreakdown, YtdAccumulator};

/// Merges one payroll into the YTD totals.
///
/// Each tax category, net pay and gross pay are added; the pay period count
/// and version each grow by one; the last period end is overwritten. With no
/// existing accumulator the merge starts from zero for `(employee_id, year)`.
///
/// # Errors
///
/// Returns [`EngineError::DataConsistency`] if `existing` belongs to another
/// employee or year, and [`EngineError::InvalidInput`] if a total would
/// overflow.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::accumulate;
/// use payroll_engine::models::TaxBreakdown;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let taxes = TaxBreakdown::from_categories(
///     Decimal::new(60000, 2),
///     Decimal::ZERO,
///     Decimal::ZERO,
///     Decimal::new(37200, 2),
///     Decimal::new(8700, 2),
///     Decimal::ZERO,
/// );
/// let ytd = accumulate(
///     None,
///     "emp_001",
///     2024,
///     &taxes,
///     Decimal::new(494100, 2),
///     Decimal::new(600000, 2),
///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(ytd.gross_pay, Decimal::new(600000, 2));
/// assert_eq!(ytd.pay_periods, 1);
/// assert_eq!(ytd.version, 1);
/// ```
pub fn accumulate(
    existing: Option<&YtdAccumulator>,
    employee_id: &str,
    year: i32,
    taxes: &TaxBreakdown,
    net_pay: Decimal,
    gross_pay: Decimal,
    period_end: NaiveDate,
) -> EngineResult<YtdAccumulator> {
    let mut ytd = match existing {
        Some(current) if current.employee_id != employee_id || current.year != year => {
            return Err(EngineError::DataConsistency {
                message: format!(
                    "YTD accumulator for '{}' in {} was supplied for '{}' in {}",
                    current.employee_id, current.year, employee_id, year
                ),
            });
        }
        Some(current) => current.clone(),
        None => YtdAccumulator::zeroed(employee_id, year),
    };

    ytd.gross_pay = checked_money_add("gross_pay", ytd.gross_pay, gross_pay)?;
    ytd.federal_tax = checked_money_add("federal_tax", ytd.federal_tax, taxes.federal)?;
    ytd.state_tax = checked_money_add("state_tax", ytd.state_tax, taxes.state)?;
    ytd.local_tax = checked_money_add("local_tax", ytd.local_tax, taxes.local)?;
    ytd.social_security =
        checked_money_add("social_security", ytd.social_security, taxes.social_security)?;
    ytd.medicare = checked_money_add("medicare", ytd.medicare, taxes.medicare)?;
    ytd.additional_medicare = checked_money_add(
        "additional_medicare",
        ytd.additional_medicare,
        taxes.additional_medicare,
    )?;
    ytd.net_pay = checked_money_add("net_pay", ytd.net_pay, net_pay)?;
    ytd.pay_periods += 1;
    ytd.last_pay_period_end = Some(period_end);
    ytd.version += 1;

    Ok(ytd)
}
