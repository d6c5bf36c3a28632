//! Year-to-date accumulator models.
//!
//! A [`YtdAccumulator`] holds the running totals for one employee and one
//! calendar year. It only ever grows: each committed payroll adds its amounts
//! through [`crate::calculation::accumulate`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::ensure_within_limit;
use crate::error::{EngineError, EngineResult};

/// Running totals for one employee in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdAccumulator {
    /// The employee the totals belong to.
    pub employee_id: String,
    /// The calendar year (the year of the pay date).
    pub year: i32,
    /// Cumulative gross pay.
    pub gross_pay: Decimal,
    /// Cumulative federal income tax.
    pub federal_tax: Decimal,
    /// Cumulative state income tax.
    pub state_tax: Decimal,
    /// Cumulative local income tax.
    pub local_tax: Decimal,
    /// Cumulative Social Security.
    pub social_security: Decimal,
    /// Cumulative Medicare.
    pub medicare: Decimal,
    /// Cumulative Additional Medicare surcharge.
    pub additional_medicare: Decimal,
    /// Cumulative net pay.
    pub net_pay: Decimal,
    /// Number of payrolls merged into the totals.
    pub pay_periods: u32,
    /// End date of the most recently merged pay period.
    pub last_pay_period_end: Option<NaiveDate>,
    /// Incremented on every merge; used for optimistic concurrency checks.
    pub version: u64,
}

impl YtdAccumulator {
    /// Creates an all-zero accumulator for the employee and year.
    pub fn zeroed(employee_id: impl Into<String>, year: i32) -> Self {
        Self {
            employee_id: employee_id.into(),
            year,
            gross_pay: Decimal::ZERO,
            federal_tax: Decimal::ZERO,
            state_tax: Decimal::ZERO,
            local_tax: Decimal::ZERO,
            social_security: Decimal::ZERO,
            medicare: Decimal::ZERO,
            additional_medicare: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            pay_periods: 0,
            last_pay_period_end: None,
            version: 0,
        }
    }

    /// Creates the starting accumulator from balances carried over from a
    /// previous payroll system.
    ///
    /// The result has version 0 and no pay periods, so it is indistinguishable
    /// from a fresh year except for its opening totals.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if any balance is negative.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{OpeningYtdBalances, YtdAccumulator};
    /// use rust_decimal::Decimal;
    ///
    /// let opening = OpeningYtdBalances {
    ///     gross_pay: Decimal::new(5000000, 2),
    ///     ..Default::default()
    /// };
    /// let ytd = YtdAccumulator::seeded("emp_001", 2024, &opening).unwrap();
    /// assert_eq!(ytd.gross_pay, Decimal::new(5000000, 2));
    /// assert_eq!(ytd.pay_periods, 0);
    /// ```
    pub fn seeded(
        employee_id: impl Into<String>,
        year: i32,
        opening: &OpeningYtdBalances,
    ) -> EngineResult<Self> {
        opening.validate()?;
        Ok(Self {
            gross_pay: opening.gross_pay,
            federal_tax: opening.federal_tax,
            state_tax: opening.state_tax,
            local_tax: opening.local_tax,
            social_security: opening.social_security,
            medicare: opening.medicare,
            additional_medicare: opening.additional_medicare,
            net_pay: opening.net_pay,
            ..Self::zeroed(employee_id, year)
        })
    }

    /// Returns the frozen view of the totals stored on a payroll record.
    pub fn snapshot(&self) -> YtdSnapshot {
        YtdSnapshot {
            gross_pay: self.gross_pay,
            federal_tax: self.federal_tax,
            state_tax: self.state_tax,
            local_tax: self.local_tax,
            social_security: self.social_security,
            medicare: self.medicare,
            additional_medicare: self.additional_medicare,
            net_pay: self.net_pay,
            pay_periods: self.pay_periods,
        }
    }
}

/// The YTD totals as they stood right after a payroll was generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdSnapshot {
    /// Cumulative gross pay.
    pub gross_pay: Decimal,
    /// Cumulative federal income tax.
    pub federal_tax: Decimal,
    /// Cumulative state income tax.
    pub state_tax: Decimal,
    /// Cumulative local income tax.
    pub local_tax: Decimal,
    /// Cumulative Social Security.
    pub social_security: Decimal,
    /// Cumulative Medicare.
    pub medicare: Decimal,
    /// Cumulative Additional Medicare surcharge.
    pub additional_medicare: Decimal,
    /// Cumulative net pay.
    pub net_pay: Decimal,
    /// Number of payrolls included.
    pub pay_periods: u32,
}

/// Prior year-to-date balances entered when an employee joins mid-year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningYtdBalances {
    /// Gross pay already paid this year.
    pub gross_pay: Decimal,
    /// Federal income tax already withheld.
    pub federal_tax: Decimal,
    /// State income tax already withheld.
    pub state_tax: Decimal,
    /// Local income tax already withheld.
    pub local_tax: Decimal,
    /// Social Security already withheld.
    pub social_security: Decimal,
    /// Medicare already withheld.
    pub medicare: Decimal,
    /// Additional Medicare already withheld.
    pub additional_medicare: Decimal,
    /// Net pay already paid.
    pub net_pay: Decimal,
}

impl OpeningYtdBalances {
    pub(crate) fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("opening_ytd.gross_pay", self.gross_pay),
            ("opening_ytd.federal_tax", self.federal_tax),
            ("opening_ytd.state_tax", self.state_tax),
            ("opening_ytd.local_tax", self.local_tax),
            ("opening_ytd.social_security", self.social_security),
            ("opening_ytd.medicare", self.medicare),
            ("opening_ytd.additional_medicare", self.additional_medicare),
            ("opening_ytd.net_pay", self.net_pay),
        ];
        for (field, amount) in fields {
            if amount < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    field,
                    format!("must not be negative, found {}", amount),
                ));
            }
            ensure_within_limit(field, amount)?;
        }
        Ok(())
    }
}
