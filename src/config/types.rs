//! Configuration types for tax withholding.
//!
//! This module contains the strongly-typed [`TaxTableConfig`] structure that
//! is deserialized from YAML tax table files. Every statutory constant the
//! tax engine uses lives here so that an annual update is a new YAML file,
//! not a code change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A single marginal bracket of the federal fallback table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket.
    pub lower: Decimal,
    /// Exclusive upper bound of the bracket; `None` for the open top bracket.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Marginal rate applied to income inside the bracket (e.g. 0.12).
    pub rate: Decimal,
}

impl TaxBracket {
    /// Returns the width of the bracket, or `None` for the open top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.upper.map(|upper| upper - self.lower)
    }
}

/// The statutory tables for one tax year.
///
/// # Example
///
/// ```
/// use payroll_engine::config::TaxTableConfig;
///
/// let yaml = r#"
/// tax_year: 2023
/// effective_date: "2023-01-01"
/// federal_brackets:
///   - { lower: "0", upper: "11000", rate: "0.10" }
///   - { lower: "11000", rate: "0.12" }
/// social_security_rate: "0.062"
/// social_security_wage_base: "160200"
/// medicare_rate: "0.0145"
/// additional_medicare_rate: "0.009"
/// additional_medicare_threshold: "200000"
/// "#;
/// let table: TaxTableConfig = serde_yaml::from_str(yaml).unwrap();
/// assert!(table.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTableConfig {
    /// The calendar year the table describes.
    pub tax_year: i32,
    /// The first pay date on which the table applies.
    pub effective_date: NaiveDate,
    /// Progressive federal brackets, ordered from zero upwards.
    pub federal_brackets: Vec<TaxBracket>,
    /// Social Security (OASDI) employee rate.
    pub social_security_rate: Decimal,
    /// Annual wage base above which Social Security is no longer withheld.
    pub social_security_wage_base: Decimal,
    /// Medicare employee rate (uncapped).
    pub medicare_rate: Decimal,
    /// Additional Medicare surcharge rate.
    pub additional_medicare_rate: Decimal,
    /// Annual YTD gross above which the Additional Medicare surcharge applies.
    pub additional_medicare_threshold: Decimal,
}

impl TaxTableConfig {
    /// Checks that the table can be used by the tax engine.
    ///
    /// Brackets must be non-empty, start at zero and be contiguous. The last
    /// bracket, and only the last, is open-ended. Every rate must lie in
    /// `[0, 1]` and the wage base and surcharge threshold must be positive.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidConfig {
            message: format!("tax year {}: {}", self.tax_year, message),
        };

        let first = self
            .federal_brackets
            .first()
            .ok_or_else(|| invalid("federal_brackets is empty".to_string()))?;
        if first.lower != Decimal::ZERO {
            return Err(invalid(format!(
                "first bracket must start at 0, found {}",
                first.lower
            )));
        }

        let last_index = self.federal_brackets.len() - 1;
        for (i, bracket) in self.federal_brackets.iter().enumerate() {
            check_rate(bracket.rate, &format!("federal_brackets[{}].rate", i))
                .map_err(invalid)?;
            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(invalid(format!(
                        "bracket {} upper bound {} is not above lower bound {}",
                        i, upper, bracket.lower
                    )));
                }
                None if i != last_index => {
                    return Err(invalid(format!(
                        "bracket {} is open-ended but is not the last bracket",
                        i
                    )));
                }
                Some(upper) if i == last_index => {
                    return Err(invalid(format!(
                        "last bracket must be open-ended, found upper bound {}",
                        upper
                    )));
                }
                _ => {}
            }
            if let Some(next) = self.federal_brackets.get(i + 1) {
                if bracket.upper != Some(next.lower) {
                    return Err(invalid(format!(
                        "bracket {} does not end where bracket {} starts",
                        i,
                        i + 1
                    )));
                }
            }
        }

        check_rate(self.social_security_rate, "social_security_rate").map_err(invalid)?;
        check_rate(self.medicare_rate, "medicare_rate").map_err(invalid)?;
        check_rate(self.additional_medicare_rate, "additional_medicare_rate")
            .map_err(invalid)?;

        if self.social_security_wage_base <= Decimal::ZERO {
            return Err(invalid("social_security_wage_base must be positive".to_string()));
        }
        if self.additional_medicare_threshold <= Decimal::ZERO {
            return Err(invalid(
                "additional_medicare_threshold must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_rate(rate: Decimal, name: &str) -> Result<(), String> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(format!("{} must be between 0 and 1, found {}", name, rate));
    }
    Ok(())
}
