//! Per-period tax withholding amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The withholding for one pay period, split by tax category.
///
/// Every category is already rounded to cents. `total` is the sum of the
/// rounded categories, so the parts always add up to the whole.
///
/// # Example
///
/// ```
/// use payroll_engine::models::TaxBreakdown;
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
/// assert_eq!(taxes.total, Decimal::new(105900, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Federal income tax withheld.
    pub federal: Decimal,
    /// State income tax withheld.
    pub state: Decimal,
    /// Local (city/county) income tax withheld.
    pub local: Decimal,
    /// Social Security (OASDI) withheld.
    pub social_security: Decimal,
    /// Medicare withheld.
    pub medicare: Decimal,
    /// Additional Medicare surcharge withheld.
    pub additional_medicare: Decimal,
    /// Sum of all categories above.
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Builds a breakdown from rounded category amounts and derives the total.
    pub fn from_categories(
        federal: Decimal,
        state: Decimal,
        local: Decimal,
        social_security: Decimal,
        medicare: Decimal,
        additional_medicare: Decimal,
    ) -> Self {
        Self {
            federal,
            state,
            local,
            social_security,
            medicare,
            additional_medicare,
            total: federal + state + local + social_security + medicare + additional_medicare,
        }
    }
}
