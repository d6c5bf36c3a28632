//! Monetary rounding helpers.
//!
//! All amounts round half away from zero, which for the non-negative values
//! the engine produces is conventional half-up rounding.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// Decimal places kept on money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept on a derived effective tax rate.
pub const RATE_SCALE: u32 = 10;

/// Largest amount accepted for a single money input: one trillion.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Rounds an amount to cents, half-up.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("107.025").unwrap()).to_string(), "107.03");
/// assert_eq!(round_money(Decimal::from_str("87").unwrap()).to_string(), "87.00");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Divides withheld by gross to 10 decimal places, half-up.
///
/// Returns `None` when `gross` is zero or the quotient overflows.
pub fn effective_rate(withheld: Decimal, gross: Decimal) -> Option<Decimal> {
    withheld
        .checked_div(gross)
        .map(|rate| rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Adds two amounts, reporting overflow as invalid input on `field`.
pub fn checked_money_add(field: &str, a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| {
        EngineError::invalid_input(field, format!("{} + {} overflows", a, b))
    })
}

/// Rejects an amount above [`MAX_MONEY`].
pub fn ensure_within_limit(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount > MAX_MONEY {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}, found {}", MAX_MONEY, amount),
        ));
    }
    Ok(())
}
