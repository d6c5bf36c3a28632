//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculations behind a payroll: the per-period
//! tax engine, the YTD accumulator merge, and the monetary rounding they share.

mod rounding;
mod tax_engine;
mod ytd;

pub use rounding::{
    MAX_MONEY, MONEY_SCALE, RATE_SCALE, checked_money_add, effective_rate, ensure_within_limit,
    round_money,
};
pub use tax_engine::{
    ADDITIONAL_MEDICARE_CLAUSE, FEDERAL_CLAUSE, MEDICARE_CLAUSE, REFERENCE_GROSS_MISSING,
    SOCIAL_SECURITY_CLAUSE, TaxBasis, TaxCalculationResult, calculate_taxes,
};
pub use ytd::accumulate;
