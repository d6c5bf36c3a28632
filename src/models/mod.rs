//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine:
//! employees, reference tax periods, YTD accumulators, payroll records and
//! the fields recovered from paystub documents.

mod audit;
mod deduction;
mod employee;
mod extracted;
mod payroll_record;
mod reference_period;
mod tax_breakdown;
mod ytd;

pub use audit::{AuditStep, AuditTrace, AuditWarning, SEVERITY_HIGH, SEVERITY_MEDIUM};
pub use deduction::{DeductionLine, StandardDeductions};
pub use employee::{DEFAULT_CLASSIFICATION, Employee};
pub use extracted::ExtractedFieldSet;
pub use payroll_record::{PayrollRecord, PayrollStatus};
pub use reference_period::ReferenceTaxPeriod;
pub use tax_breakdown::TaxBreakdown;
pub use ytd::{OpeningYtdBalances, YtdAccumulator, YtdSnapshot};
