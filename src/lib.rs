//! Payroll Engine for US Payroll Withholding
//!
//! This crate calculates per-period payroll withholding (federal, state,
//! local, Social Security, Medicare and Additional Medicare), keeps
//! year-to-date totals per employee and year, generates payroll records
//! atomically with those totals, and extracts financial fields from the
//! text of uploaded paystubs.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod payroll;
