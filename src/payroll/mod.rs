//! Payroll generation for the payroll engine.
//!
//! This module ties the pure calculations to storage: it validates requests,
//! resolves the employee, latest reference period and YTD accumulator, runs
//! the tax engine, and commits the payroll record with its updated
//! accumulator atomically.

mod locks;
mod orchestrator;
mod request;
mod store;

pub use locks::YtdLockRegistry;
pub use orchestrator::{
    DEFAULT_MAX_ATTEMPTS, ENGINE_VERSION, NEGATIVE_NET_PAY, PayrollOrchestrator,
};
pub use request::{GeneratePayrollRequest, PayrollPreview};
pub use store::{InMemoryPayrollStore, PayrollStore};
