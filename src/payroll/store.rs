//! Persistence seam for the payroll orchestrator.
//!
//! The [`PayrollStore`] trait is what a database-backed repository implements.
//! [`InMemoryPayrollStore`] is the in-process implementation used by tests and
//! embedding callers.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayrollRecord, ReferenceTaxPeriod, YtdAccumulator};

/// Storage operations the orchestrator depends on.
///
/// Implementations are shared across request threads behind an `Arc`, so
/// every method takes `&self`.
pub trait PayrollStore: Send + Sync {
    /// Looks up an employee by id.
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;

    /// Returns the employee's most recent reference tax period.
    fn latest_reference_period(
        &self,
        employee_id: &str,
    ) -> EngineResult<Option<ReferenceTaxPeriod>>;

    /// Stores a reference tax period.
    fn save_reference_period(&self, period: ReferenceTaxPeriod) -> EngineResult<()>;

    /// Returns the YTD accumulator for the employee and year, if one exists.
    fn find_ytd(&self, employee_id: &str, year: i32) -> EngineResult<Option<YtdAccumulator>>;

    /// Stores a payroll record and its updated YTD accumulator together.
    ///
    /// `expected_version` is the version of the stored accumulator when it
    /// was read (0 when none existed). Either both writes happen or neither
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConcurrentUpdate`] when the stored version no
    /// longer matches, or [`EngineError::Persistence`] when storage fails.
    fn commit_payroll(
        &self,
        record: &PayrollRecord,
        accumulator: &YtdAccumulator,
        expected_version: u64,
    ) -> EngineResult<()>;

    /// Returns every committed payroll record for the employee.
    fn payroll_records(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>>;
}

#[derive(Debug, Default)]
struct StoreState {
    employees: HashMap<String, Employee>,
    reference_periods: HashMap<String, Vec<ReferenceTaxPeriod>>,
    ytd: HashMap<(String, i32), YtdAccumulator>,
    records: HashMap<String, Vec<PayrollRecord>>,
}

/// A [`PayrollStore`] held entirely in memory.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use payroll_engine::payroll::{InMemoryPayrollStore, PayrollStore};
///
/// let store = InMemoryPayrollStore::new();
/// store.add_employee(Employee::new("emp_001", "us_citizen")).unwrap();
/// assert!(store.find_employee("emp_001").unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    state: RwLock<StoreState>,
}

impl InMemoryPayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee.
    pub fn add_employee(&self, employee: Employee) -> EngineResult<()> {
        self.write("add_employee")?
            .employees
            .insert(employee.id.clone(), employee);
        Ok(())
    }

    fn read(&self, operation: &str) -> EngineResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| EngineError::persistence(operation, "store lock poisoned"))
    }

    fn write(&self, operation: &str) -> EngineResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| EngineError::persistence(operation, "store lock poisoned"))
    }
}

impl PayrollStore for InMemoryPayrollStore {
    fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.read("find_employee")?.employees.get(employee_id).cloned())
    }

    fn latest_reference_period(
        &self,
        employee_id: &str,
    ) -> EngineResult<Option<ReferenceTaxPeriod>> {
        let state = self.read("latest_reference_period")?;
        let latest = state.reference_periods.get(employee_id).and_then(|periods| {
            periods
                .iter()
                .enumerate()
                .max_by_key(|(saved_order, period)| (period.period_end, *saved_order))
                .map(|(_, period)| period.clone())
        });
        Ok(latest)
    }

    fn save_reference_period(&self, period: ReferenceTaxPeriod) -> EngineResult<()> {
        self.write("save_reference_period")?
            .reference_periods
            .entry(period.employee_id.clone())
            .or_default()
            .push(period);
        Ok(())
    }

    fn find_ytd(&self, employee_id: &str, year: i32) -> EngineResult<Option<YtdAccumulator>> {
        Ok(self
            .read("find_ytd")?
            .ytd
            .get(&(employee_id.to_string(), year))
            .cloned())
    }

    fn commit_payroll(
        &self,
        record: &PayrollRecord,
        accumulator: &YtdAccumulator,
        expected_version: u64,
    ) -> EngineResult<()> {
        let mut state = self.write("commit_payroll")?;
        let key = (accumulator.employee_id.clone(), accumulator.year);

        let current_version = state.ytd.get(&key).map(|ytd| ytd.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(EngineError::ConcurrentUpdate {
                employee_id: accumulator.employee_id.clone(),
                year: accumulator.year,
            });
        }

        state.ytd.insert(key, accumulator.clone());
        state
            .records
            .entry(record.employee_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn payroll_records(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        Ok(self
            .read("payroll_records")?
            .records
            .get(employee_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuditTrace, PayrollStatus, StandardDeductions, TaxBreakdown, YtdSnapshot,
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_period(end_day: u32) -> ReferenceTaxPeriod {
        ReferenceTaxPeriod {
            employee_id: "emp_001".to_string(),
            period_start: date(2024, 1, 1),
            period_end: date(2024, 1, end_day),
            total_gross_pay: Some(Decimal::from(end_day)),
            total_net_pay: None,
            federal_tax_withheld: None,
            state_tax_withheld: None,
            state_tax_name: None,
            local_tax_withheld: None,
            social_security_withheld: None,
            medicare_withheld: None,
            additional_fields: vec![],
            ytd_balances: None,
        }
    }

    fn create_test_record() -> PayrollRecord {
        PayrollRecord {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            pay_period_start: date(2024, 1, 1),
            pay_period_end: date(2024, 1, 15),
            pay_date: date(2024, 1, 19),
            gross_pay: Decimal::from(1000),
            taxes: TaxBreakdown::default(),
            state_tax_name: None,
            deductions: StandardDeductions::default(),
            custom_deductions: vec![],
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::from(1000),
            ytd: YtdSnapshot::default(),
            status: PayrollStatus::Processed,
            audit_trace: AuditTrace::default(),
            created_at: Utc::now(),
            engine_version: "test".to_string(),
        }
    }

    #[test]
    fn test_latest_reference_period_by_end_date() {
        let store = InMemoryPayrollStore::new();
        store.save_reference_period(create_test_period(31)).unwrap();
        store.save_reference_period(create_test_period(15)).unwrap();
        let latest = store.latest_reference_period("emp_001").unwrap().unwrap();
        assert_eq!(latest.period_end, date(2024, 1, 31));
        assert!(store.latest_reference_period("emp_999").unwrap().is_none());
    }

    #[test]
    fn test_latest_reference_period_tie_prefers_last_saved() {
        let store = InMemoryPayrollStore::new();
        let mut first = create_test_period(15);
        first.total_gross_pay = Some(Decimal::from(1));
        let mut second = create_test_period(15);
        second.total_gross_pay = Some(Decimal::from(2));
        store.save_reference_period(first).unwrap();
        store.save_reference_period(second).unwrap();
        let latest = store.latest_reference_period("emp_001").unwrap().unwrap();
        assert_eq!(latest.total_gross_pay, Some(Decimal::from(2)));
    }

    #[test]
    fn test_commit_checks_version() {
        let store = InMemoryPayrollStore::new();
        let mut ytd = YtdAccumulator::zeroed("emp_001", 2024);
        ytd.version = 1;
        store.commit_payroll(&create_test_record(), &ytd, 0).unwrap();
        assert_eq!(store.find_ytd("emp_001", 2024).unwrap().unwrap().version, 1);

        // a second writer that also read version 0 loses
        let result = store.commit_payroll(&create_test_record(), &ytd, 0);
        assert!(matches!(result, Err(EngineError::ConcurrentUpdate { .. })));
        assert_eq!(store.payroll_records("emp_001").unwrap().len(), 1);
    }

    #[test]
    fn test_payroll_records_empty_for_unknown_employee() {
        let store = InMemoryPayrollStore::new();
        assert!(store.payroll_records("emp_404").unwrap().is_empty());
    }
}
