//! Payroll generation.
//!
//! This module provides [`PayrollOrchestrator`], which resolves the inputs of
//! a payroll, runs the tax engine, computes the YTD totals the payroll will
//! produce, and commits the record and the accumulator in one store call.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::locks::YtdLockRegistry;
use super::request::{GeneratePayrollRequest, PayrollPreview};
use super::store::PayrollStore;
use crate::calculation::{accumulate, calculate_taxes, round_money};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, DeductionLine, Employee, OpeningYtdBalances,
    PayrollRecord, PayrollStatus, ReferenceTaxPeriod, TaxBreakdown, YtdAccumulator,
};

/// Warning code recorded when deductions exceed gross pay.
pub const NEGATIVE_NET_PAY: &str = "NEGATIVE_NET_PAY";

/// How many times a payroll is recomputed after a version conflict.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The engine version stamped on every record.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything computed for a payroll before anything is written.
struct Computation {
    employee: Employee,
    reference: Option<ReferenceTaxPeriod>,
    taxes: TaxBreakdown,
    total_deductions: Decimal,
    net_pay: Decimal,
    ytd: YtdAccumulator,
    expected_version: u64,
    status: PayrollStatus,
    steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

/// Coordinates payroll generation over a [`PayrollStore`].
///
/// # Example
///
/// ```
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::Employee;
/// use payroll_engine::payroll::{GeneratePayrollRequest, InMemoryPayrollStore, PayrollOrchestrator};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryPayrollStore::new());
/// store.add_employee(Employee::new("emp_001", "us_citizen")).unwrap();
/// let orchestrator =
///     PayrollOrchestrator::new(store, ConfigLoader::load("./config/tax_tables").unwrap());
///
/// let record = orchestrator
///     .generate_payroll(&GeneratePayrollRequest {
///         employee_id: "emp_001".to_string(),
///         gross_pay: Some(Decimal::new(1500000, 2)),
///         pay_period_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
///         pay_period_end: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
///         pay_date: NaiveDate::from_ymd_opt(2023, 2, 3).unwrap(),
///         deductions: Default::default(),
///         custom_deductions: vec![],
///         opening_ytd: None,
///     })
///     .unwrap();
///
/// assert_eq!(record.taxes.federal, Decimal::new(158000, 2));
/// assert_eq!(record.ytd.gross_pay, Decimal::new(1500000, 2));
/// ```
pub struct PayrollOrchestrator<S: PayrollStore + ?Sized> {
    store: Arc<S>,
    config: ConfigLoader,
    locks: YtdLockRegistry,
    max_attempts: u32,
}

impl<S: PayrollStore + ?Sized> PayrollOrchestrator<S> {
    /// Creates an orchestrator over a shared store and the loaded tax tables.
    pub fn new(store: Arc<S>, config: ConfigLoader) -> Self {
        Self {
            store,
            config,
            locks: YtdLockRegistry::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many times a payroll is computed before a version conflict
    /// is returned to the caller. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Generates and commits a payroll.
    ///
    /// The computation runs under the `(employee, year)` lock, with the year
    /// taken from the pay date. The record already carries its YTD snapshot
    /// when it is committed together with the updated accumulator. A version
    /// conflict at commit recomputes from fresh data, up to the configured
    /// number of attempts.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] for a malformed request
    /// - [`EngineError::NotFound`] for an unknown employee or a pay date
    ///   before every tax table
    /// - [`EngineError::ConcurrentUpdate`] when every attempt conflicted
    /// - [`EngineError::Persistence`] when the store fails; nothing is written
    pub fn generate_payroll(
        &self,
        request: &GeneratePayrollRequest,
    ) -> EngineResult<PayrollRecord> {
        let gross_pay = request.validate()?;
        let year = request.pay_date.year();
        let correlation_id = Uuid::new_v4();
        let started = Instant::now();

        info!(
            correlation_id = %correlation_id,
            employee_id = %request.employee_id,
            year = year,
            "Generating payroll"
        );

        self.locks.with_lock(&request.employee_id, year, || {
            let mut attempt = 1;
            loop {
                match self.try_generate(request, gross_pay, year, started) {
                    Ok(record) => {
                        info!(
                            correlation_id = %correlation_id,
                            employee_id = %record.employee_id,
                            payroll_id = %record.id,
                            gross_pay = %record.gross_pay,
                            net_pay = %record.net_pay,
                            attempts = attempt,
                            duration_us = record.audit_trace.duration_us,
                            "Payroll committed"
                        );
                        return Ok(record);
                    }
                    Err(err @ EngineError::ConcurrentUpdate { .. })
                        if attempt < self.max_attempts =>
                    {
                        warn!(
                            correlation_id = %correlation_id,
                            attempt = attempt,
                            error = %err,
                            "YTD accumulator changed before commit; recomputing"
                        );
                        attempt += 1;
                    }
                    Err(err) => {
                        warn!(
                            correlation_id = %correlation_id,
                            employee_id = %request.employee_id,
                            error = %err,
                            "Payroll generation failed"
                        );
                        return Err(err);
                    }
                }
            }
        })
    }

    /// Computes a payroll without writing anything.
    ///
    /// # Errors
    ///
    /// The same input and lookup errors as [`Self::generate_payroll`].
    pub fn preview_payroll(
        &self,
        request: &GeneratePayrollRequest,
    ) -> EngineResult<PayrollPreview> {
        let gross_pay = request.validate()?;
        let year = request.pay_date.year();
        let started = Instant::now();
        let computation = self.compute(request, gross_pay, year)?;

        Ok(PayrollPreview {
            employee_id: request.employee_id.clone(),
            employee_type: computation.employee.display_type(),
            gross_pay,
            taxes: computation.taxes,
            state_tax_name: computation
                .reference
                .and_then(|reference| reference.state_tax_name),
            total_deductions: computation.total_deductions,
            net_pay: computation.net_pay,
            ytd: computation.ytd.snapshot(),
            status: computation.status,
            audit_trace: AuditTrace {
                steps: computation.steps,
                warnings: computation.warnings,
                duration_us: started.elapsed().as_micros() as u64,
            },
        })
    }

    /// Stores a reference tax period after checking it and its employee.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] for reversed dates or negative amounts,
    /// [`EngineError::NotFound`] for an unknown employee.
    pub fn record_reference_period(&self, period: ReferenceTaxPeriod) -> EngineResult<()> {
        period.validate()?;
        self.resolve_employee(&period.employee_id)?;
        info!(
            employee_id = %period.employee_id,
            period_end = %period.period_end,
            additional_fields = period.additional_fields.len(),
            has_ytd_balances = period.ytd_balances.is_some(),
            "Recording reference tax period"
        );
        self.store.save_reference_period(period)
    }

    /// Returns the employee's payroll records, newest pay date first.
    pub fn payroll_history(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        self.resolve_employee(employee_id)?;
        let mut records = self.store.payroll_records(employee_id)?;
        records.sort_by(|a, b| {
            b.pay_date
                .cmp(&a.pay_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(records)
    }

    /// Returns the employee's most recent payroll record, if any.
    pub fn latest_payroll(&self, employee_id: &str) -> EngineResult<Option<PayrollRecord>> {
        Ok(self.payroll_history(employee_id)?.into_iter().next())
    }

    /// Returns the deduction lines of the latest reference period, with
    /// amounts kept, to prefill custom deductions on a new payroll.
    pub fn custom_deduction_templates(
        &self,
        employee_id: &str,
    ) -> EngineResult<Vec<DeductionLine>> {
        self.resolve_employee(employee_id)?;
        Ok(self
            .store
            .latest_reference_period(employee_id)?
            .map(|reference| {
                reference
                    .additional_fields
                    .into_iter()
                    .map(|line| DeductionLine {
                        ytd_amount: None,
                        ..line
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn resolve_employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.store
            .find_employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    fn try_generate(
        &self,
        request: &GeneratePayrollRequest,
        gross_pay: Decimal,
        year: i32,
        started: Instant,
    ) -> EngineResult<PayrollRecord> {
        let computation = self.compute(request, gross_pay, year)?;

        let record = PayrollRecord {
            id: Uuid::new_v4(),
            employee_id: request.employee_id.clone(),
            pay_period_start: request.pay_period_start,
            pay_period_end: request.pay_period_end,
            pay_date: request.pay_date,
            gross_pay,
            taxes: computation.taxes,
            state_tax_name: computation
                .reference
                .and_then(|reference| reference.state_tax_name),
            deductions: request.deductions.clone(),
            custom_deductions: request.custom_deductions.clone(),
            total_deductions: computation.total_deductions,
            net_pay: computation.net_pay,
            ytd: computation.ytd.snapshot(),
            status: computation.status,
            audit_trace: AuditTrace {
                steps: computation.steps,
                warnings: computation.warnings,
                duration_us: started.elapsed().as_micros() as u64,
            },
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
        };

        self.store
            .commit_payroll(&record, &computation.ytd, computation.expected_version)?;
        Ok(record)
    }

    fn compute(
        &self,
        request: &GeneratePayrollRequest,
        gross_pay: Decimal,
        year: i32,
    ) -> EngineResult<Computation> {
        let employee = self.resolve_employee(&request.employee_id)?;

        let reference = self.store.latest_reference_period(&employee.id)?;
        if let Some(period) = reference.as_ref().filter(|p| p.employee_id != employee.id) {
            return Err(EngineError::DataConsistency {
                message: format!(
                    "reference period for '{}' returned for employee '{}'",
                    period.employee_id, employee.id
                ),
            });
        }

        let stored = self.store.find_ytd(&employee.id, year)?;
        let expected_version = stored.as_ref().map(|ytd| ytd.version).unwrap_or(0);
        let (before, opening_source) = match (stored, request.opening_ytd.as_ref()) {
            (Some(_), Some(_)) => {
                return Err(EngineError::invalid_input(
                    "opening_ytd",
                    format!("{} already has payroll for employee '{}'", year, employee.id),
                ));
            }
            (Some(ytd), None) => (Some(ytd), "accumulator"),
            (None, Some(opening)) => (
                Some(YtdAccumulator::seeded(&employee.id, year, opening)?),
                "request",
            ),
            (None, None) => match reference
                .as_ref()
                .and_then(|period| reference_opening(period, request, year))
            {
                Some((period_end, opening)) => {
                    info!(
                        employee_id = %employee.id,
                        year = year,
                        reference_period_end = %period_end,
                        ytd_gross_pay = %opening.gross_pay,
                        "Opening YTD totals from reference paystub"
                    );
                    (
                        Some(YtdAccumulator::seeded(&employee.id, year, opening)?),
                        "reference_period",
                    )
                }
                None => (None, "none"),
            },
        };

        let table = self.config.table_for(request.pay_date)?;
        let tax_result =
            calculate_taxes(&employee, reference.as_ref(), gross_pay, before.as_ref(), table)?;
        let taxes = tax_result.taxes;
        let mut steps = tax_result.audit_steps;
        let mut warnings = tax_result.warnings;

        let custom_total = request.custom_deductions_total();
        let total_deductions =
            round_money(taxes.total + request.deductions.total() + custom_total);
        let net_pay = gross_pay - total_deductions;

        steps.push(AuditStep {
            step_number: steps.len() as u32 + 1,
            rule_id: "net_pay".to_string(),
            rule_name: "Net Pay".to_string(),
            clause_ref: "payroll".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.to_string(),
                "taxes_total": taxes.total.to_string(),
                "standard_deductions": request.deductions.total().to_string(),
                "custom_deductions": custom_total.to_string(),
                "custom_deduction_count": request.custom_deductions.len()
            }),
            output: serde_json::json!({
                "total_deductions": total_deductions.to_string(),
                "net_pay": net_pay.to_string()
            }),
            reasoning: format!(
                "{} gross − {} total deductions = {} net",
                gross_pay.normalize(),
                total_deductions,
                net_pay.normalize()
            ),
        });

        let status = if net_pay < Decimal::ZERO {
            warn!(
                employee_id = %employee.id,
                gross_pay = %gross_pay,
                total_deductions = %total_deductions,
                "Deductions exceed gross pay"
            );
            warnings.push(AuditWarning::high(
                NEGATIVE_NET_PAY,
                format!(
                    "Deductions of {} exceed gross pay of {}; net pay is {}",
                    total_deductions,
                    gross_pay.normalize(),
                    net_pay.normalize()
                ),
            ));
            PayrollStatus::NeedsReview
        } else {
            PayrollStatus::Processed
        };

        let ytd = accumulate(
            before.as_ref(),
            &employee.id,
            year,
            &taxes,
            net_pay,
            gross_pay,
            request.pay_period_end,
        )?;

        steps.push(AuditStep {
            step_number: steps.len() as u32 + 1,
            rule_id: "ytd_accumulation".to_string(),
            rule_name: "Year-to-Date Accumulation".to_string(),
            clause_ref: "payroll".to_string(),
            input: serde_json::json!({
                "year": year,
                "opening_source": opening_source,
                "pay_periods_before": ytd.pay_periods - 1,
                "ytd_gross_before": (ytd.gross_pay - gross_pay).to_string()
            }),
            output: serde_json::json!({
                "ytd_gross_pay": ytd.gross_pay.to_string(),
                "ytd_net_pay": ytd.net_pay.to_string(),
                "pay_periods": ytd.pay_periods
            }),
            reasoning: format!(
                "Payroll {} of {} brings YTD gross to {}",
                ytd.pay_periods,
                year,
                ytd.gross_pay.normalize()
            ),
        });

        Ok(Computation {
            employee,
            reference,
            taxes,
            total_deductions,
            net_pay,
            ytd,
            expected_version,
            status,
            steps,
            warnings,
        })
    }
}

/// Returns the YTD totals printed on a reference paystub that ended earlier in
/// the same year as the requested period.
fn reference_opening<'a>(
    reference: &'a ReferenceTaxPeriod,
    request: &GeneratePayrollRequest,
    year: i32,
) -> Option<(NaiveDate, &'a OpeningYtdBalances)> {
    let opening = reference.ytd_balances.as_ref()?;
    (reference.period_end < request.pay_period_start && reference.period_end.year() == year)
        .then_some((reference.period_end, opening))
}
