//! Per-period tax withholding calculation.
//!
//! This module provides [`calculate_taxes`], which derives the withholding
//! for one pay period in every tax category. Each category is produced by
//! exactly one branch:
//!
//! - `effective_rate`: the reference period's withheld amount divided by its
//!   gross pay, applied to this period's gross pay
//! - `suppressed`: the reference period shows no Social Security or Medicare,
//!   so the employee is treated as exempt
//! - `statutory`: the rates and caps of the [`TaxTableConfig`]
//! - `bracket_table`: the progressive federal fallback table
//! - `none`: nothing withheld (state and local without reference data)

use rust_decimal::Decimal;
use tracing::warn;

use super::rounding::{checked_money_add, effective_rate, ensure_within_limit, round_money};
use crate::config::TaxTableConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, Employee, ReferenceTaxPeriod, TaxBreakdown, YtdAccumulator,
};

/// Warning code recorded when a reference period has withholding but no
/// usable gross pay to divide it by.
pub const REFERENCE_GROSS_MISSING: &str = "REFERENCE_GROSS_MISSING";

/// Statutory reference for federal income tax withholding.
pub const FEDERAL_CLAUSE: &str = "IRC 3402";
/// Statutory reference for the Social Security employee tax.
pub const SOCIAL_SECURITY_CLAUSE: &str = "IRC 3101(a)";
/// Statutory reference for the Medicare employee tax.
pub const MEDICARE_CLAUSE: &str = "IRC 3101(b)(1)";
/// Statutory reference for the Additional Medicare surcharge.
pub const ADDITIONAL_MEDICARE_CLAUSE: &str = "IRC 3101(b)(2)";

/// Which branch produced a category's amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxBasis {
    /// Replicated from the reference period.
    EffectiveRate,
    /// Zero because the reference period shows an exemption.
    Suppressed,
    /// Statutory rate from the tax table.
    Statutory,
    /// Progressive federal bracket table.
    BracketTable,
    /// Nothing withheld.
    None,
}

impl TaxBasis {
    /// Returns the identifier recorded in audit steps.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxBasis::EffectiveRate => "effective_rate",
            TaxBasis::Suppressed => "suppressed",
            TaxBasis::Statutory => "statutory",
            TaxBasis::BracketTable => "bracket_table",
            TaxBasis::None => "none",
        }
    }
}

/// The result of a tax calculation, including the audit trail.
#[derive(Debug, Clone)]
pub struct TaxCalculationResult {
    /// The rounded withholding per category.
    pub taxes: TaxBreakdown,
    /// The employee's classification, for display only.
    pub employee_type: String,
    /// One audit step per category, in breakdown order.
    pub audit_steps: Vec<AuditStep>,
    /// Conditions that need review.
    pub warnings: Vec<AuditWarning>,
}

/// An amount for one category together with how it was derived.
#[derive(Debug, Clone)]
struct CategoryOutcome {
    amount: Decimal,
    basis: TaxBasis,
    rate: Option<Decimal>,
    reasoning: String,
}

impl CategoryOutcome {
    fn zero(basis: TaxBasis, reasoning: impl Into<String>) -> Self {
        Self {
            amount: Decimal::ZERO,
            basis,
            rate: None,
            reasoning: reasoning.into(),
        }
    }
}

/// Calculates the withholding for one pay period.
///
/// # Arguments
///
/// * `employee` - The employee being paid (classification is display only)
/// * `reference` - The most recent reference tax period, if any
/// * `gross_pay` - This period's gross pay
/// * `ytd` - The employee's YTD accumulator before this period, if any
/// * `tables` - The tax table in force on the pay date
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] if `gross_pay` is negative or above
/// [`crate::calculation::MAX_MONEY`], or if the reference period or YTD totals
/// produce an amount too large to represent.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_taxes;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::Employee;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let loader = ConfigLoader::load("./config/tax_tables").unwrap();
/// let table = loader.table_for(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap()).unwrap();
/// let employee = Employee::new("emp_001", "us_citizen");
///
/// let result = calculate_taxes(&employee, None, Decimal::from_str("15000").unwrap(), None, table)
///     .unwrap();
///
/// assert_eq!(result.taxes.federal, Decimal::from_str("1580.00").unwrap());
/// assert_eq!(result.taxes.social_security, Decimal::from_str("930.00").unwrap());
/// assert_eq!(result.taxes.medicare, Decimal::from_str("217.50").unwrap());
/// ```
pub fn calculate_taxes(
    employee: &Employee,
    reference: Option<&ReferenceTaxPeriod>,
    gross_pay: Decimal,
    ytd: Option<&YtdAccumulator>,
    tables: &TaxTableConfig,
) -> EngineResult<TaxCalculationResult> {
    if gross_pay < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "gross_pay",
            format!("must not be negative, found {}", gross_pay),
        ));
    }
    ensure_within_limit("gross_pay", gross_pay)?;

    let ytd_gross_before = ytd.map(|y| y.gross_pay).unwrap_or(Decimal::ZERO);
    let mut warnings = Vec::new();

    let federal = federal_tax(reference, gross_pay, tables, &mut warnings)?;
    let state = income_tax(
        "state",
        reference.and_then(|r| r.state_tax_withheld),
        reference,
        gross_pay,
        &mut warnings,
    )?;
    let local = income_tax(
        "local",
        reference.and_then(|r| r.local_tax_withheld),
        reference,
        gross_pay,
        &mut warnings,
    )?;
    let social_security = payroll_tax(
        "social_security",
        reference,
        reference.and_then(|r| r.social_security_withheld),
        gross_pay,
        || statutory_social_security(gross_pay, ytd_gross_before, tables),
        &mut warnings,
    )?;
    let medicare = payroll_tax(
        "medicare",
        reference,
        reference.and_then(|r| r.medicare_withheld),
        gross_pay,
        || CategoryOutcome {
            amount: round_money(gross_pay * tables.medicare_rate),
            basis: TaxBasis::Statutory,
            rate: Some(tables.medicare_rate),
            reasoning: format!(
                "{} × {} Medicare rate (uncapped)",
                gross_pay.normalize(),
                tables.medicare_rate.normalize()
            ),
        },
        &mut warnings,
    )?;
    let additional_medicare = if medicare.basis == TaxBasis::Suppressed {
        CategoryOutcome::zero(
            TaxBasis::Suppressed,
            "Medicare is suppressed, so the Additional Medicare surcharge is suppressed too",
        )
    } else {
        additional_medicare_tax(gross_pay, ytd_gross_before, tables)?
    };

    let taxes = TaxBreakdown::from_categories(
        federal.amount,
        state.amount,
        local.amount,
        social_security.amount,
        medicare.amount,
        additional_medicare.amount,
    );

    let categories = [
        ("federal_income_tax", "Federal Income Tax", FEDERAL_CLAUSE, federal),
        ("state_income_tax", "State Income Tax", "state withholding", state),
        ("local_income_tax", "Local Income Tax", "local withholding", local),
        ("social_security", "Social Security", SOCIAL_SECURITY_CLAUSE, social_security),
        ("medicare", "Medicare", MEDICARE_CLAUSE, medicare),
        (
            "additional_medicare",
            "Additional Medicare",
            ADDITIONAL_MEDICARE_CLAUSE,
            additional_medicare,
        ),
    ];

    let audit_steps = categories
        .into_iter()
        .enumerate()
        .map(|(i, (rule_id, rule_name, clause_ref, outcome))| AuditStep {
            step_number: i as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            clause_ref: clause_ref.to_string(),
            input: serde_json::json!({
                "employee_id": employee.id,
                "gross_pay": gross_pay.normalize().to_string(),
                "ytd_gross_before": ytd_gross_before.normalize().to_string(),
                "has_reference_period": reference.is_some()
            }),
            output: serde_json::json!({
                "basis": outcome.basis.as_str(),
                "rate": outcome.rate.map(|r| r.normalize().to_string()),
                "amount": outcome.amount.to_string()
            }),
            reasoning: outcome.reasoning,
        })
        .collect();

    Ok(TaxCalculationResult {
        taxes,
        employee_type: employee.display_type(),
        audit_steps,
        warnings,
    })
}

/// Replicates the reference rate for `withheld` when the reference gross allows it.
fn replicate(
    withheld: Decimal,
    reference_gross: Decimal,
    gross_pay: Decimal,
) -> EngineResult<CategoryOutcome> {
    let (rate, amount) = effective_rate(withheld, reference_gross)
        .and_then(|rate| gross_pay.checked_mul(rate).map(|amount| (rate, amount)))
        .ok_or_else(|| {
            EngineError::invalid_input(
                "reference_period",
                format!(
                    "{} withheld on a reference gross of {} cannot be applied to {}",
                    withheld, reference_gross, gross_pay
                ),
            )
        })?;
    ensure_within_limit("reference_period", amount)?;
    Ok(CategoryOutcome {
        amount: round_money(amount),
        basis: TaxBasis::EffectiveRate,
        rate: Some(rate),
        reasoning: format!(
            "{} withheld / {} reference gross = {} effective rate; {} × {}",
            withheld.normalize(),
            reference_gross.normalize(),
            rate.normalize(),
            gross_pay.normalize(),
            rate.normalize()
        ),
    })
}

fn gross_missing_warning(category: &str, withheld: Decimal) -> AuditWarning {
    warn!(
        category = category,
        withheld = %withheld,
        "Reference period has withholding but no usable gross pay; using fallback"
    );
    AuditWarning::medium(
        REFERENCE_GROSS_MISSING,
        format!(
            "Reference period withheld {} for {} but its gross pay is missing or zero; fallback rules were used",
            withheld.normalize(),
            category
        ),
    )
}

fn federal_tax(
    reference: Option<&ReferenceTaxPeriod>,
    gross_pay: Decimal,
    tables: &TaxTableConfig,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<CategoryOutcome> {
    let withheld = reference.and_then(|r| r.federal_tax_withheld);
    match (reference.and_then(|r| r.usable_gross()), withheld) {
        (Some(reference_gross), Some(withheld)) => replicate(withheld, reference_gross, gross_pay),
        (None, Some(withheld)) if !withheld.is_zero() => {
            warnings.push(gross_missing_warning("federal_income_tax", withheld));
            Ok(bracket_tax(gross_pay, tables))
        }
        _ => Ok(bracket_tax(gross_pay, tables)),
    }
}

/// Applies the progressive federal table to this period's full gross pay.
fn bracket_tax(gross_pay: Decimal, tables: &TaxTableConfig) -> CategoryOutcome {
    let mut tax = Decimal::ZERO;
    let mut parts = Vec::new();
    let mut remaining = gross_pay;
    for bracket in &tables.federal_brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = bracket.width().map_or(remaining, |width| width.min(remaining));
        tax += slice * bracket.rate;
        remaining -= slice;
        parts.push(format!("{} × {}", slice.normalize(), bracket.rate.normalize()));
    }
    // income above a closed top bracket stays at the top rate
    if let Some(top) = tables.federal_brackets.last().filter(|_| remaining > Decimal::ZERO) {
        tax += remaining * top.rate;
        parts.push(format!("{} × {}", remaining.normalize(), top.rate.normalize()));
    }

    let amount = round_money(tax);
    let reasoning = if parts.is_empty() {
        "No gross pay, no federal tax".to_string()
    } else {
        format!(
            "No usable reference period; bracket table on {}: {} = {}",
            gross_pay.normalize(),
            parts.join(" + "),
            amount
        )
    };
    CategoryOutcome {
        amount,
        basis: TaxBasis::BracketTable,
        rate: None,
        reasoning,
    }
}

/// State and local income tax: replicated when the reference withheld
/// something, otherwise zero.
fn income_tax(
    category: &str,
    withheld: Option<Decimal>,
    reference: Option<&ReferenceTaxPeriod>,
    gross_pay: Decimal,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<CategoryOutcome> {
    let Some(withheld) = withheld.filter(|w| !w.is_zero()) else {
        return Ok(CategoryOutcome::zero(
            TaxBasis::None,
            format!("No {} withholding on the reference period", category),
        ));
    };
    match reference.and_then(|r| r.usable_gross()) {
        Some(reference_gross) => replicate(withheld, reference_gross, gross_pay),
        None => {
            warnings.push(gross_missing_warning(category, withheld));
            Ok(CategoryOutcome::zero(
                TaxBasis::None,
                format!("No statutory {} rate; nothing withheld", category),
            ))
        }
    }
}

/// Social Security and Medicare: suppressed when the reference shows none,
/// replicated when it shows some, statutory without a reference.
fn payroll_tax<F>(
    category: &str,
    reference: Option<&ReferenceTaxPeriod>,
    withheld: Option<Decimal>,
    gross_pay: Decimal,
    statutory: F,
    warnings: &mut Vec<AuditWarning>,
) -> EngineResult<CategoryOutcome>
where
    F: FnOnce() -> CategoryOutcome,
{
    let Some(reference) = reference else {
        return Ok(statutory());
    };
    let Some(withheld) = withheld.filter(|w| !w.is_zero()) else {
        return Ok(CategoryOutcome::zero(
            TaxBasis::Suppressed,
            format!(
                "Reference period shows no {} withholding; employee treated as exempt",
                category
            ),
        ));
    };
    match reference.usable_gross() {
        Some(reference_gross) => replicate(withheld, reference_gross, gross_pay),
        None => {
            warnings.push(gross_missing_warning(category, withheld));
            Ok(statutory())
        }
    }
}

fn statutory_social_security(
    gross_pay: Decimal,
    ytd_gross_before: Decimal,
    tables: &TaxTableConfig,
) -> CategoryOutcome {
    let remaining_base = (tables.social_security_wage_base - ytd_gross_before).max(Decimal::ZERO);
    let taxable = gross_pay.min(remaining_base);
    let amount = round_money(taxable * tables.social_security_rate);
    CategoryOutcome {
        amount,
        basis: TaxBasis::Statutory,
        rate: Some(tables.social_security_rate),
        reasoning: format!(
            "{} taxable (wage base {} less {} YTD) × {}",
            taxable.normalize(),
            tables.social_security_wage_base.normalize(),
            ytd_gross_before.normalize(),
            tables.social_security_rate.normalize()
        ),
    }
}

/// Taxes only the part of this period's gross that pushes cumulative YTD
/// gross past the threshold, net of what earlier periods already crossed.
fn additional_medicare_tax(
    gross_pay: Decimal,
    ytd_gross_before: Decimal,
    tables: &TaxTableConfig,
) -> EngineResult<CategoryOutcome> {
    let threshold = tables.additional_medicare_threshold;
    let ytd_gross_after = checked_money_add("gross_pay", ytd_gross_before, gross_pay)?;
    let excess_after = (ytd_gross_after - threshold).max(Decimal::ZERO);
    let excess_before = (ytd_gross_before - threshold).max(Decimal::ZERO);
    let taxable = excess_after - excess_before;
    let amount = round_money(taxable * tables.additional_medicare_rate);
    Ok(CategoryOutcome {
        amount,
        basis: TaxBasis::Statutory,
        rate: Some(tables.additional_medicare_rate),
        reasoning: format!(
            "{} of YTD gross above the {} threshold falls in this period × {}",
            taxable.normalize(),
            threshold.normalize(),
            tables.additional_medicare_rate.normalize()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::MAX_MONEY;
    use crate::config::TaxBracket;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bracket(lower: &str, upper: Option<&str>, rate: &str) -> TaxBracket {
        TaxBracket {
            lower: dec(lower),
            upper: upper.map(dec),
            rate: dec(rate),
        }
    }

    fn create_test_table() -> TaxTableConfig {
        TaxTableConfig {
            tax_year: 2023,
            effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            federal_brackets: vec![
                bracket("0", Some("11000"), "0.10"),
                bracket("11000", Some("44725"), "0.12"),
                bracket("44725", Some("95375"), "0.22"),
                bracket("95375", Some("201050"), "0.24"),
                bracket("201050", Some("511850"), "0.32"),
                bracket("511850", None, "0.37"),
            ],
            social_security_rate: dec("0.062"),
            social_security_wage_base: dec("160200"),
            medicare_rate: dec("0.0145"),
            additional_medicare_rate: dec("0.009"),
            additional_medicare_threshold: dec("200000"),
        }
    }

    fn create_test_employee() -> Employee {
        Employee::new("emp_001", "h1b")
    }

    fn create_test_reference() -> ReferenceTaxPeriod {
        ReferenceTaxPeriod {
            employee_id: "emp_001".to_string(),
            period_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            total_gross_pay: Some(dec("5000.00")),
            total_net_pay: Some(dec("4117.50")),
            federal_tax_withheld: Some(dec("500.00")),
            state_tax_withheld: None,
            state_tax_name: None,
            local_tax_withheld: None,
            social_security_withheld: Some(dec("310.00")),
            medicare_withheld: Some(dec("72.50")),
            additional_fields: vec![],
            ytd_balances: None,
        }
    }

    fn ytd_with_gross(gross: &str) -> YtdAccumulator {
        let mut ytd = YtdAccumulator::zeroed("emp_001", 2023);
        ytd.gross_pay = dec(gross);
        ytd
    }

    fn step<'a>(result: &'a TaxCalculationResult, rule_id: &str) -> &'a AuditStep {
        result
            .audit_steps
            .iter()
            .find(|s| s.rule_id == rule_id)
            .unwrap()
    }

    /// TX-001: effective rates replicated from the reference period
    #[test]
    fn test_effective_rate_replication() {
        let reference = create_test_reference();
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("6000"),
            None,
            &create_test_table(),
        )
        .unwrap();

        assert_eq!(result.taxes.federal, dec("600.00"));
        assert_eq!(result.taxes.social_security, dec("372.00"));
        assert_eq!(result.taxes.medicare, dec("87.00"));
        assert_eq!(result.taxes.additional_medicare, dec("0.00"));
        assert_eq!(result.taxes.state, Decimal::ZERO);
        assert_eq!(result.taxes.total, dec("1059.00"));
        assert_eq!(result.employee_type, "H1B");
        assert!(result.warnings.is_empty());
        assert_eq!(step(&result, "federal_income_tax").output["basis"], "effective_rate");
        assert_eq!(step(&result, "federal_income_tax").output["rate"], "0.1");
    }

    /// TX-002: zero Social Security and Medicare suppress both categories
    #[test]
    fn test_suppression_with_zero_values() {
        let mut reference = create_test_reference();
        reference.social_security_withheld = Some(Decimal::ZERO);
        reference.medicare_withheld = Some(Decimal::ZERO);

        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("4000"),
            None,
            &create_test_table(),
        )
        .unwrap();

        assert_eq!(result.taxes.social_security, Decimal::ZERO);
        assert_eq!(result.taxes.medicare, Decimal::ZERO);
        assert_eq!(result.taxes.additional_medicare, Decimal::ZERO);
        assert_eq!(step(&result, "social_security").output["basis"], "suppressed");
        assert_eq!(step(&result, "additional_medicare").output["basis"], "suppressed");
    }

    /// TX-003: null Social Security suppresses even with a huge YTD
    #[test]
    fn test_suppression_with_null_values() {
        let mut reference = create_test_reference();
        reference.social_security_withheld = None;
        reference.medicare_withheld = None;
        let ytd = ytd_with_gross("250000");

        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("10000"),
            Some(&ytd),
            &create_test_table(),
        )
        .unwrap();

        assert_eq!(result.taxes.social_security, Decimal::ZERO);
        assert_eq!(result.taxes.medicare, Decimal::ZERO);
        assert_eq!(result.taxes.additional_medicare, Decimal::ZERO);
    }

    /// TX-004: no reference period falls back to brackets and statutory rates
    #[test]
    fn test_fallback_without_reference() {
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("15000"),
            None,
            &create_test_table(),
        )
        .unwrap();

        assert_eq!(result.taxes.federal, dec("1580.00"));
        assert_eq!(result.taxes.state, Decimal::ZERO);
        assert_eq!(result.taxes.local, Decimal::ZERO);
        assert_eq!(result.taxes.social_security, dec("930.00"));
        assert_eq!(result.taxes.medicare, dec("217.50"));
        assert_eq!(result.taxes.additional_medicare, dec("0.00"));
        assert_eq!(step(&result, "federal_income_tax").output["basis"], "bracket_table");
        assert_eq!(step(&result, "social_security").output["basis"], "statutory");
    }

    /// TX-005: Social Security stops at the wage base
    #[test]
    fn test_social_security_wage_base_cap() {
        let ytd = ytd_with_gross("158200");
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("5000"),
            Some(&ytd),
            &create_test_table(),
        )
        .unwrap();
        // only 2000 of the base remains: 2000 × 0.062
        assert_eq!(result.taxes.social_security, dec("124.00"));

        let ytd = ytd_with_gross("170000");
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("5000"),
            Some(&ytd),
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.social_security, dec("0.00"));
    }

    /// TX-006: Additional Medicare applies only to the slice above the threshold
    #[test]
    fn test_additional_medicare_crossing_threshold() {
        let ytd = ytd_with_gross("195000");
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("10000"),
            Some(&ytd),
            &create_test_table(),
        )
        .unwrap();
        // 5000 above 200000 × 0.009
        assert_eq!(result.taxes.additional_medicare, dec("45.00"));
    }

    /// TX-007: Additional Medicare on a full period already above the threshold
    #[test]
    fn test_additional_medicare_above_threshold() {
        let ytd = ytd_with_gross("210000");
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&create_test_reference()),
            dec("10000"),
            Some(&ytd),
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.additional_medicare, dec("90.00"));
        assert_eq!(result.taxes.medicare, dec("145.00"));
    }

    /// TX-008: negative gross pay is rejected
    #[test]
    fn test_negative_gross_rejected() {
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("-1"),
            None,
            &create_test_table(),
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    /// TX-009: explicit zero federal withholding replicates a 0% rate
    #[test]
    fn test_zero_federal_withholding_replicates_zero_rate() {
        let mut reference = create_test_reference();
        reference.federal_tax_withheld = Some(Decimal::ZERO);
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("6000"),
            None,
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.federal, dec("0.00"));
        assert_eq!(step(&result, "federal_income_tax").output["basis"], "effective_rate");
    }

    /// TX-010: null federal withholding falls back to the bracket table
    #[test]
    fn test_null_federal_withholding_uses_brackets() {
        let mut reference = create_test_reference();
        reference.federal_tax_withheld = None;
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("15000"),
            None,
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.federal, dec("1580.00"));
    }

    /// TX-011: missing reference gross uses fallback rules and warns
    #[test]
    fn test_missing_reference_gross_warns_and_falls_back() {
        let mut reference = create_test_reference();
        reference.total_gross_pay = Some(Decimal::ZERO);
        reference.state_tax_withheld = Some(dec("100.00"));
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("15000"),
            None,
            &create_test_table(),
        )
        .unwrap();

        assert_eq!(result.taxes.federal, dec("1580.00"));
        assert_eq!(result.taxes.state, Decimal::ZERO);
        assert_eq!(result.taxes.social_security, dec("930.00"));
        assert_eq!(result.taxes.medicare, dec("217.50"));
        assert!(
            result
                .warnings
                .iter()
                .all(|w| w.code == REFERENCE_GROSS_MISSING)
        );
        // federal, state, social security and medicare
        assert_eq!(result.warnings.len(), 4);
    }

    /// TX-012: state and local replicate their own rates
    #[test]
    fn test_state_and_local_replicated() {
        let mut reference = create_test_reference();
        reference.state_tax_withheld = Some(dec("175.00"));
        reference.local_tax_withheld = Some(dec("33.33"));
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("6000"),
            None,
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.state, dec("210.00"));
        // 33.33 / 5000 = 0.006666 × 6000 = 39.996
        assert_eq!(result.taxes.local, dec("40.00"));
    }

    /// TX-013: the total is the sum of the rounded categories
    #[test]
    fn test_total_is_sum_of_rounded_categories() {
        let mut reference = create_test_reference();
        reference.federal_tax_withheld = Some(dec("333.33"));
        reference.state_tax_withheld = Some(dec("111.11"));
        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("1234.57"),
            None,
            &create_test_table(),
        )
        .unwrap();
        let t = &result.taxes;
        assert_eq!(
            t.total,
            t.federal + t.state + t.local + t.social_security + t.medicare + t.additional_medicare
        );
        assert_eq!(t.federal.scale(), 2);
    }

    /// TX-014: one audit step per category, numbered in order
    #[test]
    fn test_audit_steps_cover_every_category() {
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("1000"),
            None,
            &create_test_table(),
        )
        .unwrap();
        let ids: Vec<&str> = result.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "federal_income_tax",
                "state_income_tax",
                "local_income_tax",
                "social_security",
                "medicare",
                "additional_medicare"
            ]
        );
        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    /// TX-015: zero gross yields zero everywhere
    #[test]
    fn test_zero_gross() {
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            Decimal::ZERO,
            None,
            &create_test_table(),
        )
        .unwrap();
        assert_eq!(result.taxes.total, Decimal::ZERO);
    }

    /// TX-016: gross pay above the money limit is rejected
    #[test]
    fn test_gross_above_limit_rejected() {
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            MAX_MONEY + Decimal::ONE,
            None,
            &create_test_table(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "gross_pay"
        ));
    }

    /// TX-017: a YTD gross near the decimal limit is an error, not a panic
    #[test]
    fn test_ytd_gross_overflow_rejected() {
        let mut ytd = YtdAccumulator::zeroed("emp_001", 2023);
        ytd.gross_pay = Decimal::MAX;
        let result = calculate_taxes(
            &create_test_employee(),
            None,
            dec("6000"),
            Some(&ytd),
            &create_test_table(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "gross_pay"
        ));
    }

    /// TX-018: a reference rate too large to apply is rejected
    #[test]
    fn test_unrepresentable_reference_rate_rejected() {
        let mut reference = create_test_reference();
        reference.total_gross_pay = Some(dec("0.01"));
        reference.federal_tax_withheld = Some(Decimal::MAX);

        let result = calculate_taxes(
            &create_test_employee(),
            Some(&reference),
            dec("6000"),
            None,
            &create_test_table(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidInput { ref field, .. }) if field == "reference_period"
        ));
    }

    /// TX-019: income above a closed top bracket is taxed at the top rate
    #[test]
    fn test_closed_top_bracket_taxes_remainder() {
        let mut table = create_test_table();
        table.federal_brackets = vec![
            bracket("0", Some("11000"), "0.10"),
            bracket("11000", Some("44725"), "0.12"),
        ];

        let result = calculate_taxes(&create_test_employee(), None, dec("50000"), None, &table)
            .unwrap();

        // 11000 × 0.10 + 33725 × 0.12 + 5275 × 0.12
        assert_eq!(result.taxes.federal, dec("5780.00"));
    }
}
