use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

use payroll_engine::calculation::calculate_taxes;
use payroll_engine::config::ConfigLoader;
use payroll_engine::extraction::extract_fields;
use payroll_engine::models::{Employee, ReferenceTaxPeriod, StandardDeductions};
use payroll_engine::payroll::{
    GeneratePayrollRequest, InMemoryPayrollStore, PayrollOrchestrator, PayrollStore,
};

fn money(max_cents: i64) -> impl Strategy<Value = Decimal> {
    (0..max_cents).prop_map(|cents| Decimal::new(cents, 2))
}

fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn create_reference(
    gross: Option<Decimal>,
    federal: Option<Decimal>,
    social_security: Option<Decimal>,
    medicare: Option<Decimal>,
) -> ReferenceTaxPeriod {
    ReferenceTaxPeriod {
        employee_id: "emp_001".to_string(),
        period_start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2023, 12, 15).unwrap(),
        total_gross_pay: gross,
        total_net_pay: None,
        federal_tax_withheld: federal,
        state_tax_withheld: None,
        state_tax_name: None,
        local_tax_withheld: None,
        social_security_withheld: social_security,
        medicare_withheld: medicare,
        additional_fields: vec![],
        ytd_balances: None,
    }
}

fn create_orchestrator() -> PayrollOrchestrator<InMemoryPayrollStore> {
    let store = Arc::new(InMemoryPayrollStore::new());
    store
        .add_employee(Employee::new("emp_001", "us_citizen"))
        .unwrap();
    PayrollOrchestrator::new(store, ConfigLoader::load("./config/tax_tables").unwrap())
}

fn create_request(gross: Decimal, day: u32) -> GeneratePayrollRequest {
    let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    GeneratePayrollRequest {
        employee_id: "emp_001".to_string(),
        gross_pay: Some(gross),
        pay_period_start: date,
        pay_period_end: date,
        pay_date: date,
        deductions: StandardDeductions::default(),
        custom_deductions: vec![],
        opening_ytd: None,
    }
}

// ── Rounding closure: the total is the sum of the rounded categories ──────

proptest! {
    #[test]
    fn total_equals_sum_of_categories(
        gross in money(50_000_000),
        reference_gross in prop::option::of(money(5_000_000)),
        federal in prop::option::of(money(1_000_000)),
        social_security in prop::option::of(money(300_000)),
        medicare in prop::option::of(money(100_000)),
    ) {
        let loader = ConfigLoader::load("./config/tax_tables").unwrap();
        let table = loader.tables().first().unwrap();
        let reference = create_reference(reference_gross, federal, social_security, medicare);
        let employee = Employee::new("emp_001", "us_citizen");

        let result = calculate_taxes(&employee, Some(&reference), gross, None, table).unwrap();
        let taxes = result.taxes;

        prop_assert_eq!(
            taxes.total,
            taxes.federal
                + taxes.state
                + taxes.local
                + taxes.social_security
                + taxes.medicare
                + taxes.additional_medicare
        );
        for amount in [taxes.federal, taxes.social_security, taxes.medicare, taxes.additional_medicare] {
            prop_assert!(amount >= Decimal::ZERO);
            prop_assert_eq!(amount, amount.round_dp(2));
        }
    }
}

// ── YTD monotonicity: YTD gross is the sum of every committed gross ───────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ytd_gross_is_sum_of_inputs(grosses in prop::collection::vec(money(2_000_000), 1..6)) {
        let orchestrator = create_orchestrator();
        for (i, gross) in grosses.iter().enumerate() {
            orchestrator
                .generate_payroll(&create_request(*gross, i as u32 + 1))
                .unwrap();
        }

        let expected: Decimal = grosses.iter().sum();
        let ytd = orchestrator.store().find_ytd("emp_001", 2024).unwrap().unwrap();
        prop_assert!((ytd.gross_pay - expected).abs() <= Decimal::new(1, 2));
        prop_assert_eq!(ytd.pay_periods as usize, grosses.len());
    }

    #[test]
    fn exempt_reference_always_suppresses_social_security(
        reference_gross in money(2_000_000),
        grosses in prop::collection::vec(money(5_000_000), 1..4),
    ) {
        let orchestrator = create_orchestrator();
        orchestrator
            .record_reference_period(create_reference(
                Some(reference_gross),
                None,
                Some(Decimal::ZERO),
                Some(Decimal::ZERO),
            ))
            .unwrap();

        for (i, gross) in grosses.iter().enumerate() {
            let record = orchestrator
                .generate_payroll(&create_request(*gross, i as u32 + 1))
                .unwrap();
            prop_assert_eq!(record.taxes.social_security, Decimal::ZERO);
            prop_assert_eq!(record.taxes.medicare, Decimal::ZERO);
            prop_assert_eq!(record.taxes.additional_medicare, Decimal::ZERO);
        }
    }
}

// ── Extraction: idempotent and independent of column order ────────────────

proptest! {
    #[test]
    fn extraction_is_idempotent(
        lines in prop::collection::vec(
            prop_oneof![
                Just("Earnings This Period Year to Date".to_string()),
                Just("Voluntary Deductions".to_string()),
                money(1_000_000).prop_map(|a| format!("Gross Pay {}", format_money(a))),
                money(100_000).prop_map(|a| format!("Federal Income Tax -{}", format_money(a))),
                money(100_000).prop_map(|a| format!("Parking {} {}", format_money(a), format_money(a))),
                "[A-Za-z ]{0,20}",
            ],
            0..12,
        )
    ) {
        let text = lines.join("\n");
        prop_assert_eq!(extract_fields(&text), extract_fields(&text));
    }

    #[test]
    fn swapped_columns_yield_same_values(
        current in money(10_000_000),
        year_to_date in money(10_000_000),
    ) {
        let current_text = format_money(current);
        let ytd_text = format_money(year_to_date);
        let forward = extract_fields(&format!(
            "Description This Period Year to Date\nGross Pay {} {}\nNet Pay {} {}",
            current_text, ytd_text, current_text, ytd_text
        ));
        let swapped = extract_fields(&format!(
            "Description Year to Date This Period\nGross Pay {} {}\nNet Pay {} {}",
            ytd_text, current_text, ytd_text, current_text
        ));

        prop_assert_eq!(forward.total_gross_pay, Some(current));
        prop_assert_eq!(swapped.total_gross_pay, Some(current));
        prop_assert_eq!(forward.ytd_gross_pay, swapped.ytd_gross_pay);
        prop_assert_eq!(forward.total_net_pay, swapped.total_net_pay);
    }
}
