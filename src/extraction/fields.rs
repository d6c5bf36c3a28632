//! Label rules for the known paystub fields.

use regex::Regex;
use std::sync::LazyLock;

use super::patterns::{
    RE_EXCLUDE_MEDICARE, RE_EXCLUDE_STATE, RE_EXCLUDE_TAXABLE, RE_EXCLUDE_WAGES, RE_FEDERAL,
    RE_GROSS_PAY, RE_LOCAL, RE_MEDICARE, RE_NET_PAY, RE_SOCIAL_SECURITY, RE_STATE, is_match,
};

/// A financial field the extractor knows how to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownField {
    /// Gross pay.
    GrossPay,
    /// Net pay.
    NetPay,
    /// Federal income tax.
    FederalTax,
    /// State income tax.
    StateTax,
    /// Local income tax.
    LocalTax,
    /// Social Security.
    SocialSecurity,
    /// Medicare (not Additional Medicare).
    Medicare,
}

struct FieldRule {
    field: KnownField,
    label: &'static LazyLock<Option<Regex>>,
    exclude: Option<&'static LazyLock<Option<Regex>>>,
    /// Lines this rule excludes are deductions in their own right.
    excluded_are_deductions: bool,
}

static RULES: [FieldRule; 7] = [
    FieldRule {
        field: KnownField::GrossPay,
        label: &RE_GROSS_PAY,
        exclude: None,
        excluded_are_deductions: false,
    },
    FieldRule {
        field: KnownField::NetPay,
        label: &RE_NET_PAY,
        exclude: None,
        excluded_are_deductions: false,
    },
    FieldRule {
        field: KnownField::FederalTax,
        label: &RE_FEDERAL,
        exclude: Some(&RE_EXCLUDE_TAXABLE),
        excluded_are_deductions: false,
    },
    FieldRule {
        field: KnownField::StateTax,
        label: &RE_STATE,
        exclude: Some(&RE_EXCLUDE_STATE),
        excluded_are_deductions: true,
    },
    FieldRule {
        field: KnownField::LocalTax,
        label: &RE_LOCAL,
        exclude: Some(&RE_EXCLUDE_TAXABLE),
        excluded_are_deductions: false,
    },
    FieldRule {
        field: KnownField::SocialSecurity,
        label: &RE_SOCIAL_SECURITY,
        exclude: Some(&RE_EXCLUDE_WAGES),
        excluded_are_deductions: false,
    },
    FieldRule {
        field: KnownField::Medicare,
        label: &RE_MEDICARE,
        exclude: Some(&RE_EXCLUDE_MEDICARE),
        excluded_are_deductions: false,
    },
];

/// Returns every known field whose label rule accepts the line.
pub fn matching_fields(line: &str) -> Vec<KnownField> {
    RULES
        .iter()
        .filter(|rule| is_match(rule.label, line))
        .filter(|rule| !rule.exclude.is_some_and(|exclude| is_match(exclude, line)))
        .map(|rule| rule.field)
        .collect()
}

/// Returns true if the line names a known tax category.
///
/// Used to keep tax lines such as `Additional Medicare` or `Social Security
/// Wages` out of the custom deduction list even though they fill no field.
/// State insurance lines (SUI, SDI) are not tax categories.
pub fn mentions_known_category(line: &str) -> bool {
    RULES.iter().any(|rule| {
        is_match(rule.label, line)
            && !(rule.excluded_are_deductions
                && rule.exclude.is_some_and(|exclude| is_match(exclude, line)))
    })
}
