//! Audit trace models.
//!
//! Every tax calculation and payroll generation records which branch produced
//! each amount so a payroll administrator can explain a paystub line by line.

use serde::{Deserialize, Serialize};

/// Warning severity used when the condition blocks nothing but needs review.
pub const SEVERITY_MEDIUM: &str = "medium";

/// Warning severity used when a record should not be paid without review.
pub const SEVERITY_HIGH: &str = "high";

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for one tax category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied (e.g. `social_security`).
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The statutory reference for the category, or the reference period id.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent calculation
/// but may require attention.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditWarning;
///
/// let warning = AuditWarning::high("NEGATIVE_NET_PAY", "Net pay is -12.00");
/// assert_eq!(warning.severity, "high");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning with `medium` severity.
    pub fn medium(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: SEVERITY_MEDIUM.to_string(),
        }
    }

    /// Creates a warning with `high` severity.
    pub fn high(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: SEVERITY_HIGH.to_string(),
        }
    }
}

/// The complete audit trace attached to a payroll record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}
