//! Employee model.
//!
//! This module defines the [`Employee`] struct the payroll engine resolves
//! before generating a payroll.

use serde::{Deserialize, Serialize};

/// The classification assumed when the employee record carries none.
pub const DEFAULT_CLASSIFICATION: &str = "us_citizen";

/// Represents an employee known to the payroll engine.
///
/// The classification (e.g. `us_citizen`, `h1b`, `green_card`) is a display
/// label carried into tax calculation results; it never changes tax math.
/// Exempt classifications are expressed through the reference tax period
/// instead (see the suppression rule in [`crate::calculation::calculate_taxes`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employee's classification label.
    #[serde(default = "default_classification")]
    pub classification: String,
}

fn default_classification() -> String {
    DEFAULT_CLASSIFICATION.to_string()
}

impl Employee {
    /// Creates an employee with the given id and classification.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    ///
    /// let employee = Employee::new("emp_001", "h1b");
    /// assert_eq!(employee.display_type(), "H1B");
    /// ```
    pub fn new(id: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            classification: classification.into(),
        }
    }

    /// Returns the classification as shown on a tax calculation (upper snake case).
    pub fn display_type(&self) -> String {
        let label = self.classification.trim();
        if label.is_empty() {
            return DEFAULT_CLASSIFICATION.to_uppercase();
        }
        label.replace([' ', '-'], "_").to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{ "id": "emp_001", "classification": "h1b" }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.classification, "h1b");
    }

    #[test]
    fn test_deserialize_employee_without_classification_uses_default() {
        let json = r#"{ "id": "emp_002" }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.classification, "us_citizen");
    }

    #[test]
    fn test_display_type_normalizes_label() {
        assert_eq!(Employee::new("e", "green card").display_type(), "GREEN_CARD");
        assert_eq!(Employee::new("e", "opt-ead").display_type(), "OPT_EAD");
        assert_eq!(Employee::new("e", "US_CITIZEN").display_type(), "US_CITIZEN");
    }

    #[test]
    fn test_display_type_blank_falls_back_to_default() {
        assert_eq!(Employee::new("e", "  ").display_type(), "US_CITIZEN");
    }
}
