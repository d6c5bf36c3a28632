//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition raised by tax calculation, YTD accumulation,
//! document extraction and payroll orchestration.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All fallible operations in the engine return this error type. The request
/// layer is expected to map [`EngineError::InvalidInput`] and
/// [`EngineError::NotFound`] to client errors and the retryable variants
/// (see [`EngineError::is_retryable`]) to a retryable server error.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee".to_string(),
///     id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: emp_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A monetary, date or document input was malformed, negative or missing.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The input field that was rejected.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// A record required by the operation does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up (e.g. "employee").
        entity: String,
        /// The identifier that was not found.
        id: String,
    },

    /// Stored data contradicts the key it was loaded under.
    #[error("Data consistency error: {message}")]
    DataConsistency {
        /// A description of the inconsistency.
        message: String,
    },

    /// The storage layer failed while reading or committing payroll data.
    #[error("Persistence failure during {operation}: {message}")]
    Persistence {
        /// The storage operation that failed.
        operation: String,
        /// A description of the failure.
        message: String,
    },

    /// The YTD accumulator changed between read and commit.
    #[error("Concurrent update of YTD accumulator for employee '{employee_id}' in {year}")]
    ConcurrentUpdate {
        /// The employee whose accumulator conflicted.
        employee_id: String,
        /// The calendar year of the accumulator.
        year: i32,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A tax table was parsed but its contents are unusable.
    #[error("Invalid tax table: {message}")]
    InvalidConfig {
        /// A description of the problem.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::InvalidInput`] for the given field.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds an [`EngineError::NotFound`] for the given entity and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Builds an [`EngineError::Persistence`] for the given operation.
    pub fn persistence(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Persistence {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Persistence { .. } | EngineError::ConcurrentUpdate { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
