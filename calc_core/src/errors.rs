//! # Error Types
//!
//! Structured error types for calc_core. Every solve failure is a typed
//! value carrying the offending field and value, so a presentation layer can
//! point the user at the exact input to fix. The `Display` text is the
//! user-facing message.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn check_mass(m1_kg: f64) -> CalcResult<()> {
//!     if m1_kg <= 0.0 {
//!         return Err(CalcError::non_positive_input("m1", m1_kg));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_mass(-2.0).unwrap_err();
//! assert_eq!(err.error_code(), "NON_POSITIVE_INPUT");
//! assert_eq!(err.field(), Some("m1"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for solve operations.
///
/// Input errors (everything up to `UnknownVariable`) are the user's to fix.
/// `UnknownFormula`, `Configuration` and `Internal` point at the caller or at
/// the embedded tables.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A required value was left blank
    #[error("Missing value for '{field}'")]
    MissingInput { field: String },

    /// Zero or several variables are unknown
    #[error("Exactly one value must be left blank; blank: [{}]", .blank.join(", "))]
    AmbiguousUnknown { blank: Vec<String> },

    /// Text that does not parse as a finite number
    #[error("'{value}' is not a valid number for '{field}'")]
    InvalidNumber { field: String, value: String },

    /// Unit symbol not registered in the expected family
    #[error("Unknown {family} unit '{unit}'")]
    UnknownUnit { family: String, unit: String },

    /// Zero or negative value where only positive values make sense
    #[error("'{field}' must be greater than zero (got {value})")]
    NonPositiveInput { field: String, value: f64 },

    /// Coefficient outside (0, 1]
    #[error("'{field}' must be between 0 (exclusive) and 1 (got {value})")]
    InvalidCoefficient { field: String, value: f64 },

    /// Value outside its admissible range
    #[error("'{field}' is out of range (got {value}): {reason}")]
    OutOfRange {
        field: String,
        value: f64,
        reason: String,
    },

    /// A denominator evaluated to zero
    #[error("Division by zero: {denominator} is zero")]
    DivisionByZero { denominator: String },

    /// The computed result is physically impossible
    #[error("Computed '{field}' = {value} is not physically possible: {reason}")]
    ImplausibleResult {
        field: String,
        value: f64,
        reason: String,
    },

    /// No rearrangement exists for the requested unknown
    #[error("'{field}' cannot be solved for in {formula}")]
    NotSolvable { formula: String, field: String },

    /// An input names a variable the formula does not have
    #[error("{formula} has no variable '{field}'")]
    UnknownVariable { formula: String, field: String },

    /// Formula identifier not in the catalog
    #[error("Unknown formula: {name}")]
    UnknownFormula { name: String },

    /// Embedded or user-supplied configuration is invalid
    #[error("Configuration error in {source_name}: {reason}")]
    Configuration { source_name: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a MissingInput error
    pub fn missing_input(field: impl Into<String>) -> Self {
        CalcError::MissingInput {
            field: field.into(),
        }
    }

    /// Create an AmbiguousUnknown error listing the blank fields
    pub fn ambiguous_unknown<S: Into<String>>(blank: impl IntoIterator<Item = S>) -> Self {
        CalcError::AmbiguousUnknown {
            blank: blank.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an InvalidNumber error
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        CalcError::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(family: impl Into<String>, unit: impl Into<String>) -> Self {
        CalcError::UnknownUnit {
            family: family.into(),
            unit: unit.into(),
        }
    }

    /// Create a NonPositiveInput error
    pub fn non_positive_input(field: impl Into<String>, value: f64) -> Self {
        CalcError::NonPositiveInput {
            field: field.into(),
            value,
        }
    }

    /// Create an InvalidCoefficient error
    pub fn invalid_coefficient(field: impl Into<String>, value: f64) -> Self {
        CalcError::InvalidCoefficient {
            field: field.into(),
            value,
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        CalcError::OutOfRange {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a DivisionByZero error
    pub fn division_by_zero(denominator: impl Into<String>) -> Self {
        CalcError::DivisionByZero {
            denominator: denominator.into(),
        }
    }

    /// Create an ImplausibleResult error
    pub fn implausible_result(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        CalcError::ImplausibleResult {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a NotSolvable error
    pub fn not_solvable(formula: impl Into<String>, field: impl Into<String>) -> Self {
        CalcError::NotSolvable {
            formula: formula.into(),
            field: field.into(),
        }
    }

    /// Create an UnknownVariable error
    pub fn unknown_variable(formula: impl Into<String>, field: impl Into<String>) -> Self {
        CalcError::UnknownVariable {
            formula: formula.into(),
            field: field.into(),
        }
    }

    /// Create an UnknownFormula error
    pub fn unknown_formula(name: impl Into<String>) -> Self {
        CalcError::UnknownFormula { name: name.into() }
    }

    /// Create a Configuration error
    pub fn configuration(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Configuration {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal {
            message: message.into(),
        }
    }

    /// True when the user can fix the error by editing the inputs
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            CalcError::UnknownFormula { .. }
                | CalcError::Configuration { .. }
                | CalcError::Internal { .. }
        )
    }

    /// The input field the error points at, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::MissingInput { field }
            | CalcError::InvalidNumber { field, .. }
            | CalcError::NonPositiveInput { field, .. }
            | CalcError::InvalidCoefficient { field, .. }
            | CalcError::OutOfRange { field, .. }
            | CalcError::ImplausibleResult { field, .. }
            | CalcError::NotSolvable { field, .. }
            | CalcError::UnknownVariable { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::MissingInput { .. } => "MISSING_INPUT",
            CalcError::AmbiguousUnknown { .. } => "AMBIGUOUS_UNKNOWN",
            CalcError::InvalidNumber { .. } => "INVALID_NUMBER",
            CalcError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CalcError::NonPositiveInput { .. } => "NON_POSITIVE_INPUT",
            CalcError::InvalidCoefficient { .. } => "INVALID_COEFFICIENT",
            CalcError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalcError::DivisionByZero { .. } => "DIVISION_BY_ZERO",
            CalcError::ImplausibleResult { .. } => "IMPLAUSIBLE_RESULT",
            CalcError::NotSolvable { .. } => "NOT_SOLVABLE",
            CalcError::UnknownVariable { .. } => "UNKNOWN_VARIABLE",
            CalcError::UnknownFormula { .. } => "UNKNOWN_FORMULA",
            CalcError::Configuration { .. } => "CONFIGURATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::non_positive_input("m1", -2.0);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"NonPositiveInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_input("m2").error_code(), "MISSING_INPUT");
        assert_eq!(CalcError::division_by_zero("m2").error_code(), "DIVISION_BY_ZERO");
        assert_eq!(
            CalcError::configuration("units.toml", "bad").error_code(),
            "CONFIGURATION_ERROR"
        );
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = CalcError::invalid_number("v1i", "abc");
        assert_eq!(err.to_string(), "'abc' is not a valid number for 'v1i'");

        let err = CalcError::ambiguous_unknown(["v1f", "v2f"]);
        assert_eq!(
            err.to_string(),
            "Exactly one value must be left blank; blank: [v1f, v2f]"
        );
    }

    #[test]
    fn test_input_error_classification() {
        assert!(CalcError::out_of_range("RH", 1.2, "above 100 %").is_input_error());
        assert!(CalcError::not_solvable("cloud_base_humidity", "T").is_input_error());
        assert!(!CalcError::internal("missing symbol").is_input_error());
        assert!(!CalcError::unknown_formula("warp_drive").is_input_error());
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(CalcError::invalid_coefficient("Cd", 1.5).field(), Some("Cd"));
        assert_eq!(CalcError::division_by_zero("v1i - v1f").field(), None);
    }
}
