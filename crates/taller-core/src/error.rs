//! # Error Types
//!
//! Domain-specific error types for taller-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  taller-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  taller-client errors (separate crate)                                 │
//! │  └── ClientError      - Upstream fetch failures                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → anyhow (CLI) → stderr             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! The report pipeline itself never fails. Bad record dates, unknown
//! entities and inverted windows become [`ReportWarning`]s attached to the
//! outcome, so one bad record never hides the rest of the report.
//!
//! [`ReportWarning`]: crate::report::ReportWarning

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// Raised by caller-side checks that run before a report is generated.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested report kind does not exist.
    #[error("Unknown report kind: '{0}' (expected 'purchases' or 'sales')")]
    UnknownReportKind(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// The calling UI shows them as a blocking notice.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid date, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A range whose start lies after its end.
    #[error("{field} is invalid: start {start} is after end {end}")]
    InvalidRange {
        field: String,
        start: String,
        end: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "start date".to_string(),
        };
        assert_eq!(err.to_string(), "start date is required");

        let err = ValidationError::InvalidRange {
            field: "period".to_string(),
            start: "2024-02-01".to_string(),
            end: "2024-01-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "period is invalid: start 2024-02-01 is after end 2024-01-01"
        );
    }

    #[test]
    fn test_unknown_kind_message() {
        let err = CoreError::UnknownReportKind("pedidos".to_string());
        assert!(err.to_string().contains("'pedidos'"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "end date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
