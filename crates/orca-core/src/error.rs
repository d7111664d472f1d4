//! # Error Types
//!
//! Domain-specific error types for orca-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orca-core errors (this file)                                          │
//! │  ├── CoreError        - Calculation failures                           │
//! │  └── ValidationError  - Input rejected before any arithmetic           │
//! │                                                                         │
//! │  orca-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures (wraps CoreError)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! - A store without configuration: defaults are provisioned.
//! - A value no commission tier covers: zero commission plus a warning on
//!   the calculation. The caller decides whether to alert an operator.

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Budget engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An amount left the representable range of `Money`.
    ///
    /// ## When This Occurs
    /// Only for absurd inputs (hundreds of quadrillions of reais); the engine
    /// reports it instead of wrapping around.
    #[error("Amount overflow in {operation}")]
    AmountOverflow { operation: String },
}

impl CoreError {
    pub fn overflow(operation: impl Into<String>) -> Self {
        CoreError::AmountOverflow {
            operation: operation.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors. Every variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Monetary value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// A fraction outside `[0, 1]`.
    #[error("{field} must be a fraction between 0 and 1, got {value}")]
    FractionOutOfRange { field: String, value: Decimal },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Vendor discount limit above the manager limit.
    #[error("vendor_discount_limit ({vendor}) must not exceed manager_discount_limit ({manager})")]
    LimitsInverted { vendor: Decimal, manager: Decimal },

    /// Commission band whose ceiling is below its floor.
    #[error("commission tier {order} has max_value below min_value")]
    InvertedTier { order: i32 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::FractionOutOfRange { field, .. }
            | ValidationError::TooMany { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::LimitsInverted { .. } => "vendor_discount_limit",
            ValidationError::InvertedTier { .. } => "max_value",
        }
    }
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Negative {
            field: "ambient_value".to_string(),
        };
        assert_eq!(err.to_string(), "ambient_value must not be negative");

        let err = ValidationError::FractionOutOfRange {
            field: "discount".to_string(),
            value: dec!(1.5),
        };
        assert_eq!(
            err.to_string(),
            "discount must be a fraction between 0 and 1, got 1.5"
        );
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::Required {
            field: "vendor_id".to_string(),
        };
        assert_eq!(err.field(), "vendor_id");

        let err = ValidationError::LimitsInverted {
            vendor: dec!(0.3),
            manager: dec!(0.2),
        };
        assert_eq!(err.field(), "vendor_discount_limit");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "store_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
