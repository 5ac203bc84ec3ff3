//! # Error Types
//!
//! Domain-specific error types for teknoroma-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  teknoroma-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  teknoroma-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  ├── ServiceError     - Core | Db, returned by services                │
//! │  └── ApiError         - What HTTP clients see (status + JSON body)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError → Client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, ID, status, etc.)
//! 3. Every variant maps to exactly one [`ErrorKind`]

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// The error taxonomy shared by every layer.
///
/// ## HTTP Mapping (done in apps/api)
/// ```text
/// Validation             → 400
/// NotFound               → 404
/// InsufficientStock      → 400
/// Duplicate              → 400
/// InvalidStateTransition → 400
/// Infrastructure         → 500 (generic message)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientStock,
    Duplicate,
    InvalidStateTransition,
    Infrastructure,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Insufficient stock to complete a sale or decrement.
    ///
    /// ## User Workflow
    /// ```text
    /// CreateSale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Laptop X", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Nothing written, 400 returned
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Unique-constraint violation (category name, barcode, ...).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Illegal status change.
    ///
    /// ## When This Occurs
    /// - Cancelling a completed sale
    /// - Confirming payment twice
    /// - Resolving a closed ticket
    #[error("{entity} {id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::Duplicate { .. } => ErrorKind::Duplicate,
            CoreError::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid month).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection must not be empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
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

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Laptop X".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Laptop X: available 3, requested 5"
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        let err = CoreError::InvalidStateTransition {
            entity: "Sale".to_string(),
            id: "S-2024-00001".to_string(),
            from: "completed".to_string(),
            to: "cancelled".to_string(),
        };
        assert_eq!(err.to_string(), "Sale S-2024-00001 cannot move from completed to cancelled");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("barcode").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
        assert_eq!(core_err.to_string(), "Validation error: barcode is required");
    }

    #[test]
    fn test_duplicate_kind() {
        let err = CoreError::duplicate("barcode", "8690000000001");
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(err.to_string(), "barcode '8690000000001' already exists");
    }
}
