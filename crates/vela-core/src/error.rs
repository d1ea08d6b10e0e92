//! # Error Types
//!
//! Domain-specific error taxonomy for vela-core.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  vela-ledger errors (separate crate)                                    │
//! │  └── LedgerError      - Persistence/serialization failures              │
//! │                                                                         │
//! │  vela-terminal errors                                                   │
//! │  └── TerminalError    - Core | Ledger, what the UI layer sees           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → UI message         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Include context in messages (barcode, product name, amounts)
//! 3. Errors are enum variants, never bare Strings
//! 4. Each variant's Display text is shown to the cashier verbatim

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A scanned barcode is not in the catalog at all.
    ///
    /// Distinct from [`CoreError::NotFound`] so the register can offer
    /// "register this product?" instead of a generic lookup failure.
    #[error("Product not registered: {barcode}")]
    NotRegistered { barcode: String },

    /// Product has zero stock and cannot be added to a cart.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// The cart already holds every unit the catalog has.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "123" (stock 5, cart already at 5)
    ///      │
    ///      ▼
    /// StockLimitExceeded { name: "Cola 330ml", available: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 5 Cola 330ml in stock" - cart unchanged
    /// ```
    #[error("Only {available} of {name} in stock")]
    StockLimitExceeded { name: String, available: i64 },

    /// A checkout line item cannot be satisfied by current stock.
    /// Raised during the all-or-nothing pre-check; nothing is mutated.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Tendered amount does not cover the total.
    #[error("Insufficient payment: total {total_cents} cents, paid {paid_cents} cents")]
    InsufficientPayment { total_cents: i64, paid_cents: i64 },

    /// Checkout requested with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Illegal state transition (e.g., completing a non-pending transfer).
    #[error("Invalid state: {message}")]
    State { message: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a State error with the given message.
    pub fn state(message: impl Into<String>) -> Self {
        CoreError::State {
            message: message.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
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

    /// Invalid format (e.g., malformed barcode or email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode or store code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.into(),
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
            name: "Cola 330ml".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Cola 330ml: available 3, requested 5"
        );

        let err = CoreError::StockLimitExceeded {
            name: "Cola 330ml".to_string(),
            available: 5,
        };
        assert_eq!(err.to_string(), "Only 5 Cola 330ml in stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::duplicate("barcode", "123");
        assert_eq!(err.to_string(), "barcode '123' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
