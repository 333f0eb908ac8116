//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  depot-db errors (separate crate)                                      │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  depot-service errors                                                  │
//! │  └── ApiError         - What the UI layer sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries enough context (ids, quantities, names) to build
//! the human-readable message without looking anything up again.

use thiserror::Error;

use crate::authz::{Action, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// None of these abort the process; the service layer turns each one into a
/// structured failure for the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Inventory item id is not in the ledger.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// Movement quantity was zero or negative.
    #[error("Quantity must be > 0 (got {0})")]
    InvalidQuantity(i64),

    /// Not enough stock to move out.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line: 8 × "Shrink film" (available 5)
    ///      │
    ///      ▼
    /// validate_movement(OUT, 8)
    ///      │
    ///      ▼
    /// InsufficientStock { item_id: 3, available: 5, requested: 8 }
    ///      │
    ///      ▼
    /// Whole order rejected, nothing deducted
    /// ```
    #[error("Insufficient stock for {name} (#{item_id}): {available} available, {requested} requested")]
    InsufficientStock {
        item_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// An order needs a customer and at least one line.
    #[error("Order must have a customer and at least one item")]
    EmptyOrder,

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(i64),

    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(i64),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Username '{0}' already exists")]
    UsernameTaken(String),

    #[error("Invalid role '{0}'. Must be one of: admin, manager, worker")]
    InvalidRole(String),

    /// The last admin account can never be removed.
    #[error("Cannot delete the last admin account")]
    LastAdminProtected,

    #[error("Current password is incorrect")]
    WrongOldPassword,

    #[error("New password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Role {role} is not allowed to {action}")]
    PermissionDenied { role: Role, action: Action },

    #[error("Employee {0} already checked in today")]
    AlreadyCheckedIn(i64),

    #[error("No check-in record found today for employee {0}")]
    NotCheckedIn(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the form-level checks before any business rule runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value cannot be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Stored or supplied text could not be parsed.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub fn negative(field: &str) -> Self {
        ValidationError::Negative {
            field: field.to_string(),
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
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            item_id: 3,
            name: "Shrink film".to_string(),
            available: 5,
            requested: 8,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Shrink film (#3): 5 available, 8 requested"
        );
    }

    #[test]
    fn test_permission_denied_message() {
        let err = CoreError::PermissionDenied {
            role: Role::Worker,
            action: Action::Delete,
        };
        assert_eq!(err.to_string(), "Role worker is not allowed to delete");
    }

    #[test]
    fn test_not_allowed_lists_options() {
        let err = ValidationError::NotAllowed {
            field: "position".to_string(),
            allowed: vec!["Worker".to_string(), "Manager".to_string()],
        };
        assert_eq!(err.to_string(), "position must be one of: Worker, Manager");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
