//! # Validation Module
//!
//! Form-level input rules, applied before any business rule runs.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: UI forms (external)                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: depot-service                                                │
//! │  └── THIS MODULE: field rules (names, ages, prices, salaries)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (username, attendance per day)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::validation::validate_inventory_item;
//! use depot_core::Money;
//!
//! assert!(validate_inventory_item("Pallet wrap", 40, Money::from_cents(1250), 10).is_ok());
//! assert!(validate_inventory_item("", 40, Money::from_cents(1250), 10).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Position;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Youngest and oldest hireable age.
pub const MIN_EMPLOYEE_AGE: i64 = 18;
pub const MAX_EMPLOYEE_AGE: i64 = 70;

/// Salary ceiling in major units.
pub const MAX_SALARY: i64 = 500_000;

const MAX_NAME_LEN: usize = 200;
const MAX_USERNAME_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (item, employee, customer, warehouse).
///
/// Returns the trimmed value.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a login name: non-empty, no whitespace, at most 50 characters.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(username.to_string())
}

/// Validates a search query. Empty is allowed and matches everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates the hire form.
///
/// ## Rules
/// - name required
/// - age within 18..=70
/// - position one of Worker, Supervisor, Manager, Engineer
/// - salary within 0..=500 000
///
/// ```rust
/// use depot_core::validation::validate_employee;
/// use depot_core::{Money, Position};
///
/// let position = validate_employee("Asha", 29, "Supervisor", Money::from_major_minor(32_000, 0)).unwrap();
/// assert_eq!(position, Position::Supervisor);
/// assert!(validate_employee("Asha", 17, "Supervisor", Money::zero()).is_err());
/// ```
pub fn validate_employee(
    name: &str,
    age: i64,
    position: &str,
    salary: Money,
) -> ValidationResult<Position> {
    validate_name("name", name)?;

    if !(MIN_EMPLOYEE_AGE..=MAX_EMPLOYEE_AGE).contains(&age) {
        return Err(ValidationError::OutOfRange {
            field: "age".to_string(),
            min: MIN_EMPLOYEE_AGE,
            max: MAX_EMPLOYEE_AGE,
        });
    }

    let position = position.trim().parse::<Position>()?;

    if salary.is_negative() || salary > Money::from_major_minor(MAX_SALARY, 0) {
        return Err(ValidationError::OutOfRange {
            field: "salary".to_string(),
            min: 0,
            max: MAX_SALARY,
        });
    }

    Ok(position)
}

/// Validates the add-stock form.
///
/// ## Rules
/// - name required
/// - quantity ≥ 0
/// - price > 0
/// - min_stock ≥ 0
pub fn validate_inventory_item(
    name: &str,
    quantity: i64,
    price: Money,
    min_stock: i64,
) -> ValidationResult<()> {
    validate_name("name", name)?;

    if quantity < 0 {
        return Err(ValidationError::negative("quantity"));
    }

    if !price.is_positive() {
        return Err(ValidationError::must_be_positive("price"));
    }

    if min_stock < 0 {
        return Err(ValidationError::negative("min_stock"));
    }

    Ok(())
}

/// Validates a stock correction: absolute quantity ≥ 0 and price > 0.
pub fn validate_adjustment(quantity: i64, price: Money) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::negative("quantity"));
    }

    if !price.is_positive() {
        return Err(ValidationError::must_be_positive("price"));
    }

    Ok(())
}

/// Warehouse capacity must be positive.
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if capacity <= 0 {
        return Err(ValidationError::must_be_positive("capacity"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
