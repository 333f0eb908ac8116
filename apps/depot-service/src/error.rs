//! # API Error Type
//!
//! Unified error type for every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Depot                                  │
//! │                                                                         │
//! │  UI layer                    Service layer                              │
//! │  ────────                    ─────────────                              │
//! │                                                                         │
//! │  orders.create_order(..)                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method                                                  │  │
//! │  │  ApiResult<T>                                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Gate denied? ──── CoreError::PermissionDenied ────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule broken? ──── CoreError::InsufficientStock ── ApiError ───►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Storage failed? ─ DbError::QueryFailed ───────────┘            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for Crate (#3): 5 available, ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal. Storage failures are logged with their cause and
//! reported with a generic message.

use serde::Serialize;
use tracing::error;

use depot_core::{CoreError, ValidationError};
use depot_db::DbError;

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item, order, employee, user or warehouse does not exist
    NotFound,

    /// Empty or out-of-range field
    InvalidInput,

    InsufficientStock,

    /// Role lacks the action
    PermissionDenied,

    /// Username already taken
    DuplicateKey,

    /// A stored value failed to parse
    CorruptPersistedState,

    /// Storage could not be read or written
    IoFailure,

    /// Wrong password on login or password change
    AuthenticationFailed,

    /// Session token unknown or logged out
    Unauthenticated,

    /// Last-admin protection, attendance rules
    BusinessRule,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessRule, message)
    }

    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Not logged in")
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::DuplicateKey,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::invalid_input("Invalid reference")
            }
            DbError::CorruptRecord { table, reason } => {
                error!(table = %table, reason = %reason, "Corrupt record");
                ApiError::new(
                    ErrorCode::CorruptPersistedState,
                    format!("Stored {} data is corrupt: {}", table, reason),
                )
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::IoFailure, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::IoFailure, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::IoFailure, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::IoFailure, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::IoFailure, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::IoFailure, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::EmployeeNotFound(_)
            | CoreError::WarehouseNotFound(_)
            | CoreError::UserNotFound(_) => ErrorCode::NotFound,

            CoreError::InvalidQuantity(_)
            | CoreError::EmptyOrder
            | CoreError::InvalidRole(_)
            | CoreError::PasswordTooShort { .. }
            | CoreError::Validation(_) => ErrorCode::InvalidInput,

            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::UsernameTaken(_) => ErrorCode::DuplicateKey,
            CoreError::PermissionDenied { .. } => ErrorCode::PermissionDenied,

            CoreError::WrongPassword | CoreError::WrongOldPassword => {
                ErrorCode::AuthenticationFailed
            }

            CoreError::LastAdminProtected
            | CoreError::AlreadyCheckedIn(_)
            | CoreError::NotCheckedIn(_) => ErrorCode::BusinessRule,
        };

        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
