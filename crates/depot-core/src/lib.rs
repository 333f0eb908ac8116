//! # depot-core: Pure Business Logic for Depot
//!
//! This crate holds every warehouse rule as a pure function with zero I/O
//! dependencies. Persistence lives in `depot-db`, orchestration in
//! `depot-service`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Depot Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI layer (external collaborator)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                depot-service (gate + services)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  ledger  │ │   peak   │ │  orders  │ │ authz / creds    │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐                       │   │
//! │  │   │analytics │ │  money   │ │validation│                       │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    depot-db (SQLite layer)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Order, Employee, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Form-level input rules
//! - [`ledger`] - Stock movement validation and stock reports
//! - [`peak`] - Peak-hour capacity policy
//! - [`orders`] - Validate-all order planning
//! - [`authz`] - Role permission table and the access decision
//! - [`credentials`] - Password digests and account rules
//! - [`analytics`] - Profit, turnover, trends, forecasts
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::ledger::{validate_movement, Direction};
//! use depot_core::{InventoryItem, Money};
//!
//! let stock = vec![InventoryItem::new(1, "Pallet wrap", 5, Money::from_cents(1250), 10)];
//!
//! let check = validate_movement(&stock, 1, 3, Direction::Out).unwrap();
//! assert_eq!(check.new_qty, 2);
//! assert!(check.warning.is_some()); // 2 < min_stock of 10
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod authz;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod money;
pub mod orders;
pub mod peak;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{AccessDecision, Action, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum stock threshold applied when an item carries none.
pub const DEFAULT_MIN_STOCK: i64 = 10;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Number of most recent orders the low-stock forecast looks at.
///
/// The consumption rate divides by this same number, treating the window
/// as thirty days of demand.
pub const FORECAST_ORDER_WINDOW: usize = 30;
