//! # depot-db: Database Layer for Depot
//!
//! This crate provides database access for Depot. It uses an embedded
//! SQLite file with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Depot Data Flow                                │
//! │                                                                         │
//! │  depot-service (OrderService::create_order)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     depot-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Inventory     │    │ 001_schema   │  │   │
//! │  │   │ SqlitePool    │◄───│ Order         │    │ 002_defaults │  │   │
//! │  │   │ Writer lock   │    │ Movement ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite Database (depot.db, WAL)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, writer lock, write transactions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table group
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/depot.db")).await?;
//!
//! let mut conn = db.acquire().await?;
//! let items = db.inventory().list(&mut conn).await?;
//! ```
//!
//! Repositories never open transactions themselves. They run on whatever
//! connection they are handed, which lets the service layer compose
//! several of them inside one `begin_write()` transaction.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, WriteTransaction};

pub use repository::{
    AttendanceRepository, AuditRepository, EmployeeRepository, InventoryRepository,
    MovementRepository, NewAuditEntry, NewEmployee, NewWarehouse, OrderRepository,
    UserRepository, WarehouseRepository,
};
