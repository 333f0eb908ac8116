//! # Repository Module
//!
//! Database repository implementations for Depot.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Connections                         │
//! │                                                                         │
//! │  Service                                                                │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin_write().await?;                          │
//! │       │  db.inventory().set_quantity(&mut tx, ..)                       │
//! │       │  db.movements().record(&mut tx, ..)                             │
//! │       │  db.audit().append(&mut tx, ..)                                 │
//! │       │  tx.commit().await?;                                            │
//! │       ▼                                                                 │
//! │  Repository methods take `&mut SqliteConnection`: a pooled connection  │
//! │  for reads, the write transaction for mutations. All SQL for a table   │
//! │  lives in its repository.                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into `*Row` structs with `sqlx::FromRow` and converted
//! into depot-core types with `TryFrom`; a value that does not parse
//! surfaces as [`DbError::CorruptRecord`](crate::DbError::CorruptRecord).
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`] - Stock items
//! - [`OrderRepository`] - Orders and their lines
//! - [`MovementRepository`] - IN/OUT stock movements
//! - [`UserRepository`] - Login accounts
//! - [`EmployeeRepository`] - Staff records
//! - [`AttendanceRepository`] - Daily check-in / check-out
//! - [`WarehouseRepository`] - Storage locations
//! - [`AuditRepository`] - Append-only audit log

pub mod attendance;
pub mod audit;
pub mod employee;
pub mod inventory;
pub mod movement;
pub mod order;
pub mod user;
pub mod warehouse;

pub use attendance::AttendanceRepository;
pub use audit::{AuditRepository, NewAuditEntry};
pub use employee::{EmployeeRepository, NewEmployee};
pub use inventory::InventoryRepository;
pub use movement::MovementRepository;
pub use order::OrderRepository;
pub use user::UserRepository;
pub use warehouse::{NewWarehouse, WarehouseRepository};
