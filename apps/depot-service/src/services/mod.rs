//! Service implementations.
//!
//! One service per area, each holding a clone of the [`AppContext`].
//! Reads use a pooled connection; every mutation runs inside one
//! `begin_write()` transaction together with its audit entry.
//!
//! [`AppContext`]: crate::AppContext

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod employee;
pub mod gate;
pub mod inventory;
pub mod order;

pub use admin::AdminService;
pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use employee::EmployeeService;
pub use gate::Gate;
pub use inventory::{InventoryService, StockChange};
pub use order::{OrderReceipt, OrderService, PeakStatus};
