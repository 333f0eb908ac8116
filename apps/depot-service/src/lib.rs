//! # Depot Service Library
//!
//! Service layer for the Depot warehouse application. The UI layer calls
//! into the services here; they enforce permissions and business rules and
//! persist through depot-db.
//!
//! ## Module Organization
//! ```text
//! depot_service/
//! ├── lib.rs          ◄─── You are here (bootstrap & AppContext)
//! ├── state/
//! │   ├── config.rs   ◄─── Configuration from DEPOT_* variables
//! │   ├── session.rs  ◄─── Logged-in sessions
//! │   └── clock.rs    ◄─── Source of "now"
//! ├── services/
//! │   ├── gate.rs     ◄─── The single permission check
//! │   ├── auth.rs     ◄─── Login, users, passwords
//! │   ├── inventory.rs◄─── Stock items, restock, adjustments
//! │   ├── order.rs    ◄─── Create / fulfill / delete orders
//! │   ├── employee.rs ◄─── Staff and attendance
//! │   ├── analytics.rs◄─── Reports
//! │   └── admin.rs    ◄─── Warehouses and audit trail
//! └── error.rs        ◄─── ApiError returned by every service
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ctx.orders().create_order(&session, "Acme", &lines)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Gate::check(session, Action::Create) ── denied ──► PermissionDenied   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.begin_write()  (writer lock + BEGIN)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load stock ─► plan_order ─► write quantities, movements, order, audit │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT (any error before this point rolls everything back)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod services;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use depot_db::{Database, DbConfig, DbError};

pub use error::{ApiError, ApiResult, ErrorCode};
use services::{
    AdminService, AnalyticsService, AuthService, EmployeeService, InventoryService, OrderService,
};
pub use state::{Clock, ConfigState, Session};
use state::{ConfigError, SessionState};

// =============================================================================
// Bootstrap
// =============================================================================

/// Startup failures. Unlike [`ApiError`], these stop the process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=depot=trace` - Show trace for depot crates only
/// - Default: `info,depot=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,depot=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.depot.warehouse/depot.db`
/// - **Windows**: `%APPDATA%\depot\warehouse\data\depot.db`
/// - **Linux**: `~/.local/share/warehouse/depot.db`
///
/// `DEPOT_DB_PATH` (carried in [`ConfigState::database_path`]) overrides.
pub fn database_path(config: &ConfigState) -> Result<PathBuf, BootstrapError> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "depot", "warehouse").ok_or(BootstrapError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("depot.db"))
}

// =============================================================================
// Application Context
// =============================================================================

/// Everything a service needs, built once at startup.
///
/// Cheap to clone: the database handle and the session registry are
/// shared, the configuration is behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppContext {
    db: Database,
    config: Arc<ConfigState>,
    sessions: Arc<SessionState>,
    clock: Clock,
}

impl AppContext {
    pub fn new(db: Database, config: ConfigState) -> Self {
        AppContext {
            db,
            config: Arc::new(config),
            sessions: Arc::new(SessionState::new()),
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Opens the database named by `config` (running migrations) and
    /// builds the context.
    ///
    /// ## Startup Sequence
    /// 1. Resolve the database path
    /// 2. Connect, WAL mode, run pending migrations (which seed the default
    ///    accounts and the main warehouse on a fresh file)
    /// 3. Empty session registry
    pub async fn bootstrap(config: ConfigState) -> Result<Self, BootstrapError> {
        let db_path = database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Ok(AppContext::new(db, config))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn sessions(&self) -> &SessionState {
        &self.sessions
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.clone())
    }

    pub fn employees(&self) -> EmployeeService {
        EmployeeService::new(self.clone())
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.clone())
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use depot_core::Role;

    pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Fresh in-memory store, clock frozen at 2024-06-03 10:00.
    pub async fn context() -> AppContext {
        context_at(at(10, 0)).await
    }

    pub async fn context_at(now: NaiveDateTime) -> AppContext {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppContext::new(db, ConfigState::default()).with_clock(Clock::Fixed(now))
    }

    /// Logs in one of the seeded accounts.
    pub async fn login(ctx: &AppContext, role: Role) -> Session {
        let (username, password) = match role {
            Role::Admin => ("admin", "admin123"),
            Role::Manager => ("manager", "manager123"),
            Role::Worker => ("worker", "worker123"),
        };
        ctx.auth().authenticate(username, password).await.unwrap()
    }
}
