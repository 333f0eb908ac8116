//! # State Module
//!
//! Process-wide state shared by every service.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppContext                                 │   │
//! │  │  built once at startup, cloned into each service                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┬──────────────┐        │
//! │          ▼                  ▼                  ▼              ▼         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐ ┌───────────┐   │
//! │  │  Database    │  │ SessionState │  │ ConfigState  │ │  Clock    │   │
//! │  │              │  │              │  │              │ │           │   │
//! │  │  SQLite pool │  │  Mutex<Map<  │  │  alerts      │ │  System / │   │
//! │  │  writer lock │  │  token, ..>> │  │  currency    │ │  Fixed    │   │
//! │  └──────────────┘  └──────────────┘  └──────────────┘ └───────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: pool is thread-safe, mutations serialize on the lock      │
//! │  • SessionState: Mutex for exclusive access                            │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod clock;
mod config;
mod session;

pub use clock::Clock;
pub use config::{AlertSettings, ConfigError, ConfigState};
pub use session::{Session, SessionState};
