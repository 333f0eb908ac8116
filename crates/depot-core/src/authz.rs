//! # Authorization Policy
//!
//! Fixed role → action table and the single access decision every service
//! operation goes through.
//!
//! ## Permission Table
//! ```text
//! ┌──────────┬──────┬────────┬────────┬────────┬──────────────┐
//! │ role     │ read │ create │ update │ delete │ view_reports │
//! ├──────────┼──────┼────────┼────────┼────────┼──────────────┤
//! │ admin    │  ✓   │   ✓    │   ✓    │   ✓    │      ✓       │
//! │ manager  │  ✓   │   ✓    │   ✓    │        │      ✓       │
//! │ worker   │  ✓   │        │        │        │              │
//! └──────────┴──────┴────────┴────────┴────────┴──────────────┘
//! ```
//!
//! ```rust
//! use depot_core::authz::{authorize, AccessDecision, Action, Role};
//!
//! assert!(authorize(Role::Manager, Action::Update).is_allowed());
//! assert_eq!(
//!     authorize(Role::Worker, Action::Create),
//!     AccessDecision::Denied { role: Role::Worker, action: Action::Create }
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Worker,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Worker];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Worker => "worker",
        }
    }

    /// Actions granted to this role.
    pub const fn permissions(&self) -> &'static [Action] {
        match self {
            Role::Admin => &[
                Action::Read,
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::ViewReports,
            ],
            Role::Manager => &[
                Action::Read,
                Action::Create,
                Action::Update,
                Action::ViewReports,
            ],
            Role::Worker => &[Action::Read],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "worker" => Ok(Role::Worker),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

// =============================================================================
// Action
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    ViewReports,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ViewReports => "view_reports",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Membership test against the fixed table.
pub fn has_permission(role: Role, action: Action) -> bool {
    role.permissions().contains(&action)
}

/// Textual variant for callers holding raw role/action names.
/// Unknown roles or actions are never permitted.
pub fn has_permission_str(role: &str, action: &str) -> bool {
    let Ok(role) = role.parse::<Role>() else {
        return false;
    };
    role.permissions().iter().any(|a| a.as_str() == action)
}

/// Outcome of the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed,
    Denied { role: Role, action: Action },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn into_result(self) -> CoreResult<()> {
        match self {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied { role, action } => {
                Err(CoreError::PermissionDenied { role, action })
            }
        }
    }
}

/// The single authorization gate.
pub fn authorize(role: Role, action: Action) -> AccessDecision {
    if has_permission(role, action) {
        AccessDecision::Allowed
    } else {
        AccessDecision::Denied { role, action }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [Action; 5] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::ViewReports,
    ];

    #[test]
    fn test_permission_table() {
        for action in ACTIONS {
            assert!(has_permission(Role::Admin, action));
        }

        assert!(has_permission(Role::Manager, Action::Create));
        assert!(has_permission(Role::Manager, Action::ViewReports));
        assert!(!has_permission(Role::Manager, Action::Delete));

        assert!(has_permission(Role::Worker, Action::Read));
        for action in [Action::Create, Action::Update, Action::Delete, Action::ViewReports] {
            assert!(!has_permission(Role::Worker, action));
        }
    }

    #[test]
    fn test_string_variant_rejects_unknown() {
        assert!(has_permission_str("admin", "delete"));
        assert!(has_permission_str("manager", "view_reports"));
        assert!(!has_permission_str("guest", "read"));
        assert!(!has_permission_str("admin", "launch"));
    }

    #[test]
    fn test_denied_decision_becomes_error() {
        let err = authorize(Role::Manager, Action::Delete).into_result().unwrap_err();
        assert_eq!(
            err,
            CoreError::PermissionDenied {
                role: Role::Manager,
                action: Action::Delete,
            }
        );
        assert!(authorize(Role::Admin, Action::Delete).into_result().is_ok());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("worker".parse::<Role>().unwrap(), Role::Worker);
        assert_eq!(
            "owner".parse::<Role>().unwrap_err(),
            CoreError::InvalidRole("owner".to_string())
        );
    }
}
