//! # Permission Gate
//!
//! The one place permissions are checked. Every service operation that
//! needs a session calls [`Gate::check`] before touching the store.
//!
//! Admin-only operations (user management, new warehouse locations) gate
//! on [`Action::Delete`], the one action only admins hold.

use tracing::warn;

use crate::error::ApiResult;
use crate::state::Session;
use depot_core::authz::authorize;
use depot_core::Action;

pub struct Gate;

impl Gate {
    pub fn check(session: &Session, action: Action) -> ApiResult<()> {
        authorize(session.role, action).into_result().map_err(|err| {
            warn!(
                username = %session.username,
                role = %session.role,
                action = %action,
                "Permission denied"
            );
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use depot_core::{Role, UserAccount};

    fn session(role: Role) -> Session {
        let at = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Session::for_user(
            &UserAccount {
                username: role.as_str().to_string(),
                password_hash: String::new(),
                role,
                full_name: String::new(),
                created_at: at,
            },
            at,
        )
    }

    #[test]
    fn test_gate_follows_role_table() {
        let admin = session(Role::Admin);
        let manager = session(Role::Manager);
        let worker = session(Role::Worker);

        for action in [Action::Read, Action::Create, Action::Update, Action::Delete, Action::ViewReports] {
            assert!(Gate::check(&admin, action).is_ok());
        }

        assert!(Gate::check(&manager, Action::Update).is_ok());
        assert!(Gate::check(&manager, Action::ViewReports).is_ok());
        assert_eq!(
            Gate::check(&manager, Action::Delete).unwrap_err().code,
            ErrorCode::PermissionDenied
        );

        assert!(Gate::check(&worker, Action::Read).is_ok());
        assert!(Gate::check(&worker, Action::Create).is_err());
        assert!(Gate::check(&worker, Action::ViewReports).is_err());
    }
}
