//! # Session State
//!
//! Logged-in users, keyed by an opaque token.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  UI Action              Service call               State Change         │
//! │  ─────────              ────────────               ────────────         │
//! │                                                                         │
//! │  Log in ──────────────► auth.authenticate() ─────► sessions.insert()   │
//! │                                                                         │
//! │  Any page ────────────► auth.session(token) ─────► (read only)         │
//! │                                                                         │
//! │  Log out ─────────────► auth.logout(token) ──────► sessions.remove()   │
//! │                                                                         │
//! │  Role and name are copied at login. A role change takes effect on      │
//! │  the next login.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use depot_core::{Role, UserAccount};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub started_at: NaiveDateTime,
}

impl Session {
    pub fn for_user(user: &UserAccount, started_at: NaiveDateTime) -> Self {
        Session {
            token: Uuid::new_v4(),
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            started_at,
        }
    }
}

/// Registry of open sessions.
///
/// Each operation holds the lock only for a map lookup or update.
#[derive(Debug, Default)]
pub struct SessionState {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, session: Session) {
        self.sessions().insert(session.token, session);
    }

    pub fn get(&self, token: &Uuid) -> Option<Session> {
        self.sessions().get(token).cloned()
    }

    pub fn remove(&self, token: &Uuid) -> Option<Session> {
        self.sessions().remove(token)
    }

    /// Ends every session of a user, e.g. after the account is deleted.
    pub fn remove_user(&self, username: &str) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, s| s.username != username);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(username: &str, role: Role) -> UserAccount {
        UserAccount {
            username: username.to_string(),
            password_hash: String::new(),
            role,
            full_name: username.to_uppercase(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_get_remove() {
        let state = SessionState::new();
        let session = Session::for_user(&user("asha", Role::Manager), at());
        let token = session.token;

        state.insert(session.clone());
        assert_eq!(state.get(&token), Some(session));
        assert_eq!(state.len(), 1);

        assert!(state.remove(&token).is_some());
        assert!(state.get(&token).is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_tokens_are_unique_per_login() {
        let account = user("asha", Role::Manager);
        let a = Session::for_user(&account, at());
        let b = Session::for_user(&account, at());
        assert_ne!(a.token, b.token);
        assert_eq!(a.role, b.role);
    }

    #[test]
    fn test_remove_user_ends_all_sessions() {
        let state = SessionState::new();
        state.insert(Session::for_user(&user("bob", Role::Worker), at()));
        state.insert(Session::for_user(&user("bob", Role::Worker), at()));
        state.insert(Session::for_user(&user("asha", Role::Admin), at()));

        assert_eq!(state.remove_user("bob"), 2);
        assert_eq!(state.len(), 1);
    }
}
