//! # Auth Service
//!
//! Login, logout and user account management.
//!
//! ## Account Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation          Who                    Audit                        │
//! │  ─────────          ───                    ─────                        │
//! │  authenticate       anyone                 -                            │
//! │  register_user      anyone (login page)    CREATE users <username>      │
//! │  create_user        admin                  CREATE users <username>      │
//! │  delete_user        admin, not self        DELETE users <username>      │
//! │  change_password    the logged-in user     UPDATE users <username>      │
//! │  list_users         admin                  -                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Passwords are stored as SHA-256 hex digests. The last admin account can
//! never be deleted.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;
use depot_core::credentials::{
    check_user_deletion, hash_password, validate_new_password, verify_password,
};
use depot_core::validation::{validate_name, validate_username};
use depot_core::{Action, AuditAction, AuditModule, CoreError, Role, UserAccount, UserProfile};
use depot_db::{DbError, NewAuditEntry};

pub struct AuthService {
    ctx: AppContext,
}

impl AuthService {
    pub fn new(ctx: AppContext) -> Self {
        AuthService { ctx }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Checks the credentials and opens a session.
    ///
    /// Fails with `NOT_FOUND` for an unknown username and
    /// `AUTHENTICATION_FAILED` for a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<Session> {
        let username = username.trim();
        debug!(username = %username, "Login attempt");

        let mut conn = self.ctx.db().acquire().await?;
        let user = self
            .ctx
            .db()
            .users()
            .get(&mut conn, username)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(username.to_string()))?;

        if !verify_password(password, &user.password_hash) {
            warn!(username = %username, "Login failed: wrong password");
            return Err(CoreError::WrongPassword.into());
        }

        let session = Session::for_user(&user, self.ctx.now());
        self.ctx.sessions().insert(session.clone());

        info!(username = %session.username, role = %session.role, "User logged in");
        Ok(session)
    }

    /// Closes a session. Returns false if the token was not open.
    pub fn logout(&self, token: &Uuid) -> bool {
        let removed = self.ctx.sessions().remove(token);
        if let Some(session) = &removed {
            info!(username = %session.username, "User logged out");
        }
        removed.is_some()
    }

    /// Resolves a token to its session.
    pub fn session(&self, token: &Uuid) -> ApiResult<Session> {
        self.ctx
            .sessions()
            .get(token)
            .ok_or_else(ApiError::unauthenticated)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Self-registration from the login page. No session required.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
        full_name: &str,
    ) -> ApiResult<UserProfile> {
        self.insert_account(username, password, role, full_name, None).await
    }

    /// Account creation from the admin panel.
    pub async fn create_user(
        &self,
        session: &Session,
        username: &str,
        password: &str,
        role: &str,
        full_name: &str,
    ) -> ApiResult<UserProfile> {
        Gate::check(session, Action::Delete)?;

        self.insert_account(username, password, role, full_name, Some(&session.username))
            .await
    }

    /// Deletes an account and closes its sessions.
    ///
    /// An admin cannot delete their own account, and the last admin can
    /// never be deleted.
    pub async fn delete_user(&self, session: &Session, username: &str) -> ApiResult<()> {
        Gate::check(session, Action::Delete)?;

        let username = username.trim();
        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let target = db
            .users()
            .get(&mut tx, username)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(username.to_string()))?;

        let admin_count = db.users().count_admins(&mut tx).await?;
        check_user_deletion(target.role, admin_count)?;

        if username == session.username {
            return Err(ApiError::business_rule("Cannot delete your own account"));
        }

        db.users().delete(&mut tx, username).await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Delete,
                    AuditModule::Users,
                    username,
                    session.username.as_str(),
                    format!("Deleted {} account", target.role),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        let closed = self.ctx.sessions().remove_user(username);
        info!(username = %username, by = %session.username, closed, "User deleted");
        Ok(())
    }

    /// Changes the caller's own password after checking the current one.
    ///
    /// A wrong current password is reported before any problem with the new
    /// one.
    pub async fn change_password(
        &self,
        session: &Session,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let user = db
            .users()
            .get(&mut tx, &session.username)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(session.username.clone()))?;

        if !verify_password(old_password, &user.password_hash) {
            return Err(CoreError::WrongOldPassword.into());
        }
        validate_new_password(new_password)?;

        db.users()
            .set_password_hash(&mut tx, &user.username, &hash_password(new_password))
            .await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Update,
                    AuditModule::Users,
                    &user.username,
                    user.username.as_str(),
                    "Password changed",
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        info!(username = %user.username, "Password changed");
        Ok(())
    }

    /// All accounts, without their password hashes.
    pub async fn list_users(&self, session: &Session) -> ApiResult<Vec<UserProfile>> {
        Gate::check(session, Action::Delete)?;

        let mut conn = self.ctx.db().acquire().await?;
        let users = self.ctx.db().users().list(&mut conn).await?;
        Ok(users.iter().map(UserAccount::profile).collect())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Validates and stores a new account. A taken username is reported
    /// before any other problem with the request. `actor` is `None` for
    /// self-registration.
    async fn insert_account(
        &self,
        username: &str,
        password: &str,
        role: &str,
        full_name: &str,
        actor: Option<&str>,
    ) -> ApiResult<UserProfile> {
        let username = validate_username(username)?;

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        if db.users().get(&mut tx, &username).await?.is_some() {
            return Err(CoreError::UsernameTaken(username).into());
        }

        let role: Role = role.trim().parse()?;
        validate_new_password(password)?;
        let account = UserAccount {
            password_hash: hash_password(password),
            role,
            full_name: validate_name("full_name", full_name)?,
            created_at: self.ctx.now(),
            username,
        };
        let actor = actor.unwrap_or(&account.username);

        db.users().insert(&mut tx, &account).await.map_err(|err| match err {
            DbError::UniqueViolation { .. } => {
                ApiError::from(CoreError::UsernameTaken(account.username.clone()))
            }
            other => other.into(),
        })?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Users,
                    &account.username,
                    actor,
                    format!("Created {} account", account.role),
                ),
                account.created_at,
            )
            .await?;

        tx.commit().await?;

        info!(username = %account.username, role = %account.role, by = %actor, "User created");
        Ok(account.profile())
    }
}
