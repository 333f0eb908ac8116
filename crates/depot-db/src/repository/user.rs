//! # User Repository
//!
//! Login accounts keyed by username.

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{Role, UserAccount, ValidationError};

#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    role: String,
    full_name: String,
    created_at: NaiveDateTime,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|_| {
            DbError::corrupt(
                "users",
                ValidationError::NotAllowed {
                    field: "role".to_string(),
                    allowed: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
                },
            )
        })?;

        Ok(UserAccount {
            username: row.username,
            password_hash: row.password_hash,
            role,
            full_name: row.full_name,
            created_at: row.created_at,
        })
    }
}

/// Repository for user accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    pub async fn get(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
    ) -> DbResult<Option<UserAccount>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT username, password_hash, role, full_name, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(UserAccount::try_from).transpose()
    }

    /// All accounts ordered by username.
    pub async fn list(&self, conn: &mut SqliteConnection) -> DbResult<Vec<UserAccount>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT username, password_hash, role, full_name, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(UserAccount::try_from).collect()
    }

    /// Inserts an account. A taken username surfaces as
    /// [`DbError::UniqueViolation`].
    pub async fn insert(&self, conn: &mut SqliteConnection, user: &UserAccount) -> DbResult<()> {
        debug!(username = %user.username, role = %user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.full_name)
        .bind(user.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_violation() {
                DbError::duplicate("username", user.username.clone())
            } else {
                err
            }
        })?;

        Ok(())
    }

    /// Returns false when no such user exists.
    pub async fn delete(&self, conn: &mut SqliteConnection, username: &str) -> DbResult<bool> {
        debug!(username = %username, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_password_hash(
        &self,
        conn: &mut SqliteConnection,
        username: &str,
        password_hash: &str,
    ) -> DbResult<()> {
        debug!(username = %username, "Updating password hash");

        let result = sqlx::query("UPDATE users SET password_hash = ?1 WHERE username = ?2")
            .bind(password_hash)
            .bind(username)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", username));
        }
        Ok(())
    }

    pub async fn count_admins(&self, conn: &mut SqliteConnection) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(Role::Admin.as_str())
            .fetch_one(&mut *conn)
            .await?;

        Ok(count as usize)
    }
}
