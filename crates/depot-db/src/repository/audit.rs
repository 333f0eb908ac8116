//! # Audit Repository
//!
//! Append-only log of who changed what. The schema refuses UPDATE and
//! DELETE on `audit_log`, so this repository only ever inserts and reads.

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{AuditAction, AuditLogEntry, AuditModule};

/// An entry to append. The id and timestamp are assigned on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub module: AuditModule,
    pub record_id: String,
    pub user: String,
    pub details: String,
}

impl NewAuditEntry {
    pub fn new(
        action: AuditAction,
        module: AuditModule,
        record_id: impl ToString,
        user: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        NewAuditEntry {
            action,
            module,
            record_id: record_id.to_string(),
            user: user.into(),
            details: details.into(),
        }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: i64,
    timestamp: NaiveDateTime,
    action: String,
    module: String,
    record_id: String,
    user: String,
    details: String,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = row
            .action
            .parse::<AuditAction>()
            .map_err(|e| DbError::corrupt("audit_log", e))?;
        let module = row
            .module
            .parse::<AuditModule>()
            .map_err(|e| DbError::corrupt("audit_log", e))?;

        Ok(AuditLogEntry {
            id: row.id,
            timestamp: row.timestamp,
            action,
            module,
            record_id: row.record_id,
            user: row.user,
            details: row.details,
        })
    }
}

/// Repository for the audit log.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditRepository;

impl AuditRepository {
    pub async fn append(
        &self,
        conn: &mut SqliteConnection,
        entry: &NewAuditEntry,
        at: NaiveDateTime,
    ) -> DbResult<i64> {
        debug!(
            action = %entry.action,
            module = %entry.module,
            record_id = %entry.record_id,
            user = %entry.user,
            "Appending audit entry"
        );

        let id = sqlx::query(
            r#"
            INSERT INTO audit_log (timestamp, action, module, record_id, user, details)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(at)
        .bind(entry.action.as_str())
        .bind(entry.module.as_str())
        .bind(&entry.record_id)
        .bind(&entry.user)
        .bind(&entry.details)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Entries newest first, optionally narrowed by module and action.
    pub async fn query(
        &self,
        conn: &mut SqliteConnection,
        module: Option<AuditModule>,
        action: Option<AuditAction>,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, timestamp, action, module, record_id, user, details
            FROM audit_log
            WHERE (?1 IS NULL OR module = ?1)
              AND (?2 IS NULL OR action = ?2)
            ORDER BY id DESC
            "#,
        )
        .bind(module.map(|m| m.as_str()))
        .bind(action.map(|a| a.as_str()))
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_and_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.audit();

        repo.append(
            &mut conn,
            &NewAuditEntry::new(AuditAction::Create, AuditModule::Inventory, 1, "admin", "Added Crate"),
            at(0),
        )
        .await
        .unwrap();
        repo.append(
            &mut conn,
            &NewAuditEntry::new(AuditAction::Create, AuditModule::Orders, 1, "manager", "Acme"),
            at(1),
        )
        .await
        .unwrap();
        repo.append(
            &mut conn,
            &NewAuditEntry::new(AuditAction::Update, AuditModule::Orders, 1, "manager", "Fulfilled"),
            at(2),
        )
        .await
        .unwrap();

        let all = repo.query(&mut conn, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, AuditAction::Update);
        assert_eq!(all[2].module, AuditModule::Inventory);

        let orders = repo
            .query(&mut conn, Some(AuditModule::Orders), None)
            .await
            .unwrap();
        assert_eq!(orders.len(), 2);

        let created_orders = repo
            .query(&mut conn, Some(AuditModule::Orders), Some(AuditAction::Create))
            .await
            .unwrap();
        assert_eq!(created_orders.len(), 1);
        assert_eq!(created_orders[0].user, "manager");
    }

    #[tokio::test]
    async fn test_log_is_append_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        db.audit()
            .append(
                &mut conn,
                &NewAuditEntry::new(AuditAction::Delete, AuditModule::Users, "bob", "admin", ""),
                at(0),
            )
            .await
            .unwrap();

        assert!(sqlx::query("UPDATE audit_log SET user = 'mallory'")
            .execute(&mut *conn)
            .await
            .is_err());
        assert!(sqlx::query("DELETE FROM audit_log")
            .execute(&mut *conn)
            .await
            .is_err());

        let entries = db.audit().query(&mut conn, None, None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user, "admin");
    }
}
