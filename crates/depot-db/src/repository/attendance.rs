//! # Attendance Repository
//!
//! One row per employee per day. The `(employee_id, work_date)` unique key
//! backs the "at most one record per day" rule.

use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::DbResult;
use depot_core::AttendanceRecord;

#[derive(Debug, FromRow)]
struct AttendanceRow {
    employee_id: i64,
    work_date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            employee_id: row.employee_id,
            date: row.work_date,
            check_in: row.check_in,
            check_out: row.check_out,
        }
    }
}

/// Repository for attendance records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        employee_id: i64,
        date: NaiveDate,
    ) -> DbResult<Option<AttendanceRecord>> {
        let row: Option<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT employee_id, work_date, check_in, check_out
            FROM attendance
            WHERE employee_id = ?1 AND work_date = ?2
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    pub async fn insert_check_in(
        &self,
        conn: &mut SqliteConnection,
        employee_id: i64,
        date: NaiveDate,
        at: NaiveTime,
    ) -> DbResult<AttendanceRecord> {
        debug!(employee_id, %date, "Recording check-in");

        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, work_date, check_in)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(at)
        .execute(&mut *conn)
        .await?;

        Ok(AttendanceRecord {
            employee_id,
            date,
            check_in: Some(at),
            check_out: None,
        })
    }

    /// Sets the check-out time. Returns false when there is no record for
    /// that day.
    pub async fn set_check_out(
        &self,
        conn: &mut SqliteConnection,
        employee_id: i64,
        date: NaiveDate,
        at: NaiveTime,
    ) -> DbResult<bool> {
        debug!(employee_id, %date, "Recording check-out");

        let result = sqlx::query(
            "UPDATE attendance SET check_out = ?1 WHERE employee_id = ?2 AND work_date = ?3",
        )
        .bind(at)
        .bind(employee_id)
        .bind(date)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records newest day first, optionally for one employee.
    pub async fn list(
        &self,
        conn: &mut SqliteConnection,
        employee_id: Option<i64>,
    ) -> DbResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> = sqlx::query_as(
            r#"
            SELECT employee_id, work_date, check_in, check_out
            FROM attendance
            WHERE ?1 IS NULL OR employee_id = ?1
            ORDER BY work_date DESC, employee_id
            "#,
        )
        .bind(employee_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}
