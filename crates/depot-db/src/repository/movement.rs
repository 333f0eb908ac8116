//! # Movement Repository
//!
//! Append-only record of every committed quantity change.
//!
//! A row is written in the same transaction as the quantity it explains,
//! so for any item:
//!
//! ```text
//! added_qty + Σ IN − Σ OUT = current quantity
//! Σ OUT where order_id IS NOT NULL = Σ order line quantities for the item
//! ```

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::ledger::Direction;
use depot_core::StockMovement;

#[derive(Debug, FromRow)]
struct MovementRow {
    id: i64,
    item_id: i64,
    direction: String,
    quantity: i64,
    order_id: Option<i64>,
    reason: String,
    created_at: NaiveDateTime,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = DbError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let direction = row
            .direction
            .parse::<Direction>()
            .map_err(|e| DbError::corrupt("stock_movements", e))?;

        Ok(StockMovement {
            id: row.id,
            item_id: row.item_id,
            direction,
            quantity: row.quantity,
            order_id: row.order_id,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

/// Repository for stock movements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementRepository;

impl MovementRepository {
    /// Appends one movement and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        conn: &mut SqliteConnection,
        item_id: i64,
        direction: Direction,
        quantity: i64,
        order_id: Option<i64>,
        reason: &str,
        at: NaiveDateTime,
    ) -> DbResult<i64> {
        debug!(item_id, direction = %direction, quantity, ?order_id, "Recording stock movement");

        let id = sqlx::query(
            r#"
            INSERT INTO stock_movements (item_id, direction, quantity, order_id, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(item_id)
        .bind(direction.as_str())
        .bind(quantity)
        .bind(order_id)
        .bind(reason)
        .bind(at)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// History of one item, oldest first.
    pub async fn for_item(
        &self,
        conn: &mut SqliteConnection,
        item_id: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, item_id, direction, quantity, order_id, reason, created_at
            FROM stock_movements
            WHERE item_id = ?1
            ORDER BY id
            "#,
        )
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(StockMovement::try_from).collect()
    }

    /// Units removed from an item by orders.
    pub async fn total_out_for_orders(
        &self,
        conn: &mut SqliteConnection,
        item_id: i64,
    ) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM stock_movements
            WHERE item_id = ?1 AND direction = 'OUT' AND order_id IS NOT NULL
            "#,
        )
        .bind(item_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(total)
    }
}
