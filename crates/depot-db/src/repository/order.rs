//! # Order Repository
//!
//! Orders and their lines.
//!
//! ## Snapshot Pattern
//! Each line copies the item's name and unit price at order time, so an
//! order reads the same no matter what later happens to the item.
//!
//! ```text
//! orders                      order_lines
//! ┌────┬──────────┬───────┐   ┌──────────┬─────────┬─────────┬─────┐
//! │ id │ customer │ total │◄──│ order_id │ line_no │ item_id │ qty │ ...
//! └────┴──────────┴───────┘   └──────────┴─────────┴─────────┴─────┘
//!                              ON DELETE CASCADE
//! ```

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::orders::OrderPlan;
use depot_core::{Money, Order, OrderLine, OrderStatus};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    customer: String,
    total_cents: i64,
    total_qty: i64,
    status: String,
    created_at: NaiveDateTime,
    fulfilled_at: Option<NaiveDateTime>,
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    order_id: i64,
    item_id: i64,
    name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            item_id: row.item_id,
            name: row.name,
            quantity: row.quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
            line_total: Money::from_cents(row.line_total_cents),
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> DbResult<Order> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DbError::corrupt("orders", e))?;

        Ok(Order {
            id: self.id,
            customer: self.customer,
            items,
            total: Money::from_cents(self.total_cents),
            total_qty: self.total_qty,
            status,
            created_at: self.created_at,
            fulfilled_at: self.fulfilled_at,
        })
    }
}

/// Repository for order operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    /// All orders in creation order, lines included.
    pub async fn list(&self, conn: &mut SqliteConnection) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, customer, total_cents, total_qty, status, created_at, fulfilled_at
            FROM orders
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let line_rows: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT order_id, item_id, name, quantity, unit_price_cents, line_total_cents
            FROM order_lines
            ORDER BY order_id, line_no
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            lines.entry(row.order_id).or_default().push(row.into());
        }

        debug!(count = rows.len(), "Loaded orders");
        rows.into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, customer, total_cents, total_qty, status, created_at, fulfilled_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.lines(conn, id).await?;
        row.into_order(items).map(Some)
    }

    async fn lines(&self, conn: &mut SqliteConnection, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT order_id, item_id, name, quantity, unit_price_cents, line_total_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    /// Persists a validated plan as a pending order with the next id.
    pub async fn insert_plan(
        &self,
        conn: &mut SqliteConnection,
        plan: &OrderPlan,
        created_at: NaiveDateTime,
    ) -> DbResult<Order> {
        debug!(customer = %plan.customer, lines = plan.lines.len(), "Inserting order");

        let id = sqlx::query(
            r#"
            INSERT INTO orders (customer, total_cents, total_qty, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&plan.customer)
        .bind(plan.total.cents())
        .bind(plan.total_qty)
        .bind(OrderStatus::Pending.as_str())
        .bind(created_at)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        for (line_no, line) in plan.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    order_id, line_no, item_id, name,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(id)
            .bind(line_no as i64)
            .bind(line.item_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_total.cents())
            .execute(&mut *conn)
            .await?;
        }

        Ok(plan.clone().into_order(id, created_at))
    }

    /// Sets the order Fulfilled. The first fulfilment time is kept on
    /// repeats. Returns false when no such order exists.
    pub async fn mark_fulfilled(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        at: NaiveDateTime,
    ) -> DbResult<bool> {
        debug!(id, "Fulfilling order");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1, fulfilled_at = COALESCE(fulfilled_at, ?2)
            WHERE id = ?3
            "#,
        )
        .bind(OrderStatus::Fulfilled.as_str())
        .bind(at)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes an order and its lines. Returns false when absent.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting order");

        sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use depot_core::orders::{plan_order, LineRequest};
    use depot_core::InventoryItem;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn plan(customer: &str) -> OrderPlan {
        let stock = vec![
            InventoryItem::new(1, "Pallet wrap", 20, Money::from_cents(1250), 5),
            InventoryItem::new(2, "Shrink film", 20, Money::from_cents(800), 5),
        ];
        plan_order(&stock, customer, &[LineRequest::new(1, 2), LineRequest::new(2, 3)]).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.orders();

        let order = repo.insert_plan(&mut conn, &plan("Acme"), noon()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.cents(), 4900);
        assert_eq!(order.total_qty, 5);

        let stored = repo.get(&mut conn, order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);

        let all = repo.list(&mut conn).await.unwrap();
        assert_eq!(all, vec![order]);
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.orders();

        let a = repo.insert_plan(&mut conn, &plan("Acme"), noon()).await.unwrap();
        let b = repo.insert_plan(&mut conn, &plan("Borealis"), noon()).await.unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[tokio::test]
    async fn test_fulfil_twice_keeps_first_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.orders();

        let order = repo.insert_plan(&mut conn, &plan("Acme"), noon()).await.unwrap();
        let first = noon() + chrono::Duration::hours(1);
        let second = noon() + chrono::Duration::hours(2);

        assert!(repo.mark_fulfilled(&mut conn, order.id, first).await.unwrap());
        assert!(repo.mark_fulfilled(&mut conn, order.id, second).await.unwrap());

        let stored = repo.get(&mut conn, order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Fulfilled);
        assert_eq!(stored.fulfilled_at, Some(first));

        assert!(!repo.mark_fulfilled(&mut conn, 999, first).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.orders();

        let order = repo.insert_plan(&mut conn, &plan("Acme"), noon()).await.unwrap();
        assert!(repo.delete(&mut conn, order.id).await.unwrap());
        assert!(repo.get(&mut conn, order.id).await.unwrap().is_none());
        assert!(!repo.delete(&mut conn, order.id).await.unwrap());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_unknown_status_is_corrupt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        // Bypass the CHECK constraint to simulate a damaged file.
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(&mut *conn)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO orders (customer, total_cents, total_qty, status, created_at) \
             VALUES ('Acme', 100, 1, 'Shipped', '2024-06-03 12:00:00')",
        )
        .execute(&mut *conn)
        .await
        .unwrap();

        let err = db.orders().list(&mut conn).await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRecord { .. }));
    }
}
