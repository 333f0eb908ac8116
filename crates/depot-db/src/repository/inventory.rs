//! # Inventory Repository
//!
//! Database operations for stock items.
//!
//! Quantities are only ever written as absolute values computed by the
//! ledger; this repository does no arithmetic on them.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{DbError, DbResult};
use depot_core::{InventoryItem, Money, ValidationError};

#[derive(Debug, FromRow)]
struct InventoryRow {
    id: i64,
    name: String,
    quantity: i64,
    price_cents: i64,
    min_stock: i64,
    added_date: NaiveDate,
    updated_date: Option<NaiveDate>,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = DbError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        if row.quantity < 0 {
            return Err(DbError::corrupt("inventory_items", ValidationError::negative("quantity")));
        }

        Ok(InventoryItem {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
            price: Money::from_cents(row.price_cents),
            min_stock: row.min_stock,
            added_date: row.added_date,
            updated_date: row.updated_date,
        })
    }
}

const SELECT_ITEMS: &str = r#"
    SELECT id, name, quantity, price_cents, min_stock, added_date, updated_date
    FROM inventory_items
"#;

/// Repository for inventory item operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    /// All items in id order.
    pub async fn list(&self, conn: &mut SqliteConnection) -> DbResult<Vec<InventoryItem>> {
        let rows: Vec<InventoryRow> = sqlx::query_as(&format!("{SELECT_ITEMS} ORDER BY id"))
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = rows.len(), "Loaded inventory");
        rows.into_iter().map(InventoryItem::try_from).collect()
    }

    pub async fn get(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<Option<InventoryItem>> {
        let row: Option<InventoryRow> = sqlx::query_as(&format!("{SELECT_ITEMS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(InventoryItem::try_from).transpose()
    }

    /// Inserts a new item and returns it with its assigned id.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
        quantity: i64,
        price: Money,
        min_stock: i64,
        added_date: NaiveDate,
    ) -> DbResult<InventoryItem> {
        debug!(name = %name, quantity, "Inserting inventory item");

        let id = sqlx::query(
            r#"
            INSERT INTO inventory_items (name, quantity, price_cents, min_stock, added_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(name)
        .bind(quantity)
        .bind(price.cents())
        .bind(min_stock)
        .bind(added_date)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(InventoryItem {
            id,
            name: name.to_string(),
            quantity,
            price,
            min_stock,
            added_date,
            updated_date: None,
        })
    }

    /// Writes a new absolute quantity.
    pub async fn set_quantity(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
        on: NaiveDate,
    ) -> DbResult<()> {
        debug!(id, quantity, "Setting item quantity");

        let result = sqlx::query(
            "UPDATE inventory_items SET quantity = ?1, updated_date = ?2 WHERE id = ?3",
        )
        .bind(quantity)
        .bind(on)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory item", id.to_string()));
        }
        Ok(())
    }

    /// Stock correction: quantity and price in one statement.
    pub async fn update_stock(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        quantity: i64,
        price: Money,
        on: NaiveDate,
    ) -> DbResult<()> {
        debug!(id, quantity, price = %price, "Adjusting item");

        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = ?1, price_cents = ?2, updated_date = ?3
            WHERE id = ?4
            "#,
        )
        .bind(quantity)
        .bind(price.cents())
        .bind(on)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Inventory item", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.inventory();

        let first = repo
            .insert(&mut conn, "Pallet wrap", 5, Money::from_cents(1250), 10, day())
            .await
            .unwrap();
        let second = repo
            .insert(&mut conn, "Shrink film", 40, Money::from_cents(800), 10, day())
            .await
            .unwrap();

        assert_eq!(second.id, first.id + 1);

        let items = repo.list(&mut conn).await.unwrap();
        assert_eq!(items, vec![first, second]);
    }

    #[tokio::test]
    async fn test_set_quantity_and_update_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.inventory();

        let item = repo
            .insert(&mut conn, "Crate", 5, Money::from_cents(900), 2, day())
            .await
            .unwrap();

        repo.set_quantity(&mut conn, item.id, 12, day()).await.unwrap();
        let stored = repo.get(&mut conn, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 12);
        assert_eq!(stored.updated_date, Some(day()));

        repo.update_stock(&mut conn, item.id, 3, Money::from_cents(950), day())
            .await
            .unwrap();
        let stored = repo.get(&mut conn, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 3);
        assert_eq!(stored.price.cents(), 950);
    }

    #[tokio::test]
    async fn test_missing_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.inventory();

        assert!(repo.get(&mut conn, 404).await.unwrap().is_none());
        let err = repo.set_quantity(&mut conn, 404, 1, day()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.inventory();

        let item = repo
            .insert(&mut conn, "Crate", 5, Money::from_cents(900), 2, day())
            .await
            .unwrap();
        assert!(repo.set_quantity(&mut conn, item.id, -1, day()).await.is_err());
    }
}
