//! # Warehouse Repository
//!
//! Storage locations. A fresh database holds one "Main Warehouse".

use sqlx::sqlite::SqliteConnection;
use sqlx::FromRow;
use tracing::debug;

use crate::error::DbResult;
use depot_core::Warehouse;

/// Fields for a new location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    pub address: String,
    pub phone: String,
    pub capacity: i64,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: i64,
    name: String,
    location: String,
    address: String,
    phone: String,
    capacity: i64,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.id,
            name: row.name,
            location: row.location,
            address: row.address,
            phone: row.phone,
            capacity: row.capacity,
        }
    }
}

/// Repository for warehouse locations.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarehouseRepository;

impl WarehouseRepository {
    pub async fn list(&self, conn: &mut SqliteConnection) -> DbResult<Vec<Warehouse>> {
        let rows: Vec<WarehouseRow> = sqlx::query_as(
            "SELECT id, name, location, address, phone, capacity FROM warehouses ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Warehouse::from).collect())
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        warehouse: &NewWarehouse,
    ) -> DbResult<Warehouse> {
        debug!(name = %warehouse.name, capacity = warehouse.capacity, "Inserting warehouse");

        let id = sqlx::query(
            r#"
            INSERT INTO warehouses (name, location, address, phone, capacity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(&warehouse.address)
        .bind(&warehouse.phone)
        .bind(warehouse.capacity)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(Warehouse {
            id,
            name: warehouse.name.clone(),
            location: warehouse.location.clone(),
            address: warehouse.address.clone(),
            phone: warehouse.phone.clone(),
            capacity: warehouse.capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_main_warehouse_seeded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();

        let warehouses = db.warehouses().list(&mut conn).await.unwrap();
        assert_eq!(warehouses.len(), 1);
        assert_eq!(warehouses[0].name, "Main Warehouse");
        assert_eq!(warehouses[0].capacity, 10_000);
    }

    #[tokio::test]
    async fn test_insert() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let repo = db.warehouses();

        let added = repo
            .insert(
                &mut conn,
                &NewWarehouse {
                    name: "North Annex".to_string(),
                    location: "Nashik".to_string(),
                    address: "Plot 7, MIDC".to_string(),
                    phone: "0253-000000".to_string(),
                    capacity: 5_000,
                },
            )
            .await
            .unwrap();

        let all = repo.list(&mut conn).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], added);
    }
}
