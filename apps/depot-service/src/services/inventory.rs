//! # Inventory Service
//!
//! Stock listing, new items, restocks and manual corrections.
//!
//! ## Movement Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation      Movement row                  Audit                     │
//! │  ─────────      ────────────                  ─────                     │
//! │  add_item       none (opening quantity)       CREATE inventory <id>     │
//! │  restock        IN  qty        "restock"      UPDATE inventory <id>     │
//! │  adjust_item    IN/OUT |delta| "adjustment"   UPDATE inventory <id>     │
//! │                 (nothing when delta = 0)                                │
//! │  create_order   OUT qty per line, order id    CREATE orders <id>        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! So for every item, at any point:
//! `opening + Σ IN − Σ OUT = current quantity`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;
use depot_core::ledger::{self, validate_movement, Direction, InventoryMetrics, LowStockWarning, StockStatus};
use depot_core::validation::{validate_adjustment, validate_inventory_item, validate_name, validate_search_query};
use depot_core::{
    Action, AuditAction, AuditModule, CoreError, InventoryItem, Money, StockMovement,
};
use depot_db::NewAuditEntry;

/// Item state after a restock or correction, with the low-stock advisory
/// if the new quantity is under the minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub item: InventoryItem,
    pub warning: Option<LowStockWarning>,
}

pub struct InventoryService {
    ctx: AppContext,
}

impl InventoryService {
    pub fn new(ctx: AppContext) -> Self {
        InventoryService { ctx }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_items(&self, session: &Session) -> ApiResult<Vec<InventoryItem>> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().inventory().list(&mut conn).await?)
    }

    /// Case-insensitive match on name or id. An empty query lists everything.
    pub async fn search_items(&self, session: &Session, query: &str) -> ApiResult<Vec<InventoryItem>> {
        let query = validate_search_query(query)?;
        let items = self.list_items(session).await?;
        Ok(ledger::search_items(&items, &query))
    }

    pub async fn items_by_status(
        &self,
        session: &Session,
        status: StockStatus,
    ) -> ApiResult<Vec<InventoryItem>> {
        let items = self.list_items(session).await?;
        Ok(ledger::filter_by_status(&items, status))
    }

    /// Items priced within `min..=max`.
    pub async fn items_by_price(
        &self,
        session: &Session,
        min: Money,
        max: Money,
    ) -> ApiResult<Vec<InventoryItem>> {
        let items = self.list_items(session).await?;
        Ok(ledger::filter_by_price(&items, min, max))
    }

    pub async fn metrics(&self, session: &Session) -> ApiResult<InventoryMetrics> {
        let items = self.list_items(session).await?;
        Ok(ledger::inventory_metrics(&items))
    }

    /// Committed movements of one item, oldest first.
    pub async fn movement_history(
        &self,
        session: &Session,
        item_id: i64,
    ) -> ApiResult<Vec<StockMovement>> {
        Gate::check(session, Action::Read)?;

        let db = self.ctx.db();
        let mut conn = db.acquire().await?;

        if db.inventory().get(&mut conn, item_id).await?.is_none() {
            return Err(CoreError::ItemNotFound(item_id).into());
        }
        Ok(db.movements().for_item(&mut conn, item_id).await?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a new stock item with the next sequential id.
    pub async fn add_item(
        &self,
        session: &Session,
        name: &str,
        quantity: i64,
        price: Money,
        min_stock: i64,
    ) -> ApiResult<InventoryItem> {
        Gate::check(session, Action::Create)?;

        validate_inventory_item(name, quantity, price, min_stock)?;
        let name = validate_name("name", name)?;

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let item = db
            .inventory()
            .insert(&mut tx, &name, quantity, price, min_stock, self.ctx.today())
            .await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Inventory,
                    item.id,
                    session.username.as_str(),
                    format!("Added {} ({} units @ {})", item.name, item.quantity, item.price),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        info!(id = item.id, name = %item.name, quantity, "Inventory item added");
        Ok(item)
    }

    /// Receives `qty` units of an existing item.
    pub async fn restock(&self, session: &Session, item_id: i64, qty: i64) -> ApiResult<StockChange> {
        Gate::check(session, Action::Update)?;

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let mut item = db
            .inventory()
            .get(&mut tx, item_id)
            .await?
            .ok_or(CoreError::ItemNotFound(item_id))?;

        let check = validate_movement(std::slice::from_ref(&item), item_id, qty, Direction::In)?;
        let today = self.ctx.today();

        db.inventory()
            .set_quantity(&mut tx, item_id, check.new_qty, today)
            .await?;
        db.movements()
            .record(&mut tx, item_id, Direction::In, qty, None, "restock", self.ctx.now())
            .await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Update,
                    AuditModule::Inventory,
                    item_id,
                    session.username.as_str(),
                    format!("Restocked {} by {} ({} -> {})", item.name, qty, check.previous_qty, check.new_qty),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        item.quantity = check.new_qty;
        item.updated_date = Some(today);
        info!(id = item_id, qty, new_qty = item.quantity, "Item restocked");

        let warning = self.low_stock(&item);
        Ok(StockChange { item, warning })
    }

    /// Absolute correction of quantity and price.
    ///
    /// The difference to the stored quantity is booked as one movement so
    /// the movement history still adds up.
    pub async fn adjust_item(
        &self,
        session: &Session,
        item_id: i64,
        quantity: i64,
        price: Money,
    ) -> ApiResult<StockChange> {
        Gate::check(session, Action::Update)?;

        validate_adjustment(quantity, price)?;

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let mut item = db
            .inventory()
            .get(&mut tx, item_id)
            .await?
            .ok_or(CoreError::ItemNotFound(item_id))?;

        let today = self.ctx.today();
        let delta = quantity - item.quantity;

        db.inventory()
            .update_stock(&mut tx, item_id, quantity, price, today)
            .await?;

        if delta != 0 {
            let direction = if delta > 0 { Direction::In } else { Direction::Out };
            db.movements()
                .record(&mut tx, item_id, direction, delta.abs(), None, "adjustment", self.ctx.now())
                .await?;
        }

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Update,
                    AuditModule::Inventory,
                    item_id,
                    session.username.as_str(),
                    format!(
                        "Adjusted {}: qty {} -> {}, price {} -> {}",
                        item.name, item.quantity, quantity, item.price, price
                    ),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        debug!(id = item_id, delta, "Stock corrected");
        item.quantity = quantity;
        item.price = price;
        item.updated_date = Some(today);

        let warning = self.low_stock(&item);
        Ok(StockChange { item, warning })
    }

    fn low_stock(&self, item: &InventoryItem) -> Option<LowStockWarning> {
        let warning = item.is_low_stock().then(|| LowStockWarning {
            item_id: item.id,
            name: item.name.clone(),
            new_qty: item.quantity,
            min_stock: item.min_stock,
        })?;

        if self.ctx.config().low_stock_alerts() {
            warn!(item_id = item.id, "{}", warning);
        } else {
            debug!(item_id = item.id, "{}", warning);
        }
        Some(warning)
    }
}
