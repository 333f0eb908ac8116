//! # Order Service
//!
//! Creation, fulfilment and deletion of customer orders.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_order(session, "Acme", [(3, 4), (7, 1)])                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Gate::check(Create)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN (writer lock held until COMMIT / ROLLBACK)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load inventory ──► plan_order ── any line fails ──► ROLLBACK, error   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT order + lines (next id)                                         │
//! │  UPDATE quantity per item                                               │
//! │  INSERT one OUT movement per line, tagged with the order id             │
//! │  INSERT audit entry                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  today's orders ──► peak_warning_at(now)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► OrderReceipt { order, low_stock, peak }                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Low-stock and peak-hour warnings are advisories. They are returned with
//! the receipt and never block the order.

use chrono::Timelike;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;
use depot_core::ledger::{Direction, LowStockWarning};
use depot_core::orders::{self, plan_order, LineRequest};
use depot_core::peak::{PeakHourPolicy, PeakWarning};
use depot_core::validation::validate_search_query;
use depot_core::{Action, AuditAction, AuditModule, CoreError, Order};
use depot_db::NewAuditEntry;

/// A committed order plus the advisories it raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order: Order,
    pub low_stock: Vec<LowStockWarning>,
    pub peak: Option<PeakWarning>,
}

/// Throughput of the current hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakStatus {
    pub hour: u32,
    pub is_peak_hour: bool,
    pub capacity: i64,
    /// Units ordered today.
    pub units_today: i64,
    pub warning: Option<PeakWarning>,
}

pub struct OrderService {
    ctx: AppContext,
    policy: PeakHourPolicy,
}

impl OrderService {
    pub fn new(ctx: AppContext) -> Self {
        OrderService {
            ctx,
            policy: PeakHourPolicy::default(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Validates every line, then commits the order and all stock changes
    /// atomically. On any error nothing is written.
    pub async fn create_order(
        &self,
        session: &Session,
        customer: &str,
        lines: &[LineRequest],
    ) -> ApiResult<OrderReceipt> {
        Gate::check(session, Action::Create)?;
        debug!(customer = %customer, lines = lines.len(), "Creating order");

        let db = self.ctx.db();
        let now = self.ctx.now();
        let mut tx = db.begin_write().await?;

        let inventory = db.inventory().list(&mut tx).await?;
        let plan = plan_order(&inventory, customer, lines)?;

        let order = db.orders().insert_plan(&mut tx, &plan, now).await?;

        for update in &plan.stock_updates {
            db.inventory()
                .set_quantity(&mut tx, update.item_id, update.new_qty, now.date())
                .await?;
        }

        for line in &order.items {
            db.movements()
                .record(
                    &mut tx,
                    line.item_id,
                    Direction::Out,
                    line.quantity,
                    Some(order.id),
                    "order",
                    now,
                )
                .await?;
        }

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Orders,
                    order.id,
                    session.username.as_str(),
                    format!(
                        "Order for {}: {} units, total {}",
                        order.customer, order.total_qty, order.total
                    ),
                ),
                now,
            )
            .await?;

        let orders = db.orders().list(&mut tx).await?;
        let peak = self.policy.peak_warning_at(&orders, now);

        tx.commit().await?;

        info!(
            order_id = order.id,
            customer = %order.customer,
            total = %order.total,
            units = order.total_qty,
            "Order created"
        );
        self.report(&plan.warnings, peak.as_ref());

        Ok(OrderReceipt {
            order,
            low_stock: plan.warnings,
            peak,
        })
    }

    /// Marks an order fulfilled. Fulfilling twice keeps the first time.
    pub async fn fulfill_order(&self, session: &Session, order_id: i64) -> ApiResult<Order> {
        Gate::check(session, Action::Update)?;

        let db = self.ctx.db();
        let now = self.ctx.now();
        let mut tx = db.begin_write().await?;

        if !db.orders().mark_fulfilled(&mut tx, order_id, now).await? {
            return Err(CoreError::OrderNotFound(order_id).into());
        }

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Update,
                    AuditModule::Orders,
                    order_id,
                    session.username.as_str(),
                    "Marked fulfilled",
                ),
                now,
            )
            .await?;

        let order = db
            .orders()
            .get(&mut tx, order_id)
            .await?
            .ok_or(CoreError::OrderNotFound(order_id))?;

        tx.commit().await?;

        info!(order_id, "Order fulfilled");
        Ok(order)
    }

    /// Removes an order in any state. Stock is not returned.
    pub async fn delete_order(&self, session: &Session, order_id: i64) -> ApiResult<()> {
        Gate::check(session, Action::Delete)?;

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        if !db.orders().delete(&mut tx, order_id).await? {
            return Err(CoreError::OrderNotFound(order_id).into());
        }

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Delete,
                    AuditModule::Orders,
                    order_id,
                    session.username.as_str(),
                    "Order deleted",
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        info!(order_id, "Order deleted");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All orders in creation order.
    pub async fn list_orders(&self, session: &Session) -> ApiResult<Vec<Order>> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().orders().list(&mut conn).await?)
    }

    pub async fn get_order(&self, session: &Session, order_id: i64) -> ApiResult<Order> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        let order = self
            .ctx
            .db()
            .orders()
            .get(&mut conn, order_id)
            .await?
            .ok_or(CoreError::OrderNotFound(order_id))?;
        Ok(order)
    }

    /// Case-insensitive match on customer or order id.
    pub async fn search_orders(&self, session: &Session, query: &str) -> ApiResult<Vec<Order>> {
        let query = validate_search_query(query)?;
        let all = self.list_orders(session).await?;
        Ok(orders::search_orders(&all, &query))
    }

    pub async fn peak_status(&self, session: &Session) -> ApiResult<PeakStatus> {
        let all = self.list_orders(session).await?;
        let now = self.ctx.now();
        let hour = now.hour();

        Ok(PeakStatus {
            hour,
            is_peak_hour: self.policy.is_peak_hour_at(hour),
            capacity: self.policy.capacity_at(hour),
            units_today: self.policy.units_ordered_on(&all, now),
            warning: self.policy.peak_warning_at(&all, now),
        })
    }

    fn report(&self, low_stock: &[LowStockWarning], peak: Option<&PeakWarning>) {
        let config = self.ctx.config();

        for warning in low_stock {
            if config.low_stock_alerts() {
                warn!(item_id = warning.item_id, "{}", warning);
            } else {
                debug!(item_id = warning.item_id, "{}", warning);
            }
        }

        if let Some(peak) = peak {
            if config.peak_hour_alerts() {
                warn!(hour = peak.hour, "{}", peak);
            } else {
                debug!(hour = peak.hour, "{}", peak);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{at, context, context_at, login};
    use crate::AppContext;
    use depot_core::{InventoryItem, Money, OrderStatus, Role};

    async fn stock(ctx: &AppContext, items: &[(&str, i64, i64, i64)]) -> Vec<InventoryItem> {
        let admin = login(ctx, Role::Admin).await;
        let mut added = Vec::new();
        for (name, qty, cents, min) in items {
            added.push(
                ctx.inventory()
                    .add_item(&admin, name, *qty, Money::from_cents(*cents), *min)
                    .await
                    .unwrap(),
            );
        }
        added
    }

    #[tokio::test]
    async fn test_create_order_deducts_stock() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 20, 500, 5), ("Pallet", 2, 4000, 1)]).await;
        let manager = login(&ctx, Role::Manager).await;

        let receipt = ctx
            .orders()
            .create_order(
                &manager,
                "Acme",
                &[LineRequest::new(items[0].id, 4), LineRequest::new(items[1].id, 1)],
            )
            .await
            .unwrap();

        assert_eq!(receipt.order.id, 1);
        assert_eq!(receipt.order.status, OrderStatus::Pending);
        assert_eq!(receipt.order.total, Money::from_cents(6000));
        assert_eq!(receipt.order.total_qty, 5);
        assert!(receipt.low_stock.is_empty());
        assert!(receipt.peak.is_none());

        let after = ctx.inventory().list_items(&manager).await.unwrap();
        assert_eq!(after[0].quantity, 16);
        assert_eq!(after[1].quantity, 1);

        let stored = ctx.orders().get_order(&manager, receipt.order.id).await.unwrap();
        assert_eq!(stored, receipt.order);
    }

    #[tokio::test]
    async fn test_failed_line_rolls_back_everything() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 20, 500, 5), ("Film", 5, 300, 1)]).await;
        let manager = login(&ctx, Role::Manager).await;

        let err = ctx
            .orders()
            .create_order(
                &manager,
                "Acme",
                &[LineRequest::new(items[0].id, 4), LineRequest::new(items[1].id, 8)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let after = ctx.inventory().list_items(&manager).await.unwrap();
        assert_eq!(after, items);
        assert!(ctx.orders().list_orders(&manager).await.unwrap().is_empty());
        assert!(ctx
            .inventory()
            .movement_history(&manager, items[0].id)
            .await
            .unwrap()
            .is_empty());

        // The store is still usable and ids did not skip.
        let receipt = ctx
            .orders()
            .create_order(&manager, "Acme", &[LineRequest::new(items[1].id, 5)])
            .await
            .unwrap();
        assert_eq!(receipt.order.id, 1);
        assert_eq!(receipt.low_stock.len(), 1);
        assert_eq!(receipt.low_stock[0].new_qty, 0);
    }

    #[tokio::test]
    async fn test_order_movements_sum_to_ordered_units() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 100, 500, 5), ("Tape", 100, 150, 5)]).await;
        let manager = login(&ctx, Role::Manager).await;
        let orders = ctx.orders();

        let batches: [&[(usize, i64)]; 3] = [
            &[(0, 3), (1, 2)],
            &[(0, 7), (0, 1)],
            &[(1, 10)],
        ];
        for batch in batches {
            let lines: Vec<_> = batch
                .iter()
                .map(|(idx, qty)| LineRequest::new(items[*idx].id, *qty))
                .collect();
            orders.create_order(&manager, "Acme", &lines).await.unwrap();
        }
        ctx.inventory().restock(&manager, items[0].id, 30).await.unwrap();

        let all = orders.list_orders(&manager).await.unwrap();
        let mut conn = ctx.db().acquire().await.unwrap();
        for item in &items {
            let ordered: i64 = all
                .iter()
                .flat_map(|o| o.items.iter())
                .filter(|line| line.item_id == item.id)
                .map(|line| line.quantity)
                .sum();
            let booked = ctx
                .db()
                .movements()
                .total_out_for_orders(&mut conn, item.id)
                .await
                .unwrap();
            assert_eq!(ordered, booked);
        }
        drop(conn);

        let after = ctx.inventory().list_items(&manager).await.unwrap();
        assert_eq!(after[0].quantity, 100 - 11 + 30);
        assert_eq!(after[1].quantity, 100 - 12);
    }

    #[tokio::test]
    async fn test_peak_warning_at_three_pm() {
        let ctx = context_at(at(15, 10)).await;
        let items = stock(&ctx, &[("Crate", 500, 100, 5)]).await;
        let manager = login(&ctx, Role::Manager).await;
        let orders = ctx.orders();

        let receipt = orders
            .create_order(&manager, "Acme", &[LineRequest::new(items[0].id, 40)])
            .await
            .unwrap();
        assert!(receipt.peak.is_none());

        let receipt = orders
            .create_order(&manager, "Beta", &[LineRequest::new(items[0].id, 25)])
            .await
            .unwrap();
        let peak = receipt.peak.unwrap();
        assert_eq!(peak.capacity, 75);
        assert_eq!(peak.used, 65);
        assert_eq!(peak.percent, 86);
        assert!(peak.to_string().contains("65/75"));

        let status = orders.peak_status(&manager).await.unwrap();
        assert!(status.is_peak_hour);
        assert_eq!(status.units_today, 65);
        assert!(status.warning.is_some());
    }

    #[tokio::test]
    async fn test_no_peak_warning_off_peak() {
        let ctx = context_at(at(10, 0)).await;
        let items = stock(&ctx, &[("Crate", 500, 100, 5)]).await;
        let manager = login(&ctx, Role::Manager).await;

        let receipt = ctx
            .orders()
            .create_order(&manager, "Acme", &[LineRequest::new(items[0].id, 200)])
            .await
            .unwrap();
        assert!(receipt.peak.is_none());

        let status = ctx.orders().peak_status(&manager).await.unwrap();
        assert!(!status.is_peak_hour);
        assert_eq!(status.capacity, 30);
    }

    #[tokio::test]
    async fn test_fulfill_and_delete() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 20, 500, 5)]).await;
        let manager = login(&ctx, Role::Manager).await;
        let admin = login(&ctx, Role::Admin).await;
        let orders = ctx.orders();

        let receipt = orders
            .create_order(&manager, "Acme", &[LineRequest::new(items[0].id, 4)])
            .await
            .unwrap();
        let id = receipt.order.id;

        let first = orders.fulfill_order(&manager, id).await.unwrap();
        assert_eq!(first.status, OrderStatus::Fulfilled);
        let again = orders.fulfill_order(&manager, id).await.unwrap();
        assert_eq!(again.fulfilled_at, first.fulfilled_at);

        let err = orders.fulfill_order(&manager, 99).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = orders.delete_order(&manager, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        orders.delete_order(&admin, id).await.unwrap();
        assert!(orders.list_orders(&admin).await.unwrap().is_empty());

        // No restock on delete.
        let after = ctx.inventory().list_items(&admin).await.unwrap();
        assert_eq!(after[0].quantity, 16);

        let err = orders.delete_order(&admin, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_worker_cannot_order() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 20, 500, 5)]).await;
        let worker = login(&ctx, Role::Worker).await;

        let err = ctx
            .orders()
            .create_order(&worker, "Acme", &[LineRequest::new(items[0].id, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(ctx.orders().list_orders(&worker).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_and_search() {
        let ctx = context().await;
        let items = stock(&ctx, &[("Crate", 20, 500, 5)]).await;
        let manager = login(&ctx, Role::Manager).await;
        let orders = ctx.orders();

        let err = orders.create_order(&manager, "Acme", &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        let err = orders
            .create_order(&manager, "  ", &[LineRequest::new(items[0].id, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        orders
            .create_order(&manager, "Acme Corp", &[LineRequest::new(items[0].id, 1)])
            .await
            .unwrap();
        orders
            .create_order(&manager, "Beta Ltd", &[LineRequest::new(items[0].id, 1)])
            .await
            .unwrap();

        let found = orders.search_orders(&manager, "acme").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].customer, "Acme Corp");
        assert_eq!(orders.search_orders(&manager, "").await.unwrap().len(), 2);
    }
}
