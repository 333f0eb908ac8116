//! # Order Planning
//!
//! The validate-all half of order creation. `plan_order` checks every
//! requested line against the ledger before anything is written; the
//! service layer commits the resulting plan in one transaction.
//!
//! ## Two-Phase Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Phase 1: plan_order (THIS MODULE, pure)                               │
//! │                                                                         │
//! │   customer empty / no lines ──────────────► EmptyOrder                 │
//! │                                                                         │
//! │   working copy of stock                                                 │
//! │   for each line:                                                        │
//! │       validate OUT against working copy ──► first error aborts         │
//! │       apply to working copy                                             │
//! │                                                                         │
//! │   ──► OrderPlan { lines, total, total_qty, stock_updates, warnings }   │
//! │                                                                         │
//! │  Phase 2: OrderService::create_order (depot-service)                   │
//! │                                                                         │
//! │   BEGIN ─► write stock_updates ─► movements ─► order ─► audit ─► COMMIT │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines naming the same item twice accumulate against the same working
//! quantity, so two lines of 3 against 5 on hand fail as a whole.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ledger::{check_item_movement, find_item, Direction, LowStockWarning};
use crate::money::Money;
use crate::types::{InventoryItem, Order, OrderLine, OrderStatus};

// =============================================================================
// Request & Plan Types
// =============================================================================

/// One requested line: how many units of which item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub item_id: i64,
    pub quantity: i64,
}

impl LineRequest {
    pub const fn new(item_id: i64, quantity: i64) -> Self {
        LineRequest { item_id, quantity }
    }
}

/// Final quantity of one item after the whole order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub item_id: i64,
    pub previous_qty: i64,
    pub new_qty: i64,
}

/// A fully validated order, ready to commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub customer: String,
    pub lines: Vec<OrderLine>,
    pub total: Money,
    pub total_qty: i64,
    /// One entry per distinct item, in first-seen order.
    pub stock_updates: Vec<StockUpdate>,
    /// Items the order leaves under their minimum.
    pub warnings: Vec<LowStockWarning>,
}

impl OrderPlan {
    /// Materializes the plan as a pending order.
    pub fn into_order(self, id: i64, created_at: NaiveDateTime) -> Order {
        Order {
            id,
            customer: self.customer,
            items: self.lines,
            total: self.total,
            total_qty: self.total_qty,
            status: OrderStatus::Pending,
            created_at,
            fulfilled_at: None,
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

/// Validates every line of a prospective order.
///
/// Returns the first failure untouched (`EmptyOrder`, `ItemNotFound`,
/// `InvalidQuantity`, `InsufficientStock`). `inventory` is never modified.
///
/// ```rust
/// use depot_core::orders::{plan_order, LineRequest};
/// use depot_core::{InventoryItem, Money};
///
/// let stock = vec![
///     InventoryItem::new(1, "Crate", 20, Money::from_cents(500), 5),
///     InventoryItem::new(2, "Pallet", 2, Money::from_cents(4000), 1),
/// ];
///
/// let plan = plan_order(&stock, "Acme", &[LineRequest::new(1, 4), LineRequest::new(2, 1)]).unwrap();
/// assert_eq!(plan.total.cents(), 6000);
/// assert_eq!(plan.total_qty, 5);
///
/// assert!(plan_order(&stock, "Acme", &[LineRequest::new(1, 4), LineRequest::new(2, 3)]).is_err());
/// ```
pub fn plan_order(
    inventory: &[InventoryItem],
    customer: &str,
    requests: &[LineRequest],
) -> CoreResult<OrderPlan> {
    let customer = customer.trim();
    if customer.is_empty() || requests.is_empty() {
        return Err(CoreError::EmptyOrder);
    }

    let mut working: HashMap<i64, i64> = HashMap::new();
    let mut stock_updates: Vec<StockUpdate> = Vec::new();
    let mut lines = Vec::with_capacity(requests.len());

    for request in requests {
        let item = find_item(inventory, request.item_id)?;
        let on_hand = working.get(&item.id).copied().unwrap_or(item.quantity);
        let check = check_item_movement(item, on_hand, request.quantity, Direction::Out)?;

        working.insert(item.id, check.new_qty);
        match stock_updates.iter_mut().find(|u| u.item_id == item.id) {
            Some(update) => update.new_qty = check.new_qty,
            None => stock_updates.push(StockUpdate {
                item_id: item.id,
                previous_qty: item.quantity,
                new_qty: check.new_qty,
            }),
        }

        lines.push(OrderLine {
            item_id: item.id,
            name: item.name.clone(),
            quantity: request.quantity,
            unit_price: item.price,
            line_total: item.price.multiply_quantity(request.quantity),
        });
    }

    let warnings = stock_updates
        .iter()
        .filter_map(|update| {
            let item = find_item(inventory, update.item_id).ok()?;
            (update.new_qty < item.min_stock).then(|| LowStockWarning {
                item_id: item.id,
                name: item.name.clone(),
                new_qty: update.new_qty,
                min_stock: item.min_stock,
            })
        })
        .collect();

    let total = lines.iter().map(|line| line.line_total).sum();
    let total_qty = lines.iter().map(|line| line.quantity).sum();

    Ok(OrderPlan {
        customer: customer.to_string(),
        lines,
        total,
        total_qty,
        stock_updates,
        warnings,
    })
}

// =============================================================================
// Lifecycle & Queries
// =============================================================================

/// Marks an order fulfilled. Repeating it keeps the first fulfilment time.
pub fn fulfill(order: &mut Order, at: NaiveDateTime) {
    if order.status == OrderStatus::Pending {
        order.fulfilled_at = Some(at);
    }
    order.status = OrderStatus::Fulfilled;
}

/// Case-insensitive match on customer name or order id.
pub fn search_orders(orders: &[Order], query: &str) -> Vec<Order> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return orders.to_vec();
    }

    orders
        .iter()
        .filter(|order| {
            order.customer.to_lowercase().contains(&needle) || order.id.to_string().contains(&needle)
        })
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stock() -> Vec<InventoryItem> {
        vec![
            InventoryItem::new(1, "Pallet wrap", 20, Money::from_cents(1250), 10),
            InventoryItem::new(2, "Shrink film", 4, Money::from_cents(800), 2),
        ]
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_plan_prices_lines_and_totals() {
        let plan = plan_order(&stock(), "  Acme  ", &[LineRequest::new(1, 3), LineRequest::new(2, 2)]).unwrap();

        assert_eq!(plan.customer, "Acme");
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].line_total.cents(), 3750);
        assert_eq!(plan.lines[1].line_total.cents(), 1600);
        assert_eq!(plan.total.cents(), 5350);
        assert_eq!(plan.total_qty, 5);
        assert_eq!(
            plan.stock_updates,
            vec![
                StockUpdate { item_id: 1, previous_qty: 20, new_qty: 17 },
                StockUpdate { item_id: 2, previous_qty: 4, new_qty: 2 },
            ]
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_second_line_failure_rejects_whole_order() {
        let inventory = stock();
        let before = inventory.clone();

        let err = plan_order(&inventory, "Acme", &[LineRequest::new(1, 3), LineRequest::new(2, 5)]).unwrap_err();

        assert!(matches!(err, CoreError::InsufficientStock { item_id: 2, available: 4, requested: 5, .. }));
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_repeated_item_accumulates() {
        let err = plan_order(&stock(), "Acme", &[LineRequest::new(2, 3), LineRequest::new(2, 3)]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 1, requested: 3, .. }));

        let plan = plan_order(&stock(), "Acme", &[LineRequest::new(2, 1), LineRequest::new(2, 2)]).unwrap();
        assert_eq!(plan.stock_updates, vec![StockUpdate { item_id: 2, previous_qty: 4, new_qty: 1 }]);
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_empty_customer_or_lines() {
        assert_eq!(plan_order(&stock(), "   ", &[LineRequest::new(1, 1)]).unwrap_err(), CoreError::EmptyOrder);
        assert_eq!(plan_order(&stock(), "Acme", &[]).unwrap_err(), CoreError::EmptyOrder);
    }

    #[test]
    fn test_unknown_item_and_bad_quantity() {
        assert_eq!(
            plan_order(&stock(), "Acme", &[LineRequest::new(1, 1), LineRequest::new(42, 1)]).unwrap_err(),
            CoreError::ItemNotFound(42)
        );
        assert_eq!(
            plan_order(&stock(), "Acme", &[LineRequest::new(1, 0)]).unwrap_err(),
            CoreError::InvalidQuantity(0)
        );
    }

    #[test]
    fn test_low_stock_warning_is_advisory() {
        let plan = plan_order(&stock(), "Acme", &[LineRequest::new(1, 15)]).unwrap();
        assert_eq!(plan.stock_updates[0].new_qty, 5);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].item_id, 1);
    }

    #[test]
    fn test_into_order_and_fulfill() {
        let plan = plan_order(&stock(), "Acme", &[LineRequest::new(1, 1)]).unwrap();
        let mut order = plan.into_order(7, noon());
        assert_eq!(order.id, 7);
        assert!(order.is_pending());

        let later = noon() + chrono::Duration::hours(2);
        fulfill(&mut order, later);
        assert_eq!(order.status, OrderStatus::Fulfilled);
        assert_eq!(order.fulfilled_at, Some(later));

        fulfill(&mut order, later + chrono::Duration::hours(1));
        assert_eq!(order.status, OrderStatus::Fulfilled);
        assert_eq!(order.fulfilled_at, Some(later));
    }

    #[test]
    fn test_search_orders() {
        let plan = plan_order(&stock(), "Acme Logistics", &[LineRequest::new(1, 1)]).unwrap();
        let orders = vec![plan.clone().into_order(1, noon()), {
            let mut other = plan.into_order(12, noon());
            other.customer = "Borealis".to_string();
            other
        }];

        assert_eq!(search_orders(&orders, "acme").len(), 1);
        assert_eq!(search_orders(&orders, "12")[0].customer, "Borealis");
        assert_eq!(search_orders(&orders, "").len(), 2);
    }
}
