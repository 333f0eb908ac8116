//! # Inventory Ledger
//!
//! Stock movement validation plus the read-only stock reports built on the
//! same item list.
//!
//! ## Movement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_movement(inventory, item_id, qty, direction)                  │
//! │                                                                         │
//! │   item_id unknown? ───────────────────────► ItemNotFound               │
//! │   qty ≤ 0? ───────────────────────────────► InvalidQuantity            │
//! │                                                                         │
//! │   IN  ──► new_qty = quantity + qty ──────► Ok                          │
//! │                                                                         │
//! │   OUT ──► quantity < qty? ───────────────► InsufficientStock           │
//! │           new_qty = quantity − qty                                      │
//! │           new_qty < min_stock? ──────────► Ok + LowStockWarning        │
//! │           otherwise ─────────────────────► Ok                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here mutates the inventory. Callers apply `new_qty` to the
//! stored item themselves, inside their own transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::InventoryItem;

// =============================================================================
// Direction
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Restock.
    In,
    /// Sale or order fulfilment.
    Out,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            other => Err(ValidationError::InvalidFormat {
                field: "direction".to_string(),
                reason: format!("unknown value '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Movement Validation
// =============================================================================

/// Advisory raised when an outbound movement leaves an item under its
/// minimum. The movement itself still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockWarning {
    pub item_id: i64,
    pub name: String,
    pub new_qty: i64,
    pub min_stock: i64,
}

impl fmt::Display for LowStockWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Low stock alert: {} has {} units left (minimum {})",
            self.name, self.new_qty, self.min_stock
        )
    }
}

/// Outcome of a successful movement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementCheck {
    pub item_id: i64,
    pub previous_qty: i64,
    pub new_qty: i64,
    pub warning: Option<LowStockWarning>,
}

/// Checks a proposed movement against the current inventory.
///
/// ```rust
/// use depot_core::ledger::{validate_movement, Direction};
/// use depot_core::{CoreError, InventoryItem, Money};
///
/// let stock = vec![InventoryItem::new(1, "Crate", 5, Money::from_cents(900), 10)];
///
/// let restock = validate_movement(&stock, 1, 20, Direction::In).unwrap();
/// assert_eq!(restock.new_qty, 25);
///
/// let err = validate_movement(&stock, 1, 6, Direction::Out).unwrap_err();
/// assert!(matches!(err, CoreError::InsufficientStock { .. }));
/// ```
pub fn validate_movement(
    inventory: &[InventoryItem],
    item_id: i64,
    qty: i64,
    direction: Direction,
) -> CoreResult<MovementCheck> {
    let item = find_item(inventory, item_id)?;
    check_item_movement(item, item.quantity, qty, direction)
}

/// Same rules as [`validate_movement`], against an explicit quantity on
/// hand instead of the item's stored one. Order planning uses this to
/// validate against a working copy.
pub(crate) fn check_item_movement(
    item: &InventoryItem,
    on_hand: i64,
    qty: i64,
    direction: Direction,
) -> CoreResult<MovementCheck> {
    if qty <= 0 {
        return Err(CoreError::InvalidQuantity(qty));
    }

    match direction {
        Direction::In => Ok(MovementCheck {
            item_id: item.id,
            previous_qty: on_hand,
            new_qty: on_hand
                .checked_add(qty)
                .ok_or(CoreError::InvalidQuantity(qty))?,
            warning: None,
        }),
        Direction::Out => {
            if on_hand < qty {
                return Err(CoreError::InsufficientStock {
                    item_id: item.id,
                    name: item.name.clone(),
                    available: on_hand,
                    requested: qty,
                });
            }

            let new_qty = on_hand - qty;
            let warning = (new_qty < item.min_stock).then(|| LowStockWarning {
                item_id: item.id,
                name: item.name.clone(),
                new_qty,
                min_stock: item.min_stock,
            });

            Ok(MovementCheck {
                item_id: item.id,
                previous_qty: on_hand,
                new_qty,
                warning,
            })
        }
    }
}

/// Looks an item up by id.
pub fn find_item(inventory: &[InventoryItem], item_id: i64) -> CoreResult<&InventoryItem> {
    inventory
        .iter()
        .find(|item| item.id == item_id)
        .ok_or(CoreError::ItemNotFound(item_id))
}

// =============================================================================
// Stock Status
// =============================================================================

/// Stock band of an item relative to its minimum.
///
/// ```text
///   0 ───────── min ───────── 2·min ─────────►
///   │    Low     │   Medium    │    High
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Medium,
    High,
}

impl StockStatus {
    pub fn classify(item: &InventoryItem) -> Self {
        if item.quantity < item.min_stock {
            StockStatus::Low
        } else if item.quantity < item.min_stock * 2 {
            StockStatus::Medium
        } else {
            StockStatus::High
        }
    }
}

/// Items in the given stock band, in ledger order.
pub fn filter_by_status(items: &[InventoryItem], status: StockStatus) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| StockStatus::classify(item) == status)
        .cloned()
        .collect()
}

// =============================================================================
// Search & Filters
// =============================================================================

/// Case-insensitive match on name or id. An empty query matches everything.
pub fn search_items(items: &[InventoryItem], query: &str) -> Vec<InventoryItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&needle) || item.id.to_string().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Items priced within `min..=max`.
pub fn filter_by_price(items: &[InventoryItem], min: Money, max: Money) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| item.price >= min && item.price <= max)
        .cloned()
        .collect()
}

// =============================================================================
// Metrics
// =============================================================================

/// Headline numbers for the inventory dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub total_items: usize,
    pub total_value: Money,
    pub low_stock_count: usize,
    /// Mean stock value per item, 0 for an empty ledger.
    pub avg_stock_value: Money,
}

pub fn inventory_metrics(items: &[InventoryItem]) -> InventoryMetrics {
    let total_value: Money = items.iter().map(InventoryItem::stock_value).sum();
    let low_stock_count = items.iter().filter(|item| item.is_low_stock()).count();
    let avg_stock_value = if items.is_empty() {
        Money::zero()
    } else {
        Money::from_cents(total_value.cents() / items.len() as i64)
    };

    InventoryMetrics {
        total_items: items.len(),
        total_value,
        low_stock_count,
        avg_stock_value,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Vec<InventoryItem> {
        vec![
            InventoryItem::new(1, "Pallet wrap", 5, Money::from_cents(1250), 10),
            InventoryItem::new(2, "Shrink film", 40, Money::from_cents(800), 10),
            InventoryItem::new(3, "Box cutter", 15, Money::from_cents(300), 10),
        ]
    }

    #[test]
    fn test_out_below_minimum_warns_but_succeeds() {
        let check = validate_movement(&stock(), 1, 3, Direction::Out).unwrap();
        assert_eq!(check.previous_qty, 5);
        assert_eq!(check.new_qty, 2);
        let warning = check.warning.expect("low stock warning");
        assert_eq!(warning.new_qty, 2);
        assert_eq!(warning.min_stock, 10);
    }

    #[test]
    fn test_out_above_minimum_has_no_warning() {
        let check = validate_movement(&stock(), 2, 10, Direction::Out).unwrap();
        assert_eq!(check.new_qty, 30);
        assert!(check.warning.is_none());
    }

    #[test]
    fn test_out_entire_stock_reaches_zero() {
        let check = validate_movement(&stock(), 2, 40, Direction::Out).unwrap();
        assert_eq!(check.new_qty, 0);
    }

    #[test]
    fn test_out_more_than_available_fails() {
        let err = validate_movement(&stock(), 1, 6, Direction::Out).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                item_id: 1,
                name: "Pallet wrap".to_string(),
                available: 5,
                requested: 6,
            }
        );
    }

    #[test]
    fn test_in_always_adds() {
        for qty in [1, 7, 1_000] {
            let check = validate_movement(&stock(), 1, qty, Direction::In).unwrap();
            assert_eq!(check.new_qty, 5 + qty);
            assert!(check.warning.is_none());
        }
    }

    #[test]
    fn test_in_rejects_overflowing_quantity() {
        assert_eq!(
            validate_movement(&stock(), 1, i64::MAX, Direction::In).unwrap_err(),
            CoreError::InvalidQuantity(i64::MAX)
        );
    }

    #[test]
    fn test_unknown_item_and_bad_quantity() {
        assert_eq!(
            validate_movement(&stock(), 99, 1, Direction::In).unwrap_err(),
            CoreError::ItemNotFound(99)
        );
        assert_eq!(
            validate_movement(&stock(), 1, 0, Direction::Out).unwrap_err(),
            CoreError::InvalidQuantity(0)
        );
        assert_eq!(
            validate_movement(&stock(), 1, -2, Direction::In).unwrap_err(),
            CoreError::InvalidQuantity(-2)
        );
    }

    #[test]
    fn test_movement_is_pure() {
        let items = stock();
        let before = items.clone();
        let _ = validate_movement(&items, 1, 3, Direction::Out);
        assert_eq!(items, before);
    }

    #[test]
    fn test_stock_status_bands() {
        let items = stock();
        assert_eq!(StockStatus::classify(&items[0]), StockStatus::Low);
        assert_eq!(StockStatus::classify(&items[1]), StockStatus::High);
        assert_eq!(StockStatus::classify(&items[2]), StockStatus::Medium);

        let low = filter_by_status(&items, StockStatus::Low);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, 1);
    }

    #[test]
    fn test_search_and_price_filter() {
        let items = stock();
        assert_eq!(search_items(&items, "FILM").len(), 1);
        assert_eq!(search_items(&items, "3")[0].id, 3);
        assert_eq!(search_items(&items, "").len(), 3);

        let mid = filter_by_price(&items, Money::from_cents(500), Money::from_cents(1000));
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].id, 2);
    }

    #[test]
    fn test_inventory_metrics() {
        let metrics = inventory_metrics(&stock());
        assert_eq!(metrics.total_items, 3);
        // 5×12.50 + 40×8.00 + 15×3.00 = 62.50 + 320.00 + 45.00
        assert_eq!(metrics.total_value.cents(), 42_750);
        assert_eq!(metrics.low_stock_count, 1);
        assert_eq!(metrics.avg_stock_value.cents(), 14_250);

        let empty = inventory_metrics(&[]);
        assert_eq!(empty.avg_stock_value, Money::zero());
    }

    #[test]
    fn test_direction_text() {
        assert_eq!("OUT".parse::<Direction>().unwrap(), Direction::Out);
        assert_eq!(Direction::In.to_string(), "IN");
        assert!("SIDEWAYS".parse::<Direction>().is_err());
    }
}
