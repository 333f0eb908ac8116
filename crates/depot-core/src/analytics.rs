//! # Analytics Engine
//!
//! Read-only reports derived from order history and current stock. Every
//! function is pure; the service layer loads the data and calls these.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders ──┬──► profit_margin        revenue, 40% cost model, margin     │
//! │           ├──► revenue_trend        per-day totals over N days          │
//! │           └──► order_frequency      top 10 items by order count         │
//! │                                                                         │
//! │  orders + items ──┬──► inventory_turnover   sold / avg on hand          │
//! │                   └──► low_stock_forecast   projected shortfalls        │
//! │                                                                         │
//! │  all of the above ──► dashboard_summary                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money stays in integer minor units; ratios, rates and forecasts are
//! `f64`. An infinite `days_to_sell` / `days_until_low` means "never at
//! the current rate" and serializes as `null`.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::{inventory_metrics, InventoryMetrics};
use crate::money::Money;
use crate::types::{InventoryItem, Order, OrderStatus};
use crate::FORECAST_ORDER_WINDOW;

/// Cost share of revenue in the profit model, in percent.
pub const COST_RATIO_PERCENT: i64 = 40;

/// Number of rows returned by [`order_frequency`].
pub const TOP_ITEMS: usize = 10;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// =============================================================================
// Profit
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub total_revenue: Money,
    pub estimated_cost: Money,
    pub profit: Money,
    /// profit / revenue × 100, two decimals. 0 without revenue.
    pub margin_percent: f64,
}

/// Revenue is the sum of order totals; cost is a fixed share of it.
pub fn profit_margin(orders: &[Order]) -> ProfitReport {
    let total_revenue: Money = orders.iter().map(|order| order.total).sum();
    let estimated_cost = Money::from_cents(total_revenue.cents() * COST_RATIO_PERCENT / 100);
    let profit = total_revenue - estimated_cost;

    let margin_percent = if total_revenue.is_positive() {
        round_to(profit.cents() as f64 / total_revenue.cents() as f64 * 100.0, 2)
    } else {
        0.0
    };

    ProfitReport {
        total_revenue,
        estimated_cost,
        profit,
        margin_percent,
    }
}

// =============================================================================
// Turnover
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverReport {
    /// Units across every line of every order.
    pub total_sold: i64,
    /// Mean quantity on hand per item.
    pub avg_inventory: f64,
    pub turnover_rate: f64,
    /// 365 / turnover_rate, infinite when nothing turns over.
    pub days_to_sell: f64,
}

pub fn inventory_turnover(orders: &[Order], items: &[InventoryItem]) -> TurnoverReport {
    let total_sold: i64 = orders
        .iter()
        .flat_map(|order| order.items.iter())
        .map(|line| line.quantity)
        .sum();

    let on_hand: i64 = items.iter().map(|item| item.quantity).sum();
    let avg_inventory = on_hand as f64 / items.len().max(1) as f64;

    let turnover_rate = if avg_inventory > 0.0 {
        total_sold as f64 / avg_inventory
    } else {
        0.0
    };

    let days_to_sell = if turnover_rate > 0.0 {
        round_to(365.0 / turnover_rate, 1)
    } else {
        f64::INFINITY
    };

    TurnoverReport {
        total_sold,
        avg_inventory: round_to(avg_inventory, 2),
        turnover_rate: round_to(turnover_rate, 2),
        days_to_sell,
    }
}

// =============================================================================
// Revenue Trend
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueTrend {
    pub period_days: i64,
    /// Only days with at least one order appear.
    pub daily_revenue: BTreeMap<NaiveDate, Money>,
    pub total_revenue: Money,
    /// Total divided by the number of days that had orders.
    pub avg_daily: Money,
}

/// Buckets order totals by creation day, keeping days on or after
/// `today - days`. A window reaching past the calendar keeps every order.
pub fn revenue_trend(orders: &[Order], days: i64, today: NaiveDate) -> RevenueTrend {
    let cutoff = Duration::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(NaiveDate::MIN);

    let mut daily_revenue: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for order in orders.iter().filter(|order| order.created_date() >= cutoff) {
        *daily_revenue.entry(order.created_date()).or_default() += order.total;
    }

    let total_revenue: Money = daily_revenue.values().sum();
    let bucket_count = daily_revenue.len().max(1) as i64;
    let avg_daily = Money::from_cents(total_revenue.cents() / bucket_count);

    RevenueTrend {
        period_days: days,
        daily_revenue,
        total_revenue,
        avg_daily,
    }
}

// =============================================================================
// Low-Stock Forecast
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub item_id: i64,
    pub item_name: String,
    pub current_qty: i64,
    pub daily_consumption: f64,
    pub projected_qty: f64,
    pub min_stock: i64,
    /// Days until the quantity reaches min_stock; infinite without demand.
    pub days_until_low: f64,
    /// Units that would bring the projection up to twice the minimum.
    pub reorder_qty: i64,
}

/// Items projected to fall under their minimum within `days_ahead` days.
///
/// Demand is read from the last 30 entries of `orders`, which must be in
/// creation order, and spread over 30 days. Rows are sorted by
/// `days_until_low`, soonest first.
pub fn low_stock_forecast(
    orders: &[Order],
    items: &[InventoryItem],
    days_ahead: i64,
) -> Vec<ForecastRow> {
    let window_start = orders.len().saturating_sub(FORECAST_ORDER_WINDOW);
    let window = &orders[window_start..];

    let mut sold: HashMap<i64, i64> = HashMap::new();
    for line in window.iter().flat_map(|order| order.items.iter()) {
        *sold.entry(line.item_id).or_default() += line.quantity;
    }

    let mut rows: Vec<ForecastRow> = items
        .iter()
        .filter_map(|item| {
            let units = sold.get(&item.id).copied().unwrap_or(0);
            let daily_consumption = units as f64 / FORECAST_ORDER_WINDOW as f64;
            let projected_qty = item.quantity as f64 - daily_consumption * days_ahead as f64;

            if projected_qty >= item.min_stock as f64 {
                return None;
            }

            let days_until_low = if daily_consumption > 0.0 {
                round_to((item.quantity - item.min_stock) as f64 / daily_consumption, 1)
            } else {
                f64::INFINITY
            };

            Some(ForecastRow {
                item_id: item.id,
                item_name: item.name.clone(),
                current_qty: item.quantity,
                daily_consumption: round_to(daily_consumption, 2),
                projected_qty: round_to(projected_qty, 2),
                min_stock: item.min_stock,
                days_until_low,
                reorder_qty: (item.min_stock as f64 * 2.0 - projected_qty).round() as i64,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.days_until_low.total_cmp(&b.days_until_low));
    rows
}

// =============================================================================
// Order Frequency
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFrequency {
    pub item_id: i64,
    pub item_name: String,
    /// Number of orders containing the item.
    pub order_frequency: usize,
}

/// The ten items that appear in the most orders. Ties go to the lower id.
pub fn order_frequency(orders: &[Order], items: &[InventoryItem]) -> Vec<ItemFrequency> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for order in orders {
        let distinct: HashSet<i64> = order.items.iter().map(|line| line.item_id).collect();
        for item_id in distinct {
            *counts.entry(item_id).or_default() += 1;
        }
    }

    let names: HashMap<i64, &str> = items.iter().map(|item| (item.id, item.name.as_str())).collect();

    let mut rows: Vec<ItemFrequency> = counts
        .into_iter()
        .map(|(item_id, order_frequency)| ItemFrequency {
            item_id,
            item_name: names.get(&item_id).copied().unwrap_or("Unknown").to_string(),
            order_frequency,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.order_frequency
            .cmp(&a.order_frequency)
            .then(a.item_id.cmp(&b.item_id))
    });
    rows.truncate(TOP_ITEMS);
    rows
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the dashboard page shows, in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub generated_on: NaiveDate,
    pub inventory: InventoryMetrics,
    pub pending_orders: usize,
    pub fulfilled_orders: usize,
    pub profit: ProfitReport,
    pub turnover: TurnoverReport,
    pub revenue_trend: RevenueTrend,
    pub forecast: Vec<ForecastRow>,
    pub top_items: Vec<ItemFrequency>,
}

pub fn dashboard_summary(
    orders: &[Order],
    items: &[InventoryItem],
    today: NaiveDate,
    trend_days: i64,
    forecast_days: i64,
) -> DashboardSummary {
    let pending_orders = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Pending)
        .count();

    DashboardSummary {
        generated_on: today,
        inventory: inventory_metrics(items),
        pending_orders,
        fulfilled_orders: orders.len() - pending_orders,
        profit: profit_margin(orders),
        turnover: inventory_turnover(orders, items),
        revenue_trend: revenue_trend(orders, trend_days, today),
        forecast: low_stock_forecast(orders, items, forecast_days),
        top_items: order_frequency(orders, items),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderLine;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn line(item_id: i64, quantity: i64, unit_cents: i64) -> OrderLine {
        OrderLine {
            item_id,
            name: format!("Item {item_id}"),
            quantity,
            unit_price: Money::from_cents(unit_cents),
            line_total: Money::from_cents(unit_cents * quantity),
        }
    }

    fn order(id: i64, on: NaiveDate, lines: Vec<OrderLine>) -> Order {
        let total = lines.iter().map(|l| l.line_total).sum();
        let total_qty = lines.iter().map(|l| l.quantity).sum();
        Order {
            id,
            customer: "Acme".to_string(),
            items: lines,
            total,
            total_qty,
            status: OrderStatus::Pending,
            created_at: on.and_hms_opt(10, 0, 0).unwrap(),
            fulfilled_at: None,
        }
    }

    #[test]
    fn test_profit_margin() {
        let orders = vec![
            order(1, day(1), vec![line(1, 2, 5_000)]),
            order(2, day(2), vec![line(2, 1, 10_000)]),
        ];
        let report = profit_margin(&orders);
        assert_eq!(report.total_revenue.cents(), 20_000);
        assert_eq!(report.estimated_cost.cents(), 8_000);
        assert_eq!(report.profit.cents(), 12_000);
        assert_eq!(report.margin_percent, 60.0);
    }

    #[test]
    fn test_profit_margin_without_revenue() {
        let report = profit_margin(&[]);
        assert_eq!(report.total_revenue, Money::zero());
        assert_eq!(report.margin_percent, 0.0);
    }

    #[test]
    fn test_inventory_turnover() {
        let orders = vec![order(1, day(1), vec![line(1, 30, 100), line(2, 20, 100)])];
        let items = vec![
            InventoryItem::new(1, "A", 10, Money::from_cents(100), 5),
            InventoryItem::new(2, "B", 30, Money::from_cents(100), 5),
        ];
        let report = inventory_turnover(&orders, &items);
        assert_eq!(report.total_sold, 50);
        assert_eq!(report.avg_inventory, 20.0);
        assert_eq!(report.turnover_rate, 2.5);
        assert_eq!(report.days_to_sell, 146.0);
    }

    #[test]
    fn test_turnover_with_empty_stock_is_zero() {
        let orders = vec![order(1, day(1), vec![line(1, 3, 100)])];
        let items = vec![InventoryItem::new(1, "A", 0, Money::from_cents(100), 5)];
        let report = inventory_turnover(&orders, &items);
        assert_eq!(report.turnover_rate, 0.0);
        assert!(report.days_to_sell.is_infinite());
        assert_eq!(serde_json::to_value(&report).unwrap()["days_to_sell"], serde_json::Value::Null);
    }

    #[test]
    fn test_revenue_trend_buckets_and_cutoff() {
        let orders = vec![
            order(1, day(1), vec![line(1, 1, 9_999)]),
            order(2, day(20), vec![line(1, 1, 1_000)]),
            order(3, day(20), vec![line(1, 2, 1_000)]),
            order(4, day(25), vec![line(1, 1, 2_000)]),
        ];
        let trend = revenue_trend(&orders, 10, day(28));

        assert_eq!(trend.period_days, 10);
        assert_eq!(trend.daily_revenue.len(), 2);
        assert_eq!(trend.daily_revenue[&day(20)].cents(), 3_000);
        assert_eq!(trend.daily_revenue[&day(25)].cents(), 2_000);
        assert_eq!(trend.total_revenue.cents(), 5_000);
        assert_eq!(trend.avg_daily.cents(), 2_500);
    }

    #[test]
    fn test_revenue_trend_empty() {
        let trend = revenue_trend(&[], 30, day(28));
        assert!(trend.daily_revenue.is_empty());
        assert_eq!(trend.avg_daily, Money::zero());
    }

    #[test]
    fn test_revenue_trend_huge_window_keeps_everything() {
        let orders = vec![order(1, day(1), vec![line(1, 1, 4_000)])];
        for days in [1_000_000_000, i64::MAX] {
            let trend = revenue_trend(&orders, days, day(3));
            assert_eq!(trend.period_days, days);
            assert_eq!(trend.total_revenue.cents(), 4_000);
        }
        assert!(revenue_trend(&[], 1_000_000_000, day(3)).daily_revenue.is_empty());
    }

    #[test]
    fn test_low_stock_forecast() {
        // 60 units of item 1 over the window → 2/day
        let orders = vec![
            order(1, day(1), vec![line(1, 30, 100)]),
            order(2, day(2), vec![line(1, 30, 100), line(2, 3, 100)]),
        ];
        let items = vec![
            InventoryItem::new(1, "Fast", 20, Money::from_cents(100), 10),
            InventoryItem::new(2, "Slow", 12, Money::from_cents(100), 10),
            InventoryItem::new(3, "Idle", 4, Money::from_cents(100), 10),
            InventoryItem::new(4, "Safe", 500, Money::from_cents(100), 10),
        ];

        let rows = low_stock_forecast(&orders, &items, 7);
        let ids: Vec<i64> = rows.iter().map(|r| r.item_id).collect();
        // Fast: 20 - 14 = 6 < 10, 5 days; Slow: 12 - 0.7 = 11.3 ≥ 10; Idle: never sold
        assert_eq!(ids, vec![1, 3]);

        let fast = &rows[0];
        assert_eq!(fast.daily_consumption, 2.0);
        assert_eq!(fast.projected_qty, 6.0);
        assert_eq!(fast.days_until_low, 5.0);
        assert_eq!(fast.reorder_qty, 14);

        assert!(rows[1].days_until_low.is_infinite());
        assert_eq!(rows[1].reorder_qty, 16);
    }

    #[test]
    fn test_forecast_only_reads_last_window() {
        let mut orders: Vec<Order> = (1..=30)
            .map(|id| order(id, day(1), vec![line(2, 1, 100)]))
            .collect();
        orders.insert(0, order(0, day(1), vec![line(1, 300, 100)]));

        let items = vec![InventoryItem::new(1, "Old demand", 5, Money::from_cents(100), 10)];
        let rows = low_stock_forecast(&orders, &items, 7);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].daily_consumption, 0.0);
    }

    #[test]
    fn test_order_frequency_counts_orders() {
        let orders = vec![
            order(1, day(1), vec![line(1, 1, 100), line(1, 2, 100), line(2, 1, 100)]),
            order(2, day(2), vec![line(2, 5, 100)]),
            order(3, day(3), vec![line(9, 1, 100)]),
        ];
        let items = vec![
            InventoryItem::new(1, "Tape", 1, Money::from_cents(100), 1),
            InventoryItem::new(2, "Film", 1, Money::from_cents(100), 1),
        ];

        let rows = order_frequency(&orders, &items);
        assert_eq!(rows[0].item_id, 2);
        assert_eq!(rows[0].order_frequency, 2);
        assert_eq!(rows[1].item_id, 1);
        assert_eq!(rows[1].order_frequency, 1);
        assert_eq!(rows[2].item_name, "Unknown");
    }

    #[test]
    fn test_order_frequency_top_ten() {
        let orders: Vec<Order> = (1..=15)
            .map(|id| order(id, day(1), vec![line(id, 1, 100)]))
            .collect();
        assert_eq!(order_frequency(&orders, &[]).len(), TOP_ITEMS);
    }

    #[test]
    fn test_dashboard_summary_counts_statuses() {
        let mut done = order(2, day(2), vec![line(1, 1, 100)]);
        done.status = OrderStatus::Fulfilled;
        let orders = vec![order(1, day(1), vec![line(1, 1, 100)]), done];
        let items = vec![InventoryItem::new(1, "Tape", 40, Money::from_cents(100), 10)];

        let summary = dashboard_summary(&orders, &items, day(3), 30, 7);
        assert_eq!(summary.pending_orders, 1);
        assert_eq!(summary.fulfilled_orders, 1);
        assert_eq!(summary.inventory.total_items, 1);
        assert_eq!(summary.profit.total_revenue.cents(), 200);
    }
}
