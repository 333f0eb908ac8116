//! # Peak-Hour Throttle
//!
//! Time-of-day capacity policy for order admission.
//!
//! ## Capacity Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  hour   capacity (units/hour)                                           │
//! │  ─────  ──────────────────────                                          │
//! │  14     50                                                              │
//! │  15     75                                                              │
//! │  16     100                                                             │
//! │  17     80                                                              │
//! │  other  30                                                              │
//! │                                                                         │
//! │  Today's ordered units ≥ 80% of the current capacity                   │
//! │  during a peak hour  ──►  PeakWarning (advisory, never blocks)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `_at` variants take the clock as an argument and are what the tests
//! and the service layer use; the clock-reading wrappers exist for callers
//! that just want "now".
//!
//! ```rust
//! use depot_core::peak::PeakHourPolicy;
//!
//! let policy = PeakHourPolicy::default();
//! assert_eq!(policy.capacity_at(15), 75);
//! assert_eq!(policy.capacity_at(9), 30);
//! assert!(!policy.is_peak_hour_at(9));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::types::Order;

/// Capacity outside the peak window.
pub const DEFAULT_HOURLY_CAPACITY: i64 = 30;

/// Share of capacity at which the warning fires.
pub const PEAK_WARNING_PERCENT: i64 = 80;

// =============================================================================
// Peak Warning
// =============================================================================

/// Advisory raised when today's order volume nears the current capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWarning {
    pub hour: u32,
    /// Units ordered today.
    pub used: i64,
    pub capacity: i64,
    /// `used / capacity`, truncated to a whole percent.
    pub percent: i64,
}

impl fmt::Display for PeakWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PEAK HOUR ALERT: {}/{} capacity used ({}%)",
            self.used, self.capacity, self.percent
        )
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Static hour → capacity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakHourPolicy {
    hourly_limits: BTreeMap<u32, i64>,
    default_capacity: i64,
}

impl Default for PeakHourPolicy {
    fn default() -> Self {
        PeakHourPolicy {
            hourly_limits: BTreeMap::from([(14, 50), (15, 75), (16, 100), (17, 80)]),
            default_capacity: DEFAULT_HOURLY_CAPACITY,
        }
    }
}

impl PeakHourPolicy {
    /// True if `hour` is one of the table's peak hours.
    pub fn is_peak_hour_at(&self, hour: u32) -> bool {
        self.hourly_limits.contains_key(&hour)
    }

    /// Capacity for `hour`, falling back to the off-peak default.
    pub fn capacity_at(&self, hour: u32) -> i64 {
        self.hourly_limits
            .get(&hour)
            .copied()
            .unwrap_or(self.default_capacity)
    }

    pub fn is_peak_hour(&self) -> bool {
        self.is_peak_hour_at(Local::now().hour())
    }

    pub fn current_capacity(&self) -> i64 {
        self.capacity_at(Local::now().hour())
    }

    /// Units ordered on the calendar day of `now`.
    pub fn units_ordered_on(&self, orders: &[Order], now: NaiveDateTime) -> i64 {
        let today = now.date();
        orders
            .iter()
            .filter(|order| order.created_date() == today)
            .map(|order| order.total_qty)
            .sum()
    }

    /// Warning for the moment `now`, if any.
    ///
    /// Outside the peak window there is never a warning, whatever the
    /// volume.
    pub fn peak_warning_at(&self, orders: &[Order], now: NaiveDateTime) -> Option<PeakWarning> {
        let hour = now.hour();
        let capacity = *self.hourly_limits.get(&hour)?;

        let used = self.units_ordered_on(orders, now);
        // used ≥ 0.8 × capacity, in integers
        if used * 100 < capacity * PEAK_WARNING_PERCENT {
            return None;
        }

        Some(PeakWarning {
            hour,
            used,
            capacity,
            percent: used * 100 / capacity,
        })
    }

    pub fn peak_warning(&self, orders: &[Order]) -> Option<PeakWarning> {
        self.peak_warning_at(orders, Local::now().naive_local())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::OrderStatus;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 10, 0)
            .unwrap()
    }

    fn order(id: i64, total_qty: i64, created_at: NaiveDateTime) -> Order {
        Order {
            id,
            customer: "Acme".to_string(),
            items: Vec::new(),
            total: Money::from_cents(total_qty * 100),
            total_qty,
            status: OrderStatus::Pending,
            created_at,
            fulfilled_at: None,
        }
    }

    #[test]
    fn test_capacity_table() {
        let policy = PeakHourPolicy::default();
        assert_eq!(policy.capacity_at(14), 50);
        assert_eq!(policy.capacity_at(15), 75);
        assert_eq!(policy.capacity_at(16), 100);
        assert_eq!(policy.capacity_at(17), 80);
        assert_eq!(policy.capacity_at(13), 30);
        assert_eq!(policy.capacity_at(18), 30);

        for hour in 14..=17 {
            assert!(policy.is_peak_hour_at(hour));
        }
        assert!(!policy.is_peak_hour_at(0));
    }

    #[test]
    fn test_warning_fires_at_eighty_percent() {
        let policy = PeakHourPolicy::default();
        let now = at(3, 15);
        let orders = vec![order(1, 40, at(3, 9)), order(2, 25, at(3, 14))];

        let warning = policy.peak_warning_at(&orders, now).expect("65 ≥ 60");
        assert_eq!(warning.used, 65);
        assert_eq!(warning.capacity, 75);
        assert_eq!(warning.percent, 86);
        assert_eq!(warning.to_string(), "PEAK HOUR ALERT: 65/75 capacity used (86%)");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = PeakHourPolicy::default();
        let now = at(3, 15);
        assert!(policy.peak_warning_at(&[order(1, 60, at(3, 8))], now).is_some());
        assert!(policy.peak_warning_at(&[order(1, 59, at(3, 8))], now).is_none());
    }

    #[test]
    fn test_only_today_counts() {
        let policy = PeakHourPolicy::default();
        let now = at(3, 16);
        let orders = vec![order(1, 500, at(2, 16)), order(2, 10, at(3, 11))];
        assert_eq!(policy.units_ordered_on(&orders, now), 10);
        assert!(policy.peak_warning_at(&orders, now).is_none());
    }

    #[test]
    fn test_no_warning_off_peak() {
        let policy = PeakHourPolicy::default();
        let now = at(3, 10);
        let orders = vec![order(1, 1_000, at(3, 9))];
        assert!(policy.peak_warning_at(&orders, now).is_none());
    }
}
