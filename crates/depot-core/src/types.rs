//! # Domain Types
//!
//! Core domain types used throughout Depot.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │◄──│   OrderLine     │──►│     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (seq)       │   │  item_id        │   │  id (seq)       │       │
//! │  │  quantity ≥ 0   │   │  unit_price     │   │  status         │       │
//! │  │  price > 0      │   │  line_total     │   │  total, qty     │       │
//! │  │  min_stock      │   └─────────────────┘   └─────────────────┘       │
//! │  └────────┬────────┘                                                    │
//! │           │ every quantity change                                       │
//! │           ▼                                                             │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ StockMovement   │   │   Employee      │──►│AttendanceRecord │       │
//! │  │  IN / OUT       │   │  position       │   │ one per day     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  UserAccount    │   │   Warehouse     │   │ AuditLogEntry   │       │
//! │  │  role, hash     │   │  capacity       │   │ append-only     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Items, orders, employees and warehouses carry sequential integer ids
//! assigned by the store. Users are keyed by their unique username.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::authz::Role;
use crate::error::ValidationError;
use crate::ledger::Direction;
use crate::money::Money;

fn unknown_value(field: &str, value: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("unknown value '{value}'"),
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stock item held in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Sequential id, immutable once assigned.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Unit price. Always positive.
    pub price: Money,

    /// Threshold under which the item counts as low stock.
    pub min_stock: i64,

    pub added_date: NaiveDate,

    /// Date of the last quantity or price change.
    pub updated_date: Option<NaiveDate>,
}

impl InventoryItem {
    /// Builds an item dated today.
    pub fn new(id: i64, name: impl Into<String>, quantity: i64, price: Money, min_stock: i64) -> Self {
        InventoryItem {
            id,
            name: name.into(),
            quantity,
            price,
            min_stock,
            added_date: Local::now().date_naive(),
            updated_date: None,
        }
    }

    /// True when the quantity sits below the item's minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.min_stock
    }

    /// Quantity × unit price.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order. `Pending → Fulfilled` is the only transition;
/// deletion removes the record in either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Fulfilled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Fulfilled => "Fulfilled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Fulfilled" => Ok(OrderStatus::Fulfilled),
            other => Err(unknown_value("status", other)),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A priced line of an order.
///
/// Name and unit price are frozen at order time; later edits to the
/// inventory item do not touch existing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A customer order.
///
/// `total` is the sum of the line totals at creation and is never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer: String,
    pub items: Vec<OrderLine>,
    pub total: Money,
    /// Units across all lines, used by the peak-hour throttle.
    pub total_qty: i64,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    pub fulfilled_at: Option<NaiveDateTime>,
}

impl Order {
    #[inline]
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

// =============================================================================
// Employee
// =============================================================================

/// Job positions an employee can be hired into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Worker,
    Supervisor,
    Manager,
    Engineer,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Worker,
        Position::Supervisor,
        Position::Manager,
        Position::Engineer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Position::Worker => "Worker",
            Position::Supervisor => "Supervisor",
            Position::Manager => "Manager",
            Position::Engineer => "Engineer",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "position".to_string(),
                allowed: Position::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            })
    }
}

/// A member of staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub position: Position,
    /// Monthly salary.
    pub salary: Money,
    pub shift: String,
    pub hire_date: NaiveDate,
}

// =============================================================================
// User Account
// =============================================================================

/// A login account. The hash never leaves the service layer; listings use
/// [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    pub created_at: NaiveDateTime,
}

impl UserAccount {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            role: self.role,
            full_name: self.full_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Account data safe to hand to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub created_at: NaiveDateTime,
}

// =============================================================================
// Attendance
// =============================================================================

/// Check-in and check-out of one employee on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

impl AttendanceRecord {
    /// Minutes between check-in and check-out, once both are set.
    pub fn minutes_worked(&self) -> Option<i64> {
        match (self.check_in, self.check_out) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_minutes()),
            _ => None,
        }
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// A storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub address: String,
    pub phone: String,
    /// Storage capacity in units.
    pub capacity: i64,
}

// =============================================================================
// Audit Log
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Read => "READ",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(AuditAction::Create),
            "READ" => Ok(AuditAction::Read),
            "UPDATE" => Ok(AuditAction::Update),
            "DELETE" => Ok(AuditAction::Delete),
            other => Err(unknown_value("action", other)),
        }
    }
}

/// The area of the application an audit entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditModule {
    Employees,
    Inventory,
    Orders,
    Users,
    Attendance,
    Warehouses,
}

impl AuditModule {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditModule::Employees => "employees",
            AuditModule::Inventory => "inventory",
            AuditModule::Orders => "orders",
            AuditModule::Users => "users",
            AuditModule::Attendance => "attendance",
            AuditModule::Warehouses => "warehouses",
        }
    }
}

impl fmt::Display for AuditModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditModule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employees" => Ok(AuditModule::Employees),
            "inventory" => Ok(AuditModule::Inventory),
            "orders" => Ok(AuditModule::Orders),
            "users" => Ok(AuditModule::Users),
            "attendance" => Ok(AuditModule::Attendance),
            "warehouses" => Ok(AuditModule::Warehouses),
            other => Err(unknown_value("module", other)),
        }
    }
}

/// One append-only audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub action: AuditAction,
    pub module: AuditModule,
    /// Item/order/employee id, or a username for the users module.
    pub record_id: String,
    /// Who performed the action.
    pub user: String,
    pub details: String,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// A committed quantity change of one item.
///
/// Summing OUT movements tagged with an order id per item gives exactly the
/// units that orders removed from that item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    pub item_id: i64,
    pub direction: Direction,
    pub quantity: i64,
    pub order_id: Option<i64>,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_low_stock_and_value() {
        let item = InventoryItem::new(1, "Pallet wrap", 5, Money::from_cents(1250), 10);
        assert!(item.is_low_stock());
        assert_eq!(item.stock_value().cents(), 6250);

        let stocked = InventoryItem::new(2, "Tape", 10, Money::from_cents(100), 10);
        assert!(!stocked.is_low_stock());
    }

    #[test]
    fn test_order_status_default_and_parse() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!("Fulfilled".parse::<OrderStatus>().unwrap(), OrderStatus::Fulfilled);
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_position_parse_lists_allowed() {
        assert_eq!("Engineer".parse::<Position>().unwrap(), Position::Engineer);
        let err = "Janitor".parse::<Position>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "position must be one of: Worker, Supervisor, Manager, Engineer"
        );
    }

    #[test]
    fn test_audit_enums_round_trip_text() {
        for action in [AuditAction::Create, AuditAction::Read, AuditAction::Update, AuditAction::Delete] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert_eq!("orders".parse::<AuditModule>().unwrap(), AuditModule::Orders);
        assert!("payroll".parse::<AuditModule>().is_err());
    }

    #[test]
    fn test_user_account_hides_hash() {
        let account = UserAccount {
            username: "admin".to_string(),
            password_hash: "deadbeef".to_string(),
            role: Role::Admin,
            full_name: "Administrator".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("deadbeef"));
        assert_eq!(account.profile().role, Role::Admin);
    }

    #[test]
    fn test_minutes_worked() {
        let record = AttendanceRecord {
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            check_in: NaiveTime::from_hms_opt(9, 0, 0),
            check_out: NaiveTime::from_hms_opt(17, 30, 0),
        };
        assert_eq!(record.minutes_worked(), Some(510));

        let open = AttendanceRecord { check_out: None, ..record };
        assert_eq!(open.minutes_worked(), None);
    }
}
