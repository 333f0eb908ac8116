//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DEPOT_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in report headers
    pub warehouse_name: String,

    /// `DEPOT_DB_PATH`; the platform data directory is used when absent
    pub database_path: Option<PathBuf>,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Horizon of the low-stock forecast, in days
    pub forecast_days: i64,

    /// Window of the revenue trend, in days
    pub trend_days: i64,

    pub alerts: AlertSettings,
}

/// Email alert settings.
///
/// Only read to decide which advisories get logged; no mail is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSettings {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,

    /// Alert when an operation leaves an item under its minimum
    pub low_stock: bool,

    /// Alert on payroll runs
    pub payroll_due: bool,

    /// Alert when today's order volume nears the hourly capacity
    pub peak_hours: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings {
            enabled: false,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: String::new(),
            low_stock: true,
            payroll_due: true,
            peak_hours: false,
        }
    }
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Warehouse: "Main Warehouse"
    /// - Currency: ₹ with 2 decimals
    /// - Forecast: 7 days ahead, trend over 30 days
    /// - Alerts: disabled
    fn default() -> Self {
        ConfigState {
            warehouse_name: "Main Warehouse".to_string(),
            database_path: None,
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            forecast_days: 7,
            trend_days: 30,
            alerts: AlertSettings::default(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `DEPOT_DB_PATH`: database file
    /// - `DEPOT_WAREHOUSE_NAME`, `DEPOT_CURRENCY_SYMBOL`
    /// - `DEPOT_FORECAST_DAYS`, `DEPOT_TREND_DAYS`: positive integers
    /// - `DEPOT_ALERT_LOW_STOCK`, `DEPOT_ALERT_PEAK_HOURS`,
    ///   `DEPOT_ALERT_PAYROLL`: booleans; any of them set to true enables
    ///   alerts
    /// - `DEPOT_SMTP_SERVER`, `DEPOT_SMTP_PORT`, `DEPOT_SENDER_EMAIL`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(path) = lookup("DEPOT_DB_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("DEPOT_WAREHOUSE_NAME") {
            config.warehouse_name = name;
        }

        if let Some(symbol) = lookup("DEPOT_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(days) = lookup("DEPOT_FORECAST_DAYS") {
            config.forecast_days = parse_days("DEPOT_FORECAST_DAYS", &days)?;
        }

        if let Some(days) = lookup("DEPOT_TREND_DAYS") {
            config.trend_days = parse_days("DEPOT_TREND_DAYS", &days)?;
        }

        let alerts = &mut config.alerts;
        let mut any_alert = false;

        if let Some(flag) = lookup("DEPOT_ALERT_LOW_STOCK") {
            alerts.low_stock = parse_flag("DEPOT_ALERT_LOW_STOCK", &flag)?;
            any_alert |= alerts.low_stock;
        }

        if let Some(flag) = lookup("DEPOT_ALERT_PEAK_HOURS") {
            alerts.peak_hours = parse_flag("DEPOT_ALERT_PEAK_HOURS", &flag)?;
            any_alert |= alerts.peak_hours;
        }

        if let Some(flag) = lookup("DEPOT_ALERT_PAYROLL") {
            alerts.payroll_due = parse_flag("DEPOT_ALERT_PAYROLL", &flag)?;
            any_alert |= alerts.payroll_due;
        }

        alerts.enabled = any_alert;

        if let Some(server) = lookup("DEPOT_SMTP_SERVER") {
            alerts.smtp_server = server;
        }

        if let Some(port) = lookup("DEPOT_SMTP_PORT") {
            alerts.smtp_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DEPOT_SMTP_PORT".to_string()))?;
        }

        if let Some(sender) = lookup("DEPOT_SENDER_EMAIL") {
            alerts.sender_email = sender;
        }

        Ok(config)
    }

    /// Whether low-stock advisories should be raised.
    pub fn low_stock_alerts(&self) -> bool {
        self.alerts.enabled && self.alerts.low_stock
    }

    /// Whether peak-hour advisories should be raised.
    pub fn peak_hour_alerts(&self) -> bool {
        self.alerts.enabled && self.alerts.peak_hours
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1234), "₹12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

/// Longest report window accepted from the environment, in days.
const MAX_REPORT_DAYS: i64 = 36_500;

fn parse_days(key: &str, value: &str) -> Result<i64, ConfigError> {
    match value.trim().parse::<i64>() {
        Ok(days) if (1..=MAX_REPORT_DAYS).contains(&days) => Ok(days),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}
