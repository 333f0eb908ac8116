//! # Seed Data Generator
//!
//! Populates a Depot database with stock items and staff for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p depot-db --bin seed
//!
//! # Specify database path
//! cargo run -p depot-db --bin seed -- --db ./data/depot.db
//! ```
//!
//! `DEPOT_DB_PATH` is used when `--db` is absent.
//!
//! ## Generated Data
//! - Stock items across packing, handling and safety supplies, some
//!   deliberately under their minimum so low-stock views have content
//! - A handful of employees, one per position
//!
//! Every insert is recorded in the audit log as the `seed` user.

use std::env;

use chrono::Local;
use serde_json::json;

use depot_core::{AuditAction, AuditModule, Money, Position};
use depot_db::{Database, DbConfig, NewAuditEntry, NewEmployee};

/// (name, quantity, price in cents, min_stock)
const ITEMS: &[(&str, i64, i64, i64)] = &[
    ("Stretch Wrap Roll 500mm", 120, 1_450, 40),
    ("Corrugated Box Small", 800, 35, 200),
    ("Corrugated Box Medium", 540, 55, 200),
    ("Corrugated Box Large", 150, 85, 200),
    ("Packing Tape 48mm", 300, 120, 60),
    ("Bubble Wrap 1m x 50m", 25, 2_200, 10),
    ("Wooden Pallet EUR", 60, 1_800, 20),
    ("Plastic Pallet", 8, 5_500, 10),
    ("Hand Pallet Truck", 4, 38_000, 2),
    ("Safety Gloves (pair)", 90, 250, 50),
    ("Hi-Vis Vest", 12, 600, 15),
    ("Hard Hat", 30, 900, 10),
    ("Shipping Labels (500)", 45, 1_100, 20),
    ("Barcode Scanner Battery", 6, 2_700, 5),
    ("Strapping Band 12mm", 18, 3_200, 8),
];

/// (name, age, position, monthly salary)
const EMPLOYEES: &[(&str, i64, Position, i64)] = &[
    ("Asha Kulkarni", 34, Position::Manager, 52_000),
    ("Ravi Deshmukh", 29, Position::Supervisor, 34_000),
    ("Meera Joshi", 41, Position::Engineer, 48_000),
    ("Sanjay Patil", 23, Position::Worker, 18_500),
    ("Pooja Shinde", 26, Position::Worker, 18_500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("DEPOT_DB_PATH").unwrap_or_else(|_| String::from("./depot_dev.db"));

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Depot Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DEPOT_DB_PATH or ./depot_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Depot Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    {
        let mut conn = db.acquire().await?;
        let existing = db.inventory().list(&mut conn).await?.len();
        if existing > 0 {
            println!("⚠ Database already has {} stock items", existing);
            println!("  Skipping seed to avoid duplicates.");
            println!("  Delete the database file to regenerate.");
            return Ok(());
        }
    }

    let now = Local::now().naive_local();
    let today = now.date();

    let mut tx = db.begin_write().await?;

    for (name, quantity, price_cents, min_stock) in ITEMS {
        let item = db
            .inventory()
            .insert(&mut tx, name, *quantity, Money::from_cents(*price_cents), *min_stock, today)
            .await?;

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Inventory,
                    item.id,
                    "seed",
                    format!("Added {} x{}", item.name, item.quantity),
                ),
                now,
            )
            .await?;
    }

    for (name, age, position, salary) in EMPLOYEES {
        let employee = db
            .employees()
            .insert(
                &mut tx,
                &NewEmployee {
                    name: name.to_string(),
                    age: *age,
                    position: *position,
                    salary: Money::from_major_minor(*salary, 0),
                    shift: "Day".to_string(),
                    hire_date: today,
                },
            )
            .await?;

        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Employees,
                    employee.id,
                    "seed",
                    format!("Hired {} as {}", employee.name, employee.position),
                ),
                now,
            )
            .await?;
    }

    tx.commit().await?;

    let mut conn = db.acquire().await?;
    let items = db.inventory().list(&mut conn).await?;
    let low_stock = items.iter().filter(|item| item.is_low_stock()).count();
    let payroll = db.employees().payroll_total(&mut conn).await?;

    println!();
    println!("✓ Seed complete!");
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "items": items.len(),
            "low_stock": low_stock,
            "employees": EMPLOYEES.len(),
            "monthly_payroll": payroll.to_string(),
        }))?
    );

    Ok(())
}
