//! # depot
//!
//! Opens the Depot store, logs in and prints the dashboard report as JSON.
//!
//! ## Usage
//! ```bash
//! # Default database location, seeded admin account
//! depot --user admin --password admin123
//!
//! # Explicit database file, debug logging
//! DEPOT_DB_PATH=./depot_dev.db RUST_LOG=debug depot -u manager -p manager123
//! ```
//!
//! Workers cannot view reports; for them the current stock list is printed
//! instead.

use std::env;
use std::process::ExitCode;

use serde_json::json;
use tracing::{error, info};

use depot_core::authz::has_permission;
use depot_core::Action;
use depot_service::{init_tracing, AppContext, ConfigState};

fn print_help() {
    println!("Depot warehouse report");
    println!();
    println!("Usage: depot --user <USERNAME> --password <PASSWORD>");
    println!();
    println!("Options:");
    println!("  -u, --user <USERNAME>      Account to log in with");
    println!("  -p, --password <PASSWORD>  Password of that account");
    println!("  -h, --help                 Print help");
    println!();
    println!("Environment:");
    println!("  DEPOT_DB_PATH              Database file (default: platform data dir)");
    println!("  RUST_LOG                   Log filter (default: info,depot=debug,sqlx=warn)");
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut username: Option<String> = None;
    let mut password: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    username = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let (Some(username), Some(password)) = (username, password) else {
        print_help();
        return ExitCode::FAILURE;
    };

    init_tracing();
    info!("Starting Depot");

    let config = match ConfigState::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = match AppContext::bootstrap(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = async {
        let session = ctx.auth().authenticate(&username, &password).await?;

        let body = if has_permission(session.role, Action::ViewReports) {
            let dashboard = ctx.analytics().dashboard(&session).await?;
            json!({
                "warehouse": ctx.config().warehouse_name,
                "user": session.username,
                "totalValue": ctx.config().format_currency(dashboard.inventory.total_value.cents()),
                "dashboard": dashboard,
            })
        } else {
            let items = ctx.inventory().list_items(&session).await?;
            json!({
                "warehouse": ctx.config().warehouse_name,
                "user": session.username,
                "items": items,
            })
        };

        ctx.auth().logout(&session.token);
        Ok::<_, depot_service::ApiError>(body)
    }
    .await;

    let code = match report {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Could not render report: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", json!(e));
            ExitCode::FAILURE
        }
    };

    ctx.db().close().await;
    code
}
