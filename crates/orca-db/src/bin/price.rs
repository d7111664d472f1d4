//! # Budget Pricing CLI
//!
//! Prices a budget request read as JSON and prints the calculation.
//!
//! ## Usage
//! ```bash
//! # Price only (provisions the store config on first use)
//! cargo run -p orca-db --bin price -- --input budget.json
//!
//! # Read the request from stdin, store it under the next budget number
//! cat budget.json | cargo run -p orca-db --bin price -- --persist --client cliente-42
//!
//! # Specify database path (overrides ORCA_DATABASE_PATH)
//! cargo run -p orca-db --bin price -- --db ./data/orca.db --input budget.json
//! ```
//!
//! ## Input
//! ```json
//! {
//!   "store_id": "loja-1",
//!   "vendor_id": "vendedor-7",
//!   "manager_id": "gerente-2",
//!   "ambient_value": 5000000,
//!   "discount": "0.2",
//!   "additional_costs": [{ "description": "Içamento", "amount": 30000 }]
//! }
//! ```
//! Money is in centavos; rates are decimal fractions.

use orca_core::BudgetInput;
use orca_db::{BudgetService, Database, OrcaConfig};
use std::env;
use std::io::Read;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config = OrcaConfig::load()?;
    let mut input_path: Option<String> = None;
    let mut persist = false;
    let mut client_id: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--input" | "-i" => {
                if i + 1 < args.len() {
                    input_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--client" | "-c" => {
                if i + 1 < args.len() {
                    client_id = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--persist" | "-p" => persist = true,
            "--help" | "-h" => {
                println!("Orca Budget Pricing");
                println!();
                println!("Usage: price [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -i, --input <PATH>   Budget request JSON (default: stdin)");
                println!("  -d, --db <PATH>      Database file path (default: $ORCA_DATABASE_PATH or ./orca.db)");
                println!("  -p, --persist        Store the budget and open an approval request if needed");
                println!("  -c, --client <ID>    Client id (required with --persist)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other} (try --help)").into());
            }
        }
        i += 1;
    }

    let raw = match &input_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let input: BudgetInput = serde_json::from_str(&raw)?;

    let db = Database::new(config.db_config()).await?;
    let service = BudgetService::new(db.clone());

    let output = if persist {
        let client_id = client_id.ok_or("--persist requires --client <ID>")?;
        let stored = service.create(&client_id, &input).await?;
        info!(budget_number = %stored.budget_number, "Budget persisted");
        serde_json::to_string_pretty(&stored)?
    } else {
        let calculation = service.price(&input).await?;
        serde_json::to_string_pretty(&calculation)?
    };

    println!("{output}");

    db.close().await;
    Ok(())
}

/// Installs the tracing subscriber (logs go to stderr, JSON to stdout).
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=orca_db=trace` - Show trace for this crate only
/// - Default: `info,sqlx=warn`
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
