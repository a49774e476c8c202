//! Seed data script - populates the database with demo warehouses and stock
//!
//! Run with: cargo run --bin wim-seed [-- --reset]

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

use wim_backend::{init_tracing, services::seed, Config};

#[derive(Parser, Debug)]
#[command(name = "wim-seed", about = "Populate the database with demo data")]
struct Args {
    /// Truncate every table before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("wim_seed=info,wim_backend=info,sqlx=warn");
    let config = Config::load()?;

    info!("=== Warehouse Inventory Seed Data ===");

    let db = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&db).await?;
    info!("Migrations applied");

    if args.reset {
        seed::reset(&db).await?;
    }

    let summary = seed::seed_database(&db).await?;

    info!("=== Seed Data Complete ===");
    info!(
        "{} warehouses, {} products, {} orders, {} alerts, {} recommendations, {} sales",
        summary.warehouses,
        summary.products,
        summary.orders,
        summary.alerts,
        summary.recommendations,
        summary.sales
    );
    info!("Try: curl http://localhost:3000/api/v1/dashboard");

    Ok(())
}
