//! Warehouse Inventory Management Platform - Backend Server

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, time::Duration};

use wim_backend::{create_app, init_tracing, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also loads .env
    init_tracing("wim_server=debug,wim_backend=debug,tower_http=debug,sqlx=warn");

    // Load configuration
    let config = Config::load()?;

    tracing::info!("Starting Warehouse Inventory Management Server");
    tracing::info!("Environment: {}", config.environment);
    if !config.gemini.is_configured() {
        tracing::warn!("GEMINI_API_KEY is not set; natural language queries are disabled");
    }

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.is_development() {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::new(db_pool, config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
