//! Warehouse Inventory Management Platform - Backend
//!
//! REST API over warehouses, perishable stock, purchase orders and alerts,
//! with dead stock risk analysis and natural-language queries.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
use external::{GeminiClient, InventoryFeedClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub gemini: GeminiClient,
    pub inventory_feed: InventoryFeedClient,
}

impl AppState {
    /// Build the state and its HTTP clients from configuration
    pub fn new(db: sqlx::PgPool, config: Config) -> anyhow::Result<Self> {
        let gemini = GeminiClient::new(&config.gemini)?;
        let inventory_feed = InventoryFeedClient::new(&config.inventory_feed)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            gemini,
            inventory_feed,
        })
    }
}

/// Log filter from `RUST_LOG`, falling back to `default_filter`.
///
/// `.env` is loaded first so a `RUST_LOG` set there applies.
pub fn log_filter(default_filter: &str) -> EnvFilter {
    dotenvy::dotenv().ok();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Initialize tracing; `RUST_LOG` overrides the default filter
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(log_filter(default_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Warehouse Inventory Management API v1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_prefers_rust_log() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter("wim_backend=info").to_string(), "wim_backend=info");

        std::env::set_var("RUST_LOG", "wim_backend=trace");
        assert_eq!(log_filter("wim_backend=info").to_string(), "wim_backend=trace");
        std::env::remove_var("RUST_LOG");
    }
}
