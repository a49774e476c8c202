//! Route definitions for the Warehouse Inventory Management Platform

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/query", post(handlers::run_query))
        // Upstream inventory service pass-through
        .route("/inventory", get(handlers::get_inventory))
        .nest("/warehouses", warehouse_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/alerts", alert_routes())
        .nest("/dead-stock", dead_stock_routes())
        .nest("/diagnostics", diagnostics_routes())
}

fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route("/:id", get(handlers::get_warehouse))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products))
        .route("/lookup/:name", get(handlers::lookup_product))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::place_order))
        .route("/intake", post(handlers::intake_order))
}

fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts).post(handlers::create_alert))
        .route("/:id", patch(handlers::update_alert))
}

fn dead_stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_dead_stock))
        .route("/analyze", post(handlers::analyze_dead_stock))
}

/// Debug endpoints
fn diagnostics_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(handlers::config_report))
        .route("/warehouses", get(handlers::warehouse_report))
}
