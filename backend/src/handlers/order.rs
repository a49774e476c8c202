//! HTTP handlers for order endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::{IntakeOrderInput, PlaceOrderInput};
use crate::services::order::{IntakeOutcome, OrderDetails, OrderFilter, PlaceOrderOutcome};
use crate::services::OrderService;
use crate::AppState;

/// List orders with their product, warehouse and open alerts
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<OrderDetails>>> {
    let service = OrderService::new(state.db);
    let orders = service.list(&filter).await?;
    Ok(Json(orders))
}

/// Place an order for an existing product
pub async fn place_order(
    State(state): State<AppState>,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<PlaceOrderOutcome>> {
    let service = OrderService::new(state.db);
    let outcome = service.place(input).await?;
    Ok(Json(outcome))
}

/// Receive stock by product name
pub async fn intake_order(
    State(state): State<AppState>,
    Json(input): Json<IntakeOrderInput>,
) -> AppResult<Json<IntakeOutcome>> {
    let service = OrderService::new(state.db);
    let outcome = service.intake(input).await?;
    Ok(Json(outcome))
}
