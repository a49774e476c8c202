//! Pass-through to the upstream inventory service

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::AppState;

pub async fn get_inventory(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let inventory = state.inventory_feed.fetch().await?;
    Ok(Json(inventory))
}
