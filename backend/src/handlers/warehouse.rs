//! HTTP handlers for warehouse endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CreateWarehouseInput, Warehouse};
use crate::services::warehouse::WarehouseOverview;
use crate::services::WarehouseService;
use crate::AppState;

/// List warehouses with capacity and stock stats
pub async fn list_warehouses(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WarehouseOverview>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list_overviews().await?;
    Ok(Json(warehouses))
}

/// Get a warehouse by ID
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseOverview>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.get_overview(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}
