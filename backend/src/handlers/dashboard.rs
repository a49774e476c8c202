//! Dashboard handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::dashboard::DashboardResponse;
use crate::services::DashboardService;
use crate::AppState;

pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let service = DashboardService::new(state.db);
    let dashboard = service.overview().await?;
    Ok(Json(dashboard))
}
