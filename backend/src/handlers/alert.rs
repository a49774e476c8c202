//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Alert, AlertFilter, CreateAlertInput, UpdateAlertInput};
use crate::services::alert::AlertDetails;
use crate::services::AlertService;
use crate::AppState;

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<Vec<AlertDetails>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list(&filter).await?;
    Ok(Json(alerts))
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateAlertInput>,
) -> AppResult<(StatusCode, Json<Alert>)> {
    let service = AlertService::new(state.db);
    let alert = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Mark an alert read or resolved
pub async fn update_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
    Json(input): Json<UpdateAlertInput>,
) -> AppResult<Json<Alert>> {
    let service = AlertService::new(state.db);
    let alert = service.update(alert_id, input).await?;
    Ok(Json(alert))
}
