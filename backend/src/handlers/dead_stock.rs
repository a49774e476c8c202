//! HTTP handlers for dead stock listing, export and analysis

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::AppResult;
use crate::services::dead_stock::{AnalysisReport, AnalyzeInput, DeadStockQuery};
use crate::services::DeadStockService;
use crate::AppState;

/// List dead and high-risk stock as JSON or CSV
pub async fn list_dead_stock(
    State(state): State<AppState>,
    Query(query): Query<DeadStockQuery>,
) -> AppResult<impl IntoResponse> {
    let service = DeadStockService::new(state.db);
    let items = service.list(query.warehouse_id).await?;

    if query.wants_csv() {
        let csv = DeadStockService::export_to_csv(&items)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"dead_stock.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(items).into_response())
    }
}

/// Score every product in a warehouse
pub async fn analyze_dead_stock(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeInput>,
) -> AppResult<Json<AnalysisReport>> {
    let service = DeadStockService::new(state.db);
    let report = service.analyze(input).await?;
    Ok(Json(report))
}
