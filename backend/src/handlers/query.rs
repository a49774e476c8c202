//! Natural-language query handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::query::{validate_question, QueryFailure, QueryInput, QueryOutcome};
use crate::services::QueryService;
use crate::AppState;

/// Answer a free-text question about the inventory
pub async fn run_query(
    State(state): State<AppState>,
    Json(input): Json<QueryInput>,
) -> AppResult<Json<QueryOutcome>> {
    let question = validate_question(&input.query)?;

    if !state.config.gemini.is_configured() {
        tracing::warn!("Natural language query received but no Gemini API key is configured");
        return Ok(Json(QueryOutcome::Failed(QueryFailure::not_configured())));
    }

    let service = QueryService::new(state.db, state.gemini);
    let outcome = service.ask(question).await?;
    Ok(Json(outcome))
}
