//! Configuration and connectivity diagnostics
//!
//! Secrets are reported by presence, length and a short masked prefix only.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::GEMINI_KEY_PLACEHOLDER;
use crate::error::AppResult;
use crate::models::Warehouse;
use crate::services::WarehouseService;
use crate::AppState;

const VISIBLE_PREFIX: usize = 4;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {
    pub configured: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl SecretStatus {
    pub fn inspect(value: &str) -> Self {
        let value = value.trim();
        let configured = !value.is_empty() && value != GEMINI_KEY_PLACEHOLDER;
        Self {
            configured,
            length: value.chars().count(),
            preview: configured.then(|| mask(value)),
        }
    }
}

/// Keep the first few characters and star out the rest
pub fn mask(value: &str) -> String {
    let prefix: String = value.chars().take(VISIBLE_PREFIX).collect();
    format!("{}***", prefix)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    pub success: bool,
    pub environment: String,
    pub gemini_api_key: SecretStatus,
    pub gemini_model: String,
    pub database_url: SecretStatus,
    pub inventory_feed_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseReport {
    pub success: bool,
    pub count: i64,
    pub warehouses: Vec<Warehouse>,
}

pub async fn config_report(State(state): State<AppState>) -> Json<ConfigReport> {
    let config = &state.config;
    Json(ConfigReport {
        success: true,
        environment: config.environment.clone(),
        gemini_api_key: SecretStatus::inspect(&config.gemini.api_key),
        gemini_model: config.gemini.model.clone(),
        database_url: SecretStatus::inspect(&config.database.url),
        inventory_feed_url: config.inventory_feed.url.clone(),
    })
}

/// Warehouse count and rows without joins
pub async fn warehouse_report(State(state): State<AppState>) -> AppResult<Json<WarehouseReport>> {
    let service = WarehouseService::new(state.db);
    let count = service.count().await?;
    let warehouses = service.list().await?;
    Ok(Json(WarehouseReport {
        success: true,
        count,
        warehouses,
    }))
}
