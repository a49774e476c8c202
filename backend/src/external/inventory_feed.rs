//! Inventory feed client
//!
//! Pass-through client for the upstream inventory service. The payload is
//! returned untouched so the dashboard sees exactly what the service reports.

use reqwest::Client;
use std::time::Duration;

use crate::config::InventoryFeedConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct InventoryFeedClient {
    url: String,
    http_client: Client,
}

impl InventoryFeedClient {
    pub fn new(config: &InventoryFeedConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            http_client,
        })
    }

    /// Fetch the current inventory document
    pub async fn fetch(&self) -> AppResult<serde_json::Value> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::InventoryFeed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InventoryFeed(format!(
                "Upstream returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::InventoryFeed(format!("Failed to parse response: {}", e)))
    }
}
