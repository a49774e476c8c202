//! Gemini Client
//!
//! Client for Google's Gemini `generateContent` API, used to translate
//! free-text questions into PostgreSQL queries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

/// Client for the Gemini text generation API
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    http_client: Client,
}

/// Request body for generateContent
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Response from generateContent
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.trim().to_string(),
            http_client,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send a single-turn prompt and return the generated text, if any
    pub async fn generate(&self, prompt: &str) -> AppResult<Option<String>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .http_client
            .post(self.generate_url())
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LanguageModel(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Gemini API error: {} {}", status, body);
            return Err(AppError::LanguageModel(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::LanguageModel(format!("Failed to parse response: {}", e)))?;

        Ok(result
            .first_text()
            .map(strip_code_fences)
            .filter(|text| !text.is_empty()))
    }

    /// Translate a question into a SQL statement
    pub async fn question_to_sql(&self, question: &str) -> AppResult<Option<String>> {
        let sql = self.generate(&sql_prompt(question)).await?;
        tracing::debug!("Generated SQL: {:?}", sql);
        Ok(sql)
    }
}

/// Remove surrounding markdown fences (```sql ... ```) and whitespace
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let without_open = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop an optional language tag on the opening fence line
            match rest.find('\n') {
                Some(idx) if !rest[..idx].contains(' ') => &rest[idx + 1..],
                _ => rest,
            }
        }
        None => trimmed,
    };
    without_open
        .trim()
        .trim_end_matches("```")
        .trim()
        .to_string()
}

/// Prompt describing the schema and asking for a single PostgreSQL query
pub fn sql_prompt(question: &str) -> String {
    format!(
        r#"You are a SQL expert for a warehouse management system. Convert the following human language query to SQL.

Database Schema (PostgreSQL):
- warehouses: id (uuid), name, location, address, city, country, total_capacity, used_capacity, manager_name, manager_email, manager_phone, created_at, updated_at
- products: id (uuid), sku, name, description, category, brand, cost_price, selling_price, current_stock, min_stock_level, max_stock_level, shelf_life_days, received_date (timestamptz), expiry_date (timestamptz), dead_stock_risk (0-1), status (enum), last_prediction, warehouse_id, created_at, updated_at
- orders: id (uuid), order_number, product_id, warehouse_id, quantity, unit_cost, total_cost, shelf_life_days, expected_expiry, status (enum), requested_date, created_at, updated_at
- alerts: id (uuid), title, message, type (enum), priority (enum), is_read, is_resolved, resolved_at, resolved_by, warehouse_id, product_id, order_id, created_at
- recommendations: id (uuid), product_id, type (enum), title, description, suggested_action, expected_impact, confidence, urgency (enum), is_implemented, created_at
- sales: id (uuid), product_id, quantity_sold, unit_price, total_revenue, profit, customer_name, customer_email, sale_date

Relationships:
- products.warehouse_id -> warehouses.id
- orders.product_id -> products.id
- orders.warehouse_id -> warehouses.id
- alerts.warehouse_id -> warehouses.id, alerts.product_id -> products.id, alerts.order_id -> orders.id
- recommendations.product_id -> products.id
- sales.product_id -> products.id

Enum values:
- products.status: 'HEALTHY', 'LOW_SHELF_LIFE', 'AT_RISK', 'DEAD_STOCK'
- orders.status: 'PENDING', 'CONFIRMED', 'SHIPPED', 'DELIVERED', 'CANCELLED'
- alerts.type: 'SPACE_CONSTRAINT', 'SHELF_LIFE_WARNING', 'DEAD_STOCK_ALERT', 'ML_PREDICTION', 'LOW_STOCK', 'SYSTEM'
- alerts.priority and recommendations.urgency: 'LOW', 'MEDIUM', 'HIGH', 'CRITICAL'

Human Query: "{}"

Return ONLY a single read-only SELECT statement, no explanations or additional text. Use PostgreSQL syntax."#,
        question
    )
}
