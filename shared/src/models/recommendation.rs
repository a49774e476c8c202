//! Recommendation models for clearing at-risk stock

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Priority;

/// An action suggested to move at-risk stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub product_id: Uuid,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    /// Expected revenue impact; negative for write-offs
    pub expected_impact: Decimal,
    pub confidence: Decimal,
    pub urgency: Priority,
    pub is_implemented: bool,
    pub implemented_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "recommendation_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    Discount,
    Liquidate,
    Bundle,
    Transfer,
    Donate,
}

/// A recommendation ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub product_id: Uuid,
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    pub expected_impact: Decimal,
    pub confidence: Decimal,
    pub urgency: Priority,
}
