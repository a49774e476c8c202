//! Alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An operator-facing alert about a warehouse, product or order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: Priority,
    pub is_read: bool,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub warehouse_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Apply a read/resolve update in place.
    ///
    /// Resolving stamps the time and resolver; un-resolving clears both.
    pub fn apply_update(&mut self, input: &UpdateAlertInput, now: DateTime<Utc>) {
        if let Some(is_read) = input.is_read {
            self.is_read = is_read;
        }
        match input.is_resolved {
            Some(true) => {
                self.is_resolved = true;
                self.resolved_at = Some(now);
                self.resolved_by = input.resolved_by.clone();
            }
            Some(false) => {
                self.is_resolved = false;
                self.resolved_at = None;
                self.resolved_by = None;
            }
            None => {}
        }
    }
}

/// Kinds of alert raised by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "alert_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    SpaceConstraint,
    ShelfLifeWarning,
    DeadStockAlert,
    MlPrediction,
    LowStock,
    System,
}

/// Severity shared by alerts and recommendations.
///
/// Variants are declared lowest first so the derived `Ord` (and the
/// Postgres enum order) sorts by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "priority_level", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// Input for creating an alert
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: Option<Priority>,
    pub warehouse_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

/// Input for marking an alert read or resolved
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertInput {
    pub is_read: Option<bool>,
    pub is_resolved: Option<bool>,
    pub resolved_by: Option<String>,
}

/// Query filters for listing alerts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilter {
    pub warehouse_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
    pub priority: Option<Priority>,
    pub is_resolved: Option<bool>,
}
