//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::expiry::{is_expired, is_low_shelf_life};

/// A purchase order bringing stock into a warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// Human-readable number (e.g., "ORD-1717200000000")
    pub order_number: String,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub total_cost: Decimal,
    pub shelf_life_days: i32,
    pub expected_expiry: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub requested_date: DateTime<Utc>,
    pub ml_recommended_date: Option<DateTime<Utc>>,
    pub ml_confidence: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Compact order reference embedded in alerts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub quantity: i32,
    pub status: OrderStatus,
}

/// Generate an order number from the placement time
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}", now.timestamp_millis())
}

/// Total cost of an order line; `None` on overflow
pub fn order_total(quantity: i32, unit_cost: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_cost)
}

/// Input for placing an order against an existing product
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderInput {
    #[validate(required)]
    pub product_id: Option<Uuid>,
    #[validate(required)]
    pub warehouse_id: Option<Uuid>,
    #[validate(required, range(min = 1, message = "Quantity must be positive"))]
    pub quantity: Option<i32>,
    #[validate(
        required,
        range(min = 1, max = 36500, message = "Shelf life must be between 1 and 36500 days")
    )]
    pub shelf_life_days: Option<i32>,
    #[serde(default)]
    pub unit_cost: Decimal,
}

/// Input for the order form: stock arrives by product name and is
/// merged into an existing product or creates a new one
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IntakeOrderInput {
    #[validate(required, length(min = 1, message = "Product name is required"))]
    pub product_name: Option<String>,
    #[validate(required, range(min = 1, message = "Quantity must be positive"))]
    pub quantity: Option<i32>,
    #[validate(
        required,
        range(min = 1, max = 36500, message = "Shelf life must be between 1 and 36500 days")
    )]
    pub shelf_life_days: Option<i32>,
    #[validate(required)]
    pub warehouse_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

/// State of stock already held under the same name when new stock arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingStock {
    /// Nothing held, or held stock is safe to top up
    Fresh,
    /// Held stock expires within the low shelf life window
    ExpiresSoon { days_until_expiry: i64 },
    /// Held stock is past its expiry date
    Expired { days_until_expiry: i64 },
}

/// Classify held stock by its days until expiry; stock without an expiry date is fresh
pub fn classify_existing_stock(days_until_expiry: Option<i64>) -> ExistingStock {
    match days_until_expiry {
        Some(days) if is_expired(days) => ExistingStock::Expired {
            days_until_expiry: days,
        },
        Some(days) if is_low_shelf_life(days) => ExistingStock::ExpiresSoon {
            days_until_expiry: days,
        },
        _ => ExistingStock::Fresh,
    }
}

/// Result of an intake that landed stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeAction {
    UpdatedExisting,
    CreatedNew,
}
