//! Product and stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::ExpiryInfo;

/// A stocked product held in one warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub current_stock: i32,
    pub min_stock_level: i32,
    pub max_stock_level: i32,
    pub shelf_life_days: i32,
    pub received_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// Probability-like score in [0, 1]
    pub dead_stock_risk: Decimal,
    pub status: ProductStatus,
    pub last_prediction: Option<DateTime<Utc>>,
    pub warehouse_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn expiry(&self, now: DateTime<Utc>) -> ExpiryInfo {
        ExpiryInfo::compute(self.expiry_date, now)
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            current_stock: self.current_stock,
            status: self.status,
        }
    }

    /// Retail value of the stock on hand
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.selling_price
    }

    /// Purchase cost of the stock on hand
    pub fn stock_cost(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.cost_price
    }
}

/// The product whose stock expires first; products without an expiry date come last
pub fn most_urgent(products: &[Product]) -> Option<&Product> {
    products
        .iter()
        .min_by_key(|p| (p.expiry_date.is_none(), p.expiry_date))
}

/// Lifecycle status of a product's stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "product_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Healthy,
    LowShelfLife,
    AtRisk,
    DeadStock,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Healthy => "HEALTHY",
            ProductStatus::LowShelfLife => "LOW_SHELF_LIFE",
            ProductStatus::AtRisk => "AT_RISK",
            ProductStatus::DeadStock => "DEAD_STOCK",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Healthy => write!(f, "Healthy"),
            ProductStatus::LowShelfLife => write!(f, "Low Shelf Life"),
            ProductStatus::AtRisk => write!(f, "At Risk"),
            ProductStatus::DeadStock => write!(f, "Dead Stock"),
        }
    }
}

/// Compact product reference embedded in orders and alerts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub current_stock: i32,
    pub status: ProductStatus,
}

/// A product with its expiry fields computed at response time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub days_until_expiry: Option<i64>,
    pub is_expired: bool,
}

impl ProductView {
    pub fn new(product: Product, now: DateTime<Utc>) -> Self {
        let expiry = product.expiry(now);
        Self {
            product,
            days_until_expiry: expiry.days_until_expiry,
            is_expired: expiry.is_expired,
        }
    }
}
