//! Warehouse and capacity models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Product, ProductStatus};

/// A storage location with a unit capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Capacity in stock units
    pub total_capacity: i32,
    pub used_capacity: i32,
    pub manager_name: Option<String>,
    pub manager_email: Option<String>,
    pub manager_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Warehouse {
    pub fn available_capacity(&self) -> i32 {
        available_capacity(self.total_capacity, self.used_capacity)
    }

    pub fn utilization_percentage(&self) -> f64 {
        utilization_percentage(self.used_capacity, self.total_capacity)
    }

    pub fn check_space(&self, required: i32) -> SpaceCheck {
        check_space(self.total_capacity, self.used_capacity, required)
    }

    pub fn summary(&self) -> WarehouseSummary {
        WarehouseSummary {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
        }
    }
}

/// Compact warehouse reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
}

/// Per-warehouse product statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStats {
    pub total_products: i64,
    pub total_quantity: i64,
    pub low_shelf_life_count: i64,
    pub dead_stock_count: i64,
}

impl WarehouseStats {
    pub fn from_products<'a>(
        products: impl IntoIterator<Item = &'a Product>,
        now: DateTime<Utc>,
    ) -> Self {
        products
            .into_iter()
            .fold(Self::default(), |mut stats, product| {
                stats.total_products += 1;
                stats.total_quantity += i64::from(product.current_stock);
                if product.expiry(now).is_low_shelf_life {
                    stats.low_shelf_life_count += 1;
                }
                if product.status == ProductStatus::DeadStock {
                    stats.dead_stock_count += 1;
                }
                stats
            })
    }
}

/// Outcome of checking a warehouse for free space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceCheck {
    Available,
    Insufficient { available: i32, required: i32 },
}

impl SpaceCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, SpaceCheck::Available)
    }
}

pub fn available_capacity(total: i32, used: i32) -> i32 {
    total - used
}

/// Used capacity as a percentage of total; an empty warehouse definition reports 0
pub fn utilization_percentage(used: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    f64::from(used) / f64::from(total) * 100.0
}

pub fn check_space(total: i32, used: i32, required: i32) -> SpaceCheck {
    let available = available_capacity(total, used);
    if available < required {
        SpaceCheck::Insufficient {
            available,
            required,
        }
    } else {
        SpaceCheck::Available
    }
}

/// Input for creating a warehouse
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub total_capacity: i32,
    pub manager_name: Option<String>,
    #[validate(email)]
    pub manager_email: Option<String>,
    pub manager_phone: Option<String>,
}
