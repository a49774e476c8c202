//! Sales records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded sale of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity_sold: i32,
    pub unit_price: Decimal,
    pub total_revenue: Decimal,
    pub profit: Decimal,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub sale_date: DateTime<Utc>,
}
