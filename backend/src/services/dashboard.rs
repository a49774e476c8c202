//! Dashboard aggregation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Order, Product, ProductStatus, ProductView, Warehouse, WarehouseSummary};
use crate::services::product::PRODUCT_COLUMNS;
use crate::services::{OrderService, WarehouseService};

/// Number of recent orders listed per product
pub const RECENT_ORDERS_PER_PRODUCT: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub warehouses: Vec<Warehouse>,
    pub products: Vec<DashboardProduct>,
    pub stats: DashboardStats,
    pub warehouse_utilization: Vec<WarehouseUtilization>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProduct {
    #[serde(flatten)]
    pub view: ProductView,
    pub warehouse: Option<WarehouseSummary>,
    pub orders: Vec<Order>,
}

/// Stock totals across all warehouses.
///
/// `low_shelf_life_count` counts products by days to expiry, while
/// `low_shelf_life_status_count` counts the stored status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_quantity: i64,
    pub low_shelf_life_count: i64,
    pub dead_stock_count: i64,
    pub healthy_count: i64,
    pub low_shelf_life_status_count: i64,
    pub at_risk_count: i64,
}

impl DashboardStats {
    pub fn from_products(products: &[Product], now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for product in products {
            stats.total_products += 1;
            stats.total_quantity += i64::from(product.current_stock);
            if product.expiry(now).is_low_shelf_life {
                stats.low_shelf_life_count += 1;
            }
            match product.status {
                ProductStatus::Healthy => stats.healthy_count += 1,
                ProductStatus::LowShelfLife => stats.low_shelf_life_status_count += 1,
                ProductStatus::AtRisk => stats.at_risk_count += 1,
                ProductStatus::DeadStock => stats.dead_stock_count += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseUtilization {
    pub id: Uuid,
    pub location: String,
    /// Rounded to a whole percent
    pub utilization_percentage: i64,
}

impl From<&Warehouse> for WarehouseUtilization {
    fn from(warehouse: &Warehouse) -> Self {
        Self {
            id: warehouse.id,
            location: warehouse.location.clone(),
            utilization_percentage: warehouse.utilization_percentage().round() as i64,
        }
    }
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn overview(&self) -> AppResult<DashboardResponse> {
        let warehouses = WarehouseService::new(self.db.clone()).list().await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY expiry_date ASC NULLS LAST, name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let mut orders = OrderService::new(self.db.clone())
            .recent_by_product(RECENT_ORDERS_PER_PRODUCT)
            .await?;

        let now = Utc::now();
        let stats = DashboardStats::from_products(&products, now);
        let summaries: HashMap<Uuid, WarehouseSummary> =
            warehouses.iter().map(|w| (w.id, w.summary())).collect();

        let products = products
            .into_iter()
            .map(|product| DashboardProduct {
                warehouse: summaries.get(&product.warehouse_id).cloned(),
                orders: orders.remove(&product.id).unwrap_or_default(),
                view: ProductView::new(product, now),
            })
            .collect();

        Ok(DashboardResponse {
            success: true,
            warehouse_utilization: warehouses.iter().map(WarehouseUtilization::from).collect(),
            warehouses,
            products,
            stats,
        })
    }
}
