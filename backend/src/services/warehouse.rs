//! Warehouse service: capacity bookkeeping and per-warehouse stock statistics

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CreateWarehouseInput, Product, Warehouse, WarehouseStats, WarehouseSummary};
use crate::services::product::PRODUCT_COLUMNS;

pub(crate) const WAREHOUSE_COLUMNS: &str = r#"
    id, name, location, address, city, country, total_capacity, used_capacity,
    manager_name, manager_email, manager_phone, created_at, updated_at
"#;

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// A warehouse with derived capacity figures and product statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseOverview {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub available_capacity: i32,
    pub utilization_percentage: f64,
    pub stats: WarehouseStats,
}

impl WarehouseOverview {
    pub fn new(warehouse: Warehouse, products: &[Product]) -> Self {
        Self {
            available_capacity: warehouse.available_capacity(),
            utilization_percentage: warehouse.utilization_percentage(),
            stats: WarehouseStats::from_products(products, Utc::now()),
            warehouse,
        }
    }
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List every warehouse with its stats
    pub async fn list_overviews(&self) -> AppResult<Vec<WarehouseOverview>> {
        let warehouses = self.list().await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        let mut by_warehouse: HashMap<Uuid, Vec<Product>> = HashMap::new();
        for product in products {
            by_warehouse
                .entry(product.warehouse_id)
                .or_default()
                .push(product);
        }

        Ok(warehouses
            .into_iter()
            .map(|w| {
                let products = by_warehouse.remove(&w.id).unwrap_or_default();
                WarehouseOverview::new(w, &products)
            })
            .collect())
    }

    /// Get one warehouse with its stats
    pub async fn get_overview(&self, id: Uuid) -> AppResult<WarehouseOverview> {
        let warehouse = self.get(id).await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE warehouse_id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(WarehouseOverview::new(warehouse, &products))
    }

    /// Get a warehouse by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {} FROM warehouses WHERE id = $1",
            WAREHOUSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// List warehouses without any joins, ordered by name
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {} FROM warehouses ORDER BY name",
            WAREHOUSE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(warehouses)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// Create a warehouse; used capacity starts at zero
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;

        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            INSERT INTO warehouses (
                name, location, address, city, country, total_capacity,
                manager_name, manager_email, manager_phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            WAREHOUSE_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(input.location.trim())
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.country)
        .bind(input.total_capacity)
        .bind(&input.manager_name)
        .bind(&input.manager_email)
        .bind(&input.manager_phone)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created warehouse {} ({})", warehouse.name, warehouse.id);

        Ok(warehouse)
    }

    /// Add received units to a warehouse's used capacity
    pub async fn add_used_capacity(&self, id: Uuid, quantity: i32) -> AppResult<()> {
        sqlx::query("UPDATE warehouses SET used_capacity = used_capacity + $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Summaries keyed by warehouse ID, for embedding in other resources
    pub async fn summaries(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, WarehouseSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, WarehouseSummary>(
            "SELECT id, name, location FROM warehouses WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|w| (w.id, w)).collect())
    }
}
