//! Product service: listing, name lookup and stock movements

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    expiry_from_shelf_life, most_urgent, Product, ProductStatus, ProductSummary, ProductView,
    RiskAssessment,
};

pub(crate) const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, description, category, brand, cost_price, selling_price,
    current_stock, min_stock_level, max_stock_level, shelf_life_days,
    received_date, expiry_date, dead_stock_risk, status, last_prediction,
    warehouse_id, created_at, updated_at
"#;

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Query filters for listing products
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub warehouse_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

/// A product to insert when stock arrives under a name not held yet
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub warehouse_id: Uuid,
    pub quantity: i32,
    pub shelf_life_days: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub category: Option<String>,
    pub brand: Option<String>,
}

/// Result of a name lookup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLookupResponse {
    pub success: bool,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductLookup>,
}

/// The most urgent product matching a name, with stock summed over all matches
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLookup {
    pub id: Uuid,
    pub name: String,
    pub current_quantity: i64,
    pub oldest_expiry: Option<DateTime<Utc>>,
    pub days_until_expiry: Option<i64>,
    pub status: ProductStatus,
    pub is_expired: bool,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub warehouses: Vec<ProductLocation>,
}

/// Where a matching product is stocked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLocation {
    pub id: Uuid,
    pub location: String,
    pub quantity: i32,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Row for the lookup query
#[derive(Debug, FromRow)]
struct LocatedProduct {
    #[sqlx(flatten)]
    product: Product,
    warehouse_location: String,
}

impl ProductLookup {
    /// Build the lookup from every product matching the name.
    ///
    /// Returns `None` when nothing matched.
    pub fn from_matches(matches: &[(Product, String)], now: DateTime<Utc>) -> Option<Self> {
        let products: Vec<Product> = matches.iter().map(|(p, _)| p.clone()).collect();
        let urgent = most_urgent(&products)?;
        let expiry = urgent.expiry(now);

        Some(Self {
            id: urgent.id,
            name: urgent.name.clone(),
            current_quantity: products.iter().map(|p| i64::from(p.current_stock)).sum(),
            oldest_expiry: urgent.expiry_date,
            days_until_expiry: expiry.days_until_expiry,
            status: urgent.status,
            is_expired: expiry.is_expired,
            cost_price: urgent.cost_price,
            selling_price: urgent.selling_price,
            category: urgent.category.clone(),
            brand: urgent.brand.clone(),
            warehouses: matches
                .iter()
                .map(|(p, location)| ProductLocation {
                    id: p.warehouse_id,
                    location: location.clone(),
                    quantity: p.current_stock,
                    expiry_date: p.expiry_date,
                })
                .collect(),
        })
    }
}

/// Expiry for stock received at `received`, or a validation error when the
/// shelf life runs past the representable date range
pub fn expiry_for(received: DateTime<Utc>, shelf_life_days: i32) -> AppResult<DateTime<Utc>> {
    expiry_from_shelf_life(received, shelf_life_days).ok_or_else(|| AppError::Validation {
        field: "shelfLifeDays".to_string(),
        message: "Shelf life is out of range".to_string(),
    })
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products, soonest expiry first
    pub async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<ProductView>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::product_status IS NULL OR status = $2)
            ORDER BY expiry_date ASC NULLS LAST, name
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(filter.warehouse_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        let now = Utc::now();
        Ok(products
            .into_iter()
            .map(|p| ProductView::new(p, now))
            .collect())
    }

    /// Get a product by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn list_by_warehouse(&self, warehouse_id: Uuid) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE warehouse_id = $1 ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Case-insensitive contains search across all warehouses
    pub async fn lookup_by_name(&self, name: &str) -> AppResult<ProductLookupResponse> {
        let pattern = format!("%{}%", escape_like(name.trim()));

        let rows = sqlx::query_as::<_, LocatedProduct>(
            r#"
            SELECT p.id, p.sku, p.name, p.description, p.category, p.brand,
                   p.cost_price, p.selling_price, p.current_stock, p.min_stock_level,
                   p.max_stock_level, p.shelf_life_days, p.received_date, p.expiry_date,
                   p.dead_stock_risk, p.status, p.last_prediction, p.warehouse_id,
                   p.created_at, p.updated_at,
                   w.location AS warehouse_location
            FROM products p
            JOIN warehouses w ON w.id = p.warehouse_id
            WHERE p.name ILIKE $1
            ORDER BY p.expiry_date ASC NULLS LAST
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        let matches: Vec<(Product, String)> = rows
            .into_iter()
            .map(|r| (r.product, r.warehouse_location))
            .collect();

        Ok(match ProductLookup::from_matches(&matches, Utc::now()) {
            Some(product) => ProductLookupResponse {
                success: true,
                found: true,
                message: None,
                product: Some(product),
            },
            None => ProductLookupResponse {
                success: true,
                found: false,
                message: Some(format!("No product found matching \"{}\"", name.trim())),
                product: None,
            },
        })
    }

    /// Find a product by case-insensitive exact name within one warehouse
    pub async fn find_by_name_in_warehouse(
        &self,
        name: &str,
        warehouse_id: Uuid,
    ) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE LOWER(name) = LOWER($1) AND warehouse_id = $2
            ORDER BY expiry_date ASC NULLS LAST
            LIMIT 1
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(name)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    /// Insert a product for newly received stock
    pub async fn create(&self, input: NewProduct) -> AppResult<Product> {
        let now = Utc::now();
        let expiry = expiry_for(now, input.shelf_life_days)?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                name, category, brand, cost_price, selling_price, current_stock,
                shelf_life_days, received_date, expiry_date, status, warehouse_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'HEALTHY', $10)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.brand)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.quantity)
        .bind(input.shelf_life_days)
        .bind(now)
        .bind(expiry)
        .bind(input.warehouse_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created product {} ({})", product.name, product.id);

        Ok(product)
    }

    /// Add received units to a product and restart its shelf life.
    ///
    /// With `reset_status` the product is marked healthy again.
    pub async fn restock(
        &self,
        id: Uuid,
        quantity: i32,
        shelf_life_days: i32,
        reset_status: bool,
    ) -> AppResult<Product> {
        let now = Utc::now();
        let expiry = expiry_for(now, shelf_life_days)?;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET current_stock = current_stock + $2,
                received_date = $3,
                expiry_date = $4,
                status = CASE WHEN $5 THEN 'HEALTHY'::product_status ELSE status END
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(quantity)
        .bind(now)
        .bind(expiry)
        .bind(reset_status)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Persist the outcome of a risk analysis
    pub async fn record_assessment(
        &self,
        id: Uuid,
        assessment: &RiskAssessment,
        analyzed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET dead_stock_risk = $2, status = $3, last_prediction = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(assessment.score)
        .bind(assessment.status)
        .bind(analyzed_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Summaries keyed by product ID, for embedding in other resources
    pub async fn summaries(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, ProductSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProductSummary>(
            "SELECT id, name, sku, current_stock, status FROM products WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|p| (p.id, p)).collect())
    }
}
