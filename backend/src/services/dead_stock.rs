//! Dead stock service: listing at-risk stock, risk analysis and CSV export

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    assess, plan_recommendation, risk_alert_message, Alert, AlertType, NewRecommendation, Product,
    ProductStatus, Recommendation, RecommendationType, RiskInputs, WarehouseSummary,
    HIGH_RISK_THRESHOLD, RECENT_SALES_LIMIT, SALES_WINDOW_DAYS,
};
use crate::services::product::PRODUCT_COLUMNS;
use crate::services::{AlertService, ProductService, WarehouseService};

const RECOMMENDATION_COLUMNS: &str = r#"
    id, product_id, type, title, description, suggested_action, expected_impact,
    confidence, urgency, is_implemented, implemented_at, created_at
"#;

/// Dead stock service
#[derive(Clone)]
pub struct DeadStockService {
    db: PgPool,
}

/// Query parameters for the dead stock listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadStockQuery {
    pub warehouse_id: Option<Uuid>,
    pub format: Option<String>,
}

impl DeadStockQuery {
    pub fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }
}

/// A dead or at-risk product with its value at stake
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadStockItem {
    #[serde(flatten)]
    pub product: Product,
    pub warehouse: Option<WarehouseSummary>,
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<Alert>,
    pub days_until_expiry: Option<i64>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub potential_loss: Decimal,
    pub is_expired: bool,
}

impl DeadStockItem {
    pub fn new(
        product: Product,
        warehouse: Option<WarehouseSummary>,
        recommendations: Vec<Recommendation>,
        alerts: Vec<Alert>,
        now: DateTime<Utc>,
    ) -> Self {
        let expiry = product.expiry(now);
        let total_value = product.stock_value();
        let total_cost = product.stock_cost();
        Self {
            warehouse,
            recommendations,
            alerts,
            days_until_expiry: expiry.days_until_expiry,
            total_value,
            total_cost,
            potential_loss: total_value - total_cost,
            is_expired: expiry.is_expired,
            product,
        }
    }
}

/// Flat row for the CSV export
#[derive(Debug, Serialize)]
pub struct DeadStockCsvRow {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub warehouse: String,
    pub status: String,
    pub current_stock: i32,
    pub dead_stock_risk: Decimal,
    pub expiry_date: String,
    pub days_until_expiry: String,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub potential_loss: Decimal,
    pub open_recommendations: usize,
    pub open_alerts: usize,
}

impl From<&DeadStockItem> for DeadStockCsvRow {
    fn from(item: &DeadStockItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            sku: item.product.sku.clone().unwrap_or_default(),
            warehouse: item
                .warehouse
                .as_ref()
                .map(|w| w.location.clone())
                .unwrap_or_default(),
            status: item.product.status.as_str().to_string(),
            current_stock: item.product.current_stock,
            dead_stock_risk: item.product.dead_stock_risk,
            expiry_date: item
                .product
                .expiry_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            days_until_expiry: item
                .days_until_expiry
                .map(|d| d.to_string())
                .unwrap_or_default(),
            total_value: item.total_value,
            total_cost: item.total_cost,
            potential_loss: item.potential_loss,
            open_recommendations: item.recommendations.len(),
            open_alerts: item.alerts.len(),
        }
    }
}

/// Input for a risk analysis run
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeInput {
    #[validate(required)]
    pub warehouse_id: Option<Uuid>,
}

/// Per-product outcome of an analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub product_id: Uuid,
    pub product_name: String,
    pub dead_stock_risk: Decimal,
    pub status: ProductStatus,
    pub days_until_expiry: Option<i64>,
    pub alert_raised: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub success: bool,
    pub analyzed_products: usize,
    pub high_risk_products: usize,
    pub results: Vec<AnalysisResult>,
}

impl DeadStockService {
    /// Create a new DeadStockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Products that are dead stock, high risk or expired, riskiest first
    pub async fn list(&self, warehouse_id: Option<Uuid>) -> AppResult<Vec<DeadStockItem>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND (status = 'DEAD_STOCK' OR dead_stock_risk >= $2 OR expiry_date < NOW())
            ORDER BY dead_stock_risk DESC, expiry_date ASC NULLS LAST
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(warehouse_id)
        .bind(HIGH_RISK_THRESHOLD)
        .fetch_all(&self.db)
        .await?;

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let mut warehouse_ids: Vec<Uuid> = products.iter().map(|p| p.warehouse_id).collect();
        warehouse_ids.sort_unstable();
        warehouse_ids.dedup();

        let warehouses = WarehouseService::new(self.db.clone())
            .summaries(&warehouse_ids)
            .await?;
        let mut recommendations = self.open_recommendations(&product_ids).await?;
        let mut alerts = AlertService::new(self.db.clone())
            .open_for_products(&product_ids)
            .await?;

        let now = Utc::now();
        Ok(products
            .into_iter()
            .map(|product| {
                let warehouse = warehouses.get(&product.warehouse_id).cloned();
                let recs = recommendations.remove(&product.id).unwrap_or_default();
                let open_alerts = alerts.remove(&product.id).unwrap_or_default();
                DeadStockItem::new(product, warehouse, recs, open_alerts, now)
            })
            .collect())
    }

    /// Score every product in a warehouse, persist the scores and raise alerts
    /// and recommendations for high-risk stock
    pub async fn analyze(&self, input: AnalyzeInput) -> AppResult<AnalysisReport> {
        input.validate()?;
        let warehouse_id = input
            .warehouse_id
            .ok_or_else(|| AppError::MissingFields(vec!["warehouseId".to_string()]))?;

        // 404 for unknown warehouses
        WarehouseService::new(self.db.clone())
            .get(warehouse_id)
            .await?;

        let products_service = ProductService::new(self.db.clone());
        let products = products_service.list_by_warehouse(warehouse_id).await?;

        let now = Utc::now();
        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let sold_recently = self.sold_recently(&product_ids, now).await?;
        let open_recommendations = self.open_recommendations(&product_ids).await?;

        let alerts = AlertService::new(self.db.clone());
        let mut results = Vec::with_capacity(products.len());

        for product in &products {
            let inputs = RiskInputs::from_product(product, sold_recently.contains(&product.id), now);
            let assessment = assess(&inputs);

            products_service
                .record_assessment(product.id, &assessment, now)
                .await?;

            let alert_raised = assessment.is_high_risk();
            if alert_raised {
                alerts
                    .raise(
                        AlertType::DeadStockAlert,
                        assessment.alert_priority(),
                        "High Dead Stock Risk",
                        risk_alert_message(&product.name, assessment.score),
                        Some(product.warehouse_id),
                        Some(product.id),
                    )
                    .await?;
            }

            let mut recommendation = None;
            if !open_recommendations.contains_key(&product.id) {
                if let Some(plan) =
                    plan_recommendation(product, &assessment, inputs.days_until_expiry)
                {
                    recommendation = Some(plan.recommendation_type);
                    self.insert_recommendation(&plan).await?;
                }
            }

            results.push(AnalysisResult {
                product_id: product.id,
                product_name: product.name.clone(),
                dead_stock_risk: assessment.score,
                status: assessment.status,
                days_until_expiry: inputs.days_until_expiry,
                alert_raised,
                recommendation,
            });
        }

        let high_risk_products = results.iter().filter(|r| r.alert_raised).count();

        tracing::info!(
            "Analyzed {} products in warehouse {}: {} high risk",
            results.len(),
            warehouse_id,
            high_risk_products
        );

        Ok(AnalysisReport {
            success: true,
            analyzed_products: results.len(),
            high_risk_products,
            results,
        })
    }

    /// Products with a sale inside the sales window among their most recent sales
    async fn sold_recently(
        &self,
        product_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<HashSet<Uuid>> {
        if product_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let since = now - Duration::days(SALES_WINDOW_DAYS);
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT product_id
            FROM (
                SELECT product_id, sale_date,
                       ROW_NUMBER() OVER (PARTITION BY product_id ORDER BY sale_date DESC) AS recency
                FROM sales
                WHERE product_id = ANY($1)
            ) recent
            WHERE recency <= $2 AND sale_date >= $3
            "#,
        )
        .bind(product_ids)
        .bind(RECENT_SALES_LIMIT)
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Unimplemented recommendations per product, most urgent first
    async fn open_recommendations(
        &self,
        product_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Recommendation>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, Recommendation>(&format!(
            r#"
            SELECT {}
            FROM recommendations
            WHERE product_id = ANY($1) AND NOT is_implemented
            ORDER BY urgency DESC, created_at DESC
            "#,
            RECOMMENDATION_COLUMNS
        ))
        .bind(product_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Recommendation>> = HashMap::new();
        for rec in rows {
            grouped.entry(rec.product_id).or_default().push(rec);
        }
        Ok(grouped)
    }

    pub async fn insert_recommendation(&self, rec: &NewRecommendation) -> AppResult<Recommendation> {
        let recommendation = sqlx::query_as::<_, Recommendation>(&format!(
            r#"
            INSERT INTO recommendations (
                product_id, type, title, description, suggested_action,
                expected_impact, confidence, urgency
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            RECOMMENDATION_COLUMNS
        ))
        .bind(rec.product_id)
        .bind(rec.recommendation_type)
        .bind(&rec.title)
        .bind(&rec.description)
        .bind(&rec.suggested_action)
        .bind(rec.expected_impact)
        .bind(rec.confidence)
        .bind(rec.urgency)
        .fetch_one(&self.db)
        .await?;

        Ok(recommendation)
    }

    /// Export dead stock items to CSV format
    pub fn export_to_csv(items: &[DeadStockItem]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for item in items {
            wtr.serialize(DeadStockCsvRow::from(item))
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
