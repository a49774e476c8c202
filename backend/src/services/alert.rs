//! Alert service

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    Alert, AlertFilter, AlertType, CreateAlertInput, OrderSummary, Priority, ProductSummary,
    UpdateAlertInput, WarehouseSummary,
};
use crate::services::{OrderService, ProductService, WarehouseService};

const ALERT_COLUMNS: &str = r#"
    id, title, message, type, priority, is_read, is_resolved, resolved_at,
    resolved_by, warehouse_id, product_id, order_id, created_at, updated_at
"#;

/// Alert service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// An alert with the resources it refers to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    #[serde(flatten)]
    pub alert: Alert,
    pub warehouse: Option<WarehouseSummary>,
    pub product: Option<ProductSummary>,
    pub order: Option<OrderSummary>,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List alerts, highest priority first and newest first within a priority
    pub async fn list(&self, filter: &AlertFilter) -> AppResult<Vec<AlertDetails>> {
        let alerts = sqlx::query_as::<_, Alert>(&format!(
            r#"
            SELECT {}
            FROM alerts
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::uuid IS NULL OR product_id = $2)
              AND ($3::alert_type IS NULL OR type = $3)
              AND ($4::priority_level IS NULL OR priority = $4)
              AND ($5::boolean IS NULL OR is_resolved = $5)
            ORDER BY priority DESC, created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(filter.warehouse_id)
        .bind(filter.product_id)
        .bind(filter.alert_type)
        .bind(filter.priority)
        .bind(filter.is_resolved)
        .fetch_all(&self.db)
        .await?;

        let warehouse_ids = collect_ids(&alerts, |a| a.warehouse_id);
        let product_ids = collect_ids(&alerts, |a| a.product_id);
        let order_ids = collect_ids(&alerts, |a| a.order_id);

        let warehouses = WarehouseService::new(self.db.clone())
            .summaries(&warehouse_ids)
            .await?;
        let products = ProductService::new(self.db.clone())
            .summaries(&product_ids)
            .await?;
        let orders = OrderService::new(self.db.clone())
            .summaries(&order_ids)
            .await?;

        Ok(alerts
            .into_iter()
            .map(|alert| AlertDetails {
                warehouse: alert.warehouse_id.and_then(|id| warehouses.get(&id).cloned()),
                product: alert.product_id.and_then(|id| products.get(&id).cloned()),
                order: alert.order_id.and_then(|id| orders.get(&id).cloned()),
                alert,
            })
            .collect())
    }

    /// Create an alert; priority defaults to medium
    pub async fn create(&self, input: CreateAlertInput) -> AppResult<Alert> {
        input.validate()?;

        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            INSERT INTO alerts (title, message, type, priority, warehouse_id, product_id, order_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.alert_type)
        .bind(input.priority.unwrap_or_default())
        .bind(input.warehouse_id)
        .bind(input.product_id)
        .bind(input.order_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Raised {} alert '{}' ({})",
            alert.priority.as_str(),
            alert.title,
            alert.id
        );

        Ok(alert)
    }

    /// Raise an alert from inside the platform
    pub async fn raise(
        &self,
        alert_type: AlertType,
        priority: Priority,
        title: &str,
        message: String,
        warehouse_id: Option<Uuid>,
        product_id: Option<Uuid>,
    ) -> AppResult<Alert> {
        self.create(CreateAlertInput {
            title: title.to_string(),
            message,
            alert_type,
            priority: Some(priority),
            warehouse_id,
            product_id,
            order_id: None,
        })
        .await
    }

    /// Mark an alert read and/or resolved
    pub async fn update(&self, id: Uuid, input: UpdateAlertInput) -> AppResult<Alert> {
        let mut alert = sqlx::query_as::<_, Alert>(&format!(
            "SELECT {} FROM alerts WHERE id = $1",
            ALERT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        alert.apply_update(&input, Utc::now());

        let alert = sqlx::query_as::<_, Alert>(&format!(
            r#"
            UPDATE alerts
            SET is_read = $2, is_resolved = $3, resolved_at = $4, resolved_by = $5
            WHERE id = $1
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(id)
        .bind(alert.is_read)
        .bind(alert.is_resolved)
        .bind(alert.resolved_at)
        .bind(&alert.resolved_by)
        .fetch_one(&self.db)
        .await?;

        Ok(alert)
    }

    /// Unresolved alerts per order, highest priority first
    pub async fn open_for_orders(&self, order_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Alert>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let alerts = sqlx::query_as::<_, Alert>(&format!(
            r#"
            SELECT {}
            FROM alerts
            WHERE order_id = ANY($1) AND NOT is_resolved
            ORDER BY priority DESC, created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(order_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(group_by(alerts, |a| a.order_id))
    }

    /// Unresolved alerts per product, newest first
    pub async fn open_for_products(
        &self,
        product_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<Alert>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let alerts = sqlx::query_as::<_, Alert>(&format!(
            r#"
            SELECT {}
            FROM alerts
            WHERE product_id = ANY($1) AND NOT is_resolved
            ORDER BY created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(product_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(group_by(alerts, |a| a.product_id))
    }
}

fn collect_ids(alerts: &[Alert], key: impl Fn(&Alert) -> Option<Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = alerts.iter().filter_map(key).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn group_by(alerts: Vec<Alert>, key: impl Fn(&Alert) -> Option<Uuid>) -> HashMap<Uuid, Vec<Alert>> {
    let mut grouped: HashMap<Uuid, Vec<Alert>> = HashMap::new();
    for alert in alerts {
        if let Some(id) = key(&alert) {
            grouped.entry(id).or_default().push(alert);
        }
    }
    grouped
}
