//! Order service: placing orders against warehouse capacity and name-based stock intake
//!
//! The steps of an order (alert, order row, capacity, stock) are separate
//! statements and are not wrapped in a transaction.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    classify_existing_stock, generate_order_number, normalize_product_name, order_total, Alert,
    AlertType, ExistingStock, IntakeAction, IntakeOrderInput, Order,
    OrderStatus, OrderSummary, PlaceOrderInput, Priority, Product, ProductStatus, ProductSummary,
    SpaceCheck, WarehouseSummary,
};
use crate::services::product::{expiry_for, NewProduct};
use crate::services::{AlertService, ProductService, WarehouseService};

/// Largest price the NUMERIC(12, 2) price columns hold
const MAX_UNIT_PRICE: Decimal = dec!(9999999999.99);
/// Largest total the NUMERIC(14, 2) `orders.total_cost` column holds
const MAX_ORDER_TOTAL: Decimal = dec!(999999999999.99);

/// Reject a client-supplied price the price columns cannot store
pub fn check_price(field: &str, price: Decimal) -> AppResult<Decimal> {
    if price.abs() > MAX_UNIT_PRICE {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: "Price is out of range".to_string(),
        });
    }
    Ok(price)
}

/// Total cost of an order line, rejected when it overflows or exceeds what
/// the orders table stores
pub fn line_total(quantity: i32, unit_cost: Decimal) -> AppResult<Decimal> {
    check_price("unitCost", unit_cost)?;
    order_total(quantity, unit_cost)
        .filter(|total| total.abs() <= MAX_ORDER_TOTAL)
        .ok_or_else(|| AppError::Validation {
            field: "unitCost".to_string(),
            message: "Order total is out of range".to_string(),
        })
}

pub(crate) const ORDER_COLUMNS: &str = r#"
    id, order_number, product_id, warehouse_id, quantity, unit_cost, total_cost,
    shelf_life_days, expected_expiry, status, requested_date, ml_recommended_date,
    ml_confidence, created_at, updated_at
"#;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Query filters for listing orders
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub warehouse_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// An order with its product, warehouse and open alerts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub product: Option<ProductSummary>,
    pub warehouse: Option<WarehouseSummary>,
    pub alerts: Vec<Alert>,
}

/// Body for an order that was placed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub success: bool,
    pub order: Order,
    pub message: String,
}

/// Body for stock that was received by name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReceipt {
    pub success: bool,
    pub message: String,
    pub order_id: Uuid,
    pub product: Product,
    pub action: IntakeAction,
}

/// Held stock reported when an intake is refused
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingProductInfo {
    pub id: Uuid,
    pub name: String,
    pub current_quantity: i32,
    pub days_until_expiry: i64,
    pub status: ProductStatus,
}

/// Body for an order the business rules refused.
///
/// Refusals are reported with a 200 status and `success: false`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRejection {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_space: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_space: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_product: Option<ExistingProductInfo>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl OrderRejection {
    pub fn insufficient_space(available: i32, required: i32, message: String) -> Self {
        Self {
            success: false,
            error: "Insufficient warehouse space".to_string(),
            available_space: Some(available),
            required_space: Some(required),
            existing_product: None,
            message,
            recommendation: None,
        }
    }

    /// Refusal for held stock that must be cleared first; `None` for fresh stock
    pub fn for_existing_stock(product: &Product, state: ExistingStock) -> Option<Self> {
        let (days, error, message, recommendation) = match state {
            ExistingStock::Fresh => return None,
            ExistingStock::ExpiresSoon { days_until_expiry } => (
                days_until_expiry,
                "Existing stock expires soon",
                format!(
                    "{} units of {} expire in {} days",
                    product.current_stock, product.name, days_until_expiry
                ),
                "Apply discount to existing stock before placing new order.",
            ),
            ExistingStock::Expired { days_until_expiry } => (
                days_until_expiry,
                "Dead stock detected",
                format!(
                    "{} units of {} expired {} days ago",
                    product.current_stock,
                    product.name,
                    -days_until_expiry
                ),
                "Liquidate or dispose of expired stock before placing new order.",
            ),
        };

        Some(Self {
            success: false,
            error: error.to_string(),
            available_space: None,
            required_space: None,
            existing_product: Some(ExistingProductInfo {
                id: product.id,
                name: product.name.clone(),
                current_quantity: product.current_stock,
                days_until_expiry: days,
                status: product.status,
            }),
            message,
            recommendation: Some(recommendation.to_string()),
        })
    }
}

/// Outcome of `POST /orders`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PlaceOrderOutcome {
    Placed(PlacedOrder),
    Rejected(OrderRejection),
}

/// Outcome of `POST /orders/intake`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IntakeOutcome {
    Received(IntakeReceipt),
    Rejected(OrderRejection),
}

/// Order row to insert
struct NewOrder {
    product_id: Uuid,
    warehouse_id: Uuid,
    quantity: i32,
    unit_cost: Decimal,
    total_cost: Decimal,
    shelf_life_days: i32,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List orders, newest request first
    pub async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<OrderDetails>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE ($1::uuid IS NULL OR warehouse_id = $1)
              AND ($2::uuid IS NULL OR product_id = $2)
              AND ($3::order_status IS NULL OR status = $3)
            ORDER BY requested_date DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(filter.warehouse_id)
        .bind(filter.product_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut product_ids: Vec<Uuid> = orders.iter().map(|o| o.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let mut warehouse_ids: Vec<Uuid> = orders.iter().map(|o| o.warehouse_id).collect();
        warehouse_ids.sort_unstable();
        warehouse_ids.dedup();

        let products = ProductService::new(self.db.clone())
            .summaries(&product_ids)
            .await?;
        let warehouses = WarehouseService::new(self.db.clone())
            .summaries(&warehouse_ids)
            .await?;
        let mut alerts = AlertService::new(self.db.clone())
            .open_for_orders(&order_ids)
            .await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                product: products.get(&order.product_id).cloned(),
                warehouse: warehouses.get(&order.warehouse_id).cloned(),
                alerts: alerts.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    /// Most recent orders per product, at most `limit` each
    pub async fn recent_by_product(&self, limit: i64) -> AppResult<HashMap<Uuid, Vec<Order>>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {}
            FROM (
                SELECT o.*, ROW_NUMBER() OVER (
                    PARTITION BY product_id ORDER BY requested_date DESC
                ) AS recency
                FROM orders o
            ) ranked
            WHERE recency <= $1
            ORDER BY requested_date DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Order>> = HashMap::new();
        for order in orders {
            grouped.entry(order.product_id).or_default().push(order);
        }
        Ok(grouped)
    }

    /// Place an order for an existing product.
    ///
    /// Short space raises a space constraint alert and refuses the order.
    pub async fn place(&self, input: PlaceOrderInput) -> AppResult<PlaceOrderOutcome> {
        input.validate()?;

        let (Some(product_id), Some(warehouse_id), Some(quantity), Some(shelf_life_days)) = (
            input.product_id,
            input.warehouse_id,
            input.quantity,
            input.shelf_life_days,
        ) else {
            return Err(AppError::Internal("validated order input incomplete".to_string()));
        };
        let total_cost = line_total(quantity, input.unit_cost)?;

        let warehouses = WarehouseService::new(self.db.clone());
        let warehouse = warehouses.get(warehouse_id).await?;
        let products = ProductService::new(self.db.clone());
        products.get(product_id).await?;

        if let SpaceCheck::Insufficient {
            available,
            required,
        } = warehouse.check_space(quantity)
        {
            let message = format!(
                "Cannot place order for {} units. Only {} units available in {}.",
                required, available, warehouse.location
            );
            AlertService::new(self.db.clone())
                .raise(
                    AlertType::SpaceConstraint,
                    Priority::High,
                    "Insufficient Warehouse Space",
                    message.clone(),
                    Some(warehouse.id),
                    None,
                )
                .await?;

            tracing::warn!(
                "Order refused for warehouse {}: {} units required, {} available",
                warehouse.id,
                required,
                available
            );

            return Ok(PlaceOrderOutcome::Rejected(
                OrderRejection::insufficient_space(available, required, message),
            ));
        }

        let order = self
            .insert(NewOrder {
                product_id,
                warehouse_id,
                quantity,
                unit_cost: input.unit_cost,
                total_cost,
                shelf_life_days,
            })
            .await?;

        warehouses.add_used_capacity(warehouse_id, quantity).await?;
        products
            .restock(product_id, quantity, shelf_life_days, false)
            .await?;

        Ok(PlaceOrderOutcome::Placed(PlacedOrder {
            success: true,
            message: format!("Order {} placed successfully", order.order_number),
            order,
        }))
    }

    /// Receive stock by product name, merging into held stock or creating a product
    pub async fn intake(&self, input: IntakeOrderInput) -> AppResult<IntakeOutcome> {
        input.validate()?;

        let (Some(product_name), Some(quantity), Some(shelf_life_days), Some(warehouse_id)) = (
            input.product_name.as_deref(),
            input.quantity,
            input.shelf_life_days,
            input.warehouse_id,
        ) else {
            return Err(AppError::Internal("validated intake input incomplete".to_string()));
        };
        let unit_cost = input.unit_cost.unwrap_or_default();
        let selling_price =
            check_price("sellingPrice", input.selling_price.unwrap_or_default())?;
        let total_cost = line_total(quantity, unit_cost)?;

        let product_name = normalize_product_name(product_name);
        if product_name.is_empty() {
            return Err(AppError::Validation {
                field: "productName".to_string(),
                message: "Product name is required".to_string(),
            });
        }

        let warehouses = WarehouseService::new(self.db.clone());
        let warehouse = warehouses.get(warehouse_id).await?;

        if let SpaceCheck::Insufficient {
            available,
            required,
        } = warehouse.check_space(quantity)
        {
            return Ok(IntakeOutcome::Rejected(OrderRejection::insufficient_space(
                available,
                required,
                format!(
                    "Only {} units of space left in {}. Clear dead stock before ordering.",
                    available, warehouse.location
                ),
            )));
        }

        let products = ProductService::new(self.db.clone());
        let existing = products
            .find_by_name_in_warehouse(&product_name, warehouse_id)
            .await?;

        let (product, action) = match existing {
            Some(existing) => {
                let state = classify_existing_stock(existing.expiry(Utc::now()).days_until_expiry);
                if let Some(rejection) = OrderRejection::for_existing_stock(&existing, state) {
                    tracing::info!(
                        "Intake of {} refused: {}",
                        existing.name,
                        rejection.error
                    );
                    return Ok(IntakeOutcome::Rejected(rejection));
                }

                let product = products
                    .restock(existing.id, quantity, shelf_life_days, true)
                    .await?;
                (product, IntakeAction::UpdatedExisting)
            }
            None => {
                let product = products
                    .create(NewProduct {
                        name: product_name,
                        warehouse_id,
                        quantity,
                        shelf_life_days,
                        cost_price: unit_cost,
                        selling_price,
                        category: input.category.clone(),
                        brand: input.brand.clone(),
                    })
                    .await?;
                (product, IntakeAction::CreatedNew)
            }
        };

        let order = self
            .insert(NewOrder {
                product_id: product.id,
                warehouse_id,
                quantity,
                unit_cost,
                total_cost,
                shelf_life_days,
            })
            .await?;

        warehouses.add_used_capacity(warehouse_id, quantity).await?;

        let message = match action {
            IntakeAction::UpdatedExisting => format!(
                "Added {} units to existing {} stock",
                quantity, product.name
            ),
            IntakeAction::CreatedNew => {
                format!("Created {} with {} units", product.name, quantity)
            }
        };

        Ok(IntakeOutcome::Received(IntakeReceipt {
            success: true,
            message,
            order_id: order.id,
            product,
            action,
        }))
    }

    async fn insert(&self, input: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let expected_expiry = expiry_for(now, input.shelf_life_days)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (
                order_number, product_id, warehouse_id, quantity, unit_cost, total_cost,
                shelf_life_days, expected_expiry, status, requested_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(generate_order_number(now))
        .bind(input.product_id)
        .bind(input.warehouse_id)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .bind(input.total_cost)
        .bind(input.shelf_life_days)
        .bind(expected_expiry)
        .bind(OrderStatus::Pending)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Placed order {} for {} units of product {}",
            order.order_number,
            order.quantity,
            order.product_id
        );

        Ok(order)
    }

    /// Summaries keyed by order ID, for embedding in alerts
    pub async fn summaries(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, OrderSummary>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderSummary>(
            "SELECT id, order_number, quantity, status FROM orders WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|o| (o.id, o)).collect())
    }
}
