//! Order and analysis workflow tests against Postgres
//!
//! Each test gets a fresh database with the migrations applied
//! (`DATABASE_URL` must point at a server the tests may create databases on).
//!
//! Tests for:
//! - Placing orders: space alerts, capacity and stock updates
//! - Intake by name: new products, restocks, refusals for held stock
//! - Risk analysis: persisted scores, alerts and recommendations

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use wim_backend::error::AppError;
use wim_backend::models::{
    AlertFilter, AlertType, CreateWarehouseInput, IntakeAction, IntakeOrderInput, OrderStatus,
    PlaceOrderInput, Priority, ProductStatus, RecommendationType,
};
use wim_backend::services::dead_stock::AnalyzeInput;
use wim_backend::services::order::{IntakeOutcome, OrderFilter, PlaceOrderOutcome};
use wim_backend::services::product::NewProduct;
use wim_backend::services::{
    AlertService, DeadStockService, OrderService, ProductService, WarehouseService,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn warehouse(pool: &PgPool, total: i32, used: i32) -> Uuid {
    let service = WarehouseService::new(pool.clone());
    let warehouse = service
        .create(CreateWarehouseInput {
            name: "Main Distribution Center".to_string(),
            location: "Main Warehouse - New York".to_string(),
            address: None,
            city: Some("New York".to_string()),
            country: Some("USA".to_string()),
            total_capacity: total,
            manager_name: None,
            manager_email: None,
            manager_phone: None,
        })
        .await
        .unwrap();
    if used > 0 {
        service.add_used_capacity(warehouse.id, used).await.unwrap();
    }
    warehouse.id
}

/// Product expiring `expires_in_days` from now with the given stored status
async fn product(
    pool: &PgPool,
    warehouse_id: Uuid,
    name: &str,
    stock: i32,
    expires_in_days: i64,
    status: ProductStatus,
) -> Uuid {
    let created = ProductService::new(pool.clone())
        .create(NewProduct {
            name: name.to_string(),
            warehouse_id,
            quantity: stock,
            shelf_life_days: 7,
            cost_price: dec("1.20"),
            selling_price: dec("2.49"),
            category: Some("Dairy".to_string()),
            brand: None,
        })
        .await
        .unwrap();

    sqlx::query("UPDATE products SET expiry_date = $2, status = $3 WHERE id = $1")
        .bind(created.id)
        .bind(Utc::now() + Duration::days(expires_in_days))
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    created.id
}

async fn used_capacity(pool: &PgPool, id: Uuid) -> i32 {
    WarehouseService::new(pool.clone())
        .get(id)
        .await
        .unwrap()
        .used_capacity
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

fn place_input(product_id: Uuid, warehouse_id: Uuid, quantity: i32) -> PlaceOrderInput {
    PlaceOrderInput {
        product_id: Some(product_id),
        warehouse_id: Some(warehouse_id),
        quantity: Some(quantity),
        shelf_life_days: Some(14),
        unit_cost: dec("1.25"),
    }
}

fn intake_input(name: &str, warehouse_id: Uuid, quantity: i32) -> IntakeOrderInput {
    IntakeOrderInput {
        product_name: Some(name.to_string()),
        quantity: Some(quantity),
        shelf_life_days: Some(10),
        warehouse_id: Some(warehouse_id),
        unit_cost: Some(dec("0.90")),
        selling_price: Some(dec("1.99")),
        category: Some("Dairy".to_string()),
        brand: Some("Valley Farms".to_string()),
    }
}

// ============================================================================
// Placing orders
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_place_without_space_raises_alert(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 100, 95).await;
    let product_id = product(&pool, warehouse_id, "Fresh Milk", 10, 30, ProductStatus::Healthy).await;

    let outcome = OrderService::new(pool.clone())
        .place(place_input(product_id, warehouse_id, 20))
        .await
        .unwrap();

    let PlaceOrderOutcome::Rejected(rejection) = outcome else {
        panic!("order should have been refused");
    };
    assert_eq!(rejection.available_space, Some(5));
    assert_eq!(rejection.required_space, Some(20));

    let alerts = AlertService::new(pool.clone())
        .list(&AlertFilter {
            alert_type: Some(AlertType::SpaceConstraint),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert.priority, Priority::High);
    assert_eq!(alerts[0].alert.title, "Insufficient Warehouse Space");
    assert_eq!(alerts[0].alert.warehouse_id, Some(warehouse_id));

    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(used_capacity(&pool, warehouse_id).await, 95);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_place_updates_stock_and_capacity(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 100).await;
    let product_id = product(&pool, warehouse_id, "Fresh Milk", 40, 2, ProductStatus::AtRisk).await;

    let outcome = OrderService::new(pool.clone())
        .place(place_input(product_id, warehouse_id, 60))
        .await
        .unwrap();

    let PlaceOrderOutcome::Placed(placed) = outcome else {
        panic!("order should have been placed");
    };
    assert!(placed.order.order_number.starts_with("ORD-"));
    assert_eq!(placed.order.total_cost, dec("75.00"));
    assert_eq!(placed.order.status, OrderStatus::Pending);

    assert_eq!(used_capacity(&pool, warehouse_id).await, 160);

    let product = ProductService::new(pool.clone()).get(product_id).await.unwrap();
    assert_eq!(product.current_stock, 100);
    assert_eq!(product.expiry(Utc::now()).days_until_expiry, Some(14));
    // Placing against a product id keeps the stored status
    assert_eq!(product.status, ProductStatus::AtRisk);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_place_unknown_product(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 0).await;

    let err = OrderService::new(pool.clone())
        .place(place_input(Uuid::new_v4(), warehouse_id, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(used_capacity(&pool, warehouse_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_place_with_overflowing_cost(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 100_000, 0).await;
    let product_id = product(&pool, warehouse_id, "Fresh Milk", 10, 30, ProductStatus::Healthy).await;

    let mut input = place_input(product_id, warehouse_id, 10_000);
    input.unit_cost = Decimal::from_scientific("1e25").unwrap();

    let err = OrderService::new(pool.clone()).place(input).await.unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "unitCost"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(count(&pool, "orders").await, 0);
}

// ============================================================================
// Intake by name
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_intake_creates_new_product(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 0).await;

    let outcome = OrderService::new(pool.clone())
        .intake(intake_input("  Greek   Yogurt ", warehouse_id, 120))
        .await
        .unwrap();

    let IntakeOutcome::Received(receipt) = outcome else {
        panic!("intake should have been received");
    };
    assert_eq!(receipt.action, IntakeAction::CreatedNew);
    assert_eq!(receipt.product.name, "Greek Yogurt");
    assert_eq!(receipt.product.current_stock, 120);
    assert_eq!(receipt.product.status, ProductStatus::Healthy);
    assert_eq!(receipt.product.cost_price, dec("0.90"));

    let orders = OrderService::new(pool.clone())
        .list(&OrderFilter::default())
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.id, receipt.order_id);
    assert_eq!(orders[0].order.product_id, receipt.product.id);

    assert_eq!(used_capacity(&pool, warehouse_id).await, 120);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_intake_restocks_and_resets_status(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 50).await;
    let product_id = product(&pool, warehouse_id, "Fresh Milk", 50, 30, ProductStatus::AtRisk).await;

    let outcome = OrderService::new(pool.clone())
        .intake(intake_input("fresh milk", warehouse_id, 25))
        .await
        .unwrap();

    let IntakeOutcome::Received(receipt) = outcome else {
        panic!("intake should have been received");
    };
    assert_eq!(receipt.action, IntakeAction::UpdatedExisting);
    assert_eq!(receipt.product.id, product_id);
    assert_eq!(receipt.product.current_stock, 75);
    assert_eq!(receipt.product.status, ProductStatus::Healthy);
    assert_eq!(receipt.product.expiry(Utc::now()).days_until_expiry, Some(10));

    assert_eq!(count(&pool, "products").await, 1);
    assert_eq!(used_capacity(&pool, warehouse_id).await, 75);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_intake_refuses_stock_expiring_soon(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 200).await;
    product(&pool, warehouse_id, "Fresh Milk", 200, 3, ProductStatus::LowShelfLife).await;

    let outcome = OrderService::new(pool.clone())
        .intake(intake_input("Fresh Milk", warehouse_id, 100))
        .await
        .unwrap();

    let IntakeOutcome::Rejected(rejection) = outcome else {
        panic!("intake should have been refused");
    };
    assert_eq!(rejection.error, "Existing stock expires soon");
    let existing = rejection.existing_product.unwrap();
    assert_eq!(existing.current_quantity, 200);
    assert_eq!(existing.days_until_expiry, 3);

    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(used_capacity(&pool, warehouse_id).await, 200);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_intake_refuses_expired_stock(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 50).await;
    product(&pool, warehouse_id, "Artisan Bread", 50, -2, ProductStatus::DeadStock).await;

    let outcome = OrderService::new(pool.clone())
        .intake(intake_input("Artisan Bread", warehouse_id, 30))
        .await
        .unwrap();

    let IntakeOutcome::Rejected(rejection) = outcome else {
        panic!("intake should have been refused");
    };
    assert_eq!(rejection.error, "Dead stock detected");
    assert_eq!(count(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_intake_without_space_writes_nothing(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 100, 90).await;

    let outcome = OrderService::new(pool.clone())
        .intake(intake_input("Organic Bananas", warehouse_id, 30))
        .await
        .unwrap();

    assert!(matches!(outcome, IntakeOutcome::Rejected(_)));
    assert_eq!(count(&pool, "products").await, 0);
    // Only placing an order raises the space alert
    assert_eq!(count(&pool, "alerts").await, 0);
}

// ============================================================================
// Risk analysis
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_analysis_persists_scores_and_alerts(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 0).await;
    let expired = product(&pool, warehouse_id, "Artisan Bread", 50, -1, ProductStatus::Healthy).await;
    let fresh = product(&pool, warehouse_id, "Canned Tomatoes", 5, 300, ProductStatus::Healthy).await;
    sqlx::query(
        "INSERT INTO sales (product_id, quantity_sold, unit_price, total_revenue, sale_date)
         VALUES ($1, 2, 2.49, 4.98, NOW() - INTERVAL '1 day')",
    )
    .bind(fresh)
    .execute(&pool)
    .await
    .unwrap();

    let report = DeadStockService::new(pool.clone())
        .analyze(AnalyzeInput {
            warehouse_id: Some(warehouse_id),
        })
        .await
        .unwrap();

    assert_eq!(report.analyzed_products, 2);
    assert_eq!(report.high_risk_products, 1);

    let bread = report.results.iter().find(|r| r.product_id == expired).unwrap();
    assert_eq!(bread.dead_stock_risk, Decimal::ONE);
    assert_eq!(bread.status, ProductStatus::DeadStock);
    assert_eq!(bread.recommendation, Some(RecommendationType::Liquidate));

    let tomatoes = report.results.iter().find(|r| r.product_id == fresh).unwrap();
    assert_eq!(tomatoes.status, ProductStatus::Healthy);
    assert!(!tomatoes.alert_raised);

    let products = ProductService::new(pool.clone());
    let stored = products.get(expired).await.unwrap();
    assert_eq!(stored.status, ProductStatus::DeadStock);
    assert_eq!(stored.dead_stock_risk, Decimal::ONE);
    assert!(stored.last_prediction.is_some());
    assert!(products.get(fresh).await.unwrap().last_prediction.is_some());

    let alerts = AlertService::new(pool.clone())
        .list(&AlertFilter {
            product_id: Some(expired),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert.alert_type, AlertType::DeadStockAlert);
    assert_eq!(alerts[0].alert.priority, Priority::Critical);
    assert_eq!(
        alerts[0].alert.message,
        "Artisan Bread has a 100.0% risk of becoming dead stock"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_analysis_keeps_one_open_recommendation(pool: PgPool) {
    let warehouse_id = warehouse(&pool, 1000, 0).await;
    let expired = product(&pool, warehouse_id, "Greek Yogurt", 120, -4, ProductStatus::Healthy).await;

    let service = DeadStockService::new(pool.clone());
    let analyze = || {
        service.analyze(AnalyzeInput {
            warehouse_id: Some(warehouse_id),
        })
    };

    let first = analyze().await.unwrap();
    assert_eq!(first.results[0].recommendation, Some(RecommendationType::Liquidate));

    let second = analyze().await.unwrap();
    assert_eq!(second.results[0].recommendation, None);

    let open = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM recommendations WHERE product_id = $1 AND NOT is_implemented",
    )
    .bind(expired)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open, 1);
    // Each run still raises its own alert
    assert_eq!(count(&pool, "alerts").await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_analysis_unknown_warehouse(pool: PgPool) {
    let err = DeadStockService::new(pool.clone())
        .analyze(AnalyzeInput {
            warehouse_id: Some(Uuid::new_v4()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
