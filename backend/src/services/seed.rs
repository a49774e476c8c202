//! Demo data for local development
//!
//! Creates:
//! - 2 warehouses
//! - 6 products (fresh, long-life and expired)
//! - 2 orders, 3 alerts, 3 recommendations and 2 sales

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::order::line_total;
use crate::models::{
    generate_order_number, AlertType, OrderStatus, Priority, ProductStatus,
    RecommendationType,
};

struct SeedWarehouse {
    name: &'static str,
    location: &'static str,
    city: &'static str,
    total_capacity: i32,
    manager_name: &'static str,
}

struct SeedProduct {
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    brand: &'static str,
    cost_price: Decimal,
    selling_price: Decimal,
    current_stock: i32,
    shelf_life_days: i32,
    /// Days from now until expiry; negative for expired stock
    expires_in_days: i64,
    status: ProductStatus,
    dead_stock_risk: Decimal,
    warehouse: usize,
}

const WAREHOUSES: [SeedWarehouse; 2] = [
    SeedWarehouse {
        name: "Main Distribution Center",
        location: "Main Warehouse - New York",
        city: "New York",
        total_capacity: 10_000,
        manager_name: "Dana Whitfield",
    },
    SeedWarehouse {
        name: "West Coast Hub",
        location: "West Hub - Los Angeles",
        city: "Los Angeles",
        total_capacity: 5_000,
        manager_name: "Luis Moreno",
    },
];

fn products() -> [SeedProduct; 6] {
    [
        SeedProduct {
            sku: "DAIRY-MILK-001",
            name: "Fresh Milk",
            category: "Dairy",
            brand: "Valley Farms",
            cost_price: dec!(1.20),
            selling_price: dec!(2.49),
            current_stock: 200,
            shelf_life_days: 7,
            expires_in_days: 3,
            status: ProductStatus::LowShelfLife,
            dead_stock_risk: dec!(0.4),
            warehouse: 0,
        },
        SeedProduct {
            sku: "BAKE-BREAD-001",
            name: "Artisan Bread",
            category: "Bakery",
            brand: "Stone Oven",
            cost_price: dec!(1.50),
            selling_price: dec!(3.99),
            current_stock: 50,
            shelf_life_days: 4,
            expires_in_days: -1,
            status: ProductStatus::DeadStock,
            dead_stock_risk: dec!(1.0),
            warehouse: 0,
        },
        SeedProduct {
            sku: "CAN-TOM-001",
            name: "Canned Tomatoes",
            category: "Pantry",
            brand: "Sunripe",
            cost_price: dec!(0.60),
            selling_price: dec!(1.29),
            current_stock: 500,
            shelf_life_days: 365,
            expires_in_days: 300,
            status: ProductStatus::Healthy,
            dead_stock_risk: dec!(0.0),
            warehouse: 0,
        },
        SeedProduct {
            sku: "PROD-BAN-001",
            name: "Organic Bananas",
            category: "Produce",
            brand: "Green Leaf",
            cost_price: dec!(0.35),
            selling_price: dec!(0.79),
            current_stock: 300,
            shelf_life_days: 6,
            expires_in_days: 2,
            status: ProductStatus::AtRisk,
            dead_stock_risk: dec!(0.6),
            warehouse: 1,
        },
        SeedProduct {
            sku: "FRZ-VEG-001",
            name: "Frozen Vegetables",
            category: "Frozen",
            brand: "Polar Harvest",
            cost_price: dec!(1.10),
            selling_price: dec!(2.99),
            current_stock: 150,
            shelf_life_days: 180,
            expires_in_days: 170,
            status: ProductStatus::Healthy,
            dead_stock_risk: dec!(0.0),
            warehouse: 1,
        },
        SeedProduct {
            sku: "DAIRY-YOG-001",
            name: "Greek Yogurt",
            category: "Dairy",
            brand: "Valley Farms",
            cost_price: dec!(0.90),
            selling_price: dec!(1.99),
            current_stock: 120,
            shelf_life_days: 21,
            expires_in_days: -4,
            status: ProductStatus::DeadStock,
            dead_stock_risk: dec!(0.9),
            warehouse: 1,
        },
    ]
}

/// Counts of what was inserted
#[derive(Debug, Default, Serialize)]
pub struct SeedSummary {
    pub warehouses: usize,
    pub products: usize,
    pub orders: usize,
    pub alerts: usize,
    pub recommendations: usize,
    pub sales: usize,
}

/// Remove all rows from every table
pub async fn reset(db: &PgPool) -> AppResult<()> {
    sqlx::query(
        "TRUNCATE sales, recommendations, alerts, orders, products, warehouses RESTART IDENTITY CASCADE",
    )
    .execute(db)
    .await?;
    info!("Cleared existing data");
    Ok(())
}

/// Insert the demo data set
pub async fn seed_database(db: &PgPool) -> AppResult<SeedSummary> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    let mut warehouse_ids = Vec::with_capacity(WAREHOUSES.len());
    for w in &WAREHOUSES {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO warehouses (name, location, city, country, total_capacity, manager_name)
            VALUES ($1, $2, $3, 'USA', $4, $5)
            RETURNING id
            "#,
        )
        .bind(w.name)
        .bind(w.location)
        .bind(w.city)
        .bind(w.total_capacity)
        .bind(w.manager_name)
        .fetch_one(db)
        .await?;
        warehouse_ids.push(id);
        summary.warehouses += 1;
    }
    info!("  Created {} warehouses", summary.warehouses);

    let mut product_ids = Vec::new();
    for p in products() {
        let expiry = now + Duration::days(p.expires_in_days);
        let received = expiry - Duration::days(i64::from(p.shelf_life_days));
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (
                sku, name, category, brand, cost_price, selling_price, current_stock,
                min_stock_level, max_stock_level, shelf_life_days, received_date,
                expiry_date, dead_stock_risk, status, warehouse_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 10, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(p.sku)
        .bind(p.name)
        .bind(p.category)
        .bind(p.brand)
        .bind(p.cost_price)
        .bind(p.selling_price)
        .bind(p.current_stock)
        .bind(p.current_stock * 2)
        .bind(p.shelf_life_days)
        .bind(received)
        .bind(expiry)
        .bind(p.dead_stock_risk)
        .bind(p.status)
        .bind(warehouse_ids[p.warehouse])
        .fetch_one(db)
        .await?;
        product_ids.push((id, p));
        summary.products += 1;
    }
    info!("  Created {} products", summary.products);

    // Orders for the milk and the canned tomatoes
    for (offset, (product_id, p), status) in [
        (2, &product_ids[0], OrderStatus::Delivered),
        (5, &product_ids[2], OrderStatus::Confirmed),
    ] {
        let requested = now - Duration::days(offset);
        sqlx::query(
            r#"
            INSERT INTO orders (
                order_number, product_id, warehouse_id, quantity, unit_cost, total_cost,
                shelf_life_days, expected_expiry, status, requested_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(generate_order_number(requested))
        .bind(product_id)
        .bind(warehouse_ids[p.warehouse])
        .bind(p.current_stock)
        .bind(p.cost_price)
        .bind(line_total(p.current_stock, p.cost_price)?)
        .bind(p.shelf_life_days)
        .bind(requested + Duration::days(i64::from(p.shelf_life_days)))
        .bind(status)
        .bind(requested)
        .execute(db)
        .await?;
        summary.orders += 1;
    }
    info!("  Created {} orders", summary.orders);

    let alerts = [
        (
            "Product Expiring Soon",
            "Fresh Milk expires in 3 days".to_string(),
            AlertType::ShelfLifeWarning,
            Priority::High,
            0,
        ),
        (
            "Dead Stock Detected",
            "Artisan Bread has passed its expiry date".to_string(),
            AlertType::DeadStockAlert,
            Priority::Critical,
            1,
        ),
        (
            "Product Expiring Soon",
            "Organic Bananas expire in 2 days".to_string(),
            AlertType::ShelfLifeWarning,
            Priority::Medium,
            3,
        ),
    ];
    for (title, message, alert_type, priority, index) in alerts {
        let (product_id, p) = &product_ids[index];
        sqlx::query(
            r#"
            INSERT INTO alerts (title, message, type, priority, warehouse_id, product_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(title)
        .bind(message)
        .bind(alert_type)
        .bind(priority)
        .bind(warehouse_ids[p.warehouse])
        .bind(product_id)
        .execute(db)
        .await?;
        summary.alerts += 1;
    }
    info!("  Created {} alerts", summary.alerts);

    let recommendations = [
        (
            0,
            RecommendationType::Discount,
            "Apply 30% Discount",
            "Discount Fresh Milk to sell before expiry",
            "Reduce price to $1.74",
            dec!(348.60),
            dec!(0.85),
            Priority::High,
        ),
        (
            1,
            RecommendationType::Liquidate,
            "Immediate Liquidation",
            "Liquidate expired Artisan Bread at cost or below",
            "Sell at $1.50 (cost price) or dispose of",
            dec!(-75.00),
            dec!(1.0),
            Priority::Critical,
        ),
        (
            5,
            RecommendationType::Donate,
            "Donate Expired Yogurt",
            "Donate Greek Yogurt to a local food bank",
            "Arrange pickup with a partner charity",
            dec!(-108.00),
            dec!(0.70),
            Priority::Medium,
        ),
    ];
    for (index, rec_type, title, description, action, impact, confidence, urgency) in
        recommendations
    {
        sqlx::query(
            r#"
            INSERT INTO recommendations (
                product_id, type, title, description, suggested_action,
                expected_impact, confidence, urgency
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product_ids[index].0)
        .bind(rec_type)
        .bind(title)
        .bind(description)
        .bind(action)
        .bind(impact)
        .bind(confidence)
        .bind(urgency)
        .execute(db)
        .await?;
        summary.recommendations += 1;
    }
    info!("  Created {} recommendations", summary.recommendations);

    for (index, quantity, days_ago, customer) in [(2, 40, 1, "Corner Market"), (4, 25, 3, "Bistro 21")] {
        let (product_id, p) = &product_ids[index];
        let revenue = line_total(quantity, p.selling_price)?;
        let cost = line_total(quantity, p.cost_price)?;
        sqlx::query(
            r#"
            INSERT INTO sales (
                product_id, quantity_sold, unit_price, total_revenue, profit,
                customer_name, sale_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(p.selling_price)
        .bind(revenue)
        .bind(revenue - cost)
        .bind(customer)
        .bind(now - Duration::days(days_ago))
        .execute(db)
        .await?;
        summary.sales += 1;
    }
    info!("  Created {} sales", summary.sales);

    sqlx::query(
        r#"
        UPDATE warehouses w
        SET used_capacity = COALESCE(
            (SELECT SUM(current_stock) FROM products p WHERE p.warehouse_id = w.id), 0
        )
        "#,
    )
    .execute(db)
    .await?;
    info!("  Updated warehouse used capacity from stock levels");

    Ok(summary)
}
