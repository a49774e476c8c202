//! Business logic services for the Warehouse Inventory Management Platform

pub mod alert;
pub mod dashboard;
pub mod dead_stock;
pub mod order;
pub mod product;
pub mod query;
pub mod seed;
pub mod warehouse;

pub use alert::AlertService;
pub use dashboard::DashboardService;
pub use dead_stock::DeadStockService;
pub use order::OrderService;
pub use product::ProductService;
pub use query::QueryService;
pub use warehouse::WarehouseService;
