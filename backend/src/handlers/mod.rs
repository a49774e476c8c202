//! HTTP handlers

pub mod alert;
pub mod dashboard;
pub mod dead_stock;
pub mod diagnostics;
pub mod health;
pub mod inventory;
pub mod order;
pub mod product;
pub mod query;
pub mod warehouse;

pub use alert::*;
pub use dashboard::*;
pub use dead_stock::*;
pub use diagnostics::*;
pub use health::*;
pub use inventory::*;
pub use order::*;
pub use product::*;
pub use query::*;
pub use warehouse::*;
