//! Domain models for the Warehouse Inventory Management Platform

mod alert;
mod order;
mod product;
mod recommendation;
mod sale;
mod warehouse;

pub use alert::*;
pub use order::*;
pub use product::*;
pub use recommendation::*;
pub use sale::*;
pub use warehouse::*;
