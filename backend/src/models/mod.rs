//! Database models for the Warehouse Inventory Management Platform
//!
//! Re-exports models and domain rules from the shared crate

pub use shared::expiry::*;
pub use shared::models::*;
pub use shared::risk::*;
pub use shared::validation::*;
