//! Shared types and models for the Warehouse Inventory Management Platform
//!
//! This crate contains the domain model and the pure business rules (expiry
//! math, dead stock risk scoring, capacity checks) shared between the backend
//! and the dashboard (via WASM).

pub mod expiry;
pub mod models;
pub mod risk;
pub mod validation;

pub use expiry::*;
pub use models::*;
pub use risk::*;
pub use validation::*;
