//! External API integrations

pub mod gemini;
pub mod inventory_feed;

pub use gemini::GeminiClient;
pub use inventory_feed::InventoryFeedClient;
