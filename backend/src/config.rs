//! Configuration management for the Warehouse Inventory Management Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code (`DATABASE_URL` and `GEMINI_API_KEY` seed the defaults)
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WIM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Value shipped in example `.env` files in place of a real key
pub const GEMINI_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Gemini text generation API used for natural-language queries
    pub gemini: GeminiConfig,

    /// Upstream inventory service proxied by `/inventory`
    pub inventory_feed: InventoryFeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key; empty when not configured
    pub api_key: String,

    /// Base URL up to and including the API version
    pub endpoint: String,

    /// Model name used for generateContent
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Whether a real key is present
    pub fn is_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != GEMINI_KEY_PLACEHOLDER
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryFeedConfig {
    /// Full URL of the upstream inventory endpoint
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WIM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default(
                "gemini.api_key",
                std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            )?
            .set_default(
                "gemini.endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.model", "gemini-pro")?
            .set_default("gemini.timeout_secs", 30)?
            .set_default("inventory_feed.url", "http://127.0.0.1:5000/api/inventory")?
            .set_default("inventory_feed.timeout_secs", 10)?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database.url", url)?;
        }

        let config = builder
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WIM_ prefix)
            .add_source(
                Environment::with_prefix("WIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
