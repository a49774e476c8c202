//! WebAssembly module for the Warehouse Inventory Management dashboard
//!
//! Provides client-side computation for:
//! - Days until expiry and expiry classification
//! - Dead stock risk scoring
//! - Warehouse capacity checks

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::expiry::*;
pub use shared::models::*;
pub use shared::risk::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Report bad input on the browser console and hand it back as a JS error
fn input_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| input_error(format!("Invalid timestamp {}: {}", value, e)))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Whole days until an RFC 3339 expiry date, rounded up
#[wasm_bindgen]
pub fn days_until(expiry: &str, now: &str) -> Result<f64, JsValue> {
    let days = days_until_expiry(parse_timestamp(expiry)?, parse_timestamp(now)?);
    Ok(days as f64)
}

/// Whole days from the browser clock until an RFC 3339 expiry date
#[wasm_bindgen]
pub fn days_until_now(expiry: &str) -> Result<f64, JsValue> {
    let now = Utc
        .timestamp_millis_opt(js_sys::Date::now() as i64)
        .single()
        .ok_or_else(|| input_error("Browser clock is out of range".to_string()))?;
    Ok(days_until_expiry(parse_timestamp(expiry)?, now) as f64)
}

/// "expired", "low_shelf_life" or "fresh"
#[wasm_bindgen]
pub fn expiry_state(days: f64) -> String {
    let days = days as i64;
    if is_expired(days) {
        "expired".to_string()
    } else if is_low_shelf_life(days) {
        "low_shelf_life".to_string()
    } else {
        "fresh".to_string()
    }
}

/// Risk inputs as the dashboard sends them
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskRequest {
    days_until_expiry: Option<i64>,
    #[serde(default)]
    sold_recently: bool,
    current_stock: i32,
    shelf_life_days: i32,
    cost_price: Decimal,
    selling_price: Decimal,
}

impl From<RiskRequest> for RiskInputs {
    fn from(req: RiskRequest) -> Self {
        Self {
            days_until_expiry: req.days_until_expiry,
            sold_recently: req.sold_recently,
            current_stock: req.current_stock,
            shelf_life_days: req.shelf_life_days,
            cost_price: req.cost_price,
            selling_price: req.selling_price,
        }
    }
}

/// Dead stock risk score in [0, 1]
#[wasm_bindgen]
pub fn dead_stock_risk(inputs_json: &str) -> Result<f64, JsValue> {
    let request: RiskRequest = serde_json::from_str(inputs_json)
        .map_err(|e| input_error(format!("Invalid risk inputs JSON: {}", e)))?;
    Ok(to_f64(risk_score(&request.into())))
}

/// Product status for a score, e.g. "AT_RISK"
#[wasm_bindgen]
pub fn risk_status(score: f64, days_until_expiry: Option<f64>) -> String {
    let score = Decimal::try_from(score).unwrap_or(Decimal::ZERO);
    status_for(score, days_until_expiry.map(|d| d as i64))
        .as_str()
        .to_string()
}

/// Used capacity as a percentage of total
#[wasm_bindgen]
pub fn warehouse_utilization(used: i32, total: i32) -> f64 {
    utilization_percentage(used, total)
}

/// Whether an order of `required` units fits
#[wasm_bindgen]
pub fn has_space_for(total: i32, used: i32, required: i32) -> bool {
    check_space(total, used, required).is_available()
}
