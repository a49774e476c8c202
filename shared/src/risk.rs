//! Dead stock risk scoring
//!
//! The score is a sum of weighted factors capped at 1.0:
//!
//! | factor | weight |
//! |---|---|
//! | expired | 0.8 |
//! | expires within 3 days | 0.6 |
//! | expires within 7 days | 0.4 |
//! | expires within 14 days | 0.2 |
//! | no sales in the last 7 days while holding stock | 0.3 |
//! | more than 10 units per day of shelf life | 0.2 |
//! | margin below 20% | 0.1 |

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::expiry::{is_expired, is_low_shelf_life};
use crate::models::{NewRecommendation, Priority, Product, ProductStatus, RecommendationType};

/// Risk at or above which a product is dead stock
pub const DEAD_STOCK_THRESHOLD: Decimal = dec!(0.8);
/// Risk at or above which a product is at risk
pub const AT_RISK_THRESHOLD: Decimal = dec!(0.5);
/// Risk at or above which an alert is raised and the product is listed as dead stock
pub const HIGH_RISK_THRESHOLD: Decimal = dec!(0.7);
/// Risk at or above which the raised alert is critical
pub const CRITICAL_RISK_THRESHOLD: Decimal = dec!(0.9);

/// Window for the sales velocity factor
pub const SALES_WINDOW_DAYS: i64 = 7;
/// Number of most recent sales considered by the analysis
pub const RECENT_SALES_LIMIT: i64 = 30;

const STOCK_TO_SHELF_LIFE_LIMIT: Decimal = dec!(10);
const LOW_MARGIN: Decimal = dec!(0.2);
const DISCOUNT_RATE: Decimal = dec!(0.30);

/// Facts about a product the risk score depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    pub days_until_expiry: Option<i64>,
    pub sold_recently: bool,
    pub current_stock: i32,
    pub shelf_life_days: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
}

impl RiskInputs {
    pub fn from_product(product: &Product, sold_recently: bool, now: DateTime<Utc>) -> Self {
        Self {
            days_until_expiry: product.expiry(now).days_until_expiry,
            sold_recently,
            current_stock: product.current_stock,
            shelf_life_days: product.shelf_life_days,
            cost_price: product.cost_price,
            selling_price: product.selling_price,
        }
    }
}

/// Score and resulting status for one product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: Decimal,
    pub status: ProductStatus,
}

impl RiskAssessment {
    pub fn is_high_risk(&self) -> bool {
        self.score >= HIGH_RISK_THRESHOLD
    }

    /// Priority of the alert raised for a high-risk product
    pub fn alert_priority(&self) -> Priority {
        if self.score >= CRITICAL_RISK_THRESHOLD {
            Priority::Critical
        } else {
            Priority::High
        }
    }
}

fn expiry_weight(days: i64) -> Decimal {
    match days {
        d if d <= 0 => dec!(0.8),
        d if d <= 3 => dec!(0.6),
        d if d <= 7 => dec!(0.4),
        d if d <= 14 => dec!(0.2),
        _ => Decimal::ZERO,
    }
}

/// Unit margin as a fraction of selling price; unpriced goods have no margin
pub fn margin(cost_price: Decimal, selling_price: Decimal) -> Decimal {
    if selling_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (selling_price - cost_price) / selling_price
}

/// Compute the dead stock risk score in [0, 1]
pub fn risk_score(inputs: &RiskInputs) -> Decimal {
    let mut score = Decimal::ZERO;

    if let Some(days) = inputs.days_until_expiry {
        score += expiry_weight(days);
    }

    if !inputs.sold_recently && inputs.current_stock > 0 {
        score += dec!(0.3);
    }

    if inputs.shelf_life_days > 0 {
        let ratio = Decimal::from(inputs.current_stock) / Decimal::from(inputs.shelf_life_days);
        if ratio > STOCK_TO_SHELF_LIFE_LIMIT {
            score += dec!(0.2);
        }
    }

    if margin(inputs.cost_price, inputs.selling_price) < LOW_MARGIN {
        score += dec!(0.1);
    }

    score.min(Decimal::ONE)
}

/// Map a score to a status. Below the at-risk threshold, products close to
/// expiry are flagged as low shelf life rather than healthy.
pub fn status_for(score: Decimal, days_until_expiry: Option<i64>) -> ProductStatus {
    if score >= DEAD_STOCK_THRESHOLD {
        ProductStatus::DeadStock
    } else if score >= AT_RISK_THRESHOLD {
        ProductStatus::AtRisk
    } else if days_until_expiry.is_some_and(is_low_shelf_life) {
        ProductStatus::LowShelfLife
    } else {
        ProductStatus::Healthy
    }
}

pub fn assess(inputs: &RiskInputs) -> RiskAssessment {
    let score = risk_score(inputs);
    RiskAssessment {
        score,
        status: status_for(score, inputs.days_until_expiry),
    }
}

/// Alert message for a high-risk product, e.g. "Milk has a 80.0% risk of becoming dead stock"
pub fn risk_alert_message(product_name: &str, score: Decimal) -> String {
    format!(
        "{} has a {:.1}% risk of becoming dead stock",
        product_name,
        score * dec!(100)
    )
}

/// Suggest how to move stock that the analysis flagged.
///
/// Only at-risk and dead stock get a recommendation.
pub fn plan_recommendation(
    product: &Product,
    assessment: &RiskAssessment,
    days_until_expiry: Option<i64>,
) -> Option<NewRecommendation> {
    if !matches!(
        assessment.status,
        ProductStatus::AtRisk | ProductStatus::DeadStock
    ) {
        return None;
    }

    let stock = Decimal::from(product.current_stock);

    let recommendation = match days_until_expiry {
        Some(days) if is_expired(days) => NewRecommendation {
            product_id: product.id,
            recommendation_type: RecommendationType::Liquidate,
            title: "Immediate Liquidation".to_string(),
            description: format!("Liquidate expired {} at cost or below", product.name),
            suggested_action: format!(
                "Sell at ${:.2} (cost price) or dispose of",
                product.cost_price
            ),
            expected_impact: -product.stock_cost(),
            confidence: Decimal::ONE,
            urgency: Priority::Critical,
        },
        Some(days) if days <= 3 => {
            let discounted = (product.selling_price * (Decimal::ONE - DISCOUNT_RATE)).round_dp(2);
            NewRecommendation {
                product_id: product.id,
                recommendation_type: RecommendationType::Discount,
                title: "Apply 30% Discount".to_string(),
                description: format!(
                    "Apply 30% discount to move {} before expiry",
                    product.name
                ),
                suggested_action: format!(
                    "Reduce price from ${:.2} to ${:.2} for quick sale",
                    product.selling_price, discounted
                ),
                expected_impact: stock * (discounted - product.cost_price),
                confidence: dec!(0.85),
                urgency: Priority::High,
            }
        }
        _ => NewRecommendation {
            product_id: product.id,
            recommendation_type: RecommendationType::Bundle,
            title: "Create Bundle Offer".to_string(),
            description: format!("Bundle {} with faster-moving products", product.name),
            suggested_action: format!(
                "Offer {} in a bundle with a related best seller",
                product.name
            ),
            expected_impact: stock * (product.selling_price - product.cost_price) * dec!(0.4),
            confidence: dec!(0.70),
            urgency: Priority::Medium,
        },
    };

    Some(recommendation)
}
