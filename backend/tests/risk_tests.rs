//! Dead stock risk and expiry tests
//!
//! Tests for:
//! - Days until expiry rounding
//! - Sales, overstock and margin risk factors
//! - Status thresholds and the alert priority of high-risk stock
//! - Recommendations for at-risk stock

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    assess, days_until_expiry, is_expired, is_low_shelf_life, margin, plan_recommendation,
    risk_alert_message, risk_score, status_for, Priority, Product, ProductStatus,
    RecommendationType, RiskInputs,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn inputs(days: Option<i64>) -> RiskInputs {
    RiskInputs {
        days_until_expiry: days,
        sold_recently: true,
        current_stock: 10,
        shelf_life_days: 30,
        cost_price: dec("1.00"),
        selling_price: dec("2.00"),
    }
}

fn product(stock: i32, cost: &str, sell: &str) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        sku: Some("DAIRY-MILK-001".to_string()),
        name: "Fresh Milk".to_string(),
        description: None,
        category: Some("Dairy".to_string()),
        brand: None,
        cost_price: dec(cost),
        selling_price: dec(sell),
        current_stock: stock,
        min_stock_level: 0,
        max_stock_level: 0,
        shelf_life_days: 7,
        received_date: now,
        expiry_date: Some(now + Duration::days(2)),
        dead_stock_risk: Decimal::ZERO,
        status: ProductStatus::Healthy,
        last_prediction: None,
        warehouse_id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Partial days round up
    #[test]
    fn test_days_until_expiry_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(days_until_expiry(now + Duration::hours(1), now), 1);
        assert_eq!(days_until_expiry(now + Duration::days(3), now), 3);
        assert_eq!(days_until_expiry(now + Duration::hours(49), now), 3);
        assert_eq!(days_until_expiry(now, now), 0);
        assert_eq!(days_until_expiry(now - Duration::hours(30), now), -1);
    }

    #[test]
    fn test_expiry_windows() {
        assert!(is_expired(0));
        assert!(is_expired(-3));
        assert!(!is_expired(1));

        assert!(is_low_shelf_life(1));
        assert!(is_low_shelf_life(7));
        assert!(!is_low_shelf_life(0));
        assert!(!is_low_shelf_life(8));
    }

    /// No sales on held stock adds 0.3; an empty shelf does not
    #[test]
    fn test_sales_velocity_factor() {
        let mut unsold = inputs(None);
        unsold.sold_recently = false;
        assert_eq!(risk_score(&unsold), dec("0.3"));

        unsold.current_stock = 0;
        assert_eq!(risk_score(&unsold), Decimal::ZERO);
    }

    #[test]
    fn test_overstock_factor() {
        let mut overstocked = inputs(None);
        overstocked.current_stock = 301;
        assert_eq!(risk_score(&overstocked), dec("0.2"));

        overstocked.current_stock = 300;
        assert_eq!(risk_score(&overstocked), Decimal::ZERO);

        overstocked.shelf_life_days = 0;
        assert_eq!(risk_score(&overstocked), Decimal::ZERO);
    }

    #[test]
    fn test_margin_factor() {
        assert_eq!(margin(dec("1.00"), dec("2.00")), dec("0.5"));
        assert_eq!(margin(dec("5.00"), Decimal::ZERO), Decimal::ZERO);

        let mut thin = inputs(None);
        thin.cost_price = dec("1.90");
        assert_eq!(risk_score(&thin), dec("0.1"));
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(status_for(dec("0.8"), Some(30)), ProductStatus::DeadStock);
        assert_eq!(status_for(dec("0.5"), Some(30)), ProductStatus::AtRisk);
        assert_eq!(status_for(dec("0.4"), Some(5)), ProductStatus::LowShelfLife);
        assert_eq!(status_for(dec("0.4"), Some(30)), ProductStatus::Healthy);
        assert_eq!(status_for(Decimal::ZERO, None), ProductStatus::Healthy);
    }

    #[test]
    fn test_alert_priority() {
        let mut unsold = inputs(Some(2));
        unsold.sold_recently = false;
        let assessment = assess(&unsold);
        assert_eq!(assessment.score, dec("0.9"));
        assert!(assessment.is_high_risk());
        assert_eq!(assessment.alert_priority(), Priority::Critical);

        let mut soon = inputs(Some(-1));
        soon.sold_recently = true;
        let assessment = assess(&soon);
        assert_eq!(assessment.score, dec("0.8"));
        assert_eq!(assessment.alert_priority(), Priority::High);

        assert!(!assess(&inputs(Some(5))).is_high_risk());
    }

    #[test]
    fn test_alert_message() {
        assert_eq!(
            risk_alert_message("Fresh Milk", dec("0.9")),
            "Fresh Milk has a 90.0% risk of becoming dead stock"
        );
        assert_eq!(
            risk_alert_message("Bread", dec("0.75")),
            "Bread has a 75.0% risk of becoming dead stock"
        );
    }

    #[test]
    fn test_recommendations_by_expiry() {
        let p = product(100, "1.00", "2.00");
        let at_risk = assess(&RiskInputs {
            sold_recently: false,
            ..inputs(Some(2))
        });

        let discount = plan_recommendation(&p, &at_risk, Some(2)).unwrap();
        assert_eq!(discount.recommendation_type, RecommendationType::Discount);
        assert_eq!(discount.urgency, Priority::High);

        let liquidate = plan_recommendation(&p, &at_risk, Some(0)).unwrap();
        assert_eq!(liquidate.recommendation_type, RecommendationType::Liquidate);
        assert_eq!(liquidate.urgency, Priority::Critical);
        assert_eq!(liquidate.expected_impact, dec("-100.00"));

        let bundle = plan_recommendation(&p, &at_risk, Some(10)).unwrap();
        assert_eq!(bundle.recommendation_type, RecommendationType::Bundle);
        assert_eq!(bundle.urgency, Priority::Medium);
    }

    #[test]
    fn test_healthy_stock_gets_no_recommendation() {
        let p = product(10, "1.00", "2.00");
        let healthy = assess(&inputs(Some(30)));
        assert_eq!(healthy.status, ProductStatus::Healthy);
        assert!(plan_recommendation(&p, &healthy, Some(30)).is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn risk_inputs_strategy() -> impl Strategy<Value = RiskInputs> {
        (
            proptest::option::of(-30i64..400),
            any::<bool>(),
            0i32..5_000,
            0i32..400,
            0u32..10_000,
            0u32..10_000,
        )
            .prop_map(|(days, sold, stock, shelf_life, cost, sell)| RiskInputs {
                days_until_expiry: days,
                sold_recently: sold,
                current_stock: stock,
                shelf_life_days: shelf_life,
                cost_price: Decimal::new(i64::from(cost), 2),
                selling_price: Decimal::new(i64::from(sell), 2),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The score always lies in [0, 1]
        #[test]
        fn prop_score_is_bounded(inputs in risk_inputs_strategy()) {
            let score = risk_score(&inputs);
            prop_assert!(score >= Decimal::ZERO);
            prop_assert!(score <= Decimal::ONE);
        }

        /// The status follows the score thresholds
        #[test]
        fn prop_status_matches_thresholds(inputs in risk_inputs_strategy()) {
            let assessment = assess(&inputs);
            if assessment.score >= dec("0.8") {
                prop_assert_eq!(assessment.status, ProductStatus::DeadStock);
            } else if assessment.score >= dec("0.5") {
                prop_assert_eq!(assessment.status, ProductStatus::AtRisk);
            } else {
                prop_assert!(matches!(
                    assessment.status,
                    ProductStatus::LowShelfLife | ProductStatus::Healthy
                ));
            }
        }

        /// Expired stock is always at risk or worse
        #[test]
        fn prop_expired_stock_is_at_least_at_risk(
            days in -365i64..=0,
            mut inputs in risk_inputs_strategy()
        ) {
            inputs.days_until_expiry = Some(days);
            let status = assess(&inputs).status;
            prop_assert!(matches!(status, ProductStatus::AtRisk | ProductStatus::DeadStock));
        }

        /// Whole days ahead count exactly; any part day rounds up
        #[test]
        fn prop_days_until_expiry_ceiling(days in -400i64..400, extra_minutes in 1i64..1440) {
            let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let exact = now + Duration::days(days);
            prop_assert_eq!(days_until_expiry(exact, now), days);
            prop_assert_eq!(
                days_until_expiry(exact + Duration::minutes(extra_minutes), now),
                days + 1
            );
        }
    }
}
