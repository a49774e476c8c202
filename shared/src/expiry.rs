//! Shelf-life and expiry calculations

use chrono::{DateTime, Duration, Utc};

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Products expiring within this many days are flagged as low shelf life
pub const LOW_SHELF_LIFE_DAYS: i64 = 7;

/// Longest shelf life an order may declare (about a century)
pub const MAX_SHELF_LIFE_DAYS: i32 = 36_500;

/// Whole days until `expiry`, rounded up.
///
/// An item expiring in half a day reports 1; an item that expired half a day
/// ago reports 0 (and therefore counts as expired).
pub fn days_until_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (expiry - now).num_milliseconds();
    if millis > 0 {
        (millis + DAY_MILLIS - 1) / DAY_MILLIS
    } else {
        // Truncation toward zero is the ceiling for non-positive values
        millis / DAY_MILLIS
    }
}

/// An item is expired once no full or partial day remains
pub fn is_expired(days: i64) -> bool {
    days <= 0
}

/// Still sellable but expiring within a week
pub fn is_low_shelf_life(days: i64) -> bool {
    days > 0 && days <= LOW_SHELF_LIFE_DAYS
}

/// Expiry timestamp for a batch received at `received` with the given shelf life.
///
/// `None` when the date falls outside the representable range.
pub fn expiry_from_shelf_life(
    received: DateTime<Utc>,
    shelf_life_days: i32,
) -> Option<DateTime<Utc>> {
    received.checked_add_signed(Duration::days(i64::from(shelf_life_days)))
}

/// Expiry information attached to API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryInfo {
    pub days_until_expiry: Option<i64>,
    pub is_expired: bool,
    pub is_low_shelf_life: bool,
}

impl ExpiryInfo {
    pub fn compute(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expiry {
            Some(expiry) => {
                let days = days_until_expiry(expiry, now);
                Self {
                    days_until_expiry: Some(days),
                    is_expired: is_expired(days),
                    is_low_shelf_life: is_low_shelf_life(days),
                }
            }
            None => Self {
                days_until_expiry: None,
                is_expired: false,
                is_low_shelf_life: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    #[test]
    fn test_days_round_up() {
        assert_eq!(days_until_expiry(at(12), at(0)), 1);
        assert_eq!(days_until_expiry(at(24), at(0)), 1);
        assert_eq!(days_until_expiry(at(25), at(0)), 2);
        assert_eq!(days_until_expiry(at(5 * 24), at(0)), 5);
    }

    #[test]
    fn test_days_past_expiry() {
        assert_eq!(days_until_expiry(at(0), at(0)), 0);
        assert_eq!(days_until_expiry(at(0), at(12)), 0);
        assert_eq!(days_until_expiry(at(0), at(36)), -1);
        assert_eq!(days_until_expiry(at(0), at(6 * 24)), -6);
    }

    #[test]
    fn test_low_shelf_life_window() {
        assert!(!is_low_shelf_life(0));
        assert!(is_low_shelf_life(1));
        assert!(is_low_shelf_life(7));
        assert!(!is_low_shelf_life(8));
    }

    #[test]
    fn test_expiry_info_without_date() {
        let info = ExpiryInfo::compute(None, at(0));
        assert_eq!(info.days_until_expiry, None);
        assert!(!info.is_expired);
        assert!(!info.is_low_shelf_life);
    }

    #[test]
    fn test_expiry_from_shelf_life() {
        assert_eq!(expiry_from_shelf_life(at(0), 3), Some(at(72)));
        assert_eq!(expiry_from_shelf_life(at(0), -1), Some(at(-24)));
    }

    #[test]
    fn test_expiry_out_of_range() {
        assert_eq!(expiry_from_shelf_life(at(0), 100_000_000), None);
        assert_eq!(expiry_from_shelf_life(at(0), i32::MAX), None);
        assert!(expiry_from_shelf_life(at(0), MAX_SHELF_LIFE_DAYS).is_some());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            /// Any declared shelf life either lands on a date or reports overflow
            #[test]
            fn test_expiry_never_panics(days in any::<i32>()) {
                let _ = expiry_from_shelf_life(at(0), days);
            }

            #[test]
            fn test_valid_shelf_life_round_trips(days in 1..=MAX_SHELF_LIFE_DAYS) {
                let expiry = expiry_from_shelf_life(at(0), days).unwrap();
                prop_assert_eq!(days_until_expiry(expiry, at(0)), i64::from(days));
            }

            /// The day count is the smallest whole number of days covering the gap
            #[test]
            fn test_days_are_a_ceiling(minutes in -100_000i64..100_000) {
                let days = days_until_expiry(at(0) + Duration::minutes(minutes), at(0));
                let gap = Duration::minutes(minutes);
                prop_assert!(Duration::days(days) >= gap);
                prop_assert!(Duration::days(days - 1) < gap);
            }
        }
    }
}
