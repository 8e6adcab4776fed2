//! Reversal window tests
//!
//! Tests for the sale reversal rules:
//! - A reversal can be requested up to 48 hours after the sale, inclusive
//! - Past the window the request is refused
//! - An approved reversal restocks every item by its sold quantity

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

const REVERSAL_WINDOW_HOURS: i64 = 48;

fn within_reversal_window(transaction_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - transaction_date <= Duration::hours(REVERSAL_WINDOW_HOURS)
}

/// Restock deltas produced by approving a reversal: one incoming movement
/// per sold line, with the original quantity.
fn restock_deltas(items: &[(i64, i64)]) -> Vec<(i64, i64)> {
    items.iter().map(|&(product, qty)| (product, qty)).collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn sale_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_open_just_after_sale() {
        let now = sale_at() + Duration::minutes(5);
        assert!(within_reversal_window(sale_at(), now));
    }

    #[test]
    fn test_window_open_at_47h59m() {
        let now = sale_at() + Duration::hours(47) + Duration::minutes(59);
        assert!(within_reversal_window(sale_at(), now));
    }

    /// The boundary itself is allowed
    #[test]
    fn test_window_open_at_exactly_48h() {
        let now = sale_at() + Duration::hours(48);
        assert!(within_reversal_window(sale_at(), now));
    }

    #[test]
    fn test_window_closed_one_second_past_48h() {
        let now = sale_at() + Duration::hours(48) + Duration::seconds(1);
        assert!(!within_reversal_window(sale_at(), now));
    }

    #[test]
    fn test_window_closed_days_later() {
        let now = sale_at() + Duration::days(7);
        assert!(!within_reversal_window(sale_at(), now));
    }

    #[test]
    fn test_restock_mirrors_sold_quantities() {
        let items = vec![(1, 4), (2, 1), (3, 10)];
        assert_eq!(restock_deltas(&items), vec![(1, 4), (2, 1), (3, 10)]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any elapsed time up to the window length is accepted
        #[test]
        fn prop_within_window_accepted(elapsed_secs in 0i64..=48 * 3600) {
            let sale = base_time();
            let now = sale + Duration::seconds(elapsed_secs);
            prop_assert!(within_reversal_window(sale, now));
        }

        /// Any elapsed time past the window length is refused
        #[test]
        fn prop_past_window_refused(extra_secs in 1i64..=365 * 24 * 3600) {
            let sale = base_time();
            let now = sale + Duration::hours(REVERSAL_WINDOW_HOURS) + Duration::seconds(extra_secs);
            prop_assert!(!within_reversal_window(sale, now));
        }

        /// Restocking puts back exactly what the sale took out
        #[test]
        fn prop_restock_cancels_sale(
            items in prop::collection::vec((1i64..=100, 1i64..=1_000), 1..10)
        ) {
            let sold_out: i64 = items.iter().map(|(_, q)| q).sum();
            let restocked: i64 = restock_deltas(&items).iter().map(|(_, q)| q).sum();

            prop_assert_eq!(restocked, sold_out);
            prop_assert_eq!(restock_deltas(&items).len(), items.len());
        }
    }
}
