//! Sales transaction tests
//!
//! Tests for sale recording rules:
//! - Totals are the sum of unit price times quantity
//! - The discount is clamped so the final total never goes negative
//! - Stock checks reject a sale that exceeds derived stock
//! - A sale depletes stock by exactly the sold quantities

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    unit_price * Decimal::from(quantity)
}

fn final_total(total: Decimal, discount: Decimal) -> Decimal {
    let final_amount = total - discount;
    if final_amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        final_amount
    }
}

/// Stock check for one sale line against derived stock
fn check_stock(current_stock: i64, requested: i64) -> Result<i64, &'static str> {
    if requested <= 0 {
        return Err("quantity must be positive");
    }
    if current_stock < requested {
        return Err("insufficient stock");
    }
    Ok(current_stock - requested)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("25.50"), 4), dec("102.00"));
    }

    #[test]
    fn test_total_with_discount() {
        let total = line_total(dec("25.00"), 2) + line_total(dec("10.00"), 3);
        assert_eq!(total, dec("80.00"));
        assert_eq!(final_total(total, dec("5.00")), dec("75.00"));
    }

    #[test]
    fn test_discount_clamps_to_zero() {
        assert_eq!(final_total(dec("20.00"), dec("50.00")), Decimal::ZERO);
    }

    #[test]
    fn test_zero_discount_keeps_total() {
        assert_eq!(final_total(dec("99.99"), Decimal::ZERO), dec("99.99"));
    }

    /// Selling 4 of 10 leaves 6
    #[test]
    fn test_sale_depletes_stock() {
        assert_eq!(check_stock(10, 4), Ok(6));
    }

    #[test]
    fn test_insufficient_stock_rejected() {
        assert_eq!(check_stock(3, 4), Err("insufficient stock"));
    }

    #[test]
    fn test_exact_stock_sale_allowed() {
        assert_eq!(check_stock(4, 4), Ok(0));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(check_stock(10, 0).is_err());
        assert!(check_stock(10, -1).is_err());
    }

    #[test]
    fn test_transaction_number_shape() {
        // TRX-<14 digit timestamp>-<6 char suffix>
        let number = "TRX-20250314092653-A1B2C3";
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TRX");
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=1_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Total is the sum of line totals
        #[test]
        fn prop_total_is_sum_of_lines(
            lines in prop::collection::vec((price_strategy(), quantity_strategy()), 1..10)
        ) {
            let total: Decimal = lines.iter().map(|(p, q)| line_total(*p, *q)).sum();
            let expected: Decimal = lines
                .iter()
                .fold(Decimal::ZERO, |acc, (p, q)| acc + *p * Decimal::from(*q));

            prop_assert_eq!(total, expected);
            prop_assert!(total > Decimal::ZERO);
        }

        /// The final total is never negative, whatever the discount
        #[test]
        fn prop_final_total_never_negative(
            total in price_strategy(),
            discount in price_strategy()
        ) {
            prop_assert!(final_total(total, discount) >= Decimal::ZERO);
        }

        /// A discount no larger than the total subtracts exactly
        #[test]
        fn prop_small_discount_subtracts(
            total in price_strategy(),
            extra in price_strategy()
        ) {
            let discount = total; // discount == total -> zero
            prop_assert_eq!(final_total(total, discount), Decimal::ZERO);

            let bigger_total = total + extra;
            prop_assert_eq!(final_total(bigger_total, total), extra);
        }

        /// A sale either fails or depletes stock by exactly the quantity
        #[test]
        fn prop_sale_depletes_exactly(
            stock in 0i64..=10_000,
            requested in quantity_strategy()
        ) {
            match check_stock(stock, requested) {
                Ok(remaining) => {
                    prop_assert!(stock >= requested);
                    prop_assert_eq!(remaining, stock - requested);
                    prop_assert!(remaining >= 0);
                }
                Err(_) => prop_assert!(stock < requested),
            }
        }

        /// No partial writes: a failing line fails the whole sale
        #[test]
        fn prop_all_or_nothing(
            stocks in prop::collection::vec(0i64..=100, 1..10),
            requests in prop::collection::vec(quantity_strategy(), 1..10)
        ) {
            let len = stocks.len().min(requests.len());
            let lines: Vec<_> = stocks[..len].iter().zip(&requests[..len]).collect();

            let any_insufficient = lines.iter().any(|(s, r)| **s < **r);
            let sale: Result<Vec<i64>, &str> = lines
                .iter()
                .map(|(s, r)| check_stock(**s, **r))
                .collect();

            if any_insufficient {
                prop_assert!(sale.is_err());
            } else {
                prop_assert!(sale.is_ok());
            }
        }
    }
}
