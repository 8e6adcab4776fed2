//! Stock ledger tests
//!
//! Tests for derived stock including:
//! - Only approved in/out movements affect the balance
//! - Pending, rejected and adjustment movements never count
//! - Derivation is a pure fold over base stock plus the movement log

use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Movement {
    In,
    Out,
    Adjustment,
}

/// Contribution of one movement to derived stock. Mirrors the ledger's
/// CASE expression: only approved in/out rows count.
fn movement_delta(status: Status, movement: Movement, quantity: i64) -> i64 {
    if status != Status::Approved {
        return 0;
    }
    match movement {
        Movement::In => quantity,
        Movement::Out => -quantity,
        Movement::Adjustment => 0,
    }
}

fn derive_stock(base: i64, movements: &[(Status, Movement, i64)]) -> i64 {
    movements
        .iter()
        .fold(base, |acc, &(s, m, q)| acc + movement_delta(s, m, q))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario from the workflow rules: base 0, approved in of 10, sale of 4
    #[test]
    fn test_sale_scenario() {
        let movements = vec![(Status::Approved, Movement::In, 10)];
        assert_eq!(derive_stock(0, &movements), 10);

        let after_sale = vec![
            (Status::Approved, Movement::In, 10),
            (Status::Approved, Movement::Out, 4),
        ];
        assert_eq!(derive_stock(0, &after_sale), 6);
    }

    #[test]
    fn test_pending_movement_does_not_count() {
        let movements = vec![(Status::Pending, Movement::In, 100)];
        assert_eq!(derive_stock(5, &movements), 5);
    }

    #[test]
    fn test_rejected_movement_does_not_count() {
        let movements = vec![(Status::Rejected, Movement::Out, 100)];
        assert_eq!(derive_stock(5, &movements), 5);
    }

    #[test]
    fn test_adjustment_is_stored_but_not_summed() {
        let movements = vec![(Status::Approved, Movement::Adjustment, 100)];
        assert_eq!(derive_stock(5, &movements), 5);
    }

    #[test]
    fn test_base_stock_is_the_starting_point() {
        assert_eq!(derive_stock(42, &[]), 42);
    }

    #[test]
    fn test_stock_can_reach_zero() {
        let movements = vec![
            (Status::Approved, Movement::In, 10),
            (Status::Approved, Movement::Out, 10),
        ];
        assert_eq!(derive_stock(0, &movements), 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = Status> {
        prop_oneof![
            Just(Status::Pending),
            Just(Status::Approved),
            Just(Status::Rejected),
        ]
    }

    fn movement_strategy() -> impl Strategy<Value = Movement> {
        prop_oneof![
            Just(Movement::In),
            Just(Movement::Out),
            Just(Movement::Adjustment),
        ]
    }

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        1i64..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Only approved in/out movements ever change derived stock
        #[test]
        fn prop_non_approved_movements_never_count(
            base in 0i64..=1_000_000,
            movements in prop::collection::vec(
                (status_strategy(), movement_strategy(), quantity_strategy()),
                0..30
            )
        ) {
            let counted_only: Vec<_> = movements
                .iter()
                .copied()
                .filter(|(s, m, _)| *s == Status::Approved && *m != Movement::Adjustment)
                .collect();

            prop_assert_eq!(derive_stock(base, &movements), derive_stock(base, &counted_only));
        }

        /// Derivation equals base + sum(approved in) - sum(approved out)
        #[test]
        fn prop_derivation_matches_sums(
            base in 0i64..=1_000_000,
            movements in prop::collection::vec(
                (status_strategy(), movement_strategy(), quantity_strategy()),
                0..30
            )
        ) {
            let total_in: i64 = movements
                .iter()
                .filter(|(s, m, _)| *s == Status::Approved && *m == Movement::In)
                .map(|(_, _, q)| q)
                .sum();
            let total_out: i64 = movements
                .iter()
                .filter(|(s, m, _)| *s == Status::Approved && *m == Movement::Out)
                .map(|(_, _, q)| q)
                .sum();

            prop_assert_eq!(derive_stock(base, &movements), base + total_in - total_out);
        }

        /// Movement order never matters
        #[test]
        fn prop_derivation_is_order_independent(
            base in 0i64..=1_000_000,
            movements in prop::collection::vec(
                (status_strategy(), movement_strategy(), quantity_strategy()),
                0..20
            )
        ) {
            let mut reversed = movements.clone();
            reversed.reverse();

            prop_assert_eq!(derive_stock(base, &movements), derive_stock(base, &reversed));
        }

        /// Approving a pending movement changes the balance by exactly its delta
        #[test]
        fn prop_approval_applies_exactly_once(
            base in 0i64..=1_000_000,
            quantity in quantity_strategy()
        ) {
            let before = derive_stock(base, &[(Status::Pending, Movement::In, quantity)]);
            let after = derive_stock(base, &[(Status::Approved, Movement::In, quantity)]);

            prop_assert_eq!(before, base);
            prop_assert_eq!(after, base + quantity);
        }
    }
}
