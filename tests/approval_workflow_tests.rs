//! Approval workflow tests
//!
//! Tests for the shared pending/approved/rejected state machine:
//! - Pending is the only state with outgoing transitions
//! - Terminal states are final
//! - A claim succeeds for exactly one of any number of concurrent reviewers
//! - Rejection always carries a comment

use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Approved,
    Rejected,
}

fn can_transition(from: Status, to: Status) -> bool {
    from == Status::Pending && matches!(to, Status::Approved | Status::Rejected)
}

/// Mirrors the conditional UPDATE: the transition only happens if the row is
/// still pending, and the caller learns whether it won the claim.
fn claim(current: &mut Status, target: Status) -> Result<(), &'static str> {
    if !matches!(target, Status::Approved | Status::Rejected) {
        return Err("invalid target");
    }
    match *current {
        Status::Pending => {
            *current = target;
            Ok(())
        }
        _ => Err("already processed"),
    }
}

fn reject_comment_valid(comment: Option<&str>) -> bool {
    comment.map_or(false, |c| !c.trim().is_empty())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_pending_reaches_both_terminals() {
        assert!(can_transition(Status::Pending, Status::Approved));
        assert!(can_transition(Status::Pending, Status::Rejected));
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for from in [Status::Approved, Status::Rejected] {
            for to in [Status::Pending, Status::Approved, Status::Rejected] {
                assert!(!can_transition(from, to));
            }
        }
    }

    /// Two sequential approvals of one row: first wins, second fails
    #[test]
    fn test_double_approval_single_winner() {
        let mut status = Status::Pending;

        assert!(claim(&mut status, Status::Approved).is_ok());
        assert_eq!(status, Status::Approved);

        assert_eq!(claim(&mut status, Status::Approved), Err("already processed"));
        assert_eq!(status, Status::Approved);
    }

    #[test]
    fn test_reject_after_approve_fails() {
        let mut status = Status::Pending;

        claim(&mut status, Status::Approved).unwrap();
        assert!(claim(&mut status, Status::Rejected).is_err());
        assert_eq!(status, Status::Approved);
    }

    #[test]
    fn test_reject_requires_non_blank_comment() {
        assert!(!reject_comment_valid(None));
        assert!(!reject_comment_valid(Some("")));
        assert!(!reject_comment_valid(Some("   ")));
        assert!(reject_comment_valid(Some("quantity does not match delivery")));
    }

    /// The comment is persisted verbatim, not trimmed or rewritten
    #[test]
    fn test_comment_kept_verbatim() {
        let comment = "  wrong count - recount tomorrow  ";
        assert!(reject_comment_valid(Some(comment)));
        assert_eq!(comment, "  wrong count - recount tomorrow  ");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn terminal_strategy() -> impl Strategy<Value = Status> {
        prop_oneof![Just(Status::Approved), Just(Status::Rejected)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// However many reviewers race, exactly one claim succeeds
        #[test]
        fn prop_exactly_one_claim_wins(
            targets in prop::collection::vec(terminal_strategy(), 1..10)
        ) {
            let mut status = Status::Pending;
            let mut successes = 0;
            let mut already_processed = 0;

            for target in &targets {
                match claim(&mut status, *target) {
                    Ok(()) => successes += 1,
                    Err(_) => already_processed += 1,
                }
            }

            prop_assert_eq!(successes, 1);
            prop_assert_eq!(already_processed, targets.len() - 1);

            // The final state is whatever the winner asked for
            prop_assert_eq!(status, targets[0]);
        }

        /// A claimed row never returns to pending
        #[test]
        fn prop_terminal_states_are_sticky(
            first in terminal_strategy(),
            later in prop::collection::vec(terminal_strategy(), 0..5)
        ) {
            let mut status = Status::Pending;
            claim(&mut status, first).unwrap();

            for target in later {
                let _ = claim(&mut status, target);
                prop_assert_eq!(status, first);
            }
        }

        /// Whitespace-only comments are never valid rejection comments
        #[test]
        fn prop_blank_comments_rejected(spaces in 0usize..20) {
            let comment = " ".repeat(spaces);
            prop_assert!(!reject_comment_valid(Some(&comment)));
        }

        /// Any comment with a non-whitespace character is accepted
        #[test]
        fn prop_non_blank_comments_accepted(comment in "\\s*[a-zA-Z0-9]+\\s*") {
            prop_assert!(reject_comment_valid(Some(&comment)));
        }
    }
}
