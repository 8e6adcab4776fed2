//! Shared approval workflow engine
//!
//! Stock movements, product requests and reversal requests all share the same
//! pending -> approved / pending -> rejected lifecycle. This module implements the
//! state machine once: a review claims the pending row with a single conditional
//! UPDATE, and the caller runs its kind-specific side effect in the same database
//! transaction. Two concurrent reviews of one row cannot both succeed; the loser
//! observes zero rows affected and gets AlreadyProcessed.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ApprovalStatus;

/// The three entity kinds governed by the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    StockMovement,
    ProductRequest,
    ReversalRequest,
}

impl WorkflowKind {
    /// Table holding the workflow rows. All three tables share the
    /// status / reviewed_by / review_comment columns.
    pub fn table(&self) -> &'static str {
        match self {
            WorkflowKind::StockMovement => "stock_movements",
            WorkflowKind::ProductRequest => "product_requests",
            WorkflowKind::ReversalRequest => "reversal_requests",
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowKind::StockMovement => "Stock movement",
            WorkflowKind::ProductRequest => "Product request",
            WorkflowKind::ReversalRequest => "Reversal request",
        }
    }
}

/// Outcome requested by the reviewing owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> ApprovalStatus {
        match self {
            ReviewDecision::Approve => ApprovalStatus::Approved,
            ReviewDecision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// The only legal transitions: pending to either terminal state
pub fn can_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
    from == ApprovalStatus::Pending && to.is_terminal()
}

/// Rejections must carry a non-blank comment; approval comments are optional
pub fn validate_review_comment(decision: ReviewDecision, comment: Option<&str>) -> AppResult<()> {
    if decision == ReviewDecision::Reject && comment.map_or(true, |c| c.trim().is_empty()) {
        return Err(AppError::Validation {
            field: "comment".to_string(),
            message: "A comment is required when rejecting".to_string(),
            message_th: "ต้องระบุเหตุผลเมื่อปฏิเสธ".to_string(),
        });
    }
    Ok(())
}

/// Claim a pending workflow row for the given decision.
///
/// The status predicate is part of the UPDATE, so the existence check and the
/// transition are one atomic statement. Must run inside the same transaction as
/// the decision's side effect so both commit or neither does.
pub async fn claim_pending(
    tx: &mut Transaction<'_, Postgres>,
    kind: WorkflowKind,
    id: Uuid,
    decision: ReviewDecision,
    reviewer_id: Uuid,
    comment: Option<&str>,
) -> AppResult<()> {
    validate_review_comment(decision, comment)?;

    let sql = format!(
        r#"
        UPDATE {}
        SET status = $2, reviewed_by = $3, review_comment = $4, updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        "#,
        kind.table()
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(decision.target_status().as_str())
        .bind(reviewer_id)
        .bind(comment)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        // Zero rows: either the row never existed or it is already terminal
        let exists_sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", kind.table());
        let exists = sqlx::query_scalar::<_, bool>(&exists_sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;

        if exists {
            return Err(AppError::AlreadyProcessed(kind.label().to_string()));
        }
        return Err(AppError::NotFound(kind.label().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_may_reach_both_terminals() {
        assert!(can_transition(ApprovalStatus::Pending, ApprovalStatus::Approved));
        assert!(can_transition(ApprovalStatus::Pending, ApprovalStatus::Rejected));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            for to in [
                ApprovalStatus::Pending,
                ApprovalStatus::Approved,
                ApprovalStatus::Rejected,
            ] {
                assert!(!can_transition(from, to));
            }
        }
    }

    #[test]
    fn test_pending_cannot_stay_pending() {
        assert!(!can_transition(ApprovalStatus::Pending, ApprovalStatus::Pending));
    }

    #[test]
    fn test_reject_requires_comment() {
        assert!(validate_review_comment(ReviewDecision::Reject, None).is_err());
        assert!(validate_review_comment(ReviewDecision::Reject, Some("")).is_err());
        assert!(validate_review_comment(ReviewDecision::Reject, Some("   ")).is_err());
        assert!(validate_review_comment(ReviewDecision::Reject, Some("wrong count")).is_ok());
    }

    #[test]
    fn test_approve_comment_optional() {
        assert!(validate_review_comment(ReviewDecision::Approve, None).is_ok());
        assert!(validate_review_comment(ReviewDecision::Approve, Some("looks right")).is_ok());
    }
}
