//! Reversal subsystem
//!
//! A cashier may ask to undo one of their own sales within 48 hours. On owner
//! approval the transaction flips to `reversed` and every sold item is
//! restocked as a synthetic approved `in` movement, so the ledger itself
//! records the restock.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{TransactionStatus, UserRole};
use crate::services::workflow::{self, ReviewDecision, WorkflowKind};

/// Eligibility window for requesting a reversal, measured from the
/// transaction date. The boundary is inclusive.
pub const REVERSAL_WINDOW_HOURS: i64 = 48;

/// Reversal service
#[derive(Clone)]
pub struct ReversalService {
    db: PgPool,
}

/// Reversal request record. Transaction number and total are snapshots taken
/// at request time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReversalRequest {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub transaction_number: String,
    pub total_amount: Decimal,
    pub cashier_id: Uuid,
    pub cashier_reason: String,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for requesting a reversal
#[derive(Debug, Deserialize)]
pub struct RequestReversalInput {
    pub transaction_id: Uuid,
    pub reason: String,
}

/// Input for approving or rejecting a reversal request
#[derive(Debug, Deserialize)]
pub struct ReviewReversalInput {
    pub comment: Option<String>,
}

const SELECT_REVERSAL: &str = r#"
    SELECT id, transaction_id, transaction_number, total_amount, cashier_id, cashier_reason,
           status, reviewed_by, review_comment, created_at, updated_at
    FROM reversal_requests
"#;

/// True while the transaction is still eligible for reversal
pub fn within_reversal_window(transaction_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - transaction_date <= Duration::hours(REVERSAL_WINDOW_HOURS)
}

impl ReversalService {
    /// Create a new ReversalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Request a reversal of one of the cashier's own active transactions
    pub async fn request(
        &self,
        user: &AuthUser,
        input: RequestReversalInput,
    ) -> AppResult<ReversalRequest> {
        user.require_role(&[UserRole::Cashier])?;

        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "A reason is required to request a reversal".to_string(),
                message_th: "ต้องระบุเหตุผลในการขอยกเลิก".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        // Lock the transaction row so two concurrent requests for the same
        // sale serialize; the partial unique index is the backstop.
        let transaction = sqlx::query_as::<_, (Uuid, String, Decimal, String, DateTime<Utc>)>(
            r#"
            SELECT id, transaction_number, total_amount, status, transaction_date
            FROM transactions
            WHERE id = $1 AND cashier_id = $2
            FOR UPDATE
            "#,
        )
        .bind(input.transaction_id)
        .bind(user.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        let (transaction_id, transaction_number, total_amount, status, transaction_date) =
            transaction;

        if status != TransactionStatus::Active.as_str() {
            return Err(AppError::NotFound("Active transaction".to_string()));
        }

        if !within_reversal_window(transaction_date, Utc::now()) {
            return Err(AppError::ReversalWindowExpired(format!(
                "Transaction {} is older than {} hours",
                transaction_number, REVERSAL_WINDOW_HOURS
            )));
        }

        let pending_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reversal_requests WHERE transaction_id = $1 AND status = 'pending')",
        )
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        if pending_exists {
            return Err(AppError::Conflict {
                resource: "reversal_request".to_string(),
                message: "A pending reversal request already exists for this transaction"
                    .to_string(),
                message_th: "มีคำขอยกเลิกที่รอดำเนินการสำหรับรายการนี้อยู่แล้ว".to_string(),
            });
        }

        let sql = format!(
            r#"
            INSERT INTO reversal_requests
                (transaction_id, transaction_number, total_amount, cashier_id, cashier_reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            "id, transaction_id, transaction_number, total_amount, cashier_id, cashier_reason, \
             status, reviewed_by, review_comment, created_at, updated_at"
        );

        let request = sqlx::query_as::<_, ReversalRequest>(&sql)
            .bind(transaction_id)
            .bind(&transaction_number)
            .bind(total_amount)
            .bind(user.user_id)
            .bind(input.reason.trim())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// List reversal requests; the owner sees everything, a cashier their own
    pub async fn list(&self, user: &AuthUser) -> AppResult<Vec<ReversalRequest>> {
        let sql = if user.role == UserRole::Owner {
            format!("{} ORDER BY created_at DESC", SELECT_REVERSAL)
        } else {
            format!("{} WHERE cashier_id = $1 ORDER BY created_at DESC", SELECT_REVERSAL)
        };

        let mut query = sqlx::query_as::<_, ReversalRequest>(&sql);
        if user.role != UserRole::Owner {
            query = query.bind(user.user_id);
        }

        Ok(query.fetch_all(&self.db).await?)
    }

    /// Approve a reversal: flip the transaction to reversed and restock every
    /// sold item, all in one database transaction
    pub async fn approve(
        &self,
        user: &AuthUser,
        request_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<ReversalRequest> {
        user.require_owner()?;

        let mut tx = self.db.begin().await?;

        workflow::claim_pending(
            &mut tx,
            WorkflowKind::ReversalRequest,
            request_id,
            ReviewDecision::Approve,
            user.user_id,
            comment.as_deref(),
        )
        .await?;

        let sql = format!("{} WHERE id = $1", SELECT_REVERSAL);
        let request = sqlx::query_as::<_, ReversalRequest>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        // The status predicate guards against a transaction that was somehow
        // reversed through another path.
        let flipped = sqlx::query(
            "UPDATE transactions SET status = 'reversed', updated_at = NOW() WHERE id = $1 AND status = 'active'",
        )
        .bind(request.transaction_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(AppError::AlreadyProcessed("Transaction".to_string()));
        }

        let items = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT product_id, quantity FROM transaction_items WHERE transaction_id = $1",
        )
        .bind(request.transaction_id)
        .fetch_all(&mut *tx)
        .await?;

        // Restock through the ledger, not base_stock, so the reversal is
        // auditable the same way the sale was.
        for (product_id, quantity) in items {
            sqlx::query(
                r#"
                INSERT INTO stock_movements
                    (product_id, movement_type, quantity, reason, performed_by, status, reviewed_by)
                VALUES ($1, 'in', $2, $3, $4, 'approved', $4)
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .bind(format!("Reversal of {}", request.transaction_number))
            .bind(user.user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            transaction_number = %request.transaction_number,
            "Approved reversal"
        );

        Ok(request)
    }

    /// Reject a reversal request; a non-blank comment is required
    pub async fn reject(
        &self,
        user: &AuthUser,
        request_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<ReversalRequest> {
        user.require_owner()?;

        let mut tx = self.db.begin().await?;

        workflow::claim_pending(
            &mut tx,
            WorkflowKind::ReversalRequest,
            request_id,
            ReviewDecision::Reject,
            user.user_id,
            comment.as_deref(),
        )
        .await?;

        let sql = format!("{} WHERE id = $1", SELECT_REVERSAL);
        let request = sqlx::query_as::<_, ReversalRequest>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_accepts_recent_transactions() {
        let now = Utc::now();
        assert!(within_reversal_window(now, now));
        assert!(within_reversal_window(now - Duration::hours(47) - Duration::minutes(59), now));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(within_reversal_window(now - Duration::hours(48), now));
        assert!(!within_reversal_window(
            now - Duration::hours(48) - Duration::seconds(1),
            now
        ));
    }

    #[test]
    fn test_window_rejects_old_transactions() {
        let now = Utc::now();
        assert!(!within_reversal_window(now - Duration::days(3), now));
    }
}
