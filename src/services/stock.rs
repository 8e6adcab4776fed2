//! Stock ledger service
//!
//! Current stock is never stored: it is derived as
//! `base_stock + sum(approved in) - sum(approved out)` over the append-only
//! movement log. Pending and rejected movements never count. Adjustment
//! movements are recorded but excluded from the derivation (documented gap,
//! kept until product requirements clarify their meaning).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ApprovalStatus, MovementType, UserRole};
use crate::services::workflow::{self, ReviewDecision, WorkflowKind};

/// Stock service for the movement ledger and its approval workflow
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Stock movement record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: String,
    pub quantity: i64,
    pub reason: Option<String>,
    pub performed_by: Uuid,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for submitting a stock movement
#[derive(Debug, Deserialize)]
pub struct SubmitMovementInput {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: Option<String>,
}

/// Input for approving or rejecting a movement
#[derive(Debug, Deserialize)]
pub struct ReviewMovementInput {
    pub comment: Option<String>,
}

/// Derived stock level for a product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: String,
    pub base_stock: i64,
    pub total_in: i64,
    pub total_out: i64,
    pub current_stock: i64,
}

/// Contribution of a single movement to derived stock.
/// Mirrors the CASE expression in the balance SQL; kept in sync by the
/// ledger tests.
pub fn movement_delta(status: ApprovalStatus, movement_type: MovementType, quantity: i64) -> i64 {
    if status != ApprovalStatus::Approved {
        return 0;
    }
    match movement_type {
        MovementType::In => quantity,
        MovementType::Out => -quantity,
        // Stored but never summed
        MovementType::Adjustment => 0,
    }
}

/// Derive current stock from base stock plus a movement log
pub fn derive_current_stock<I>(base_stock: i64, movements: I) -> i64
where
    I: IntoIterator<Item = (ApprovalStatus, MovementType, i64)>,
{
    movements
        .into_iter()
        .fold(base_stock, |acc, (status, mt, qty)| {
            acc + movement_delta(status, mt, qty)
        })
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Submit a stock movement; it starts pending and only affects derived
    /// stock once an owner approves it
    pub async fn submit_movement(
        &self,
        user: &AuthUser,
        input: SubmitMovementInput,
    ) -> AppResult<StockMovement> {
        user.require_role(&[UserRole::Storekeeper, UserRole::Owner])?;

        if input.quantity <= 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_th: "จำนวนต้องเป็นค่าบวก".to_string(),
            });
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, reason, performed_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, movement_type, quantity, reason, performed_by,
                      status, reviewed_by, review_comment, created_at, updated_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(&input.reason)
        .bind(user.user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(movement)
    }

    /// List movements, optionally filtered by status and/or product
    pub async fn list_movements(
        &self,
        status: Option<ApprovalStatus>,
        product_id: Option<Uuid>,
    ) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity, reason, performed_by,
                   status, reviewed_by, review_comment, created_at, updated_at
            FROM stock_movements
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR product_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Derived stock for a single product, computed against one snapshot of
    /// the movement rows
    pub async fn current_stock(&self, product_id: Uuid) -> AppResult<i64> {
        let stock = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT p.base_stock + COALESCE(SUM(
                       CASE WHEN m.movement_type = 'in' THEN m.quantity
                            WHEN m.movement_type = 'out' THEN -m.quantity
                            ELSE 0 END), 0)
            FROM products p
            LEFT JOIN stock_movements m ON m.product_id = p.id AND m.status = 'approved'
            WHERE p.id = $1
            GROUP BY p.base_stock
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(stock)
    }

    /// Derived stock levels for every product
    pub async fn stock_levels(&self) -> AppResult<Vec<StockLevel>> {
        let levels = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.category, p.base_stock,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'in' THEN m.quantity ELSE 0 END), 0) AS total_in,
                   COALESCE(SUM(CASE WHEN m.movement_type = 'out' THEN m.quantity ELSE 0 END), 0) AS total_out,
                   p.base_stock + COALESCE(SUM(
                       CASE WHEN m.movement_type = 'in' THEN m.quantity
                            WHEN m.movement_type = 'out' THEN -m.quantity
                            ELSE 0 END), 0) AS current_stock
            FROM products p
            LEFT JOIN stock_movements m ON m.product_id = p.id AND m.status = 'approved'
            GROUP BY p.id, p.name, p.category, p.base_stock
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(levels)
    }

    /// Approve a pending movement. The derivation picks it up; no other side
    /// effect is needed.
    pub async fn approve_movement(
        &self,
        user: &AuthUser,
        movement_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<StockMovement> {
        self.review_movement(user, movement_id, ReviewDecision::Approve, comment)
            .await
    }

    /// Reject a pending movement; a non-blank comment is required
    pub async fn reject_movement(
        &self,
        user: &AuthUser,
        movement_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<StockMovement> {
        self.review_movement(user, movement_id, ReviewDecision::Reject, comment)
            .await
    }

    async fn review_movement(
        &self,
        user: &AuthUser,
        movement_id: Uuid,
        decision: ReviewDecision,
        comment: Option<String>,
    ) -> AppResult<StockMovement> {
        user.require_owner()?;

        let mut tx = self.db.begin().await?;

        workflow::claim_pending(
            &mut tx,
            WorkflowKind::StockMovement,
            movement_id,
            decision,
            user.user_id,
            comment.as_deref(),
        )
        .await?;

        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, movement_type, quantity, reason, performed_by,
                   status, reviewed_by, review_comment, created_at, updated_at
            FROM stock_movements
            WHERE id = $1
            "#,
        )
        .bind(movement_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_and_rejected_never_count() {
        for status in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
            for mt in [MovementType::In, MovementType::Out, MovementType::Adjustment] {
                assert_eq!(movement_delta(status, mt, 10), 0);
            }
        }
    }

    #[test]
    fn test_approved_in_and_out() {
        assert_eq!(movement_delta(ApprovalStatus::Approved, MovementType::In, 10), 10);
        assert_eq!(movement_delta(ApprovalStatus::Approved, MovementType::Out, 4), -4);
    }

    #[test]
    fn test_adjustments_are_excluded() {
        assert_eq!(
            movement_delta(ApprovalStatus::Approved, MovementType::Adjustment, 7),
            0
        );
    }

    #[test]
    fn test_derive_current_stock() {
        // base 0, one approved in of 10, one approved out of 4
        let movements = vec![
            (ApprovalStatus::Approved, MovementType::In, 10),
            (ApprovalStatus::Approved, MovementType::Out, 4),
            (ApprovalStatus::Pending, MovementType::In, 100),
            (ApprovalStatus::Rejected, MovementType::Out, 50),
        ];
        assert_eq!(derive_current_stock(0, movements), 6);
    }

    #[test]
    fn test_derive_with_base_stock() {
        let movements = vec![(ApprovalStatus::Approved, MovementType::Out, 3)];
        assert_eq!(derive_current_stock(5, movements), 2);
    }
}
