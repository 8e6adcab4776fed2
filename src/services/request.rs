//! Product request service
//!
//! Storekeepers ask the owner to add a product, change a price, or top up
//! base stock. Each request goes through the shared approval workflow; the
//! type-specific side effect fires exactly once, in the same database
//! transaction as the approval itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{RequestType, UserRole};
use crate::services::workflow::{self, ReviewDecision, WorkflowKind};

/// Product request service
#[derive(Clone)]
pub struct ProductRequestService {
    db: PgPool,
}

/// Product request record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub request_type: String,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub requested_price: Option<Decimal>,
    pub requested_quantity: Option<i64>,
    pub reason: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub reviewed_by: Option<Uuid>,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for submitting a product request
#[derive(Debug, Deserialize)]
pub struct SubmitRequestInput {
    pub request_type: RequestType,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub requested_price: Option<Decimal>,
    pub requested_quantity: Option<i64>,
    pub reason: Option<String>,
    pub category: Option<String>,
}

/// Input for approving or rejecting a request
#[derive(Debug, Deserialize)]
pub struct ReviewRequestInput {
    pub comment: Option<String>,
}

const SELECT_REQUEST: &str = r#"
    SELECT id, requester_id, request_type, product_id, product_name, requested_price,
           requested_quantity, reason, category, status, reviewed_by, review_comment,
           created_at, updated_at
    FROM product_requests
"#;

fn validation(field: &str, message: &str, message_th: &str) -> AppError {
    AppError::Validation {
        field: field.to_string(),
        message: message.to_string(),
        message_th: message_th.to_string(),
    }
}

impl ProductRequestService {
    /// Create a new ProductRequestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Submit a product request (storekeeper only)
    pub async fn submit(
        &self,
        user: &AuthUser,
        input: SubmitRequestInput,
    ) -> AppResult<ProductRequest> {
        user.require_role(&[UserRole::Storekeeper])?;

        match input.request_type {
            RequestType::Add => {
                if input.product_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    return Err(validation(
                        "product_name",
                        "Product name is required for an add request",
                        "ต้องระบุชื่อสินค้าสำหรับคำขอเพิ่มสินค้า",
                    ));
                }
            }
            RequestType::Price => {
                if input.product_id.is_none() {
                    return Err(validation(
                        "product_id",
                        "Product is required for a price request",
                        "ต้องระบุสินค้าสำหรับคำขอเปลี่ยนราคา",
                    ));
                }
                match input.requested_price {
                    Some(p) if p >= Decimal::ZERO => {}
                    _ => {
                        return Err(validation(
                            "requested_price",
                            "A non-negative price is required",
                            "ต้องระบุราคาที่ไม่ติดลบ",
                        ))
                    }
                }
            }
            RequestType::Stock => {
                if input.product_id.is_none() {
                    return Err(validation(
                        "product_id",
                        "Product is required for a stock request",
                        "ต้องระบุสินค้าสำหรับคำขอเพิ่มสต็อก",
                    ));
                }
                match input.requested_quantity {
                    Some(q) if q > 0 => {}
                    _ => {
                        return Err(validation(
                            "requested_quantity",
                            "A positive quantity is required",
                            "ต้องระบุจำนวนที่เป็นค่าบวก",
                        ))
                    }
                }
            }
        }

        // Price and stock requests must point at an existing product
        if let Some(product_id) = input.product_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Product".to_string()));
            }
        }

        let sql = format!(
            r#"
            INSERT INTO product_requests
                (requester_id, request_type, product_id, product_name, requested_price,
                 requested_quantity, reason, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            "id, requester_id, request_type, product_id, product_name, requested_price, \
             requested_quantity, reason, category, status, reviewed_by, review_comment, \
             created_at, updated_at"
        );

        let request = sqlx::query_as::<_, ProductRequest>(&sql)
            .bind(user.user_id)
            .bind(input.request_type.as_str())
            .bind(input.product_id)
            .bind(input.product_name.as_deref().map(str::trim))
            .bind(input.requested_price)
            .bind(input.requested_quantity)
            .bind(&input.reason)
            .bind(&input.category)
            .fetch_one(&self.db)
            .await?;

        Ok(request)
    }

    /// List requests; the owner sees everything, a requester sees their own
    pub async fn list(&self, user: &AuthUser) -> AppResult<Vec<ProductRequest>> {
        let sql = if user.role == UserRole::Owner {
            format!("{} ORDER BY created_at DESC", SELECT_REQUEST)
        } else {
            format!("{} WHERE requester_id = $1 ORDER BY created_at DESC", SELECT_REQUEST)
        };

        let mut query = sqlx::query_as::<_, ProductRequest>(&sql);
        if user.role != UserRole::Owner {
            query = query.bind(user.user_id);
        }

        Ok(query.fetch_all(&self.db).await?)
    }

    /// Approve a request and apply its side effect atomically
    pub async fn approve(
        &self,
        user: &AuthUser,
        request_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<ProductRequest> {
        user.require_owner()?;

        let mut tx = self.db.begin().await?;

        workflow::claim_pending(
            &mut tx,
            WorkflowKind::ProductRequest,
            request_id,
            ReviewDecision::Approve,
            user.user_id,
            comment.as_deref(),
        )
        .await?;

        let sql = format!("{} WHERE id = $1", SELECT_REQUEST);
        let request = sqlx::query_as::<_, ProductRequest>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        match request.request_type.as_str() {
            "add" => {
                let name = request
                    .product_name
                    .as_deref()
                    .ok_or_else(|| AppError::Internal("Add request without product name".to_string()))?;

                // New products start with zero price and zero stock; the owner
                // sets the price afterwards.
                sqlx::query(
                    "INSERT INTO products (name, price, base_stock, category) VALUES ($1, 0, 0, $2)",
                )
                .bind(name)
                .bind(request.category.as_deref().unwrap_or("general"))
                .execute(&mut *tx)
                .await?;
            }
            "price" => {
                let result = sqlx::query(
                    "UPDATE products SET price = $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(request.requested_price)
                .bind(request.product_id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound("Product".to_string()));
                }
            }
            "stock" => {
                let result = sqlx::query(
                    "UPDATE products SET base_stock = base_stock + $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(request.requested_quantity)
                .bind(request.product_id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound("Product".to_string()));
                }
            }
            other => {
                return Err(AppError::Internal(format!("Unknown request type: {}", other)));
            }
        }

        tx.commit().await?;

        Ok(request)
    }

    /// Reject a request; a non-blank comment is required
    pub async fn reject(
        &self,
        user: &AuthUser,
        request_id: Uuid,
        comment: Option<String>,
    ) -> AppResult<ProductRequest> {
        user.require_owner()?;

        let mut tx = self.db.begin().await?;

        workflow::claim_pending(
            &mut tx,
            WorkflowKind::ProductRequest,
            request_id,
            ReviewDecision::Reject,
            user.user_id,
            comment.as_deref(),
        )
        .await?;

        let sql = format!("{} WHERE id = $1", SELECT_REQUEST);
        let request = sqlx::query_as::<_, ProductRequest>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(request)
    }
}
