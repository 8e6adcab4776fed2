//! Sales transaction service
//!
//! Creating a sale locks every product row, checks derived stock against that
//! snapshot, and writes the transaction, its items and one synthesized
//! approved `out` movement per item in a single database transaction. Either
//! everything commits or nothing does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::UserRole;

/// Transaction service for recording and reading sales
#[derive(Clone)]
pub struct TransactionService {
    db: PgPool,
}

/// Sales transaction record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub transaction_number: String,
    pub cashier_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub payment_method: String,
    pub discount: Decimal,
    pub notes: Option<String>,
    pub status: String,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item of a transaction, immutable after creation
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Transaction together with its items
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWithItems {
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    pub items: Vec<TransactionItem>,
}

/// One requested line of a sale
#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateTransactionInput {
    pub items: Vec<SaleItemInput>,
    pub payment_method: Option<String>,
    pub discount: Option<Decimal>,
    pub notes: Option<String>,
    pub customer_id: Option<Uuid>,
}

/// Response after recording a sale
#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    pub transaction_id: Uuid,
    pub transaction_number: String,
    pub transaction_date: DateTime<Utc>,
    pub total_amount: Decimal,
}

const SELECT_TRANSACTION: &str = r#"
    SELECT id, transaction_number, cashier_id, customer_id, total_amount, payment_method,
           discount, notes, status, transaction_date, created_at, updated_at
    FROM transactions
"#;

/// Discount is clamped: the final total never goes below zero
pub fn final_total(total: Decimal, discount: Decimal) -> Decimal {
    let final_amount = total - discount;
    if final_amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        final_amount
    }
}

/// Time-based transaction number with a random suffix; a unique index on the
/// column turns the negligible collision case into an error instead of a
/// silent duplicate.
pub fn generate_transaction_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("TRX-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

impl TransactionService {
    /// Create a new TransactionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale
    pub async fn create(
        &self,
        user: &AuthUser,
        input: CreateTransactionInput,
    ) -> AppResult<CreateTransactionResponse> {
        user.require_role(&[UserRole::Cashier, UserRole::Owner])?;

        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A sale must contain at least one item".to_string(),
                message_th: "การขายต้องมีสินค้าอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Item quantity must be positive".to_string(),
                    message_th: "จำนวนสินค้าต้องเป็นค่าบวก".to_string(),
                });
            }
            if !seen.insert(item.product_id) {
                return Err(AppError::Validation {
                    field: "items".to_string(),
                    message: "Duplicate product in sale items".to_string(),
                    message_th: "มีสินค้าซ้ำในรายการขาย".to_string(),
                });
            }
        }

        let discount = input.discount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "discount".to_string(),
                message: "Discount must not be negative".to_string(),
                message_th: "ส่วนลดต้องไม่ติดลบ".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        if let Some(customer_id) = input.customer_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
            )
            .bind(customer_id)
            .fetch_one(&mut *tx)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Customer".to_string()));
            }
        }

        // Lock each product row, then check derived stock against the locked
        // snapshot. Prices are read here too, so the price used for the total
        // is the price at commit time.
        let mut lines: Vec<(Uuid, i64, Decimal)> = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;

        for item in &input.items {
            let product = sqlx::query_as::<_, (Uuid, String, Decimal)>(
                "SELECT id, name, price FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            let current_stock = sqlx::query_scalar::<_, i64>(
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
            .bind(item.product_id)
            .fetch_one(&mut *tx)
            .await?;

            if current_stock < item.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "{}: {} available, {} requested",
                    product.1, current_stock, item.quantity
                )));
            }

            total += product.2 * Decimal::from(item.quantity);
            lines.push((product.0, item.quantity, product.2));
        }

        let total_amount = final_total(total, discount);
        let now = Utc::now();
        let transaction_number = generate_transaction_number(now);

        let transaction_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transactions
                (transaction_number, cashier_id, customer_id, total_amount, payment_method,
                 discount, notes, transaction_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&transaction_number)
        .bind(user.user_id)
        .bind(input.customer_id)
        .bind(total_amount)
        .bind(input.payment_method.as_deref().unwrap_or("cash"))
        .bind(discount)
        .bind(&input.notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity, unit_price) in &lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (transaction_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(transaction_id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(*unit_price * Decimal::from(*quantity))
            .execute(&mut *tx)
            .await?;

            // Sale movements skip the pending state: the cashier both performs
            // and approves them.
            sqlx::query(
                r#"
                INSERT INTO stock_movements
                    (product_id, movement_type, quantity, reason, performed_by, status, reviewed_by)
                VALUES ($1, 'out', $2, $3, $4, 'approved', $4)
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .bind(format!("Sale {}", transaction_number))
            .bind(user.user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            transaction_number = %transaction_number,
            total = %total_amount,
            "Recorded sale"
        );

        Ok(CreateTransactionResponse {
            transaction_id,
            transaction_number,
            transaction_date: now,
            total_amount,
        })
    }

    /// Get a transaction with its items. Cashiers may only read their own.
    pub async fn get(&self, user: &AuthUser, transaction_id: Uuid) -> AppResult<TransactionWithItems> {
        let sql = format!("{} WHERE id = $1", SELECT_TRANSACTION);
        let transaction = sqlx::query_as::<_, TransactionRecord>(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        if user.role != UserRole::Owner && transaction.cashier_id != user.user_id {
            return Err(AppError::NotFound("Transaction".to_string()));
        }

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, quantity, unit_price, total_price
            FROM transaction_items
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.db)
        .await?;

        Ok(TransactionWithItems { transaction, items })
    }

    /// List transactions; the owner sees everything, a cashier sees their own
    pub async fn list(&self, user: &AuthUser) -> AppResult<Vec<TransactionRecord>> {
        let sql = if user.role == UserRole::Owner {
            format!("{} ORDER BY transaction_date DESC", SELECT_TRANSACTION)
        } else {
            format!(
                "{} WHERE cashier_id = $1 ORDER BY transaction_date DESC",
                SELECT_TRANSACTION
            )
        };

        let mut query = sqlx::query_as::<_, TransactionRecord>(&sql);
        if user.role != UserRole::Owner {
            query = query.bind(user.user_id);
        }

        Ok(query.fetch_all(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_final_total_subtracts_discount() {
        assert_eq!(final_total(dec!(100.00), dec!(15.00)), dec!(85.00));
    }

    #[test]
    fn test_final_total_clamps_to_zero() {
        assert_eq!(final_total(dec!(20.00), dec!(50.00)), Decimal::ZERO);
        assert_eq!(final_total(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_transaction_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let number = generate_transaction_number(now);

        assert!(number.starts_with("TRX-20250314092653-"));
        assert_eq!(number.len(), "TRX-20250314092653-".len() + 6);
    }

    #[test]
    fn test_transaction_numbers_differ() {
        let now = Utc::now();
        let a = generate_transaction_number(now);
        let b = generate_transaction_number(now);
        assert_ne!(a, b);
    }
}
