//! Reporting service
//!
//! Read-only SQL aggregations for the dashboard. Reversed transactions are
//! excluded from every revenue figure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Date range filter; both ends optional
#[derive(Debug, Deserialize)]
pub struct ReportRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Sales summary over a range
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesSummary {
    pub transaction_count: i64,
    pub total_revenue: Decimal,
    pub total_discount: Decimal,
    pub average_sale: Decimal,
}

/// Best-selling product over a range
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Revenue, count and average over active transactions in the range
    pub async fn sales_summary(&self, user: &AuthUser, range: ReportRange) -> AppResult<SalesSummary> {
        user.require_owner()?;

        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT COUNT(*) AS transaction_count,
                   COALESCE(SUM(total_amount), 0) AS total_revenue,
                   COALESCE(SUM(discount), 0) AS total_discount,
                   COALESCE(AVG(total_amount), 0) AS average_sale
            FROM transactions
            WHERE status = 'active'
              AND ($1::TIMESTAMPTZ IS NULL OR transaction_date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR transaction_date <= $2)
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }

    /// Best-selling products by quantity over active transactions in the range
    pub async fn top_products(
        &self,
        user: &AuthUser,
        range: ReportRange,
        limit: i64,
    ) -> AppResult<Vec<TopProduct>> {
        user.require_owner()?;

        let products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   COALESCE(SUM(ti.quantity), 0) AS total_quantity,
                   COALESCE(SUM(ti.total_price), 0) AS total_revenue
            FROM transaction_items ti
            JOIN transactions t ON t.id = ti.transaction_id AND t.status = 'active'
            JOIN products p ON p.id = ti.product_id
            WHERE ($1::TIMESTAMPTZ IS NULL OR t.transaction_date >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR t.transaction_date <= $2)
            GROUP BY p.id, p.name
            ORDER BY total_quantity DESC
            LIMIT $3
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }
}
