//! Product catalog service
//!
//! Owner-managed CRUD. Listings carry the derived current stock so the
//! dashboard never has to add up movements itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product record with derived stock
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub base_stock: i64,
    pub category: String,
    pub image_ref: Option<String>,
    pub current_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub base_stock: Option<i64>,
    pub category: Option<String>,
    pub image_ref: Option<String>,
}

/// Input for updating a product. Direct base_stock edits are admin
/// corrections; routine stock changes go through the movement workflow.
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub base_stock: Option<i64>,
    pub category: Option<String>,
    pub image_ref: Option<String>,
}

const PRODUCT_WITH_STOCK: &str = r#"
    SELECT p.id, p.name, p.price, p.base_stock, p.category, p.image_ref,
           p.base_stock + COALESCE(SUM(
               CASE WHEN m.movement_type = 'in' THEN m.quantity
                    WHEN m.movement_type = 'out' THEN -m.quantity
                    ELSE 0 END), 0) AS current_stock,
           p.created_at, p.updated_at
    FROM products p
    LEFT JOIN stock_movements m ON m.product_id = p.id AND m.status = 'approved'
"#;

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product (owner only)
    pub async fn create(&self, user: &AuthUser, input: CreateProductInput) -> AppResult<Product> {
        user.require_owner()?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
                message_th: "ต้องระบุชื่อสินค้า".to_string(),
            });
        }

        if input.price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price must not be negative".to_string(),
                message_th: "ราคาต้องไม่ติดลบ".to_string(),
            });
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, price, base_stock, category, image_ref)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.base_stock.unwrap_or(0))
        .bind(input.category.as_deref().unwrap_or("general"))
        .bind(&input.image_ref)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Get a product by id, with derived stock
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let sql = format!(
            "{} WHERE p.id = $1 GROUP BY p.id, p.name, p.price, p.base_stock, p.category, p.image_ref, p.created_at, p.updated_at",
            PRODUCT_WITH_STOCK
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// List all products with derived stock
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let sql = format!(
            "{} GROUP BY p.id, p.name, p.price, p.base_stock, p.category, p.image_ref, p.created_at, p.updated_at ORDER BY p.name",
            PRODUCT_WITH_STOCK
        );

        let products = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.db).await?;

        Ok(products)
    }

    /// Update a product (owner only); omitted fields keep their value
    pub async fn update(
        &self,
        user: &AuthUser,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        user.require_owner()?;

        let existing = sqlx::query_as::<_, (String, Decimal, i64, String, Option<String>)>(
            "SELECT name, price, base_stock, category, image_ref FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let name = input.name.unwrap_or(existing.0);
        let price = input.price.unwrap_or(existing.1);
        let base_stock = input.base_stock.unwrap_or(existing.2);
        let category = input.category.unwrap_or(existing.3);
        let image_ref = input.image_ref.or(existing.4);

        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
                message_th: "ต้องระบุชื่อสินค้า".to_string(),
            });
        }

        if price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price must not be negative".to_string(),
                message_th: "ราคาต้องไม่ติดลบ".to_string(),
            });
        }

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, price = $2, base_stock = $3, category = $4, image_ref = $5, updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(name.trim())
        .bind(price)
        .bind(base_stock)
        .bind(&category)
        .bind(&image_ref)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        self.get(product_id).await
    }

    /// Delete a product (owner only)
    pub async fn delete(&self, user: &AuthUser, product_id: Uuid) -> AppResult<()> {
        user.require_owner()?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
