//! Customer management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::UserRole;

/// Customer service for CRUD over the customer directory
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Customer record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a customer
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

const SELECT_CUSTOMER: &str =
    "SELECT id, name, phone, email, address, created_at, updated_at FROM customers";

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a customer (cashier or owner)
    pub async fn create(&self, user: &AuthUser, input: CreateCustomerInput) -> AppResult<Customer> {
        user.require_role(&[UserRole::Cashier, UserRole::Owner])?;

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Customer name is required".to_string(),
                message_th: "ต้องระบุชื่อลูกค้า".to_string(),
            });
        }

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (name, phone, email, address) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, phone, email, address, created_at, updated_at",
        )
            .bind(input.name.trim())
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_one(&self.db)
            .await?;

        Ok(customer)
    }

    /// Get a customer by id
    pub async fn get(&self, customer_id: Uuid) -> AppResult<Customer> {
        let sql = format!("{} WHERE id = $1", SELECT_CUSTOMER);

        sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// List all customers
    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        let sql = format!("{} ORDER BY name", SELECT_CUSTOMER);

        Ok(sqlx::query_as::<_, Customer>(&sql).fetch_all(&self.db).await?)
    }

    /// Update a customer (cashier or owner); omitted fields keep their value
    pub async fn update(
        &self,
        user: &AuthUser,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        user.require_role(&[UserRole::Cashier, UserRole::Owner])?;

        let existing = self.get(customer_id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Customer name is required".to_string(),
                message_th: "ต้องระบุชื่อลูกค้า".to_string(),
            });
        }

        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET name = $1, phone = $2, email = $3, address = $4, updated_at = NOW() \
             WHERE id = $5 RETURNING id, name, phone, email, address, created_at, updated_at",
        )
            .bind(name.trim())
            .bind(input.phone.or(existing.phone))
            .bind(input.email.or(existing.email))
            .bind(input.address.or(existing.address))
            .bind(customer_id)
            .fetch_one(&self.db)
            .await?;

        Ok(customer)
    }

    /// Delete a customer (owner only)
    pub async fn delete(&self, user: &AuthUser, customer_id: Uuid) -> AppResult<()> {
        user.require_owner()?;

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }
}
