//! HTTP handlers for sales transaction endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::transaction::{
    CreateTransactionInput, CreateTransactionResponse, TransactionRecord, TransactionService,
    TransactionWithItems,
};
use crate::AppState;

/// Record a sale
pub async fn create_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTransactionInput>,
) -> AppResult<Json<CreateTransactionResponse>> {
    let service = TransactionService::new(state.db);
    let response = service.create(&current_user.0, input).await?;
    Ok(Json(response))
}

/// Get a transaction with its items
pub async fn get_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<TransactionWithItems>> {
    let service = TransactionService::new(state.db);
    let transaction = service.get(&current_user.0, transaction_id).await?;
    Ok(Json(transaction))
}

/// List transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TransactionRecord>>> {
    let service = TransactionService::new(state.db);
    let transactions = service.list(&current_user.0).await?;
    Ok(Json(transactions))
}
