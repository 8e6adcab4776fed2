//! HTTP handlers for stock movement and ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::ApprovalStatus;
use crate::services::stock::{
    ReviewMovementInput, StockLevel, StockMovement, StockService, SubmitMovementInput,
};
use crate::AppState;

/// Query parameters for listing movements
#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub status: Option<ApprovalStatus>,
    pub product_id: Option<Uuid>,
}

/// Derived stock for one product
#[derive(Debug, Serialize)]
pub struct StockLevelResponse {
    pub product_id: Uuid,
    pub current_stock: i64,
}

/// Submit a stock movement (starts pending)
pub async fn submit_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SubmitMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.db);
    let movement = service.submit_movement(&current_user.0, input).await?;
    Ok(Json(movement))
}

/// List movements, optionally filtered by status and product
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    let movements = service.list_movements(query.status, query.product_id).await?;
    Ok(Json(movements))
}

/// Approve a pending movement (owner only)
pub async fn approve_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<ReviewMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.db);
    let movement = service
        .approve_movement(&current_user.0, movement_id, input.comment)
        .await?;
    Ok(Json(movement))
}

/// Reject a pending movement (owner only, comment required)
pub async fn reject_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<ReviewMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.db);
    let movement = service
        .reject_movement(&current_user.0, movement_id, input.comment)
        .await?;
    Ok(Json(movement))
}

/// Derived stock for a single product
pub async fn get_stock_level(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<StockLevelResponse>> {
    let service = StockService::new(state.db);
    let current_stock = service.current_stock(product_id).await?;
    Ok(Json(StockLevelResponse {
        product_id,
        current_stock,
    }))
}

/// Derived stock levels for every product
pub async fn list_stock_levels(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db);
    let levels = service.stock_levels().await?;
    Ok(Json(levels))
}
