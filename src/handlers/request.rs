//! HTTP handlers for product request endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::request::{
    ProductRequest, ProductRequestService, ReviewRequestInput, SubmitRequestInput,
};
use crate::AppState;

/// Submit a product request (storekeeper)
pub async fn submit_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SubmitRequestInput>,
) -> AppResult<Json<ProductRequest>> {
    let service = ProductRequestService::new(state.db);
    let request = service.submit(&current_user.0, input).await?;
    Ok(Json(request))
}

/// List product requests
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductRequest>>> {
    let service = ProductRequestService::new(state.db);
    let requests = service.list(&current_user.0).await?;
    Ok(Json(requests))
}

/// Approve a product request (owner only)
pub async fn approve_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ReviewRequestInput>,
) -> AppResult<Json<ProductRequest>> {
    let service = ProductRequestService::new(state.db);
    let request = service
        .approve(&current_user.0, request_id, input.comment)
        .await?;
    Ok(Json(request))
}

/// Reject a product request (owner only, comment required)
pub async fn reject_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ReviewRequestInput>,
) -> AppResult<Json<ProductRequest>> {
    let service = ProductRequestService::new(state.db);
    let request = service
        .reject(&current_user.0, request_id, input.comment)
        .await?;
    Ok(Json(request))
}
