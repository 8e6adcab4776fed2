//! HTTP handlers for reversal request endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reversal::{
    RequestReversalInput, ReversalRequest, ReversalService, ReviewReversalInput,
};
use crate::AppState;

/// Request a reversal of a sale (cashier)
pub async fn request_reversal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RequestReversalInput>,
) -> AppResult<Json<ReversalRequest>> {
    let service = ReversalService::new(state.db);
    let request = service.request(&current_user.0, input).await?;
    Ok(Json(request))
}

/// List reversal requests
pub async fn list_reversals(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ReversalRequest>>> {
    let service = ReversalService::new(state.db);
    let requests = service.list(&current_user.0).await?;
    Ok(Json(requests))
}

/// Approve a reversal request (owner only)
pub async fn approve_reversal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ReviewReversalInput>,
) -> AppResult<Json<ReversalRequest>> {
    let service = ReversalService::new(state.db);
    let request = service
        .approve(&current_user.0, request_id, input.comment)
        .await?;
    Ok(Json(request))
}

/// Reject a reversal request (owner only, comment required)
pub async fn reject_reversal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<ReviewReversalInput>,
) -> AppResult<Json<ReversalRequest>> {
    let service = ReversalService::new(state.db);
    let request = service
        .reject(&current_user.0, request_id, input.comment)
        .await?;
    Ok(Json(request))
}
