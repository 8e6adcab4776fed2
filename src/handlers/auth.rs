//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthService, AuthTokens, RegisterUserInput, UserProfile};
use crate::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(&input.email, &input.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.refresh_token(&input.refresh_token).await?;
    Ok(Json(tokens))
}

/// Create a staff account (owner only)
pub async fn register_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterUserInput>,
) -> AppResult<Json<UserProfile>> {
    let service = AuthService::new(state.db, &state.config);
    let profile = service.register_user(&current_user.0, input).await?;
    Ok(Json(profile))
}

/// Identity of the calling user, as decoded from the bearer token
pub async fn me(current_user: CurrentUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "user_id": current_user.0.user_id,
        "name": current_user.0.name,
        "role": current_user.0.role,
    }))
}
