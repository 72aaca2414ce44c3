// handlers/public/user.rs - Account registration and token acquisition
//
// POST /api/user/register
// POST /api/user/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;

/// POST /api/user/register - Create an account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "name": "Alice", "email": "alice@example.com",
///   "password": "secret123", "confirm_password": "secret123" }
/// ```
pub async fn user_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserSummary> {
    let Json(request) = payload?;

    let summary = state.users.register(request).await?;

    Ok(ApiResponse::created(summary).with_message("Registration Success"))
}

/// POST /api/user/login - Exchange credentials for a bearer token
pub async fn user_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    let token = state.users.login(request).await?;

    Ok(ApiResponse::success(token).with_message("Login Success"))
}
