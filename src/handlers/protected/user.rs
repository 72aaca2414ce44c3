// handlers/protected/user.rs - PUT /api/user/edit

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::EditRequest;
use crate::state::AppState;

/// PUT /api/user/edit - Update the caller's own profile
///
/// Accepts any of `name`, `email`, `new_password` + `confirm_password`.
pub async fn user_edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> ApiResult<UserSummary> {
    let Json(request) = payload?;

    let summary = state.users.edit(&user.username, request).await?;

    Ok(ApiResponse::success(summary).with_message("Profile updated"))
}
