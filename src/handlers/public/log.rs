// handlers/public/log.rs - Ticket activity log
//
// GET /api/log/all
// GET /api/log/:id_log

use axum::extract::{Path, State};

use crate::database::models::ActivityLog;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/log/all - Every entry, newest first
pub async fn log_list(State(state): State<AppState>) -> ApiResult<Vec<ActivityLog>> {
    let logs = state.logs.list_logs().await?;
    if logs.is_empty() {
        return Err(ApiError::not_found("No logs found"));
    }

    Ok(ApiResponse::success(logs))
}

/// GET /api/log/:id_log
pub async fn log_get(
    State(state): State<AppState>,
    Path(id_log): Path<String>,
) -> ApiResult<ActivityLog> {
    let entry = state
        .logs
        .get_log(&id_log)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Log with ID {} not found", id_log)))?;

    Ok(ApiResponse::success(entry))
}
