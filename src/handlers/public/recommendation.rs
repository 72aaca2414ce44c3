// handlers/public/recommendation.rs - GET /api/recommendation/:username

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Relays the recommendation service's JSON answer as-is, without the envelope.
pub async fn recommendation_get(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state.recommendations.recommend(&username).await?;
    Ok(Json(body))
}
