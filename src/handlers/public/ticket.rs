// handlers/public/ticket.rs - Ticket reads
//
// GET /api/ticket/all?status=active|deleted
// GET /api/ticket/nearby?lat=..&lon=..&radius=..
// GET /api/ticket/:id

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::{ticket_views, TicketView};
use crate::database::models::TicketStatus;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
}

/// GET /api/ticket/all - Tickets with the given status (active by default)
pub async fn ticket_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<TicketView>> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => TicketStatus::Active,
        Some(raw) => raw
            .parse::<TicketStatus>()
            .map_err(|_| ApiError::bad_request("Status must be one of: active, deleted"))?,
    };

    let tickets = state.tickets.list(status).await?;

    Ok(ApiResponse::success(ticket_views(tickets)))
}

/// GET /api/ticket/nearby - Active tickets within `radius` km of a point
pub async fn ticket_nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<Vec<TicketView>> {
    let (Some(lat), Some(lon), Some(radius)) = (query.lat, query.lon, query.radius) else {
        return Err(ApiError::bad_request("Query parameters lat, lon and radius are required"));
    };

    let tickets = state.tickets.nearby(&lat, &lon, &radius).await?;

    Ok(ApiResponse::success(ticket_views(tickets)))
}

/// GET /api/ticket/:id - A single ticket, deleted or not
pub async fn ticket_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TicketView> {
    let ticket = state.tickets.get(&id).await?;

    Ok(ApiResponse::success(TicketView::from(ticket)))
}
