// handlers/protected/ticket.rs - Ticket writes (creator-owned)
//
// POST   /api/ticket      multipart fields + image_file
// PUT    /api/ticket/:id  partial JSON object
// DELETE /api/ticket/:id

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    Extension, Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::TicketView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ImageField, TicketInput};
use crate::state::AppState;
use crate::storage::ImageUpload;

const IMAGE_FIELD: &str = "image_file";

/// POST /api/ticket - Create a ticket owned by the caller
pub async fn ticket_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<TicketView> {
    let multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let (fields, image) = read_ticket_form(multipart, state.config.storage.max_image_bytes).await?;
    let input = TicketInput::from_form(fields);

    let ticket = state.tickets.create(&user.username, &input, image).await?;

    Ok(ApiResponse::success(TicketView::from(ticket)).with_message("Ticket created"))
}

/// PUT /api/ticket/:id - Merge-patch a ticket
pub async fn ticket_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TicketView> {
    // Existence, ownership and state are reported before a malformed body
    let Json(patch) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            state.tickets.writable(&id, &user.username).await?;
            return Err(rejection.into());
        }
    };

    let ticket = state.tickets.update(&id, &user.username, &patch).await?;

    Ok(ApiResponse::success(TicketView::from(ticket)).with_message("Ticket updated"))
}

/// DELETE /api/ticket/:id - Soft-delete a ticket
pub async fn ticket_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<TicketView> {
    let ticket = state.tickets.soft_delete(&id, &user.username).await?;

    Ok(ApiResponse::success(TicketView::from(ticket))
        .with_message(format!("Ticket with ID {} has been deleted", id)))
}

/// Split a multipart body into text fields and the image part.
async fn read_ticket_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<(HashMap<String, String>, ImageField), ApiError> {
    let mut fields = HashMap::new();
    let mut image = ImageField::Missing;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            if matches!(image, ImageField::Missing) {
                image = read_image(field, max_image_bytes).await?;
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        fields.entry(name).or_insert(value);
    }

    Ok((fields, image))
}

/// Buffer the image chunk by chunk, giving up once it passes the cap.
async fn read_image(mut field: Field<'_>, max_image_bytes: usize) -> Result<ImageField, ApiError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    let file_name = field.file_name().map(str::to_string);

    let mut buffer = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buffer.len() + chunk.len() > max_image_bytes {
            tracing::debug!("Image upload exceeded {} bytes", max_image_bytes);
            return Ok(ImageField::Oversized);
        }
        buffer.extend_from_slice(&chunk);
    }

    if buffer.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
        return Ok(ImageField::Missing);
    }

    Ok(ImageField::Provided(ImageUpload {
        file_name,
        content_type,
        bytes: Bytes::from(buffer),
    }))
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart body: {}", err.body_text()))
}
