// services/ticket_service.rs - Ticket lifecycle: active -> deleted (terminal)

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::MAX_IMAGE_BYTES;
use crate::database::models::{ActivityLog, LogAction, NewTicket, Ticket, TicketStatus};
use crate::database::{LogStore, StoreError, TicketStore};
use crate::error::ApiError;
use crate::geo::{filter_nearby, parse_radius, Coordinate, GeoError};
use crate::services::validation::{validate_ticket, TicketInput, ValidTicket, ValidationErrors};
use crate::storage::{BlobError, BlobStore, ImageUpload};

pub const IMAGE_TOO_LARGE: &str = "File size is too large. Maximum limit is 2MB.";
pub const IMAGE_INVALID_TYPE: &str = "Invalid file type. Allowed file types are: JPEG, PNG, JPG, GIF.";
pub const IMAGE_REQUIRED: &str = "Image file is required";

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("{}", .0.message())]
    Validation(ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid query: {0}")]
    Query(#[from] GeoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl From<ValidationErrors> for TicketError {
    fn from(errors: ValidationErrors) -> Self {
        TicketError::Validation(errors)
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::Validation(errors) => errors.into(),
            TicketError::Unauthorized(msg) => ApiError::unauthorized(msg),
            TicketError::NotFound(msg) => ApiError::not_found(msg),
            TicketError::Conflict(msg) => ApiError::conflict(msg),
            TicketError::Query(e) => e.into(),
            TicketError::Store(e) => e.into(),
            TicketError::Blob(e) => e.into(),
        }
    }
}

/// The `image_file` part of a create request as the handler received it
#[derive(Debug, Clone)]
pub enum ImageField {
    Missing,
    /// The upload exceeded the byte cap and was not buffered completely
    Oversized,
    Provided(ImageUpload),
}

/// Creates, reads, lists, searches, updates and soft-deletes tickets
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    logs: Arc<dyn LogStore>,
    blobs: Arc<dyn BlobStore>,
    max_image_bytes: usize,
}

impl TicketService {
    pub fn new(tickets: Arc<dyn TicketStore>, logs: Arc<dyn LogStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            tickets,
            logs,
            blobs,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Create a ticket owned by `creator`.
    ///
    /// Fields and image are validated together; the image is stored only
    /// once everything passed, and the id is assigned by the store.
    pub async fn create(
        &self,
        creator: &str,
        input: &TicketInput,
        image: ImageField,
    ) -> Result<Ticket, TicketError> {
        let mut errors = ValidationErrors::new();
        let valid = validate_ticket(input).map_err(|e| errors = e).ok();
        let image = self.check_image(image, &mut errors);

        let (Some(valid), Some(image)) = (valid, image) else {
            return Err(TicketError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(TicketError::Validation(errors));
        }

        let image_url = self.blobs.put_image(&image).await?;
        let ValidTicket {
            title,
            price,
            description,
            street_location,
            latitude,
            longitude,
            kind,
            ..
        } = valid;
        let ticket_type = kind.ticket_type();
        let (start_datetime, end_datetime) = kind.into_schedule();

        let ticket = self
            .tickets
            .insert(NewTicket {
                title,
                description,
                street_location,
                price,
                latitude,
                longitude,
                ticket_type,
                start_datetime,
                end_datetime,
                creator: creator.to_string(),
                image_url,
                created_at: Utc::now(),
            })
            .await?;

        info!("Ticket {} created by {}", ticket.id, creator);
        self.record(LogAction::TicketCreated, &ticket.id, creator).await?;
        Ok(ticket)
    }

    fn check_image(&self, image: ImageField, errors: &mut ValidationErrors) -> Option<ImageUpload> {
        match image {
            ImageField::Missing => {
                errors.add("image_file", IMAGE_REQUIRED);
                None
            }
            ImageField::Oversized => {
                errors.add("image_file", IMAGE_TOO_LARGE);
                None
            }
            ImageField::Provided(upload) => {
                let mut ok = true;
                if upload.bytes.is_empty() {
                    errors.add("image_file", IMAGE_REQUIRED);
                    ok = false;
                } else if upload.bytes.len() > self.max_image_bytes {
                    errors.add("image_file", IMAGE_TOO_LARGE);
                    ok = false;
                }
                if !ImageUpload::is_allowed_type(&upload.content_type) {
                    errors.add("image_file", IMAGE_INVALID_TYPE);
                    ok = false;
                }
                ok.then_some(upload)
            }
        }
    }

    /// Any ticket, deleted ones included.
    pub async fn get(&self, id: &str) -> Result<Ticket, TicketError> {
        self.tickets
            .get(id)
            .await?
            .ok_or_else(|| TicketError::NotFound(format!("Ticket with ID {} not found", id)))
    }

    /// Tickets with `status`; an empty result is `NotFound`.
    pub async fn list(&self, status: TicketStatus) -> Result<Vec<Ticket>, TicketError> {
        let tickets = self.tickets.list_by_status(status).await?;
        if tickets.is_empty() {
            return Err(TicketError::NotFound(format!("No {} tickets found", status)));
        }
        Ok(tickets)
    }

    /// Active tickets within `radius` km of (`lat`, `lon`).
    ///
    /// `NotFound` only when there are no active tickets at all; an empty
    /// neighbourhood is an empty list.
    pub async fn nearby(&self, lat: &str, lon: &str, radius: &str) -> Result<Vec<Ticket>, TicketError> {
        let origin = Coordinate::parse(lat, lon)?;
        let radius = parse_radius(radius)?;

        let active = self.list(TicketStatus::Active).await?;
        Ok(filter_nearby(&active, origin, radius).into_iter().cloned().collect())
    }

    /// The current ticket, if `requester` may still change it.
    ///
    /// Checks existence, then ownership, then that the ticket is not deleted.
    pub async fn writable(&self, id: &str, requester: &str) -> Result<Ticket, TicketError> {
        let current = self.get(id).await?;
        if current.creator != requester {
            return Err(TicketError::Unauthorized(
                "Only the creator of this ticket can change it".to_string(),
            ));
        }
        if current.is_deleted() {
            return Err(TicketError::Conflict(format!("Ticket {} has been deleted", id)));
        }
        Ok(current)
    }

    /// Merge-patch `patch` over ticket `id` on behalf of `requester`.
    pub async fn update(&self, id: &str, requester: &str, patch: &Value) -> Result<Ticket, TicketError> {
        let current = self.writable(id, requester).await?;

        let patch = TicketInput::from_json(patch)?;
        let valid = validate_ticket(&patch.merged_over(&current))?;

        let ticket_type = valid.kind.ticket_type();
        let (start_datetime, end_datetime) = valid.kind.into_schedule();
        let updated = Ticket {
            title: valid.title,
            description: valid.description,
            street_location: valid.street_location,
            price: valid.price,
            latitude: valid.latitude,
            longitude: valid.longitude,
            ticket_type,
            start_datetime,
            end_datetime,
            updated_at: Utc::now(),
            ..current
        };

        self.tickets.replace_active(&updated).await.map_err(conflict_or_store)?;
        info!("Ticket {} updated by {}", id, requester);
        self.record(LogAction::TicketUpdated, id, requester).await?;
        Ok(updated)
    }

    /// Mark ticket `id` deleted. Irreversible.
    pub async fn soft_delete(&self, id: &str, requester: &str) -> Result<Ticket, TicketError> {
        let current = self.writable(id, requester).await?;

        let deleted = Ticket {
            status: TicketStatus::Deleted,
            updated_at: Utc::now(),
            ..current
        };

        self.tickets.replace_active(&deleted).await.map_err(conflict_or_store)?;
        info!("Ticket {} deleted by {}", id, requester);
        self.record(LogAction::TicketDeleted, id, requester).await?;
        Ok(deleted)
    }

    // The ticket write has already happened; a failed log append is reported, not undone
    async fn record(&self, action: LogAction, ticket_id: &str, actor: &str) -> Result<(), TicketError> {
        let entry = ActivityLog::new(action, ticket_id, actor);
        self.logs.append(&entry).await.map_err(|e| {
            error!("Failed to record {} for {}: {}", action.as_str(), ticket_id, e);
            TicketError::Store(e)
        })
    }
}

// A concurrent delete between read and write surfaces as a conflict
fn conflict_or_store(err: StoreError) -> TicketError {
    match err {
        StoreError::Conflict(msg) => TicketError::Conflict(msg),
        StoreError::NotFound(msg) => TicketError::NotFound(msg),
        other => TicketError::Store(other),
    }
}
