use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{ActivityLog, NewTicket, Ticket, TicketStatus, User};

/// Errors from the document store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The stored record is in a terminal state and may not be replaced
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Ticket collection
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a ticket, assigning the next `TICnnnnnn` id atomically.
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError>;

    /// Tickets with the given status, oldest id first.
    async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, StoreError>;

    /// Replace a ticket, but only while the stored copy is still active.
    ///
    /// Fails with `NotFound` for unknown ids and `Conflict` when the stored
    /// copy has been deleted, so a deleted ticket can never be resurrected.
    async fn replace_active(&self, ticket: &Ticket) -> Result<(), StoreError>;
}

/// User accounts keyed by username
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AlreadyExists` when the username is taken.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn save_user(&self, user: &User) -> Result<(), StoreError>;
}

/// Append-only ticket activity log
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: &ActivityLog) -> Result<(), StoreError>;

    /// All entries, newest first.
    async fn list_logs(&self) -> Result<Vec<ActivityLog>, StoreError>;

    async fn get_log(&self, id: &str) -> Result<Option<ActivityLog>, StoreError>;
}
