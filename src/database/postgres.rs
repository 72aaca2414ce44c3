use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{ticket_id, ActivityLog, NewTicket, Ticket, TicketStatus, User};
use crate::database::store::{LogStore, StoreError, TicketStore, UserStore};

const UNIQUE_VIOLATION: &str = "23505";

const TICKET_COLUMNS: &str = "id, title, description, street_location, price, latitude, longitude, \
     type, start_datetime, end_datetime, creator, status, image_url, created_at, updated_at";

/// PostgreSQL-backed document store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert(&self, new: NewTicket) -> Result<Ticket, StoreError> {
        // The sequence hands out each value once, even across concurrent inserts
        let sequence: i64 = sqlx::query_scalar("SELECT nextval('ticket_seq')")
            .fetch_one(&self.pool)
            .await?;
        let ticket = Ticket::from_new(ticket_id(sequence as u64), new);

        sqlx::query(
            "INSERT INTO tickets (id, title, description, street_location, price, latitude, longitude,
                 type, start_datetime, end_datetime, creator, status, image_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(&ticket.id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.street_location)
        .bind(ticket.price)
        .bind(&ticket.latitude)
        .bind(&ticket.longitude)
        .bind(ticket.ticket_type.as_str())
        .bind(&ticket.start_datetime)
        .bind(&ticket.end_datetime)
        .bind(&ticket.creator)
        .bind(ticket.status.as_str())
        .bind(&ticket.image_url)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1", TICKET_COLUMNS);
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE status = $1 ORDER BY created_at, id",
            TICKET_COLUMNS
        );
        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn replace_active(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET
                 title = $2, description = $3, street_location = $4, price = $5,
                 latitude = $6, longitude = $7, type = $8, start_datetime = $9,
                 end_datetime = $10, status = $11, updated_at = $12
             WHERE id = $1 AND status = 'active'",
        )
        .bind(&ticket.id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.street_location)
        .bind(ticket.price)
        .bind(&ticket.latitude)
        .bind(&ticket.longitude)
        .bind(ticket.ticket_type.as_str())
        .bind(&ticket.start_datetime)
        .bind(&ticket.end_datetime)
        .bind(ticket.status.as_str())
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists: Option<String> = sqlx::query_scalar("SELECT status FROM tickets WHERE id = $1")
            .bind(&ticket.id)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Err(StoreError::Conflict(format!("ticket {} is deleted", ticket.id))),
            None => Err(StoreError::NotFound(format!("ticket {}", ticket.id))),
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (username, name, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::AlreadyExists(format!("user {}", user.username)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, name, email, password_hash, created_at, updated_at
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = $5
             WHERE username = $1",
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.username)));
        }
        Ok(())
    }
}

#[async_trait]
impl LogStore for PgStore {
    async fn append(&self, entry: &ActivityLog) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO logs (id, action, ticket_id, actor, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(entry.action.as_str())
        .bind(&entry.ticket_id)
        .bind(&entry.actor)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<ActivityLog>, StoreError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            "SELECT id, action, ticket_id, actor, created_at FROM logs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn get_log(&self, id: &str) -> Result<Option<ActivityLog>, StoreError> {
        let log = sqlx::query_as::<_, ActivityLog>(
            "SELECT id, action, ticket_id, actor, created_at FROM logs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(log)
    }
}
