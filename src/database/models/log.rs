use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::ticket::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    TicketCreated,
    TicketUpdated,
    TicketDeleted,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::TicketCreated => "ticket_created",
            LogAction::TicketUpdated => "ticket_updated",
            LogAction::TicketDeleted => "ticket_deleted",
        }
    }
}

impl FromStr for LogAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket_created" => Ok(LogAction::TicketCreated),
            "ticket_updated" => Ok(LogAction::TicketUpdated),
            "ticket_deleted" => Ok(LogAction::TicketDeleted),
            other => Err(UnknownVariant { kind: "log action", value: other.to_string() }),
        }
    }
}

impl TryFrom<String> for LogAction {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One entry of the ticket activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: String,
    #[sqlx(try_from = "String")]
    pub action: LogAction,
    pub ticket_id: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(action: LogAction, ticket_id: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            ticket_id: ticket_id.into(),
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }
}
