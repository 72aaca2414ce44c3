use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::geo::{Coordinate, Located};

pub const TICKET_ID_PREFIX: &str = "TIC";

/// Format a sequence number as a ticket id, e.g. `42` -> `TIC000042`.
pub fn ticket_id(sequence: u64) -> String {
    format!("{}{:06}", TICKET_ID_PREFIX, sequence)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Event,
    Place,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Deleted,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub(crate) kind: &'static str,
    pub(crate) value: String,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Event => "event",
            TicketType::Place => "place",
        }
    }
}

impl FromStr for TicketType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "event" => Ok(TicketType::Event),
            "place" => Ok(TicketType::Place),
            other => Err(UnknownVariant { kind: "ticket type", value: other.to_string() }),
        }
    }
}

impl TryFrom<String> for TicketType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(TicketStatus::Active),
            "deleted" => Ok(TicketStatus::Deleted),
            other => Err(UnknownVariant { kind: "ticket status", value: other.to_string() }),
        }
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored ticket listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub street_location: String,
    pub price: f64,
    pub latitude: String,
    pub longitude: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub ticket_type: TicketType,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub creator: String,
    #[sqlx(try_from = "String")]
    pub status: TicketStatus,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_deleted(&self) -> bool {
        self.status == TicketStatus::Deleted
    }

    /// Build the stored record for a freshly inserted ticket.
    pub fn from_new(id: String, new: NewTicket) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            street_location: new.street_location,
            price: new.price,
            latitude: new.latitude,
            longitude: new.longitude,
            ticket_type: new.ticket_type,
            start_datetime: new.start_datetime,
            end_datetime: new.end_datetime,
            creator: new.creator,
            status: TicketStatus::Active,
            image_url: new.image_url,
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }
}

impl Located for Ticket {
    fn position(&self) -> Option<Coordinate> {
        Coordinate::parse(&self.latitude, &self.longitude).ok()
    }
}

/// Everything needed to insert a ticket; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub street_location: String,
    pub price: f64,
    pub latitude: String,
    pub longitude: String,
    pub ticket_type: TicketType,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub creator: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}
