// services/validation.rs - Field validation that reports every violation at once

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::database::models::{Ticket, TicketType};
use crate::geo::{parse_coordinate_pair, GeoError};

pub const MIN_PRICE: f64 = 0.0;
pub const MAX_PRICE: f64 = 100_000_000.0;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Ticket fields that only the lifecycle manager may set
pub const IMMUTABLE_TICKET_FIELDS: [&str; 6] =
    ["id", "creator", "status", "image_url", "created_at", "updated_at"];

/// Ordered list of `(field, message)` violations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push((field.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|(f, _)| f == field)
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(_, m)| m.as_str())
    }

    /// All messages joined into one line
    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            return "Validation error".to_string();
        }
        self.messages().collect::<Vec<_>>().join(", ")
    }

    /// Field -> message map; several messages for one field are joined with "; "
    pub fn field_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (field, message) in &self.errors {
            map.entry(field.clone())
                .and_modify(|existing| {
                    existing.push_str("; ");
                    existing.push_str(message);
                })
                .or_insert_with(|| message.clone());
        }
        map
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Raw ticket fields as they arrive from a form or a JSON patch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketInput {
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub street_location: Option<String>,
    pub coordinates: Option<String>,
    pub ticket_type: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}

impl TicketInput {
    /// Collect fields from multipart text parts.
    pub fn from_form(mut fields: HashMap<String, String>) -> Self {
        Self {
            title: fields.remove("title"),
            price: fields.remove("price"),
            description: fields.remove("description"),
            street_location: fields.remove("street_location"),
            coordinates: fields.remove("coordinates"),
            ticket_type: fields.remove("type"),
            start_datetime: fields.remove("start_datetime"),
            end_datetime: fields.remove("end_datetime"),
        }
    }

    /// Collect fields from a JSON object. `null` counts as omitted.
    ///
    /// Immutable fields and non-scalar values are reported, not ignored.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(object) = value.as_object() else {
            errors.add("body", "Request body must be a JSON object");
            return Err(errors);
        };

        for field in IMMUTABLE_TICKET_FIELDS {
            if object.contains_key(field) {
                errors.add(field, format!("Field '{}' cannot be changed", field));
            }
        }

        let mut take = |name: &str| scalar_field(object, name, &mut errors);
        let input = Self {
            title: take("title"),
            price: take("price"),
            description: take("description"),
            street_location: take("street_location"),
            coordinates: take("coordinates"),
            ticket_type: take("type"),
            start_datetime: take("start_datetime"),
            end_datetime: take("end_datetime"),
        };

        errors.into_result(input)
    }

    /// Overlay this patch on an existing ticket.
    ///
    /// Omitted fields keep the stored value. When the resulting type is
    /// `place` the stored schedule is dropped; when it is `event` the stored
    /// schedule is kept unless the patch replaces it.
    pub fn merged_over(&self, current: &Ticket) -> TicketInput {
        let resulting_type = self
            .ticket_type
            .clone()
            .unwrap_or_else(|| current.ticket_type.as_str().to_string());
        let keep_schedule = resulting_type.trim() == TicketType::Event.as_str();

        let pick = |patch: &Option<String>, stored: &str| {
            Some(patch.clone().unwrap_or_else(|| stored.to_string()))
        };
        let pick_schedule = |patch: &Option<String>, stored: &Option<String>| {
            patch.clone().or_else(|| if keep_schedule { stored.clone() } else { None })
        };

        TicketInput {
            title: pick(&self.title, &current.title),
            price: pick(&self.price, &current.price.to_string()),
            description: pick(&self.description, &current.description),
            street_location: pick(&self.street_location, &current.street_location),
            coordinates: pick(
                &self.coordinates,
                &format!("{},{}", current.latitude, current.longitude),
            ),
            ticket_type: Some(resulting_type),
            start_datetime: pick_schedule(&self.start_datetime, &current.start_datetime),
            end_datetime: pick_schedule(&self.end_datetime, &current.end_datetime),
        }
    }
}

fn scalar_field(object: &Map<String, Value>, name: &str, errors: &mut ValidationErrors) -> Option<String> {
    match object.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(_) => {
            errors.add(name, format!("Field '{}' must be a string or number", name));
            None
        }
    }
}

/// Schedule part of a ticket, dispatched on the type discriminant
#[derive(Debug, Clone, PartialEq)]
pub enum TicketKind {
    Event { start: String, end: String },
    Place,
}

impl TicketKind {
    pub fn ticket_type(&self) -> TicketType {
        match self {
            TicketKind::Event { .. } => TicketType::Event,
            TicketKind::Place => TicketType::Place,
        }
    }

    pub fn into_schedule(self) -> (Option<String>, Option<String>) {
        match self {
            TicketKind::Event { start, end } => (Some(start), Some(end)),
            TicketKind::Place => (None, None),
        }
    }
}

/// A ticket whose fields passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTicket {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub street_location: String,
    pub latitude: String,
    pub longitude: String,
    pub kind: TicketKind,
}

/// Validate a complete set of ticket fields.
///
/// Common fields are checked first, then the schedule according to `type`.
/// Every violation is collected before returning.
pub fn validate_ticket(input: &TicketInput) -> Result<ValidTicket, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = required_text(&mut errors, "title", "Title", &input.title);
    let description = required_text(&mut errors, "description", "Description", &input.description);
    let street_location =
        required_text(&mut errors, "street_location", "Street location", &input.street_location);
    let price = validate_price(&mut errors, &input.price);
    let coordinates = validate_coordinates(&mut errors, &input.coordinates);

    let kind = match non_empty(&input.ticket_type) {
        None => {
            errors.add("type", "Ticket type is required");
            None
        }
        Some(raw) => match raw.parse::<TicketType>() {
            Ok(TicketType::Event) => validate_event_schedule(&mut errors, input),
            Ok(TicketType::Place) => {
                for (field, value) in [
                    ("start_datetime", &input.start_datetime),
                    ("end_datetime", &input.end_datetime),
                ] {
                    if non_empty(value).is_some() {
                        errors.add(field, format!("{} is only allowed for event tickets", field));
                    }
                }
                Some(TicketKind::Place)
            }
            Err(_) => {
                errors.add("type", "Ticket type must be one of: event, place");
                None
            }
        },
    };

    match (title, description, street_location, price, coordinates, kind) {
        (Some(title), Some(description), Some(street_location), Some(price), Some((latitude, longitude)), Some(kind))
            if errors.is_empty() =>
        {
            Ok(ValidTicket {
                title,
                price,
                description,
                street_location,
                latitude,
                longitude,
                kind,
            })
        }
        _ => Err(errors),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &Option<String>,
) -> Option<String> {
    match non_empty(value) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, format!("{} is required", label));
            None
        }
    }
}

fn validate_price(errors: &mut ValidationErrors, value: &Option<String>) -> Option<f64> {
    let Some(raw) = non_empty(value) else {
        errors.add("price", "Price is required");
        return None;
    };

    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() => {
            if price < MIN_PRICE {
                errors.add("price", "Minimum price is 0");
                None
            } else if price > MAX_PRICE {
                errors.add("price", "Maximum price is 100000000");
                None
            } else {
                Some(price)
            }
        }
        _ => {
            errors.add("price", "Price must be a number");
            None
        }
    }
}

fn validate_coordinates(
    errors: &mut ValidationErrors,
    value: &Option<String>,
) -> Option<(String, String)> {
    let Some(raw) = non_empty(value) else {
        errors.add("coordinates", "Coordinates are required as \"latitude,longitude\"");
        return None;
    };

    match parse_coordinate_pair(raw) {
        Ok(_) => {
            // Keep the caller's spelling of each component
            let mut parts = raw.split(',').map(|p| p.trim().to_string());
            let latitude = parts.next().unwrap_or_default();
            let longitude = parts.next().unwrap_or_default();
            Some((latitude, longitude))
        }
        Err(err @ GeoError::CoordinateOutOfRange { .. }) => {
            errors.add("coordinates", err.to_string());
            None
        }
        Err(_) => {
            errors.add("coordinates", "Coordinates must be two numbers as \"latitude,longitude\"");
            None
        }
    }
}

fn validate_event_schedule(errors: &mut ValidationErrors, input: &TicketInput) -> Option<TicketKind> {
    let start = required_datetime(errors, "start_datetime", "Start datetime", &input.start_datetime);
    let end = required_datetime(errors, "end_datetime", "End datetime", &input.end_datetime);

    let (start, end) = (start?, end?);
    if end.1 < start.1 {
        errors.add("end_datetime", "End datetime must not be before start datetime");
        return None;
    }
    Some(TicketKind::Event { start: start.0, end: end.0 })
}

fn required_datetime(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &Option<String>,
) -> Option<(String, DateTime<Utc>)> {
    let Some(raw) = non_empty(value) else {
        errors.add(field, format!("{} is required for event tickets", label));
        return None;
    };

    match parse_iso8601(raw) {
        Some(instant) => Some((raw.to_string(), instant)),
        None => {
            errors.add(field, format!("{} must be a valid ISO 8601 date", label));
            None
        }
    }
}

/// Accepts RFC 3339 timestamps, zone-less date-times (read as UTC) and plain dates.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Syntactic e-mail check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && labels.last().map(|tld| tld.len() >= 2).unwrap_or(false)
}
