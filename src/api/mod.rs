pub mod format;

pub use format::{format_currency, ticket_views, TicketView};
