pub mod log;
pub mod ticket;
pub mod user;

pub use log::{ActivityLog, LogAction};
pub use ticket::{ticket_id, NewTicket, Ticket, TicketStatus, TicketType};
pub use user::{User, UserSummary};
