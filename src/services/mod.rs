pub mod recommendation;
pub mod ticket_service;
pub mod user_service;
pub mod validation;

pub use recommendation::{RecommendationClient, RecommendationError};
pub use ticket_service::{ImageField, TicketError, TicketService};
pub use user_service::{EditRequest, LoginRequest, LoginResponse, RegisterRequest, UserError, UserService};
pub use validation::{TicketInput, ValidationErrors};
