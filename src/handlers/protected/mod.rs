// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind jwt_auth_middleware, which injects AuthUser.
// Ownership rules (only the creator may change a ticket) are enforced by the
// ticket service, not by the middleware.

pub mod ticket;
pub mod user;

pub use ticket::{ticket_create, ticket_delete, ticket_update};
pub use user::user_edit;
