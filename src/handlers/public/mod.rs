// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account registration and login, every ticket read, the activity log,
// the recommendation relay and the health check.

pub mod health;
pub mod log;
pub mod recommendation;
pub mod ticket;
pub mod user;

pub use health::health;
pub use log::{log_get, log_list};
pub use recommendation::recommendation_get;
pub use ticket::{ticket_get, ticket_list, ticket_nearby};
pub use user::{user_login, user_register};
