pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;

pub use app::app;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;
