//! # Gold Loan API
//!
//! HTTP surface: tenant headers, Idempotency-Key, envelope responses.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
