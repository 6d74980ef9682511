//! Content Portal REST API
//!
//! This crate provides the Axum-based HTTP API: account registration and
//! login, self-service profile update and deletion, and the points listing.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
