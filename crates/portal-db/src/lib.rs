//! Content Portal Database Layer
//!
//! This crate provides the credential store and points storage for the
//! content portal, using SQLite via sqlx for persistence.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::{DbError, UniqueField};
pub use models::*;
pub use repository::Database;
pub use store::UserStore;

/// Re-export the driver error wrapped by [`DbError::Unavailable`]
pub use sqlx::Error as SqlxError;
