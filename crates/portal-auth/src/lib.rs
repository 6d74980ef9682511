//! Content Portal Authentication
//!
//! This crate provides argon2 password hashing, JWT issuance and
//! validation, and the axum middleware that turns a bearer token into a
//! typed [`AuthUser`] for downstream handlers.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{AuthUser, auth_middleware};
pub use password::{hash_password, verify_password};
