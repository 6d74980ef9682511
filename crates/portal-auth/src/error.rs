//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Signing key misconfigured: {0}")]
    SigningKey(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token issuance failed: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::SigningKey(_) | AuthError::PasswordHash(_) | AuthError::TokenIssue(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication internal error: {}", self);
            ("INTERNAL_ERROR", "Internal error".to_string())
        } else {
            ("UNAUTHORIZED", self.to_string())
        };

        let body = axum::Json(json!({
            "code": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
