//! Registration and login routes

use std::sync::LazyLock;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use portal_auth::{hash_password, verify_password};
use portal_db::{DbError, NewUser};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use super::validation::{validate_email, validate_password, validate_username};

/// Same answer for unknown email and wrong password
const LOGIN_MISMATCH: &str = "username / password is not match";

/// Hash verified when the email is unknown, so both login failures cost one
/// argon2 verification
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dummy-password-for-timing").ok());

// ==================== Auth Routes ====================

/// POST /register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    let email = request.email.trim().to_string();
    let username = request.username.trim().to_string();

    validate_email(&email)?;
    validate_username(&username)?;
    validate_password(&request.password)?;

    debug!("Registering user: {}", username);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .users
        .create(NewUser {
            email,
            username,
            password_hash,
            age: i64::from(request.age),
        })
        .await?;

    metrics::counter!("portal_registrations_total").increment(1);
    info!("Registered user {} ({})", user.id, user.username);

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let email = request.email.trim();

    validate_email(email)?;
    validate_password(&request.password)?;

    debug!("Login attempt for: {}", email);

    let user = match state.users.find_by_email(email).await {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(&request.password, dummy);
            }
            metrics::counter!("portal_logins_total", "outcome" => "unknown_email").increment(1);
            warn!("Login failed: unknown email");
            return Err(ApiError::NotFound(LOGIN_MISMATCH.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&request.password, &user.password_hash) {
        metrics::counter!("portal_logins_total", "outcome" => "bad_password").increment(1);
        warn!("Login failed: password mismatch for user {}", user.id);
        return Err(ApiError::Unauthorized(LOGIN_MISMATCH.to_string()));
    }

    let token = state.jwt.generate_token(user.id, &user.email)?;

    metrics::counter!("portal_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse { token }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
