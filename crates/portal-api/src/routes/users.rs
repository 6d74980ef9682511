//! Self-service account routes
//!
//! Both handlers act only on the identity carried by the caller's token.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::put,
};
use portal_auth::AuthUser;
use portal_db::UpdateUser;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{MessageResponse, UpdateUserRequest, UpdateUserResponse};
use super::validation::{validate_email, validate_username};

/// Treat missing and blank fields alike: leave the column untouched
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// PUT /users
async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UpdateUserResponse>, ApiError> {
    let Json(request) = payload?;

    let changes = UpdateUser {
        email: non_blank(request.email),
        username: non_blank(request.username),
    };

    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    if let Some(username) = &changes.username {
        validate_username(username)?;
    }

    debug!("Updating user: {}", user.id);

    let updated = if changes.is_empty() {
        state.users.find_by_id(user.id).await?
    } else {
        state.users.update(user.id, changes).await?
    };

    info!("Updated user {} ({})", updated.id, updated.username);

    Ok(Json(UpdateUserResponse::from(updated)))
}

/// DELETE /users
async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting user: {}", user.id);

    state.users.delete(user.id).await?;

    info!("Deleted user: {}", user.id);

    Ok(Json(MessageResponse {
        message: "Your account has been successfully deleted".to_string(),
    }))
}

/// Create user routes (require authentication)
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", put(update_user).delete(delete_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("".to_string())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some(" bob ".to_string())), Some("bob".to_string()));
    }
}
