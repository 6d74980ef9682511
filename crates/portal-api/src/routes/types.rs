//! Request/Response DTOs

use portal_db::{PointWithUser, User};
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub age: u32,
}

/// Registration response
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: i64,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
        }
    }
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// ==================== User Types ====================

/// Update request for the caller's own account
///
/// Absent or empty fields are left unchanged.
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Update response
#[derive(Serialize)]
pub struct UpdateUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub age: i64,
    pub updated_at: String,
}

impl From<User> for UpdateUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Point Types ====================

/// Owner fields embedded in a point listing
#[derive(Serialize)]
pub struct PointUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Point with its owner
#[derive(Serialize)]
pub struct PointResponse {
    pub id: i64,
    pub point: i64,
    pub content_id: i64,
    pub user_id: i64,
    pub updated_at: String,
    pub created_at: String,
    #[serde(rename = "User")]
    pub user: Option<PointUserResponse>,
}

impl From<PointWithUser> for PointResponse {
    fn from(row: PointWithUser) -> Self {
        Self {
            id: row.point.id,
            point: row.point.point,
            content_id: row.point.content_id,
            user_id: row.point.user_id,
            updated_at: row.point.updated_at.to_rfc3339(),
            created_at: row.point.created_at.to_rfc3339(),
            user: row.user.map(|owner| PointUserResponse {
                id: owner.id,
                username: owner.username,
                email: owner.email,
            }),
        }
    }
}
