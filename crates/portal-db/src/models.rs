//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub age: i64,
}

/// Update user (for partial updates)
///
/// `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none()
    }
}

/// Point awarded to a user for a piece of content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: i64,
    pub point: i64,
    pub content_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New point (for insertion)
#[derive(Debug, Clone)]
pub struct NewPoint {
    pub point: i64,
    pub content_id: i64,
    pub user_id: i64,
}

/// Public subset of the owning user, joined onto a point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOwner {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Point joined with its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointWithUser {
    pub point: Point,
    pub user: Option<PointOwner>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            age: row.try_get("age")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Point {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Point {
            id: row.try_get("id")?,
            point: row.try_get("point")?,
            content_id: row.try_get("content_id")?,
            user_id: row.try_get("user_id")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for PointWithUser {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let point = Point::try_from(row)?;

        // LEFT JOIN: owner columns are NULL when the user row is gone
        let owner_id: Option<i64> = row.try_get("owner_id")?;
        let user = match owner_id {
            Some(id) => Some(PointOwner {
                id,
                username: row.try_get("owner_username")?,
                email: row.try_get("owner_email")?,
            }),
            None => None,
        };

        Ok(PointWithUser { point, user })
    }
}
