//! Credential store abstraction
//!
//! Request handlers and the login flow only see identities through this
//! trait, so the backing store is chosen once at startup and injected.
//! Every operation reports a missing identity as [`DbError::NotFound`].

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewUser, UpdateUser, User};
use crate::repository::Database;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<User, DbError>;

    async fn find_by_id(&self, id: i64) -> Result<User, DbError>;

    /// Fails with [`DbError::Conflict`] naming the duplicated column
    async fn create(&self, user: NewUser) -> Result<User, DbError>;

    async fn update(&self, id: i64, changes: UpdateUser) -> Result<User, DbError>;

    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<User, DbError> {
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User with email {}", email)))
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DbError> {
        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", id)))
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        self.insert_user(user).await
    }

    async fn update(&self, id: i64, changes: UpdateUser) -> Result<User, DbError> {
        self.update_user(id, changes)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", id)))
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        if self.delete_user(id).await? {
            Ok(())
        } else {
            Err(DbError::NotFound(format!("User: {}", id)))
        }
    }
}
