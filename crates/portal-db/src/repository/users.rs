//! User operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::{DbError, UniqueField};
use crate::models::{NewUser, UpdateUser, User};
use crate::repository::Database;

const USER_COLUMNS: &str = "id, email, username, password_hash, age, created_at, updated_at";

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Fails with [`DbError::Conflict`] when the email or username is taken.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        if let Some(field) = self
            .find_conflict(Some(user.email.as_str()), Some(user.username.as_str()), None)
            .await?
        {
            return Err(DbError::Conflict { field });
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, age, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                return Err(self
                    .classify_write_error(
                        e,
                        Some(user.email.as_str()),
                        Some(user.username.as_str()),
                        None,
                    )
                    .await);
            }
        };

        let id: i64 = row.get("id");
        debug!("Inserted user {} ({})", id, user.username);

        Ok(User {
            id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            age: user.age,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update a user's email and/or username
    ///
    /// Returns `None` if no user has the given ID.
    pub async fn update_user(&self, id: i64, changes: UpdateUser) -> Result<Option<User>, DbError> {
        if let Some(field) = self
            .find_conflict(changes.email.as_deref(), changes.username.as_deref(), Some(id))
            .await?
        {
            return Err(DbError::Conflict { field });
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                username = COALESCE(?, username),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.email.as_deref())
        .bind(changes.username.as_deref())
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(None),
            Ok(_) => self.get_user_by_id(id).await,
            Err(e) => Err(self
                .classify_write_error(
                    e,
                    changes.email.as_deref(),
                    changes.username.as_deref(),
                    Some(id),
                )
                .await),
        }
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find which unique column, if any, is already held by another user
    async fn find_conflict(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        exclude_id: Option<i64>,
    ) -> Result<Option<UniqueField>, DbError> {
        let taken = |user: &User| exclude_id != Some(user.id);

        if let Some(email) = email
            && self.get_user_by_email(email).await?.is_some_and(|u| taken(&u))
        {
            return Ok(Some(UniqueField::Email));
        }

        if let Some(username) = username
            && self.get_user_by_username(username).await?.is_some_and(|u| taken(&u))
        {
            return Ok(Some(UniqueField::Username));
        }

        Ok(None)
    }

    /// Turn a failed write into a typed error
    ///
    /// A unique violation here means a concurrent writer won the race after the
    /// pre-check; look the values up again to name the column.
    async fn classify_write_error(
        &self,
        error: sqlx::Error,
        email: Option<&str>,
        username: Option<&str>,
        exclude_id: Option<i64>,
    ) -> DbError {
        let is_unique_violation = error
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation());

        if !is_unique_violation {
            return DbError::from(error);
        }

        match self.find_conflict(email, username, exclude_id).await {
            Ok(Some(field)) => DbError::Conflict { field },
            Ok(None) => DbError::from(error),
            Err(lookup_error) => lookup_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            age: 21,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_user() {
        let db = Database::in_memory().await.unwrap();

        let user = db.insert_user(new_user("a@b.com", "alice")).await.unwrap();
        assert!(user.id > 0);

        let by_email = db.get_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.username, "alice");
        assert_eq!(by_email.age, 21);

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@b.com");

        assert!(db.get_user_by_email("missing@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_email_and_username() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("a@b.com", "alice")).await.unwrap();

        let err = db.insert_user(new_user("a@b.com", "bob")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: UniqueField::Email }));

        let err = db.insert_user(new_user("b@b.com", "alice")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: UniqueField::Username }));
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("a@b.com", "alice")).await.unwrap();

        let updated = db
            .update_user(
                user.id,
                UpdateUser {
                    email: None,
                    username: Some("alicia".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.email, "a@b.com");
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_update_user_conflict_ignores_self() {
        let db = Database::in_memory().await.unwrap();
        let alice = db.insert_user(new_user("a@b.com", "alice")).await.unwrap();
        db.insert_user(new_user("b@b.com", "bob")).await.unwrap();

        // Re-submitting your own values is not a conflict
        let same = db
            .update_user(
                alice.id,
                UpdateUser {
                    email: Some("a@b.com".to_string()),
                    username: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());

        let err = db
            .update_user(
                alice.id,
                UpdateUser {
                    email: Some("b@b.com".to_string()),
                    username: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { field: UniqueField::Email }));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_user() {
        let db = Database::in_memory().await.unwrap();

        let updated = db.update_user(99, UpdateUser::default()).await.unwrap();
        assert!(updated.is_none());
        assert!(!db.delete_user(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("a@b.com", "alice")).await.unwrap();

        assert!(db.delete_user(user.id).await.unwrap());
        assert!(db.get_user_by_id(user.id).await.unwrap().is_none());
    }
}
