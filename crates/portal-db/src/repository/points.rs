//! Point operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewPoint, Point, PointWithUser};

use super::Database;

impl Database {
    /// Insert a new point
    pub async fn insert_point(&self, point: NewPoint) -> Result<Point, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO points (point, content_id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(point.point)
        .bind(point.content_id)
        .bind(point.user_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_foreign_key_violation()) {
                DbError::NotFound(format!("User: {}", point.user_id))
            } else {
                DbError::from(e)
            }
        })?;

        Ok(Point {
            id: result.get("id"),
            point: point.point,
            content_id: point.content_id,
            user_id: point.user_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// List every point together with its owner's public fields
    pub async fn list_points_with_users(&self) -> Result<Vec<PointWithUser>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.point, p.content_id, p.user_id, p.created_at, p.updated_at,
                   u.id AS owner_id, u.username AS owner_username, u.email AS owner_email
            FROM points p
            LEFT JOIN users u ON u.id = p.user_id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| PointWithUser::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;

    async fn seed_user(db: &Database, email: &str, username: &str) -> i64 {
        db.insert_user(NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            age: 30,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_list_points_joins_owner() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "a@b.com", "alice").await;
        let bob = seed_user(&db, "b@b.com", "bob").await;

        db.insert_point(NewPoint { point: 10, content_id: 1, user_id: alice })
            .await
            .unwrap();
        db.insert_point(NewPoint { point: 5, content_id: 2, user_id: bob })
            .await
            .unwrap();

        let points = db.list_points_with_users().await.unwrap();
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].point.point, 10);
        let owner = points[0].user.as_ref().unwrap();
        assert_eq!(owner.id, alice);
        assert_eq!(owner.username, "alice");
        assert_eq!(owner.email, "a@b.com");

        assert_eq!(points[1].user.as_ref().unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_list_points_empty() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.list_points_with_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_points() {
        let db = Database::in_memory().await.unwrap();
        let alice = seed_user(&db, "a@b.com", "alice").await;
        db.insert_point(NewPoint { point: 3, content_id: 7, user_id: alice })
            .await
            .unwrap();

        db.delete_user(alice).await.unwrap();
        assert!(db.list_points_with_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_point_for_unknown_user_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        let result = db
            .insert_point(NewPoint { point: 1, content_id: 1, user_id: 404 })
            .await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }
}
