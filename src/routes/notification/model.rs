use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

#[derive(Debug, Serialize, FromRow)]
pub struct Notification {
    pub notification_id: String,
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub group_id: Option<String>,
    pub event_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub async fn list(
        pool: &PgPool,
        recipient_id: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, recipient_id, kind, message, group_id, event_id,
                   read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn unread_count(pool: &PgPool, recipient_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
    }

    /// Idempotent and scoped to the recipient: a notification belonging to
    /// someone else looks like it does not exist.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: &str,
        recipient_id: &str,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE notification_id = $1 AND recipient_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(recipient_id)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification"));
        }
        Ok(())
    }

    pub async fn mark_all_read(pool: &PgPool, recipient_id: &str) -> Result<u64, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;

        Ok(updated.rows_affected())
    }
}
