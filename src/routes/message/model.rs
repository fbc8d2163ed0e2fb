use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Serialize, FromRow)]
pub struct Message {
    pub message_id: String,
    pub group_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<i64>,
}

impl Message {
    /// Membership is checked by the handler; the timestamp is
    /// server-assigned, which is what orders messages within a group.
    pub async fn create(
        pool: &PgPool,
        group_id: &str,
        sender_id: &str,
        sender_name: &str,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let message_id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (message_id, group_id, sender_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING message_id, group_id, sender_id, content, created_at
            "#,
        )
        .bind(&message_id)
        .bind(group_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(Message {
            message_id: row.message_id,
            group_id: row.group_id,
            sender_id: row.sender_id,
            sender_name: sender_name.to_string(),
            content: row.content,
            created_at: row.created_at,
        })
    }

    /// The latest `limit` messages, returned in ascending time order.
    pub async fn list(
        pool: &PgPool,
        group_id: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.message_id, m.group_id, m.sender_id, u.name AS sender_name,
                   m.content, m.created_at
            FROM messages m
            JOIN users u ON u.user_id = m.sender_id
            WHERE m.group_id = $1
            ORDER BY m.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}

#[derive(FromRow)]
struct MessageRow {
    message_id: String,
    group_id: String,
    sender_id: String,
    content: String,
    created_at: DateTime<Utc>,
}
