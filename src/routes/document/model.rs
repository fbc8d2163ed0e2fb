use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

/// Full document, content included. `content` is an opaque blob reference
/// handed over by the client; the core never interprets it.
#[derive(Debug, Serialize, FromRow)]
pub struct Document {
    pub document_id: String,
    pub name: String,
    pub file_type: String,
    pub content: String,
    pub uploaded_by: String,
    pub uploader_name: String,
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List view: everything except the blob itself.
#[derive(Debug, Serialize, FromRow)]
pub struct DocumentInfo {
    pub document_id: String,
    pub name: String,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploader_name: String,
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub name: String,
    pub content: String,
    pub file_type: String,
    pub group_id: Option<String>,
}

const INFO_COLUMNS: &str = r#"
    d.document_id, d.name, d.file_type, d.uploaded_by, u.name AS uploader_name,
    d.group_id, d.created_at
"#;

impl Document {
    pub async fn upload(
        pool: &PgPool,
        req: UploadDocumentRequest,
        uploader_id: &str,
    ) -> Result<DocumentInfo, AppError> {
        let document_id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (document_id, name, file_type, content, uploaded_by, group_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&document_id)
        .bind(&req.name)
        .bind(&req.file_type)
        .bind(&req.content)
        .bind(uploader_id)
        .bind(&req.group_id)
        .execute(pool)
        .await?;

        DocumentInfo::find_by_id(pool, &document_id)
            .await?
            .ok_or(AppError::NotFound("Document"))
    }

    pub async fn find_by_id(pool: &PgPool, document_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            r#"
            SELECT {INFO_COLUMNS}, d.content
            FROM documents d
            JOIN users u ON u.user_id = d.uploaded_by
            WHERE d.document_id = $1
            "#
        ))
        .bind(document_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, document_id: &str) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM documents WHERE document_id = $1")
            .bind(document_id)
            .execute(pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Document"));
        }
        Ok(())
    }
}

impl DocumentInfo {
    pub async fn find_by_id(pool: &PgPool, document_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentInfo>(&format!(
            r#"
            SELECT {INFO_COLUMNS}
            FROM documents d
            JOIN users u ON u.user_id = d.uploaded_by
            WHERE d.document_id = $1
            "#
        ))
        .bind(document_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool, group_id: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        match group_id {
            Some(group_id) => {
                sqlx::query_as::<_, DocumentInfo>(&format!(
                    r#"
                    SELECT {INFO_COLUMNS}
                    FROM documents d
                    JOIN users u ON u.user_id = d.uploaded_by
                    WHERE d.group_id = $1
                    ORDER BY d.created_at DESC
                    "#
                ))
                .bind(group_id)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, DocumentInfo>(&format!(
                    r#"
                    SELECT {INFO_COLUMNS}
                    FROM documents d
                    JOIN users u ON u.user_id = d.uploaded_by
                    ORDER BY d.created_at DESC
                    "#
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentInfo>(&format!(
            r#"
            SELECT {INFO_COLUMNS}
            FROM documents d
            JOIN users u ON u.user_id = d.uploaded_by
            ORDER BY d.created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
