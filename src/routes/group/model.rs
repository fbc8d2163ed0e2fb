use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

pub const GROUP_TYPES: [&str; 6] = [
    "allgemein",
    "vorstand",
    "mitglieder",
    "team",
    "projekt",
    "events",
];

#[derive(Debug, Serialize, FromRow)]
pub struct Group {
    pub group_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Aggregated from group_members; the join table's primary key keeps
    /// this a set.
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

const GROUP_SELECT: &str = r#"
    SELECT g.group_id, g.name, g.description, g.group_type, g.created_by, g.created_at,
           COALESCE(array_agg(m.user_id) FILTER (WHERE m.user_id IS NOT NULL), ARRAY[]::text[]) AS members
    FROM groups g
    LEFT JOIN group_members m ON m.group_id = g.group_id
"#;

impl Group {
    pub async fn create(
        pool: &PgPool,
        req: CreateGroupRequest,
        creator_id: &str,
    ) -> Result<Self, AppError> {
        let group_id = Uuid::new_v4().to_string();
        let group_type = req.group_type.unwrap_or_else(|| "allgemein".into());

        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO groups (group_id, name, description, group_type, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&group_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&group_type)
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

        // The creator is implicitly a member.
        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(&group_id)
            .bind(creator_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Self::find_by_id(pool, &group_id)
            .await?
            .ok_or(AppError::NotFound("Group"))
    }

    pub async fn find_by_id(pool: &PgPool, group_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!(
            "{GROUP_SELECT} WHERE g.group_id = $1 GROUP BY g.group_id"
        ))
        .bind(group_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!("{GROUP_SELECT} GROUP BY g.group_id ORDER BY g.name"))
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Group>(&format!(
            r#"
            {GROUP_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM group_members mm
                WHERE mm.group_id = g.group_id AND mm.user_id = $1
            )
            GROUP BY g.group_id
            ORDER BY g.name
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        group_id: &str,
        req: UpdateGroupRequest,
    ) -> Result<Self, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .bind(req.name)
        .bind(req.description)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Group"));
        }

        Self::find_by_id(pool, group_id)
            .await?
            .ok_or(AppError::NotFound("Group"))
    }

    /// Hard delete. Memberships and message history go with the group via
    /// foreign key cascade; notifications keep their group_id and stay
    /// readable.
    pub async fn delete(pool: &PgPool, group_id: &str) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM groups WHERE group_id = $1")
            .bind(group_id)
            .execute(pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Group"));
        }
        Ok(())
    }

    /// Set-insert; adding an existing member is a no-op. Returns the group
    /// name for the fan-out message.
    pub async fn add_member(
        pool: &PgPool,
        group_id: &str,
        user_id: &str,
    ) -> Result<String, AppError> {
        let group_name: String = sqlx::query_scalar("SELECT name FROM groups WHERE group_id = $1")
            .bind(group_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::NotFound("Group"))?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        if !user_exists {
            return Err(AppError::NotFound("User"));
        }

        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(group_name)
    }

    pub async fn remove_member(
        pool: &PgPool,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let group_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE group_id = $1)")
                .bind(group_id)
                .fetch_one(pool)
                .await?;
        if !group_exists {
            return Err(AppError::NotFound("Group"));
        }

        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn is_member(
        pool: &PgPool,
        group_id: &str,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_type_list_matches_domain() {
        assert!(GROUP_TYPES.contains(&"allgemein"));
        assert!(GROUP_TYPES.contains(&"vorstand"));
        assert_eq!(GROUP_TYPES.len(), 6);
    }
}
