use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::policy::Role;
use crate::utils::hash_password;

#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

const USER_COLUMNS: &str =
    "user_id, email, password_hash, name, role, phone, position, avatar, created_at";

/// SQLSTATE 23505. The pre-insert existence check keeps the common case
/// friendly, but two racing registrations still reach the unique index;
/// that loser must surface as Conflict, not as a server error.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn map_registration_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict("Email already registered".into())
    } else {
        AppError::Database(e)
    }
}

impl User {
    pub async fn register(pool: &PgPool, req: RegisterRequest) -> Result<Self, AppError> {
        if Self::find_by_email(pool, &req.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = hash_password(&req.password)
            .map_err(|e| AppError::Database(sqlx::Error::Protocol(format!(
                "Failed to hash password: {e}"
            ))))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&req.email)
        .bind(password_hash)
        .bind(&req.name)
        .bind(Role::Mitglied.as_str())
        .fetch_one(pool)
        .await
        .map_err(map_registration_error)?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, user_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Partial profile update; role and email are deliberately not
    /// reachable from here.
    pub async fn update_profile(
        pool: &PgPool,
        user_id: &str,
        req: UpdateProfileRequest,
    ) -> Result<Self, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                position = COALESCE($4, position),
                avatar = COALESCE($5, avatar)
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(req.name)
        .bind(req.phone)
        .bind(req.position)
        .bind(req.avatar)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;

        Ok(user)
    }

    pub async fn update_role(pool: &PgPool, user_id: &str, role: Role) -> Result<Self, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET role = $2
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unique_violations_become_conflicts() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
        match map_registration_error(sqlx::Error::RowNotFound) {
            AppError::Database(_) => {}
            other => panic!("expected Database, got {other:?}"),
        }
    }
}
