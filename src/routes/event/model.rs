use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, FromRow)]
pub struct Event {
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "date")]
    pub event_date: NaiveDate,
    #[serde(rename = "time")]
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub group_id: Option<String>,
    pub max_participants: Option<i32>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Disjoint by construction: one response row per (event, user).
    pub attendees: Vec<String>,
    pub declined: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub location: Option<String>,
    pub group_id: Option<String>,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

pub fn parse_event_date(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date (expected YYYY-MM-DD): {date}")))
}

/// Capacity check against attendees other than the caller, so a user who
/// is already attending can re-accept without counting twice.
fn attend_allowed(max_participants: Option<i32>, other_attendees: i64) -> bool {
    match max_participants {
        Some(max) => other_attendees < max as i64,
        None => true,
    }
}

const EVENT_SELECT: &str = r#"
    SELECT e.event_id, e.title, e.description, e.event_date, e.event_time, e.location,
           e.group_id, e.max_participants, e.created_by, e.created_at,
           COALESCE(array_agg(r.user_id) FILTER (WHERE r.status = 'attending'), ARRAY[]::text[]) AS attendees,
           COALESCE(array_agg(r.user_id) FILTER (WHERE r.status = 'declined'), ARRAY[]::text[]) AS declined
    FROM events e
    LEFT JOIN event_responses r ON r.event_id = e.event_id
"#;

impl Event {
    pub async fn create(
        pool: &PgPool,
        req: CreateEventRequest,
        creator_id: &str,
    ) -> Result<Self, AppError> {
        let event_id = Uuid::new_v4().to_string();
        let date = parse_event_date(&req.date)?;

        sqlx::query(
            r#"
            INSERT INTO events (event_id, title, description, event_date, event_time,
                                location, group_id, max_participants, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&event_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(date)
        .bind(&req.time)
        .bind(&req.location)
        .bind(&req.group_id)
        .bind(req.max_participants)
        .bind(creator_id)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, &event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }

    pub async fn find_by_id(pool: &PgPool, event_id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "{EVENT_SELECT} WHERE e.event_id = $1 GROUP BY e.event_id"
        ))
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "{EVENT_SELECT} GROUP BY e.event_id ORDER BY e.event_date"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn upcoming(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            {EVENT_SELECT}
            WHERE e.event_date >= CURRENT_DATE
            GROUP BY e.event_id
            ORDER BY e.event_date
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        event_id: &str,
        req: UpdateEventRequest,
    ) -> Result<Self, AppError> {
        let date = req.date.as_deref().map(parse_event_date).transpose()?;

        let updated = sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                event_time = COALESCE($5, event_time),
                location = COALESCE($6, location),
                max_participants = COALESCE($7, max_participants)
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(req.title)
        .bind(req.description)
        .bind(date)
        .bind(req.time)
        .bind(req.location)
        .bind(req.max_participants)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Event"));
        }

        Self::find_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }

    pub async fn delete(pool: &PgPool, event_id: &str) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Event"));
        }
        Ok(())
    }

    /// Idempotent accept. The event row is locked for the duration of the
    /// count-then-insert so concurrent accepts near the limit serialize
    /// instead of overbooking.
    pub async fn attend(pool: &PgPool, event_id: &str, user_id: &str) -> Result<Self, AppError> {
        let mut tx = pool.begin().await?;

        let max_participants: Option<i32> = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT max_participants FROM events WHERE event_id = $1 FOR UPDATE",
        )
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Event"))?;

        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM event_responses WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if status.as_deref() != Some("attending") {
            let other_attendees: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM event_responses
                WHERE event_id = $1 AND status = 'attending'
                "#,
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

            if !attend_allowed(max_participants, other_attendees) {
                return Err(AppError::Capacity);
            }

            sqlx::query(
                r#"
                INSERT INTO event_responses (event_id, user_id, status)
                VALUES ($1, $2, 'attending')
                ON CONFLICT (event_id, user_id)
                DO UPDATE SET status = 'attending', responded_at = NOW()
                "#,
            )
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }

    /// Mirror of `attend` without a capacity check; declining always
    /// succeeds and removes the user from the attendee set.
    pub async fn decline(pool: &PgPool, event_id: &str, user_id: &str) -> Result<Self, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE event_id = $1)")
                .bind(event_id)
                .fetch_one(pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Event"));
        }

        sqlx::query(
            r#"
            INSERT INTO event_responses (event_id, user_id, status)
            VALUES ($1, $2, 'declined')
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET status = 'declined', responded_at = NOW()
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parsing_accepts_iso_and_rejects_garbage() {
        assert_eq!(
            parse_event_date("2026-09-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
        );
        assert!(parse_event_date("01.09.2026").is_err());
        assert!(parse_event_date("2026-13-01").is_err());
        assert!(parse_event_date("next tuesday").is_err());
    }

    #[test]
    fn unlimited_events_always_accept() {
        assert!(attend_allowed(None, 0));
        assert!(attend_allowed(None, 10_000));
    }

    #[test]
    fn capacity_boundary_is_exclusive() {
        // k-th distinct attendee fills the event; the (k+1)-th is refused.
        assert!(attend_allowed(Some(3), 2));
        assert!(!attend_allowed(Some(3), 3));
        assert!(!attend_allowed(Some(0), 0));
    }
}
