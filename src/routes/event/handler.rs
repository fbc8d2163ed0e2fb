use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    notify,
    policy::{Action, can_perform},
};

use super::model::{CreateEventRequest, Event, UpdateEventRequest};

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

fn validate_event_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Event title must not be empty".into()));
    }
    Ok(())
}

fn validate_max_participants(max_participants: Option<i32>) -> Result<(), AppError> {
    if matches!(max_participants, Some(max) if max < 0) {
        return Err(AppError::Validation(
            "max_participants must not be negative".into(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    if !can_perform(actor.role, &Action::CreateEvent) {
        return Err(AppError::Forbidden);
    }

    validate_event_title(&req.title)?;
    validate_max_participants(req.max_participants)?;

    let event = Event::create(&state.pool, req, &actor.user_id).await?;

    notify::event_created(&state.pool, &event.event_id, &event.title, &actor.user_id).await;

    Ok((StatusCode::CREATED, Json(event)))
}

#[axum::debug_handler]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    let events = Event::list(&state.pool).await?;
    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    let events = Event::upcoming(&state.pool, limit).await?;
    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = Event::find_by_id(&state.pool, &event_id)
        .await?
        .ok_or(AppError::NotFound("Event"))?;
    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    if !can_perform(actor.role, &Action::UpdateEvent) {
        return Err(AppError::Forbidden);
    }

    if let Some(ref title) = req.title {
        validate_event_title(title)?;
    }
    validate_max_participants(req.max_participants)?;

    let event = Event::update(&state.pool, &event_id, req).await?;
    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !can_perform(actor.role, &Action::DeleteEvent) {
        return Err(AppError::Forbidden);
    }

    Event::delete(&state.pool, &event_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn attend_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    if !can_perform(actor.role, &Action::AttendEvent) {
        return Err(AppError::Forbidden);
    }

    let event = Event::attend(&state.pool, &event_id, &actor.user_id).await?;
    Ok(Json(event))
}

#[axum::debug_handler]
pub async fn decline_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    if !can_perform(actor.role, &Action::DeclineEvent) {
        return Err(AppError::Forbidden);
    }

    let event = Event::decline(&state.pool, &event_id, &actor.user_id).await?;
    Ok(Json(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_titles_must_not_be_blank() {
        assert!(validate_event_title("Sommerfest").is_ok());
        assert!(validate_event_title("").is_err());
        assert!(validate_event_title("  ").is_err());
    }

    #[test]
    fn participant_limits_must_not_be_negative() {
        assert!(validate_max_participants(None).is_ok());
        assert!(validate_max_participants(Some(0)).is_ok());
        assert!(validate_max_participants(Some(20)).is_ok());
        assert!(validate_max_participants(Some(-1)).is_err());
    }
}
