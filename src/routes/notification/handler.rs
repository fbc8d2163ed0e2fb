use axum::{
    Extension,
    extract::{Json, Path, State},
};

use crate::{AppState, error::AppError, middleware::AuthUser};

use super::model::Notification;

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = Notification::list(&state.pool, &actor.user_id, 50).await?;
    Ok(Json(notifications))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = Notification::unread_count(&state.pool, &actor.user_id).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    Notification::mark_read(&state.pool, &notification_id, &actor.user_id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = Notification::mark_all_read(&state.pool, &actor.user_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
