use axum::{
    Extension,
    extract::{Json, State},
};
use serde::Serialize;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    policy::Role,
    routes::{
        document::DocumentInfo, event::Event, group::Group, notification::Notification,
        user::User,
    },
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub upcoming_events: Vec<Event>,
    pub unread_notifications: i64,
    pub recent_notifications: Vec<Notification>,
    pub groups: Vec<Group>,
    pub member_count: i64,
    pub recent_documents: Vec<DocumentInfo>,
}

/// Read-only composition for one actor. No caching: every call recomputes
/// from the store.
#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>, AppError> {
    let upcoming_events = Event::upcoming(&state.pool, 5).await?;
    let unread_notifications = Notification::unread_count(&state.pool, &actor.user_id).await?;
    let recent_notifications = Notification::list(&state.pool, &actor.user_id, 5).await?;

    let groups = if actor.role == Role::Admin {
        Group::list_all(&state.pool).await?
    } else {
        Group::list_for_user(&state.pool, &actor.user_id).await?
    };

    let member_count = User::count(&state.pool).await?;
    let recent_documents = DocumentInfo::recent(&state.pool, 5).await?;

    Ok(Json(DashboardResponse {
        upcoming_events,
        unread_notifications,
        recent_notifications,
        groups,
        member_count,
        recent_documents,
    }))
}
