use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    notify,
    policy::{Action, can_perform},
    routes::group::Group,
};

use super::model::{CreateMessageRequest, ListMessagesQuery, Message};

const MAX_MESSAGE_LEN: usize = 1000;

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let group = Group::find_by_id(&state.pool, &group_id)
        .await?
        .ok_or(AppError::NotFound("Group"))?;

    let group_member = group.members.iter().any(|m| m == &actor.user_id);
    if !can_perform(actor.role, &Action::SendMessage { group_member }) {
        return Err(AppError::Forbidden);
    }

    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".into()));
    }
    if req.content.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_LEN} characters"
        )));
    }

    let message = Message::create(
        &state.pool,
        &group_id,
        &actor.user_id,
        &actor.name,
        &req.content,
    )
    .await?;

    // Best-effort: the message is already persisted at this point.
    notify::message_posted(&state.pool, &group_id, &group.name, &actor.user_id, &actor.name)
        .await;

    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    // Reading a group's history is member-only, same as posting to it.
    if !Group::is_member(&state.pool, &group_id, &actor.user_id).await? {
        return Err(AppError::Forbidden);
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let messages = Message::list(&state.pool, &group_id, limit).await?;
    Ok(Json(messages))
}
