use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    notify,
    policy::{Action, Role, can_perform},
};

use super::model::{CreateGroupRequest, GROUP_TYPES, Group, UpdateGroupRequest};

fn validate_group_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Group name must not be empty".into()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    if !can_perform(actor.role, &Action::CreateGroup) {
        return Err(AppError::Forbidden);
    }

    validate_group_name(&req.name)?;
    if let Some(ref group_type) = req.group_type {
        if !GROUP_TYPES.contains(&group_type.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown group type: {group_type}"
            )));
        }
    }

    let group = Group::create(&state.pool, req, &actor.user_id).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Admins see every group; everyone else only the groups they belong to.
#[axum::debug_handler]
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<Vec<Group>>, AppError> {
    let groups = if actor.role == Role::Admin {
        Group::list_all(&state.pool).await?
    } else {
        Group::list_for_user(&state.pool, &actor.user_id).await?
    };
    Ok(Json(groups))
}

#[axum::debug_handler]
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, AppError> {
    let group = Group::find_by_id(&state.pool, &group_id)
        .await?
        .ok_or(AppError::NotFound("Group"))?;
    Ok(Json(group))
}

#[axum::debug_handler]
pub async fn update_group(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, AppError> {
    if !can_perform(actor.role, &Action::UpdateGroup) {
        return Err(AppError::Forbidden);
    }

    // A rename obeys the same rule as the original name.
    if let Some(ref name) = req.name {
        validate_group_name(name)?;
    }

    let group = Group::update(&state.pool, &group_id, req).await?;
    Ok(Json(group))
}

#[axum::debug_handler]
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !can_perform(actor.role, &Action::DeleteGroup) {
        return Err(AppError::Forbidden);
    }

    Group::delete(&state.pool, &group_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn add_member(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !can_perform(actor.role, &Action::ManageGroupMembers) {
        return Err(AppError::Forbidden);
    }

    let group_name = Group::add_member(&state.pool, &group_id, &user_id).await?;

    notify::member_added(&state.pool, &group_id, &group_name, &user_id).await;

    Ok(Json(serde_json::json!({ "added": true })))
}

#[axum::debug_handler]
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !can_perform(actor.role, &Action::ManageGroupMembers) {
        return Err(AppError::Forbidden);
    }

    Group::remove_member(&state.pool, &group_id, &user_id).await?;
    Ok(Json(serde_json::json!({ "removed": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_names_must_not_be_blank() {
        assert!(validate_group_name("Vorstand").is_ok());
        assert!(validate_group_name("").is_err());
        assert!(validate_group_name("   ").is_err());
    }
}
