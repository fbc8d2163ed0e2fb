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
    policy::{Action, Role, can_perform},
    utils::generate_token,
};

use super::model::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User};

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if req.password.chars().count() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    if req.name.chars().count() < 2 {
        return Err(AppError::Validation(
            "Name must be at least 2 characters".into(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)?;

    let user = User::register(&state.pool, req).await?;
    let token = generate_token(&user.user_id, &state.config)
        .map_err(|e| AppError::Database(sqlx::Error::Protocol(format!("Token error: {e}"))))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = User::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let valid = crate::utils::verify_password(&req.password, &user.password_hash)
        .map_err(|_| AppError::Unauthenticated)?;
    if !valid {
        return Err(AppError::Unauthenticated);
    }

    let token = generate_token(&user.user_id, &state.config)
        .map_err(|e| AppError::Database(sqlx::Error::Protocol(format!("Token error: {e}"))))?;

    Ok(Json(AuthResponse { token, user }))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = User::find_by_id(&state.pool, &actor.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = User::list(&state.pool).await?;
    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = User::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    // Profile fields belong to their owner; role changes go through the
    // dedicated admin route.
    if actor.user_id != user_id {
        return Err(AppError::Forbidden);
    }

    if req.name.is_none() && req.phone.is_none() && req.position.is_none() && req.avatar.is_none()
    {
        return Err(AppError::Validation("No fields to update".into()));
    }

    if let Some(ref name) = req.name {
        if name.chars().count() < 2 {
            return Err(AppError::Validation(
                "Name must be at least 2 characters".into(),
            ));
        }
    }

    let user = User::update_profile(&state.pool, &user_id, req).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

#[axum::debug_handler]
pub async fn update_role(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<User>, AppError> {
    if !can_perform(actor.role, &Action::ChangeRole) {
        return Err(AppError::Forbidden);
    }

    let role: Role = query
        .role
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown role: {}", query.role)))?;

    let user = User::update_role(&state.pool, &user_id, role).await?;
    Ok(Json(user))
}
