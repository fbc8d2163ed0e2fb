use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use sqlx::FromRow;

use crate::{AppState, error::AppError, policy::Role, utils::verify_token};

/// The authenticated actor, resolved once per request and handed to
/// handlers via request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

#[derive(FromRow)]
struct ActorRow {
    user_id: String,
    name: String,
    role: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    let claims = verify_token(token, &state.config).map_err(|_| AppError::Unauthenticated)?;

    // The token only carries the user id; role comes from the store so a
    // role change takes effect on the next request, not at token expiry.
    let row = sqlx::query_as::<_, ActorRow>(
        "SELECT user_id, name, role FROM users WHERE user_id = $1",
    )
    .bind(&claims.sub)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthenticated)?;

    // Unknown role values in the store fall back to the least privilege.
    let role = row.role.parse().unwrap_or(Role::Gast);

    request.extensions_mut().insert(AuthUser {
        user_id: row.user_id,
        name: row.name,
        role,
    });

    Ok(next.run(request).await)
}
