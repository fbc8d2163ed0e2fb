use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error taxonomy shared by every resource service. The HTTP boundary is
/// the `IntoResponse` impl below; services never pick status codes
/// themselves.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid bearer token.
    Unauthenticated,
    /// The authorization policy denied the action.
    Forbidden,
    /// Unknown id; the str names the resource kind for the message.
    NotFound(&'static str),
    /// Uniqueness violation, e.g. an already-registered email.
    Conflict(String),
    /// An event's attendee limit would be exceeded.
    Capacity,
    /// Malformed input (bad date, over-long content, unknown role, ...).
    Validation(String),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error_message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Capacity => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Unauthenticated => "Authentication required".into(),
            AppError::Forbidden => "Not permitted".into(),
            AppError::NotFound(what) => format!("{what} not found"),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Capacity => "Maximum number of participants reached".into(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Database(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(ref e) = self {
            tracing::error!("database error: {e}");
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error_message: self.message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Group").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("email taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Capacity.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Validation("bad date".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(AppError::NotFound("Event").message(), "Event not found");
    }
}
