use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

/// Logs every request that ends in a 5xx with the method and path, so a
/// failing route can be found without client cooperation. 4xx responses
/// already carry their reason in the error body and are not logged here;
/// database errors are additionally logged where they are mapped.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        error!(
            %method,
            path,
            status = response.status().as_u16(),
            "request failed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn healthy() -> &'static str {
        "ok"
    }

    async fn broken() -> AppError {
        AppError::Database(sqlx::Error::PoolClosed)
    }

    fn app() -> Router {
        Router::new()
            .route("/healthy", get(healthy))
            .route("/broken", get(broken))
            .layer(axum::middleware::from_fn(log_errors))
    }

    #[tokio::test]
    async fn successful_responses_pass_through_unchanged() {
        let response = app()
            .oneshot(Request::builder().uri("/healthy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn server_errors_keep_their_status() {
        let response = app()
            .oneshot(Request::builder().uri("/broken").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
