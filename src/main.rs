use std::net::{IpAddr, SocketAddr};

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use connecthub::{
    AppState,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "app": "ConnectHub" }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(routes::user::register))
        .route("/auth/login", post(routes::user::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::user::me))
        // users
        .route("/users", get(routes::user::list_users))
        .route("/users/{user_id}", get(routes::user::get_user))
        .route("/users/{user_id}", put(routes::user::update_profile))
        .route("/users/{user_id}/role", put(routes::user::update_role))
        // groups
        .route("/groups", get(routes::group::list_groups))
        .route("/groups", post(routes::group::create_group))
        .route("/groups/{group_id}", get(routes::group::get_group))
        .route("/groups/{group_id}", put(routes::group::update_group))
        .route("/groups/{group_id}", delete(routes::group::delete_group))
        .route(
            "/groups/{group_id}/members/{user_id}",
            post(routes::group::add_member),
        )
        .route(
            "/groups/{group_id}/members/{user_id}",
            delete(routes::group::remove_member),
        )
        // messages
        .route(
            "/groups/{group_id}/messages",
            get(routes::message::list_messages),
        )
        .route(
            "/groups/{group_id}/messages",
            post(routes::message::send_message),
        )
        // events
        .route("/events", get(routes::event::list_events))
        .route("/events", post(routes::event::create_event))
        .route("/events/upcoming", get(routes::event::upcoming_events))
        .route("/events/{event_id}", get(routes::event::get_event))
        .route("/events/{event_id}", put(routes::event::update_event))
        .route("/events/{event_id}", delete(routes::event::delete_event))
        .route("/events/{event_id}/attend", post(routes::event::attend_event))
        .route(
            "/events/{event_id}/decline",
            post(routes::event::decline_event),
        )
        // notifications
        .route(
            "/notifications",
            get(routes::notification::list_notifications),
        )
        .route(
            "/notifications/unread/count",
            get(routes::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(routes::notification::mark_all_read),
        )
        .route(
            "/notifications/{notification_id}/read",
            put(routes::notification::mark_read),
        )
        // documents
        .route("/documents", get(routes::document::list_documents))
        .route("/documents", post(routes::document::upload_document))
        .route("/documents/{document_id}", get(routes::document::get_document))
        .route(
            "/documents/{document_id}",
            delete(routes::document::delete_document),
        )
        // dashboard
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new().nest(
        &config.api_base_uri.clone(),
        Router::new().merge(public_routes).merge(protected_routes),
    );

    let router = router
        .layer(axum::middleware::from_fn(log_errors))
        .layer(CorsLayer::permissive());

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
