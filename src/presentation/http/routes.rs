//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_cors_layer, create_trace_layer, track_metrics,
};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Real-time group chat endpoint
        .route("/socket", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        // Outermost first: trace, then CORS, then compression
        .layer(
            ServiceBuilder::new()
                .layer(create_trace_layer())
                .layer(create_cors_layer(&state.settings.cors))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        // Protected routes (require authentication)
        .nest("/group", group_routes(state.clone()))
        .nest("/chat", chat_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// Group routes (protected)
fn group_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::group::create_group).get(handlers::group::list_groups),
        )
        .route("/join/{name}", post(handlers::group::join_group))
        .route("/leave/{name}", post(handlers::group::leave_group))
        .route("/messages/{group_id}", get(handlers::group::get_messages))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Direct chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/send", post(handlers::chat::send_message))
        .route("/history/{user_id}", get(handlers::chat::get_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
