use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health_check, requests, services};
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route(
            "/api/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/api/services/:id",
            put(services::update_service).delete(services::delete_service),
        )
        .route("/api/requests", post(requests::submit_request))
        .route("/api/requests/track", get(requests::track_request))
        .route("/api/admin/requests", get(admin::list_requests))
        .route("/api/admin/requests/:id", get(admin::get_request))
        .route("/api/admin/requests/:id/status", patch(admin::update_status))
        // Uploads are bounded by the document policy, not axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
