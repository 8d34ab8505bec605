//! Route handlers and router assembly

pub mod health;
pub mod project;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the API router with all routes attached.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/v1/projects/published",
            get(project::list_published),
        )
        .route(
            "/api/v1/projects/published/:project_id",
            get(project::published_code),
        )
        .route(
            "/api/v1/projects/:project_id/revision",
            post(project::submit_revision),
        )
        .route(
            "/api/v1/projects/:project_id/rollback/:version_id",
            post(project::rollback),
        )
        .route("/api/v1/projects/:project_id/code", put(project::save_code))
        .route(
            "/api/v1/projects/:project_id/preview",
            get(project::preview),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
