//! Project REST API Routes
//!
//! Axum handlers for the revision, rollback, save, preview, and gallery
//! operations. Handlers translate between HTTP and the engine; all business
//! rules live in `sitewright-engine`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sitewright_core::{Project, ProjectId, Version, VersionId};

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    state::AppState,
};

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RevisionRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RevisionResponse {
    pub version: Version,
    pub code: String,
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct SaveCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct PublishedCodeResponse {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct PublishedListResponse {
    pub projects: Vec<Project>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/projects/{id}/revision - Submit a revision request
pub async fn submit_revision(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(project_id): Path<ProjectId>,
    Json(req): Json<RevisionRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = sitewright_engine::submit_revision(
        state.storage.as_ref(),
        state.provider.as_ref(),
        user_id,
        project_id,
        &req.message,
    )
    .await?;

    Ok(Json(RevisionResponse {
        version: outcome.version,
        code: outcome.code,
        balance: outcome.balance,
    }))
}

/// POST /api/v1/projects/{id}/rollback/{version_id} - Roll back to a version
pub async fn rollback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((project_id, version_id)): Path<(ProjectId, VersionId)>,
) -> ApiResult<impl IntoResponse> {
    let project =
        sitewright_engine::rollback(state.storage.as_ref(), user_id, project_id, version_id)?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}/code - Save code directly, outside history
pub async fn save_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(project_id): Path<ProjectId>,
    Json(req): Json<SaveCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    sitewright_engine::save_code(state.storage.as_ref(), user_id, project_id, &req.code)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/preview - Project with history and conversation
pub async fn preview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<impl IntoResponse> {
    let preview = sitewright_engine::project_preview(state.storage.as_ref(), user_id, project_id)?;
    Ok(Json(preview))
}

/// GET /api/v1/projects/published - Public gallery listing
pub async fn list_published(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.storage.project_list_published()?;
    Ok(Json(PublishedListResponse { projects }))
}

/// GET /api/v1/projects/published/{id} - Active code of a published project
pub async fn published_code(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<impl IntoResponse> {
    let code = sitewright_engine::published_code(state.storage.as_ref(), project_id)?;
    Ok(Json(PublishedCodeResponse { code }))
}

// =============================================================================
// TESTS
// =============================================================================
