// crates/server/src/routes/projects.rs
//! Project CRUD, onboarding, and per-project session sync endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sessionboard_core::{
    derive_project_status, slugify, validate_project_path, OnboardingStatus, PathValidation,
    Project, ProjectStatus, ProjectSummary, SessionSummary,
};
use sessionboard_db::{
    sync_project_sessions, NewProject, ProjectDelete, ProjectPatch, SessionFilter, SyncFailure,
    SyncedSession,
};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for GET /api/projects
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProjectsListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for POST /api/projects
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub path: String,
    pub repo_url: Option<String>,
    pub status: Option<ProjectStatus>,
    pub metadata: Option<serde_json::Value>,
}

/// Request body for POST /api/projects/onboard and /validate-path
#[derive(Debug, Deserialize)]
pub struct OnboardProjectRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// Response for POST /api/projects/{id}/sync
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SyncResponse {
    pub status: String,
    pub message: String,
    pub synced: Vec<SyncedSession>,
    pub failed: Vec<SyncFailure>,
}

/// Query parameters for GET /api/projects/{id}/sessions
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProjectSessionsQuery {
    pub status_filter: Option<String>,
    pub session_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn parse_project_status(raw: &str) -> ApiResult<ProjectStatus> {
    ProjectStatus::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status '{raw}'. Valid options: pending, onboarding, active, paused, archived"
        ))
    })
}

/// GET /api/projects - List projects, newest activity first.
///
/// Optional filters:
/// - `status`: project lifecycle status
/// - `limit` (default 100, clamped server-side) / `offset`
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectsListQuery>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let status = query.status.as_deref().map(parse_project_status).transpose()?;
    let projects = state
        .db
        .list_projects(status, query.limit, query.offset.unwrap_or(0))
        .await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id} - Get a project by id.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db
        .get_project(&id)
        .await?
        .ok_or(ApiError::ProjectNotFound(id))?;
    Ok(Json(project))
}

/// GET /api/projects/slug/{slug} - Get a project by its slug.
pub async fn get_project_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db
        .get_project_by_slug(&slug)
        .await?
        .ok_or(ApiError::ProjectNotFound(slug))?;
    Ok(Json(project))
}

/// POST /api/projects - Create a project.
///
/// Returns 201 with the created project, 400 on missing required fields,
/// 409 when the slug is already taken.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<Response> {
    for (field, value) in [
        ("name", &body.name),
        ("slug", &body.slug),
        ("path", &body.path),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("Missing required field: {field}")));
        }
    }

    if state.db.get_project_by_slug(&body.slug).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Project with slug '{}' already exists",
            body.slug
        )));
    }

    let project = state
        .db
        .create_project(NewProject {
            name: body.name,
            slug: body.slug,
            path: body.path,
            repo_url: body.repo_url,
            status: body.status.unwrap_or(ProjectStatus::Pending),
            onboarding_status: OnboardingStatus::default(),
            metadata: body.metadata.unwrap_or_else(|| serde_json::json!({})),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project)).into_response())
}

/// PATCH /api/projects/{id} - Partial update; only provided fields change.
///
/// Re-runs the slug conflict check when the slug is part of the update.
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> ApiResult<Json<Project>> {
    if let Some(new_slug) = &patch.slug {
        if let Some(existing) = state.db.get_project_by_slug(new_slug).await? {
            if existing.id != id {
                return Err(ApiError::Conflict(format!(
                    "Project with slug '{new_slug}' already exists"
                )));
            }
        }
    }

    let project = state
        .db
        .update_project(&id, patch)
        .await?
        .ok_or(ApiError::ProjectNotFound(id))?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id} - Delete a project.
///
/// Refused with 409 while sessions still reference the project; project
/// deletion never cascades.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    match state.db.delete_project(&id).await? {
        ProjectDelete::Deleted => Ok(StatusCode::NO_CONTENT),
        ProjectDelete::NotFound => Err(ApiError::ProjectNotFound(id)),
        ProjectDelete::HasSessions(count) => Err(ApiError::Conflict(format!(
            "Project has {count} session(s); delete them first"
        ))),
    }
}

/// GET /api/projects/{id}/sessions - Sessions belonging to one project.
pub async fn list_project_sessions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ProjectSessionsQuery>,
) -> ApiResult<Json<Vec<SessionSummary>>> {
    if state.db.get_project(&id).await?.is_none() {
        return Err(ApiError::ProjectNotFound(id));
    }

    let filter = SessionFilter {
        status: query
            .status_filter
            .as_deref()
            .map(super::sessions::parse_session_status)
            .transpose()?,
        session_type: query
            .session_type
            .as_deref()
            .map(super::sessions::parse_session_type)
            .transpose()?,
        project_id: Some(id),
    };
    let sessions = state
        .db
        .list_sessions(&filter, query.limit, query.offset.unwrap_or(0))
        .await?;
    Ok(Json(sessions))
}

/// POST /api/projects/{id}/sync - Reconcile the project's on-disk session
/// folders with the database.
///
/// Per-session failures come back in `failed`; the request only errors for
/// whole-project problems. At most one sync runs per project at a time;
/// overlapping requests get 409.
pub async fn sync_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SyncResponse>> {
    let project = state
        .db
        .get_project(&id)
        .await?
        .ok_or(ApiError::ProjectNotFound(id))?;

    let _guard = state.try_begin_sync(&project.id).ok_or_else(|| {
        ApiError::Conflict(format!(
            "Sync already in progress for project '{}'",
            project.slug
        ))
    })?;

    let report = sync_project_sessions(
        &state.db,
        std::path::Path::new(&project.path),
        Some(&project.id),
    )
    .await?;

    tracing::info!(
        project = %project.slug,
        synced = report.synced.len(),
        failed = report.failed.len(),
        "Project sync complete"
    );

    Ok(Json(SyncResponse {
        status: "ok".to_string(),
        message: format!(
            "Synced {} session(s), {} failed",
            report.synced.len(),
            report.failed.len()
        ),
        synced: report.synced,
        failed: report.failed,
    }))
}

/// POST /api/projects/onboard - Validate a path and register it as a project.
///
/// The project status is derived from the validation results, and the slug
/// from the name; a slug collision is 409.
pub async fn onboard_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OnboardProjectRequest>,
) -> ApiResult<Response> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required field: name".to_string()));
    }
    if body.path.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required field: path".to_string()));
    }

    let (resolved_path, validation) = validate_project_path(&body.path);
    let status = derive_project_status(&validation);

    let slug = slugify(&body.name);
    if slug.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Cannot derive a slug from name '{}'",
            body.name
        )));
    }
    if state.db.get_project_by_slug(&slug).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Project with slug '{slug}' already exists"
        )));
    }

    let project = state
        .db
        .create_project(NewProject {
            name: body.name,
            slug,
            path: resolved_path.to_string_lossy().to_string(),
            repo_url: None,
            status,
            onboarding_status: OnboardingStatus {
                path_validated: validation.path_validated,
                claude_dir_exists: validation.claude_dir_exists,
                ..Default::default()
            },
            metadata: serde_json::json!({}),
        })
        .await?;

    tracing::info!(slug = %project.slug, status = project.status.as_str(), "Project onboarded");
    Ok((StatusCode::CREATED, Json(project)).into_response())
}

/// POST /api/projects/validate-path - Check a path without creating anything.
pub async fn validate_path(
    Json(body): Json<OnboardProjectRequest>,
) -> ApiResult<Json<PathValidation>> {
    let (_, validation) = validate_project_path(&body.path);
    Ok(Json(validation))
}

/// Create the projects routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/onboard", post(onboard_project))
        .route("/projects/validate-path", post(validate_path))
        .route("/projects/slug/{slug}", get(get_project_by_slug))
        .route(
            "/projects/{id}",
            get(get_project)
                .patch(update_project)
                .delete(delete_project),
        )
        .route("/projects/{id}/sessions", get(list_project_sessions))
        .route("/projects/{id}/sync", post(sync_project))
}
