// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sessionboard_core::ArtifactError;
use sessionboard_db::{DbError, SyncError};
use thiserror::Error;
use ts_rs::TS;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Log entry not found: {0}")]
    LogNotFound(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::ProjectNotFound(id) => {
                tracing::warn!(project = %id, "Project not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Project not found", id.clone()),
                )
            }
            ApiError::SessionNotFound(id) => {
                tracing::warn!(session = %id, "Session not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Session not found", id.clone()),
                )
            }
            ApiError::AgentNotFound(id) => {
                tracing::warn!(agent = %id, "Agent not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Agent not found", id.clone()),
                )
            }
            ApiError::LogNotFound(id) => {
                tracing::warn!(log = %id, "Log entry not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Log entry not found", id.clone()),
                )
            }
            ApiError::Artifact(artifact_err) => {
                let (status, error_msg) = match artifact_err {
                    ArtifactError::NotFound { path } => {
                        tracing::warn!(path = %path.display(), "Artifact not found");
                        (StatusCode::NOT_FOUND, "Artifact not found")
                    }
                    ArtifactError::PermissionDenied { path } => {
                        tracing::error!(path = %path.display(), "Permission denied");
                        (StatusCode::FORBIDDEN, "Permission denied")
                    }
                    ArtifactError::Io { path, source } => {
                        tracing::error!(path = %path.display(), error = %source, "IO error");
                        (StatusCode::INTERNAL_SERVER_ERROR, "IO error reading artifact")
                    }
                    ArtifactError::MalformedJson { path, message } => {
                        tracing::error!(path = %path.display(), message = %message, "Malformed JSON");
                        (StatusCode::INTERNAL_SERVER_ERROR, "Malformed artifact")
                    }
                };
                (
                    status,
                    ErrorResponse::with_details(error_msg, artifact_err.to_string()),
                )
            }
            ApiError::Sync(sync_err) => {
                let error_msg = match sync_err {
                    SyncError::SessionsDirNotFound { path } => {
                        tracing::error!(path = %path.display(), "Sessions directory not found");
                        "Sessions directory not found"
                    }
                    SyncError::PermissionDenied { path } => {
                        tracing::error!(path = %path.display(), "Cannot access sessions directory");
                        "Cannot access sessions directory"
                    }
                    SyncError::Io { path, source } => {
                        tracing::error!(path = %path.display(), error = %source, "IO error during sync");
                        "IO error during sync"
                    }
                    SyncError::Db(db_err) => {
                        tracing::error!(error = %db_err, "Database error during sync");
                        "Database error during sync"
                    }
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details(error_msg, sync_err.to_string()),
                )
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Database error", db_err.to_string()),
                )
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(message = %msg, "Conflict");
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::with_details("Conflict", msg.clone()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
