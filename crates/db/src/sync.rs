// crates/db/src/sync.rs
//! Filesystem -> database session sync.
//!
//! Scans `{project}/agents/sessions/` and reconciles each session folder
//! against the sessions table. The filesystem is the source of truth: rows
//! are created for new folders and mutable fields are refreshed for known
//! ones, keyed by the UNIQUE session_slug so re-running a sync never
//! duplicates rows.
//!
//! Fault isolation is per session, not per batch: a folder with a missing or
//! corrupt state.json lands in the `failed` list and its siblings still
//! sync. Only a whole-project failure (the sessions directory itself is
//! unreadable) is an error.

use sessionboard_core::artifacts::{self, SessionState};
use sessionboard_core::{ArtifactError, SessionStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::{Database, DbError, DbResult};

/// Relative path from a project root to its session folders.
pub const SESSIONS_SUBDIR: &str = "agents/sessions";

/// Whole-project sync failures. Per-session problems never surface here;
/// they are reported in [`SyncReport::failed`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sessions directory not found: {path}")]
    SessionsDirNotFound { path: PathBuf },

    #[error("Cannot access sessions directory: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error during sync: {0}")]
    Db(#[from] DbError),
}

impl SyncError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::SessionsDirNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// One successfully synced session folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SyncedSession {
    pub session_slug: String,
    pub id: String,
    pub status: SessionStatus,
}

/// One session folder that could not be synced, with the reason. Reported
/// as data, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SyncFailure {
    pub session_slug: String,
    pub reason: String,
}

/// Outcome of one sync pass over a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SyncReport {
    pub synced: Vec<SyncedSession>,
    pub failed: Vec<SyncFailure>,
    pub total: usize,
}

/// Everything needed to upsert one session row from its on-disk state.
#[derive(Debug, Clone)]
pub struct SessionUpsert {
    pub session_slug: String,
    pub working_dir: String,
    pub session_dir: String,
    pub project_id: Option<String>,
    pub state: SessionState,
    pub spec_exists: bool,
    pub plan_exists: bool,
}

impl Database {
    /// Upsert a session row keyed by session_slug.
    ///
    /// A new folder inserts a fresh row; a known slug refreshes the fields
    /// the filesystem owns (status, checkpoints, artifact flags, git
    /// context, paths) and leaves the database-owned ones alone (token and
    /// cost counters, error fields, created_at). A single statement, so each
    /// session is its own transaction and an abandoned pass cannot leave a
    /// half-written batch.
    pub async fn upsert_session_from_state(&self, data: &SessionUpsert) -> DbResult<String> {
        let now = chrono::Utc::now().timestamp();
        let checkpoints_completed = data.state.checkpoints_completed_clamped();

        let (id,): (String,) = sqlx::query_as(
            r#"
            INSERT INTO sessions (
                id, session_slug, title, description, project_id,
                status, session_type, working_dir, session_dir,
                git_worktree, git_branch, spec_exists, plan_exists,
                checkpoints_total, checkpoints_completed,
                created_at, updated_at, started_at, completed_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?16, ?17, ?18
            )
            ON CONFLICT(session_slug) DO UPDATE SET
                title = COALESCE(excluded.title, sessions.title),
                description = COALESCE(excluded.description, sessions.description),
                project_id = COALESCE(excluded.project_id, sessions.project_id),
                status = excluded.status,
                session_type = excluded.session_type,
                working_dir = excluded.working_dir,
                session_dir = excluded.session_dir,
                git_worktree = COALESCE(excluded.git_worktree, sessions.git_worktree),
                git_branch = COALESCE(excluded.git_branch, sessions.git_branch),
                spec_exists = excluded.spec_exists,
                plan_exists = excluded.plan_exists,
                checkpoints_total = excluded.checkpoints_total,
                checkpoints_completed = excluded.checkpoints_completed,
                started_at = COALESCE(excluded.started_at, sessions.started_at),
                completed_at = COALESCE(excluded.completed_at, sessions.completed_at),
                updated_at = excluded.updated_at
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&data.session_slug)
        .bind(&data.state.title)
        .bind(&data.state.description)
        .bind(&data.project_id)
        .bind(data.state.status().as_str())
        .bind(data.state.session_type().as_str())
        .bind(&data.working_dir)
        .bind(&data.session_dir)
        .bind(&data.state.git.worktree)
        .bind(&data.state.git.branch)
        .bind(data.spec_exists)
        .bind(data.plan_exists)
        .bind(data.state.checkpoints_total.max(0))
        .bind(checkpoints_completed)
        .bind(now)
        .bind(data.state.started_at)
        .bind(data.state.completed_at)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }
}

/// Reconcile every session folder under `{project_path}/agents/sessions/`
/// with the database.
///
/// Returns the synced/failed partition sorted by slug, so two passes over an
/// unchanged tree produce identical reports.
pub async fn sync_project_sessions(
    db: &Database,
    project_path: &Path,
    project_id: Option<&str>,
) -> Result<SyncReport, SyncError> {
    let sessions_dir = project_path.join(SESSIONS_SUBDIR);

    let mut entries = fs::read_dir(&sessions_dir)
        .await
        .map_err(|e| SyncError::io(&sessions_dir, e))?;

    let mut synced = Vec::new();
    let mut failed = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SyncError::io(&sessions_dir, e))?
    {
        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(_) => continue,
        };
        if !file_type.is_dir() {
            continue;
        }

        let session_dir = entry.path();
        let session_slug = entry.file_name().to_string_lossy().to_string();

        match sync_one_session(db, project_path, &session_dir, &session_slug, project_id).await {
            Ok(result) => {
                debug!(slug = %session_slug, status = result.status.as_str(), "Session synced");
                synced.push(result);
            }
            Err(reason) => {
                warn!(slug = %session_slug, %reason, "Session sync failed");
                failed.push(SyncFailure {
                    session_slug,
                    reason,
                });
            }
        }
    }

    synced.sort_by(|a, b| a.session_slug.cmp(&b.session_slug));
    failed.sort_by(|a, b| a.session_slug.cmp(&b.session_slug));
    let total = synced.len() + failed.len();

    Ok(SyncReport {
        synced,
        failed,
        total,
    })
}

/// Sync one session folder. Any failure becomes a human-readable reason for
/// the report; siblings are unaffected.
async fn sync_one_session(
    db: &Database,
    project_path: &Path,
    session_dir: &Path,
    session_slug: &str,
    project_id: Option<&str>,
) -> Result<SyncedSession, String> {
    let state = artifacts::read_state(session_dir).await.map_err(|e| match e {
        ArtifactError::NotFound { .. } => "state.json not found".to_string(),
        ArtifactError::MalformedJson { message, .. } => {
            format!("invalid state.json: {message}")
        }
        other => other.to_string(),
    })?;

    let spec_exists = artifacts::spec_exists(session_dir).await;
    let plan_exists = artifacts::plan_exists(session_dir).await;

    let upsert = SessionUpsert {
        session_slug: session_slug.to_string(),
        working_dir: project_path.to_string_lossy().to_string(),
        session_dir: session_dir.to_string_lossy().to_string(),
        project_id: project_id.map(str::to_string),
        spec_exists,
        plan_exists,
        state,
    };

    let id = db
        .upsert_session_from_state(&upsert)
        .await
        .map_err(|e| format!("database error: {e}"))?;

    Ok(SyncedSession {
        session_slug: session_slug.to_string(),
        id,
        status: upsert.state.status(),
    })
}
