// crates/core/src/artifacts.rs
//! Best-effort readers for the session artifacts on disk.
//!
//! A session folder looks like:
//! ```text
//! {project}/agents/sessions/{session_slug}/
//! ├── state.json
//! ├── spec.md
//! └── plan.json
//! ```
//! The filesystem is the source of record for these files; readers never
//! write, and a missing file is a distinct result from a read failure.

use crate::error::ArtifactError;
use crate::types::{SessionStatus, SessionType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use ts_rs::TS;

pub const STATE_FILE: &str = "state.json";
pub const SPEC_FILE: &str = "spec.md";
pub const PLAN_FILE: &str = "plan.json";

/// Git context recorded in state.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitContext {
    pub branch: Option<String>,
    pub worktree: Option<String>,
}

/// Tolerant model of `state.json`. Every field is defaulted so a partial
/// file written mid-phase still parses; only syntactically broken JSON is
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub status: Option<SessionStatus>,
    pub session_type: Option<SessionType>,
    #[serde(alias = "topic")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub checkpoints_total: i64,
    pub checkpoints_completed: i64,
    pub git: GitContext,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        self.status.unwrap_or(SessionStatus::Created)
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type.unwrap_or(SessionType::Full)
    }

    /// `checkpoints_completed` clamped into `0..=checkpoints_total`; a
    /// corrupt count is data to tolerate, not a reason to drop the session.
    pub fn checkpoints_completed_clamped(&self) -> i64 {
        self.checkpoints_completed
            .clamp(0, self.checkpoints_total.max(0))
    }
}

/// spec.md content with an explicit presence flag, so "no spec written yet"
/// is a normal result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SpecDocument {
    pub content: String,
    pub exists: bool,
}

async fn read_json_file<T: serde::de::DeserializeOwned>(
    path: std::path::PathBuf,
) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(&path)
        .await
        .map_err(|e| ArtifactError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|e| ArtifactError::MalformedJson {
        path,
        message: e.to_string(),
    })
}

/// Read and parse `state.json` from a session directory.
pub async fn read_state(session_dir: &Path) -> Result<SessionState, ArtifactError> {
    read_json_file(session_dir.join(STATE_FILE)).await
}

/// Read `state.json` as raw JSON, for serving the file verbatim. Writers may
/// stash fields the typed model does not know about; those pass through here.
pub async fn read_state_raw(session_dir: &Path) -> Result<serde_json::Value, ArtifactError> {
    read_json_file(session_dir.join(STATE_FILE)).await
}

/// Read `spec.md`. Absence yields `exists: false`; permission and I/O
/// failures still propagate.
pub async fn read_spec(session_dir: &Path) -> Result<SpecDocument, ArtifactError> {
    let path = session_dir.join(SPEC_FILE);
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(SpecDocument {
            content,
            exists: true,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SpecDocument {
            content: String::new(),
            exists: false,
        }),
        Err(e) => Err(ArtifactError::io(&path, e)),
    }
}

/// Read and parse `plan.json`. Same contract as [`read_state`]: a missing
/// file is `NotFound`, broken JSON is `MalformedJson`.
pub async fn read_plan(session_dir: &Path) -> Result<serde_json::Value, ArtifactError> {
    read_json_file(session_dir.join(PLAN_FILE)).await
}

/// Presence probe for `spec.md`.
pub async fn spec_exists(session_dir: &Path) -> bool {
    fs::try_exists(session_dir.join(SPEC_FILE))
        .await
        .unwrap_or(false)
}

/// Presence probe for `plan.json`.
pub async fn plan_exists(session_dir: &Path) -> bool {
    fs::try_exists(session_dir.join(PLAN_FILE))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionStatus;

    fn session_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    #[tokio::test]
    async fn test_read_state_missing_is_not_found() {
        let dir = session_dir();
        let err = read_state(dir.path()).await.unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_state_parses_fields() {
        let dir = session_dir();
        std::fs::write(
            dir.path().join("state.json"),
            r#"{
                "status": "build",
                "session_type": "full",
                "topic": "Auth feature",
                "checkpoints_total": 3,
                "checkpoints_completed": 1,
                "git": {"branch": "feature/auth"}
            }"#,
        )
        .unwrap();

        let state = read_state(dir.path()).await.unwrap();
        assert_eq!(state.status(), SessionStatus::Build);
        assert_eq!(state.title.as_deref(), Some("Auth feature"));
        assert_eq!(state.checkpoints_total, 3);
        assert_eq!(state.checkpoints_completed, 1);
        assert_eq!(state.git.branch.as_deref(), Some("feature/auth"));
        assert_eq!(state.git.worktree, None);
    }

    #[tokio::test]
    async fn test_read_state_empty_object_defaults() {
        let dir = session_dir();
        std::fs::write(dir.path().join("state.json"), "{}").unwrap();

        let state = read_state(dir.path()).await.unwrap();
        assert_eq!(state.status(), SessionStatus::Created);
        assert_eq!(state.session_type(), crate::types::SessionType::Full);
        assert_eq!(state.checkpoints_total, 0);
    }

    #[tokio::test]
    async fn test_read_state_malformed_json() {
        let dir = session_dir();
        std::fs::write(dir.path().join("state.json"), "{ not json").unwrap();

        let err = read_state(dir.path()).await.unwrap_err();
        match err {
            ArtifactError::MalformedJson { message, .. } => {
                assert!(!message.is_empty());
            }
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_spec_absent_returns_exists_false() {
        let dir = session_dir();
        let doc = read_spec(dir.path()).await.unwrap();
        assert!(!doc.exists);
        assert!(doc.content.is_empty());
    }

    #[tokio::test]
    async fn test_read_spec_present() {
        let dir = session_dir();
        std::fs::write(dir.path().join("spec.md"), "# Spec\n\nbody\n").unwrap();

        let doc = read_spec(dir.path()).await.unwrap();
        assert!(doc.exists);
        assert!(doc.content.starts_with("# Spec"));
    }

    #[tokio::test]
    async fn test_read_plan_round_trip() {
        let dir = session_dir();
        std::fs::write(
            dir.path().join("plan.json"),
            r#"{"checkpoints": [{"id": 1, "title": "scaffold"}]}"#,
        )
        .unwrap();

        let plan = read_plan(dir.path()).await.unwrap();
        assert_eq!(plan["checkpoints"][0]["id"], 1);
    }

    #[tokio::test]
    async fn test_read_plan_missing_vs_malformed() {
        let dir = session_dir();
        let err = read_plan(dir.path()).await.unwrap_err();
        assert!(err.is_not_found());

        std::fs::write(dir.path().join("plan.json"), "[[[").unwrap();
        let err = read_plan(dir.path()).await.unwrap_err();
        assert!(matches!(err, ArtifactError::MalformedJson { .. }));
    }

    #[tokio::test]
    async fn test_presence_probes() {
        let dir = session_dir();
        assert!(!spec_exists(dir.path()).await);
        assert!(!plan_exists(dir.path()).await);

        std::fs::write(dir.path().join("spec.md"), "x").unwrap();
        std::fs::write(dir.path().join("plan.json"), "{}").unwrap();
        assert!(spec_exists(dir.path()).await);
        assert!(plan_exists(dir.path()).await);
    }

    #[test]
    fn test_checkpoints_clamped() {
        let state = SessionState {
            checkpoints_total: 3,
            checkpoints_completed: 7,
            ..Default::default()
        };
        assert_eq!(state.checkpoints_completed_clamped(), 3);

        let state = SessionState {
            checkpoints_total: 3,
            checkpoints_completed: -1,
            ..Default::default()
        };
        assert_eq!(state.checkpoints_completed_clamped(), 0);
    }
}
