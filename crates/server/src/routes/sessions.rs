// crates/server/src/routes/sessions.rs
//! Session listing, retrieval, cascade delete, and artifact endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sessionboard_core::artifacts::{self, SpecDocument};
use sessionboard_core::{Session, SessionStatus, SessionSummary, SessionType};
use sessionboard_db::SessionFilter;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for GET /api/sessions
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SessionsListQuery {
    pub status_filter: Option<String>,
    pub session_type: Option<String>,
    pub project_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub(crate) fn parse_session_status(raw: &str) -> ApiResult<SessionStatus> {
    SessionStatus::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status_filter '{raw}'. Valid options: created, spec, spec_done, plan, \
             plan_done, build, docs, complete, failed, paused"
        ))
    })
}

pub(crate) fn parse_session_type(raw: &str) -> ApiResult<SessionType> {
    SessionType::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid session_type '{raw}'. Valid options: full, quick, research"
        ))
    })
}

/// GET /api/sessions - List sessions newest-first.
///
/// Optional filters (combined with AND):
/// - `status_filter`: workflow status
/// - `session_type`: full, quick, research
/// - `project_id`: owning project
/// - `limit` (default 100, clamped server-side) / `offset`
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsListQuery>,
) -> ApiResult<Json<Vec<SessionSummary>>> {
    let filter = SessionFilter {
        status: query
            .status_filter
            .as_deref()
            .map(parse_session_status)
            .transpose()?,
        session_type: query
            .session_type
            .as_deref()
            .map(parse_session_type)
            .transpose()?,
        project_id: query.project_id,
    };
    let sessions = state
        .db
        .list_sessions(&filter, query.limit, query.offset.unwrap_or(0))
        .await?;
    Ok(Json(sessions))
}

/// GET /api/sessions/{id} - Get a session by id.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    let session = state
        .db
        .get_session(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;
    Ok(Json(session))
}

/// GET /api/sessions/slug/{slug} - Get a session by its slug.
pub async fn get_session_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Session>> {
    let session = state
        .db
        .get_session_by_slug(&slug)
        .await?
        .ok_or(ApiError::SessionNotFound(slug))?;
    Ok(Json(session))
}

/// DELETE /api/sessions/{id} - Cascade-delete a session.
///
/// Removes interactive messages, logs, and agents before the session row,
/// all in one transaction, then removes the session directory best-effort.
/// A failed directory removal is logged and swallowed: the database is the
/// authoritative record of existence, and it is already consistent.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let result = state
        .db
        .delete_session_cascade(&id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    tracing::info!(
        slug = %result.session_slug,
        agents = result.agents_deleted,
        logs = result.logs_deleted,
        messages = result.messages_deleted,
        "Session deleted"
    );

    if let Some(dir) = &result.session_dir {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    slug = %result.session_slug,
                    dir = %dir,
                    error = %e,
                    "Session directory cleanup failed; leaving directory behind"
                );
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a session by slug (the primary address for artifact endpoints),
/// falling back to id, or fail with 404.
async fn resolve_session(state: &AppState, key: &str) -> ApiResult<Session> {
    if let Some(session) = state.db.get_session_by_slug(key).await? {
        return Ok(session);
    }
    state
        .db
        .get_session(key)
        .await?
        .ok_or_else(|| ApiError::SessionNotFound(key.to_string()))
}

/// GET /api/sessions/{slug}/spec - The session's spec.md content.
pub async fn get_session_spec(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<SpecDocument>> {
    let session = resolve_session(&state, &slug).await?;
    let session_dir = session.session_dir_path();
    let doc = artifacts::read_spec(&session_dir).await?;
    if !doc.exists {
        return Err(ApiError::Artifact(
            sessionboard_core::ArtifactError::NotFound {
                path: session_dir.join(artifacts::SPEC_FILE),
            },
        ));
    }
    Ok(Json(doc))
}

/// GET /api/sessions/{slug}/plan - The session's plan.json, parsed.
pub async fn get_session_plan(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let session = resolve_session(&state, &slug).await?;
    let plan = artifacts::read_plan(&session.session_dir_path()).await?;
    Ok(Json(plan))
}

/// GET /api/sessions/{slug}/state - The session's state.json, verbatim.
pub async fn get_session_state(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let session = resolve_session(&state, &slug).await?;
    let value = artifacts::read_state_raw(&session.session_dir_path()).await?;
    Ok(Json(value))
}

/// Create the sessions routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/slug/{slug}", get(get_session_by_slug))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/spec", get(get_session_spec))
        .route("/sessions/{id}/plan", get(get_session_plan))
        .route("/sessions/{id}/state", get(get_session_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_helpers::{body_json, do_delete, do_get};
    use sessionboard_core::{AgentType, EventCategory};
    use sessionboard_db::{Database, NewAgent, NewAgentLog, NewInteractiveMessage, NewSession};

    async fn test_db() -> Database {
        Database::new_in_memory().await.expect("in-memory DB")
    }

    fn build_app(db: Database) -> axum::Router {
        crate::create_app(db)
    }

    #[tokio::test]
    async fn test_list_sessions_empty() {
        let app = build_app(test_db().await);
        let (status, body) = do_get(app, "/api/sessions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body), serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_list_sessions_invalid_filter() {
        let app = build_app(test_db().await);
        let (status, body) = do_get(app, "/api/sessions?status_filter=sideways").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("sideways"));
        assert!(body.contains("spec_done"));

        let app = build_app(test_db().await);
        let (status, body) = do_get(app, "/api/sessions?session_type=massive").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("full, quick, research"));
    }

    #[tokio::test]
    async fn test_get_session_by_id_and_slug() {
        let db = test_db().await;
        let session = db
            .create_session(NewSession {
                title: Some("Demo".into()),
                ..NewSession::new("2026-02-02_demo_xy98zw", "/tmp/p")
            })
            .await
            .unwrap();
        let app = build_app(db);

        let (status, body) = do_get(app.clone(), &format!("/api/sessions/{}", session.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body)["session_slug"], "2026-02-02_demo_xy98zw");

        let (status, body) =
            do_get(app.clone(), "/api/sessions/slug/2026-02-02_demo_xy98zw").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body)["id"], session.id.as_str());

        let (status, _) = do_get(app, "/api/sessions/not-a-session").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session_cascades_and_cleans_directory() {
        let root = tempfile::tempdir().unwrap();
        let session_dir = root.path().join("agents/sessions/doomed");
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(session_dir.join("state.json"), "{}").unwrap();

        let db = test_db().await;
        let session = db
            .create_session(NewSession {
                session_dir: Some(session_dir.to_string_lossy().to_string()),
                ..NewSession::new("doomed", root.path().to_str().unwrap())
            })
            .await
            .unwrap();

        // 2 agents with 5 logs each, plus a chat block
        for _ in 0..2 {
            let agent = db
                .create_agent(NewAgent::new(&session.id, AgentType::Build, "m"))
                .await
                .unwrap()
                .unwrap();
            for _ in 0..5 {
                db.append_agent_log(NewAgentLog::new(
                    &agent.id,
                    EventCategory::Hook,
                    "PreToolUse",
                ))
                .await
                .unwrap()
                .unwrap();
            }
            db.create_interactive_message(NewInteractiveMessage {
                agent_id: agent.id.clone(),
                role: "user".into(),
                block_type: None,
                content: Some("hi".into()),
                payload: serde_json::json!({}),
                sdk_session_id: None,
            })
            .await
            .unwrap()
            .unwrap();
        }

        let app = build_app(db.clone());
        let (status, _) = do_delete(app.clone(), &format!("/api/sessions/{}", session.id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Dependents are gone: the agent listing is empty, not an error
        let (status, body) = do_get(app.clone(), &format!("/api/agents/session/{}", session.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body), serde_json::json!([]));
        assert!(db.get_session(&session.id).await.unwrap().is_none());

        // The filesystem directory was removed too
        assert!(!session_dir.exists());

        // Deleting again is 404
        let (status, _) = do_delete(app, &format!("/api/sessions/{}", session.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session_survives_missing_directory() {
        let db = test_db().await;
        let session = db
            .create_session(NewSession {
                session_dir: Some("/no/such/directory/at/all".into()),
                ..NewSession::new("dir-less", "/tmp/p")
            })
            .await
            .unwrap();
        let app = build_app(db);

        // DB delete wins even though the directory is long gone
        let (status, _) = do_delete(app, &format!("/api/sessions/{}", session.id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_session_spec_artifact() {
        let root = tempfile::tempdir().unwrap();
        let session_dir = root.path().join("agents/sessions/with-spec");
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(session_dir.join("spec.md"), "# The Spec\n").unwrap();

        let db = test_db().await;
        db.create_session(NewSession {
            session_dir: Some(session_dir.to_string_lossy().to_string()),
            ..NewSession::new("with-spec", root.path().to_str().unwrap())
        })
        .await
        .unwrap();
        let app = build_app(db);

        let (status, body) = do_get(app.clone(), "/api/sessions/with-spec/spec").await;
        assert_eq!(status, StatusCode::OK);
        let doc = body_json(&body);
        assert_eq!(doc["exists"], true);
        assert!(doc["content"].as_str().unwrap().starts_with("# The Spec"));

        // plan.json was never written: distinct 404, not an empty success
        let (status, _) = do_get(app.clone(), "/api/sessions/with-spec/plan").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Unknown slug is also a 404, with session context
        let (status, _) = do_get(app, "/api/sessions/ghost/spec").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_plan_and_state_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let session_dir = root.path().join("agents/sessions/artifacty");
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(
            session_dir.join("plan.json"),
            r#"{"checkpoints": [{"id": 1}]}"#,
        )
        .unwrap();
        std::fs::write(
            session_dir.join("state.json"),
            r#"{"status": "build", "custom_extra": "kept"}"#,
        )
        .unwrap();

        let db = test_db().await;
        db.create_session(NewSession {
            session_dir: Some(session_dir.to_string_lossy().to_string()),
            ..NewSession::new("artifacty", root.path().to_str().unwrap())
        })
        .await
        .unwrap();
        let app = build_app(db);

        let (status, body) = do_get(app.clone(), "/api/sessions/artifacty/plan").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body)["checkpoints"][0]["id"], 1);

        // state.json is served verbatim, unknown fields included
        let (status, body) = do_get(app, "/api/sessions/artifacty/state").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(&body)["custom_extra"], "kept");
    }

    #[tokio::test]
    async fn test_malformed_plan_is_500_not_404() {
        let root = tempfile::tempdir().unwrap();
        let session_dir = root.path().join("agents/sessions/corrupt");
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(session_dir.join("plan.json"), "[[[ nope").unwrap();

        let db = test_db().await;
        db.create_session(NewSession {
            session_dir: Some(session_dir.to_string_lossy().to_string()),
            ..NewSession::new("corrupt", root.path().to_str().unwrap())
        })
        .await
        .unwrap();
        let app = build_app(db);

        let (status, body) = do_get(app, "/api/sessions/corrupt/plan").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Malformed artifact"));
    }
}
