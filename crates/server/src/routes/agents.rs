// crates/server/src/routes/agents.rs
//! Agent and agent-log read endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sessionboard_core::{Agent, AgentLog, AgentLogSummary, AgentSummary, EventCategory};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for GET /api/agents/{id}/logs
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AgentLogsQuery {
    pub event_category: Option<String>,
    pub event_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/agents/{id} - Full agent detail: model configuration, token
/// counters, timing, error state.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Agent>> {
    let agent = state
        .db
        .get_agent(&id)
        .await?
        .ok_or(ApiError::AgentNotFound(id))?;
    Ok(Json(agent))
}

/// GET /api/agents/session/{session_id} - Agents of a session in
/// chronological execution order.
///
/// A session with no agents and an unknown session both answer with an
/// empty array; list endpoints never error on empty results.
pub async fn list_session_agents(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<AgentSummary>>> {
    let agents = state.db.list_agents_for_session(&session_id).await?;
    Ok(Json(agents))
}

/// GET /api/agents/{id}/logs - Timeline of an agent's execution events.
///
/// Optional filters: `event_category` (hook, response, phase) and
/// `event_type` (free-form, e.g. "PreToolUse"). Ordered by timestamp.
/// Empty (including for an unknown agent) is an empty array, not an error.
pub async fn list_agent_logs(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Query(query): Query<AgentLogsQuery>,
) -> ApiResult<Json<Vec<AgentLogSummary>>> {
    if let Some(category) = query.event_category.as_deref() {
        if EventCategory::parse(category).is_none() {
            return Err(ApiError::BadRequest(format!(
                "Invalid event_category '{category}'. Valid options: hook, response, phase"
            )));
        }
    }

    let logs = state
        .db
        .list_logs_for_agent(
            &agent_id,
            query.event_category.as_deref(),
            query.event_type.as_deref(),
            query.limit,
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(logs))
}

/// GET /api/agents/{id}/logs/{log_id} - One log entry with its full payload.
///
/// The log must belong to the stated agent; an id lifted from another
/// agent's timeline is a 404, not a leak.
pub async fn get_agent_log(
    State(state): State<Arc<AppState>>,
    Path((agent_id, log_id)): Path<(String, String)>,
) -> ApiResult<Json<AgentLog>> {
    if state.db.get_agent(&agent_id).await?.is_none() {
        return Err(ApiError::AgentNotFound(agent_id));
    }
    let log = state
        .db
        .get_log_for_agent(&agent_id, &log_id)
        .await?
        .ok_or(ApiError::LogNotFound(log_id))?;
    Ok(Json(log))
}

/// Create the agents routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/agents/session/{session_id}", get(list_session_agents))
        .route("/agents/{id}", get(get_agent))
        .route("/agents/{id}/logs", get(list_agent_logs))
        .route("/agents/{id}/logs/{log_id}", get(get_agent_log))
}
