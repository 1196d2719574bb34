// crates/db/src/queries/types.rs
// Input DTOs and result types for the query layer.

use sessionboard_core::{
    AgentStatus, AgentType, EventCategory, OnboardingStatus, ProjectStatus, SessionStatus,
    SessionType,
};

/// Data for creating a project. The caller is expected to have pre-checked
/// the slug for collisions; the UNIQUE index is the backstop.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub slug: String,
    pub path: String,
    pub repo_url: Option<String>,
    pub status: ProjectStatus,
    pub onboarding_status: OnboardingStatus,
    pub metadata: serde_json::Value,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            path: path.into(),
            repo_url: None,
            status: ProjectStatus::Pending,
            onboarding_status: OnboardingStatus::default(),
            metadata: serde_json::json!({}),
        }
    }
}

/// Partial update for a project. Only provided fields change.
///
/// `onboarding_status` is a partial JSON object merged shallowly into the
/// stored flags; `metadata` replaces the stored bag wholesale (it is opaque
/// pass-through data, never merged or branched on).
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub path: Option<String>,
    pub repo_url: Option<String>,
    pub status: Option<ProjectStatus>,
    pub onboarding_status: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.path.is_none()
            && self.repo_url.is_none()
            && self.status.is_none()
            && self.onboarding_status.is_none()
            && self.metadata.is_none()
    }
}

/// Outcome of a project delete attempt. Deletion never cascades: a project
/// with sessions is refused, a deliberate asymmetry with session delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectDelete {
    Deleted,
    NotFound,
    HasSessions(i64),
}

/// Data for creating a session directly (agent-runner path; the sync engine
/// uses the slug-keyed upsert instead).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub working_dir: String,
    pub session_dir: Option<String>,
    pub project_id: Option<String>,
    pub git_branch: Option<String>,
    pub git_worktree: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewSession {
    pub fn new(session_slug: impl Into<String>, working_dir: impl Into<String>) -> Self {
        Self {
            session_slug: session_slug.into(),
            title: None,
            description: None,
            session_type: SessionType::Full,
            working_dir: working_dir.into(),
            session_dir: None,
            project_id: None,
            git_branch: None,
            git_worktree: None,
            metadata: serde_json::json!({}),
        }
    }
}

/// Filters for session listing. All optional; combined with AND.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub session_type: Option<SessionType>,
    pub project_id: Option<String>,
}

/// What a session cascade delete removed, child tables first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDelete {
    pub session_id: String,
    pub session_slug: String,
    /// Directory to remove best-effort after the transaction commits.
    pub session_dir: Option<String>,
    pub messages_deleted: u64,
    pub logs_deleted: u64,
    pub agents_deleted: u64,
}

/// Data for creating an agent invocation record.
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub session_id: String,
    pub agent_type: AgentType,
    pub name: Option<String>,
    pub model: String,
    pub model_alias: Option<String>,
    pub system_prompt: Option<String>,
    pub working_dir: Option<String>,
    pub checkpoint_id: Option<i64>,
    pub task_group_id: Option<String>,
    pub allowed_tools: Vec<String>,
    pub metadata: serde_json::Value,
}

impl NewAgent {
    pub fn new(
        session_id: impl Into<String>,
        agent_type: AgentType,
        model: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            agent_type,
            name: None,
            model: model.into(),
            model_alias: None,
            system_prompt: None,
            working_dir: None,
            checkpoint_id: None,
            task_group_id: None,
            allowed_tools: Vec::new(),
            metadata: serde_json::json!({}),
        }
    }
}

/// Partial update for an agent as counters accrue and status transitions.
#[derive(Debug, Clone, Default)]
pub struct AgentPatch {
    pub sdk_session_id: Option<String>,
    pub status: Option<AgentStatus>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub cost: Option<f64>,
    pub error_message: Option<String>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

/// Data for appending an agent log entry.
///
/// Deliberately has no `session_id` field: the denormalized session id is
/// derived from the referenced agent row at write time so a buggy caller
/// cannot leak a log into another session's timeline.
#[derive(Debug, Clone)]
pub struct NewAgentLog {
    pub agent_id: String,
    pub sdk_session_id: Option<String>,
    pub event_category: EventCategory,
    pub event_type: String,
    pub content: Option<String>,
    pub payload: serde_json::Value,
    pub summary: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<serde_json::Value>,
    pub tool_output: Option<String>,
    /// Assigned as max+1 within the agent when unset.
    pub entry_index: Option<i64>,
    pub checkpoint_id: Option<i64>,
    /// Unix seconds; defaults to now when unset.
    pub timestamp: Option<i64>,
    pub duration_ms: Option<i64>,
}

impl NewAgentLog {
    pub fn new(
        agent_id: impl Into<String>,
        event_category: EventCategory,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            sdk_session_id: None,
            event_category,
            event_type: event_type.into(),
            content: None,
            payload: serde_json::json!({}),
            summary: None,
            tool_name: None,
            tool_input: None,
            tool_output: None,
            entry_index: None,
            checkpoint_id: None,
            timestamp: None,
            duration_ms: None,
        }
    }
}

/// Data for persisting an interactive chat block. Session id derived from
/// the agent, as with logs.
#[derive(Debug, Clone)]
pub struct NewInteractiveMessage {
    pub agent_id: String,
    pub role: String,
    pub block_type: Option<String>,
    pub content: Option<String>,
    pub payload: serde_json::Value,
    pub sdk_session_id: Option<String>,
}
