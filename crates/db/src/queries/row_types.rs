// crates/db/src/queries/row_types.rs
// Internal row types mapping SQLite rows onto core entities. JSON text
// columns decode leniently: a hand-edited or legacy value falls back to an
// empty bag instead of failing the whole query.

use sessionboard_core::{
    Agent, AgentLog, AgentStatus, AgentType, EventCategory, InteractiveMessage, OnboardingStatus,
    Project, ProjectStatus, Session, SessionStatus, SessionType,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn parse_json_bag(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

fn parse_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug)]
pub(crate) struct ProjectRow {
    id: String,
    name: String,
    slug: String,
    path: String,
    repo_url: Option<String>,
    status: String,
    onboarding_status: String,
    metadata: String,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for ProjectRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            path: row.try_get("path")?,
            repo_url: row.try_get("repo_url")?,
            status: row.try_get("status")?,
            onboarding_status: row.try_get("onboarding_status")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ProjectRow {
    pub(crate) fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            slug: self.slug,
            path: self.path,
            repo_url: self.repo_url,
            status: ProjectStatus::from_db_str(&self.status),
            onboarding_status: serde_json::from_str::<OnboardingStatus>(&self.onboarding_status)
                .unwrap_or_default(),
            metadata: parse_json_bag(&self.metadata),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SessionRow {
    id: String,
    session_slug: String,
    title: Option<String>,
    description: Option<String>,
    project_id: Option<String>,
    status: String,
    session_type: String,
    working_dir: String,
    session_dir: Option<String>,
    git_worktree: Option<String>,
    git_branch: Option<String>,
    spec_exists: bool,
    plan_exists: bool,
    checkpoints_total: i64,
    checkpoints_completed: i64,
    total_input_tokens: i64,
    total_output_tokens: i64,
    total_cost: f64,
    error_message: Option<String>,
    error_phase: Option<String>,
    metadata: String,
    created_at: i64,
    updated_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for SessionRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_slug: row.try_get("session_slug")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            project_id: row.try_get("project_id")?,
            status: row.try_get("status")?,
            session_type: row.try_get("session_type")?,
            working_dir: row.try_get("working_dir")?,
            session_dir: row.try_get("session_dir")?,
            git_worktree: row.try_get("git_worktree")?,
            git_branch: row.try_get("git_branch")?,
            spec_exists: row.try_get("spec_exists")?,
            plan_exists: row.try_get("plan_exists")?,
            checkpoints_total: row.try_get("checkpoints_total")?,
            checkpoints_completed: row.try_get("checkpoints_completed")?,
            total_input_tokens: row.try_get("total_input_tokens")?,
            total_output_tokens: row.try_get("total_output_tokens")?,
            total_cost: row.try_get("total_cost")?,
            error_message: row.try_get("error_message")?,
            error_phase: row.try_get("error_phase")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

impl SessionRow {
    pub(crate) fn into_session(self) -> Session {
        Session {
            id: self.id,
            session_slug: self.session_slug,
            title: self.title,
            description: self.description,
            project_id: self.project_id,
            status: SessionStatus::from_db_str(&self.status),
            session_type: SessionType::from_db_str(&self.session_type),
            working_dir: self.working_dir,
            session_dir: self.session_dir,
            git_worktree: self.git_worktree,
            git_branch: self.git_branch,
            spec_exists: self.spec_exists,
            plan_exists: self.plan_exists,
            checkpoints_total: self.checkpoints_total,
            checkpoints_completed: self.checkpoints_completed,
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            total_cost: self.total_cost,
            error_message: self.error_message,
            error_phase: self.error_phase,
            metadata: parse_json_bag(&self.metadata),
            created_at: self.created_at,
            updated_at: self.updated_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AgentRow {
    id: String,
    session_id: String,
    agent_type: String,
    name: Option<String>,
    sdk_session_id: Option<String>,
    model: String,
    model_alias: Option<String>,
    system_prompt: Option<String>,
    working_dir: Option<String>,
    status: String,
    checkpoint_id: Option<i64>,
    task_group_id: Option<String>,
    input_tokens: i64,
    output_tokens: i64,
    cost: f64,
    error_message: Option<String>,
    allowed_tools: String,
    metadata: String,
    created_at: i64,
    updated_at: i64,
    started_at: Option<i64>,
    completed_at: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for AgentRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            agent_type: row.try_get("agent_type")?,
            name: row.try_get("name")?,
            sdk_session_id: row.try_get("sdk_session_id")?,
            model: row.try_get("model")?,
            model_alias: row.try_get("model_alias")?,
            system_prompt: row.try_get("system_prompt")?,
            working_dir: row.try_get("working_dir")?,
            status: row.try_get("status")?,
            checkpoint_id: row.try_get("checkpoint_id")?,
            task_group_id: row.try_get("task_group_id")?,
            input_tokens: row.try_get("input_tokens")?,
            output_tokens: row.try_get("output_tokens")?,
            cost: row.try_get("cost")?,
            error_message: row.try_get("error_message")?,
            allowed_tools: row.try_get("allowed_tools")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

impl AgentRow {
    pub(crate) fn into_agent(self) -> Agent {
        Agent {
            id: self.id,
            session_id: self.session_id,
            agent_type: AgentType::from_db_str(&self.agent_type),
            name: self.name,
            sdk_session_id: self.sdk_session_id,
            model: self.model,
            model_alias: self.model_alias,
            system_prompt: self.system_prompt,
            working_dir: self.working_dir,
            status: AgentStatus::from_db_str(&self.status),
            checkpoint_id: self.checkpoint_id,
            task_group_id: self.task_group_id,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cost: self.cost,
            error_message: self.error_message,
            allowed_tools: parse_string_list(&self.allowed_tools),
            metadata: parse_json_bag(&self.metadata),
            created_at: self.created_at,
            updated_at: self.updated_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AgentLogRow {
    id: String,
    agent_id: String,
    session_id: String,
    sdk_session_id: Option<String>,
    event_category: String,
    event_type: String,
    content: Option<String>,
    payload: String,
    summary: Option<String>,
    tool_name: Option<String>,
    tool_input: Option<String>,
    tool_output: Option<String>,
    entry_index: Option<i64>,
    checkpoint_id: Option<i64>,
    timestamp: i64,
    duration_ms: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for AgentLogRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            agent_id: row.try_get("agent_id")?,
            session_id: row.try_get("session_id")?,
            sdk_session_id: row.try_get("sdk_session_id")?,
            event_category: row.try_get("event_category")?,
            event_type: row.try_get("event_type")?,
            content: row.try_get("content")?,
            payload: row.try_get("payload")?,
            summary: row.try_get("summary")?,
            tool_name: row.try_get("tool_name")?,
            tool_input: row.try_get("tool_input")?,
            tool_output: row.try_get("tool_output")?,
            entry_index: row.try_get("entry_index")?,
            checkpoint_id: row.try_get("checkpoint_id")?,
            timestamp: row.try_get("timestamp")?,
            duration_ms: row.try_get("duration_ms")?,
        })
    }
}

impl AgentLogRow {
    pub(crate) fn into_agent_log(self) -> AgentLog {
        AgentLog {
            id: self.id,
            agent_id: self.agent_id,
            session_id: self.session_id,
            sdk_session_id: self.sdk_session_id,
            event_category: EventCategory::from_db_str(&self.event_category),
            event_type: self.event_type,
            content: self.content,
            payload: parse_json_bag(&self.payload),
            summary: self.summary,
            tool_name: self.tool_name,
            tool_input: self
                .tool_input
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            tool_output: self.tool_output,
            entry_index: self.entry_index,
            checkpoint_id: self.checkpoint_id,
            timestamp: self.timestamp,
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug)]
pub(crate) struct InteractiveMessageRow {
    id: String,
    session_id: String,
    agent_id: String,
    role: String,
    block_type: Option<String>,
    content: Option<String>,
    payload: String,
    sdk_session_id: Option<String>,
    created_at: i64,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for InteractiveMessageRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            agent_id: row.try_get("agent_id")?,
            role: row.try_get("role")?,
            block_type: row.try_get("block_type")?,
            content: row.try_get("content")?,
            payload: row.try_get("payload")?,
            sdk_session_id: row.try_get("sdk_session_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl InteractiveMessageRow {
    pub(crate) fn into_interactive_message(self) -> InteractiveMessage {
        InteractiveMessage {
            id: self.id,
            session_id: self.session_id,
            agent_id: self.agent_id,
            role: self.role,
            block_type: self.block_type,
            content: self.content,
            payload: parse_json_bag(&self.payload),
            sdk_session_id: self.sdk_session_id,
            created_at: self.created_at,
        }
    }
}
