// crates/core/src/types.rs
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Status enums
// ============================================================================

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Onboarding,
    Active,
    Paused,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Onboarding => "onboarding",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Archived => "archived",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "onboarding" => Self::Onboarding,
            "active" => Self::Active,
            "paused" => Self::Paused,
            "archived" => Self::Archived,
            _ => Self::Pending,
        }
    }

    /// Strict parse for caller-supplied filter values; `None` for anything
    /// outside the closed set (unlike the lossy `from_db_str`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "onboarding" => Some(Self::Onboarding),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Session workflow phase.
///
/// Transitions are driven by the external agent runner and mirrored here;
/// the tracker stores whatever the writer reports and does not reject
/// out-of-order jumps. Unknown strings decode to `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Spec,
    SpecDone,
    Plan,
    PlanDone,
    Build,
    Docs,
    Complete,
    Failed,
    Paused,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Spec => "spec",
            Self::SpecDone => "spec_done",
            Self::Plan => "plan",
            Self::PlanDone => "plan_done",
            Self::Build => "build",
            Self::Docs => "docs",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Paused => "paused",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "spec" => Self::Spec,
            "spec_done" => Self::SpecDone,
            "plan" => Self::Plan,
            "plan_done" => Self::PlanDone,
            "build" => Self::Build,
            "docs" => Self::Docs,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            "paused" => Self::Paused,
            _ => Self::Created,
        }
    }

    /// Strict parse for caller-supplied filter values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "spec" => Some(Self::Spec),
            "spec_done" => Some(Self::SpecDone),
            "plan" => Some(Self::Plan),
            "plan_done" => Some(Self::PlanDone),
            "build" => Some(Self::Build),
            "docs" => Some(Self::Docs),
            "complete" => Some(Self::Complete),
            "failed" => Some(Self::Failed),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }

    /// Terminal from the tracker's point of view (a human may still resume
    /// a failed session out of band).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Session workflow shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Full,
    Quick,
    Research,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Quick => "quick",
            Self::Research => "research",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "quick" => Self::Quick,
            "research" => Self::Research,
            _ => Self::Full,
        }
    }

    /// Strict parse for caller-supplied filter values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "quick" => Some(Self::Quick),
            "research" => Some(Self::Research),
            _ => None,
        }
    }
}

/// Kind of agent invocation within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    Spec,
    Plan,
    QuickPlan,
    Build,
    Research,
    Docs,
    Debug,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spec => "spec",
            Self::Plan => "plan",
            Self::QuickPlan => "quick-plan",
            Self::Build => "build",
            Self::Research => "research",
            Self::Docs => "docs",
            Self::Debug => "debug",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "spec" => Self::Spec,
            "plan" => Self::Plan,
            "quick-plan" => Self::QuickPlan,
            "research" => Self::Research,
            "docs" => Self::Docs,
            "debug" => Self::Debug,
            _ => Self::Build,
        }
    }
}

/// Agent execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Pending,
    Executing,
    Waiting,
    Complete,
    Failed,
    Interrupted,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Waiting => "waiting",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "executing" => Self::Executing,
            "waiting" => Self::Waiting,
            "complete" => Self::Complete,
            "failed" => Self::Failed,
            "interrupted" => Self::Interrupted,
            _ => Self::Pending,
        }
    }
}

/// Category of an agent log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Hook,
    Response,
    Phase,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hook => "hook",
            Self::Response => "response",
            Self::Phase => "phase",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "hook" => Self::Hook,
            "phase" => Self::Phase,
            _ => Self::Response,
        }
    }

    /// Strict parse for caller-supplied filter values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hook" => Some(Self::Hook),
            "response" => Some(Self::Response),
            "phase" => Some(Self::Phase),
            _ => None,
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// Per-step onboarding flags for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(default)]
pub struct OnboardingStatus {
    pub path_validated: bool,
    pub claude_dir_exists: bool,
    pub settings_configured: bool,
    pub skills_linked: bool,
    pub agents_linked: bool,
    pub docs_foundation: bool,
}

/// A codebase registered with the tracker. Each project owns zero or more
/// sessions rooted under `{path}/agents/sessions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// URL-safe identifier, globally unique.
    pub slug: String,
    /// Absolute path to the codebase root.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    pub status: ProjectStatus,
    pub onboarding_status: OnboardingStatus,
    pub metadata: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One spec → plan → build → docs workflow instance.
///
/// Artifacts (spec.md, plan.json, state.json) live in the session folder on
/// disk; this row is the queryable index of their state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct Session {
    pub id: String,
    /// Folder name under `agents/sessions/`, e.g. `2026-01-15_auth-feature_ab12cd`.
    pub session_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning project; a session without one is valid but unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub status: SessionStatus,
    pub session_type: SessionType,
    pub working_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_worktree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    pub spec_exists: bool,
    pub plan_exists: bool,
    pub checkpoints_total: i64,
    pub checkpoints_completed: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_phase: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Session {
    /// The on-disk session folder: the recorded `session_dir`, falling back
    /// to `{working_dir}/agents/sessions/{session_slug}` for rows written
    /// before the column existed.
    pub fn session_dir_path(&self) -> std::path::PathBuf {
        match &self.session_dir {
            Some(dir) => std::path::PathBuf::from(dir),
            None => std::path::Path::new(&self.working_dir)
                .join("agents")
                .join("sessions")
                .join(&self.session_slug),
        }
    }
}

/// One SDK invocation within a session. `sdk_session_id` is the external
/// resumption token for a suspended agent process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct Agent {
    pub id: String,
    pub session_id: String,
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_session_id: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_group_id: Option<String>,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub allowed_tools: Vec<String>,
    pub metadata: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Append-only execution event. `session_id` is denormalized from the owning
/// agent for direct session-scoped queries and is derived at write time,
/// never taken from caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct AgentLog {
    pub id: String,
    pub agent_id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_session_id: Option<String>,
    pub event_category: EventCategory,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<i64>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

/// A chat block exchanged during an interactive phase (spec/plan interview).
/// The deepest child in the session delete cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct InteractiveMessage {
    pub id: String,
    pub session_id: String,
    pub agent_id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_session_id: Option<String>,
    pub created_at: i64,
}

// ============================================================================
// Summary views (list endpoints)
// ============================================================================

/// Lightweight project info for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub status: ProjectStatus,
    pub path: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Lightweight session info for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct SessionSummary {
    pub id: String,
    pub session_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: SessionStatus,
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub checkpoints_completed: i64,
    pub checkpoints_total: i64,
    pub total_cost: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Lightweight agent info for session detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct AgentSummary {
    pub id: String,
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_alias: Option<String>,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<i64>,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Lightweight log entry for timeline views (payload omitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct AgentLogSummary {
    pub id: String,
    pub agent_id: String,
    pub session_id: String,
    pub event_category: EventCategory,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

// ============================================================================
// Derived phase progress
// ============================================================================

/// Per-phase display state, derived from the session status. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    Pending,
    InProgress,
    Complete,
}

/// Derived status for each workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../ui/types/generated/")]
pub struct PhaseProgress {
    pub spec: PhaseState,
    pub plan: PhaseState,
    pub build: PhaseState,
    pub docs: PhaseState,
}

/// Map a session status onto per-phase display states.
///
/// `failed` and `paused` carry no phase position of their own, so they render
/// the same as `created`; the status badge itself tells the rest of the story.
pub fn phase_progress(status: SessionStatus) -> PhaseProgress {
    use PhaseState::*;
    let (spec, plan, build, docs) = match status {
        SessionStatus::Created | SessionStatus::Failed | SessionStatus::Paused => {
            (Pending, Pending, Pending, Pending)
        }
        SessionStatus::Spec => (InProgress, Pending, Pending, Pending),
        SessionStatus::SpecDone => (Complete, Pending, Pending, Pending),
        SessionStatus::Plan => (Complete, InProgress, Pending, Pending),
        SessionStatus::PlanDone => (Complete, Complete, Pending, Pending),
        SessionStatus::Build => (Complete, Complete, InProgress, Pending),
        SessionStatus::Docs => (Complete, Complete, Complete, InProgress),
        SessionStatus::Complete => (Complete, Complete, Complete, Complete),
    };
    PhaseProgress {
        spec,
        plan,
        build,
        docs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_status_round_trip() {
        for status in [
            SessionStatus::Created,
            SessionStatus::Spec,
            SessionStatus::SpecDone,
            SessionStatus::Plan,
            SessionStatus::PlanDone,
            SessionStatus::Build,
            SessionStatus::Docs,
            SessionStatus::Complete,
            SessionStatus::Failed,
            SessionStatus::Paused,
        ] {
            assert_eq!(SessionStatus::from_db_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_session_status_unknown_falls_back_to_created() {
        assert_eq!(SessionStatus::from_db_str("warp-speed"), SessionStatus::Created);
        assert_eq!(SessionStatus::from_db_str(""), SessionStatus::Created);
    }

    #[test]
    fn test_session_status_serde_snake_case() {
        let json = serde_json::to_string(&SessionStatus::SpecDone).unwrap();
        assert_eq!(json, "\"spec_done\"");
        let parsed: SessionStatus = serde_json::from_str("\"plan_done\"").unwrap();
        assert_eq!(parsed, SessionStatus::PlanDone);
    }

    #[test]
    fn test_agent_type_kebab_case() {
        let json = serde_json::to_string(&AgentType::QuickPlan).unwrap();
        assert_eq!(json, "\"quick-plan\"");
        assert_eq!(AgentType::from_db_str("quick-plan"), AgentType::QuickPlan);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SessionStatus::Complete.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
        assert!(!SessionStatus::Build.is_terminal());
    }

    #[test]
    fn test_onboarding_status_default_all_false() {
        let status = OnboardingStatus::default();
        assert!(!status.path_validated);
        assert!(!status.claude_dir_exists);
        assert!(!status.settings_configured);
        assert!(!status.skills_linked);
        assert!(!status.agents_linked);
        assert!(!status.docs_foundation);
    }

    #[test]
    fn test_onboarding_status_partial_json() {
        // Rows written by older builds may carry only a subset of flags.
        let status: OnboardingStatus =
            serde_json::from_str(r#"{"path_validated": true}"#).unwrap();
        assert!(status.path_validated);
        assert!(!status.claude_dir_exists);
    }

    #[test]
    fn test_phase_progress_build() {
        let progress = phase_progress(SessionStatus::Build);
        assert_eq!(progress.spec, PhaseState::Complete);
        assert_eq!(progress.plan, PhaseState::Complete);
        assert_eq!(progress.build, PhaseState::InProgress);
        assert_eq!(progress.docs, PhaseState::Pending);
    }

    #[test]
    fn test_phase_progress_complete() {
        let progress = phase_progress(SessionStatus::Complete);
        assert_eq!(progress.spec, PhaseState::Complete);
        assert_eq!(progress.docs, PhaseState::Complete);
    }

    #[test]
    fn test_phase_progress_failed_renders_like_created() {
        assert_eq!(
            phase_progress(SessionStatus::Failed),
            phase_progress(SessionStatus::Created)
        );
    }
}
