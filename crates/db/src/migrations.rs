/// Inline SQL migrations for the sessionboard database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: projects table
    r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    path TEXT NOT NULL,
    repo_url TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    onboarding_status TEXT NOT NULL DEFAULT '{}',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_projects_updated ON projects(updated_at DESC);"#,
    // Migration 2: sessions table
    r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    session_slug TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    project_id TEXT REFERENCES projects(id),
    status TEXT NOT NULL DEFAULT 'created',
    session_type TEXT NOT NULL DEFAULT 'full',
    working_dir TEXT NOT NULL DEFAULT '',
    session_dir TEXT,
    git_worktree TEXT,
    git_branch TEXT,
    spec_exists INTEGER NOT NULL DEFAULT 0,
    plan_exists INTEGER NOT NULL DEFAULT 0,
    checkpoints_total INTEGER NOT NULL DEFAULT 0,
    checkpoints_completed INTEGER NOT NULL DEFAULT 0,
    total_input_tokens INTEGER NOT NULL DEFAULT 0,
    total_output_tokens INTEGER NOT NULL DEFAULT 0,
    total_cost REAL NOT NULL DEFAULT 0,
    error_message TEXT,
    error_phase TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    started_at INTEGER,
    completed_at INTEGER
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project_id);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at DESC);"#,
    // Migration 3: agents table
    r#"
CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    agent_type TEXT NOT NULL,
    name TEXT,
    sdk_session_id TEXT,
    model TEXT NOT NULL,
    model_alias TEXT,
    system_prompt TEXT,
    working_dir TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    checkpoint_id INTEGER,
    task_group_id TEXT,
    input_tokens INTEGER NOT NULL DEFAULT 0,
    output_tokens INTEGER NOT NULL DEFAULT 0,
    cost REAL NOT NULL DEFAULT 0,
    error_message TEXT,
    allowed_tools TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    started_at INTEGER,
    completed_at INTEGER
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agents_session ON agents(session_id);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agents_sdk_session ON agents(sdk_session_id);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agents_status ON agents(status);"#,
    // Migration 4: agent_logs table
    r#"
CREATE TABLE IF NOT EXISTS agent_logs (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL REFERENCES agents(id),
    session_id TEXT NOT NULL REFERENCES sessions(id),
    sdk_session_id TEXT,
    event_category TEXT NOT NULL,
    event_type TEXT NOT NULL,
    content TEXT,
    payload TEXT NOT NULL DEFAULT '{}',
    summary TEXT,
    tool_name TEXT,
    tool_input TEXT,
    tool_output TEXT,
    entry_index INTEGER,
    checkpoint_id INTEGER,
    timestamp INTEGER NOT NULL,
    duration_ms INTEGER
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agent_logs_agent ON agent_logs(agent_id, timestamp);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agent_logs_session ON agent_logs(session_id);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_agent_logs_category ON agent_logs(event_category);"#,
    // Migration 5: interactive_messages table
    r#"
CREATE TABLE IF NOT EXISTS interactive_messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    agent_id TEXT NOT NULL REFERENCES agents(id),
    role TEXT NOT NULL,
    block_type TEXT,
    content TEXT,
    payload TEXT NOT NULL DEFAULT '{}',
    sdk_session_id TEXT,
    created_at INTEGER NOT NULL
);
"#,
    r#"CREATE INDEX IF NOT EXISTS idx_interactive_messages_session ON interactive_messages(session_id, created_at);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_interactive_messages_agent ON interactive_messages(agent_id);"#,
];
