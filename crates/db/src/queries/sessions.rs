// crates/db/src/queries/sessions.rs
// Session CRUD: create, get, filtered listing, cascade delete, stats rollup.

use chrono::Utc;
use sessionboard_core::{Session, SessionStatus, SessionSummary};
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::row_types::SessionRow;
use super::{clamp_limit, CascadeDelete, NewSession, SessionFilter};
use crate::{Database, DbResult};

const SESSION_COLUMNS: &str = "id, session_slug, title, description, project_id, status, \
     session_type, working_dir, session_dir, git_worktree, git_branch, spec_exists, \
     plan_exists, checkpoints_total, checkpoints_completed, total_input_tokens, \
     total_output_tokens, total_cost, error_message, error_phase, metadata, created_at, \
     updated_at, started_at, completed_at";

impl Database {
    /// Insert a new session (agent-runner path; the sync engine goes through
    /// the slug-keyed upsert in `sync.rs` instead).
    pub async fn create_session(&self, data: NewSession) -> DbResult<Session> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let metadata =
            serde_json::to_string(&data.metadata).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, session_slug, title, description, project_id,
                session_type, working_dir, session_dir, git_branch, git_worktree,
                metadata, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            "#,
        )
        .bind(&id)
        .bind(&data.session_slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.project_id)
        .bind(data.session_type.as_str())
        .bind(&data.working_dir)
        .bind(&data.session_dir)
        .bind(&data.git_branch)
        .bind(&data.git_worktree)
        .bind(&metadata)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(Session {
            id,
            session_slug: data.session_slug,
            title: data.title,
            description: data.description,
            project_id: data.project_id,
            status: SessionStatus::Created,
            session_type: data.session_type,
            working_dir: data.working_dir,
            session_dir: data.session_dir,
            git_worktree: data.git_worktree,
            git_branch: data.git_branch,
            spec_exists: false,
            plan_exists: false,
            checkpoints_total: 0,
            checkpoints_completed: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cost: 0.0,
            error_message: None,
            error_phase: None,
            metadata: data.metadata,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        })
    }

    /// Get a session by id.
    pub async fn get_session(&self, id: &str) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(SessionRow::into_session))
    }

    /// Get a session by its slug (the folder name under `agents/sessions/`).
    pub async fn get_session_by_slug(&self, slug: &str) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_slug = ?1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(SessionRow::into_session))
    }

    /// List sessions newest-first with optional status/type/project filters,
    /// combined with AND. Same pagination contract as projects.
    pub async fn list_sessions(
        &self,
        filter: &SessionFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> DbResult<Vec<SessionSummary>> {
        let limit = clamp_limit(limit);
        let offset = offset.max(0);

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE 1 = 1"
        ));
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(session_type) = filter.session_type {
            builder
                .push(" AND session_type = ")
                .push_bind(session_type.as_str());
        }
        if let Some(project_id) = &filter.project_id {
            builder
                .push(" AND project_id = ")
                .push_bind(project_id.clone());
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<SessionRow> = builder.build_query_as().fetch_all(self.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let session = row.into_session();
                SessionSummary {
                    id: session.id,
                    session_slug: session.session_slug,
                    title: session.title,
                    status: session.status,
                    session_type: session.session_type,
                    project_id: session.project_id,
                    checkpoints_completed: session.checkpoints_completed,
                    checkpoints_total: session.checkpoints_total,
                    total_cost: session.total_cost,
                    created_at: session.created_at,
                    updated_at: session.updated_at,
                }
            })
            .collect())
    }

    /// Delete a session and everything hanging off it, in strict child-first
    /// FK order: interactive_messages -> agent_logs -> agents -> session.
    /// Runs in a single transaction so a crash mid-delete leaves the rows
    /// intact rather than orphaned.
    ///
    /// Filesystem cleanup is the caller's business: the returned
    /// `session_dir` is what to remove best-effort after commit.
    pub async fn delete_session_cascade(&self, id: &str) -> DbResult<Option<CascadeDelete>> {
        let mut tx = self.pool().begin().await?;

        let target: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT session_slug, session_dir FROM sessions WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((session_slug, session_dir)) = target else {
            return Ok(None);
        };

        let messages_deleted =
            sqlx::query("DELETE FROM interactive_messages WHERE session_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        let logs_deleted = sqlx::query("DELETE FROM agent_logs WHERE session_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let agents_deleted = sqlx::query("DELETE FROM agents WHERE session_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(CascadeDelete {
            session_id: id.to_string(),
            session_slug,
            session_dir,
            messages_deleted,
            logs_deleted,
            agents_deleted,
        }))
    }

    /// Recompute a session's aggregated token/cost totals from its agents.
    pub async fn update_session_stats(&self, session_id: &str) -> DbResult<Option<Session>> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                total_input_tokens = (
                    SELECT COALESCE(SUM(input_tokens), 0) FROM agents WHERE session_id = ?1
                ),
                total_output_tokens = (
                    SELECT COALESCE(SUM(output_tokens), 0) FROM agents WHERE session_id = ?1
                ),
                total_cost = (
                    SELECT COALESCE(SUM(cost), 0) FROM agents WHERE session_id = ?1
                ),
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .bind(Utc::now().timestamp())
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_session(session_id).await
    }
}
