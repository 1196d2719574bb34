// crates/db/src/queries/agents.rs
// Agent and agent-log access. Reads serve the API; writes serve the external
// agent runner (and the tests standing in for it).

use chrono::Utc;
use sessionboard_core::{Agent, AgentLog, AgentLogSummary, AgentSummary, InteractiveMessage};
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::row_types::{AgentLogRow, AgentRow, InteractiveMessageRow};
use super::{clamp_limit, AgentPatch, NewAgent, NewAgentLog, NewInteractiveMessage};
use crate::{Database, DbResult};

const AGENT_COLUMNS: &str = "id, session_id, agent_type, name, sdk_session_id, model, \
     model_alias, system_prompt, working_dir, status, checkpoint_id, task_group_id, \
     input_tokens, output_tokens, cost, error_message, allowed_tools, metadata, \
     created_at, updated_at, started_at, completed_at";

const LOG_COLUMNS: &str = "id, agent_id, session_id, sdk_session_id, event_category, \
     event_type, content, payload, summary, tool_name, tool_input, tool_output, \
     entry_index, checkpoint_id, timestamp, duration_ms";

impl Database {
    /// Record a new agent invocation. Returns `None` if the session id does
    /// not resolve (an agent cannot exist without its session).
    pub async fn create_agent(&self, data: NewAgent) -> DbResult<Option<Agent>> {
        if self.get_session(&data.session_id).await?.is_none() {
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let allowed_tools =
            serde_json::to_string(&data.allowed_tools).unwrap_or_else(|_| "[]".to_string());
        let metadata =
            serde_json::to_string(&data.metadata).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            INSERT INTO agents (
                id, session_id, agent_type, name, model, model_alias,
                system_prompt, working_dir, checkpoint_id, task_group_id,
                allowed_tools, metadata, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            "#,
        )
        .bind(&id)
        .bind(&data.session_id)
        .bind(data.agent_type.as_str())
        .bind(&data.name)
        .bind(&data.model)
        .bind(&data.model_alias)
        .bind(&data.system_prompt)
        .bind(&data.working_dir)
        .bind(data.checkpoint_id)
        .bind(&data.task_group_id)
        .bind(&allowed_tools)
        .bind(&metadata)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_agent(&id).await
    }

    /// Get an agent by id.
    pub async fn get_agent(&self, id: &str) -> DbResult<Option<Agent>> {
        let row: Option<AgentRow> = sqlx::query_as(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(AgentRow::into_agent))
    }

    /// List agents for a session in chronological execution order.
    pub async fn list_agents_for_session(
        &self,
        session_id: &str,
    ) -> DbResult<Vec<AgentSummary>> {
        let rows: Vec<AgentRow> = sqlx::query_as(&format!(
            "SELECT {AGENT_COLUMNS} FROM agents WHERE session_id = ?1 ORDER BY created_at ASC"
        ))
        .bind(session_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let agent = row.into_agent();
                AgentSummary {
                    id: agent.id,
                    agent_type: agent.agent_type,
                    name: agent.name,
                    model_alias: agent.model_alias,
                    status: agent.status,
                    checkpoint_id: agent.checkpoint_id,
                    input_tokens: agent.input_tokens,
                    output_tokens: agent.output_tokens,
                    cost: agent.cost,
                    started_at: agent.started_at,
                    completed_at: agent.completed_at,
                }
            })
            .collect())
    }

    /// Apply a partial update as counters accrue and status transitions.
    pub async fn update_agent(&self, id: &str, patch: AgentPatch) -> DbResult<Option<Agent>> {
        let Some(mut updated) = self.get_agent(id).await? else {
            return Ok(None);
        };

        if let Some(sdk_session_id) = patch.sdk_session_id {
            updated.sdk_session_id = Some(sdk_session_id);
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(input_tokens) = patch.input_tokens {
            updated.input_tokens = input_tokens;
        }
        if let Some(output_tokens) = patch.output_tokens {
            updated.output_tokens = output_tokens;
        }
        if let Some(cost) = patch.cost {
            updated.cost = cost;
        }
        if let Some(error_message) = patch.error_message {
            updated.error_message = Some(error_message);
        }
        if let Some(started_at) = patch.started_at {
            updated.started_at = Some(started_at);
        }
        if let Some(completed_at) = patch.completed_at {
            updated.completed_at = Some(completed_at);
        }
        updated.updated_at = Utc::now().timestamp();

        sqlx::query(
            r#"
            UPDATE agents SET
                sdk_session_id = ?2, status = ?3, input_tokens = ?4, output_tokens = ?5,
                cost = ?6, error_message = ?7, started_at = ?8, completed_at = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.sdk_session_id)
        .bind(updated.status.as_str())
        .bind(updated.input_tokens)
        .bind(updated.output_tokens)
        .bind(updated.cost)
        .bind(&updated.error_message)
        .bind(updated.started_at)
        .bind(updated.completed_at)
        .bind(updated.updated_at)
        .execute(self.pool())
        .await?;

        Ok(Some(updated))
    }

    /// Append a log entry for an agent. The denormalized `session_id` is
    /// read from the agent row, never from the caller; `entry_index`
    /// continues the agent's sequence when unset.
    ///
    /// Returns `None` if the agent does not exist.
    pub async fn append_agent_log(&self, data: NewAgentLog) -> DbResult<Option<AgentLog>> {
        let Some(agent) = self.get_agent(&data.agent_id).await? else {
            return Ok(None);
        };

        let entry_index = match data.entry_index {
            Some(index) => index,
            None => {
                let (max_index,): (i64,) = sqlx::query_as(
                    "SELECT COALESCE(MAX(entry_index), -1) FROM agent_logs WHERE agent_id = ?1",
                )
                .bind(&data.agent_id)
                .fetch_one(self.pool())
                .await?;
                max_index + 1
            }
        };

        let id = Uuid::new_v4().to_string();
        let timestamp = data.timestamp.unwrap_or_else(|| Utc::now().timestamp());
        let payload =
            serde_json::to_string(&data.payload).unwrap_or_else(|_| "{}".to_string());
        let tool_input = data
            .tool_input
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok());

        sqlx::query(
            r#"
            INSERT INTO agent_logs (
                id, agent_id, session_id, sdk_session_id, event_category, event_type,
                content, payload, summary, tool_name, tool_input, tool_output,
                entry_index, checkpoint_id, timestamp, duration_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&id)
        .bind(&data.agent_id)
        .bind(&agent.session_id)
        .bind(&data.sdk_session_id)
        .bind(data.event_category.as_str())
        .bind(&data.event_type)
        .bind(&data.content)
        .bind(&payload)
        .bind(&data.summary)
        .bind(&data.tool_name)
        .bind(&tool_input)
        .bind(&data.tool_output)
        .bind(entry_index)
        .bind(data.checkpoint_id)
        .bind(timestamp)
        .bind(data.duration_ms)
        .execute(self.pool())
        .await?;

        let row: AgentLogRow = sqlx::query_as(&format!(
            "SELECT {LOG_COLUMNS} FROM agent_logs WHERE id = ?1"
        ))
        .bind(&id)
        .fetch_one(self.pool())
        .await?;
        Ok(Some(row.into_agent_log()))
    }

    /// List log summaries for an agent in timeline order, optionally
    /// filtered by category and/or event type.
    pub async fn list_logs_for_agent(
        &self,
        agent_id: &str,
        event_category: Option<&str>,
        event_type: Option<&str>,
        limit: Option<i64>,
        offset: i64,
    ) -> DbResult<Vec<AgentLogSummary>> {
        let limit = clamp_limit(limit);
        let offset = offset.max(0);

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {LOG_COLUMNS} FROM agent_logs WHERE agent_id = "
        ));
        builder.push_bind(agent_id);
        if let Some(category) = event_category {
            builder.push(" AND event_category = ").push_bind(category);
        }
        if let Some(event_type) = event_type {
            builder.push(" AND event_type = ").push_bind(event_type);
        }
        builder
            .push(" ORDER BY timestamp ASC, entry_index ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<AgentLogRow> = builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let log = row.into_agent_log();
                AgentLogSummary {
                    id: log.id,
                    agent_id: log.agent_id,
                    session_id: log.session_id,
                    event_category: log.event_category,
                    event_type: log.event_type,
                    tool_name: log.tool_name,
                    content: log.content,
                    summary: log.summary,
                    timestamp: log.timestamp,
                    duration_ms: log.duration_ms,
                }
            })
            .collect())
    }

    /// Fetch a single log with its full payload, verifying it belongs to the
    /// stated agent so an id guessed from another agent's timeline resolves
    /// to nothing.
    pub async fn get_log_for_agent(
        &self,
        agent_id: &str,
        log_id: &str,
    ) -> DbResult<Option<AgentLog>> {
        let row: Option<AgentLogRow> = sqlx::query_as(&format!(
            "SELECT {LOG_COLUMNS} FROM agent_logs WHERE id = ?1 AND agent_id = ?2"
        ))
        .bind(log_id)
        .bind(agent_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(AgentLogRow::into_agent_log))
    }

    /// Persist an interactive chat block. Session id derived from the agent,
    /// as with logs. Returns `None` if the agent does not exist.
    pub async fn create_interactive_message(
        &self,
        data: NewInteractiveMessage,
    ) -> DbResult<Option<InteractiveMessage>> {
        let Some(agent) = self.get_agent(&data.agent_id).await? else {
            return Ok(None);
        };

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let payload =
            serde_json::to_string(&data.payload).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            INSERT INTO interactive_messages (
                id, session_id, agent_id, role, block_type, content,
                payload, sdk_session_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&agent.session_id)
        .bind(&data.agent_id)
        .bind(&data.role)
        .bind(&data.block_type)
        .bind(&data.content)
        .bind(&payload)
        .bind(&data.sdk_session_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        let row: InteractiveMessageRow = sqlx::query_as(
            "SELECT id, session_id, agent_id, role, block_type, content, payload, \
             sdk_session_id, created_at FROM interactive_messages WHERE id = ?1",
        )
        .bind(&id)
        .fetch_one(self.pool())
        .await?;
        Ok(Some(row.into_interactive_message()))
    }
}
