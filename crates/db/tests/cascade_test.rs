//! Integration tests for session cascade delete and the project delete guard.

use sessionboard_core::{AgentType, EventCategory};
use sessionboard_db::{
    Database, NewAgent, NewAgentLog, NewInteractiveMessage, NewProject, NewSession, ProjectDelete,
};

async fn test_db() -> Database {
    Database::new_in_memory().await.expect("in-memory DB")
}

/// Build a session with `agent_count` agents, `logs_per_agent` logs each,
/// and one interactive message per agent.
async fn seed_session(
    db: &Database,
    slug: &str,
    agent_count: usize,
    logs_per_agent: usize,
) -> String {
    let session = db
        .create_session(NewSession::new(slug, "/tmp/project"))
        .await
        .unwrap();

    for i in 0..agent_count {
        let agent = db
            .create_agent(NewAgent {
                name: Some(format!("agent-{i}")),
                ..NewAgent::new(&session.id, AgentType::Build, "claude-sonnet-4-5")
            })
            .await
            .unwrap()
            .unwrap();

        for j in 0..logs_per_agent {
            db.append_agent_log(NewAgentLog {
                timestamp: Some(1_700_000_000 + j as i64),
                ..NewAgentLog::new(&agent.id, EventCategory::Hook, "PreToolUse")
            })
            .await
            .unwrap()
            .unwrap();
        }

        db.create_interactive_message(NewInteractiveMessage {
            agent_id: agent.id.clone(),
            role: "assistant".into(),
            block_type: Some("text".into()),
            content: Some("block".into()),
            payload: serde_json::json!({}),
            sdk_session_id: None,
        })
        .await
        .unwrap()
        .unwrap();
    }

    session.id
}

async fn count(db: &Database, table: &str, session_id: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM {table} WHERE session_id = ?1"
    ))
    .bind(session_id)
    .fetch_one(db.pool())
    .await
    .unwrap();
    n
}

#[tokio::test]
async fn test_cascade_removes_exactly_the_dependents() {
    let db = test_db().await;
    let session_id = seed_session(&db, "cascade-target", 2, 5).await;
    let other_id = seed_session(&db, "untouched-sibling", 1, 3).await;

    let result = db
        .delete_session_cascade(&session_id)
        .await
        .unwrap()
        .expect("session exists");

    assert_eq!(result.agents_deleted, 2);
    assert_eq!(result.logs_deleted, 10);
    assert_eq!(result.messages_deleted, 2);
    assert_eq!(result.session_slug, "cascade-target");

    // No orphans remain for the deleted session
    assert_eq!(count(&db, "agents", &session_id).await, 0);
    assert_eq!(count(&db, "agent_logs", &session_id).await, 0);
    assert_eq!(count(&db, "interactive_messages", &session_id).await, 0);
    assert!(db.get_session(&session_id).await.unwrap().is_none());
    assert!(db
        .list_agents_for_session(&session_id)
        .await
        .unwrap()
        .is_empty());

    // The sibling session is untouched
    assert_eq!(count(&db, "agents", &other_id).await, 1);
    assert_eq!(count(&db, "agent_logs", &other_id).await, 3);
    assert_eq!(count(&db, "interactive_messages", &other_id).await, 1);
}

#[tokio::test]
async fn test_cascade_order_never_violates_foreign_keys() {
    // Foreign keys are enforced on every connection, so a wrong delete order
    // would surface as an FK violation here regardless of dependent count.
    let db = test_db().await;
    for (slug, agents, logs) in [("deep-1", 1, 1), ("deep-2", 3, 7), ("deep-3", 5, 0)] {
        let session_id = seed_session(&db, slug, agents, logs).await;
        let result = db.delete_session_cascade(&session_id).await.unwrap();
        assert!(result.is_some(), "cascade for {slug} should succeed");
    }
}

#[tokio::test]
async fn test_cascade_on_empty_session() {
    let db = test_db().await;
    let session_id = seed_session(&db, "no-dependents", 0, 0).await;

    let result = db
        .delete_session_cascade(&session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.agents_deleted, 0);
    assert_eq!(result.logs_deleted, 0);
    assert_eq!(result.messages_deleted, 0);
}

#[tokio::test]
async fn test_project_delete_blocked_while_sessions_reference_it() {
    let db = test_db().await;
    let project = db
        .create_project(NewProject::new("Guarded", "guarded", "/tmp/guarded"))
        .await
        .unwrap();
    let session = db
        .create_session(NewSession {
            project_id: Some(project.id.clone()),
            ..NewSession::new("guarded-session", "/tmp/guarded")
        })
        .await
        .unwrap();

    assert_eq!(
        db.delete_project(&project.id).await.unwrap(),
        ProjectDelete::HasSessions(1)
    );

    // Project and session both unchanged after the refused delete
    assert!(db.get_project(&project.id).await.unwrap().is_some());
    assert!(db.get_session(&session.id).await.unwrap().is_some());

    // Removing the session unblocks the project delete
    db.delete_session_cascade(&session.id).await.unwrap().unwrap();
    assert_eq!(
        db.delete_project(&project.id).await.unwrap(),
        ProjectDelete::Deleted
    );
}
