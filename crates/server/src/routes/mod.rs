//! API route handlers for the sessionboard server.

pub mod agents;
pub mod health;
pub mod projects;
pub mod sessions;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET    /api/health - Health check
/// - GET    /api/projects - List projects (filter by status, paginated)
/// - POST   /api/projects - Create a project
/// - GET    /api/projects/{id} | /api/projects/slug/{slug} - Project detail
/// - PATCH  /api/projects/{id} - Partial update (shallow-merged onboarding flags)
/// - DELETE /api/projects/{id} - Delete; refused while sessions reference it
/// - GET    /api/projects/{id}/sessions - Sessions owned by a project
/// - POST   /api/projects/{id}/sync - Reconcile on-disk session folders
/// - POST   /api/projects/onboard - Validate a path and register a project
/// - POST   /api/projects/validate-path - Path validation without side effects
/// - GET    /api/sessions - List sessions (status/type/project filters)
/// - GET    /api/sessions/{id} | /api/sessions/slug/{slug} - Session detail
/// - DELETE /api/sessions/{id} - Cascade delete + best-effort directory removal
/// - GET    /api/sessions/{slug}/spec | /plan | /state - Session artifacts
/// - GET    /api/agents/{id} - Agent detail
/// - GET    /api/agents/session/{session_id} - Agents of a session
/// - GET    /api/agents/{id}/logs - Agent execution timeline (filterable)
/// - GET    /api/agents/{id}/logs/{log_id} - One log entry, full payload
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", projects::router())
        .nest("/api", sessions::router())
        .nest("/api", agents::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    pub async fn do_request(
        app: axum::Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn do_get(app: axum::Router, uri: &str) -> (StatusCode, String) {
        do_request(app, Method::GET, uri, None).await
    }

    pub async fn do_post(app: axum::Router, uri: &str) -> (StatusCode, String) {
        do_request(app, Method::POST, uri, None).await
    }

    pub async fn do_post_json(
        app: axum::Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, String) {
        do_request(app, Method::POST, uri, Some(body)).await
    }

    pub async fn do_patch_json(
        app: axum::Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, String) {
        do_request(app, Method::PATCH, uri, Some(body)).await
    }

    pub async fn do_delete(app: axum::Router, uri: &str) -> (StatusCode, String) {
        do_request(app, Method::DELETE, uri, None).await
    }

    pub fn body_json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap_or_else(|_| panic!("non-JSON body: {body}"))
    }
}
