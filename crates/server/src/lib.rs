// crates/server/src/lib.rs
//! Sessionboard server library.
//!
//! Axum-based HTTP server for the sessionboard tracker. Serves a REST API
//! over the project/session/agent database, plus the filesystem sync and
//! onboarding flows.

pub mod error;
pub mod routes;
pub mod state;

pub use error::*;
pub use routes::api_routes;
pub use state::AppState;

use axum::Router;
use sessionboard_db::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (health, projects, sessions, agents)
/// - CORS for development (allows any origin)
/// - Request tracing
pub fn create_app(db: Database) -> Router {
    let state = AppState::new(db);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = Database::new_in_memory().await.expect("in-memory DB");
        create_app(db)
    }

    /// Helper to make a GET request to the app.
    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_app().await;
        let (status, body) = get(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert!(json["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn test_list_endpoints_return_empty_arrays() {
        // List endpoints never error on empty results
        for uri in ["/api/projects", "/api/sessions"] {
            let app = test_app().await;
            let (status, body) = get(app, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json, serde_json::json!([]), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_404_for_unknown_route() {
        let app = test_app().await;
        let (status, _) = get(app, "/api/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_404_for_non_api_path() {
        let app = test_app().await;
        let (status, _) = get(app, "/health").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response.headers().get("access-control-allow-origin");
        assert!(allow_origin.is_some());
        assert_eq!(allow_origin.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_multiple_requests() {
        let app = test_app().await;
        let (status1, _) = get(app.clone(), "/api/health").await;
        assert_eq!(status1, StatusCode::OK);
        let (status2, _) = get(app, "/api/health").await;
        assert_eq!(status2, StatusCode::OK);
    }
}
