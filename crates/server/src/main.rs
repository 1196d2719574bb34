// crates/server/src/main.rs
//! Sessionboard server binary.

use std::net::SocketAddr;

use anyhow::Result;
use sessionboard_db::Database;
use sessionboard_server::create_app;
use tracing_subscriber::EnvFilter;

/// Default port for the server.
const DEFAULT_PORT: u16 = 47630;

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("SESSIONBOARD_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db = match std::env::var("SESSIONBOARD_DB") {
        Ok(path) => Database::new(std::path::Path::new(&path)).await?,
        Err(_) => Database::open_default().await?,
    };

    let app = create_app(db);
    let addr = SocketAddr::from(([127, 0, 0, 1], get_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("sessionboard listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port_without_env() {
        // Only meaningful when the vars are unset in the test environment
        if std::env::var("SESSIONBOARD_PORT").is_err() && std::env::var("PORT").is_err() {
            assert_eq!(get_port(), DEFAULT_PORT);
        }
    }
}
