// crates/server/src/state.rs
//! Application state for the Axum server.

use sessionboard_db::Database;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Database handle for project/session/agent queries.
    pub db: Database,
    /// Project ids with a sync pass currently in flight. Guards the
    /// at-most-one-sync-per-project invariant; see [`AppState::try_begin_sync`].
    sync_in_flight: Mutex<HashSet<String>>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(db: Database) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            sync_in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Claim the single sync slot for a project. Returns `None` when a sync
    /// for that project is already running; the returned guard releases the
    /// slot on drop, including on error and cancellation paths.
    ///
    /// In-memory, so the invariant holds per server instance. This is a
    /// single-instance local service; a multi-instance deployment would move
    /// the claim into the database.
    pub fn try_begin_sync(self: &Arc<Self>, project_id: &str) -> Option<SyncGuard> {
        let mut in_flight = self.sync_in_flight.lock().expect("sync set lock poisoned");
        if !in_flight.insert(project_id.to_string()) {
            return None;
        }
        Some(SyncGuard {
            state: Arc::clone(self),
            project_id: project_id.to_string(),
        })
    }
}

/// RAII claim on a project's sync slot.
pub struct SyncGuard {
    state: Arc<AppState>,
    project_id: String,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.state
            .sync_in_flight
            .lock()
            .expect("sync set lock poisoned")
            .remove(&self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> Arc<AppState> {
        let db = Database::new_in_memory().await.expect("in-memory DB");
        AppState::new(db)
    }

    #[tokio::test]
    async fn test_app_state_uptime() {
        let state = test_state().await;
        assert!(state.uptime_secs() < 5);
    }

    #[tokio::test]
    async fn test_sync_single_flight_per_project() {
        let state = test_state().await;

        let guard = state.try_begin_sync("project-1").expect("first claim");
        // Second claim for the same project is refused while the guard lives
        assert!(state.try_begin_sync("project-1").is_none());
        // A different project is unaffected
        let other = state.try_begin_sync("project-2");
        assert!(other.is_some());

        drop(guard);
        // Slot is free again after release
        assert!(state.try_begin_sync("project-1").is_some());
    }

    #[tokio::test]
    async fn test_sync_guard_releases_on_drop_in_error_path() {
        let state = test_state().await;
        {
            let _guard = state.try_begin_sync("p").unwrap();
            // simulate a handler bailing early with ?
        }
        assert!(state.try_begin_sync("p").is_some());
    }
}
