//! Shared request state.
//!
//! # Invariants
//! - Storage work never runs on the async executor; every call goes through
//!   [`AppState::run`] on the blocking pool.
//! - `now` is read once per request from the configured clock.

use crate::error::ApiError;
use choreboard_core::Clock;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            clock,
        }
    }

    /// Runs `work` against the connection on the blocking pool.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, NaiveDateTime) -> Result<T, ApiError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let now = self.clock.now();
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database mutex poisoned".to_string()))?;
            work(&conn, now)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }
}
