//! SQLite store for users, lists and tasks
//!
//! ## Tables
//!
//! - `users` - the single deployment user (PIN digest, display name)
//! - `lists` - lists owned by a user, with an optional share token
//! - `tasks` - tasks belonging to a list, with lifecycle status
//! - `task_recurrence` - one optional recurrence rule per task
//!
//! Foreign keys cascade: deleting a list removes its tasks and their
//! recurrence rows, purging a task removes its recurrence row.

pub mod lists;
pub mod schema;
pub mod tasks;
pub mod users;

use std::path::Path;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::types::BoggaError;

/// SQLite database behind the API
pub struct TaskDb {
    conn: Mutex<Connection>,
}

impl TaskDb {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self, BoggaError> {
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| BoggaError::Database(format!("Failed to open SQLite: {}", e)))?;

        // WAL for concurrent readers; foreign keys are off by default in SQLite
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )
        .map_err(|e| BoggaError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing and throwaway runs)
    pub fn open_in_memory() -> Result<Self, BoggaError> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory().map_err(|e| {
            BoggaError::Database(format!("Failed to open in-memory SQLite: {}", e))
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| BoggaError::Database(format!("Failed to set PRAGMA: {}", e)))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, BoggaError> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a read against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, BoggaError>
    where
        F: FnOnce(&Connection) -> Result<T, BoggaError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BoggaError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a write operation with exclusive access (for transactions)
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, BoggaError>
    where
        F: FnOnce(&mut Connection) -> Result<T, BoggaError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| BoggaError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}

/// Fresh row id
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Creation timestamp; RFC 3339 with fixed width so it sorts as text
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Re-exports
pub use lists::{ListRow, ListSummary, SharedListView};
pub use tasks::{TaskRow, TaskView};
pub use users::UserRow;
