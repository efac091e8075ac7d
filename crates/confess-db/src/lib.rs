pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

/// Failures the store can produce. "Not found" is not an error: lookups
/// return `Option` and deletes return `bool`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input failed validation; nothing was persisted.
    #[error("{0}")]
    Validation(String),
    /// Underlying SQLite failure.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// The connection mutex was poisoned by a panicking thread.
    #[error("store connection poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The moderation store: a single SQLite connection guarded by a mutex.
/// Every read and write serializes on that mutex, which is what makes the
/// multi-statement operations in `queries` atomic with respect to each
/// other.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh in-memory store, used by the test suites.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    /// Same lock as `with_conn`; a separate name so call sites show which
    /// operations mutate the store.
    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }
}
