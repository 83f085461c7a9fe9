/// Connection Management Module
///
/// This module provides the database handle and the transaction scope every
/// operation runs in. A `Scope` owns one connection and one transaction:
/// committing is explicit, and a scope that is dropped without committing
/// (early return, error, panic) rolls back before the connection closes.

use crate::core::Result;
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Represents the lifecycle of the transaction held by a `Scope`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction in progress
    Active,
    /// Transaction committed
    Committed,
    /// Transaction rolled back
    RolledBack,
}

/// Per-connection settings applied when a scope is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Whether `PRAGMA foreign_keys` is switched on for the connection
    pub foreign_keys: bool,
    /// How long to wait on a locked database file before failing
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        ConnectionOptions {
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle to a database file.
///
/// Holding a `Database` does not keep a connection open; every operation
/// opens its own scope against the file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    options: ConnectionOptions,
}

impl Database {
    /// Creates a handle for the database file at `path` with default options
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Database {
            path: path.into(),
            options: ConnectionOptions::default(),
        }
    }

    /// Replaces the connection options used by future scopes
    pub fn with_options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection options applied to each scope
    pub fn options(&self) -> ConnectionOptions {
        self.options
    }

    /// Opens a connection and begins a transaction on it.
    ///
    /// # Errors
    ///
    /// Returns `GameDbError::Database` if the file cannot be opened or the
    /// connection cannot be configured.
    pub fn open_scope(&self) -> Result<Scope> {
        debug!(path = %self.path.display(), "opening connection scope");
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.options.busy_timeout)?;

        // Must be set outside of a transaction, SQLite ignores it otherwise
        let pragma = if self.options.foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        conn.execute_batch(pragma)?;
        conn.execute_batch("BEGIN")?;

        Ok(Scope {
            conn,
            state: TransactionState::Active,
        })
    }

    /// Runs `f` inside a fresh scope.
    ///
    /// The transaction is committed when `f` returns `Ok` and rolled back
    /// when it returns `Err` or panics. The connection is closed on every
    /// path.
    pub fn scope<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Scope) -> Result<T>,
    {
        let scope = self.open_scope()?;
        match f(&scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback() {
                    warn!(error = %rollback_err, "rollback failed after error");
                }
                Err(err)
            }
        }
    }
}

/// A connection with an open transaction.
///
/// Dereferences to `rusqlite::Connection` so statements can be run
/// directly against it.
#[derive(Debug)]
pub struct Scope {
    conn: Connection,
    state: TransactionState,
}

impl Scope {
    /// Current transaction state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Commits the transaction and closes the connection
    pub fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.state = TransactionState::Committed;
        debug!("connection scope committed");
        Ok(())
    }

    /// Discards the transaction and closes the connection
    pub fn rollback(mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        self.state = TransactionState::RolledBack;
        debug!("connection scope rolled back");
        Ok(())
    }
}

impl Deref for Scope {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            match self.conn.execute_batch("ROLLBACK") {
                Ok(()) => debug!("unfinished connection scope rolled back"),
                Err(e) => warn!(error = %e, "failed to roll back unfinished scope"),
            }
        }
    }
}
