/// GameDB Error Module
///
/// This module defines the error type shared by every layer of the crate.
/// Engine failures are classified on conversion so that constraint
/// violations reach callers as their own variant.
use thiserror::Error;

/// Error type for the gamedb crate.
///
/// This enum covers the failure classes the store can report:
/// - Engine errors from SQLite (I/O, locking, malformed SQL)
/// - Constraint violations (foreign keys, NOT NULL and friends)
/// - Invalid table or join declarations
/// - Configuration loading
#[derive(Error, Debug)]
pub enum GameDbError {
    /// Database-related errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// A write was rejected by a table constraint
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Table, column or join declarations that cannot be used
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for GameDbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());
                GameDbError::Constraint(detail)
            }
            other => GameDbError::Database(other),
        }
    }
}

/// Type alias for Result to use GameDbError as the error type.
pub type Result<T> = std::result::Result<T, GameDbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_error_display() {
        let db_err = GameDbError::Database(rusqlite::Error::ExecuteReturnedResults);
        assert!(db_err.to_string().contains("Database error"));

        let schema_err = GameDbError::Schema("bad column".to_string());
        assert!(schema_err.to_string().contains("Schema error"));

        let config_err = GameDbError::Config("Invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_constraint_failures_are_classified() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            CREATE TABLE parent (id INTEGER PRIMARY KEY);
            CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER,
                FOREIGN KEY (parent_id) REFERENCES parent(id));
        ",
        )
        .unwrap();

        let err: GameDbError = conn
            .execute("INSERT INTO child (parent_id) VALUES (?1)", [42])
            .unwrap_err()
            .into();
        match err {
            GameDbError::Constraint(msg) => assert!(msg.contains("FOREIGN KEY")),
            other => panic!("Expected Constraint error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_engine_errors_stay_database_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err: GameDbError = conn
            .execute("SELECT * FROM missing_table", [])
            .unwrap_err()
            .into();
        match err {
            GameDbError::Database(e) => assert!(e.to_string().contains("no such table")),
            other => panic!("Expected Database error, got {other:?}"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GameDbError = io_err.into();
        assert!(matches!(err, GameDbError::Io(_)));
    }
}
