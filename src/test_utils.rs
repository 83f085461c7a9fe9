/// # Test Utilities Module
///
/// Scratch database files for unit tests. Every fixture lives in its own
/// temporary directory, so tests can run in parallel and leave nothing
/// behind.

use crate::core::db::Database;
use crate::datasets::Dataset;
use tempfile::TempDir;

/// A database file inside a temporary directory that is removed on drop
pub struct TempDatabase {
    pub db: Database,
    _dir: TempDir,
}

impl TempDatabase {
    /// Creates a fresh, empty database file
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::new(dir.path().join("test.db"));
        TempDatabase { db, _dir: dir }
    }

    /// Creates a database with `dataset`'s tables and sample rows
    pub fn seeded(dataset: Dataset) -> Self {
        let temp = Self::new();
        temp.db
            .create_tables(dataset.tables())
            .expect("create dataset tables");
        temp.db
            .scope(|conn| dataset.seed(conn))
            .expect("seed dataset");
        temp
    }
}
