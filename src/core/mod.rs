/// Core Module for GameDB
///
/// This module contains the storage layer every dataset is built on:
/// connection scopes, table declarations, record operations, join queries
/// and the shared error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{GameDbError, Result};
