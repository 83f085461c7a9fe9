/// Database Module
///
/// This module provides the storage layer for gamedb, organized into
/// focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): database handles and transaction scopes
/// - **Schema Definitions** (`schema.rs`): table declarations, DDL and introspection
/// - **Query Execution** (`query.rs`): statement execution and structured rows
/// - **Record Operations** (`crud.rs`): create, list, update and delete per entity
/// - **Join Queries** (`join.rs`): denormalizing views across foreign keys
///
/// ## Error Handling
///
/// All operations return the crate-wide `GameDbError`, with constraint
/// failures reported as `GameDbError::Constraint`.
pub mod connection;
pub mod crud;
pub mod join;
pub mod query;
pub mod schema;

pub use connection::*;
pub use crud::*;
pub use join::*;
pub use query::*;
pub use schema::*;
