/// Record Operations Module
///
/// Generic create, list, update and delete statements for any type that
/// implements `Entity`. The free functions run against an open connection
/// so several operations can share one scope; the `Database` methods open
/// a scope per call.

use crate::core::db::connection::Database;
use crate::core::db::query::{self, Record};
use crate::core::db::schema::TableDef;
use crate::core::{GameDbError, Result};
use rusqlite::{params, Connection, Row, ToSql};
use tracing::debug;

/// A row type backed by a declared table.
pub trait Entity: Sized {
    /// Table the entity is stored in
    const TABLE: &'static TableDef;
    /// Column rewritten by `update_matching` and `update_by_id`
    const MUTABLE_COLUMN: &'static str;
    /// Rust type of the mutable column
    type Mutable: ToSql;

    /// Surrogate key of the row
    fn id(&self) -> i64;

    /// Builds the entity from a row selected with `TABLE.column_names()`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// The non-key attributes needed to insert a new entity.
pub trait NewEntity {
    type Entity: Entity;

    /// Values for every non-key column, in declaration order
    fn values(&self) -> Vec<&dyn ToSql>;
}

fn insert_sql(table: &TableDef) -> String {
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {}({}) VALUES({})",
        table.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn select_sql(table: &TableDef) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        table.column_names().join(", "),
        table.name,
        table.primary_key
    )
}

fn mutable_column<T: Entity>() -> Result<&'static str> {
    let table = T::TABLE;
    if table.column(T::MUTABLE_COLUMN).is_none() {
        return Err(GameDbError::Schema(format!(
            "{} is not an updatable column of {}",
            T::MUTABLE_COLUMN,
            table.name
        )));
    }
    Ok(T::MUTABLE_COLUMN)
}

/// Inserts one row and returns the key SQLite assigned to it.
///
/// # Errors
///
/// Returns `GameDbError::Constraint` when a foreign key does not resolve
/// (with enforcement on), and `GameDbError::Schema` if the value count does
/// not match the table declaration.
pub fn insert<N: NewEntity>(conn: &Connection, new: &N) -> Result<i64> {
    let table = N::Entity::TABLE;
    let values = new.values();
    if values.len() != table.columns.len() {
        return Err(GameDbError::Schema(format!(
            "{} expects {} values, got {}",
            table.name,
            table.columns.len(),
            values.len()
        )));
    }

    query::execute(conn, &insert_sql(table), values.as_slice())?;
    let id = conn.last_insert_rowid();
    debug!(table = table.name, id, "inserted row");
    Ok(id)
}

/// Every row of the entity's table, ordered by key
pub fn list<T: Entity>(conn: &Connection) -> Result<Vec<T>> {
    let sql = select_sql(T::TABLE);
    debug!(sql = %sql, "listing rows");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Every row of `table` as records, columns in declaration order
pub fn list_records(conn: &Connection, table: &TableDef) -> Result<Vec<Record>> {
    table.validate()?;
    query::fetch_records(conn, &select_sql(table), [])
}

/// Rewrites the mutable column on every row where it equals `old`.
///
/// Returns the number of rows changed; zero means nothing matched.
pub fn update_matching<T: Entity>(
    conn: &Connection,
    old: &T::Mutable,
    new: &T::Mutable,
) -> Result<usize> {
    let column = mutable_column::<T>()?;
    let sql = format!(
        "UPDATE {} SET {column} = ?1 WHERE {column} = ?2",
        T::TABLE.name
    );
    query::execute(conn, &sql, params![new, old])
}

/// Rewrites the mutable column on the row with key `id`
pub fn update_by_id<T: Entity>(conn: &Connection, id: i64, new: &T::Mutable) -> Result<usize> {
    let column = mutable_column::<T>()?;
    let sql = format!(
        "UPDATE {} SET {column} = ?1 WHERE {} = ?2",
        T::TABLE.name,
        T::TABLE.primary_key
    );
    query::execute(conn, &sql, params![new, id])
}

/// Deletes the row with key `id`; a missing key deletes nothing
pub fn delete<T: Entity>(conn: &Connection, id: i64) -> Result<usize> {
    let table = T::TABLE;
    let sql = format!("DELETE FROM {} WHERE {} = ?1", table.name, table.primary_key);
    query::execute(conn, &sql, params![id])
}

/// Number of rows in `table`
pub fn count(conn: &Connection, table: &TableDef) -> Result<i64> {
    table.validate()?;
    let sql = format!("SELECT COUNT(*) FROM {}", table.name);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

impl Database {
    /// Creates the given tables (parents first) in one scope
    pub fn create_tables(&self, tables: &[&TableDef]) -> Result<()> {
        self.scope(|conn| crate::core::db::schema::create_tables(conn, tables))
    }

    pub fn insert<N: NewEntity>(&self, new: &N) -> Result<i64> {
        self.scope(|conn| insert(conn, new))
    }

    pub fn list<T: Entity>(&self) -> Result<Vec<T>> {
        self.scope(|conn| list::<T>(conn))
    }

    pub fn list_records(&self, table: &TableDef) -> Result<Vec<Record>> {
        self.scope(|conn| list_records(conn, table))
    }

    /// Bulk update by predicate: every row whose mutable column equals `old`
    pub fn update_matching<T: Entity>(
        &self,
        old: &T::Mutable,
        new: &T::Mutable,
    ) -> Result<usize> {
        self.scope(|conn| update_matching::<T>(conn, old, new))
    }

    /// Single-row update by primary key
    pub fn update_by_id<T: Entity>(&self, id: i64, new: &T::Mutable) -> Result<usize> {
        self.scope(|conn| update_by_id::<T>(conn, id, new))
    }

    pub fn delete<T: Entity>(&self, id: i64) -> Result<usize> {
        self.scope(|conn| delete::<T>(conn, id))
    }

    pub fn count(&self, table: &TableDef) -> Result<i64> {
        self.scope(|conn| count(conn, table))
    }
}
