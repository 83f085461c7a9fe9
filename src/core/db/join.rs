/// Join Query Module
///
/// Denormalizing queries start from a root table, follow declared foreign
/// keys one step at a time and project labeled columns from every table
/// they reach. Rows are read back by label, so the projection list is the
/// only place column order is decided.

use crate::core::db::connection::Database;
use crate::core::db::query::{self, Record};
use crate::core::db::schema::TableDef;
use crate::core::{GameDbError, Result};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use tracing::debug;

/// One hop along a foreign key: `from.via` references `to`'s key
#[derive(Debug, Clone, Copy)]
pub struct JoinStep {
    pub from: &'static TableDef,
    pub via: &'static str,
    pub to: &'static TableDef,
}

/// A column pulled into the flattened row, labeled with its own name
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub table: &'static str,
    pub column: &'static str,
}

impl Projection {
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Projection { table, column }
    }
}

/// A denormalizing query rooted at one table and filtered by its key
#[derive(Debug, Clone, Copy)]
pub struct JoinQuery {
    pub root: &'static TableDef,
    pub joins: &'static [JoinStep],
    pub projection: &'static [Projection],
}

impl JoinQuery {
    fn joined(&self) -> impl Iterator<Item = &'static TableDef> + '_ {
        std::iter::once(self.root).chain(self.joins.iter().map(|step| step.to))
    }

    /// Renders the SELECT statement, checking the join graph and the
    /// projection against the table declarations.
    ///
    /// # Errors
    ///
    /// Returns `GameDbError::Schema` when a step does not follow a declared
    /// foreign key, starts from a table that is not joined yet, or when a
    /// projected column is unknown or its label repeats.
    pub fn sql(&self) -> Result<String> {
        self.root.validate()?;

        let mut joined = vec![self.root.name];
        let mut clauses = Vec::with_capacity(self.joins.len());
        for step in self.joins {
            if !joined.contains(&step.from.name) {
                return Err(GameDbError::Schema(format!(
                    "join from {} before it is part of the query",
                    step.from.name
                )));
            }
            if joined.contains(&step.to.name) {
                return Err(GameDbError::Schema(format!("{} is joined twice", step.to.name)));
            }
            let fk = step
                .from
                .foreign_key(step.via)
                .filter(|fk| fk.parent_table == step.to.name)
                .ok_or_else(|| {
                    GameDbError::Schema(format!(
                        "{}.{} is not a foreign key to {}",
                        step.from.name, step.via, step.to.name
                    ))
                })?;
            clauses.push(format!(
                "JOIN {to} ON {from}.{via} = {to}.{parent}",
                to = step.to.name,
                from = step.from.name,
                via = step.via,
                parent = fk.parent_column
            ));
            joined.push(step.to.name);
        }

        if self.projection.is_empty() {
            return Err(GameDbError::Schema(format!(
                "query on {} projects no columns",
                self.root.name
            )));
        }
        let mut labels = HashSet::new();
        let mut columns = Vec::with_capacity(self.projection.len());
        for p in self.projection {
            let table = self
                .joined()
                .find(|t| t.name == p.table)
                .ok_or_else(|| GameDbError::Schema(format!("{} is not joined", p.table)))?;
            if !table.has_column(p.column) {
                return Err(GameDbError::Schema(format!(
                    "{} has no column {}",
                    p.table, p.column
                )));
            }
            if !labels.insert(p.column) {
                return Err(GameDbError::Schema(format!(
                    "column label {} is projected twice",
                    p.column
                )));
            }
            columns.push(format!("{}.{} AS {}", p.table, p.column, p.column));
        }

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), self.root.name);
        for clause in clauses {
            sql.push('\n');
            sql.push_str(&clause);
        }
        sql.push_str(&format!(
            "\nWHERE {}.{} = ?1",
            self.root.name, self.root.primary_key
        ));
        Ok(sql)
    }

    /// Column labels in projection order
    pub fn labels(&self) -> Vec<&'static str> {
        self.projection.iter().map(|p| p.column).collect()
    }
}

/// A flattened row produced by a `JoinQuery`
pub trait View: Sized {
    const QUERY: &'static JoinQuery;

    /// Builds the view from a row, reading columns by label
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Runs a view for the root row with key `id`.
///
/// Inner joins throughout: a missing key or a missing related row yields
/// an empty result, never an error.
pub fn view<V: View>(conn: &Connection, id: i64) -> Result<Vec<V>> {
    let sql = V::QUERY.sql()?;
    debug!(root = V::QUERY.root.name, id, "running view");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![id], |row| V::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Runs `query` for the root row with key `id` and returns records
pub fn view_records(conn: &Connection, join: &JoinQuery, id: i64) -> Result<Vec<Record>> {
    let sql = join.sql()?;
    query::fetch_records(conn, &sql, params![id])
}

impl Database {
    pub fn view<V: View>(&self, id: i64) -> Result<Vec<V>> {
        self.scope(|conn| view::<V>(conn, id))
    }

    pub fn view_records(&self, join: &JoinQuery, id: i64) -> Result<Vec<Record>> {
        self.scope(|conn| view_records(conn, join, id))
    }
}
