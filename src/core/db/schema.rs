/// Schema Module
///
/// This module holds the static table declarations the datasets are built
/// from, renders them to idempotent `CREATE TABLE IF NOT EXISTS` statements,
/// and introspects existing tables so a declaration can be checked against
/// what is already on disk.

use crate::core::{GameDbError, Result};
use rusqlite::{Connection, Row};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Declared SQLite column types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Boolean,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
            SqlType::Boolean => "BOOLEAN",
        }
    }
}

/// A non-key column declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
}

impl ColumnDef {
    pub const fn integer(name: &'static str) -> Self {
        ColumnDef {
            name,
            sql_type: SqlType::Integer,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        ColumnDef {
            name,
            sql_type: SqlType::Text,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        ColumnDef {
            name,
            sql_type: SqlType::Boolean,
        }
    }
}

/// A foreign key from one of the table's columns to a parent's primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
}

impl ForeignKeyDef {
    pub const fn new(
        column: &'static str,
        parent_table: &'static str,
        parent_column: &'static str,
    ) -> Self {
        ForeignKeyDef {
            column,
            parent_table,
            parent_column,
        }
    }
}

/// Declaration of a table with a surrogate integer key.
///
/// `columns` lists the non-key columns in declaration order; the primary
/// key always comes first in the created table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    /// Looks up a non-key column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether `name` is the primary key or a declared column
    pub fn has_column(&self, name: &str) -> bool {
        self.primary_key == name || self.column(name).is_some()
    }

    /// All column names, primary key first
    pub fn column_names(&self) -> Vec<&'static str> {
        std::iter::once(self.primary_key)
            .chain(self.columns.iter().map(|c| c.name))
            .collect()
    }

    /// Looks up the foreign key declared on `column`
    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKeyDef> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Checks identifiers, duplicate columns and foreign key columns.
    ///
    /// # Errors
    ///
    /// Returns `GameDbError::Schema` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        ensure_identifier(self.name, "table")?;
        ensure_identifier(self.primary_key, "primary key")?;
        if self.columns.is_empty() {
            return Err(GameDbError::Schema(format!(
                "table {} declares no columns",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for name in self.column_names() {
            ensure_identifier(name, "column")?;
            if !seen.insert(name) {
                return Err(GameDbError::Schema(format!(
                    "table {} declares column {} twice",
                    self.name, name
                )));
            }
        }

        for fk in self.foreign_keys {
            if self.column(fk.column).is_none() {
                return Err(GameDbError::Schema(format!(
                    "foreign key on {}.{} names an undeclared column",
                    self.name, fk.column
                )));
            }
            ensure_identifier(fk.parent_table, "parent table")?;
            ensure_identifier(fk.parent_column, "parent column")?;
        }
        Ok(())
    }

    /// Renders the `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_sql(&self) -> Result<String> {
        self.validate()?;

        let mut parts = vec![format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            self.primary_key
        )];
        parts.extend(
            self.columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.sql_type.as_sql())),
        );
        parts.extend(self.foreign_keys.iter().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.parent_table, fk.parent_column
            )
        }));

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {}(\n    {})",
            self.name,
            parts.join(",\n    ")
        ))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ensure_identifier(name: &str, kind: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(GameDbError::Schema(format!("invalid {kind} name {name:?}")))
    }
}

/// Checks that every parent table is declared before the tables that
/// reference it, so creating and seeding in slice order is well-founded.
pub fn validate_order(tables: &[&TableDef]) -> Result<()> {
    let mut declared: HashSet<&str> = HashSet::new();
    for table in tables {
        table.validate()?;
        for fk in table.foreign_keys {
            if fk.parent_table != table.name && !declared.contains(fk.parent_table) {
                return Err(GameDbError::Schema(format!(
                    "table {} references {} before it is declared",
                    table.name, fk.parent_table
                )));
            }
        }
        declared.insert(table.name);
    }
    Ok(())
}

/// Creates `table` if it does not exist and verifies the stored shape.
///
/// # Errors
///
/// Returns `GameDbError::Schema` if the declaration is invalid or an
/// existing table with the same name is missing one of the declared
/// columns.
pub fn create_table(conn: &Connection, table: &TableDef) -> Result<()> {
    let sql = table.create_sql()?;
    debug!(table = table.name, "creating table if absent");
    conn.execute_batch(&sql)?;

    let existing: HashSet<String> = get_table_columns(conn, table.name)?
        .into_iter()
        .map(|c| c.name)
        .collect();
    for name in table.column_names() {
        if !existing.contains(name) {
            return Err(GameDbError::Schema(format!(
                "existing table {} has no column {}",
                table.name, name
            )));
        }
    }
    Ok(())
}

/// Creates every table in order after checking the declaration order
pub fn create_tables(conn: &Connection, tables: &[&TableDef]) -> Result<()> {
    validate_order(tables)?;
    for table in tables {
        create_table(conn, table)?;
    }
    Ok(())
}

/// Represents a foreign key relationship found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// The table this foreign key references
    pub referenced_table: String,
    /// The column in this table that is the foreign key
    pub from_column: String,
    /// The referenced column in the foreign table
    pub to_column: String,
}

/// Represents a database column with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type name (e.g., "INTEGER", "TEXT", "BOOLEAN")
    pub type_name: String,
    /// Whether this column is part of the primary key
    pub pk: bool,
}

impl Column {
    /// Creates a Column from a PRAGMA table_info result row
    fn from_pragma_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Column {
            name: row.get(1)?,
            type_name: row.get(2)?,
            pk: row.get::<_, i64>(5)? > 0,
        })
    }
}

/// Represents a table as stored in the database file
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Every user table in a database file
#[derive(Debug, Clone)]
pub struct Schema {
    /// Map of table name to table information
    pub tables: HashMap<String, Table>,
}

impl Schema {
    /// Creates a new Schema by introspecting all tables in the database
    pub fn from_connection(conn: &Connection) -> Result<Self> {
        let mut tables = HashMap::new();
        for name in table_names(conn)? {
            let table = Table {
                columns: get_table_columns(conn, &name)?,
                foreign_keys: get_table_foreign_keys(conn, &name)?,
                name: name.clone(),
            };
            tables.insert(name, table);
        }
        Ok(Schema { tables })
    }
}

/// Names of user-defined tables, sorted
pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type='table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(names.collect::<rusqlite::Result<Vec<_>>>()?)
}

// Table names reaching these pragmas have been validated as identifiers or
// come from sqlite_master.
fn get_table_columns(conn: &Connection, table_name: &str) -> Result<Vec<Column>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table_name))?;
    let columns = stmt.query_map([], |row| Column::from_pragma_row(row))?;
    Ok(columns.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn get_table_foreign_keys(conn: &Connection, table_name: &str) -> Result<Vec<ForeignKey>> {
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list('{}')", table_name))?;
    let fk_iter = stmt.query_map([], |row| {
        Ok(ForeignKey {
            referenced_table: row.get(2)?,
            from_column: row.get(3)?,
            to_column: row.get(4)?,
        })
    })?;
    Ok(fk_iter.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    const TEAMS: TableDef = TableDef {
        name: "Teams",
        primary_key: "team_id",
        columns: &[ColumnDef::text("team_name"), ColumnDef::integer("size")],
        foreign_keys: &[],
    };

    const PLAYERS: TableDef = TableDef {
        name: "Players",
        primary_key: "player_id",
        columns: &[
            ColumnDef::integer("team_id"),
            ColumnDef::text("player_name"),
            ColumnDef::boolean("active"),
        ],
        foreign_keys: &[ForeignKeyDef::new("team_id", "Teams", "team_id")],
    };

    #[test]
    fn test_create_sql() {
        let sql = PLAYERS.create_sql().unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS Players(\n    \
             player_id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
             team_id INTEGER,\n    \
             player_name TEXT,\n    \
             active BOOLEAN,\n    \
             FOREIGN KEY (team_id) REFERENCES Teams(team_id))"
        );
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, &[&TEAMS, &PLAYERS]).unwrap();
        create_tables(&conn, &[&TEAMS, &PLAYERS]).unwrap();

        assert_eq!(table_names(&conn).unwrap(), vec!["Players", "Teams"]);
    }

    #[test]
    fn test_schema_introspection() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, &[&TEAMS, &PLAYERS]).unwrap();

        let schema = Schema::from_connection(&conn).unwrap();
        let players = schema.tables.get("Players").unwrap();

        let names: Vec<&str> = players.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["player_id", "team_id", "player_name", "active"]);
        assert!(players.columns[0].pk);
        assert_eq!(players.columns[3].type_name, "BOOLEAN");

        assert_eq!(
            players.foreign_keys,
            vec![ForeignKey {
                referenced_table: "Teams".to_string(),
                from_column: "team_id".to_string(),
                to_column: "team_id".to_string(),
            }]
        );
        assert!(schema.tables.get("Teams").unwrap().foreign_keys.is_empty());
    }

    #[test]
    fn test_incompatible_existing_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE Teams (team_id INTEGER PRIMARY KEY, team_name TEXT)")
            .unwrap();

        match create_table(&conn, &TEAMS).unwrap_err() {
            GameDbError::Schema(msg) => assert!(msg.contains("size")),
            other => panic!("Expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_declarations() {
        let bad_name = TableDef {
            name: "Teams; DROP",
            ..TEAMS
        };
        assert!(matches!(bad_name.validate(), Err(GameDbError::Schema(_))));

        let no_columns = TableDef {
            columns: &[],
            ..TEAMS
        };
        assert!(matches!(no_columns.validate(), Err(GameDbError::Schema(_))));

        let duplicate = TableDef {
            columns: const {
                &[
                    ColumnDef::text("team_name"),
                    ColumnDef::integer("team_name"),
                ]
            },
            ..TEAMS
        };
        assert!(matches!(duplicate.validate(), Err(GameDbError::Schema(_))));

        let dangling_fk = TableDef {
            foreign_keys: const { &[ForeignKeyDef::new("coach_id", "Coaches", "coach_id")] },
            ..TEAMS
        };
        assert!(matches!(dangling_fk.validate(), Err(GameDbError::Schema(_))));
    }

    #[test]
    fn test_validate_order() {
        assert!(validate_order(&[&TEAMS, &PLAYERS]).is_ok());
        match validate_order(&[&PLAYERS, &TEAMS]).unwrap_err() {
            GameDbError::Schema(msg) => assert!(msg.contains("before it is declared")),
            other => panic!("Expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_table_def_lookups() {
        assert_eq!(PLAYERS.column_names(), vec!["player_id", "team_id", "player_name", "active"]);
        assert!(PLAYERS.has_column("player_id"));
        assert!(!PLAYERS.has_column("missing"));
        assert_eq!(PLAYERS.foreign_key("team_id").unwrap().parent_table, "Teams");
        assert_eq!(SqlType::Boolean.as_sql(), "BOOLEAN");
    }
}
