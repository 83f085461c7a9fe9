/// Query Execution Module
///
/// This module executes parameterized statements and turns result rows into
/// `Record`s: ordered lists of named fields that callers can inspect,
/// serialize or render.

use crate::core::Result;
use rusqlite::{types::ValueRef, Connection, Params};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A single SQLite value as read from a result row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(t) => write_quoted(f, t),
            Value::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
        }
    }
}

/// A named column value within a `Record`
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// One result row: fields in the order the statement projected them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Creates a record from `(name, value)` pairs, keeping their order
    pub fn new<I, N, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        Record {
            fields: fields
                .into_iter()
                .map(|(name, value)| Field {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Fields in projection order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column names in projection order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Values in projection order
    pub fn values(&self) -> Vec<&Value> {
        self.fields.iter().map(|f| &f.value).collect()
    }

    /// Looks up a value by column label
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Renders the record as a tuple of its values, e.g. `(1, 'Gearbox', 300)`
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field.value)?;
        }
        write!(f, ")")
    }
}

// Serialized as an object whose keys keep projection order
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

/// Runs a query and collects every row as a `Record`.
///
/// Field names come from the statement's column labels, so `SELECT a AS b`
/// yields a field called `b`.
///
/// # Errors
///
/// Returns `GameDbError::Database` if the statement cannot be prepared or
/// a row cannot be read.
pub fn fetch_records<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Record>> {
    debug!(sql, "fetching records");
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let rows = stmt.query_map(params, |row| {
        let mut fields = Vec::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            fields.push(Field {
                name: name.clone(),
                value: Value::from(row.get_ref(i)?),
            });
        }
        Ok(Record { fields })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Executes a single statement and returns the number of rows it changed
pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<usize> {
    debug!(sql, "executing statement");
    Ok(conn.execute(sql, params)?)
}

/// Quotes text so the tuple stays unambiguous: single quotes unless the
/// text holds a single quote and no double quote, escaping the delimiter
/// and backslashes.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    f.write_str(&out)
}
