//! Library dataset: a single table of books.

use crate::core::db::{crud, ColumnDef, Entity, NewEntity, TableDef};
use crate::core::Result;
use crate::report::Section;
use rusqlite::{Connection, Row, ToSql};

pub const BOOKS: TableDef = TableDef {
    name: "Books",
    primary_key: "id",
    columns: &[
        ColumnDef::text("title"),
        ColumnDef::text("author"),
        ColumnDef::integer("pages"),
    ],
    foreign_keys: &[],
};

pub const TABLES: &[&TableDef] = &[&BOOKS];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub pages: i64,
}

impl Entity for Book {
    const TABLE: &'static TableDef = &BOOKS;
    const MUTABLE_COLUMN: &'static str = "title";
    type Mutable = String;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            pages: row.get("pages")?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewBook<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub pages: i64,
}

impl NewEntity for NewBook<'_> {
    type Entity = Book;

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.title as &dyn ToSql, &self.author, &self.pages]
    }
}

pub fn seed(conn: &Connection) -> Result<()> {
    crud::insert(
        conn,
        &NewBook {
            title: "Eragon",
            author: "R.T",
            pages: 450,
        },
    )?;
    Ok(())
}

pub fn showcase(conn: &Connection) -> Result<Vec<Section>> {
    Ok(vec![Section::new("Books", crud::list_records(conn, &BOOKS)?)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::create_tables;

    #[test]
    fn test_quotes_are_bound_not_interpolated() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, TABLES).unwrap();

        let title = "Robert'); DROP TABLE Books;--";
        crud::insert(
            &conn,
            &NewBook {
                title,
                author: "O'Brien",
                pages: 1,
            },
        )
        .unwrap();

        let books = crud::list::<Book>(&conn).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, title);
        assert_eq!(books[0].author, "O'Brien");
    }
}
