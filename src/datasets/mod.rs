//! The sample datasets. Each one owns its table declarations, entity and
//! view types, fixed seed rows and the set of reads the demo runs.

pub mod games;
pub mod library;
pub mod shop;
pub mod staff;

use crate::core::db::{crud, TableDef};
use crate::core::Result;
use crate::report::Section;
use rusqlite::Connection;
use serde::Deserialize;
use std::fmt;

/// Which dataset to operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// Studios, publishers, games, wallets, users and orders
    Games,
    /// Customers, products and orders
    Shop,
    /// Companies and their employees
    Staff,
    /// Books
    Library,
}

impl Dataset {
    /// Tables in creation order
    pub fn tables(&self) -> &'static [&'static TableDef] {
        match self {
            Dataset::Games => games::TABLES,
            Dataset::Shop => shop::TABLES,
            Dataset::Staff => staff::TABLES,
            Dataset::Library => library::TABLES,
        }
    }

    /// Database file used when none is configured
    pub fn default_file(&self) -> &'static str {
        match self {
            Dataset::Games => "Db.db",
            Dataset::Shop => "db2",
            Dataset::Staff | Dataset::Library => "db",
        }
    }

    /// Key passed to the denormalizing views when none is configured
    pub fn default_view_id(&self) -> i64 {
        match self {
            Dataset::Games => 4,
            Dataset::Shop | Dataset::Staff => 3,
            Dataset::Library => 1,
        }
    }

    /// Inserts the dataset's fixed sample rows
    pub fn seed(&self, conn: &Connection) -> Result<()> {
        match self {
            Dataset::Games => games::seed(conn),
            Dataset::Shop => shop::seed(conn),
            Dataset::Staff => staff::seed(conn),
            Dataset::Library => library::seed(conn),
        }
    }

    /// Whether every table of the dataset is empty
    pub fn is_empty(&self, conn: &Connection) -> Result<bool> {
        for table in self.tables() {
            if crud::count(conn, table)? > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs every listing and view once
    pub fn showcase(&self, conn: &Connection, view_id: i64) -> Result<Vec<Section>> {
        match self {
            Dataset::Games => games::showcase(conn, view_id),
            Dataset::Shop => shop::showcase(conn, view_id),
            Dataset::Staff => staff::showcase(conn, view_id),
            Dataset::Library => library::showcase(conn),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Games => "games",
            Dataset::Shop => "shop",
            Dataset::Staff => "staff",
            Dataset::Library => "library",
        };
        f.write_str(name)
    }
}
