//! Demo driver: makes sure a dataset's tables exist, optionally seeds them,
//! and runs every read once. Nothing happens until `run` is called.

use crate::core::db::Database;
use crate::core::Result;
use crate::datasets::Dataset;
use crate::report::Report;
use serde::Deserialize;
use tracing::info;

/// When the demo inserts the dataset's sample rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SeedPolicy {
    /// Never insert sample rows
    #[default]
    Never,
    /// Insert sample rows on every run, duplicating earlier ones
    Always,
    /// Insert sample rows only when every table is empty
    IfEmpty,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoOptions {
    pub seed: SeedPolicy,
    /// Root key for the denormalizing views; the dataset default when unset
    pub view_id: Option<i64>,
}

/// Creates the dataset's tables, parents first. Safe to call repeatedly.
pub fn init(db: &Database, dataset: Dataset) -> Result<()> {
    info!(%dataset, path = %db.path().display(), "ensuring tables exist");
    db.create_tables(dataset.tables())
}

/// Seeds according to `policy` and reports whether rows were inserted.
///
/// Seeding runs in a single scope, so a failure part way leaves no sample
/// rows behind.
pub fn seed(db: &Database, dataset: Dataset, policy: SeedPolicy) -> Result<bool> {
    db.scope(|conn| {
        let should_seed = match policy {
            SeedPolicy::Never => false,
            SeedPolicy::Always => true,
            SeedPolicy::IfEmpty => dataset.is_empty(conn)?,
        };
        if should_seed {
            info!(%dataset, "inserting sample rows");
            dataset.seed(conn)?;
        }
        Ok(should_seed)
    })
}

/// Runs the whole demo and returns every section it read.
pub fn run(db: &Database, dataset: Dataset, options: &DemoOptions) -> Result<Report> {
    init(db, dataset)?;
    seed(db, dataset, options.seed)?;

    let view_id = options.view_id.unwrap_or_else(|| dataset.default_view_id());
    let sections = db.scope(|conn| dataset.showcase(conn, view_id))?;
    info!(%dataset, sections = sections.len(), "demo finished");
    Ok(Report { sections })
}
