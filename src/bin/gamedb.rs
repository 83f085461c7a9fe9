use clap::Parser;
use gamedb::config::{self, Config};
use gamedb::core::db::Database;
use gamedb::core::Result;
use gamedb::datasets::Dataset;
use gamedb::demo::{self, DemoOptions, SeedPolicy};
use gamedb::report::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Creates a sample dataset's tables, optionally seeds them, and prints
/// every table and view.
#[derive(Debug, Parser)]
#[command(name = "gamedb", version, about)]
struct Cli {
    /// Configuration file; defaults to the per-user config when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset to operate on
    #[arg(short, long, value_enum)]
    dataset: Option<Dataset>,

    /// Database file; defaults to the dataset's own file name
    #[arg(long)]
    db: Option<PathBuf>,

    /// When to insert the dataset's sample rows
    #[arg(long, value_enum)]
    seed: Option<SeedPolicy>,

    /// Root key used for the denormalizing views
    #[arg(long)]
    view_id: Option<i64>,

    /// Report output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Do not enforce foreign keys on the connection
    #[arg(long)]
    no_foreign_keys: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "demo failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default_config()?,
    };
    let Config {
        database,
        demo: demo_config,
        output,
    } = config;

    let dataset = cli.dataset.or(demo_config.dataset).unwrap_or(Dataset::Games);
    let path = cli
        .db
        .or(database.path.clone())
        .unwrap_or_else(|| PathBuf::from(dataset.default_file()));

    let mut options = database.connection_options();
    if cli.no_foreign_keys {
        options.foreign_keys = false;
    }

    let demo_options = DemoOptions {
        seed: cli.seed.or(demo_config.seed).unwrap_or_default(),
        view_id: cli.view_id.or(demo_config.view_id),
    };
    let format = cli.format.or(output.format).unwrap_or_default();

    info!(%dataset, path = %path.display(), "starting demo");
    let db = Database::new(path).with_options(options);
    let report = demo::run(&db, dataset, &demo_options)?;
    report.render(format)
}
