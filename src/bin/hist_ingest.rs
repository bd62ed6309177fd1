use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use matchday_alerts::history::{validate_fixtures, validate_history};
use matchday_alerts::{logging, store, tables};

/// Loads history and fixture tables into the SQLite store used by `matchday_alerts`.
#[derive(Parser, Debug)]
#[command(name = "hist_ingest", version, about)]
struct Args {
    /// History table to upsert.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Fixture table to upsert.
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[arg(long, env = "MATCHDAY_DB")]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    if args.history.is_none() && args.fixtures.is_none() {
        return Err(anyhow!("pass --history and/or --fixtures"));
    }

    let history = match &args.history {
        Some(path) => tables::read_history_file(path)?,
        None => Vec::new(),
    };
    let fixtures = match &args.fixtures {
        Some(path) => tables::read_fixtures_file(path)?,
        None => Vec::new(),
    };
    validate_history(&history)?;
    validate_fixtures(&fixtures)?;

    let db_path = args
        .db
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let mut conn = store::open_db(&db_path)?;
    let summary = store::import_tables(&mut conn, db_path, &history, &fixtures)?;
    info!(
        history = summary.history_upserted,
        fixtures = summary.fixtures_upserted,
        "import finished"
    );

    println!("Import complete");
    println!("DB: {}", summary.db_path.display());
    println!("History rows upserted: {}", summary.history_upserted);
    println!("Fixtures upserted: {}", summary.fixtures_upserted);
    println!("Teams stored: {}", summary.teams);
    println!(
        "Latest match: {}",
        summary.latest_match.as_deref().unwrap_or("n/a")
    );
    Ok(())
}
