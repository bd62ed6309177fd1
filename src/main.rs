use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;

use matchday_alerts::config::PipelineConfig;
use matchday_alerts::history::{Fixture, HistoryRecord};
use matchday_alerts::stats::Statistic;
use matchday_alerts::{logging, output, pipeline, store, tables};

/// Trains per-statistic models on team history and writes the day's alert table.
#[derive(Parser, Debug)]
#[command(name = "matchday_alerts", version, about)]
struct Args {
    /// History table (`team;date;goals;shots;shots_on_target;corners`). Falls back to the SQLite store.
    #[arg(long, env = "MATCHDAY_HISTORY")]
    history: Option<PathBuf>,

    /// Fixture table (`home_team;away_team;league;date;kickoff_time`). Falls back to the SQLite store.
    #[arg(long, env = "MATCHDAY_FIXTURES")]
    fixtures: Option<PathBuf>,

    /// SQLite store written by `hist_ingest`.
    #[arg(long, env = "MATCHDAY_DB")]
    db: Option<PathBuf>,

    /// Only fixtures on this date when reading them from the store.
    #[arg(long)]
    date: Option<String>,

    /// Semicolon-separated output table.
    #[arg(long, env = "MATCHDAY_OUT", default_value = "predictions.csv")]
    out: PathBuf,

    /// Also write the table as an .xlsx workbook.
    #[arg(long, env = "MATCHDAY_XLSX")]
    xlsx: Option<PathBuf>,

    /// JSON pipeline config; omitted fields keep their defaults.
    #[arg(long, env = "MATCHDAY_CONFIG")]
    config: Option<PathBuf>,

    /// Statistics to model, e.g. `goals,corners`; alert rules on other statistics are dropped.
    #[arg(long, value_delimiter = ',')]
    stats: Option<Vec<Statistic>>,

    /// Overrides the configured window sizes, e.g. `5,10,15`.
    #[arg(long, value_delimiter = ',')]
    windows: Option<Vec<usize>>,

    #[arg(long)]
    min_history: Option<usize>,

    #[arg(long)]
    trees: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let config = resolve_config(&args)?;
    let (history, fixtures) = load_inputs(&args)?;
    info!(
        history_rows = history.len(),
        fixtures = fixtures.len(),
        "inputs loaded"
    );

    let table = pipeline::run(&history, &fixtures, &config)?;
    for stat in &table.skipped {
        println!("Skipped {stat}: no team with enough history");
    }
    for failure in &table.failures {
        println!("Failed {failure}");
    }

    output::write_csv(&args.out, &table)?;
    println!("Predictions written to {}", args.out.display());
    if let Some(path) = &args.xlsx {
        output::write_xlsx(path, &table)?;
        println!("Workbook written to {}", path.display());
    }

    for row in &table.rows {
        let fx = &row.record.features.fixture;
        println!(
            "{} {} | {} x {} | {}",
            fx.date, fx.kickoff_time, fx.home_team, fx.away_team, row.alert
        );
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(stats) = &args.stats {
        config.statistics = stats.clone();
        config
            .alert_rules
            .retain(|rule| stats.contains(&rule.condition.statistic()));
    }
    if let Some(windows) = &args.windows {
        config.windows = windows.clone();
    }
    if let Some(min_history) = args.min_history {
        config.min_history = min_history;
    }
    if let Some(trees) = args.trees {
        config.forest.n_estimators = trees;
    }
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    Ok(config)
}

fn load_inputs(args: &Args) -> Result<(Vec<HistoryRecord>, Vec<Fixture>)> {
    let needs_db = args.history.is_none() || args.fixtures.is_none();
    let conn = if needs_db {
        let db_path = args
            .db
            .clone()
            .or_else(store::default_db_path)
            .context("unable to resolve sqlite path")?;
        if !db_path.exists() {
            return Err(anyhow!(
                "no --history/--fixtures given and store {} does not exist",
                db_path.display()
            ));
        }
        Some(store::open_db(&db_path)?)
    } else {
        None
    };

    let history = match &args.history {
        Some(path) => tables::read_history_file(path)?,
        None => store::load_history(conn.as_ref().context("history store not opened")?)?,
    };
    let fixtures = match &args.fixtures {
        Some(path) => tables::read_fixtures_file(path)?,
        None => store::load_fixtures(
            conn.as_ref().context("fixture store not opened")?,
            args.date.as_deref(),
        )?,
    };
    Ok((history, fixtures))
}
