use rayon::prelude::*;
use tracing::{info, warn};

use crate::alerts;
use crate::config::PipelineConfig;
use crate::error::{FitError, PipelineError};
use crate::features::{FixtureFeatureRecord, assemble_all, feature_columns};
use crate::history::{Fixture, HistoryIndex, HistoryRecord, validate_fixtures, validate_history};
use crate::model::{StatOutcome, StatPredictions, train_and_predict};
use crate::stats::Statistic;

pub const META_COLUMNS: [&str; 5] = ["home_team", "away_team", "league", "date", "kickoff_time"];
pub const ALERT_COLUMN: &str = "alert";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub stat: Statistic,
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub features: FixtureFeatureRecord,
    /// Only statistics that were trained this run, in configured order.
    pub predictions: Vec<Prediction>,
}

impl PredictionRecord {
    pub fn predicted(&self, stat: Statistic) -> Option<(f64, f64)> {
        self.predictions
            .iter()
            .find(|p| p.stat == stat)
            .map(|p| (p.home, p.away))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub record: PredictionRecord,
    pub alert: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    pub statistics: Vec<Statistic>,
    pub windows: Vec<usize>,
    pub predicted: Vec<Statistic>,
    pub skipped: Vec<Statistic>,
    pub failures: Vec<FitError>,
    pub rows: Vec<TableRow>,
}

pub fn prediction_column(stat: Statistic, side: &str) -> String {
    format!("pred_{}_{}", stat.key(), side)
}

impl PredictionTable {
    pub fn header(&self) -> Vec<String> {
        let mut out: Vec<String> = META_COLUMNS.iter().map(|c| c.to_string()).collect();
        out.extend(feature_columns(&self.statistics, &self.windows));
        for stat in &self.predicted {
            out.push(prediction_column(*stat, "home"));
            out.push(prediction_column(*stat, "away"));
        }
        out.push(ALERT_COLUMN.to_string());
        out
    }

    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(row_cells).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header().iter().any(|c| c == name)
    }
}

fn row_cells(row: &TableRow) -> Vec<String> {
    let fx = &row.record.features.fixture;
    let mut out = vec![
        fx.home_team.clone(),
        fx.away_team.clone(),
        fx.league.clone(),
        fx.date.clone(),
        fx.kickoff_time.clone(),
    ];
    out.extend(
        row.record
            .features
            .feature_values()
            .into_iter()
            .map(format_number),
    );
    for p in &row.record.predictions {
        out.push(format_number(p.home));
        out.push(format_number(p.away));
    }
    out.push(row.alert.clone());
    out
}

/// Shortest round-trip decimal form, so identical values always print identically.
pub fn format_number(v: f64) -> String {
    format!("{v}")
}

/// Validates both tables, then runs features, per-statistic models and alerts.
pub fn run(
    history: &[HistoryRecord],
    fixtures: &[Fixture],
    config: &PipelineConfig,
) -> Result<PredictionTable, PipelineError> {
    let config = config.validated()?;
    validate_history(history)?;
    validate_fixtures(fixtures)?;

    let index = HistoryIndex::build(history);
    let records = assemble_all(fixtures, &index, &config.statistics, &config.windows);

    let outcomes: Vec<StatOutcome> = config
        .statistics
        .par_iter()
        .map(|stat| {
            train_and_predict(
                &index,
                &records,
                *stat,
                &config.windows,
                config.min_history,
                &config.forest,
            )
        })
        .collect();

    let table = merge(&config, records, outcomes);
    info!(
        fixtures = table.rows.len(),
        teams = index.teams().len(),
        predicted = table.predicted.len(),
        skipped = table.skipped.len(),
        failed = table.failures.len(),
        "pipeline run complete"
    );
    Ok(table)
}

/// Joins per-statistic outcomes with the fixture records and evaluates the alert rules.
///
/// `outcomes` follow `config.statistics` order and each prediction vector is aligned with
/// `records`. Skipped and failed statistics contribute no prediction columns.
pub fn merge(
    config: &PipelineConfig,
    records: Vec<FixtureFeatureRecord>,
    outcomes: Vec<StatOutcome>,
) -> PredictionTable {
    let mut predicted: Vec<StatPredictions> = Vec::new();
    let mut skipped = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            StatOutcome::Predicted(p) => predicted.push(p),
            StatOutcome::Skipped(stat) => {
                warn!(stat = %stat, "no team with enough history, predictions omitted");
                skipped.push(stat);
            }
            StatOutcome::Failed(err) => {
                warn!(error = %err, "model fit failed, predictions omitted");
                failures.push(err);
            }
        }
    }

    let rows = records
        .into_iter()
        .enumerate()
        .map(|(i, features)| {
            let record = PredictionRecord {
                features,
                predictions: predicted
                    .iter()
                    .map(|p| Prediction {
                        stat: p.stat,
                        home: p.home[i],
                        away: p.away[i],
                    })
                    .collect(),
            };
            let alert = alerts::evaluate(&config.alert_rules, &record);
            TableRow { record, alert }
        })
        .collect();

    PredictionTable {
        statistics: config.statistics.clone(),
        windows: config.windows.clone(),
        predicted: predicted.iter().map(|p| p.stat).collect(),
        skipped,
        failures,
        rows,
    }
}
