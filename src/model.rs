use tracing::debug;

use crate::error::FitError;
use crate::features::{FixtureFeatureRecord, Side};
use crate::forest::{Forest, ForestConfig};
use crate::history::HistoryIndex;
use crate::rolling::means_from_sorted;
use crate::stats::Statistic;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub teams: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One example per team with at least `min_history` records: the team's window means as
/// features and its most recent value as the label.
pub fn build_training_set(
    index: &HistoryIndex<'_>,
    stat: Statistic,
    windows: &[usize],
    min_history: usize,
) -> TrainingSet {
    let mut set = TrainingSet::default();
    for team in index.teams() {
        let rows = index.team(team);
        if rows.len() < min_history {
            continue;
        }
        let Some(last) = rows.last() else {
            continue;
        };
        set.teams.push(team.to_string());
        set.features.push(means_from_sorted(rows, stat, windows).vector());
        set.labels.push(last.value(stat));
    }
    set
}

#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub stat: Statistic,
    pub training_examples: usize,
    forest: Forest,
}

impl TrainedModel {
    pub fn fit(stat: Statistic, set: &TrainingSet, cfg: &ForestConfig) -> Result<Self, FitError> {
        if set.is_empty() {
            return Err(FitError::EmptyTrainingSet { stat });
        }
        for ((team, row), label) in set.teams.iter().zip(&set.features).zip(&set.labels) {
            if !label.is_finite() || row.iter().any(|v| !v.is_finite()) {
                return Err(FitError::NonFinite {
                    stat,
                    team: team.clone(),
                });
            }
        }
        let forest = Forest::fit(&set.features, &set.labels, cfg)
            .ok_or(FitError::RaggedFeatures { stat })?;
        debug!(
            stat = %stat,
            examples = set.len(),
            trees = forest.n_trees(),
            "fitted model"
        );
        Ok(Self {
            stat,
            training_examples: set.len(),
            forest,
        })
    }

    pub fn predict(&self, means: &[f64]) -> f64 {
        self.forest.predict(means)
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        self.forest.predict_batch(rows)
    }
}

/// Aligned with the fixture feature records.
#[derive(Debug, Clone, PartialEq)]
pub struct StatPredictions {
    pub stat: Statistic,
    pub home: Vec<f64>,
    pub away: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatOutcome {
    Predicted(StatPredictions),
    /// No team had enough history; the statistic's columns are left out.
    Skipped(Statistic),
    Failed(FitError),
}

pub fn side_vectors(
    records: &[FixtureFeatureRecord],
    stat: Statistic,
    side: Side,
) -> Vec<Vec<f64>> {
    records
        .iter()
        .map(|r| r.side(side).vector(stat).unwrap_or_default())
        .collect()
}

pub fn train_and_predict(
    index: &HistoryIndex<'_>,
    records: &[FixtureFeatureRecord],
    stat: Statistic,
    windows: &[usize],
    min_history: usize,
    forest: &ForestConfig,
) -> StatOutcome {
    let set = build_training_set(index, stat, windows, min_history);
    if set.is_empty() {
        return StatOutcome::Skipped(stat);
    }
    let model = match TrainedModel::fit(stat, &set, forest) {
        Ok(model) => model,
        Err(err) => return StatOutcome::Failed(err),
    };
    let home = model.predict_batch(&side_vectors(records, stat, Side::Home));
    let away = model.predict_batch(&side_vectors(records, stat, Side::Away));
    StatOutcome::Predicted(StatPredictions { stat, home, away })
}
