use thiserror::Error;

use crate::stats::Statistic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    History,
    Fixtures,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::History => f.write_str("history"),
            TableKind::Fixtures => f.write_str("fixtures"),
        }
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{table} row {row}: {field} {reason}{}", team_suffix(.team))]
    MalformedRow {
        table: TableKind,
        row: usize,
        field: &'static str,
        reason: String,
        team: Option<String>,
    },
}

fn team_suffix(team: &Option<String>) -> String {
    team.as_deref()
        .map(|t| format!(" (team '{t}')"))
        .unwrap_or_default()
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no statistics configured")]
    NoStatistics,
    #[error("statistic {0} listed more than once")]
    DuplicateStatistic(Statistic),
    #[error("no window sizes configured")]
    NoWindows,
    #[error("window sizes must be positive")]
    ZeroWindow,
    #[error("minimum history must be at least 1 match")]
    ZeroMinHistory,
    #[error("forest needs at least one estimator")]
    NoEstimators,
    #[error("alert rule '{label}' uses untracked statistic {stat}")]
    UntrackedRuleStatistic { label: String, stat: Statistic },
    #[error("alert rule '{0}' has a non-finite threshold")]
    NonFiniteThreshold(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    #[error("{stat}: training set is empty")]
    EmptyTrainingSet { stat: Statistic },
    #[error("{stat}: feature vectors have inconsistent lengths")]
    RaggedFeatures { stat: Statistic },
    #[error("{stat}: non-finite training value for team '{team}'")]
    NonFinite { stat: Statistic, team: String },
}

/// Failures that stop a whole run before any feature is computed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline config: {0}")]
    Config(#[from] ConfigError),
    #[error("malformed input: {0}")]
    Input(#[from] InputError),
}
