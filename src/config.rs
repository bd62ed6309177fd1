use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertRule, default_rules};
use crate::error::ConfigError;
use crate::forest::ForestConfig;
use crate::stats::Statistic;

pub const DEFAULT_WINDOWS: &[usize] = &[5, 10, 15];
pub const DEFAULT_MIN_HISTORY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub statistics: Vec<Statistic>,
    pub windows: Vec<usize>,
    /// Teams with fewer history records than this are left out of training.
    pub min_history: usize,
    pub forest: ForestConfig,
    pub alert_rules: Vec<AlertRule>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            statistics: Statistic::ALL.to_vec(),
            windows: DEFAULT_WINDOWS.to_vec(),
            min_history: DEFAULT_MIN_HISTORY,
            forest: ForestConfig::default(),
            alert_rules: default_rules(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read pipeline config {}", path.display()))?;
        let cfg = serde_json::from_str::<PipelineConfig>(&raw)
            .with_context(|| format!("parse pipeline config {}", path.display()))?;
        Ok(cfg)
    }

    /// Checks the config and returns a copy with windows sorted ascending and deduplicated.
    pub fn validated(&self) -> Result<PipelineConfig, ConfigError> {
        if self.statistics.is_empty() {
            return Err(ConfigError::NoStatistics);
        }
        for (idx, stat) in self.statistics.iter().enumerate() {
            if self.statistics[..idx].contains(stat) {
                return Err(ConfigError::DuplicateStatistic(*stat));
            }
        }
        if self.windows.is_empty() {
            return Err(ConfigError::NoWindows);
        }
        if self.windows.contains(&0) {
            return Err(ConfigError::ZeroWindow);
        }
        if self.min_history == 0 {
            return Err(ConfigError::ZeroMinHistory);
        }
        if self.forest.n_estimators == 0 {
            return Err(ConfigError::NoEstimators);
        }
        for rule in &self.alert_rules {
            if !rule.condition.threshold().is_finite() {
                return Err(ConfigError::NonFiniteThreshold(rule.label.clone()));
            }
            let stat = rule.condition.statistic();
            if !self.statistics.contains(&stat) {
                return Err(ConfigError::UntrackedRuleStatistic {
                    label: rule.label.clone(),
                    stat,
                });
            }
        }

        let mut windows = self.windows.clone();
        windows.sort_unstable();
        windows.dedup();

        Ok(PipelineConfig {
            windows,
            ..self.clone()
        })
    }
}
