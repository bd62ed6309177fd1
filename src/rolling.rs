use crate::history::{HistoryIndex, HistoryRecord};
use crate::stats::Statistic;

/// Window means for one (team, statistic), ascending by window size.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingMeans {
    entries: Vec<(usize, f64)>,
}

impl RollingMeans {
    pub fn get(&self, window: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn vector(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }
}

pub fn rolling_means(
    history: &[HistoryRecord],
    team: &str,
    stat: Statistic,
    windows: &[usize],
) -> RollingMeans {
    let mut rows: Vec<&HistoryRecord> = history.iter().filter(|r| r.team == team).collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    means_from_sorted(&rows, stat, windows)
}

pub fn rolling_means_indexed(
    index: &HistoryIndex<'_>,
    team: &str,
    stat: Statistic,
    windows: &[usize],
) -> RollingMeans {
    means_from_sorted(index.team(team), stat, windows)
}

/// `rows` must be ordered oldest first.
pub fn means_from_sorted(
    rows: &[&HistoryRecord],
    stat: Statistic,
    windows: &[usize],
) -> RollingMeans {
    let mut sorted = windows.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let entries = sorted
        .into_iter()
        .map(|n| (n, tail_mean(rows, stat, n)))
        .collect();
    RollingMeans { entries }
}

fn tail_mean(rows: &[&HistoryRecord], stat: Statistic, n: usize) -> f64 {
    // No history at all is a new or unscored team, not an error.
    if rows.is_empty() || n == 0 {
        return 0.0;
    }
    let start = rows.len().saturating_sub(n);
    running_mean(rows[start..].iter().map(|r| r.value(stat)))
}

/// Incremental mean; finite whenever every input is finite.
pub fn running_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut acc = 0.0;
    for (i, v) in values.into_iter().enumerate() {
        acc += (v - acc) / (i + 1) as f64;
    }
    acc
}
