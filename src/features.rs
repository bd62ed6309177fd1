use crate::history::{Fixture, HistoryIndex, HistoryRecord};
use crate::rolling::{RollingMeans, rolling_means_indexed};
use crate::stats::Statistic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamFeatures {
    pub team: String,
    pub by_stat: Vec<(Statistic, RollingMeans)>,
}

impl TeamFeatures {
    pub fn means(&self, stat: Statistic) -> Option<&RollingMeans> {
        self.by_stat.iter().find(|(s, _)| *s == stat).map(|(_, m)| m)
    }

    pub fn vector(&self, stat: Statistic) -> Option<Vec<f64>> {
        self.means(stat).map(RollingMeans::vector)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureFeatureRecord {
    pub fixture: Fixture,
    pub home: TeamFeatures,
    pub away: TeamFeatures,
}

impl FixtureFeatureRecord {
    pub fn side(&self, side: Side) -> &TeamFeatures {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Feature cells in column order (home block, then away block).
    pub fn feature_values(&self) -> Vec<f64> {
        [&self.home, &self.away]
            .into_iter()
            .flat_map(|t| t.by_stat.iter())
            .flat_map(|(_, m)| m.vector())
            .collect()
    }
}

pub fn feature_column(side: Side, stat: Statistic, window: usize) -> String {
    format!("{}_{}_avg{}", side.prefix(), stat.key(), window)
}

/// Feature column names matching [`FixtureFeatureRecord::feature_values`].
pub fn feature_columns(stats: &[Statistic], windows: &[usize]) -> Vec<String> {
    let mut out = Vec::with_capacity(2 * stats.len() * windows.len());
    for side in [Side::Home, Side::Away] {
        for stat in stats {
            for w in windows {
                out.push(feature_column(side, *stat, *w));
            }
        }
    }
    out
}

pub fn assemble(
    fixture: &Fixture,
    history: &[HistoryRecord],
    stats: &[Statistic],
    windows: &[usize],
) -> FixtureFeatureRecord {
    let index = HistoryIndex::build(history);
    assemble_indexed(fixture, &index, stats, windows)
}

pub fn assemble_indexed(
    fixture: &Fixture,
    index: &HistoryIndex<'_>,
    stats: &[Statistic],
    windows: &[usize],
) -> FixtureFeatureRecord {
    let team_features = |team: &str| TeamFeatures {
        team: team.to_string(),
        by_stat: stats
            .iter()
            .map(|s| (*s, rolling_means_indexed(index, team, *s, windows)))
            .collect(),
    };
    FixtureFeatureRecord {
        fixture: fixture.clone(),
        home: team_features(&fixture.home_team),
        away: team_features(&fixture.away_team),
    }
}

pub fn assemble_all(
    fixtures: &[Fixture],
    index: &HistoryIndex<'_>,
    stats: &[Statistic],
    windows: &[usize],
) -> Vec<FixtureFeatureRecord> {
    fixtures
        .iter()
        .map(|f| assemble_indexed(f, index, stats, windows))
        .collect()
}
