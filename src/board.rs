use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::features::{Side, feature_column};
use crate::output::OUTPUT_DELIMITER;
use crate::pipeline::{ALERT_COLUMN, prediction_column};
use crate::stats::Statistic;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    cells: HashMap<String, String>,
    pub match_label: String,
    pub date: String,
    pub kickoff: String,
    pub league: String,
    pub alert: String,
}

impl BoardRow {
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.cell(column)?.trim().parse::<f64>().ok()
    }

    pub fn prediction(&self, stat: Statistic, side: Side) -> Option<f64> {
        self.number(&prediction_column(stat, side.prefix()))
    }

    pub fn window_means(&self, stat: Statistic, side: Side, windows: &[usize]) -> Vec<f64> {
        windows
            .iter()
            .filter_map(|w| self.number(&feature_column(side, stat, *w)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub windows: Vec<usize>,
    pub rows: Vec<BoardRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

/// `Up` when means strictly rise with window size, `Down` when they strictly fall.
pub fn trend(means: &[f64]) -> Trend {
    if means.len() < 2 {
        return Trend::Flat;
    }
    if means.windows(2).all(|p| p[1] > p[0]) {
        Trend::Up
    } else if means.windows(2).all(|p| p[1] < p[0]) {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Display threshold for the green highlight; inclusive, unlike the alert rules.
pub fn highlight_threshold(stat: Statistic) -> f64 {
    match stat {
        Statistic::Goals => 1.5,
        Statistic::Shots | Statistic::ShotsOnTarget => 8.0,
        Statistic::Corners => 7.5,
    }
}

pub fn is_highlighted(stat: Statistic, value: f64) -> bool {
    value >= highlight_threshold(stat)
}

pub fn match_label(home: &str, away: &str) -> String {
    format!("{home} x {away}")
}

/// A whole-number hour such as `14` or `14.0` becomes `14:00`; anything else is kept.
pub fn format_kickoff(raw: &str) -> String {
    let s = raw.trim();
    match s.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (0.0..24.0).contains(&v) => format!("{}:00", v as u32),
        _ => s.to_string(),
    }
}

pub fn load_board(path: &Path) -> Result<Board> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read predictions {}", path.display()))?;
    parse_board(&raw).with_context(|| format!("parse predictions {}", path.display()))
}

pub fn parse_board(raw: &str) -> Result<Board> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .from_reader(raw.as_bytes());
    let header: Vec<String> = reader
        .headers()
        .context("read header")?
        .iter()
        .map(str::to_string)
        .collect();
    for required in ["home_team", "away_team", "league", "date", "kickoff_time", ALERT_COLUMN] {
        if !header.iter().any(|h| h == required) {
            return Err(anyhow!("prediction table has no '{required}' column"));
        }
    }

    let mut windows: Vec<usize> = header
        .iter()
        .filter(|h| h.starts_with("home_"))
        .filter_map(|h| h.rsplit_once("_avg"))
        .filter_map(|(_, w)| w.parse().ok())
        .collect();
    windows.sort_unstable();
    windows.dedup();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read row {}", idx + 1))?;
        let cells: HashMap<String, String> = header
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        let get = |k: &str| cells.get(k).cloned().unwrap_or_default();
        rows.push(BoardRow {
            match_label: match_label(&get("home_team"), &get("away_team")),
            date: get("date"),
            kickoff: format_kickoff(&get("kickoff_time")),
            league: get("league"),
            alert: get(ALERT_COLUMN),
            cells,
        });
    }
    Ok(Board { windows, rows })
}

impl Board {
    pub fn dates(&self) -> Vec<String> {
        sorted_unique(self.rows.iter().map(|r| r.date.clone()))
    }

    pub fn leagues(&self, date: &str) -> Vec<String> {
        sorted_unique(
            self.rows
                .iter()
                .filter(|r| r.date == date)
                .map(|r| r.league.clone()),
        )
    }

    pub fn kickoffs(&self, date: &str, league: &str) -> Vec<String> {
        sorted_unique(
            self.rows
                .iter()
                .filter(|r| r.date == date && r.league == league)
                .map(|r| r.kickoff.clone()),
        )
    }

    /// Match labels for `date`, `league` and `kickoff`, in table order.
    pub fn matches(&self, date: &str, league: &str, kickoff: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.rows {
            if r.date == date
                && r.league == league
                && r.kickoff == kickoff
                && !out.contains(&r.match_label)
            {
                out.push(r.match_label.clone());
            }
        }
        out
    }

    pub fn find(&self, match_label: &str) -> Option<&BoardRow> {
        self.rows.iter().find(|r| r.match_label == match_label)
    }
}

fn sorted_unique(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = values.collect();
    out.sort();
    out.dedup();
    out
}
