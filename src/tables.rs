use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{InputError, TableKind};
use crate::history::{Fixture, HistoryRecord, parse_match_date};
use crate::stats::{StatLine, Statistic};

#[derive(Debug, Deserialize)]
struct RawHistoryRow {
    #[serde(default, alias = "Team", alias = "Time")]
    team: Option<String>,
    #[serde(default, alias = "Date")]
    date: Option<String>,
    #[serde(default, alias = "Goals", alias = "Goals_FT")]
    goals: Option<String>,
    #[serde(default, alias = "Shots")]
    shots: Option<String>,
    #[serde(default, alias = "ShotsOnTarget", alias = "Shots_On_Target")]
    shots_on_target: Option<String>,
    #[serde(default, alias = "Corners", alias = "Corners_FT")]
    corners: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFixtureRow {
    #[serde(default, alias = "Home", alias = "Time_Casa")]
    home_team: Option<String>,
    #[serde(default, alias = "Away", alias = "Time_Fora")]
    away_team: Option<String>,
    #[serde(default, alias = "League", alias = "Liga")]
    league: Option<String>,
    #[serde(default, alias = "Date", alias = "Data")]
    date: Option<String>,
    #[serde(default, alias = "Hours", alias = "Horario")]
    kickoff_time: Option<String>,
}

/// Picks `;` or `,` from whichever appears more often in the header line.
pub fn detect_delimiter(raw: &str) -> u8 {
    let header = raw.lines().next().unwrap_or_default();
    let semis = header.matches(';').count();
    let commas = header.matches(',').count();
    if semis >= commas && semis > 0 { b';' } else { b',' }
}

pub fn read_history_file(path: &Path) -> Result<Vec<HistoryRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read history table {}", path.display()))?;
    parse_history(&raw).with_context(|| format!("parse history table {}", path.display()))
}

pub fn read_fixtures_file(path: &Path) -> Result<Vec<Fixture>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read fixture table {}", path.display()))?;
    parse_fixtures(&raw).with_context(|| format!("parse fixture table {}", path.display()))
}

pub fn parse_history(raw: &str) -> Result<Vec<HistoryRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(raw))
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawHistoryRow>().enumerate() {
        let row_no = idx + 1;
        let row = row.with_context(|| format!("decode history row {row_no}"))?;
        let team = required(TableKind::History, row_no, "team", row.team, None)?;
        let date_raw = required(TableKind::History, row_no, "date", row.date, Some(&team))?;
        let date = parse_match_date(&date_raw).ok_or_else(|| InputError::MalformedRow {
            table: TableKind::History,
            row: row_no,
            field: "date",
            reason: format!("is not a recognised date: '{date_raw}'"),
            team: Some(team.clone()),
        })?;

        let mut stats = StatLine::default();
        let cells = [
            (Statistic::Goals, row.goals),
            (Statistic::Shots, row.shots),
            (Statistic::ShotsOnTarget, row.shots_on_target),
            (Statistic::Corners, row.corners),
        ];
        for (stat, cell) in cells {
            let cell = required(TableKind::History, row_no, stat.key(), cell, Some(&team))?;
            let value = parse_number(&cell).ok_or_else(|| InputError::MalformedRow {
                table: TableKind::History,
                row: row_no,
                field: stat.key(),
                reason: format!("is not a number: '{cell}'"),
                team: Some(team.clone()),
            })?;
            stats.set(stat, value);
        }

        out.push(HistoryRecord { team, date, stats });
    }
    Ok(out)
}

pub fn parse_fixtures(raw: &str) -> Result<Vec<Fixture>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(raw))
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in reader.deserialize::<RawFixtureRow>().enumerate() {
        let row_no = idx + 1;
        let row = row.with_context(|| format!("decode fixture row {row_no}"))?;
        out.push(Fixture {
            home_team: required(TableKind::Fixtures, row_no, "home_team", row.home_team, None)?,
            away_team: required(TableKind::Fixtures, row_no, "away_team", row.away_team, None)?,
            league: required(TableKind::Fixtures, row_no, "league", row.league, None)?,
            date: required(TableKind::Fixtures, row_no, "date", row.date, None)?,
            kickoff_time: row.kickoff_time.unwrap_or_default(),
        });
    }
    Ok(out)
}

fn required(
    table: TableKind,
    row: usize,
    field: &'static str,
    value: Option<String>,
    team: Option<&str>,
) -> Result<String, InputError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(InputError::MalformedRow {
            table,
            row,
            field,
            reason: "is missing".to_string(),
            team: team.map(str::to_string),
        }),
    }
}

/// Accepts `1.5` and the spreadsheet-style `1,5`.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}
