use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{InputError, TableKind};
use crate::stats::{StatLine, Statistic};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub team: String,
    pub date: NaiveDateTime,
    pub stats: StatLine,
}

impl HistoryRecord {
    pub fn value(&self, stat: Statistic) -> f64 {
        self.stats.get(stat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub date: String,
    pub kickoff_time: String,
}

/// Accepts `2024-08-17`, `2024-08-17 15:30:00`, `2024-08-17T15:30:00` and `17/08/2024`.
pub fn parse_match_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Rejects rows the pipeline cannot use. `row` indices in errors are 1-based.
pub fn validate_history(records: &[HistoryRecord]) -> Result<(), InputError> {
    for (idx, rec) in records.iter().enumerate() {
        let row = idx + 1;
        if rec.team.trim().is_empty() {
            return Err(InputError::MalformedRow {
                table: TableKind::History,
                row,
                field: "team",
                reason: "is empty".to_string(),
                team: None,
            });
        }
        for stat in Statistic::ALL {
            let v = rec.value(stat);
            if !v.is_finite() || v < 0.0 {
                return Err(InputError::MalformedRow {
                    table: TableKind::History,
                    row,
                    field: stat.key(),
                    reason: format!("must be a non-negative number, got {v}"),
                    team: Some(rec.team.clone()),
                });
            }
        }
    }
    Ok(())
}

pub fn validate_fixtures(fixtures: &[Fixture]) -> Result<(), InputError> {
    for (idx, fx) in fixtures.iter().enumerate() {
        let row = idx + 1;
        let required: [(&'static str, &str); 4] = [
            ("home_team", &fx.home_team),
            ("away_team", &fx.away_team),
            ("league", &fx.league),
            ("date", &fx.date),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(InputError::MalformedRow {
                    table: TableKind::Fixtures,
                    row,
                    field,
                    reason: "is empty".to_string(),
                    team: None,
                });
            }
        }
    }
    Ok(())
}

/// History grouped per team, each team's records ordered oldest first.
///
/// This is the single ordering used for both training labels and inference windows: records
/// are sorted ascending by date (stable, so same-day records keep input order) and a window of
/// `n` is the last `n` entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryIndex<'a> {
    order: Vec<&'a str>,
    by_team: HashMap<&'a str, Vec<&'a HistoryRecord>>,
}

impl<'a> HistoryIndex<'a> {
    pub fn build(records: &'a [HistoryRecord]) -> Self {
        let mut order = Vec::new();
        let mut by_team: HashMap<&'a str, Vec<&'a HistoryRecord>> = HashMap::new();
        for rec in records {
            let key = rec.team.as_str();
            let rows = by_team.entry(key).or_insert_with(|| {
                order.push(key);
                Vec::new()
            });
            rows.push(rec);
        }
        for rows in by_team.values_mut() {
            rows.sort_by(|a, b| a.date.cmp(&b.date));
        }
        Self { order, by_team }
    }

    /// Teams in order of first appearance in the input.
    pub fn teams(&self) -> &[&'a str] {
        &self.order
    }

    pub fn team(&self, team: &str) -> &[&'a HistoryRecord] {
        self.by_team.get(team).map(Vec::as_slice).unwrap_or(&[])
    }
}
