use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, params};

use crate::history::{Fixture, HistoryRecord, parse_match_date};
use crate::stats::StatLine;

const DATA_DIR: &str = "matchday_alerts";
const DB_FILE: &str = "history.sqlite";
const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub db_path: PathBuf,
    pub history_upserted: usize,
    pub fixtures_upserted: usize,
    pub teams: usize,
    pub latest_match: Option<String>,
}

/// `$XDG_CACHE_HOME/matchday_alerts` or `~/.cache/matchday_alerts`.
pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DATA_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(DATA_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS team_history (
            team TEXT NOT NULL,
            match_date TEXT NOT NULL,
            goals REAL NOT NULL,
            shots REAL NOT NULL,
            shots_on_target REAL NOT NULL,
            corners REAL NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (team, match_date)
        );
        CREATE INDEX IF NOT EXISTS idx_history_team ON team_history(team);

        CREATE TABLE IF NOT EXISTS fixtures (
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            league TEXT NOT NULL,
            match_date TEXT NOT NULL,
            kickoff_time TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (home_team, away_team, match_date)
        );
        CREATE INDEX IF NOT EXISTS idx_fixtures_date ON fixtures(match_date);

        CREATE TABLE IF NOT EXISTS import_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            history_rows INTEGER NOT NULL,
            fixture_rows INTEGER NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn import_tables(
    conn: &mut Connection,
    db_path: PathBuf,
    history: &[HistoryRecord],
    fixtures: &[Fixture],
) -> Result<ImportSummary> {
    if history.is_empty() && fixtures.is_empty() {
        return Err(anyhow!("nothing to import: both tables are empty"));
    }

    let started_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin import transaction")?;
    tx.execute(
        "INSERT INTO import_runs(started_at, finished_at, history_rows, fixture_rows)
         VALUES (?1, NULL, 0, 0)",
        params![started_at],
    )
    .context("insert import run")?;
    let run_id = tx.last_insert_rowid();

    for rec in history {
        upsert_history(&tx, rec)?;
    }
    for fx in fixtures {
        upsert_fixture(&tx, fx)?;
    }

    tx.execute(
        "UPDATE import_runs SET finished_at = ?1, history_rows = ?2, fixture_rows = ?3
         WHERE run_id = ?4",
        params![
            Utc::now().to_rfc3339(),
            history.len() as i64,
            fixtures.len() as i64,
            run_id
        ],
    )
    .context("update import run")?;
    tx.commit().context("commit import transaction")?;

    let teams = conn
        .query_row("SELECT COUNT(DISTINCT team) FROM team_history", [], |row| {
            row.get::<_, i64>(0)
        })
        .context("count teams")?;
    let latest_match = conn
        .query_row("SELECT MAX(match_date) FROM team_history", [], |row| {
            row.get::<_, Option<String>>(0)
        })
        .context("query latest match_date")?;

    Ok(ImportSummary {
        db_path,
        history_upserted: history.len(),
        fixtures_upserted: fixtures.len(),
        teams: usize::try_from(teams).unwrap_or_default(),
        latest_match,
    })
}

fn upsert_history(tx: &rusqlite::Transaction<'_>, rec: &HistoryRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO team_history (
            team, match_date, goals, shots, shots_on_target, corners, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(team, match_date) DO UPDATE SET
            goals = excluded.goals,
            shots = excluded.shots,
            shots_on_target = excluded.shots_on_target,
            corners = excluded.corners,
            updated_at = excluded.updated_at
        "#,
        params![
            rec.team,
            format_db_date(&rec.date),
            rec.stats.goals,
            rec.stats.shots,
            rec.stats.shots_on_target,
            rec.stats.corners,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert history row for team '{}'", rec.team))?;
    Ok(())
}

fn upsert_fixture(tx: &rusqlite::Transaction<'_>, fx: &Fixture) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO fixtures (
            home_team, away_team, league, match_date, kickoff_time, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(home_team, away_team, match_date) DO UPDATE SET
            league = excluded.league,
            kickoff_time = excluded.kickoff_time,
            updated_at = excluded.updated_at
        "#,
        params![
            fx.home_team,
            fx.away_team,
            fx.league,
            fx.date,
            fx.kickoff_time,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert fixture {} x {}", fx.home_team, fx.away_team))?;
    Ok(())
}

pub fn load_history(conn: &Connection) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT team, match_date, goals, shots, shots_on_target, corners
            FROM team_history
            ORDER BY match_date ASC, team ASC
            "#,
        )
        .context("prepare load history query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                StatLine {
                    goals: row.get(2)?,
                    shots: row.get(3)?,
                    shots_on_target: row.get(4)?,
                    corners: row.get(5)?,
                },
            ))
        })
        .context("query load history")?;

    let mut out = Vec::new();
    for row in rows {
        let (team, raw_date, stats) = row.context("decode history row")?;
        let date = parse_match_date(&raw_date)
            .ok_or_else(|| anyhow!("stored date '{raw_date}' for team '{team}' is invalid"))?;
        out.push(HistoryRecord { team, date, stats });
    }
    Ok(out)
}

/// Fixtures for one date, or every stored fixture when `date` is `None`.
pub fn load_fixtures(conn: &Connection, date: Option<&str>) -> Result<Vec<Fixture>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT home_team, away_team, league, match_date, kickoff_time
            FROM fixtures
            WHERE ?1 IS NULL OR match_date = ?1
            ORDER BY match_date ASC, kickoff_time ASC, league ASC, home_team ASC
            "#,
        )
        .context("prepare load fixtures query")?;

    let rows = stmt
        .query_map(params![date], |row| {
            Ok(Fixture {
                home_team: row.get(0)?,
                away_team: row.get(1)?,
                league: row.get(2)?,
                date: row.get(3)?,
                kickoff_time: row.get(4)?,
            })
        })
        .context("query load fixtures")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode fixture row")?);
    }
    Ok(out)
}

fn format_db_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FMT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn rec(team: &str, date: &str, goals: f64) -> HistoryRecord {
        HistoryRecord {
            team: team.into(),
            date: parse_match_date(date).unwrap(),
            stats: StatLine {
                goals,
                shots: 10.0,
                shots_on_target: 4.0,
                corners: 5.0,
            },
        }
    }

    #[test]
    fn import_then_load_round_trips() {
        let mut conn = memory_db();
        let history = vec![rec("A", "2024-01-02", 2.0), rec("A", "2024-01-01", 1.0)];
        let fixtures = vec![Fixture {
            home_team: "A".into(),
            away_team: "B".into(),
            league: "Premier League".into(),
            date: "2024-02-01".into(),
            kickoff_time: "15:00".into(),
        }];
        let summary =
            import_tables(&mut conn, PathBuf::from(":memory:"), &history, &fixtures).unwrap();
        assert_eq!(summary.history_upserted, 2);
        assert_eq!(summary.teams, 1);
        assert_eq!(summary.latest_match.as_deref(), Some("2024-01-02 00:00:00"));

        let loaded = load_history(&conn).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].stats.goals, 1.0);

        assert_eq!(load_fixtures(&conn, Some("2024-02-01")).unwrap(), fixtures);
        assert!(load_fixtures(&conn, Some("2024-02-02")).unwrap().is_empty());
        assert_eq!(load_fixtures(&conn, None).unwrap().len(), 1);
    }

    #[test]
    fn reimport_updates_instead_of_duplicating() {
        let mut conn = memory_db();
        import_tables(&mut conn, PathBuf::new(), &[rec("A", "2024-01-01", 1.0)], &[]).unwrap();
        import_tables(&mut conn, PathBuf::new(), &[rec("A", "2024-01-01", 3.0)], &[]).unwrap();
        let loaded = load_history(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].stats.goals, 3.0);
    }

    #[test]
    fn empty_import_is_rejected() {
        let mut conn = memory_db();
        assert!(import_tables(&mut conn, PathBuf::new(), &[], &[]).is_err());
    }
}
