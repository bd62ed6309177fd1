use std::io::Write;

use tempfile::NamedTempFile;

use matchday_alerts::error::InputError;
use matchday_alerts::history::parse_match_date;
use matchday_alerts::tables::{parse_fixtures, parse_history, read_history_file};

#[test]
fn reads_semicolon_history_with_sheet_headers() {
    let raw = "Time;Date;Goals_FT;Shots;ShotsOnTarget;Corners_FT\n\
               Arsenal;2024-08-17;2;15;6;7\n\
               Arsenal;18/08/2024;1,5;9;3;4\n";
    let rows = parse_history(raw).expect("history should parse");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].team, "Arsenal");
    assert_eq!(rows[0].stats.shots, 15.0);
    assert_eq!(rows[1].stats.goals, 1.5);
    assert_eq!(rows[1].date, parse_match_date("2024-08-18").unwrap());
}

#[test]
fn reads_comma_history_with_plain_headers() {
    let raw = "team,date,goals,shots,shots_on_target,corners\n\
               Chelsea,2024-08-17 17:30:00,0,11,2,5\n";
    let rows = parse_history(raw).unwrap();
    assert_eq!(rows[0].stats.corners, 5.0);
}

#[test]
fn missing_statistic_is_a_malformed_row() {
    let raw = "team;date;goals;shots;shots_on_target;corners\n\
               Arsenal;2024-08-17;2;15;6;7\n\
               Chelsea;2024-08-18;1;;3;4\n";
    let err = parse_history(raw).unwrap_err();
    let input = err
        .downcast_ref::<InputError>()
        .expect("input error surfaced");
    let InputError::MalformedRow {
        row, field, team, ..
    } = input;
    assert_eq!(*row, 2);
    assert_eq!(*field, "shots");
    assert_eq!(team.as_deref(), Some("Chelsea"));
}

#[test]
fn missing_column_is_a_malformed_row() {
    let raw = "team;date;goals;shots;shots_on_target\n\
               Arsenal;2024-08-17;2;15;6\n";
    let err = parse_history(raw).unwrap_err();
    assert!(err.to_string().contains("corners is missing"), "{err}");
}

#[test]
fn bad_date_is_reported() {
    let raw = "team;date;goals;shots;shots_on_target;corners\n\
               Arsenal;someday;2;15;6;7\n";
    let err = parse_history(raw).unwrap_err();
    assert!(err.to_string().contains("not a recognised date"), "{err}");
}

#[test]
fn reads_fixtures_with_sheet_headers() {
    let raw = "Home;Away;League;Date;Hours\n\
               Arsenal;Chelsea;Premier League;2024-09-01;14\n\
               Inter;Milan;Serie A;2024-09-01;\n";
    let fixtures = parse_fixtures(raw).unwrap();
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[0].kickoff_time, "14");
    assert_eq!(fixtures[1].kickoff_time, "");
    assert_eq!(fixtures[1].league, "Serie A");
}

#[test]
fn fixture_without_away_team_is_rejected() {
    let raw = "home_team;away_team;league;date;kickoff_time\n\
               Arsenal;;Premier League;2024-09-01;14\n";
    let err = parse_fixtures(raw).unwrap_err();
    assert!(err.to_string().contains("fixtures row 1: away_team is missing"), "{err}");
}

#[test]
fn reads_history_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "team;date;goals;shots;shots_on_target;corners").unwrap();
    writeln!(file, "Porto;2024-01-01;3;14;7;8").unwrap();
    let rows = read_history_file(file.path()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].stats.shots_on_target, 7.0);
}
