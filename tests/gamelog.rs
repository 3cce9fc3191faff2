use std::fs;
use std::path::PathBuf;

use databall::box_score::{GameResult, OverUnderResult, SeasonType, SpreadResult};
use databall::error::{DataShapeError, Error};
use databall::gamelog::{
    import_betting_lines, import_game_log, pair_games, parse_betting_lines_json,
    parse_game_log_json,
};
use databall::store;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_result_sets_fixture() {
    let raw = read_fixture("league_game_log.json");
    let rows = parse_game_log_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].season, 2019);
    assert_eq!(rows[0].season_type, SeasonType::Regular);
    assert_eq!(rows[0].team_abbreviation, "LAL");
    assert!(rows[0].is_away());
    assert!(!rows[1].is_away());
    assert_eq!(rows[1].stats.pts, 112.0);
    assert_eq!(rows[1].stats.plus_minus, 10.0);
    assert_eq!(rows[0].wl, Some(GameResult::Loss));
}

#[test]
fn pairs_home_and_away_rows() {
    let raw = read_fixture("league_game_log.json");
    let rows = parse_game_log_json(&raw).expect("fixture should parse");
    let parsed = pair_games(&rows);

    assert_eq!(parsed.games.len(), 2);
    assert_eq!(parsed.stats.len(), 4);
    assert_eq!(parsed.teams.len(), 3);

    let first = &parsed.games[0];
    assert_eq!(first.id, "0021900001");
    assert_eq!(first.home_team_id, 1610612746);
    assert_eq!(first.away_team_id, 1610612747);
    assert_eq!(first.home_wl, GameResult::Win);
    assert_eq!(first.matchup, "LAC vs. LAL");

    let second = &parsed.games[1];
    assert_eq!(second.home_team_id, 1610612744);
    assert_eq!(second.home_wl, GameResult::Loss);

    assert_eq!(parsed.skipped.len(), 1);
    assert!(parsed.skipped[0].contains("0021900003"));
}

#[test]
fn parses_array_of_objects() {
    let raw = read_fixture("game_log_objects.json");
    let rows = parse_game_log_json(&raw).expect("fixture should parse");
    let parsed = pair_games(&rows);
    assert_eq!(parsed.games.len(), 1);
    assert_eq!(parsed.games[0].season_type, SeasonType::Playoffs);
    assert_eq!(parsed.games[0].season, 2019);
    assert!(parsed.skipped.is_empty());
}

#[test]
fn missing_header_is_a_shape_error() {
    let raw = read_fixture("league_game_log.json").replace("\"PLUS_MINUS\"", "\"PM\"");
    let err = parse_game_log_json(&raw).unwrap_err();
    match err {
        Error::DataShape(DataShapeError::MissingColumn { column, .. }) => {
            assert_eq!(column, "PLUS_MINUS")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn object_rows_missing_a_key_are_rejected() {
    let raw = r#"[{"SEASON_ID":"22019","TEAM_ID":1}]"#;
    assert!(matches!(
        parse_game_log_json(raw),
        Err(Error::DataShape(DataShapeError::MissingColumn { .. }))
    ));
}

#[test]
fn short_game_ids_are_skipped() {
    let raw = read_fixture("league_game_log.json").replace("0021900002", "002190002");
    let rows = parse_game_log_json(&raw).expect("fixture should parse");
    let parsed = pair_games(&rows);
    assert_eq!(parsed.games.len(), 1);
    assert_eq!(parsed.skipped.len(), 2);
}

#[test]
fn parses_betting_lines_fixture() {
    let raw = read_fixture("betting_lines.json");
    let lines = parse_betting_lines_json(&raw).expect("fixture should parse");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].home_spread, -6.5);
    assert_eq!(lines[0].home_spread_result, SpreadResult::Win);
    assert_eq!(lines[1].over_under_result, OverUnderResult::Push);
}

#[test]
fn out_of_range_spread_is_invalid() {
    let raw = read_fixture("betting_lines.json").replace("-6.5", "-31.0");
    match parse_betting_lines_json(&raw).unwrap_err() {
        Error::DataShape(DataShapeError::InvalidValue { column, value, .. }) => {
            assert_eq!(column, "home_spread");
            assert_eq!(value, "-31");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn imports_into_sqlite_and_reads_back() {
    let mut conn = store::open_in_memory().expect("in-memory db");
    let rows = parse_game_log_json(&read_fixture("league_game_log.json")).expect("parse");
    let parsed = pair_games(&rows);
    let summary = import_game_log(&mut conn, "league_game_log.json", &parsed).expect("import");
    assert_eq!(summary.games, 2);
    assert_eq!(summary.skipped.len(), 1);

    let lines = parse_betting_lines_json(&read_fixture("betting_lines.json")).expect("parse");
    let betting = import_betting_lines(&mut conn, "betting_lines.json", &lines).expect("import");
    assert_eq!(betting.betting_lines, 2);
    assert!(betting.run_id > summary.run_id);

    let records = store::load_game_records(&conn, None).expect("load");
    assert_eq!(records.len(), 4);
    let lac = records
        .iter()
        .find(|r| r.game_id == "0021900001" && r.team_id == 1610612746)
        .expect("home record");
    assert!(lac.is_home);
    assert_eq!(lac.team.pts, 112.0);
    assert_eq!(lac.opp.pts, 102.0);
    assert_eq!(lac.team_result(), GameResult::Win);

    let games = store::load_betting_games(&conn, None).expect("betting games");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].line.over_under, 221.5);
}

#[test]
fn reimporting_is_idempotent() {
    let mut conn = store::open_in_memory().expect("in-memory db");
    let rows = parse_game_log_json(&read_fixture("league_game_log.json")).expect("parse");
    let parsed = pair_games(&rows);
    import_game_log(&mut conn, "first", &parsed).expect("import");
    import_game_log(&mut conn, "second", &parsed).expect("import");
    assert_eq!(store::load_game_records(&conn, None).expect("load").len(), 4);
}
