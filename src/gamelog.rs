use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::box_score::{BoxScore, Counting, GameResult, OverUnderResult, SeasonType, SpreadResult};
use crate::error::{DataShapeError, Result};
use crate::store::{self, BettingLine, GameRow, TeamGameStatsRow, TeamRow};

const TABLE: &str = "game log";
const GAME_ID_LEN: usize = 10;

const ID_COLUMNS: [&str; 8] = [
    "SEASON_ID",
    "TEAM_ID",
    "TEAM_ABBREVIATION",
    "TEAM_NAME",
    "GAME_ID",
    "GAME_DATE",
    "MATCHUP",
    "WL",
];

#[derive(Debug, Clone, PartialEq)]
pub struct GameLogRow {
    pub season: i32,
    pub season_type: SeasonType,
    pub team_id: u32,
    pub team_abbreviation: String,
    pub team_name: String,
    pub game_id: String,
    pub game_date: NaiveDate,
    pub matchup: String,
    pub wl: Option<GameResult>,
    pub stats: BoxScore,
}

impl GameLogRow {
    pub fn is_away(&self) -> bool {
        self.matchup.contains('@')
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGameLog {
    pub teams: Vec<TeamRow>,
    pub games: Vec<GameRow>,
    pub stats: Vec<TeamGameStatsRow>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub run_id: i64,
    pub teams: usize,
    pub games: usize,
    pub stat_rows: usize,
    pub betting_lines: usize,
    pub skipped: Vec<String>,
}

/// Parses every row of a game log; a missing required header fails the
/// whole file.
pub fn parse_game_log_json(raw: &str) -> Result<Vec<GameLogRow>> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let (headers, rows) = table_from_value(&value)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        index.insert(h.as_str(), i);
    }
    let required = ID_COLUMNS
        .iter()
        .copied()
        .chain(Counting::ALL.iter().map(|c| c.column()));
    for col in required {
        if !index.contains_key(col) {
            return Err(missing(col).into());
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(parse_row(row, &index)?);
    }
    Ok(out)
}

/// Pairs home and away rows into games. Rows that cannot be paired are
/// reported in `skipped`.
pub fn pair_games(rows: &[GameLogRow]) -> ParsedGameLog {
    let mut order: Vec<&str> = Vec::new();
    let mut by_game: HashMap<&str, Vec<&GameLogRow>> = HashMap::new();
    let mut teams: BTreeMap<u32, TeamRow> = BTreeMap::new();

    for row in rows {
        by_game
            .entry(row.game_id.as_str())
            .or_insert_with(|| {
                order.push(row.game_id.as_str());
                Vec::new()
            })
            .push(row);
    }

    let mut out = ParsedGameLog::default();
    for game_id in order {
        let sides = &by_game[game_id];
        if !is_valid_game_id(game_id) {
            out.skipped.push(format!("game {game_id}: id is not {GAME_ID_LEN} digits"));
            continue;
        }
        let home: Vec<&&GameLogRow> = sides.iter().filter(|r| !r.is_away()).collect();
        let away: Vec<&&GameLogRow> = sides.iter().filter(|r| r.is_away()).collect();
        let (&[home], &[away]) = (home.as_slice(), away.as_slice()) else {
            out.skipped.push(format!(
                "game {game_id}: expected one home and one away row, got {} rows",
                sides.len()
            ));
            continue;
        };
        let Some(home_wl) = home.wl else {
            out.skipped.push(format!("game {game_id}: home row has no result"));
            continue;
        };

        for side in [home, away] {
            teams.entry(side.team_id).or_insert_with(|| TeamRow {
                id: side.team_id,
                name: side.team_name.clone(),
                abbreviation: side.team_abbreviation.clone(),
            });
            out.stats.push(TeamGameStatsRow {
                team_id: side.team_id,
                game_id: game_id.to_string(),
                stats: side.stats,
            });
        }
        out.games.push(GameRow {
            id: game_id.to_string(),
            season: home.season,
            season_type: home.season_type,
            game_date: home.game_date,
            matchup: home.matchup.clone(),
            home_team_id: home.team_id,
            away_team_id: away.team_id,
            home_wl,
        });
    }

    out.teams = teams.into_values().collect();
    for reason in &out.skipped {
        warn!("{reason}");
    }
    out
}

#[derive(Debug, Clone, Deserialize)]
struct BettingLineInput {
    game_id: String,
    home_spread: f64,
    home_spread_result: String,
    over_under: f64,
    over_under_result: String,
}

pub fn parse_betting_lines_json(raw: &str) -> Result<Vec<BettingLine>> {
    let inputs: Vec<BettingLineInput> = serde_json::from_str(raw.trim())?;
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        out.push(validate_betting_line(input)?);
    }
    Ok(out)
}

fn validate_betting_line(input: BettingLineInput) -> Result<BettingLine> {
    if !is_valid_game_id(&input.game_id) {
        return Err(bad("game_id", input.game_id).into());
    }
    if !is_half_point(input.home_spread) || !(-30.0..=30.0).contains(&input.home_spread) {
        return Err(bad("home_spread", input.home_spread.to_string()).into());
    }
    if !is_half_point(input.over_under) || !(100.0..=300.0).contains(&input.over_under) {
        return Err(bad("over_under", input.over_under.to_string()).into());
    }
    let home_spread_result = SpreadResult::from_code(&input.home_spread_result)
        .ok_or_else(|| bad("home_spread_result", input.home_spread_result.clone()))?;
    let over_under_result = OverUnderResult::from_code(&input.over_under_result)
        .ok_or_else(|| bad("over_under_result", input.over_under_result.clone()))?;
    Ok(BettingLine {
        game_id: input.game_id,
        home_spread: input.home_spread,
        home_spread_result,
        over_under: input.over_under,
        over_under_result,
    })
}

pub fn import_game_log(
    conn: &mut Connection,
    source: &str,
    parsed: &ParsedGameLog,
) -> anyhow::Result<ImportSummary> {
    let started_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin import transaction")?;
    for team in &parsed.teams {
        store::upsert_team(&tx, team)?;
    }
    for game in &parsed.games {
        store::upsert_game(&tx, game)?;
    }
    for row in &parsed.stats {
        store::upsert_team_game_stats(&tx, row)?;
    }
    let upserted = parsed.teams.len() + parsed.games.len() + parsed.stats.len();
    let run_id = store::record_import_run(&tx, source, &started_at, upserted, &parsed.skipped)?;
    tx.commit().context("commit import transaction")?;

    info!(
        source,
        teams = parsed.teams.len(),
        games = parsed.games.len(),
        skipped = parsed.skipped.len(),
        "imported game log"
    );
    Ok(ImportSummary {
        run_id,
        teams: parsed.teams.len(),
        games: parsed.games.len(),
        stat_rows: parsed.stats.len(),
        betting_lines: 0,
        skipped: parsed.skipped.clone(),
    })
}

pub fn import_betting_lines(
    conn: &mut Connection,
    source: &str,
    lines: &[BettingLine],
) -> anyhow::Result<ImportSummary> {
    let started_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin betting import transaction")?;
    for line in lines {
        store::upsert_betting_line(&tx, line)?;
    }
    let run_id = store::record_import_run(&tx, source, &started_at, lines.len(), &[])?;
    tx.commit().context("commit betting import transaction")?;

    info!(source, lines = lines.len(), "imported betting lines");
    Ok(ImportSummary {
        run_id,
        teams: 0,
        games: 0,
        stat_rows: 0,
        betting_lines: lines.len(),
        skipped: Vec::new(),
    })
}

pub fn is_valid_game_id(id: &str) -> bool {
    id.len() == GAME_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

fn table_from_value(value: &Value) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    if let Some(arr) = value.as_array() {
        let headers: Vec<String> = ID_COLUMNS
            .iter()
            .copied()
            .chain(Counting::ALL.iter().map(|c| c.column()))
            .map(str::to_string)
            .collect();
        let mut rows = Vec::with_capacity(arr.len());
        for item in arr {
            let mut row = Vec::with_capacity(headers.len());
            for h in &headers {
                let v = item.get(h.as_str()).ok_or_else(|| missing(h))?;
                row.push(v.clone());
            }
            rows.push(row);
        }
        return Ok((headers, rows));
    }

    let set = value
        .get("resultSets")
        .and_then(|v| v.as_array())
        .and_then(|sets| sets.first())
        .or_else(|| value.get("resultSet"))
        .ok_or_else(|| missing("resultSets"))?;
    let headers = set
        .get("headers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| missing("headers"))?
        .iter()
        .filter_map(|h| h.as_str().map(|s| s.to_ascii_uppercase()))
        .collect::<Vec<_>>();
    let rows = set
        .get("rowSet")
        .and_then(|v| v.as_array())
        .ok_or_else(|| missing("rowSet"))?
        .iter()
        .filter_map(|r| r.as_array().cloned())
        .collect::<Vec<_>>();
    Ok((headers, rows))
}

fn parse_row(row: &[Value], index: &HashMap<&str, usize>) -> Result<GameLogRow> {
    let cell = |col: &'static str| {
        index
            .get(col)
            .and_then(|i| row.get(*i))
            .ok_or_else(|| missing(col))
    };

    let season_id = as_string_any(cell("SEASON_ID")?).ok_or_else(|| bad("SEASON_ID", ""))?;
    let (season_type, season) = parse_season_id(&season_id)?;
    let team_id = as_u64_any(cell("TEAM_ID")?)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| bad("TEAM_ID", cell_text(row, index, "TEAM_ID")))?;
    let game_id = as_string_any(cell("GAME_ID")?).ok_or_else(|| bad("GAME_ID", ""))?;
    let date_raw = as_string_any(cell("GAME_DATE")?).unwrap_or_default();
    let game_date = parse_game_date(&date_raw).ok_or_else(|| bad("GAME_DATE", date_raw.clone()))?;
    let matchup = as_string_any(cell("MATCHUP")?).unwrap_or_default();
    let wl = as_string_any(cell("WL")?).and_then(|s| GameResult::from_code(&s));

    let mut stats = BoxScore::default();
    for stat in Counting::ALL {
        let col = stat.column();
        let v = as_f64_any(cell(col)?).ok_or_else(|| bad(col, cell_text(row, index, col)))?;
        stats.set(stat, v);
    }

    Ok(GameLogRow {
        season,
        season_type,
        team_id,
        team_abbreviation: as_string_any(cell("TEAM_ABBREVIATION")?).unwrap_or_default(),
        team_name: as_string_any(cell("TEAM_NAME")?).unwrap_or_default(),
        game_id,
        game_date,
        matchup,
        wl,
        stats,
    })
}

/// `22019` is the 2019 regular season, `42019` the 2019 playoffs.
fn parse_season_id(raw: &str) -> Result<(SeasonType, i32)> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let kind = chars.next().ok_or_else(|| bad("SEASON_ID", raw.to_string()))?;
    let season = chars
        .as_str()
        .parse::<i32>()
        .map_err(|_| bad("SEASON_ID", raw.to_string()))?;
    let season_type = if kind == '4' {
        SeasonType::Playoffs
    } else {
        SeasonType::Regular
    };
    Ok((season_type, season))
}

fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%b %d, %Y"))
        .ok()
}

fn is_half_point(v: f64) -> bool {
    (v * 2.0).fract() == 0.0
}

fn missing(col: &str) -> DataShapeError {
    DataShapeError::MissingColumn {
        table: TABLE,
        column: col.to_string(),
    }
}

fn bad(column: &'static str, value: impl Into<String>) -> DataShapeError {
    DataShapeError::InvalidValue {
        table: TABLE,
        column,
        value: value.into(),
    }
}

fn cell_text(row: &[Value], index: &HashMap<&str, usize>, col: &str) -> String {
    index
        .get(col)
        .and_then(|i| row.get(*i))
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn as_string_any(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_u64_any(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<u64>().ok()
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_id_prefix_selects_season_type() {
        assert_eq!(parse_season_id("22019").unwrap(), (SeasonType::Regular, 2019));
        assert_eq!(parse_season_id("42018").unwrap(), (SeasonType::Playoffs, 2018));
        assert!(parse_season_id("2").is_err());
    }

    #[test]
    fn game_ids_must_be_ten_digits() {
        assert!(is_valid_game_id("0021900001"));
        assert!(!is_valid_game_id("002190001"));
        assert!(!is_valid_game_id("00219000a1"));
    }

    #[test]
    fn dates_accept_iso_and_long_forms() {
        let d = NaiveDate::from_ymd_opt(2019, 10, 22).unwrap();
        assert_eq!(parse_game_date("2019-10-22"), Some(d));
        assert_eq!(parse_game_date("2019-10-22T00:00:00"), Some(d));
        assert_eq!(parse_game_date("OCT 22, 2019"), Some(d));
    }

    #[test]
    fn betting_lines_are_range_checked() {
        let ok = r#"[{"game_id":"0021900001","home_spread":-5.5,"home_spread_result":"W","over_under":221.0,"over_under_result":"O"}]"#;
        assert_eq!(parse_betting_lines_json(ok).unwrap().len(), 1);
        let off_grid = ok.replace("-5.5", "-5.25");
        assert!(parse_betting_lines_json(&off_grid).is_err());
        let low_total = ok.replace("221.0", "99.5");
        assert!(parse_betting_lines_json(&low_total).is_err());
        let bad_code = ok.replace("\"O\"", "\"X\"");
        assert!(parse_betting_lines_json(&bad_code).is_err());
    }
}
