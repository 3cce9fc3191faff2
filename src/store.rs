use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::box_score::{
    BoxScore, Counting, GameResult, GameTeamRecord, OverUnderResult, SeasonType, SpreadResult,
};
use crate::config::app_cache_dir;
use crate::error::DataShapeError;
use crate::srs::OpponentCount;

const DB_FILE: &str = "databall.sqlite";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: u32,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub id: String,
    pub season: i32,
    pub season_type: SeasonType,
    pub game_date: NaiveDate,
    pub matchup: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_wl: GameResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameStatsRow {
    pub team_id: u32,
    pub game_id: String,
    pub stats: BoxScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingLine {
    pub game_id: String,
    pub home_spread: f64,
    pub home_spread_result: SpreadResult,
    pub over_under: f64,
    pub over_under_result: OverUnderResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BettingGame {
    pub game: GameRow,
    pub line: BettingLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSpan {
    pub start: i32,
    pub end: i32,
}

impl SeasonSpan {
    pub fn single(season: i32) -> Self {
        Self {
            start: season,
            end: season,
        }
    }

    pub fn contains(&self, season: i32) -> bool {
        self.start <= season && season <= self.end
    }

    /// The same span widened to include the season before `start`.
    pub fn with_prior(&self) -> Self {
        Self {
            start: self.start - 1,
            end: self.end,
        }
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let counts = Counting::ALL
        .iter()
        .map(|c| {
            let col = column_name(*c);
            if *c == Counting::PlusMinus {
                format!("{col} INTEGER NOT NULL")
            } else {
                format!("{col} INTEGER NOT NULL CHECK ({col} >= 0)")
            }
        })
        .collect::<Vec<_>>()
        .join(",\n            ");

    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .context("set journal mode")?;
    debug!(journal_mode = %mode, "opened sqlite db");

    conn.execute_batch(&format!(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            abbreviation TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS games (
            id TEXT PRIMARY KEY CHECK (length(id) = 10),
            season INTEGER NOT NULL,
            season_type TEXT NOT NULL,
            game_date TEXT NOT NULL,
            matchup TEXT NOT NULL,
            home_team_id INTEGER NOT NULL REFERENCES teams(id),
            away_team_id INTEGER NOT NULL REFERENCES teams(id),
            home_wl TEXT NOT NULL CHECK (home_wl IN ('W', 'L'))
        );
        CREATE INDEX IF NOT EXISTS idx_games_season ON games(season);
        CREATE INDEX IF NOT EXISTS idx_games_date ON games(game_date);

        CREATE TABLE IF NOT EXISTS team_game_stats (
            team_id INTEGER NOT NULL REFERENCES teams(id),
            game_id TEXT NOT NULL REFERENCES games(id),
            {counts},
            PRIMARY KEY (team_id, game_id)
        );
        CREATE INDEX IF NOT EXISTS idx_team_game_stats_game ON team_game_stats(game_id);

        CREATE TABLE IF NOT EXISTS betting (
            game_id TEXT PRIMARY KEY REFERENCES games(id),
            home_spread REAL NOT NULL,
            home_spread_result TEXT NOT NULL CHECK (home_spread_result IN ('W', 'L', 'P')),
            over_under REAL NOT NULL,
            over_under_result TEXT NOT NULL CHECK (over_under_result IN ('O', 'U', 'P'))
        );

        CREATE TABLE IF NOT EXISTS import_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            source TEXT NOT NULL,
            rows_upserted INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#
    ))
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_team(conn: &Connection, team: &TeamRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO teams (id, name, abbreviation) VALUES (?1, ?2, ?3)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            abbreviation = excluded.abbreviation
        "#,
        params![team.id as i64, team.name, team.abbreviation],
    )
    .with_context(|| format!("upsert team {}", team.id))?;
    Ok(())
}

pub fn upsert_game(conn: &Connection, game: &GameRow) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO games (
            id, season, season_type, game_date, matchup,
            home_team_id, away_team_id, home_wl
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            season = excluded.season,
            season_type = excluded.season_type,
            game_date = excluded.game_date,
            matchup = excluded.matchup,
            home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id,
            home_wl = excluded.home_wl
        "#,
        params![
            game.id,
            game.season,
            game.season_type.name(),
            game.game_date.format(DATE_FORMAT).to_string(),
            game.matchup,
            game.home_team_id as i64,
            game.away_team_id as i64,
            game.home_wl.code().to_string(),
        ],
    )
    .with_context(|| format!("upsert game {}", game.id))?;
    Ok(())
}

pub fn upsert_team_game_stats(conn: &Connection, row: &TeamGameStatsRow) -> Result<()> {
    let columns = box_columns("");
    let placeholders = (3..3 + Counting::ALL.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = Counting::ALL
        .iter()
        .map(|c| format!("{0} = excluded.{0}", column_name(*c)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO team_game_stats (team_id, game_id, {columns}) VALUES (?1, ?2, {placeholders})
         ON CONFLICT(team_id, game_id) DO UPDATE SET {updates}"
    );

    let mut values: Vec<i64> = Vec::with_capacity(Counting::ALL.len());
    for c in Counting::ALL {
        values.push(row.stats.get(c).round() as i64);
    }
    let mut stmt = conn
        .prepare_cached(&sql)
        .context("prepare team game stats upsert")?;
    let mut bound: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(values.len() + 2);
    let team_id = row.team_id as i64;
    bound.push(&team_id);
    bound.push(&row.game_id);
    for v in &values {
        bound.push(v);
    }
    stmt.execute(bound.as_slice())
        .with_context(|| format!("upsert stats team {} game {}", row.team_id, row.game_id))?;
    Ok(())
}

pub fn upsert_betting_line(conn: &Connection, line: &BettingLine) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO betting (
            game_id, home_spread, home_spread_result, over_under, over_under_result
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(game_id) DO UPDATE SET
            home_spread = excluded.home_spread,
            home_spread_result = excluded.home_spread_result,
            over_under = excluded.over_under,
            over_under_result = excluded.over_under_result
        "#,
        params![
            line.game_id,
            line.home_spread,
            line.home_spread_result.code().to_string(),
            line.over_under,
            line.over_under_result.code().to_string(),
        ],
    )
    .with_context(|| format!("upsert betting line {}", line.game_id))?;
    Ok(())
}

pub fn record_import_run(
    conn: &Connection,
    source: &str,
    started_at: &str,
    rows_upserted: usize,
    errors: &[String],
) -> Result<i64> {
    let errors_json = serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO import_runs(started_at, finished_at, source, rows_upserted, errors_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            started_at,
            Utc::now().to_rfc3339(),
            source,
            rows_upserted as i64,
            errors_json
        ],
    )
    .context("insert import run")?;
    Ok(conn.last_insert_rowid())
}

pub fn seasons(conn: &Connection) -> Result<Vec<i32>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT season FROM games ORDER BY season ASC")
        .context("prepare seasons query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, i32>(0))
        .context("query seasons")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode season")?);
    }
    Ok(out)
}

pub fn team_abbreviation(conn: &Connection, team_id: u32) -> Result<Option<String>> {
    conn.query_row(
        "SELECT abbreviation FROM teams WHERE id = ?1",
        params![team_id as i64],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .context("query team abbreviation")
}

/// Two rows per game, one from each team's side, in chronological order
/// (season, date, game id, team id).
pub fn load_game_records(
    conn: &Connection,
    span: Option<SeasonSpan>,
) -> Result<Vec<GameTeamRecord>> {
    let sql = format!(
        r#"
        SELECT
            g.season, g.id, g.game_date, t.team_id, o.team_id, g.home_team_id, g.home_wl,
            {team_cols},
            {opp_cols}
        FROM team_game_stats t
        JOIN team_game_stats o ON o.game_id = t.game_id AND o.team_id != t.team_id
        JOIN games g ON g.id = t.game_id
        WHERE (?1 IS NULL OR g.season >= ?1)
          AND (?2 IS NULL OR g.season <= ?2)
        ORDER BY g.season ASC, g.game_date ASC, g.id ASC, t.team_id ASC
        "#,
        team_cols = box_columns("t."),
        opp_cols = box_columns("o."),
    );
    let mut stmt = conn.prepare(&sql).context("prepare game records query")?;
    let (start, end) = span_params(span);
    let rows = stmt
        .query_map(params![start, end], |row| {
            let team_id = row.get::<_, u32>(3)?;
            let home_team_id = row.get::<_, u32>(5)?;
            Ok(GameTeamRecord {
                season: row.get(0)?,
                game_id: row.get(1)?,
                game_date: parse_date(&row.get::<_, String>(2)?),
                team_id,
                opponent_id: row.get::<_, u32>(4)?,
                is_home: team_id == home_team_id,
                home_wl: decode_game_result(row, 6)?,
                team: read_box(row, 7)?,
                opp: read_box(row, 7 + Counting::ALL.len())?,
            })
        })
        .context("query game records")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode game record")?);
    }
    debug!(records = out.len(), "loaded game records");
    Ok(out)
}

/// Records for windowed features over `span`. The season before the span is
/// loaded too so opening games can be backfilled from it.
pub fn load_feature_records(
    conn: &Connection,
    span: Option<SeasonSpan>,
) -> Result<Vec<GameTeamRecord>> {
    load_game_records(conn, span.map(|s| s.with_prior()))
}

pub fn load_opponent_counts(conn: &Connection, season: i32) -> Result<Vec<OpponentCount>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT g.season, t.team_id, o.team_id, COUNT(*)
            FROM team_game_stats t
            JOIN team_game_stats o ON o.game_id = t.game_id AND o.team_id != t.team_id
            JOIN games g ON g.id = t.game_id
            WHERE g.season = ?1
            GROUP BY g.season, t.team_id, o.team_id
            ORDER BY t.team_id ASC, o.team_id ASC
            "#,
        )
        .context("prepare opponent counts query")?;
    let rows = stmt
        .query_map(params![season], |row| {
            Ok(OpponentCount {
                season: row.get(0)?,
                team_id: row.get(1)?,
                opponent_id: row.get(2)?,
                games: row.get(3)?,
            })
        })
        .context("query opponent counts")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode opponent count")?);
    }
    Ok(out)
}

pub fn load_betting_games(conn: &Connection, span: Option<SeasonSpan>) -> Result<Vec<BettingGame>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                g.id, g.season, g.season_type, g.game_date, g.matchup,
                g.home_team_id, g.away_team_id, g.home_wl,
                b.home_spread, b.home_spread_result, b.over_under, b.over_under_result
            FROM games g
            JOIN betting b ON b.game_id = g.id
            WHERE (?1 IS NULL OR g.season >= ?1)
              AND (?2 IS NULL OR g.season <= ?2)
            ORDER BY g.season ASC, g.game_date ASC, g.id ASC
            "#,
        )
        .context("prepare betting games query")?;
    let (start, end) = span_params(span);
    let rows = stmt
        .query_map(params![start, end], |row| {
            let id: String = row.get(0)?;
            let season_type_raw: String = row.get(2)?;
            let season_type = SeasonType::from_name(&season_type_raw)
                .ok_or_else(|| invalid_text(2, "games", "season_type", season_type_raw))?;
            let date_raw: String = row.get(3)?;
            let game_date = parse_date(&date_raw)
                .ok_or_else(|| invalid_text(3, "games", "game_date", date_raw))?;
            let spread_raw: String = row.get(9)?;
            let home_spread_result = SpreadResult::from_code(&spread_raw)
                .ok_or_else(|| invalid_text(9, "betting", "home_spread_result", spread_raw))?;
            let ou_raw: String = row.get(11)?;
            let over_under_result = OverUnderResult::from_code(&ou_raw)
                .ok_or_else(|| invalid_text(11, "betting", "over_under_result", ou_raw))?;
            Ok(BettingGame {
                game: GameRow {
                    id: id.clone(),
                    season: row.get(1)?,
                    season_type,
                    game_date,
                    matchup: row.get(4)?,
                    home_team_id: row.get(5)?,
                    away_team_id: row.get(6)?,
                    home_wl: decode_game_result(row, 7)?,
                },
                line: BettingLine {
                    game_id: id,
                    home_spread: row.get(8)?,
                    home_spread_result,
                    over_under: row.get(10)?,
                    over_under_result,
                },
            })
        })
        .context("query betting games")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode betting game")?);
    }
    Ok(out)
}

fn column_name(stat: Counting) -> String {
    stat.column().to_ascii_lowercase()
}

fn box_columns(prefix: &str) -> String {
    Counting::ALL
        .iter()
        .map(|c| format!("{prefix}{}", column_name(*c)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_box(row: &Row<'_>, offset: usize) -> rusqlite::Result<BoxScore> {
    let mut out = BoxScore::default();
    for (i, stat) in Counting::ALL.iter().enumerate() {
        out.set(*stat, row.get::<_, f64>(offset + i)?);
    }
    Ok(out)
}

fn decode_game_result(row: &Row<'_>, idx: usize) -> rusqlite::Result<GameResult> {
    let raw: String = row.get(idx)?;
    GameResult::from_code(&raw).ok_or_else(|| invalid_text(idx, "games", "home_wl", raw))
}

fn invalid_text(idx: usize, table: &'static str, column: &'static str, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(DataShapeError::InvalidValue {
            table,
            column,
            value,
        }),
    )
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn span_params(span: Option<SeasonSpan>) -> (Option<i32>, Option<i32>) {
    match span {
        Some(s) => (Some(s.start), Some(s.end)),
        None => (None, None),
    }
}
