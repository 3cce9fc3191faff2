use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::box_score::{GameResult, GameTeamRecord, OverUnderResult, SpreadResult};
use crate::error::Result;
use crate::ratings::{self, MinutesUnit};
use crate::stat_name::StatName;
use crate::store::BettingGame;
use crate::windowed::{self, WindowOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingRow {
    pub season: i32,
    pub game_id: String,
    pub game_date: NaiveDate,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_spread: f64,
    pub home_spread_result: SpreadResult,
    pub over_under: f64,
    pub over_under_result: OverUnderResult,
    pub home_wl: GameResult,
    pub home: Vec<Option<f64>>,
    pub away: Vec<Option<f64>>,
}

impl BettingRow {
    pub fn is_complete(&self) -> bool {
        self.home.iter().chain(&self.away).all(Option::is_some)
    }

    pub fn features(&self) -> Option<Vec<f64>> {
        self.home.iter().chain(&self.away).copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BettingDataset {
    pub names: Vec<StatName>,
    pub rows: Vec<BettingRow>,
}

pub fn betting_dataset(
    records: &[GameTeamRecord],
    games: &[BettingGame],
    stat_names: &[StatName],
    minutes: MinutesUnit,
    window: &WindowOptions,
) -> Result<BettingDataset> {
    let derived = ratings::compute_derived_stats(records, minutes);
    let features = windowed::compute_windowed_features(&derived, stat_names, window)?;

    let mut by_side: HashMap<(&str, u32), usize> = HashMap::with_capacity(features.len());
    for (idx, row) in features.rows.iter().enumerate() {
        by_side.insert((row.game_id.as_str(), row.team_id), idx);
    }

    let mut rows = Vec::with_capacity(games.len());
    let mut pushes = 0usize;
    let mut unmatched = 0usize;
    for bg in games {
        if bg.line.home_spread_result == SpreadResult::Push {
            pushes += 1;
            continue;
        }
        let home = by_side.get(&(bg.game.id.as_str(), bg.game.home_team_id));
        let away = by_side.get(&(bg.game.id.as_str(), bg.game.away_team_id));
        let (Some(&home), Some(&away)) = (home, away) else {
            unmatched += 1;
            continue;
        };
        rows.push(BettingRow {
            season: bg.game.season,
            game_id: bg.game.id.clone(),
            game_date: bg.game.game_date,
            home_team_id: bg.game.home_team_id,
            away_team_id: bg.game.away_team_id,
            home_spread: bg.line.home_spread,
            home_spread_result: bg.line.home_spread_result,
            over_under: bg.line.over_under,
            over_under_result: bg.line.over_under_result,
            home_wl: bg.game.home_wl,
            home: features.rows[home].values.clone(),
            away: features.rows[away].values.clone(),
        });
    }

    info!(
        rows = rows.len(),
        pushes,
        unmatched,
        "built betting dataset"
    );
    Ok(BettingDataset {
        names: features.names,
        rows,
    })
}

/// Drops incomplete rows, then splits into train `[train_start, test_start)`
/// and test `[test_start, end]` by season.
pub fn split_by_season(
    rows: &[BettingRow],
    train_start: i32,
    test_start: i32,
    end: i32,
) -> (Vec<BettingRow>, Vec<BettingRow>) {
    let mut train = Vec::new();
    let mut test = Vec::new();
    for row in rows.iter().filter(|r| r.is_complete()) {
        if (train_start..test_start).contains(&row.season) {
            train.push(row.clone());
        } else if (test_start..=end).contains(&row.season) {
            test.push(row.clone());
        }
    }
    (train, test)
}

/// Flat spread picks from one feature: back the home side when its value
/// beats the away side's. Rows missing that feature are not bet.
pub fn feature_spread_bets(dataset: &BettingDataset, stat: StatName) -> Vec<(NaiveDate, bool)> {
    let Some(col) = dataset.names.iter().position(|n| *n == stat) else {
        return Vec::new();
    };
    dataset
        .rows
        .iter()
        .filter_map(|row| {
            let home = row.home.get(col).copied().flatten()?;
            let away = row.away.get(col).copied().flatten()?;
            let pick = if home > away {
                SpreadResult::Win
            } else {
                SpreadResult::Loss
            };
            Some((row.game_date, pick == row.home_spread_result))
        })
        .collect()
}
