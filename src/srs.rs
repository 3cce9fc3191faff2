use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::box_score::GameTeamRecord;
use crate::error::{DataShapeError, Result};

pub const DEFAULT_SRS_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentCount {
    pub season: i32,
    pub team_id: u32,
    pub opponent_id: u32,
    pub games: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonRating {
    pub season: i32,
    pub team_id: u32,
    pub rating: f64,
}

/// Games-played matrix for one season, normalised by
/// `(sum of all team-opponent game counts) / N`. Teams are indexed in
/// ascending id order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleMatrix {
    pub teams: Vec<u32>,
    pub weights: Vec<Vec<f64>>,
}

impl ScheduleMatrix {
    pub fn from_counts(counts: &[OpponentCount]) -> Self {
        let teams: Vec<u32> = counts
            .iter()
            .filter(|c| c.games > 0)
            .map(|c| c.team_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: BTreeMap<u32, usize> = teams.iter().enumerate().map(|(i, t)| (*t, i)).collect();

        let n = teams.len();
        let mut weights = vec![vec![0.0; n]; n];
        let mut total_games = 0.0;
        for c in counts {
            total_games += c.games as f64;
            let (Some(i), Some(j)) = (index.get(&c.team_id), index.get(&c.opponent_id)) else {
                continue;
            };
            weights[*i][*j] += c.games as f64;
        }

        let norm = total_games / n as f64;
        for row in &mut weights {
            for w in row.iter_mut() {
                *w /= norm;
            }
        }
        Self { teams, weights }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn mean(&self) -> f64 {
        let n = self.teams.len();
        let sum: f64 = self.weights.iter().flatten().sum();
        sum / (n * n) as f64
    }

    fn dot(&self, v: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }
}

/// Ratings for one season. `point_differentials` maps team id to average
/// plus/minus per game; `schedule` holds that season's opponent counts.
/// Teams without games are left out.
pub fn compute_season_ratings(
    season: i32,
    point_differentials: &BTreeMap<u32, f64>,
    schedule: &[OpponentCount],
    iterations: usize,
) -> Result<Vec<SeasonRating>> {
    let counts: Vec<OpponentCount> = schedule
        .iter()
        .filter(|c| c.season == season)
        .copied()
        .collect();
    let matrix = ScheduleMatrix::from_counts(&counts);

    let mut d = Vec::with_capacity(matrix.len());
    for team_id in &matrix.teams {
        let diff = point_differentials
            .get(team_id)
            .copied()
            .ok_or(DataShapeError::MissingPointDifferential {
                season,
                team_id: *team_id,
            })?;
        d.push(diff);
    }

    let mut rating = d.clone();
    for _ in 0..iterations {
        rating = d
            .iter()
            .zip(matrix.dot(&rating))
            .map(|(di, si)| di + si)
            .collect();
    }

    debug!(season, teams = matrix.len(), iterations, "solved SRS");

    Ok(matrix
        .teams
        .iter()
        .zip(rating)
        .map(|(team_id, rating)| SeasonRating {
            season,
            team_id: *team_id,
            rating,
        })
        .collect())
}

pub fn opponent_counts(records: &[GameTeamRecord]) -> Vec<OpponentCount> {
    let mut counts: BTreeMap<(i32, u32, u32), u32> = BTreeMap::new();
    for r in records {
        *counts.entry((r.season, r.team_id, r.opponent_id)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((season, team_id, opponent_id), games)| OpponentCount {
            season,
            team_id,
            opponent_id,
            games,
        })
        .collect()
}
