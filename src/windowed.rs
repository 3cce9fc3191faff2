use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::box_score::GameTeamRecord;
use crate::error::{ConfigError, Result};
use crate::ratings::DerivedGameStats;
use crate::stat_name::StatName;

pub trait StatSource {
    fn season(&self) -> i32;
    fn team_id(&self) -> u32;
    fn game_id(&self) -> &str;
    fn stat(&self, name: StatName) -> Option<f64>;
}

impl StatSource for GameTeamRecord {
    fn season(&self) -> i32 {
        self.season
    }

    fn team_id(&self) -> u32 {
        self.team_id
    }

    fn game_id(&self) -> &str {
        &self.game_id
    }

    fn stat(&self, name: StatName) -> Option<f64> {
        match name {
            StatName::Team(c) => Some(self.team.get(c)),
            StatName::Opp(c) => Some(self.opp.get(c)),
            StatName::Advanced(_) => None,
        }
    }
}

impl StatSource for DerivedGameStats {
    fn season(&self) -> i32 {
        self.record.season
    }

    fn team_id(&self) -> u32 {
        self.record.team_id
    }

    fn game_id(&self) -> &str {
        &self.record.game_id
    }

    fn stat(&self, name: StatName) -> Option<f64> {
        match name {
            StatName::Advanced(a) => Some(self.advanced.get(a)),
            other => self.record.stat(other),
        }
    }
}

/// Recency weighting supplied by the caller. `games_ago` is 0 for the most
/// recent game inside the averaging window.
pub trait RecencyWeights: fmt::Debug + Send + Sync {
    fn weight(&self, games_ago: usize) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfLife(pub f64);

impl RecencyWeights for HalfLife {
    fn weight(&self, games_ago: usize) -> f64 {
        0.5_f64.powf(games_ago as f64 / self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowOptions {
    /// Trailing window size; `None` averages every prior game of the season.
    pub window: Option<usize>,
    pub weighted: bool,
    /// Only consulted when `weighted` is set. Without a scheme the
    /// transformer uses the plain mean.
    pub weights: Option<Arc<dyn RecencyWeights>>,
}

impl WindowOptions {
    pub fn expanding() -> Self {
        Self::default()
    }

    pub fn rolling(window: i64) -> std::result::Result<Self, ConfigError> {
        if window <= 0 {
            return Err(ConfigError::InvalidWindow(window));
        }
        Ok(Self {
            window: Some(window as usize),
            ..Self::default()
        })
    }

    pub fn with_weights(mut self, weights: Arc<dyn RecencyWeights>) -> Self {
        self.weighted = true;
        self.weights = Some(weights);
        self
    }

    fn active_weights(&self) -> Option<&dyn RecencyWeights> {
        if self.weighted {
            self.weights.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowedFeatureRow {
    pub season: i32,
    pub team_id: u32,
    pub game_id: String,
    pub game_index: usize,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub names: Vec<StatName>,
    pub rows: Vec<WindowedFeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: StatName) -> Option<usize> {
        self.names.iter().position(|n| *n == name)
    }

    pub fn value(&self, row: usize, name: StatName) -> Option<f64> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.values.get(col).copied().flatten()
    }
}

/// Pre-game features for every row. Means are not NaN-skipping: a NaN game
/// keeps every later expanding value for that team-season NaN, and a rolling
/// value only until the game leaves the window.
pub fn compute_windowed_features<R: StatSource>(
    rows: &[R],
    stat_names: &[StatName],
    options: &WindowOptions,
) -> Result<FeatureTable> {
    if options.window == Some(0) {
        return Err(ConfigError::InvalidWindow(0).into());
    }
    if let Some(first) = rows.first() {
        for name in stat_names {
            if first.stat(*name).is_none() {
                return Err(ConfigError::StatNotInInput(*name).into());
            }
        }
    }

    let values: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            stat_names
                .iter()
                .map(|n| r.stat(*n).unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    let mut order: Vec<(i32, u32)> = Vec::new();
    let mut partitions: HashMap<(i32, u32), Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let key = (row.season(), row.team_id());
        partitions
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(idx);
    }

    let mut out: Vec<Option<WindowedFeatureRow>> = vec![None; rows.len()];
    let weights = options.active_weights();

    for key in &order {
        let indices = &partitions[key];
        let previous = partitions
            .get(&(key.0 - 1, key.1))
            .map(|prev| season_mean(&values, prev, stat_names.len()));

        let mut trailing: Option<Vec<f64>> = None;
        for (game_index, row_idx) in indices.iter().enumerate() {
            let shifted = match (&trailing, game_index) {
                (Some(means), _) => means.iter().map(|v| Some(*v)).collect(),
                (None, 0) => match &previous {
                    Some(means) => means.iter().map(|v| Some(*v)).collect(),
                    None => vec![None; stat_names.len()],
                },
                (None, _) => vec![None; stat_names.len()],
            };

            let row = &rows[*row_idx];
            out[*row_idx] = Some(WindowedFeatureRow {
                season: row.season(),
                team_id: row.team_id(),
                game_id: row.game_id().to_string(),
                game_index,
                values: shifted,
            });

            let start = match options.window {
                Some(w) if game_index + 1 >= w => game_index + 1 - w,
                _ => 0,
            };
            trailing = Some(window_mean(
                &values,
                &indices[start..=game_index],
                stat_names.len(),
                weights,
            ));
        }
    }

    debug!(
        rows = rows.len(),
        partitions = order.len(),
        stats = stat_names.len(),
        "computed windowed features"
    );

    Ok(FeatureTable {
        names: stat_names.to_vec(),
        rows: out.into_iter().flatten().collect(),
    })
}

fn season_mean(values: &[Vec<f64>], indices: &[usize], width: usize) -> Vec<f64> {
    window_mean(values, indices, width, None)
}

fn window_mean(
    values: &[Vec<f64>],
    indices: &[usize],
    width: usize,
    weights: Option<&dyn RecencyWeights>,
) -> Vec<f64> {
    let mut sums = vec![0.0; width];
    let mut total_weight = 0.0;
    let newest = indices.len().saturating_sub(1);
    for (pos, idx) in indices.iter().enumerate() {
        let w = weights.map_or(1.0, |scheme| scheme.weight(newest - pos));
        total_weight += w;
        for (sum, v) in sums.iter_mut().zip(&values[*idx]) {
            *sum += w * v;
        }
    }
    sums.into_iter().map(|s| s / total_weight).collect()
}
