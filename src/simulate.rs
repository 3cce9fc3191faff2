use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::betting::{BettingRow, split_by_season};
use crate::box_score::SpreadResult;
use crate::error::{DataShapeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 400,
            l2: 1e-3,
        }
    }
}

/// Logistic regression on standardised features, fitted by full-batch
/// gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl LogisticModel {
    pub fn fit(x: &[Vec<f64>], y: &[bool], options: &FitOptions) -> Option<Self> {
        let width = x.first()?.len();
        if x.len() != y.len() || x.iter().any(|row| row.len() != width) {
            return None;
        }
        let n = x.len() as f64;

        let mut mean = vec![0.0; width];
        for row in x {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut scale = vec![0.0; width];
        for row in x {
            for ((s, v), m) in scale.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in &mut scale {
            *s = if *s > 0.0 { s.sqrt() } else { 1.0 };
        }

        let mut model = Self {
            weights: vec![0.0; width],
            bias: 0.0,
            mean,
            scale,
        };
        let z: Vec<Vec<f64>> = x.iter().map(|row| model.standardise(row)).collect();

        for _ in 0..options.epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, &label) in z.iter().zip(y) {
                let err = sigmoid(model.logit(row)) - if label { 1.0 } else { 0.0 };
                grad_b += err;
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += err * v;
                }
            }
            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                *w -= options.learning_rate * (g / n + options.l2 * *w);
            }
            model.bias -= options.learning_rate * grad_b / n;
        }
        Some(model)
    }

    pub fn probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.logit(&self.standardise(features)))
    }

    pub fn predict(&self, features: &[f64]) -> bool {
        self.probability(features) >= 0.5
    }

    fn standardise(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn logit(&self, z: &[f64]) -> f64 {
        self.bias + self.weights.iter().zip(z).map(|(w, v)| w * v).sum::<f64>()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Fit once on the seasons before the test season.
    Static,
    /// Refit every `freq` game days, adding each played day to the
    /// training set.
    Evolve { freq: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub home_covered: bool,
    pub predicted: bool,
    pub probability: f64,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        self.home_covered == self.predicted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refit {
    pub date: NaiveDate,
    pub training_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub season: i32,
    pub predictions: Vec<Prediction>,
    pub refits: Vec<Refit>,
}

impl Simulation {
    pub fn bets(&self) -> Vec<(NaiveDate, bool)> {
        self.predictions
            .iter()
            .map(|p| (p.game_date, p.is_correct()))
            .collect()
    }
}

/// Walk-forward home-spread predictions for `season`, trained on complete
/// rows from `[train_start, season)`.
pub fn simulate(
    rows: &[BettingRow],
    train_start: i32,
    season: i32,
    schedule: Schedule,
    options: &FitOptions,
) -> Result<Simulation> {
    let (train, test) = split_by_season(rows, train_start, season, season);
    let mut x: Vec<Vec<f64>> = train.iter().filter_map(BettingRow::features).collect();
    let mut y: Vec<bool> = train.iter().map(home_covered).collect();

    let mut days: BTreeMap<NaiveDate, Vec<&BettingRow>> = BTreeMap::new();
    for row in &test {
        days.entry(row.game_date).or_default().push(row);
    }

    let refit_every = match schedule {
        Schedule::Static => None,
        Schedule::Evolve { freq } => Some(freq.max(1)),
    };

    let mut model = None;
    let mut refits = Vec::new();
    let mut predictions = Vec::with_capacity(test.len());
    for (day_index, (date, games)) in days.into_iter().enumerate() {
        if model.is_none() || refit_every.is_some_and(|f| day_index % f == 0) {
            model = Some(LogisticModel::fit(&x, &y, options).ok_or(
                DataShapeError::EmptyTrainingSet { season },
            )?);
            refits.push(Refit {
                date,
                training_rows: x.len(),
            });
            debug!(%date, training_rows = x.len(), "fitted spread model");
        }
        let Some(fitted) = &model else {
            continue;
        };

        for row in games {
            let Some(features) = row.features() else {
                continue;
            };
            let probability = fitted.probability(&features);
            predictions.push(Prediction {
                game_id: row.game_id.clone(),
                game_date: date,
                home_covered: home_covered(row),
                predicted: probability >= 0.5,
                probability,
            });
            if refit_every.is_some() {
                x.push(features);
                y.push(home_covered(row));
            }
        }
    }

    let correct = predictions.iter().filter(|p| p.is_correct()).count();
    info!(
        season,
        predictions = predictions.len(),
        correct,
        refits = refits.len(),
        "simulated spread picks"
    );
    Ok(Simulation {
        season,
        predictions,
        refits,
    })
}

fn home_covered(row: &BettingRow) -> bool {
    row.home_spread_result == SpreadResult::Win
}
