use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::box_score::{BoxScore, GameTeamRecord, TeamOpp};
use crate::error::Result;
use crate::ratings::{self, AdvancedStats, MinutesUnit};
use crate::srs::{self, DEFAULT_SRS_ITERATIONS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTeamStats {
    pub season: i32,
    pub team_id: u32,
    pub games: usize,
    pub team: BoxScore,
    pub opp: BoxScore,
}

impl TeamOpp for SeasonTeamStats {
    fn team(&self) -> &BoxScore {
        &self.team
    }

    fn opp(&self) -> &BoxScore {
        &self.opp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub stats: SeasonTeamStats,
    pub advanced: AdvancedStats,
    pub srs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonOptions {
    pub minutes: MinutesUnit,
    pub srs_iterations: usize,
}

impl Default for SeasonOptions {
    fn default() -> Self {
        Self {
            minutes: MinutesUnit::Infer,
            srs_iterations: DEFAULT_SRS_ITERATIONS,
        }
    }
}

pub fn season_stats(records: &[GameTeamRecord]) -> Vec<SeasonTeamStats> {
    let mut groups: BTreeMap<(i32, u32), Vec<&GameTeamRecord>> = BTreeMap::new();
    for r in records {
        groups.entry((r.season, r.team_id)).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|((season, team_id), rows)| SeasonTeamStats {
            season,
            team_id,
            games: rows.len(),
            team: BoxScore::mean(rows.iter().map(|r| &r.team)),
            opp: BoxScore::mean(rows.iter().map(|r| &r.opp)),
        })
        .collect()
}

pub fn season_ratings(
    records: &[GameTeamRecord],
    options: SeasonOptions,
) -> Result<Vec<SeasonSummary>> {
    let stats = season_stats(records);
    let advanced = ratings::advanced_stats(&stats, options.minutes);
    let counts = srs::opponent_counts(records);

    let mut diffs_by_season: BTreeMap<i32, BTreeMap<u32, f64>> = BTreeMap::new();
    for s in &stats {
        diffs_by_season
            .entry(s.season)
            .or_default()
            .insert(s.team_id, s.team.plus_minus);
    }

    let mut srs_by_team: HashMap<(i32, u32), f64> = HashMap::new();
    for (season, diffs) in &diffs_by_season {
        let ratings = srs::compute_season_ratings(*season, diffs, &counts, options.srs_iterations)?;
        for r in ratings {
            srs_by_team.insert((r.season, r.team_id), r.rating);
        }
    }

    info!(
        seasons = diffs_by_season.len(),
        teams = stats.len(),
        "computed season ratings"
    );

    Ok(stats
        .into_iter()
        .zip(advanced)
        .map(|(stats, advanced)| {
            let srs = srs_by_team
                .get(&(stats.season, stats.team_id))
                .copied()
                .unwrap_or(f64::NAN);
            SeasonSummary {
                stats,
                advanced,
                srs,
            }
        })
        .collect())
}
