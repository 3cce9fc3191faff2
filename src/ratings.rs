use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::box_score::{BoxScore, GameTeamRecord, TeamOpp};
use crate::error::ConfigError;
use crate::stat_name::AdvancedStat;

pub const MINUTES_PER_GAME: f64 = 240.0;
const PLAYERS_ON_COURT: f64 = 5.0;

// Four Factors weights.
const W_EFG: f64 = 0.4;
const W_OREB: f64 = 0.2;
const W_OREB_SPLIT: f64 = 0.1;
const W_DREB_SPLIT: f64 = 0.1;
const W_FTR: f64 = 0.15;
const W_TOV: f64 = 0.25;

/// How `TEAM_MIN` is expressed in the input table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinutesUnit {
    /// Look at the first row of the table: below 240 means game-clock
    /// minutes and the whole column is multiplied by 5.
    #[default]
    Infer,
    /// Game-clock minutes (48 for regulation); always multiplied by 5.
    Game,
    /// Minutes summed over players (240 for regulation).
    PlayerSum,
}

impl FromStr for MinutesUnit {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "infer" => Ok(MinutesUnit::Infer),
            "game" => Ok(MinutesUnit::Game),
            "player-sum" | "player_sum" | "players" => Ok(MinutesUnit::PlayerSum),
            other => Err(ConfigError::InvalidSetting {
                key: "minutes unit".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl MinutesUnit {
    fn factor<R: TeamOpp>(self, rows: &[R]) -> f64 {
        match self {
            MinutesUnit::Infer => match rows.first() {
                Some(first) if first.team().min < MINUTES_PER_GAME => PLAYERS_ON_COURT,
                _ => 1.0,
            },
            MinutesUnit::Game => PLAYERS_ON_COURT,
            MinutesUnit::PlayerSum => 1.0,
        }
    }
}

pub fn possessions(team: &BoxScore, opp: &BoxScore) -> f64 {
    (team.fga + 0.4 * team.fta + team.tov
        - 1.07 * (team.oreb / (team.oreb + opp.dreb)) * (team.fga - team.fgm)
        + opp.fga
        + 0.4 * opp.fta
        + opp.tov
        - 1.07 * (opp.oreb / (opp.oreb + team.dreb)) * (opp.fga - opp.fgm))
        / 2.0
}

/// Possessions per 240 player-minutes for every row. The minutes unit is
/// decided once for the whole table.
pub fn pace<R: TeamOpp>(rows: &[R], unit: MinutesUnit) -> Vec<f64> {
    let factor = unit.factor(rows);
    rows.iter()
        .map(|r| pace_with_factor(r.team(), r.opp(), factor))
        .collect()
}

fn pace_with_factor(team: &BoxScore, opp: &BoxScore, factor: f64) -> f64 {
    possessions(team, opp) / (team.min * factor) * MINUTES_PER_GAME
}

pub fn off_rating(team: &BoxScore, opp: &BoxScore) -> f64 {
    100.0 * team.pts / possessions(team, opp)
}

pub fn def_rating(team: &BoxScore, opp: &BoxScore) -> f64 {
    100.0 * opp.pts / possessions(team, opp)
}

pub fn oreb_pct(team: &BoxScore, opp: &BoxScore) -> f64 {
    team.oreb / (team.oreb + opp.dreb)
}

pub fn dreb_pct(team: &BoxScore, opp: &BoxScore) -> f64 {
    team.dreb / (team.dreb + opp.oreb)
}

pub fn reb_pct(team: &BoxScore, opp: &BoxScore) -> f64 {
    team.reb / (team.reb + opp.reb)
}

pub fn ast_pct(team: &BoxScore) -> f64 {
    team.ast / team.fgm
}

pub fn blk_pct(team: &BoxScore, opp: &BoxScore) -> f64 {
    team.blk / (opp.fga - opp.fg3a)
}

pub fn stl_pct(team: &BoxScore, opp: &BoxScore) -> f64 {
    team.stl / possessions(team, opp)
}

pub fn four_factors(efg: f64, oreb: f64, ftr: f64, tov: f64) -> f64 {
    W_EFG * efg + W_OREB * oreb + W_FTR * ftr - W_TOV * tov
}

pub fn four_factors_reb(efg: f64, oreb: f64, dreb: f64, ftr: f64, tov: f64) -> f64 {
    W_EFG * efg + W_OREB_SPLIT * oreb + W_DREB_SPLIT * dreb + W_FTR * ftr - W_TOV * tov
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvancedStats {
    pub pace: f64,
    pub possessions: f64,
    pub off_rating: f64,
    pub def_rating: f64,
    pub net_rating: f64,
    pub eff_fg_pct: f64,
    pub tov_pct: f64,
    pub oreb_pct: f64,
    pub dreb_pct: f64,
    pub ft_per_fga: f64,
    pub four_factors: f64,
    pub four_factors_reb: f64,
}

impl AdvancedStats {
    fn compute(team: &BoxScore, opp: &BoxScore, minutes_factor: f64) -> Self {
        let off = off_rating(team, opp);
        let def = def_rating(team, opp);
        let efg = team.eff_fg_pct();
        let tov = team.tov_pct();
        let oreb = oreb_pct(team, opp);
        let dreb = dreb_pct(team, opp);
        let ftr = team.ft_per_fga();
        Self {
            pace: pace_with_factor(team, opp, minutes_factor),
            possessions: possessions(team, opp),
            off_rating: off,
            def_rating: def,
            net_rating: off - def,
            eff_fg_pct: efg,
            tov_pct: tov,
            oreb_pct: oreb,
            dreb_pct: dreb,
            ft_per_fga: ftr,
            four_factors: four_factors(efg, oreb, ftr, tov),
            four_factors_reb: four_factors_reb(efg, oreb, dreb, ftr, tov),
        }
    }

    pub fn get(&self, stat: AdvancedStat) -> f64 {
        match stat {
            AdvancedStat::Pace => self.pace,
            AdvancedStat::Possessions => self.possessions,
            AdvancedStat::OffRating => self.off_rating,
            AdvancedStat::DefRating => self.def_rating,
            AdvancedStat::NetRating => self.net_rating,
            AdvancedStat::EffFgPct => self.eff_fg_pct,
            AdvancedStat::TovPct => self.tov_pct,
            AdvancedStat::OrebPct => self.oreb_pct,
            AdvancedStat::DrebPct => self.dreb_pct,
            AdvancedStat::FtPerFga => self.ft_per_fga,
            AdvancedStat::FourFactors => self.four_factors,
            AdvancedStat::FourFactorsReb => self.four_factors_reb,
        }
    }
}

pub fn advanced_stats<R: TeamOpp>(rows: &[R], unit: MinutesUnit) -> Vec<AdvancedStats> {
    let factor = unit.factor(rows);
    rows.iter()
        .map(|r| AdvancedStats::compute(r.team(), r.opp(), factor))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedGameStats {
    pub record: GameTeamRecord,
    pub advanced: AdvancedStats,
}

impl TeamOpp for DerivedGameStats {
    fn team(&self) -> &BoxScore {
        &self.record.team
    }

    fn opp(&self) -> &BoxScore {
        &self.record.opp
    }
}

pub fn compute_derived_stats(
    records: &[GameTeamRecord],
    unit: MinutesUnit,
) -> Vec<DerivedGameStats> {
    advanced_stats(records, unit)
        .into_iter()
        .zip(records)
        .map(|(advanced, record)| DerivedGameStats {
            record: record.clone(),
            advanced,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_factor_weights_are_fixed() {
        let v = four_factors(0.5, 0.25, 0.2, 0.12);
        assert!((v - (0.2 + 0.05 + 0.03 - 0.03)).abs() < 1e-12);
        let r = four_factors_reb(0.5, 0.25, 0.75, 0.2, 0.12);
        assert!((r - (0.2 + 0.025 + 0.075 + 0.03 - 0.03)).abs() < 1e-12);
    }

    #[test]
    fn minutes_unit_parses_known_spellings() {
        assert_eq!("GAME".parse::<MinutesUnit>(), Ok(MinutesUnit::Game));
        assert_eq!("player-sum".parse::<MinutesUnit>(), Ok(MinutesUnit::PlayerSum));
        assert_eq!("".parse::<MinutesUnit>(), Ok(MinutesUnit::Infer));
        assert!("hours".parse::<MinutesUnit>().is_err());
    }
}
