use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::box_score::Counting;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdvancedStat {
    Pace,
    Possessions,
    OffRating,
    DefRating,
    NetRating,
    EffFgPct,
    TovPct,
    OrebPct,
    DrebPct,
    FtPerFga,
    FourFactors,
    FourFactorsReb,
}

impl AdvancedStat {
    pub const ALL: [AdvancedStat; 12] = [
        AdvancedStat::OffRating,
        AdvancedStat::DefRating,
        AdvancedStat::NetRating,
        AdvancedStat::EffFgPct,
        AdvancedStat::TovPct,
        AdvancedStat::OrebPct,
        AdvancedStat::DrebPct,
        AdvancedStat::FtPerFga,
        AdvancedStat::FourFactors,
        AdvancedStat::FourFactorsReb,
        AdvancedStat::Pace,
        AdvancedStat::Possessions,
    ];

    pub fn column(self) -> &'static str {
        match self {
            AdvancedStat::Pace => "PACE",
            AdvancedStat::Possessions => "POSSESSIONS",
            AdvancedStat::OffRating => "TEAM_OFF_RTG",
            AdvancedStat::DefRating => "TEAM_DEF_RTG",
            AdvancedStat::NetRating => "TEAM_NET_RTG",
            AdvancedStat::EffFgPct => "TEAM_EFG",
            AdvancedStat::TovPct => "TEAM_TOV_PCT",
            AdvancedStat::OrebPct => "TEAM_OREB_PCT",
            AdvancedStat::DrebPct => "TEAM_DREB_PCT",
            AdvancedStat::FtPerFga => "TEAM_FT_PER_FGA",
            AdvancedStat::FourFactors => "TEAM_FOUR_FACTORS",
            AdvancedStat::FourFactorsReb => "TEAM_FOUR_FACTORS_REB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatName {
    Team(Counting),
    Opp(Counting),
    Advanced(AdvancedStat),
}

const TEAM_PREFIX: &str = "TEAM_";
const OPP_PREFIX: &str = "OPP_";

const DEFAULT_COUNTING: [Counting; 13] = [
    Counting::Fgm,
    Counting::Fga,
    Counting::Fg3m,
    Counting::Fg3a,
    Counting::Ftm,
    Counting::Fta,
    Counting::Oreb,
    Counting::Dreb,
    Counting::Reb,
    Counting::Ast,
    Counting::Tov,
    Counting::Stl,
    Counting::Blk,
];

impl StatName {
    /// Team and opponent shooting/rebounding counts followed by every
    /// advanced stat; the feature set used for the betting dataset.
    pub fn default_features() -> Vec<StatName> {
        let mut out = Vec::with_capacity(DEFAULT_COUNTING.len() * 2 + AdvancedStat::ALL.len());
        out.extend(DEFAULT_COUNTING.iter().map(|c| StatName::Team(*c)));
        out.extend(DEFAULT_COUNTING.iter().map(|c| StatName::Opp(*c)));
        out.extend(AdvancedStat::ALL.iter().map(|a| StatName::Advanced(*a)));
        out
    }

    pub fn parse_list(raw: &str) -> Result<Vec<StatName>, ConfigError> {
        raw.split([',', ' ', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(StatName::from_str)
            .collect()
    }
}

impl fmt::Display for StatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatName::Team(c) => write!(f, "{TEAM_PREFIX}{}", c.column()),
            StatName::Opp(c) => write!(f, "{OPP_PREFIX}{}", c.column()),
            StatName::Advanced(a) => f.write_str(a.column()),
        }
    }
}

impl FromStr for StatName {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim().to_ascii_uppercase();
        if let Some(a) = AdvancedStat::ALL.into_iter().find(|a| a.column() == name) {
            return Ok(StatName::Advanced(a));
        }
        if let Some(c) = name.strip_prefix(TEAM_PREFIX).and_then(Counting::from_column) {
            return Ok(StatName::Team(c));
        }
        if let Some(c) = name.strip_prefix(OPP_PREFIX).and_then(Counting::from_column) {
            return Ok(StatName::Opp(c));
        }
        Err(ConfigError::UnknownStat(raw.trim().to_string()))
    }
}
