use std::fmt;
use std::ops::AddAssign;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Counting {
    Min,
    Fgm,
    Fga,
    Fg3m,
    Fg3a,
    Ftm,
    Fta,
    Oreb,
    Dreb,
    Reb,
    Ast,
    Tov,
    Stl,
    Blk,
    Pf,
    Pts,
    PlusMinus,
}

impl Counting {
    pub const ALL: [Counting; 17] = [
        Counting::Min,
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
        Counting::Pf,
        Counting::Pts,
        Counting::PlusMinus,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Counting::Min => "MIN",
            Counting::Fgm => "FGM",
            Counting::Fga => "FGA",
            Counting::Fg3m => "FG3M",
            Counting::Fg3a => "FG3A",
            Counting::Ftm => "FTM",
            Counting::Fta => "FTA",
            Counting::Oreb => "OREB",
            Counting::Dreb => "DREB",
            Counting::Reb => "REB",
            Counting::Ast => "AST",
            Counting::Tov => "TOV",
            Counting::Stl => "STL",
            Counting::Blk => "BLK",
            Counting::Pf => "PF",
            Counting::Pts => "PTS",
            Counting::PlusMinus => "PLUS_MINUS",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.column() == name)
    }
}

/// One side of a game (or a season average of it). Counts are kept as f64 so
/// the same formulas apply to per-game rows and averaged rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub min: f64,
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub ftm: f64,
    pub fta: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub reb: f64,
    pub ast: f64,
    pub tov: f64,
    pub stl: f64,
    pub blk: f64,
    pub pf: f64,
    pub pts: f64,
    pub plus_minus: f64,
}

impl BoxScore {
    pub fn get(&self, stat: Counting) -> f64 {
        match stat {
            Counting::Min => self.min,
            Counting::Fgm => self.fgm,
            Counting::Fga => self.fga,
            Counting::Fg3m => self.fg3m,
            Counting::Fg3a => self.fg3a,
            Counting::Ftm => self.ftm,
            Counting::Fta => self.fta,
            Counting::Oreb => self.oreb,
            Counting::Dreb => self.dreb,
            Counting::Reb => self.reb,
            Counting::Ast => self.ast,
            Counting::Tov => self.tov,
            Counting::Stl => self.stl,
            Counting::Blk => self.blk,
            Counting::Pf => self.pf,
            Counting::Pts => self.pts,
            Counting::PlusMinus => self.plus_minus,
        }
    }

    pub fn set(&mut self, stat: Counting, value: f64) {
        let slot = match stat {
            Counting::Min => &mut self.min,
            Counting::Fgm => &mut self.fgm,
            Counting::Fga => &mut self.fga,
            Counting::Fg3m => &mut self.fg3m,
            Counting::Fg3a => &mut self.fg3a,
            Counting::Ftm => &mut self.ftm,
            Counting::Fta => &mut self.fta,
            Counting::Oreb => &mut self.oreb,
            Counting::Dreb => &mut self.dreb,
            Counting::Reb => &mut self.reb,
            Counting::Ast => &mut self.ast,
            Counting::Tov => &mut self.tov,
            Counting::Stl => &mut self.stl,
            Counting::Blk => &mut self.blk,
            Counting::Pf => &mut self.pf,
            Counting::Pts => &mut self.pts,
            Counting::PlusMinus => &mut self.plus_minus,
        };
        *slot = value;
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for stat in Counting::ALL {
            out.set(stat, self.get(stat) * factor);
        }
        out
    }

    pub fn mean<'a>(scores: impl IntoIterator<Item = &'a BoxScore>) -> Self {
        let mut sum = BoxScore::default();
        let mut n = 0usize;
        for score in scores {
            sum += *score;
            n += 1;
        }
        sum.scaled(1.0 / n as f64)
    }

    pub fn fg_pct(&self) -> f64 {
        self.fgm / self.fga
    }

    pub fn fg2a(&self) -> f64 {
        self.fga - self.fg3a
    }

    pub fn fg2m(&self) -> f64 {
        self.fgm - self.fg3m
    }

    pub fn fg2_pct(&self) -> f64 {
        self.fg2m() / self.fg2a()
    }

    pub fn fg3_pct(&self) -> f64 {
        self.fg3m / self.fg3a
    }

    pub fn fg3a_rate(&self) -> f64 {
        self.fg3a / self.fga
    }

    pub fn ft_pct(&self) -> f64 {
        self.ftm / self.fta
    }

    pub fn ft_rate(&self) -> f64 {
        self.fta / self.fga
    }

    pub fn ft_per_fga(&self) -> f64 {
        self.ftm / self.fga
    }

    pub fn eff_fg_pct(&self) -> f64 {
        (self.fgm + 0.5 * self.fg3m) / self.fga
    }

    pub fn tov_pct(&self) -> f64 {
        self.tov / (self.fga + 0.44 * self.fta + self.tov)
    }

    pub fn ts_pct(&self) -> f64 {
        self.pts / (2.0 * (self.fga + 0.44 * self.fta))
    }
}

impl AddAssign for BoxScore {
    fn add_assign(&mut self, rhs: Self) {
        for stat in Counting::ALL {
            self.set(stat, self.get(stat) + rhs.get(stat));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn code(self) -> char {
        match self {
            GameResult::Win => 'W',
            GameResult::Loss => 'L',
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" => Some(GameResult::Win),
            "L" => Some(GameResult::Loss),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadResult {
    Win,
    Loss,
    Push,
}

impl SpreadResult {
    pub fn code(self) -> char {
        match self {
            SpreadResult::Win => 'W',
            SpreadResult::Loss => 'L',
            SpreadResult::Push => 'P',
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" => Some(SpreadResult::Win),
            "L" => Some(SpreadResult::Loss),
            "P" => Some(SpreadResult::Push),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverUnderResult {
    Over,
    Under,
    Push,
}

impl OverUnderResult {
    pub fn code(self) -> char {
        match self {
            OverUnderResult::Over => 'O',
            OverUnderResult::Under => 'U',
            OverUnderResult::Push => 'P',
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "O" => Some(OverUnderResult::Over),
            "U" => Some(OverUnderResult::Under),
            "P" => Some(OverUnderResult::Push),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    Regular,
    Playoffs,
}

impl SeasonType {
    pub fn name(self) -> &'static str {
        match self {
            SeasonType::Regular => "REGULAR",
            SeasonType::Playoffs => "PLAYOFFS",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REGULAR" | "REGULAR SEASON" => Some(SeasonType::Regular),
            "PLAYOFFS" => Some(SeasonType::Playoffs),
            _ => None,
        }
    }
}

impl fmt::Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait TeamOpp {
    fn team(&self) -> &BoxScore;
    fn opp(&self) -> &BoxScore;
}

/// One team's view of one game. Every game yields two of these, mirror images
/// of each other with team and opponent swapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTeamRecord {
    pub season: i32,
    pub game_id: String,
    pub game_date: Option<NaiveDate>,
    pub team_id: u32,
    pub opponent_id: u32,
    pub is_home: bool,
    pub team: BoxScore,
    pub opp: BoxScore,
    pub home_wl: GameResult,
}

impl GameTeamRecord {
    pub fn mirrored(&self) -> Self {
        Self {
            season: self.season,
            game_id: self.game_id.clone(),
            game_date: self.game_date,
            team_id: self.opponent_id,
            opponent_id: self.team_id,
            is_home: !self.is_home,
            team: self.opp,
            opp: self.team,
            home_wl: self.home_wl,
        }
    }

    pub fn team_result(&self) -> GameResult {
        if self.is_home {
            self.home_wl
        } else {
            self.home_wl.flipped()
        }
    }
}

impl TeamOpp for GameTeamRecord {
    fn team(&self) -> &BoxScore {
        &self.team
    }

    fn opp(&self) -> &BoxScore {
        &self.opp
    }
}
