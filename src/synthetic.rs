use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::box_score::{BoxScore, GameResult, GameTeamRecord, OverUnderResult, SeasonType, SpreadResult};
use crate::gamelog::ParsedGameLog;
use crate::ratings::MINUTES_PER_GAME;
use crate::store::{BettingGame, BettingLine, GameRow, TeamGameStatsRow, TeamRow};

const FIRST_TEAM_ID: u32 = 1_610_612_737;
const HOME_EDGE: f64 = 2.5;
const MAX_TEAMS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueConfig {
    pub teams: usize,
    pub first_season: i32,
    pub seasons: usize,
    pub rounds: usize,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            teams: 8,
            first_season: 2015,
            seasons: 3,
            rounds: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGame {
    pub game: GameRow,
    pub home: BoxScore,
    pub away: BoxScore,
    pub line: BettingLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticLeague {
    pub teams: Vec<TeamRow>,
    pub games: Vec<SyntheticGame>,
}

impl SyntheticLeague {
    pub fn records(&self) -> Vec<GameTeamRecord> {
        let mut out = Vec::with_capacity(self.games.len() * 2);
        for g in &self.games {
            let home = GameTeamRecord {
                season: g.game.season,
                game_id: g.game.id.clone(),
                game_date: Some(g.game.game_date),
                team_id: g.game.home_team_id,
                opponent_id: g.game.away_team_id,
                is_home: true,
                team: g.home,
                opp: g.away,
                home_wl: g.game.home_wl,
            };
            let away = home.mirrored();
            if home.team_id < away.team_id {
                out.extend([home, away]);
            } else {
                out.extend([away, home]);
            }
        }
        out
    }

    pub fn betting_games(&self) -> Vec<BettingGame> {
        self.games
            .iter()
            .map(|g| BettingGame {
                game: g.game.clone(),
                line: g.line.clone(),
            })
            .collect()
    }

    pub fn betting_lines(&self) -> Vec<BettingLine> {
        self.games.iter().map(|g| g.line.clone()).collect()
    }

    pub fn game_log(&self) -> ParsedGameLog {
        let mut stats = Vec::with_capacity(self.games.len() * 2);
        for g in &self.games {
            stats.push(TeamGameStatsRow {
                team_id: g.game.home_team_id,
                game_id: g.game.id.clone(),
                stats: g.home,
            });
            stats.push(TeamGameStatsRow {
                team_id: g.game.away_team_id,
                game_id: g.game.id.clone(),
                stats: g.away,
            });
        }
        ParsedGameLog {
            teams: self.teams.clone(),
            games: self.games.iter().map(|g| g.game.clone()).collect(),
            stats,
            skipped: Vec::new(),
        }
    }
}

pub fn generate_league<R: Rng + ?Sized>(config: &LeagueConfig, rng: &mut R) -> SyntheticLeague {
    let n = config.teams.clamp(2, MAX_TEAMS);
    let teams: Vec<TeamRow> = (0..n)
        .map(|i| TeamRow {
            id: FIRST_TEAM_ID + i as u32,
            name: format!("Team {:02}", i + 1),
            abbreviation: format!("T{:02}", i + 1),
        })
        .collect();
    let mut strength: Vec<f64> = (0..n).map(|_| rng.gen_range(-6.0..6.0)).collect();

    let mut games = Vec::new();
    for s in 0..config.seasons {
        let season = config.first_season + s as i32;
        let mut day = NaiveDate::from_ymd_opt(season, 10, 20).unwrap_or_default();
        let mut number = 0u32;

        let mut slate = Vec::new();
        for _ in 0..config.rounds {
            let single = round_robin(n);
            slate.extend(single.iter().cloned());
            slate.extend(
                single
                    .iter()
                    .map(|pairs| pairs.iter().map(|&(h, a)| (a, h)).collect::<Vec<_>>()),
            );
        }
        slate.shuffle(rng);

        for pairs in slate {
            for (h, a) in pairs {
                number += 1;
                let id = format!("002{:02}{:05}", season.rem_euclid(100), number);
                games.push(play_game(
                    rng,
                    id,
                    season,
                    day,
                    (&teams[h], strength[h]),
                    (&teams[a], strength[a]),
                ));
            }
            day += Duration::days(1);
        }

        for team_strength in &mut strength {
            *team_strength = (*team_strength + rng.gen_range(-1.5..1.5)).clamp(-8.0, 8.0);
        }
    }

    SyntheticLeague { teams, games }
}

/// Circle-method schedule: one inner vec per day, each team at most once.
fn round_robin(n: usize) -> Vec<Vec<(usize, usize)>> {
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();
    let mut days = Vec::with_capacity(m - 1);
    for r in 0..m - 1 {
        let mut pairs = Vec::with_capacity(m / 2);
        for i in 0..m / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[m - 1 - i]) {
                pairs.push(if (r + i) % 2 == 0 { (a, b) } else { (b, a) });
            }
        }
        days.push(pairs);
        slots[1..].rotate_right(1);
    }
    days
}

fn play_game<R: Rng + ?Sized>(
    rng: &mut R,
    id: String,
    season: i32,
    game_date: NaiveDate,
    home: (&TeamRow, f64),
    away: (&TeamRow, f64),
) -> SyntheticGame {
    let edge = home.1 - away.1 + HOME_EDGE;
    let mut h = box_score(rng, edge / 2.0);
    let mut a = box_score(rng, -edge / 2.0);
    if h.pts == a.pts {
        h.ftm += 1.0;
        h.fta += 1.0;
        h.pts += 1.0;
    }
    h.plus_minus = h.pts - a.pts;
    a.plus_minus = -h.plus_minus;

    let home_wl = if h.pts > a.pts {
        GameResult::Win
    } else {
        GameResult::Loss
    };

    let home_spread = half_point(-edge + rng.gen_range(-2.0..2.0)).clamp(-30.0, 30.0);
    let cover = h.plus_minus + home_spread;
    let home_spread_result = if cover > 0.0 {
        SpreadResult::Win
    } else if cover < 0.0 {
        SpreadResult::Loss
    } else {
        SpreadResult::Push
    };
    let over_under = half_point(212.0 + rng.gen_range(-12.0..12.0)).clamp(100.0, 300.0);
    let total = h.pts + a.pts;
    let over_under_result = if total > over_under {
        OverUnderResult::Over
    } else if total < over_under {
        OverUnderResult::Under
    } else {
        OverUnderResult::Push
    };

    SyntheticGame {
        game: GameRow {
            id: id.clone(),
            season,
            season_type: SeasonType::Regular,
            game_date,
            matchup: format!("{} vs. {}", home.0.abbreviation, away.0.abbreviation),
            home_team_id: home.0.id,
            away_team_id: away.0.id,
            home_wl,
        },
        home: h,
        away: a,
        line: BettingLine {
            game_id: id,
            home_spread,
            home_spread_result,
            over_under,
            over_under_result,
        },
    }
}

fn box_score<R: Rng + ?Sized>(rng: &mut R, edge: f64) -> BoxScore {
    let fga = rng.gen_range(80.0_f64..95.0).round();
    let fg3a = rng.gen_range(25.0_f64..40.0).round();
    let fg3m = (fg3a * rng.gen_range(0.30..0.40)).round();
    let fg2a = fga - fg3a;
    let fg2m = (fg2a * (rng.gen_range(0.47..0.55) + edge * 0.004).clamp(0.3, 0.7)).round();
    let fta = rng.gen_range(15.0_f64..30.0).round();
    let ftm = (fta * rng.gen_range(0.70..0.85)).round();
    let oreb = rng.gen_range(7.0_f64..14.0).round();
    let dreb = rng.gen_range(30.0_f64..40.0).round();
    let fgm = fg2m + fg3m;

    BoxScore {
        min: MINUTES_PER_GAME,
        fgm,
        fga,
        fg3m,
        fg3a,
        ftm,
        fta,
        oreb,
        dreb,
        reb: oreb + dreb,
        ast: (fgm * rng.gen_range(0.55..0.65)).round(),
        tov: rng.gen_range(10.0_f64..18.0).round(),
        stl: rng.gen_range(5.0_f64..10.0).round(),
        blk: rng.gen_range(3.0_f64..7.0).round(),
        pf: rng.gen_range(16.0_f64..24.0).round(),
        pts: 2.0 * fg2m + 3.0 * fg3m + ftm,
        plus_minus: 0.0,
    }
}

fn half_point(v: f64) -> f64 {
    (v * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::gamelog::is_valid_game_id;

    #[test]
    fn round_robin_pairs_every_team_once() {
        for n in [4, 5] {
            let days = round_robin(n);
            let mut seen = std::collections::HashSet::new();
            for pairs in &days {
                for &(h, a) in pairs {
                    let key = (h.min(a), h.max(a));
                    assert!(seen.insert(key), "pair {key:?} repeated");
                }
            }
            assert_eq!(seen.len(), n * (n - 1) / 2);
        }
    }

    #[test]
    fn league_is_internally_consistent() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = LeagueConfig {
            teams: 4,
            first_season: 2018,
            seasons: 2,
            rounds: 1,
        };
        let league = generate_league(&config, &mut rng);
        assert_eq!(league.games.len(), 2 * 2 * 6);
        for g in &league.games {
            assert!(is_valid_game_id(&g.game.id));
            assert_eq!(g.home.plus_minus, -g.away.plus_minus);
            assert_ne!(g.home.pts, g.away.pts);
            assert_eq!(g.home.reb, g.home.oreb + g.home.dreb);
            assert_eq!(g.line.home_spread * 2.0, (g.line.home_spread * 2.0).round());
        }
        let records = league.records();
        assert_eq!(records.len(), league.games.len() * 2);
        assert_eq!(records[0].team, records[1].opp);
    }
}
