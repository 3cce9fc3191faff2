use std::collections::BTreeMap;

use databall::box_score::{BoxScore, GameResult, GameTeamRecord};
use databall::season::{SeasonOptions, season_ratings, season_stats};
use databall::srs::{
    DEFAULT_SRS_ITERATIONS, OpponentCount, ScheduleMatrix, compute_season_ratings,
    opponent_counts,
};

fn count(team_id: u32, opponent_id: u32, games: u32) -> OpponentCount {
    OpponentCount {
        season: 2019,
        team_id,
        opponent_id,
        games,
    }
}

fn round_robin_counts(teams: &[u32], games: u32) -> Vec<OpponentCount> {
    let mut out = Vec::new();
    for a in teams {
        for b in teams {
            if a != b {
                out.push(count(*a, *b, games));
            }
        }
    }
    out
}

/// Home record for one game plus its mirror image.
fn played(season: i32, id: &str, home: u32, away: u32, home_pts: f64, away_pts: f64) -> [GameTeamRecord; 2] {
    let home_box = BoxScore {
        min: 240.0,
        fga: 85.0,
        fgm: 40.0,
        fta: 20.0,
        oreb: 10.0,
        dreb: 35.0,
        tov: 13.0,
        pts: home_pts,
        plus_minus: home_pts - away_pts,
        ..BoxScore::default()
    };
    let away_box = BoxScore {
        pts: away_pts,
        plus_minus: away_pts - home_pts,
        ..home_box
    };
    let r = GameTeamRecord {
        season,
        game_id: id.to_string(),
        game_date: None,
        team_id: home,
        opponent_id: away,
        is_home: true,
        team: home_box,
        opp: away_box,
        home_wl: if home_pts > away_pts {
            GameResult::Win
        } else {
            GameResult::Loss
        },
    };
    let m = r.mirrored();
    [r, m]
}

#[test]
fn two_teams_alternate_and_land_on_the_differentials() {
    let counts = round_robin_counts(&[1, 2], 2);
    let diffs = BTreeMap::from([(1, 5.0), (2, -5.0)]);
    let out = compute_season_ratings(2019, &diffs, &counts, DEFAULT_SRS_ITERATIONS).unwrap();
    assert_eq!(out.len(), 2);
    assert!((out[0].rating - 5.0).abs() < 1e-9);
    assert!((out[1].rating + 5.0).abs() < 1e-9);

    // One more pass lands on the other half of the cycle.
    let odd = compute_season_ratings(2019, &diffs, &counts, 11).unwrap();
    assert!(odd[0].rating.abs() < 1e-9);
    assert!(odd[1].rating.abs() < 1e-9);
}

#[test]
fn three_team_round_robin_golden_values() {
    let counts = round_robin_counts(&[10, 20, 30], 2);
    let diffs = BTreeMap::from([(10, 6.0), (20, 0.0), (30, -6.0)]);
    let out = compute_season_ratings(2019, &diffs, &counts, DEFAULT_SRS_ITERATIONS).unwrap();
    let ratings: Vec<f64> = out.iter().map(|r| r.rating).collect();
    let expected = [4.001953125, 0.0, -4.001953125];
    for (got, want) in ratings.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }
    let ids: Vec<u32> = out.iter().map(|r| r.team_id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[test]
fn iteration_count_changes_every_rating() {
    let counts = round_robin_counts(&[10, 20, 30], 2);
    let diffs = BTreeMap::from([(10, 6.0), (20, 0.0), (30, -6.0)]);
    let ten = compute_season_ratings(2019, &diffs, &counts, 10).unwrap();
    let nine = compute_season_ratings(2019, &diffs, &counts, 9).unwrap();
    assert!((nine[0].rating - 6.0 * 0.666015625).abs() < 1e-9);
    assert_ne!(ten[0].rating, nine[0].rating);
}

#[test]
fn balanced_schedule_mean_matches_row_share() {
    let m = ScheduleMatrix::from_counts(&round_robin_counts(&[1, 2, 3, 4], 3));
    assert_eq!(m.len(), 4);
    // Rows sum to 1 over 4 columns with a zero diagonal.
    assert!((m.mean() - 0.25).abs() < 1e-12);
}

#[test]
fn other_seasons_are_ignored() {
    let mut counts = round_robin_counts(&[1, 2], 2);
    counts.push(OpponentCount {
        season: 2018,
        team_id: 3,
        opponent_id: 1,
        games: 4,
    });
    let diffs = BTreeMap::from([(1, 5.0), (2, -5.0)]);
    let out = compute_season_ratings(2019, &diffs, &counts, DEFAULT_SRS_ITERATIONS).unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn opponent_counts_come_from_both_perspectives() {
    let mut records = Vec::new();
    records.extend(played(2019, "0021900001", 1, 2, 110.0, 100.0));
    records.extend(played(2019, "0021900002", 2, 1, 104.0, 99.0));
    records.extend(played(2019, "0021900003", 1, 3, 90.0, 95.0));
    let counts = opponent_counts(&records);
    let pairs: Vec<(u32, u32, u32)> = counts
        .iter()
        .map(|c| (c.team_id, c.opponent_id, c.games))
        .collect();
    assert_eq!(pairs, vec![(1, 2, 2), (1, 3, 1), (2, 1, 2), (3, 1, 1)]);
}

#[test]
fn season_ratings_from_game_records() {
    let mut records = Vec::new();
    records.extend(played(2019, "0021900001", 1, 2, 110.0, 100.0));
    records.extend(played(2019, "0021900002", 2, 1, 100.0, 110.0));
    records.extend(played(2020, "0022000001", 1, 2, 100.0, 100.0 + 4.0));
    records.extend(played(2020, "0022000002", 2, 1, 102.0, 100.0));

    let stats = season_stats(&records);
    assert_eq!(stats.len(), 4);
    assert_eq!((stats[0].season, stats[0].team_id, stats[0].games), (2019, 1, 2));
    assert_eq!(stats[0].team.plus_minus, 10.0);
    assert_eq!(stats[0].opp.pts, 100.0);

    let summaries = season_ratings(&records, SeasonOptions::default()).unwrap();
    assert_eq!(summaries.len(), 4);
    // Two teams, two games: ten passes return the plain differentials.
    assert!((summaries[0].srs - 10.0).abs() < 1e-9);
    assert!((summaries[1].srs + 10.0).abs() < 1e-9);
    assert!((summaries[2].srs + 3.0).abs() < 1e-9);
    assert!((summaries[3].srs - 3.0).abs() < 1e-9);
    assert!(summaries[0].advanced.net_rating > 0.0);
}
