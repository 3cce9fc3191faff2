use rand::SeedableRng;
use rand::rngs::StdRng;

use databall::box_score::{BoxScore, GameResult, GameTeamRecord};
use databall::ratings::{
    self, MinutesUnit, advanced_stats, compute_derived_stats, possessions,
};
use databall::synthetic::{LeagueConfig, generate_league};

fn side(fgm: f64, fga: f64, fg3m: f64, fta: f64, ftm: f64, oreb: f64, dreb: f64, tov: f64, pts: f64) -> BoxScore {
    BoxScore {
        min: 240.0,
        fgm,
        fga,
        fg3m,
        fg3a: fg3m * 3.0,
        ftm,
        fta,
        oreb,
        dreb,
        reb: oreb + dreb,
        tov,
        pts,
        ..BoxScore::default()
    }
}

fn record(team: BoxScore, opp: BoxScore) -> GameTeamRecord {
    GameTeamRecord {
        season: 2019,
        game_id: "0021900001".to_string(),
        game_date: None,
        team_id: 1,
        opponent_id: 2,
        is_home: true,
        team,
        opp,
        home_wl: GameResult::Win,
    }
}

#[test]
fn effective_fg_pct_counts_threes_as_one_and_a_half() {
    let b = BoxScore {
        fgm: 10.0,
        fg3m: 5.0,
        fga: 20.0,
        ..BoxScore::default()
    };
    assert_eq!(b.eff_fg_pct(), 0.625);
}

#[test]
fn possessions_agree_from_both_sides() {
    let mut rng = StdRng::seed_from_u64(11);
    let league = generate_league(&LeagueConfig::default(), &mut rng);
    for r in league.records() {
        let mine = possessions(&r.team, &r.opp);
        let theirs = possessions(&r.opp, &r.team);
        assert!((mine - theirs).abs() < 1e-9, "{mine} vs {theirs}");
        assert!(mine > 60.0 && mine < 140.0);
    }
}

#[test]
fn ratings_follow_possessions() {
    let team = side(42.0, 88.0, 8.0, 24.0, 20.0, 11.0, 38.0, 14.0, 112.0);
    let opp = side(39.0, 91.0, 9.0, 20.0, 15.0, 10.0, 34.0, 18.0, 102.0);
    let poss = possessions(&team, &opp);

    let rows = vec![record(team, opp)];
    let adv = advanced_stats(&rows, MinutesUnit::Infer);
    assert_eq!(adv.len(), 1);
    let a = adv[0];
    assert!((a.possessions - poss).abs() < 1e-12);
    assert!((a.off_rating - 100.0 * 112.0 / poss).abs() < 1e-9);
    assert!((a.def_rating - 100.0 * 102.0 / poss).abs() < 1e-9);
    assert!((a.net_rating - (a.off_rating - a.def_rating)).abs() < 1e-12);
    assert!((a.pace - poss).abs() < 1e-9);
    assert!((a.oreb_pct - 11.0 / 45.0).abs() < 1e-12);
    assert!((a.dreb_pct - 38.0 / 48.0).abs() < 1e-12);
    assert!((a.ft_per_fga - 20.0 / 88.0).abs() < 1e-12);
    let ff = ratings::four_factors(a.eff_fg_pct, a.oreb_pct, a.ft_per_fga, a.tov_pct);
    assert_eq!(a.four_factors, ff);
}

#[test]
fn pace_unit_is_sniffed_from_first_row() {
    let team = side(42.0, 88.0, 8.0, 24.0, 20.0, 11.0, 38.0, 14.0, 112.0);
    let opp = side(39.0, 91.0, 9.0, 20.0, 15.0, 10.0, 34.0, 18.0, 102.0);
    let poss = possessions(&team, &opp);

    let mut game_clock = record(team, opp);
    game_clock.team.min = 48.0;
    let player_sum = record(team, opp);

    // First row in game-clock minutes: the whole column is scaled by 5.
    let paces = ratings::pace(&[game_clock.clone(), player_sum.clone()], MinutesUnit::Infer);
    assert!((paces[0] - poss).abs() < 1e-9);
    assert!((paces[1] - poss / 5.0).abs() < 1e-9);

    let paces = ratings::pace(&[player_sum.clone(), game_clock.clone()], MinutesUnit::Infer);
    assert!((paces[0] - poss).abs() < 1e-9);
    assert!((paces[1] - poss * 5.0).abs() < 1e-9);

    let paces = ratings::pace(&[player_sum, game_clock], MinutesUnit::Game);
    assert!((paces[0] - poss / 5.0).abs() < 1e-9);
    assert!((paces[1] - poss).abs() < 1e-9);
}

#[test]
fn empty_box_scores_give_nan_not_panics() {
    let rows = vec![record(BoxScore::default(), BoxScore::default())];
    let adv = advanced_stats(&rows, MinutesUnit::Infer);
    assert!(adv[0].possessions == 0.0 || adv[0].possessions.is_nan());
    assert!(adv[0].off_rating.is_nan());
    assert!(adv[0].eff_fg_pct.is_nan());
}

#[test]
fn derived_stats_keep_row_order() {
    let mut rng = StdRng::seed_from_u64(3);
    let league = generate_league(&LeagueConfig::default(), &mut rng);
    let records = league.records();
    let derived = compute_derived_stats(&records, MinutesUnit::Infer);
    assert_eq!(derived.len(), records.len());
    for (d, r) in derived.iter().zip(&records) {
        assert_eq!(&d.record, r);
    }
}

#[test]
fn supplemental_ratios() {
    let b = BoxScore {
        fgm: 40.0,
        fga: 80.0,
        fg3m: 10.0,
        fg3a: 30.0,
        ftm: 15.0,
        fta: 20.0,
        tov: 12.0,
        pts: 105.0,
        ..BoxScore::default()
    };
    assert_eq!(b.fg_pct(), 0.5);
    assert_eq!(b.fg2a(), 50.0);
    assert_eq!(b.fg2m(), 30.0);
    assert_eq!(b.fg2_pct(), 0.6);
    assert_eq!(b.ft_pct(), 0.75);
    assert_eq!(b.ft_rate(), 0.25);
    assert!((b.ts_pct() - 105.0 / (2.0 * (80.0 + 0.44 * 20.0))).abs() < 1e-12);
    assert!((b.tov_pct() - 12.0 / (80.0 + 0.44 * 20.0 + 12.0)).abs() < 1e-12);
}
