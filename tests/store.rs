use rand::SeedableRng;
use rand::rngs::StdRng;

use databall::box_score::{BoxScore, GameResult, SeasonType};
use databall::gamelog::{import_betting_lines, import_game_log};
use databall::srs::opponent_counts;
use databall::store::{self, GameRow, SeasonSpan, TeamGameStatsRow, TeamRow};
use databall::synthetic::{LeagueConfig, SyntheticLeague, generate_league};

fn small_league() -> SyntheticLeague {
    let mut rng = StdRng::seed_from_u64(42);
    let config = LeagueConfig {
        teams: 4,
        first_season: 2017,
        seasons: 3,
        rounds: 1,
    };
    generate_league(&config, &mut rng)
}

fn seeded_db(league: &SyntheticLeague) -> rusqlite::Connection {
    let mut conn = store::open_in_memory().expect("in-memory db");
    import_game_log(&mut conn, "synthetic", &league.game_log()).expect("import games");
    import_betting_lines(&mut conn, "synthetic", &league.betting_lines()).expect("import lines");
    conn
}

#[test]
fn records_round_trip_through_sqlite() {
    let league = small_league();
    let conn = seeded_db(&league);

    let loaded = store::load_game_records(&conn, None).expect("load");
    let expected = league.records();
    assert_eq!(loaded.len(), expected.len());
    assert_eq!(loaded, expected);
}

#[test]
fn season_span_filters_records() {
    let league = small_league();
    let conn = seeded_db(&league);

    assert_eq!(store::seasons(&conn).expect("seasons"), vec![2017, 2018, 2019]);
    let only_2018 = store::load_game_records(&conn, Some(SeasonSpan::single(2018))).expect("load");
    assert!(!only_2018.is_empty());
    assert!(only_2018.iter().all(|r| r.season == 2018));

    let later = SeasonSpan {
        start: 2018,
        end: 2019,
    };
    let games = store::load_betting_games(&conn, Some(later)).expect("betting");
    assert_eq!(games.len(), league.games.iter().filter(|g| later.contains(g.game.season)).count());
}

#[test]
fn opponent_counts_match_in_memory_counts() {
    let league = small_league();
    let conn = seeded_db(&league);
    let records = league.records();
    let expected: Vec<_> = opponent_counts(&records)
        .into_iter()
        .filter(|c| c.season == 2019)
        .collect();
    assert_eq!(store::load_opponent_counts(&conn, 2019).expect("counts"), expected);
}

#[test]
fn betting_games_join_lines_to_games() {
    let league = small_league();
    let conn = seeded_db(&league);
    let games = store::load_betting_games(&conn, None).expect("betting");
    assert_eq!(games, league.betting_games());
}

#[test]
fn rejects_malformed_rows() {
    let conn = store::open_in_memory().expect("in-memory db");
    store::upsert_team(
        &conn,
        &TeamRow {
            id: 1,
            name: "One".to_string(),
            abbreviation: "ONE".to_string(),
        },
    )
    .expect("team");
    store::upsert_team(
        &conn,
        &TeamRow {
            id: 2,
            name: "Two".to_string(),
            abbreviation: "TWO".to_string(),
        },
    )
    .expect("team");

    let mut game = GameRow {
        id: "002190001".to_string(),
        season: 2019,
        season_type: SeasonType::Regular,
        game_date: chrono::NaiveDate::from_ymd_opt(2019, 10, 22).unwrap(),
        matchup: "ONE vs. TWO".to_string(),
        home_team_id: 1,
        away_team_id: 2,
        home_wl: GameResult::Win,
    };
    assert!(store::upsert_game(&conn, &game).is_err());

    game.id = "0021900001".to_string();
    store::upsert_game(&conn, &game).expect("game");

    let negative = TeamGameStatsRow {
        team_id: 1,
        game_id: game.id.clone(),
        stats: BoxScore {
            fga: -1.0,
            ..BoxScore::default()
        },
    };
    assert!(store::upsert_team_game_stats(&conn, &negative).is_err());

    let unknown_game = TeamGameStatsRow {
        team_id: 1,
        game_id: "0021900099".to_string(),
        stats: BoxScore::default(),
    };
    assert!(store::upsert_team_game_stats(&conn, &unknown_game).is_err());
}

#[test]
fn team_abbreviations_are_looked_up() {
    let league = small_league();
    let conn = seeded_db(&league);
    let first = &league.teams[0];
    assert_eq!(
        store::team_abbreviation(&conn, first.id).expect("lookup"),
        Some(first.abbreviation.clone())
    );
    assert_eq!(store::team_abbreviation(&conn, 7).expect("lookup"), None);
}
