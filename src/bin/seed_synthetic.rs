use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;

use databall::config::{Settings, arg_value};
use databall::gamelog;
use databall::logging::init_logging;
use databall::store;
use databall::synthetic::{self, LeagueConfig};

fn main() -> Result<()> {
    init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let settings = Settings::load(&args).context("invalid settings")?;

    let defaults = LeagueConfig::default();
    let config = LeagueConfig {
        teams: parse_arg(&args, "--teams")?.unwrap_or(defaults.teams),
        first_season: parse_arg(&args, "--first-season")?.unwrap_or(defaults.first_season),
        seasons: parse_arg(&args, "--league-seasons")?.unwrap_or(defaults.seasons),
        rounds: parse_arg(&args, "--rounds")?.unwrap_or(defaults.rounds),
    };
    let mut rng = match parse_arg::<u64>(&args, "--seed")? {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let league = synthetic::generate_league(&config, &mut rng);
    let mut conn = store::open_db(&settings.db_path)?;
    let games = gamelog::import_game_log(&mut conn, "synthetic", &league.game_log())?;
    let lines = gamelog::import_betting_lines(&mut conn, "synthetic", &league.betting_lines())?;

    println!("Synthetic league written");
    println!("DB: {}", settings.db_path.display());
    println!("Teams: {}", games.teams);
    println!(
        "Seasons: {}-{}",
        config.first_season,
        config.first_season + config.seasons as i32 - 1
    );
    println!("Games: {}", games.games);
    println!("Betting lines: {}", lines.betting_lines);

    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>> {
    match arg_value(args, name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("invalid value for {name}: {raw}")),
        None => Ok(None),
    }
}
