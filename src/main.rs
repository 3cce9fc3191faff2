use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::warn;

use databall::config::Settings;
use databall::logging::init_logging;
use databall::season::{self, SeasonSummary};
use databall::store;

fn main() -> Result<()> {
    init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let settings = Settings::load(&args).context("invalid settings")?;

    let conn = store::open_db(&settings.db_path)?;
    let records = store::load_game_records(&conn, settings.seasons)?;
    if records.is_empty() {
        warn!(db = %settings.db_path.display(), "no games found");
        println!("No games in {}", settings.db_path.display());
        return Ok(());
    }

    let summaries = season::season_ratings(&records, settings.season_options())?;
    let mut by_season: BTreeMap<i32, Vec<&SeasonSummary>> = BTreeMap::new();
    for s in &summaries {
        by_season.entry(s.stats.season).or_default().push(s);
    }

    println!("DB: {}", settings.db_path.display());
    println!("SRS iterations: {}", settings.srs_iterations);
    for (season, mut teams) in by_season {
        teams.sort_by(|a, b| b.srs.total_cmp(&a.srs));
        println!();
        println!("Season {season}");
        println!(
            "{:<5} {:>3} {:>7} {:>7} {:>7} {:>6} {:>6} {:>7} {:>7}",
            "TEAM", "GP", "ORTG", "DRTG", "NET", "PACE", "EFG", "FF", "SRS"
        );
        for s in teams {
            let abbr = store::team_abbreviation(&conn, s.stats.team_id)?
                .unwrap_or_else(|| s.stats.team_id.to_string());
            println!(
                "{:<5} {:>3} {:>7.1} {:>7.1} {:>7.1} {:>6.1} {:>6.3} {:>7.3} {:>7.2}",
                abbr,
                s.stats.games,
                s.advanced.off_rating,
                s.advanced.def_rating,
                s.advanced.net_rating,
                s.advanced.pace,
                s.advanced.eff_fg_pct,
                s.advanced.four_factors,
                s.srs
            );
        }
    }

    Ok(())
}
