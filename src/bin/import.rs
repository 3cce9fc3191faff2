use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use databall::config::{Settings, has_flag, positional_args};
use databall::gamelog;
use databall::logging::init_logging;
use databall::store;

const FLAGS_WITH_VALUES: &[&str] = &[
    "--db",
    "--window",
    "--iterations",
    "--minutes",
    "--seasons",
    "--half-life",
];

fn main() -> Result<()> {
    init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let settings = Settings::load(&args).context("invalid settings")?;
    let betting = has_flag(&args, "--betting");
    let files = positional_args(&args, FLAGS_WITH_VALUES)
        .into_iter()
        .map(PathBuf::from)
        .collect::<Vec<_>>();
    if files.is_empty() {
        return Err(anyhow!(
            "usage: import [--db PATH] [--betting] FILE.json [FILE.json ...]"
        ));
    }

    let mut conn = store::open_db(&settings.db_path)?;
    println!("DB: {}", settings.db_path.display());

    for path in files {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        let source = path.display().to_string();

        let summary = if betting {
            let lines = gamelog::parse_betting_lines_json(&raw)
                .with_context(|| format!("invalid betting lines in {source}"))?;
            gamelog::import_betting_lines(&mut conn, &source, &lines)?
        } else {
            let rows = gamelog::parse_game_log_json(&raw)
                .with_context(|| format!("invalid game log in {source}"))?;
            let parsed = gamelog::pair_games(&rows);
            gamelog::import_game_log(&mut conn, &source, &parsed)?
        };

        println!("{source} (run {})", summary.run_id);
        if betting {
            println!("  betting lines upserted: {}", summary.betting_lines);
        } else {
            println!(
                "  teams: {} games: {} team rows: {}",
                summary.teams, summary.games, summary.stat_rows
            );
        }
        if !summary.skipped.is_empty() {
            println!("  skipped: {}", summary.skipped.len());
            for reason in summary.skipped.iter().take(8) {
                println!("   - {reason}");
            }
        }
    }

    Ok(())
}
