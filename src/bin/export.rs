use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use databall::betting;
use databall::config::{Settings, arg_value};
use databall::logging::init_logging;
use databall::profit;
use databall::season;
use databall::simulate::{self, FitOptions, Schedule};
use databall::stat_name::{AdvancedStat, StatName};
use databall::store;
use databall::export;

const DEFAULT_OUT: &str = "databall.xlsx";
const STAKE: f64 = 100.0;
const DEFAULT_REFIT_DAYS: usize = 7;

fn main() -> Result<()> {
    init_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let settings = Settings::load(&args).context("invalid settings")?;
    let out = arg_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));
    let features = match arg_value(&args, "--features") {
        Some(raw) => StatName::parse_list(&raw)?,
        None => StatName::default_features(),
    };

    let conn = store::open_db(&settings.db_path)?;
    let records = store::load_feature_records(&conn, settings.seasons)?;
    let games = store::load_betting_games(&conn, settings.seasons)?;

    let in_span: Vec<_> = records
        .iter()
        .filter(|r| settings.seasons.is_none_or(|span| span.contains(r.season)))
        .cloned()
        .collect();
    let summaries = season::season_ratings(&in_span, settings.season_options())?;
    let dataset = betting::betting_dataset(
        &records,
        &games,
        &features,
        settings.minutes,
        &settings.window_options(),
    )?;
    let report = export::write_workbook(&out, &summaries, &dataset)?;

    println!("Workbook: {}", out.display());
    println!("Season rows: {}", report.season_rows);
    println!("Betting rows: {}", report.betting_rows);

    let bets = betting::feature_spread_bets(&dataset, StatName::Advanced(AdvancedStat::NetRating));
    print_profit("Net rating spread picks", &bets);

    let seasons: Vec<i32> = dataset.rows.iter().map(|r| r.season).collect();
    if let (Some(&first), Some(&last)) = (seasons.iter().min(), seasons.iter().max())
        && first < last
    {
        let freq = match arg_value(&args, "--evolve") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("invalid --evolve value {raw:?}"))?,
            None => DEFAULT_REFIT_DAYS,
        };
        let sim = simulate::simulate(
            &dataset.rows,
            first,
            last,
            Schedule::Evolve { freq },
            &FitOptions::default(),
        )?;
        print_profit(&format!("Model spread picks {last}"), &sim.bets());
    }

    Ok(())
}

fn print_profit(label: &str, bets: &[(NaiveDate, bool)]) {
    if let Some(last) = profit::profit_curve(bets, STAKE).last() {
        println!(
            "{label}: {} bets, {:.1}% correct, profit {:.0} (ROI {:.1}%)",
            last.bets,
            last.accuracy * 100.0,
            last.profit,
            last.roi() * 100.0
        );
    }
}
