use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::betting::BettingDataset;
use crate::box_score::Counting;
use crate::season::SeasonSummary;
use crate::stat_name::AdvancedStat;

pub struct ExportReport {
    pub season_rows: usize,
    pub betting_rows: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() { Cell::Number(v) } else { Cell::Empty }
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::from)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

pub fn write_workbook(
    path: &Path,
    summaries: &[SeasonSummary],
    betting: &BettingDataset,
) -> Result<ExportReport> {
    let mut season_rows = vec![season_header()];
    season_rows.extend(summaries.iter().map(season_row));

    let mut betting_rows = vec![betting_header(betting)];
    for row in &betting.rows {
        let mut cells: Vec<Cell> = vec![
            Cell::Number(row.season as f64),
            Cell::Text(row.game_id.clone()),
            Cell::Text(row.game_date.to_string()),
            Cell::Number(row.home_team_id as f64),
            Cell::Number(row.away_team_id as f64),
            Cell::from(row.home_spread),
            Cell::Text(row.home_spread_result.code().to_string()),
            Cell::from(row.over_under),
            Cell::Text(row.over_under_result.code().to_string()),
            Cell::Text(row.home_wl.code().to_string()),
        ];
        cells.extend(row.home.iter().copied().map(Cell::from));
        cells.extend(row.away.iter().copied().map(Cell::from));
        betting_rows.push(cells);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("SeasonRatings")?;
        write_rows(sheet, &season_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("BettingFeatures")?;
        write_rows(sheet, &betting_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    let report = ExportReport {
        season_rows: season_rows.len().saturating_sub(1),
        betting_rows: betting_rows.len().saturating_sub(1),
    };
    info!(
        path = %path.display(),
        season_rows = report.season_rows,
        betting_rows = report.betting_rows,
        "wrote workbook"
    );
    Ok(report)
}

fn season_header() -> Vec<Cell> {
    let mut header = vec![
        Cell::Text("SEASON".to_string()),
        Cell::Text("TEAM_ID".to_string()),
        Cell::Text("GAMES".to_string()),
    ];
    for c in Counting::ALL {
        header.push(Cell::Text(format!("TEAM_{}", c.column())));
    }
    for c in Counting::ALL {
        header.push(Cell::Text(format!("OPP_{}", c.column())));
    }
    for a in AdvancedStat::ALL {
        header.push(Cell::Text(a.column().to_string()));
    }
    header.push(Cell::Text("TEAM_SRS".to_string()));
    header
}

fn season_row(s: &SeasonSummary) -> Vec<Cell> {
    let mut row = vec![
        Cell::Number(s.stats.season as f64),
        Cell::Number(s.stats.team_id as f64),
        Cell::Number(s.stats.games as f64),
    ];
    row.extend(Counting::ALL.iter().map(|c| Cell::from(s.stats.team.get(*c))));
    row.extend(Counting::ALL.iter().map(|c| Cell::from(s.stats.opp.get(*c))));
    row.extend(AdvancedStat::ALL.iter().map(|a| Cell::from(s.advanced.get(*a))));
    row.push(Cell::from(s.srs));
    row
}

fn betting_header(betting: &BettingDataset) -> Vec<Cell> {
    let mut header: Vec<Cell> = [
        "SEASON",
        "GAME_ID",
        "GAME_DATE",
        "HOME_TEAM_ID",
        "AWAY_TEAM_ID",
        "HOME_SPREAD",
        "HOME_SPREAD_WL",
        "OVER_UNDER",
        "OU_RESULT",
        "HOME_WL",
    ]
    .into_iter()
    .map(|h| Cell::Text(h.to_string()))
    .collect();
    for name in &betting.names {
        header.push(Cell::from(format!("HOME_{name}")));
    }
    for name in &betting.names {
        header.push(Cell::from(format!("AWAY_{name}")));
    }
    header
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(v) => {
                    worksheet
                        .write_string(r, c, v)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                Cell::Number(v) => {
                    worksheet
                        .write_number(r, c, *v)
                        .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}
