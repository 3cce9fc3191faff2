use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitPoint {
    pub date: NaiveDate,
    pub bets: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub profit: f64,
    pub invested: f64,
}

impl ProfitPoint {
    pub fn roi(&self) -> f64 {
        self.profit / self.invested
    }
}

/// Cumulative accuracy and profit per day for flat `stake` bets that win
/// `stake` when correct and lose `stake` otherwise.
pub fn profit_curve(bets: &[(NaiveDate, bool)], stake: f64) -> Vec<ProfitPoint> {
    let mut by_day: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for (date, correct) in bets {
        let day = by_day.entry(*date).or_default();
        day.0 += 1;
        if *correct {
            day.1 += 1;
        }
    }

    let mut out = Vec::with_capacity(by_day.len());
    let (mut bets_total, mut correct_total) = (0usize, 0usize);
    let (mut profit, mut invested) = (0.0, 0.0);
    for (date, (n, correct)) in by_day {
        bets_total += n;
        correct_total += correct;
        profit += stake * correct as f64 - stake * (n - correct) as f64;
        invested += stake * n as f64;
        out.push(ProfitPoint {
            date,
            bets: bets_total,
            correct: correct_total,
            accuracy: correct_total as f64 / bets_total as f64,
            profit,
            invested,
        });
    }
    out
}
