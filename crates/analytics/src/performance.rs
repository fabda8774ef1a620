//! Performance summaries — overall and per ISO week
//!
//! R outcome per trade: Win = +rr (1R when rr is missing), Loss = -1R,
//! Breakeven = 0R. Missed trades carry no R.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Trade, TradeResult};
use crate::winrate::{calculate_winrate, WinrateStats};

/// Aggregate R result for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPerformance {
    pub pair: String,
    pub trades: usize,
    pub total_r: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub stats: WinrateStats,
    pub net_profit: Decimal,
    pub gross_profit: Decimal,
    /// Sum of losing P&L (zero or negative)
    pub gross_loss: Decimal,
    /// Gross profit over absolute gross loss, `None` without losses
    pub profit_factor: Option<Decimal>,
    pub total_r: Decimal,
    /// Average R per decided trade
    pub expectancy_r: Option<Decimal>,
    pub average_rr_on_wins: Option<Decimal>,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub best_pair: Option<PairPerformance>,
    pub worst_pair: Option<PairPerformance>,
}

/// One ISO week of trading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPerformance {
    /// Monday of the week
    pub week_start: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
    pub summary: PerformanceSummary,
}

/// R multiple realised by a trade, `None` for missed trades
pub fn r_outcome(trade: &Trade) -> Option<Decimal> {
    match trade.result {
        TradeResult::Win => Some(trade.rr.unwrap_or(Decimal::ONE)),
        TradeResult::Loss => Some(-Decimal::ONE),
        TradeResult::Breakeven => Some(Decimal::ZERO),
        TradeResult::Missed => None,
    }
}

pub fn summarize(trades: &[Trade]) -> PerformanceSummary {
    let stats = calculate_winrate(trades);

    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    for profit in trades.iter().filter_map(|t| t.profit) {
        if profit > Decimal::ZERO {
            gross_profit += profit;
        } else {
            gross_loss += profit;
        }
    }
    let net_profit = gross_profit + gross_loss;
    let profit_factor = if gross_loss < Decimal::ZERO {
        Some((gross_profit / gross_loss.abs()).round_dp(2))
    } else {
        None
    };

    let total_r: Decimal = trades.iter().filter_map(r_outcome).sum();
    let expectancy_r = if stats.decided() > 0 {
        Some((total_r / Decimal::from(stats.decided())).round_dp(2))
    } else {
        None
    };

    let win_rrs: Vec<Decimal> = trades
        .iter()
        .filter(|t| t.result == TradeResult::Win)
        .filter_map(|t| t.rr)
        .collect();
    let average_rr_on_wins = if win_rrs.is_empty() {
        None
    } else {
        let sum: Decimal = win_rrs.iter().sum();
        Some((sum / Decimal::from(win_rrs.len())).round_dp(2))
    };

    let (max_consecutive_wins, max_consecutive_losses) = streaks(trades);
    let (best_pair, worst_pair) = pair_extremes(trades);

    PerformanceSummary {
        stats,
        net_profit,
        gross_profit,
        gross_loss,
        profit_factor,
        total_r,
        expectancy_r,
        average_rr_on_wins,
        max_consecutive_wins,
        max_consecutive_losses,
        best_pair,
        worst_pair,
    }
}

/// Group trades by ISO week and summarise each, oldest week first
pub fn weekly_performance(trades: &[Trade]) -> Vec<WeeklyPerformance> {
    let mut weeks: BTreeMap<NaiveDate, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        weeks
            .entry(week_start(trade.date))
            .or_default()
            .push(trade.clone());
    }

    weeks
        .into_iter()
        .map(|(start, week_trades)| {
            let iso = start.iso_week();
            WeeklyPerformance {
                week_start: start,
                iso_year: iso.year(),
                iso_week: iso.week(),
                summary: summarize(&week_trades),
            }
        })
        .collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Longest win and loss runs over decided trades in (date, id) order
fn streaks(trades: &[Trade]) -> (usize, usize) {
    let mut decided: Vec<&Trade> = trades.iter().filter(|t| t.result.is_decided()).collect();
    decided.sort_by_key(|t| (t.date, t.id));

    let (mut max_wins, mut max_losses) = (0, 0);
    let (mut wins, mut losses) = (0, 0);
    for trade in decided {
        if trade.result == TradeResult::Win {
            wins += 1;
            losses = 0;
        } else {
            losses += 1;
            wins = 0;
        }
        max_wins = max_wins.max(wins);
        max_losses = max_losses.max(losses);
    }
    (max_wins, max_losses)
}

fn pair_extremes(trades: &[Trade]) -> (Option<PairPerformance>, Option<PairPerformance>) {
    let mut by_pair: BTreeMap<&str, PairPerformance> = BTreeMap::new();
    for trade in trades {
        let Some(r) = r_outcome(trade) else {
            continue;
        };
        let entry = by_pair
            .entry(trade.pair.as_str())
            .or_insert_with(|| PairPerformance {
                pair: trade.pair.clone(),
                trades: 0,
                total_r: Decimal::ZERO,
            });
        entry.trades += 1;
        entry.total_r += r;
    }

    let mut pairs: Vec<PairPerformance> = by_pair.into_values().collect();
    pairs.sort_by(|a, b| b.total_r.cmp(&a.total_r).then_with(|| a.pair.cmp(&b.pair)));

    (pairs.first().cloned(), pairs.last().cloned())
}
