//! Win-rate calculation over a list of trades
//!
//! Only decided trades (Win or Loss) count towards the percentage. Breakeven
//! and missed trades are counted but never move the win rate.

use serde::{Deserialize, Serialize};

use crate::types::{Trade, TradeResult};

/// Outcome counts and win rate for a slice of trades
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinrateStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub missed: usize,
    /// Percentage of decided trades that were wins (0.0 - 100.0)
    pub win_rate: f64,
    pub trade_ids: Vec<i64>,
}

impl WinrateStats {
    /// Wins plus losses
    pub fn decided(&self) -> usize {
        self.wins + self.losses
    }
}

/// Reduce a trade list into outcome counts and a win-rate percentage
pub fn calculate_winrate<'a, I>(trades: I) -> WinrateStats
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut stats = WinrateStats::default();

    for trade in trades {
        stats.total += 1;
        stats.trade_ids.push(trade.id);
        match trade.result {
            TradeResult::Win => stats.wins += 1,
            TradeResult::Loss => stats.losses += 1,
            TradeResult::Breakeven => stats.breakevens += 1,
            TradeResult::Missed => stats.missed += 1,
        }
    }

    let decided = stats.decided();
    stats.win_rate = if decided > 0 {
        stats.wins as f64 * 100.0 / decided as f64
    } else {
        0.0
    };

    stats
}
