//! Parameter analyzer — win rate for trades matching named field-value constraints
//!
//! A slice is only reported when it holds at least `MIN_DECIDED_TRADES`
//! decided (win/loss) trades; smaller samples return `None`.

use tracing::trace;

use crate::types::{Condition, Trade, TradeField};
use crate::winrate::{calculate_winrate, WinrateStats};

/// Minimum decided trades for a slice to be reported
pub const MIN_DECIDED_TRADES: usize = 5;

/// Filters trades by conditions and computes their win rate
#[derive(Debug, Clone, Copy)]
pub struct ParameterAnalyzer {
    min_decided: usize,
}

impl ParameterAnalyzer {
    pub fn new(min_decided: usize) -> Self {
        Self { min_decided }
    }

    pub fn min_decided(&self) -> usize {
        self.min_decided
    }

    /// Win rate of trades matching all `conditions`, `None` below the minimum sample
    pub fn analyze(&self, trades: &[Trade], conditions: &[Condition]) -> Option<WinrateStats> {
        let stats = calculate_winrate(
            trades
                .iter()
                .filter(|t| conditions.iter().all(|c| t.matches(c))),
        );

        if stats.decided() < self.min_decided {
            trace!(
                conditions = conditions.len(),
                decided = stats.decided(),
                "Slice below minimum sample"
            );
            return None;
        }

        Some(stats)
    }

    pub fn analyze_single(
        &self,
        trades: &[Trade],
        field: TradeField,
        value: &str,
    ) -> Option<WinrateStats> {
        self.analyze(trades, &[Condition::new(field, value)])
    }

    pub fn analyze_pair(
        &self,
        trades: &[Trade],
        first: (TradeField, &str),
        second: (TradeField, &str),
    ) -> Option<WinrateStats> {
        self.analyze(
            trades,
            &[
                Condition::new(first.0, first.1),
                Condition::new(second.0, second.1),
            ],
        )
    }

    pub fn analyze_triple(
        &self,
        trades: &[Trade],
        first: (TradeField, &str),
        second: (TradeField, &str),
        third: (TradeField, &str),
    ) -> Option<WinrateStats> {
        self.analyze(
            trades,
            &[
                Condition::new(first.0, first.1),
                Condition::new(second.0, second.1),
                Condition::new(third.0, third.1),
            ],
        )
    }
}

impl Default for ParameterAnalyzer {
    fn default() -> Self {
        Self::new(MIN_DECIDED_TRADES)
    }
}

/// Win rate of trades matching all conditions, using the default minimum sample
pub fn analyze(trades: &[Trade], conditions: &[Condition]) -> Option<WinrateStats> {
    ParameterAnalyzer::default().analyze(trades, conditions)
}

pub fn analyze_single(trades: &[Trade], field: TradeField, value: &str) -> Option<WinrateStats> {
    ParameterAnalyzer::default().analyze_single(trades, field, value)
}

pub fn analyze_pair(
    trades: &[Trade],
    first: (TradeField, &str),
    second: (TradeField, &str),
) -> Option<WinrateStats> {
    ParameterAnalyzer::default().analyze_pair(trades, first, second)
}

pub fn analyze_triple(
    trades: &[Trade],
    first: (TradeField, &str),
    second: (TradeField, &str),
    third: (TradeField, &str),
) -> Option<WinrateStats> {
    ParameterAnalyzer::default().analyze_triple(trades, first, second, third)
}
