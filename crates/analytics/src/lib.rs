//! Trade Journal Analytics — win rates, patterns and performance reviews
//!
//! Provides:
//! - Win-rate calculation over logged trades
//! - Parameter analyzer over named field-value constraints
//! - Recommendation generator for high and low win-rate patterns
//! - Overall and weekly performance summaries
//! - Journal export loading and filtering

pub mod analyzer;
pub mod journal;
pub mod performance;
pub mod recommendations;
pub mod report;
pub mod types;
pub mod winrate;

// Re-exports for convenience
pub use analyzer::{
    analyze, analyze_pair, analyze_single, analyze_triple, ParameterAnalyzer, MIN_DECIDED_TRADES,
};
pub use journal::{
    load_journal, parse_journal, validate_trades, JournalError, JournalResult, TradeFilter,
};
pub use performance::{
    r_outcome, summarize, weekly_performance, PairPerformance, PerformanceSummary,
    WeeklyPerformance,
};
pub use recommendations::{
    distinct_values, generate_recommendations, Recommendation, RecommendationConfig,
    RecommendationKind, RecommendationScope,
};
pub use report::{build_report, AnalyticsReport};
pub use types::*;
pub use winrate::{calculate_winrate, WinrateStats};
