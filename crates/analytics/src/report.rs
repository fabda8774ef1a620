//! Full analytics report for a journal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::performance::{summarize, weekly_performance, PerformanceSummary, WeeklyPerformance};
use crate::recommendations::{generate_recommendations, Recommendation, RecommendationConfig};
use crate::types::Trade;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub performance: PerformanceSummary,
    pub weekly: Vec<WeeklyPerformance>,
    pub recommendations: Vec<Recommendation>,
}

pub fn build_report(trades: &[Trade], config: &RecommendationConfig) -> AnalyticsReport {
    AnalyticsReport {
        generated_at: Utc::now(),
        performance: summarize(trades),
        weekly: weekly_performance(trades),
        recommendations: generate_recommendations(trades, config),
    }
}
