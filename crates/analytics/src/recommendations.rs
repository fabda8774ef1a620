//! Recommendation generator — scans the journal for high and low win-rate patterns
//!
//! Runs the parameter analyzer over every distinct value of each tracked
//! field, then over the configured field combinations, and reports the
//! slices whose win rate crosses the high or low threshold.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::analyzer::{ParameterAnalyzer, MIN_DECIDED_TRADES};
use crate::types::{Condition, Trade, TradeField};
use crate::winrate::WinrateStats;

// ============================================================================
// Types
// ============================================================================

/// Thresholds and scan layout for the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Win rate at or above which a slice is reported as a strength (default 60)
    pub high_threshold: f64,
    /// Win rate at or below which a slice is reported as a weakness (default 45)
    pub low_threshold: f64,
    /// Minimum decided trades per slice (default 5)
    pub min_decided_trades: usize,
    /// Cap on the returned list (default 10)
    pub max_results: usize,
    pub single_fields: Vec<TradeField>,
    pub combinations: Vec<Vec<TradeField>>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        use TradeField::*;
        Self {
            high_threshold: 60.0,
            low_threshold: 45.0,
            min_decided_trades: MIN_DECIDED_TRADES,
            max_results: 10,
            single_fields: TradeField::ALL.to_vec(),
            combinations: vec![
                vec![Pair, Session],
                vec![Pair, Direction],
                vec![Session, Direction],
                vec![Session, Setup],
                vec![Pair, Setup],
                vec![Setup, Timeframe],
                vec![Pair, Session, Direction],
                vec![Session, Direction, Setup],
                vec![Pair, Session, Setup],
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationScope {
    Single,
    Combination,
}

/// A reported pattern with its supporting trades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub scope: RecommendationScope,
    pub conditions: Vec<Condition>,
    pub stats: WinrateStats,
    pub trade_ids: Vec<i64>,
    pub title: String,
    pub description: String,
}

// ============================================================================
// Generation
// ============================================================================

/// Sorted distinct non-blank values of `field`
pub fn distinct_values<'a, I>(trades: I, field: TradeField) -> Vec<String>
where
    I: IntoIterator<Item = &'a Trade>,
{
    trades
        .into_iter()
        .filter_map(|t| t.field_value(field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Scan the journal and return ranked, capped recommendations
pub fn generate_recommendations(trades: &[Trade], config: &RecommendationConfig) -> Vec<Recommendation> {
    if trades.is_empty() {
        return Vec::new();
    }

    let analyzer = ParameterAnalyzer::new(config.min_decided_trades);
    let mut found = Vec::new();

    for &field in &config.single_fields {
        for value in distinct_values(trades, field) {
            let conditions = vec![Condition::new(field, value)];
            if let Some(rec) = evaluate(&analyzer, trades, conditions, config) {
                found.push(rec);
            }
        }
    }
    let single_count = found.len();

    for fields in &config.combinations {
        let fields = distinct_fields(fields);
        if fields.len() < 2 {
            continue;
        }
        let candidates: Vec<&Trade> = trades.iter().collect();
        for conditions in combination_conditions(&candidates, &fields, analyzer.min_decided()) {
            if let Some(rec) = evaluate(&analyzer, trades, conditions, config) {
                found.push(rec);
            }
        }
    }

    debug!(
        single = single_count,
        combinations = found.len() - single_count,
        "Patterns crossing thresholds"
    );

    rank(&mut found);
    found.truncate(config.max_results);

    info!(
        trades = trades.len(),
        recommendations = found.len(),
        "Recommendations generated"
    );

    found
}

/// Fields in their configured order with repeats removed
fn distinct_fields(fields: &[TradeField]) -> Vec<TradeField> {
    let mut out: Vec<TradeField> = Vec::with_capacity(fields.len());
    for &field in fields {
        if !out.contains(&field) {
            out.push(field);
        }
    }
    out
}

/// Condition sets for every value combination of `fields` present in the journal.
///
/// Values are enumerated level by level over the trades still matching the
/// outer constraints, so combinations with no trades are never produced, and
/// a branch is pruned once it holds fewer decided trades than `min_decided`.
fn combination_conditions(
    trades: &[&Trade],
    fields: &[TradeField],
    min_decided: usize,
) -> Vec<Vec<Condition>> {
    let Some((&field, rest)) = fields.split_first() else {
        return vec![Vec::new()];
    };

    let mut out = Vec::new();
    for value in distinct_values(trades.iter().copied(), field) {
        let condition = Condition::new(field, value);
        let narrowed: Vec<&Trade> = trades
            .iter()
            .copied()
            .filter(|t| t.matches(&condition))
            .collect();

        let decided = narrowed.iter().filter(|t| t.result.is_decided()).count();
        if decided < min_decided {
            continue;
        }

        for mut tail in combination_conditions(&narrowed, rest, min_decided) {
            tail.insert(0, condition.clone());
            out.push(tail);
        }
    }
    out
}

fn evaluate(
    analyzer: &ParameterAnalyzer,
    trades: &[Trade],
    conditions: Vec<Condition>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    let stats = analyzer.analyze(trades, &conditions)?;
    // Breakeven/missed-only slices have no win rate to classify
    if stats.decided() == 0 {
        return None;
    }

    let kind = if stats.win_rate >= config.high_threshold {
        RecommendationKind::High
    } else if stats.win_rate <= config.low_threshold {
        RecommendationKind::Low
    } else {
        return None;
    };

    Some(build_recommendation(kind, conditions, stats))
}

fn build_recommendation(
    kind: RecommendationKind,
    conditions: Vec<Condition>,
    stats: WinrateStats,
) -> Recommendation {
    let scope = if conditions.len() > 1 {
        RecommendationScope::Combination
    } else {
        RecommendationScope::Single
    };

    let subject = describe_conditions(&conditions);
    let values = conditions
        .iter()
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(" · ");

    let (title, advice) = match kind {
        RecommendationKind::High => (
            format!("High win rate: {}", values),
            "Consider prioritising trades that match this pattern.",
        ),
        RecommendationKind::Low => (
            format!("Low win rate: {}", values),
            "Consider avoiding or reviewing trades that match this pattern.",
        ),
    };

    let description = format!(
        "{} has a win rate of {:.1}% over {} decided trades ({}W / {}L). {}",
        subject,
        stats.win_rate,
        stats.decided(),
        stats.wins,
        stats.losses,
        advice
    );

    Recommendation {
        id: recommendation_id(&conditions),
        kind,
        scope,
        trade_ids: stats.trade_ids.clone(),
        conditions,
        stats,
        title,
        description,
    }
}

/// "Pair EURUSD + Session London"
fn describe_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|c| format!("{} {}", c.field, c.value))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Stable short id derived from the conditions
fn recommendation_id(conditions: &[Condition]) -> String {
    let mut hasher = Sha256::new();
    for c in conditions {
        hasher.update(c.field.label().as_bytes());
        hasher.update(b"=");
        hasher.update(c.value.as_bytes());
        hasher.update(b";");
    }
    let hash = format!("{:x}", hasher.finalize());
    hash[..12].to_string()
}

fn rank(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| {
        let by_kind = kind_order(a.kind).cmp(&kind_order(b.kind));
        let by_rate = match a.kind {
            RecommendationKind::High => b
                .stats
                .win_rate
                .partial_cmp(&a.stats.win_rate)
                .unwrap_or(Ordering::Equal),
            RecommendationKind::Low => a
                .stats
                .win_rate
                .partial_cmp(&b.stats.win_rate)
                .unwrap_or(Ordering::Equal),
        };
        by_kind
            .then(by_rate)
            .then(b.stats.decided().cmp(&a.stats.decided()))
            .then(a.conditions.len().cmp(&b.conditions.len()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn kind_order(kind: RecommendationKind) -> u8 {
    match kind {
        RecommendationKind::High => 0,
        RecommendationKind::Low => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, TradeResult};
    use chrono::NaiveDate;

    fn make_trade(
        id: i64,
        pair: &str,
        session: &str,
        direction: Direction,
        result: TradeResult,
    ) -> Trade {
        let mut t = Trade::new(
            id,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            pair,
            result,
        );
        t.session = Some(session.into());
        t.direction = Some(direction);
        t
    }

    /// EURUSD London wins 6/7, GBPUSD New York loses 5/6, USDJPY sits at 50%
    fn journal() -> Vec<Trade> {
        use Direction::*;
        use TradeResult::*;
        let mut trades = Vec::new();
        let mut id = 0;
        let mut push = |pair: &str, session: &str, dir: Direction, res: TradeResult| {
            id += 1;
            trades.push(make_trade(id, pair, session, dir, res));
        };

        for _ in 0..6 {
            push("EURUSD", "London", Long, Win);
        }
        push("EURUSD", "London", Long, Loss);

        push("GBPUSD", "New York", Short, Win);
        for _ in 0..5 {
            push("GBPUSD", "New York", Short, Loss);
        }

        for _ in 0..3 {
            push("USDJPY", "Asia", Long, Win);
            push("USDJPY", "Asia", Short, Loss);
        }
        trades
    }

    fn singles_only() -> RecommendationConfig {
        RecommendationConfig {
            single_fields: vec![TradeField::Pair],
            combinations: Vec::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_distinct_values_are_sorted_and_skip_blanks() {
        let mut trades = journal();
        trades[0].setup = Some("Breaker".into());
        trades[1].setup = Some("  ".into());
        trades[2].setup = Some("Order block".into());
        trades[3].setup = Some("Breaker".into());

        assert_eq!(
            distinct_values(&trades, TradeField::Pair),
            vec!["EURUSD", "GBPUSD", "USDJPY"]
        );
        assert_eq!(
            distinct_values(&trades, TradeField::Setup),
            vec!["Breaker", "Order block"]
        );
    }

    #[test]
    fn test_empty_journal() {
        assert!(generate_recommendations(&[], &RecommendationConfig::default()).is_empty());
    }

    #[test]
    fn test_single_field_classification() {
        let recs = generate_recommendations(&journal(), &singles_only());

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].kind, RecommendationKind::High);
        assert_eq!(recs[0].conditions, vec![Condition::new(TradeField::Pair, "EURUSD")]);
        assert_eq!(recs[0].scope, RecommendationScope::Single);
        assert_eq!(recs[0].trade_ids, (1..=7).collect::<Vec<i64>>());

        assert_eq!(recs[1].kind, RecommendationKind::Low);
        assert_eq!(recs[1].conditions, vec![Condition::new(TradeField::Pair, "GBPUSD")]);
        // USDJPY at 50% is neither high nor low
        assert!(recs
            .iter()
            .all(|r| r.conditions[0].value != "USDJPY"));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let config = RecommendationConfig {
            high_threshold: 50.0,
            low_threshold: 10.0,
            ..singles_only()
        };
        let recs = generate_recommendations(&journal(), &config);
        let values: Vec<&str> = recs.iter().map(|r| r.conditions[0].value.as_str()).collect();
        assert_eq!(values, vec!["EURUSD", "USDJPY"]);
    }

    #[test]
    fn test_description_text() {
        let recs = generate_recommendations(&journal(), &singles_only());
        assert_eq!(recs[0].title, "High win rate: EURUSD");
        assert_eq!(
            recs[0].description,
            "Pair EURUSD has a win rate of 85.7% over 7 decided trades (6W / 1L). \
             Consider prioritising trades that match this pattern."
        );
        assert!(recs[1].description.starts_with("Pair GBPUSD has a win rate of 16.7%"));
        assert!(recs[1].description.contains("avoiding"));
    }

    #[test]
    fn test_combinations_are_reported() {
        let config = RecommendationConfig {
            single_fields: Vec::new(),
            combinations: vec![vec![TradeField::Pair, TradeField::Session]],
            ..Default::default()
        };
        let recs = generate_recommendations(&journal(), &config);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.scope == RecommendationScope::Combination));
        assert_eq!(
            recs[0].conditions,
            vec![
                Condition::new(TradeField::Pair, "EURUSD"),
                Condition::new(TradeField::Session, "London"),
            ]
        );
        assert_eq!(recs[0].title, "High win rate: EURUSD · London");
        assert!(recs[0]
            .description
            .starts_with("Pair EURUSD + Session London has a win rate of 85.7%"));
    }

    #[test]
    fn test_combination_enumeration_skips_empty_and_small_branches() {
        let trades = journal();
        let refs: Vec<&Trade> = trades.iter().collect();
        let combos = combination_conditions(
            &refs,
            &[TradeField::Pair, TradeField::Direction],
            MIN_DECIDED_TRADES,
        );
        // USDJPY splits into 3 Long / 3 Short which fall below the minimum
        assert_eq!(combos.len(), 2);
        assert!(combos.iter().all(|c| c.len() == 2));
        assert_eq!(combos[0][0].value, "EURUSD");
        assert_eq!(combos[0][1].value, "Long");
        assert_eq!(combos[1][0].value, "GBPUSD");
        assert_eq!(combos[1][1].value, "Short");
    }

    #[test]
    fn test_ranking_and_cap() {
        let recs = generate_recommendations(&journal(), &RecommendationConfig::default());
        assert!(!recs.is_empty());
        assert!(recs.len() <= 10);

        let first_low = recs
            .iter()
            .position(|r| r.kind == RecommendationKind::Low)
            .unwrap_or(recs.len());
        assert!(recs[..first_low].iter().all(|r| r.kind == RecommendationKind::High));
        assert!(recs[first_low..].iter().all(|r| r.kind == RecommendationKind::Low));

        for pair in recs[..first_low].windows(2) {
            assert!(pair[0].stats.win_rate >= pair[1].stats.win_rate);
        }
        for pair in recs[first_low..].windows(2) {
            assert!(pair[0].stats.win_rate <= pair[1].stats.win_rate);
        }

        let capped = generate_recommendations(
            &journal(),
            &RecommendationConfig {
                max_results: 3,
                ..Default::default()
            },
        );
        assert_eq!(capped.len(), 3);
    }

    #[test]
    fn test_ties_prefer_larger_sample_then_fewer_conditions() {
        let config = RecommendationConfig {
            single_fields: vec![TradeField::Pair, TradeField::Session],
            combinations: vec![vec![TradeField::Pair, TradeField::Session]],
            ..Default::default()
        };
        let recs = generate_recommendations(&journal(), &config);
        let eurusd: Vec<_> = recs
            .iter()
            .filter(|r| r.stats.trade_ids == (1..=7).collect::<Vec<i64>>())
            .collect();
        // Pair, Session and Pair+Session all cover the same seven trades
        assert_eq!(eurusd.len(), 3);
        assert_eq!(eurusd[2].scope, RecommendationScope::Combination);
    }

    #[test]
    fn test_low_threshold_is_inclusive() {
        let config = RecommendationConfig {
            high_threshold: 90.0,
            low_threshold: 50.0,
            ..singles_only()
        };
        let recs = generate_recommendations(&journal(), &config);
        assert!(recs.iter().all(|r| r.kind == RecommendationKind::Low));
        let values: Vec<&str> = recs.iter().map(|r| r.conditions[0].value.as_str()).collect();
        // USDJPY sits exactly on the low bound
        assert_eq!(values, vec!["GBPUSD", "USDJPY"]);
        assert_eq!(recs[1].stats.win_rate, 50.0);
    }

    #[test]
    fn test_equal_win_rate_ranks_larger_sample_first() {
        use Direction::*;
        use TradeResult::*;
        let mut trades = Vec::new();
        // GBPUSD 3W / 1L listed first so input order cannot decide the ranking
        for (id, res) in [(1, Win), (2, Win), (3, Win), (4, Loss)] {
            trades.push(make_trade(id, "GBPUSD", "London", Long, res));
        }
        for id in 5..=12 {
            let res = if id <= 10 { Win } else { Loss };
            trades.push(make_trade(id, "EURUSD", "London", Long, res));
        }

        let config = RecommendationConfig {
            min_decided_trades: 4,
            ..singles_only()
        };
        let recs = generate_recommendations(&trades, &config);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].stats.win_rate, recs[1].stats.win_rate);
        assert_eq!(recs[0].conditions[0].value, "EURUSD");
        assert_eq!(recs[0].stats.decided(), 8);
        assert_eq!(recs[1].conditions[0].value, "GBPUSD");
        assert_eq!(recs[1].stats.decided(), 4);
    }

    #[test]
    fn test_slices_without_decided_trades_are_not_classified() {
        use Direction::*;
        use TradeResult::*;
        let trades = vec![
            make_trade(1, "EURUSD", "London", Long, Breakeven),
            make_trade(2, "EURUSD", "London", Long, Breakeven),
            make_trade(3, "EURUSD", "London", Long, Missed),
        ];
        let config = RecommendationConfig {
            min_decided_trades: 0,
            single_fields: vec![TradeField::Pair],
            combinations: vec![vec![TradeField::Pair, TradeField::Session]],
            ..Default::default()
        };
        assert!(generate_recommendations(&trades, &config).is_empty());
    }

    #[test]
    fn test_repeated_combination_fields_are_collapsed() {
        let only_repeats = RecommendationConfig {
            single_fields: Vec::new(),
            combinations: vec![vec![TradeField::Pair, TradeField::Pair]],
            ..Default::default()
        };
        assert!(generate_recommendations(&journal(), &only_repeats).is_empty());

        let with_repeat = RecommendationConfig {
            single_fields: Vec::new(),
            combinations: vec![vec![TradeField::Pair, TradeField::Pair, TradeField::Session]],
            ..Default::default()
        };
        let plain = RecommendationConfig {
            single_fields: Vec::new(),
            combinations: vec![vec![TradeField::Pair, TradeField::Session]],
            ..Default::default()
        };
        let ids = |config: &RecommendationConfig| -> Vec<String> {
            generate_recommendations(&journal(), config)
                .into_iter()
                .map(|r| r.id)
                .collect()
        };
        assert_eq!(ids(&with_repeat), ids(&plain));
        assert!(generate_recommendations(&journal(), &with_repeat)
            .iter()
            .all(|r| r.conditions.len() == 2));
    }

    #[test]
    fn test_ids_are_stable_and_distinct() {
        let a = recommendation_id(&[Condition::new(TradeField::Pair, "EURUSD")]);
        let b = recommendation_id(&[Condition::new(TradeField::Pair, "EURUSD")]);
        let c = recommendation_id(&[Condition::new(TradeField::Session, "EURUSD")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RecommendationConfig =
            serde_json::from_str(r#"{ "high_threshold": 70.0, "max_results": 3 }"#).unwrap();
        assert_eq!(config.high_threshold, 70.0);
        assert_eq!(config.low_threshold, 45.0);
        assert_eq!(config.max_results, 3);
        assert_eq!(config.min_decided_trades, MIN_DECIDED_TRADES);
        assert_eq!(config.combinations.len(), 9);
    }
}
