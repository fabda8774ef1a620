//! Axum JSON API over the journal analytics

use analytics::{
    build_report, calculate_winrate, generate_recommendations, load_journal, summarize,
    validate_trades, weekly_performance, RecommendationConfig, Trade, TradeFilter,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::APP_VERSION;

#[derive(Clone)]
pub struct AppState {
    pub journal_path: PathBuf,
    pub trades: Arc<RwLock<Vec<Trade>>>,
    pub config: Arc<RecommendationConfig>,
}

impl AppState {
    pub fn new(journal_path: PathBuf, trades: Vec<Trade>, config: RecommendationConfig) -> Self {
        Self {
            journal_path,
            trades: Arc::new(RwLock::new(trades)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api_health))
        .route("/summary", get(api_summary))
        .route("/recommendations", get(api_recommendations))
        .route("/weekly", get(api_weekly))
        .route("/analyze", post(api_analyze))
        .route("/journal/reload", post(api_reload))
        .with_state(state)
}

/// Query params shared by the read endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisParams {
    account_id: Option<i64>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    top_n: Option<usize>,
    high: Option<f64>,
    low: Option<f64>,
    min_trades: Option<usize>,
}

impl AnalysisParams {
    fn filter(&self) -> TradeFilter {
        TradeFilter {
            account_id: self.account_id,
            from: self.from,
            to: self.to,
        }
    }

    fn config(&self, base: &RecommendationConfig) -> RecommendationConfig {
        let mut config = base.clone();
        if let Some(top_n) = self.top_n {
            config.max_results = top_n;
        }
        if let Some(high) = self.high {
            config.high_threshold = high;
        }
        if let Some(low) = self.low {
            config.low_threshold = low;
        }
        if let Some(min) = self.min_trades {
            config.min_decided_trades = min;
        }
        config
    }
}

async fn filtered_trades(state: &AppState, params: &AnalysisParams) -> Vec<Trade> {
    let trades = state.trades.read().await;
    params.filter().apply(&trades)
}

/// GET /api/health
async fn api_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let trades = state.trades.read().await.len();
    Json(serde_json::json!({
        "status": "ok",
        "service": "trade-journal",
        "version": APP_VERSION,
        "trades": trades,
    }))
}

/// GET /api/summary — overall win rate and performance
async fn api_summary(
    State(state): State<AppState>,
    Query(params): Query<AnalysisParams>,
) -> Json<serde_json::Value> {
    let trades = filtered_trades(&state, &params).await;
    Json(serde_json::json!({
        "success": true,
        "winrate": calculate_winrate(&trades),
        "performance": summarize(&trades),
    }))
}

/// GET /api/recommendations — ranked patterns over the loaded journal
async fn api_recommendations(
    State(state): State<AppState>,
    Query(params): Query<AnalysisParams>,
) -> Json<serde_json::Value> {
    let trades = filtered_trades(&state, &params).await;
    let config = params.config(&state.config);
    let recommendations = generate_recommendations(&trades, &config);

    Json(serde_json::json!({
        "success": true,
        "trades_analyzed": trades.len(),
        "total": recommendations.len(),
        "data": recommendations,
    }))
}

/// GET /api/weekly — per ISO week performance
async fn api_weekly(
    State(state): State<AppState>,
    Query(params): Query<AnalysisParams>,
) -> Json<serde_json::Value> {
    let trades = filtered_trades(&state, &params).await;
    let weeks = weekly_performance(&trades);
    Json(serde_json::json!({
        "success": true,
        "total": weeks.len(),
        "data": weeks,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    trades: Vec<Trade>,
    #[serde(default)]
    config: Option<RecommendationConfig>,
}

/// POST /api/analyze — full report over posted trades, journal untouched
async fn api_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(e) = validate_trades(&request.trades) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "success": false,
                "error": e.to_string(),
            })),
        ));
    }

    let config = request
        .config
        .unwrap_or_else(|| state.config.as_ref().clone());
    info!(trades = request.trades.len(), "Analyzing posted trades");
    let report = build_report(&request.trades, &config);

    Ok(Json(serde_json::json!({
        "success": true,
        "report": report,
    })))
}

/// POST /api/journal/reload — re-read the journal file
async fn api_reload(State(state): State<AppState>) -> Json<serde_json::Value> {
    match load_journal(&state.journal_path) {
        Ok(trades) => {
            let count = trades.len();
            *state.trades.write().await = trades;
            info!(trades = count, "Journal reloaded via API");
            Json(serde_json::json!({
                "success": true,
                "trades": count,
            }))
        }
        Err(e) => {
            error!("Journal reload failed: {}", e);
            Json(serde_json::json!({
                "success": false,
                "error": format!("Failed to reload journal: {}", e),
            }))
        }
    }
}
