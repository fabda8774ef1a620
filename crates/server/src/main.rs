//! Trade Journal — win-rate patterns and performance reviews for a trading journal
//!
//! Usage:
//!   trade-journal analyze --file journal.json    — Print ranked recommendations
//!   trade-journal weekly --file journal.json     — Print weekly performance
//!   trade-journal serve --port 3002              — Launch the JSON API

mod api;

use analytics::{
    calculate_winrate, generate_recommendations, load_journal, summarize, weekly_performance,
    PerformanceSummary, Recommendation, RecommendationConfig, RecommendationKind, TradeFilter,
    WeeklyPerformance,
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

pub const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

const DEFAULT_JOURNAL_PATH: &str = "data/journal.json";

#[derive(Parser)]
#[command(name = "trade-journal")]
#[command(about = "Win-rate patterns and performance reviews for a trading journal", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the analytics web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3002)]
        port: u16,
        /// Journal export (JSON)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Scan the journal and print ranked recommendations
    Analyze {
        /// Journal export (JSON)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Only trades from this account
        #[arg(long)]
        account: Option<i64>,
        /// First trade date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last trade date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Number of recommendations to return
        #[arg(long, default_value_t = 10)]
        top_n: usize,
        /// High win-rate threshold (%)
        #[arg(long, default_value_t = 60.0)]
        high: f64,
        /// Low win-rate threshold (%)
        #[arg(long, default_value_t = 45.0)]
        low: f64,
        /// Minimum decided trades per pattern
        #[arg(long, default_value_t = analytics::MIN_DECIDED_TRADES)]
        min_trades: usize,
        /// Optional JSON export path
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print performance per ISO week
    Weekly {
        /// Journal export (JSON)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Only trades from this account
        #[arg(long)]
        account: Option<i64>,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,analytics=debug,trade_journal=debug")
    } else {
        EnvFilter::new("info,analytics=info,trade_journal=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

/// Flag, then `TRADE_JOURNAL_PATH`, then the default location
fn journal_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("TRADE_JOURNAL_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Serve { host, port, file } => {
            cmd_serve(&host, port, journal_path(file)).await?;
        }
        Commands::Analyze {
            file,
            account,
            from,
            to,
            top_n,
            high,
            low,
            min_trades,
            export,
        } => {
            let filter = TradeFilter {
                account_id: account,
                from,
                to,
            };
            let config = RecommendationConfig {
                high_threshold: high,
                low_threshold: low,
                min_decided_trades: min_trades,
                max_results: top_n,
                ..Default::default()
            };
            cmd_analyze(journal_path(file), filter, config, export)?;
        }
        Commands::Weekly { file, account } => {
            let filter = TradeFilter {
                account_id: account,
                ..Default::default()
            };
            cmd_weekly(journal_path(file), filter)?;
        }
    }

    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(host: &str, port: u16, path: PathBuf) -> anyhow::Result<()> {
    info!("Trade Journal v{} starting...", APP_VERSION);

    let trades = load_journal(&path).map_err(|e| {
        error!("Failed to load journal: {}", e);
        anyhow::anyhow!("Journal load failed: {}", e)
    })?;
    let trade_count = trades.len();
    let state = api::AppState::new(path.clone(), trades, RecommendationConfig::default());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let exe_path = std::env::current_exe().unwrap_or_default();
    let exe_dir = exe_path.parent().unwrap_or(std::path::Path::new("."));
    let dist_dir = exe_dir.join("dist");
    let static_dir = if dist_dir.exists() {
        dist_dir
    } else {
        PathBuf::from("dist")
    };

    let app = axum::Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(&static_dir))
        .layer(cors);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Trade Journal v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health            - Health check");
    println!("  GET  /api/summary           - Overall win rate and performance");
    println!("  GET  /api/recommendations   - Ranked win-rate patterns");
    println!("  GET  /api/weekly            - Performance per ISO week");
    println!("  POST /api/analyze           - Full report over posted trades");
    println!("  POST /api/journal/reload    - Re-read the journal file");
    println!("\n  Journal: {} ({} trades)", path.display(), trade_count);
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Analyze command — CLI report
// ============================================================================

fn cmd_analyze(
    path: PathBuf,
    filter: TradeFilter,
    config: RecommendationConfig,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("\n=== Trade Journal v{} ===", APP_VERSION);

    let trades = filter.apply(&load_journal(&path)?);
    println!("Journal: {} ({} trades after filters)", path.display(), trades.len());
    println!(
        "Thresholds: high >= {:.1}% | low <= {:.1}% | min {} decided trades",
        config.high_threshold, config.low_threshold, config.min_decided_trades
    );

    let summary = summarize(&trades);
    print_summary(&summary);

    let recommendations = generate_recommendations(&trades, &config);
    if recommendations.is_empty() {
        println!("\nNo patterns crossed the thresholds.");
    } else {
        print_recommendations(&recommendations);
    }

    if let Some(export_path) = export {
        let export_data = serde_json::json!({
            "generated_at": Utc::now().to_rfc3339(),
            "journal": path.display().to_string(),
            "filters": filter,
            "config": config,
            "winrate": calculate_winrate(&trades),
            "performance": summary,
            "recommendations": recommendations,
        });
        let json = serde_json::to_string_pretty(&export_data)?;
        std::fs::write(&export_path, &json)?;
        println!("\nReport exported to {}", export_path.display());
    }

    Ok(())
}

fn print_summary(summary: &PerformanceSummary) {
    let stats = &summary.stats;
    println!("\nOverall:");
    println!(
        "  {} trades | {}W / {}L / {}BE / {} missed | Win rate {:.1}%",
        stats.total, stats.wins, stats.losses, stats.breakevens, stats.missed, stats.win_rate
    );
    println!(
        "  Net P&L {} | Total {}R | Expectancy {} | Profit factor {}",
        signed(summary.net_profit),
        signed(summary.total_r),
        fmt_opt_r(summary.expectancy_r),
        summary
            .profit_factor
            .map(|pf| pf.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    println!(
        "  Longest streaks: {} wins, {} losses",
        summary.max_consecutive_wins, summary.max_consecutive_losses
    );
}

fn print_recommendations(recs: &[Recommendation]) {
    println!("\nTop {} Patterns:", recs.len());
    println!(
        "  {:>3}  {:<5} {:<40} {:>7} {:>8}",
        "#", "Kind", "Pattern", "WR%", "Trades"
    );
    println!("  {}", "-".repeat(68));
    for (i, r) in recs.iter().enumerate() {
        let kind = match r.kind {
            RecommendationKind::High => "HIGH",
            RecommendationKind::Low => "LOW",
        };
        let pattern = r
            .conditions
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:>3}  {:<5} {:<40} {:>6.1}% {:>8}",
            i + 1,
            kind,
            pattern,
            r.stats.win_rate,
            r.stats.decided(),
        );
    }
    println!();
    for r in recs {
        println!("  - {}", r.description);
    }
}

// ============================================================================
// Weekly command
// ============================================================================

fn cmd_weekly(path: PathBuf, filter: TradeFilter) -> anyhow::Result<()> {
    let trades = filter.apply(&load_journal(&path)?);
    let weeks = weekly_performance(&trades);
    if weeks.is_empty() {
        println!("\nNo trades in journal.");
        return Ok(());
    }
    print_weeks(&weeks);
    Ok(())
}

fn print_weeks(weeks: &[WeeklyPerformance]) {
    println!(
        "\n  {:<10} {:>8} {:>7} {:>7} {:>8} {:>12} {:<10}",
        "Week", "Start", "Trades", "WR%", "R", "P&L", "Best pair"
    );
    println!("  {}", "-".repeat(70));
    for w in weeks {
        let s = &w.summary;
        println!(
            "  {:<10} {:>8} {:>7} {:>6.1}% {:>8} {:>12} {:<10}",
            format!("{}-W{:02}", w.iso_year, w.iso_week),
            w.week_start.format("%m-%d"),
            s.stats.total,
            s.stats.win_rate,
            signed(s.total_r),
            signed(s.net_profit),
            s.best_pair
                .as_ref()
                .map(|p| p.pair.as_str())
                .unwrap_or("-"),
        );
    }
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn fmt_opt_r(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{}R", signed(v)))
        .unwrap_or_else(|| "-".to_string())
}
