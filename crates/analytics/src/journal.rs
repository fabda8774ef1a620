//! Journal export loading, validation and filtering

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::Trade;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to read journal {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid journal JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate trade id {0}")]
    DuplicateTradeId(i64),

    #[error("Invalid trade {id}: {reason}")]
    InvalidTrade { id: i64, reason: String },
}

pub type JournalResult<T> = Result<T, JournalError>;

/// Export object wrapping the trade array
#[derive(Deserialize)]
struct JournalExport {
    trades: Vec<Trade>,
}

/// Parse and validate journal JSON, either a bare trade array or `{ "trades": [...] }`
pub fn parse_journal(text: &str) -> JournalResult<Vec<Trade>> {
    let trades = match text.trim_start().as_bytes().first() {
        Some(b'{') => serde_json::from_str::<JournalExport>(text)?.trades,
        _ => serde_json::from_str::<Vec<Trade>>(text)?,
    };
    validate_trades(&trades)?;
    Ok(trades)
}

/// Load and validate a journal export from disk
pub fn load_journal(path: impl AsRef<Path>) -> JournalResult<Vec<Trade>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| JournalError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let trades = parse_journal(&text)?;
    info!(path = %path.display(), trades = trades.len(), "Journal loaded");
    Ok(trades)
}

/// Reject duplicate ids and trades without a pair
pub fn validate_trades(trades: &[Trade]) -> JournalResult<()> {
    let mut seen = HashSet::with_capacity(trades.len());
    for trade in trades {
        if !seen.insert(trade.id) {
            return Err(JournalError::DuplicateTradeId(trade.id));
        }
        if trade.pair.trim().is_empty() {
            return Err(JournalError::InvalidTrade {
                id: trade.id,
                reason: "pair is empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Account and inclusive date-range filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFilter {
    pub account_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(account) = self.account_id {
            if trade.account_id != Some(account) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if trade.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if trade.date > to {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        let kept: Vec<Trade> = trades.iter().filter(|t| self.matches(t)).cloned().collect();
        debug!(
            before = trades.len(),
            after = kept.len(),
            account_id = ?self.account_id,
            "Journal filtered"
        );
        kept
    }
}
