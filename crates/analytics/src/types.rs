//! Types for the trade journal

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of a logged trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
    Missed,
}

impl TradeResult {
    /// Win and Loss are the only outcomes that count towards a win rate
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Win | Self::Loss)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Win => "Win",
            Self::Loss => "Loss",
            Self::Breakeven => "Breakeven",
            Self::Missed => "Missed",
        }
    }
}

impl std::str::FromStr for TradeResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(Self::Win),
            "loss" => Ok(Self::Loss),
            "breakeven" | "break even" | "be" => Ok(Self::Breakeven),
            "missed" => Ok(Self::Missed),
            other => Err(format!("unknown trade result '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for TradeResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Long => "Long",
            Self::Short => "Short",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Self::Long),
            "short" | "sell" => Ok(Self::Short),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single logged trade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    #[serde(default)]
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub pair: String,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub session: Option<String>,
    /// Entry model / setup name
    #[serde(default)]
    pub setup: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    /// Bias carried over from the linked pre-session plan
    #[serde(default)]
    pub bias: Option<String>,
    pub result: TradeResult,
    /// Risk as percent of the account (e.g. 1.0 = 1%)
    #[serde(default)]
    pub risk: Option<Decimal>,
    /// Realised reward-to-risk multiple
    #[serde(default)]
    pub rr: Option<Decimal>,
    /// Realised P&L in account currency
    #[serde(default)]
    pub profit: Option<Decimal>,
    #[serde(default)]
    pub pre_session_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Trade {
    /// Minimal trade; remaining fields default to empty
    pub fn new(id: i64, date: NaiveDate, pair: impl Into<String>, result: TradeResult) -> Self {
        Self {
            id,
            account_id: None,
            date,
            pair: pair.into(),
            direction: None,
            session: None,
            setup: None,
            timeframe: None,
            bias: None,
            result,
            risk: None,
            rr: None,
            profit: None,
            pre_session_id: None,
            notes: None,
        }
    }

    /// Text value of a tracked field, `None` when absent or blank
    pub fn field_value(&self, field: TradeField) -> Option<String> {
        let value = match field {
            TradeField::Pair => Some(self.pair.clone()),
            TradeField::Direction => self.direction.map(|d| d.label().to_string()),
            TradeField::Session => self.session.clone(),
            TradeField::Setup => self.setup.clone(),
            TradeField::Timeframe => self.timeframe.clone(),
            TradeField::Bias => self.bias.clone(),
            TradeField::Weekday => Some(weekday_name(self.date.weekday()).to_string()),
            TradeField::Risk => self.risk.map(|r| format!("{}%", r.normalize())),
            TradeField::Planned => {
                let label = if self.pre_session_id.is_some() {
                    "With plan"
                } else {
                    "Without plan"
                };
                Some(label.to_string())
            }
        }?;

        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// True when the trade's value for `condition.field` equals `condition.value`
    pub fn matches(&self, condition: &Condition) -> bool {
        self.field_value(condition.field)
            .is_some_and(|v| v == condition.value.trim())
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Trade fields the analyzer can constrain on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeField {
    Pair,
    Direction,
    Session,
    Setup,
    Timeframe,
    Bias,
    Weekday,
    Risk,
    Planned,
}

impl TradeField {
    pub const ALL: [TradeField; 9] = [
        TradeField::Pair,
        TradeField::Direction,
        TradeField::Session,
        TradeField::Setup,
        TradeField::Timeframe,
        TradeField::Bias,
        TradeField::Weekday,
        TradeField::Risk,
        TradeField::Planned,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pair => "Pair",
            Self::Direction => "Direction",
            Self::Session => "Session",
            Self::Setup => "Setup",
            Self::Timeframe => "Timeframe",
            Self::Bias => "Bias",
            Self::Weekday => "Weekday",
            Self::Risk => "Risk",
            Self::Planned => "Pre-session plan",
        }
    }
}

impl std::fmt::Display for TradeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One named field-value constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: TradeField,
    pub value: String,
}

impl Condition {
    pub fn new(field: TradeField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}
