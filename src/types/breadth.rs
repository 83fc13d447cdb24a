use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};

/// Exchange whose advance/decline breadth is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Nasdaq,
    Nyse,
}

impl Exchange {
    pub const ALL: [Exchange; 2] = [Exchange::Nasdaq, Exchange::Nyse];

    /// Name of the table holding this exchange's observations.
    pub fn table_name(&self) -> &'static str {
        match self {
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Nyse => "NYSE",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nasdaq" => Ok(Exchange::Nasdaq),
            "nyse" => Ok(Exchange::Nyse),
            other => Err(EngineError::validation(format!("unknown exchange '{}'", other))),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Today's raw breadth numbers for one exchange, as scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreadthInput {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub advancing_volume: f64,
    pub declining_volume: f64,
    /// Index close, in percent.
    pub close: f64,
    pub advances: f64,
    pub declines: f64,
    pub new_highs: f64,
    pub new_lows: f64,
}

/// One exchange's breadth row for one trading date.
///
/// Fields that depend on earlier rows are `None` when not enough history
/// was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub advancing_volume: f64,
    pub declining_volume: f64,
    pub total_volume: f64,
    /// Change in total volume vs. the prior stored day (%).
    pub volume_delta: Option<f64>,
    pub close: f64,
    pub upside_day: f64,
    pub downside_day: f64,
    pub advances: f64,
    pub declines: f64,
    pub net_advance_decline: f64,
    pub ten_day_breakaway: Option<f64>,
    pub twenty_day_breakaway: Option<f64>,
    pub advance_decline_ratio: f64,
    pub advance_decline_thrust: f64,
    pub five_day_ad_thrust: Option<f64>,
    pub five_day_ud_volume_thrust: Option<f64>,
    pub new_highs: f64,
    pub new_lows: f64,
    pub net_highs_lows: f64,
    pub avg_highs_lows_21: Option<f64>,
    pub avg_highs_lows_63: Option<f64>,
}
