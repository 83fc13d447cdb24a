use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Today's quoted range for one tracked ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalInput {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub ticker: String,
    pub description: String,
    pub buy: f64,
    pub sell: f64,
    pub close: f64,
}

/// One ticker's signal row for one observation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub ticker: String,
    pub description: String,
    pub buy: f64,
    pub sell: f64,
    pub close: f64,
    /// Week-over-week change of the buy/sell spread.
    pub delta_ww: Option<f64>,
    pub od_delta: Option<f64>,
    pub ow_delta: Option<f64>,
    pub om_delta: Option<f64>,
    pub tm_delta: Option<f64>,
    pub sm_delta: Option<f64>,
    pub oy_delta: Option<f64>,
    /// Buy distance from close (%).
    pub ra_buy: f64,
    /// Sell distance from close (%).
    pub ra_sell: f64,
}

impl Signal {
    /// Buy minus sell.
    pub fn spread(&self) -> f64 {
        self.buy - self.sell
    }
}
