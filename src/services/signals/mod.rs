//! Signal delta engine: week-over-week and calendar-lagged deltas plus
//! range asymmetry for each tracked ticker.

pub mod formulas;

pub use formulas::LaggedDelta;

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use super::repository::SignalRepository;
use super::walker::{find_lagged, DayFilter, LagWindow};
use super::RowOutcome;
use crate::error::{EngineError, Result};
use crate::types::{format_date, parse_iso_date, require_finite, Signal, SignalInput};

/// Computes and stores signal rows for every ticker.
pub struct SignalEngine {
    store: Arc<dyn SignalRepository>,
    filter: DayFilter,
}

impl SignalEngine {
    pub fn new(store: Arc<dyn SignalRepository>, filter: DayFilter) -> Self {
        Self { store, filter }
    }

    /// Most recent stored row for `ticker` inside `delta`'s search window.
    fn reference(&self, date: NaiveDate, ticker: &str, delta: LaggedDelta) -> Result<Option<Signal>> {
        self.reference_in(date, ticker, delta.window())
    }

    fn reference_in(
        &self,
        date: NaiveDate,
        ticker: &str,
        window: LagWindow,
    ) -> Result<Option<Signal>> {
        let found = find_lagged(date, window, self.filter, |day| {
            self.store.get_by_date_and_ticker(day, ticker)
        })?;
        Ok(found.map(|(_, row)| row))
    }

    /// Spread change vs. the first row found 7 or more days back.
    pub fn delta_ww(&self, date: NaiveDate, ticker: &str, buy: f64, sell: f64) -> Result<Option<f64>> {
        let reference = self.reference_in(date, ticker, formulas::WEEK_OVER_WEEK_WINDOW)?;
        Ok(reference.map(|r| formulas::delta_ww(buy, sell, r.buy, r.sell)))
    }

    /// Close-to-close change vs. the reference close for `delta` (%).
    pub fn lagged_delta(
        &self,
        delta: LaggedDelta,
        date: NaiveDate,
        ticker: &str,
        close: f64,
    ) -> Result<Option<f64>> {
        match self.reference(date, ticker, delta)? {
            Some(reference) => delta.compute(close, reference.close).map(Some),
            None => Ok(None),
        }
    }

    pub fn od_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::OneDay, date, ticker, close)
    }

    pub fn ow_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::OneWeek, date, ticker, close)
    }

    pub fn om_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::OneMonth, date, ticker, close)
    }

    pub fn tm_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::ThreeMonth, date, ticker, close)
    }

    pub fn sm_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::SixMonth, date, ticker, close)
    }

    pub fn oy_delta(&self, date: NaiveDate, ticker: &str, close: f64) -> Result<Option<f64>> {
        self.lagged_delta(LaggedDelta::OneYear, date, ticker, close)
    }

    /// Validate today's quote, derive the nine indicators and store one row.
    ///
    /// A row already stored for `(date, ticker)` is left untouched.
    pub fn add_row(&self, input: &SignalInput) -> Result<RowOutcome<Signal>> {
        let date = parse_iso_date(&input.date)?;
        let ticker = input.ticker.trim();
        let description = input.description.trim();
        if ticker.is_empty() {
            return Err(EngineError::validation("ticker cannot be an empty string"));
        }
        if description.is_empty() {
            return Err(EngineError::validation("description cannot be an empty string"));
        }
        let buy = require_finite("buy", input.buy)?;
        let sell = require_finite("sell", input.sell)?;
        let close = require_finite("close", input.close)?;

        if close == 0.0 {
            return Err(EngineError::division_by_zero(
                "add_row",
                format!("close is 0, cannot add a row for {}", ticker),
            ));
        }

        if self.store.get_by_date_and_ticker(date, ticker)?.is_some() {
            debug!("{} already has a signal for {}, skipping", ticker, input.date);
            return Ok(RowOutcome::AlreadyPresent);
        }

        let row = Signal {
            date,
            ticker: ticker.to_string(),
            description: description.to_string(),
            buy,
            sell,
            close,
            delta_ww: self.delta_ww(date, ticker, buy, sell)?,
            od_delta: self.od_delta(date, ticker, close)?,
            ow_delta: self.ow_delta(date, ticker, close)?,
            om_delta: self.om_delta(date, ticker, close)?,
            tm_delta: self.tm_delta(date, ticker, close)?,
            sm_delta: self.sm_delta(date, ticker, close)?,
            oy_delta: self.oy_delta(date, ticker, close)?,
            ra_buy: formulas::ra_buy(buy, close)?,
            ra_sell: formulas::ra_sell(sell, close)?,
        };

        self.store.write_signal(&row)?;
        info!("Stored signal for {} on {}", row.ticker, format_date(date));
        Ok(RowOutcome::Written(row))
    }
}
