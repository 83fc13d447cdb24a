//! Breadth indicator engine: one instance per exchange.

pub mod formulas;

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use super::math::percent_change;
use super::repository::BreadthRepository;
use super::walker::{collect_window, find_lagged, LagWindow, WalkPolicy};
use super::RowOutcome;
use crate::error::{EngineError, Result};
use crate::types::{format_date, parse_iso_date, require_finite, BreadthInput, Exchange, Observation};

/// Prior trading days summed with today for each windowed indicator.
pub const TEN_DAY_WINDOW: usize = 9;
pub const TWENTY_DAY_WINDOW: usize = 19;
pub const FIVE_DAY_WINDOW: usize = 4;
pub const TWENTY_ONE_DAY_WINDOW: usize = 20;
pub const SIXTY_THREE_DAY_WINDOW: usize = 62;

/// Computes and stores breadth rows for one exchange.
pub struct BreadthEngine {
    exchange: Exchange,
    store: Arc<dyn BreadthRepository>,
    policy: WalkPolicy,
}

impl BreadthEngine {
    pub fn new(exchange: Exchange, store: Arc<dyn BreadthRepository>, policy: WalkPolicy) -> Self {
        Self {
            exchange,
            store,
            policy,
        }
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Change in total volume vs. the most recent stored day (%).
    pub fn volume_delta(&self, date: NaiveDate, total_volume: f64) -> Result<Option<f64>> {
        let window = LagWindow::new(1, self.policy.max_gap_days);
        let prior = find_lagged(date, window, self.policy.filter, |day| {
            self.store.get_by_date(self.exchange, day)
        })?;

        match prior {
            Some((_, row)) => percent_change("volume_delta", total_volume, row.total_volume).map(Some),
            None => Ok(None),
        }
    }

    pub fn ten_day_breakaway(&self, date: NaiveDate, advances: f64, declines: f64) -> Result<Option<f64>> {
        self.breakaway("ten_day_breakaway", TEN_DAY_WINDOW, date, advances, declines)
    }

    pub fn twenty_day_breakaway(&self, date: NaiveDate, advances: f64, declines: f64) -> Result<Option<f64>> {
        self.breakaway("twenty_day_breakaway", TWENTY_DAY_WINDOW, date, advances, declines)
    }

    /// Five-day advances share of advances + declines (%).
    pub fn five_day_ad_thrust(&self, date: NaiveDate, advances: f64, declines: f64) -> Result<Option<f64>> {
        let window = self.window(date, FIVE_DAY_WINDOW, |row| (row.advances, row.declines))?;
        window
            .map(|w| formulas::cumulative_thrust("five_day_ad_thrust", (advances, declines), &w))
            .transpose()
    }

    /// Five-day advancing volume share of total volume (%).
    pub fn five_day_ud_volume_thrust(
        &self,
        date: NaiveDate,
        advancing_volume: f64,
        declining_volume: f64,
    ) -> Result<Option<f64>> {
        let window = self.window(date, FIVE_DAY_WINDOW, |row| {
            (row.advancing_volume, row.declining_volume)
        })?;
        window
            .map(|w| {
                formulas::cumulative_thrust(
                    "five_day_ud_volume_thrust",
                    (advancing_volume, declining_volume),
                    &w,
                )
            })
            .transpose()
    }

    pub fn avg_highs_lows_21(&self, date: NaiveDate, net_highs_lows: f64) -> Result<Option<f64>> {
        self.highs_lows_average(TWENTY_ONE_DAY_WINDOW, date, net_highs_lows)
    }

    pub fn avg_highs_lows_63(&self, date: NaiveDate, net_highs_lows: f64) -> Result<Option<f64>> {
        self.highs_lows_average(SIXTY_THREE_DAY_WINDOW, date, net_highs_lows)
    }

    /// Validate today's numbers, derive every indicator and store one row.
    ///
    /// Returns [`RowOutcome::AlreadyPresent`] without writing when the date
    /// is already stored. Validation and division-by-zero failures abort
    /// before anything is written.
    pub fn add_row(&self, input: &BreadthInput) -> Result<RowOutcome<Observation>> {
        let date = parse_iso_date(&input.date)?;
        let advancing_volume = require_finite("advancing volume", input.advancing_volume)?;
        let declining_volume = require_finite("declining volume", input.declining_volume)?;
        let close = require_finite("close", input.close)?;
        let advances = require_finite("advances", input.advances)?;
        let declines = require_finite("declines", input.declines)?;
        let new_highs = require_finite("new highs", input.new_highs)?;
        let new_lows = require_finite("new lows", input.new_lows)?;

        if declines == 0.0 {
            return Err(EngineError::division_by_zero(
                "add_row",
                format!("declines is 0, cannot add a {} row", self.exchange),
            ));
        }

        if self.store.get_by_date(self.exchange, date)?.is_some() {
            debug!("{} already has a row for {}, skipping", self.exchange, input.date);
            return Ok(RowOutcome::AlreadyPresent);
        }

        let total_volume = formulas::total_volume(advancing_volume, declining_volume);
        let net_highs_lows = formulas::net_highs_lows(new_highs, new_lows);

        let row = Observation {
            date,
            advancing_volume,
            declining_volume,
            total_volume,
            volume_delta: self.volume_delta(date, total_volume)?,
            close,
            upside_day: formulas::upside_day(advancing_volume, declining_volume)?,
            downside_day: formulas::downside_day(advancing_volume, declining_volume)?,
            advances,
            declines,
            net_advance_decline: formulas::net_advance_decline(advances, declines),
            ten_day_breakaway: self.ten_day_breakaway(date, advances, declines)?,
            twenty_day_breakaway: self.twenty_day_breakaway(date, advances, declines)?,
            advance_decline_ratio: formulas::advance_decline_ratio(advances, declines)?,
            advance_decline_thrust: formulas::advance_decline_thrust(advances, declines)?,
            five_day_ad_thrust: self.five_day_ad_thrust(date, advances, declines)?,
            five_day_ud_volume_thrust: self.five_day_ud_volume_thrust(
                date,
                advancing_volume,
                declining_volume,
            )?,
            new_highs,
            new_lows,
            net_highs_lows,
            avg_highs_lows_21: self.avg_highs_lows_21(date, net_highs_lows)?,
            avg_highs_lows_63: self.avg_highs_lows_63(date, net_highs_lows)?,
        };

        if row.avg_highs_lows_63.is_none() {
            debug!(
                "{} {}: not enough history for every windowed indicator",
                self.exchange,
                format_date(date)
            );
        }

        self.store.write_observation(self.exchange, &row)?;
        info!("Stored {} breadth row for {}", self.exchange, format_date(date));
        Ok(RowOutcome::Written(row))
    }

    fn window<T>(
        &self,
        date: NaiveDate,
        count: usize,
        pick: impl Fn(&Observation) -> T,
    ) -> Result<Option<Vec<T>>> {
        collect_window(date, count, self.policy, |day| {
            Ok(self.store.get_by_date(self.exchange, day)?.map(|row| pick(&row)))
        })
    }

    fn breakaway(
        &self,
        indicator: &'static str,
        count: usize,
        date: NaiveDate,
        advances: f64,
        declines: f64,
    ) -> Result<Option<f64>> {
        let window = self.window(date, count, |row| (row.advances, row.declines))?;
        window
            .map(|w| formulas::breakaway_momentum(indicator, (advances, declines), &w))
            .transpose()
    }

    fn highs_lows_average(&self, count: usize, date: NaiveDate, net_highs_lows: f64) -> Result<Option<f64>> {
        let window = self.window(date, count, |row| row.net_highs_lows)?;
        Ok(window.map(|w| formulas::trailing_average(net_highs_lows, &w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn engine(store: Arc<MemoryStore>) -> BreadthEngine {
        BreadthEngine::new(Exchange::Nyse, store, WalkPolicy::default())
    }

    fn input(date: &str) -> BreadthInput {
        BreadthInput {
            date: date.to_string(),
            advancing_volume: 2_439_597_309.0,
            declining_volume: 1_520_646_884.0,
            close: 0.51,
            advances: 1711.0,
            declines: 1624.0,
            new_highs: 128.0,
            new_lows: 64.0,
        }
    }

    #[test]
    fn test_first_row_has_no_history_fields() {
        let store = Arc::new(MemoryStore::new());
        let outcome = engine(store.clone()).add_row(&input("2022-01-12")).unwrap();

        let row = outcome.written().unwrap();
        assert_eq!(row.total_volume, 3_960_244_193.0);
        assert_eq!(row.volume_delta, None);
        assert_eq!(row.ten_day_breakaway, None);
        assert_eq!(row.five_day_ad_thrust, None);
        assert_eq!(row.avg_highs_lows_21, None);
        assert_eq!(row.net_advance_decline, 87.0);
        assert_eq!(row.net_highs_lows, 64.0);
        assert_eq!(row.upside_day, 61.6);
        assert_eq!(row.downside_day, 38.4);
        assert_eq!(row.advance_decline_ratio, 1.05);
        assert_eq!(row.advance_decline_thrust, 51.3);
        assert_eq!(store.observation_count(Exchange::Nyse), 1);
    }

    #[test]
    fn test_rejects_bad_date_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let err = engine(store.clone()).add_row(&input("2/4/2000")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_non_finite_volume() {
        let store = Arc::new(MemoryStore::new());
        let mut bad = input("2022-01-12");
        bad.advancing_volume = f64::NAN;
        assert!(matches!(
            engine(store).add_row(&bad),
            Err(EngineError::Validation(_))
        ));
    }
}
