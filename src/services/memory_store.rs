use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::repository::{BreadthRepository, SignalRepository};
use crate::error::{EngineError, Result};
use crate::types::{format_date, Exchange, Observation, Signal};

/// A thread-safe in-memory store for breadth and signal rows.
#[derive(Default)]
pub struct MemoryStore {
    observations: DashMap<(Exchange, NaiveDate), Observation>,
    signals: DashMap<(NaiveDate, String), Signal>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an observation. Not used by the engines.
    pub fn remove_observation(&self, exchange: Exchange, date: NaiveDate) -> Option<Observation> {
        self.observations.remove(&(exchange, date)).map(|(_, row)| row)
    }

    /// Remove a signal. Not used by the engines.
    pub fn remove_signal(&self, date: NaiveDate, ticker: &str) -> Option<Signal> {
        self.signals
            .remove(&(date, ticker.to_string()))
            .map(|(_, row)| row)
    }

    /// Number of observations stored for an exchange.
    pub fn observation_count(&self, exchange: Exchange) -> usize {
        self.observations
            .iter()
            .filter(|entry| entry.key().0 == exchange)
            .count()
    }

    /// Number of signal rows stored across all tickers.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Check if the store holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.signals.is_empty()
    }

    /// Remove every row.
    pub fn clear(&self) {
        self.observations.clear();
        self.signals.clear();
    }
}

impl BreadthRepository for MemoryStore {
    fn get_by_date(&self, exchange: Exchange, date: NaiveDate) -> Result<Option<Observation>> {
        Ok(self
            .observations
            .get(&(exchange, date))
            .map(|entry| entry.value().clone()))
    }

    fn write_observation(&self, exchange: Exchange, row: &Observation) -> Result<()> {
        match self.observations.entry((exchange, row.date)) {
            Entry::Occupied(_) => Err(EngineError::Store(format!(
                "{} already has a row for {}",
                exchange,
                format_date(row.date)
            ))),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(())
            }
        }
    }

    fn all_dates(&self, exchange: Exchange) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .observations
            .iter()
            .filter(|entry| entry.key().0 == exchange)
            .map(|entry| entry.key().1)
            .collect();
        dates.sort();
        Ok(dates)
    }

    fn range(&self, exchange: Exchange, from: NaiveDate, to: NaiveDate) -> Result<Vec<Observation>> {
        let mut rows: Vec<Observation> = self
            .observations
            .iter()
            .filter(|entry| {
                let (ex, date) = *entry.key();
                ex == exchange && date >= from && date <= to
            })
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}

impl SignalRepository for MemoryStore {
    fn get_by_date_and_ticker(&self, date: NaiveDate, ticker: &str) -> Result<Option<Signal>> {
        Ok(self
            .signals
            .get(&(date, ticker.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn write_signal(&self, row: &Signal) -> Result<()> {
        match self.signals.entry((row.date, row.ticker.clone())) {
            Entry::Occupied(_) => Err(EngineError::Store(format!(
                "signal for {} on {} already exists",
                row.ticker,
                format_date(row.date)
            ))),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(())
            }
        }
    }

    fn signals_on(&self, date: NaiveDate) -> Result<Vec<Signal>> {
        let mut rows: Vec<Signal> = self
            .signals
            .iter()
            .filter(|entry| entry.key().0 == date)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(rows)
    }

    fn history(&self, ticker: &str) -> Result<Vec<Signal>> {
        let mut rows: Vec<Signal> = self
            .signals
            .iter()
            .filter(|entry| entry.key().1 == ticker)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    fn signal_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self.signals.iter().map(|entry| entry.key().0).collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }
}
