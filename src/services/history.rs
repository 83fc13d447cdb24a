//! Read-side queries used to render breadth tables and signal charts.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::repository::{BreadthRepository, SignalRepository};
use crate::error::Result;
use crate::types::{Exchange, Observation, Signal};

/// Signals stored for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDay {
    pub date: NaiveDate,
    pub signals: Vec<Signal>,
}

/// Query service over the stored indicator rows.
pub struct HistoryService {
    breadth: Arc<dyn BreadthRepository>,
    signals: Arc<dyn SignalRepository>,
}

impl HistoryService {
    pub fn new(breadth: Arc<dyn BreadthRepository>, signals: Arc<dyn SignalRepository>) -> Self {
        Self { breadth, signals }
    }

    /// Most recent observation for an exchange.
    pub fn latest_observation(&self, exchange: Exchange) -> Result<Option<Observation>> {
        match self.breadth.all_dates(exchange)?.last() {
            Some(date) => self.breadth.get_by_date(exchange, *date),
            None => Ok(None),
        }
    }

    /// Observations with `from <= date <= to`, oldest first.
    ///
    /// Missing bounds default to the first and last stored dates.
    pub fn observations(
        &self,
        exchange: Exchange,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let dates = self.breadth.all_dates(exchange)?;
        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };
        let from = from.unwrap_or(*first);
        let to = to.unwrap_or(*last);
        if from > to {
            debug!("Empty range {} > {} for {}", from, to, exchange);
            return Ok(Vec::new());
        }
        self.breadth.range(exchange, from, to)
    }

    /// Signals for `date`, or for the latest stored date when `None`.
    pub fn signals_on(&self, date: Option<NaiveDate>) -> Result<Option<SignalDay>> {
        let date = match date {
            Some(date) => date,
            None => match self.signals.signal_dates()?.last() {
                Some(date) => *date,
                None => return Ok(None),
            },
        };
        let signals = self.signals.signals_on(date)?;
        if signals.is_empty() {
            return Ok(None);
        }
        Ok(Some(SignalDay { date, signals }))
    }

    /// Full history for one ticker, oldest first.
    pub fn ticker_history(&self, ticker: &str) -> Result<Vec<Signal>> {
        self.signals.history(&ticker.trim().to_uppercase())
    }

    /// One ticker's signal on an exact date.
    pub fn ticker_on(&self, ticker: &str, date: NaiveDate) -> Result<Option<Signal>> {
        self.signals
            .get_by_date_and_ticker(date, &ticker.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DayFilter, MemoryStore, SignalEngine};
    use crate::types::SignalInput;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seeded() -> (Arc<MemoryStore>, HistoryService) {
        let store = Arc::new(MemoryStore::new());
        let engine = SignalEngine::new(store.clone(), DayFilter::Weekdays);
        for (date, ticker, close) in [
            ("2023-01-03", "AAPL", 129.0),
            ("2023-01-04", "AAPL", 125.0),
            ("2023-01-04", "AMZN", 85.0),
        ] {
            engine
                .add_row(&SignalInput {
                    date: date.to_string(),
                    ticker: ticker.to_string(),
                    description: "TEST".to_string(),
                    buy: close - 5.0,
                    sell: close + 5.0,
                    close,
                })
                .unwrap();
        }
        let service = HistoryService::new(store.clone(), store.clone());
        (store, service)
    }

    #[test]
    fn test_signals_default_to_latest_date() {
        let (_store, service) = seeded();
        let day = service.signals_on(None).unwrap().unwrap();
        assert_eq!(day.date, d("2023-01-04"));
        assert_eq!(day.signals.len(), 2);
        assert!(service.signals_on(Some(d("2023-01-05"))).unwrap().is_none());
    }

    #[test]
    fn test_ticker_lookups_are_case_insensitive() {
        let (_store, service) = seeded();
        assert_eq!(service.ticker_history("aapl").unwrap().len(), 2);
        let row = service.ticker_on(" aapl", d("2023-01-04")).unwrap().unwrap();
        assert_eq!(row.od_delta, Some(-3.1));
    }

    #[test]
    fn test_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let service = HistoryService::new(store.clone(), store);
        assert!(service.latest_observation(Exchange::Nasdaq).unwrap().is_none());
        assert!(service.observations(Exchange::Nyse, None, None).unwrap().is_empty());
        assert!(service.signals_on(None).unwrap().is_none());
    }
}
