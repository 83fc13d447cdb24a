//! Storage contracts consumed by the indicator engines.
//!
//! Rows are written once and never updated. The engines check for an
//! existing key before writing, so a duplicate write is a caller error and
//! implementations are free to reject it.

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{Exchange, Observation, Signal};

/// Per-exchange breadth tables.
pub trait BreadthRepository: Send + Sync {
    /// Row stored for exactly `date`, if any.
    fn get_by_date(&self, exchange: Exchange, date: NaiveDate) -> Result<Option<Observation>>;

    /// Append a new row keyed by `row.date`.
    fn write_observation(&self, exchange: Exchange, row: &Observation) -> Result<()>;

    /// Every stored date, ascending.
    fn all_dates(&self, exchange: Exchange) -> Result<Vec<NaiveDate>>;

    /// Rows with `from <= date <= to`, ascending.
    fn range(&self, exchange: Exchange, from: NaiveDate, to: NaiveDate) -> Result<Vec<Observation>>;
}

/// Per-ticker signal table.
pub trait SignalRepository: Send + Sync {
    /// Row stored for `ticker` on exactly `date`, if any.
    fn get_by_date_and_ticker(&self, date: NaiveDate, ticker: &str) -> Result<Option<Signal>>;

    /// Append a new row keyed by `(row.date, row.ticker)`.
    fn write_signal(&self, row: &Signal) -> Result<()>;

    /// All tickers stored for `date`, ordered by ticker.
    fn signals_on(&self, date: NaiveDate) -> Result<Vec<Signal>>;

    /// One ticker's rows, ascending by date.
    fn history(&self, ticker: &str) -> Result<Vec<Signal>>;

    /// Every date with at least one signal, ascending.
    fn signal_dates(&self) -> Result<Vec<NaiveDate>>;
}
