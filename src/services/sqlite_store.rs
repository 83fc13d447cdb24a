//! SQLite persistence for breadth and signal rows.
//!
//! The schema matches the historical database file: one table per exchange
//! (`NASDAQ`, `NYSE`) keyed by a `YYYY-MM-DD` text `Date`, and a `Hedgeye`
//! table of per-ticker signals with a surrogate integer `ID`. Column names
//! carry their units (`Change in Volume (%)`) and must not change, since
//! existing files are read back by the same queries.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use super::repository::{BreadthRepository, SignalRepository};
use crate::error::{EngineError, Result};
use crate::types::{format_date, Exchange, Observation, Signal};

const BREADTH_COLUMNS: [&str; 22] = [
    "Date",
    "Advancing Volume",
    "Declining Volume",
    "Total Volume",
    "Change in Volume (%)",
    "Close (%)",
    "Upside Day (%)",
    "Downside Day (%)",
    "Advances",
    "Declines",
    "Net (Advances/Declines)",
    "10-Day Breakaway Momentum",
    "20-Day Breakaway Momentum",
    "Advance/Decline Ratio",
    "Advance/Decline Thrust (%)",
    "5-Day Advance/Decline Thrust (%)",
    "5-Day Up/Down Volume Thrust (%)",
    "New Highs",
    "New Lows",
    "Net (Highs/Lows)",
    "21-Day Average (Highs/Lows)",
    "63-Day Average (Highs/Lows)",
];

const SIGNAL_COLUMNS: [&str; 15] = [
    "Date",
    "Ticker",
    "Description",
    "Buy",
    "Sell",
    "Close",
    "Delta W/W",
    "1D Delta (%)",
    "1W Delta (%)",
    "1M Delta (%)",
    "3M Delta (%)",
    "6M Delta (%)",
    "1Y Delta (%)",
    "Range Asymmetry Buy (%)",
    "Range Asymmetry Sell (%)",
];

const SIGNAL_TABLE: &str = "Hedgeye";

fn quoted(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQLite store for breadth observations and ticker signals.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    pub db_path: String,
}

impl SqliteStore {
    /// Open (or create) the database file at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().display().to_string();
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EngineError::Store(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        store.init_schema()?;
        info!("SQLite store initialized at {}", store.db_path);
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: ":memory:".to_string(),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::Store("SQLite connection lock poisoned".to_string()))
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        for exchange in Exchange::ALL {
            let columns = BREADTH_COLUMNS[1..]
                .iter()
                .map(|c| format!("\"{}\" REAL", c))
                .collect::<Vec<_>>()
                .join(",\n                ");
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS \"{}\" (
                \"Date\" TEXT PRIMARY KEY,
                {}
            )",
                    exchange.table_name(),
                    columns
                ),
                [],
            )?;
        }

        let signal_columns = SIGNAL_COLUMNS[3..]
            .iter()
            .map(|c| format!("\"{}\" REAL", c))
            .collect::<Vec<_>>()
            .join(",\n                ");
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (
                \"ID\" INTEGER PRIMARY KEY,
                \"Date\" TEXT,
                \"Ticker\" TEXT,
                \"Description\" TEXT,
                {}
            )",
                SIGNAL_TABLE, signal_columns
            ),
            [],
        )?;

        // Lookups are always by exact date and ticker.
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_hedgeye_date_ticker ON \"Hedgeye\"(\"Date\", \"Ticker\")",
            [],
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    fn observation_from_row(row: &Row<'_>) -> rusqlite::Result<Observation> {
        Ok(Observation {
            date: row.get(0)?,
            advancing_volume: row.get(1)?,
            declining_volume: row.get(2)?,
            total_volume: row.get(3)?,
            volume_delta: row.get(4)?,
            close: row.get(5)?,
            upside_day: row.get(6)?,
            downside_day: row.get(7)?,
            advances: row.get(8)?,
            declines: row.get(9)?,
            net_advance_decline: row.get(10)?,
            ten_day_breakaway: row.get(11)?,
            twenty_day_breakaway: row.get(12)?,
            advance_decline_ratio: row.get(13)?,
            advance_decline_thrust: row.get(14)?,
            five_day_ad_thrust: row.get(15)?,
            five_day_ud_volume_thrust: row.get(16)?,
            new_highs: row.get(17)?,
            new_lows: row.get(18)?,
            net_highs_lows: row.get(19)?,
            avg_highs_lows_21: row.get(20)?,
            avg_highs_lows_63: row.get(21)?,
        })
    }

    fn signal_from_row(row: &Row<'_>) -> rusqlite::Result<Signal> {
        Ok(Signal {
            date: row.get(0)?,
            ticker: row.get(1)?,
            description: row.get(2)?,
            buy: row.get(3)?,
            sell: row.get(4)?,
            close: row.get(5)?,
            delta_ww: row.get(6)?,
            od_delta: row.get(7)?,
            ow_delta: row.get(8)?,
            om_delta: row.get(9)?,
            tm_delta: row.get(10)?,
            sm_delta: row.get(11)?,
            oy_delta: row.get(12)?,
            ra_buy: row.get(13)?,
            ra_sell: row.get(14)?,
        })
    }

    fn breadth_select(exchange: Exchange) -> String {
        format!(
            "SELECT {} FROM \"{}\"",
            quoted(&BREADTH_COLUMNS),
            exchange.table_name()
        )
    }

    fn signal_select() -> String {
        format!("SELECT {} FROM \"{}\"", quoted(&SIGNAL_COLUMNS), SIGNAL_TABLE)
    }

    /// Delete an exchange row. Not used by the engines.
    pub fn delete_observation(&self, exchange: Exchange, date: NaiveDate) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(
            &format!("DELETE FROM \"{}\" WHERE \"Date\" = ?1", exchange.table_name()),
            params![date],
        )?)
    }

    /// Delete a ticker's row. Not used by the engines.
    pub fn delete_signal(&self, date: NaiveDate, ticker: &str) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(
            &format!(
                "DELETE FROM \"{}\" WHERE \"Date\" = ?1 AND \"Ticker\" = ?2",
                SIGNAL_TABLE
            ),
            params![date, ticker],
        )?)
    }
}

impl BreadthRepository for SqliteStore {
    fn get_by_date(&self, exchange: Exchange, date: NaiveDate) -> Result<Option<Observation>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE \"Date\" = ?1", Self::breadth_select(exchange));
        Ok(conn
            .query_row(&sql, params![date], Self::observation_from_row)
            .optional()?)
    }

    fn write_observation(&self, exchange: Exchange, row: &Observation) -> Result<()> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"Date\" = ?1)",
                exchange.table_name()
            ),
            params![row.date],
            |r| r.get(0),
        )?;
        if exists {
            return Err(EngineError::Store(format!(
                "{} row for {} already exists",
                exchange,
                format_date(row.date)
            )));
        }
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            exchange.table_name(),
            quoted(&BREADTH_COLUMNS),
            placeholders(BREADTH_COLUMNS.len())
        );

        conn.execute(
            &sql,
            params![
                row.date,
                row.advancing_volume,
                row.declining_volume,
                row.total_volume,
                row.volume_delta,
                row.close,
                row.upside_day,
                row.downside_day,
                row.advances,
                row.declines,
                row.net_advance_decline,
                row.ten_day_breakaway,
                row.twenty_day_breakaway,
                row.advance_decline_ratio,
                row.advance_decline_thrust,
                row.five_day_ad_thrust,
                row.five_day_ud_volume_thrust,
                row.new_highs,
                row.new_lows,
                row.net_highs_lows,
                row.avg_highs_lows_21,
                row.avg_highs_lows_63,
            ],
        )
        .map_err(|e| {
            error!("Cannot add {} row for {}: {}", exchange, format_date(row.date), e);
            e
        })?;

        debug!("Wrote {} row for {}", exchange, format_date(row.date));
        Ok(())
    }

    fn all_dates(&self, exchange: Exchange) -> Result<Vec<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT \"Date\" FROM \"{}\" ORDER BY \"Date\" ASC",
            exchange.table_name()
        ))?;
        let dates = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;
        Ok(dates)
    }

    fn range(&self, exchange: Exchange, from: NaiveDate, to: NaiveDate) -> Result<Vec<Observation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE \"Date\" >= ?1 AND \"Date\" <= ?2 ORDER BY \"Date\" ASC",
            Self::breadth_select(exchange)
        ))?;
        let rows = stmt
            .query_map(params![from, to], Self::observation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl SignalRepository for SqliteStore {
    fn get_by_date_and_ticker(&self, date: NaiveDate, ticker: &str) -> Result<Option<Signal>> {
        let conn = self.conn()?;
        let sql = format!(
            "{} WHERE \"Date\" = ?1 AND \"Ticker\" = ?2 ORDER BY \"ID\" ASC LIMIT 1",
            Self::signal_select()
        );
        Ok(conn
            .query_row(&sql, params![date, ticker], Self::signal_from_row)
            .optional()?)
    }

    fn write_signal(&self, row: &Signal) -> Result<()> {
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"Date\" = ?1 AND \"Ticker\" = ?2)",
                SIGNAL_TABLE
            ),
            params![row.date, row.ticker],
            |r| r.get(0),
        )?;
        if exists {
            return Err(EngineError::Store(format!(
                "signal for {} on {} already exists",
                row.ticker,
                format_date(row.date)
            )));
        }

        conn.execute(
            &format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                SIGNAL_TABLE,
                quoted(&SIGNAL_COLUMNS),
                placeholders(SIGNAL_COLUMNS.len())
            ),
            params![
                row.date,
                row.ticker,
                row.description,
                row.buy,
                row.sell,
                row.close,
                row.delta_ww,
                row.od_delta,
                row.ow_delta,
                row.om_delta,
                row.tm_delta,
                row.sm_delta,
                row.oy_delta,
                row.ra_buy,
                row.ra_sell,
            ],
        )?;

        debug!("Wrote signal for {} on {}", row.ticker, format_date(row.date));
        Ok(())
    }

    fn signals_on(&self, date: NaiveDate) -> Result<Vec<Signal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE \"Date\" = ?1 ORDER BY \"Ticker\" ASC",
            Self::signal_select()
        ))?;
        let rows = stmt
            .query_map(params![date], Self::signal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn history(&self, ticker: &str) -> Result<Vec<Signal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE \"Ticker\" = ?1 ORDER BY \"Date\" ASC",
            Self::signal_select()
        ))?;
        let rows = stmt
            .query_map(params![ticker], Self::signal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn signal_dates(&self) -> Result<Vec<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT \"Date\" FROM \"{}\" ORDER BY \"Date\" ASC",
            SIGNAL_TABLE
        ))?;
        let dates = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;
        Ok(dates)
    }
}
