//! Breadthwatch - daily market breadth and ticker signal indicators

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{EngineError, Result};
pub use services::{
    BreadthEngine, DailyUpdater, HistoryService, MemoryStore, RowOutcome, SignalEngine,
    SqliteStore,
};
pub use types::{
    BreadthInput, DailySnapshot, Exchange, Observation, Signal, SignalInput,
};
