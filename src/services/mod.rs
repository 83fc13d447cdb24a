pub mod breadth;
pub mod daily_update;
pub mod history;
pub mod math;
pub mod memory_store;
pub mod normalize;
pub mod repository;
pub mod signals;
pub mod sqlite_store;
pub mod walker;

pub use breadth::BreadthEngine;
pub use daily_update::{DailyUpdater, JobReport, RowFailure, UpdateReport};
pub use history::{HistoryService, SignalDay};
pub use memory_store::MemoryStore;
pub use repository::{BreadthRepository, SignalRepository};
pub use signals::{LaggedDelta, SignalEngine};
pub use sqlite_store::SqliteStore;
pub use walker::{DayFilter, LagWindow, WalkPolicy};

/// Result of a single `add_row` call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    /// A new row was computed and stored.
    Written(T),
    /// A row for the same key was already stored; nothing was written.
    AlreadyPresent,
}

impl<T> RowOutcome<T> {
    pub fn written(self) -> Option<T> {
        match self {
            RowOutcome::Written(row) => Some(row),
            RowOutcome::AlreadyPresent => None,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, RowOutcome::Written(_))
    }
}
