//! Applies scraped daily snapshots to the breadth and signal engines.
//!
//! The breadth job and the signal job touch disjoint tables, so `apply`
//! runs them side by side on the blocking pool. Inside a job rows are
//! written one at a time in input order.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::breadth::BreadthEngine;
use super::repository::{BreadthRepository, SignalRepository};
use super::signals::SignalEngine;
use super::RowOutcome;
use crate::config::WalkerConfig;
use crate::error::{EngineError, Result};
use crate::types::{DailySnapshot, Exchange};

/// A row that was rejected without stopping the rest of the job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    /// Exchange name or ticker.
    pub key: String,
    pub error: String,
}

/// Counts for one job over one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobReport {
    pub written: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

impl JobReport {
    /// Fold one `add_row` result into the report. Store failures are
    /// returned to the caller.
    fn record<T>(&mut self, key: &str, result: Result<RowOutcome<T>>) -> Result<()> {
        match result {
            Ok(RowOutcome::Written(_)) => self.written += 1,
            Ok(RowOutcome::AlreadyPresent) => self.skipped += 1,
            Err(e) if e.is_row_rejection() => {
                warn!("Rejected row for {}: {}", key, e);
                self.failures.push(RowFailure {
                    key: key.to_string(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of applying one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateReport {
    /// Snapshot date as `YYYY-MM-DD`.
    pub date: String,
    pub breadth: JobReport,
    pub signals: JobReport,
}

struct Engines {
    breadth: Vec<BreadthEngine>,
    signals: SignalEngine,
}

impl Engines {
    fn breadth_job(&self, snapshot: &DailySnapshot) -> Result<JobReport> {
        let mut report = JobReport::default();
        for (exchange, input) in snapshot.breadth_inputs()? {
            let engine = self
                .breadth
                .iter()
                .find(|engine| engine.exchange() == exchange)
                .ok_or_else(|| EngineError::Store(format!("no engine for {}", exchange)))?;
            report.record(&exchange.to_string(), engine.add_row(&input))?;
        }
        Ok(report)
    }

    fn signal_job(&self, snapshot: &DailySnapshot) -> Result<JobReport> {
        let mut report = JobReport::default();
        for input in snapshot.signal_inputs()? {
            let result = self.signals.add_row(&input);
            report.record(&input.ticker, result)?;
        }
        Ok(report)
    }
}

/// Runs both daily update jobs.
#[derive(Clone)]
pub struct DailyUpdater {
    engines: Arc<Engines>,
}

impl DailyUpdater {
    pub fn new(
        breadth_store: Arc<dyn BreadthRepository>,
        signal_store: Arc<dyn SignalRepository>,
        walker: &WalkerConfig,
    ) -> Self {
        let policy = walker.policy();
        let breadth = Exchange::ALL
            .iter()
            .map(|exchange| BreadthEngine::new(*exchange, breadth_store.clone(), policy))
            .collect();
        let signals = SignalEngine::new(signal_store, policy.filter);

        Self {
            engines: Arc::new(Engines { breadth, signals }),
        }
    }

    /// Apply one snapshot on the current thread, breadth first.
    pub fn apply_blocking(&self, snapshot: &DailySnapshot) -> Result<UpdateReport> {
        let date = snapshot.normalized_date()?;
        let breadth = self.engines.breadth_job(snapshot)?;
        let signals = self.engines.signal_job(snapshot)?;
        Ok(finish(date, breadth, signals))
    }

    /// Apply one snapshot with both jobs running concurrently.
    pub async fn apply(&self, snapshot: DailySnapshot) -> Result<UpdateReport> {
        let date = snapshot.normalized_date()?;
        let snapshot = Arc::new(snapshot);

        let breadth_task = {
            let engines = self.engines.clone();
            let snapshot = snapshot.clone();
            tokio::task::spawn_blocking(move || engines.breadth_job(&snapshot))
        };
        let signal_task = {
            let engines = self.engines.clone();
            let snapshot = snapshot.clone();
            tokio::task::spawn_blocking(move || engines.signal_job(&snapshot))
        };

        let (breadth, signals) = tokio::join!(breadth_task, signal_task);
        let breadth = breadth.map_err(|e| EngineError::Store(format!("breadth job panicked: {}", e)))??;
        let signals = signals.map_err(|e| EngineError::Store(format!("signal job panicked: {}", e)))??;

        Ok(finish(date, breadth, signals))
    }

    /// Apply snapshots oldest first so each day sees the days before it.
    pub async fn backfill(&self, snapshots: Vec<DailySnapshot>) -> Result<Vec<UpdateReport>> {
        let mut dated = snapshots
            .into_iter()
            .map(|snapshot| -> Result<(String, DailySnapshot)> {
                Ok((snapshot.normalized_date()?, snapshot))
            })
            .collect::<Result<Vec<_>>>()?;
        dated.sort_by(|a, b| a.0.cmp(&b.0));

        let mut reports = Vec::with_capacity(dated.len());
        for (_, snapshot) in dated {
            reports.push(self.apply(snapshot).await?);
        }
        Ok(reports)
    }
}

fn finish(date: String, breadth: JobReport, signals: JobReport) -> UpdateReport {
    info!(
        "Update for {}: breadth {} written / {} skipped / {} failed, signals {} written / {} skipped / {} failed",
        date,
        breadth.written,
        breadth.skipped,
        breadth.failures.len(),
        signals.written,
        signals.skipped,
        signals.failures.len()
    );
    UpdateReport {
        date,
        breadth,
        signals,
    }
}
