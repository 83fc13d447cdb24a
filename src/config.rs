use std::env;
use std::path::PathBuf;

use crate::services::walker::{DayFilter, WalkPolicy};

/// Default per-step search bound for the backward date walker (days).
pub const DEFAULT_MAX_GAP_DAYS: u32 = 49;

/// Backward search configuration shared by every windowed indicator.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Skip Saturday and Sunday while stepping backward.
    pub weekdays_only: bool,
    /// How many calendar days to search for the next stored point.
    pub max_gap_days: u32,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            weekdays_only: true,
            max_gap_days: DEFAULT_MAX_GAP_DAYS,
        }
    }
}

impl WalkerConfig {
    /// Walk policy handed to the engines.
    pub fn policy(&self) -> WalkPolicy {
        WalkPolicy {
            filter: if self.weekdays_only {
                DayFilter::Weekdays
            } else {
                DayFilter::AllDays
            },
            max_gap_days: self.max_gap_days.max(1),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Backward date walker settings.
    pub walker: WalkerConfig,
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/market.db"));

        Self {
            database_path,
            walker: WalkerConfig {
                weekdays_only: env::var("WALK_WEEKDAYS_ONLY")
                    .ok()
                    .map(|v| parse_flag(&v))
                    .unwrap_or(true),
                max_gap_days: env::var("WALK_MAX_GAP_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|days: &u32| *days > 0)
                    .unwrap_or(DEFAULT_MAX_GAP_DAYS),
            },
            log_filter: env::var("LOG_FILTER").unwrap_or_else(|_| "breadthwatch=info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
