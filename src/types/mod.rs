pub mod breadth;
pub mod signal;
pub mod snapshot;

pub use breadth::*;
pub use signal::*;
pub use snapshot::*;

use chrono::NaiveDate;

use crate::error::{EngineError, Result};

/// Storage and wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date as supplied to `add_row`.
pub fn parse_iso_date(date: &str) -> Result<NaiveDate> {
    if date.trim().is_empty() {
        return Err(EngineError::validation("date cannot be an empty string"));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
        EngineError::validation(format!("date '{}' is not in the format yyyy-mm-dd", date))
    })
}

/// Format a date the way rows are keyed in the store.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reject NaN and infinities, the only non-numeric values an `f64` can hold.
pub(crate) fn require_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::validation(format!(
            "{} must be a finite number, got {}",
            name, value
        )))
    }
}
