//! Backward date walker.
//!
//! Every multi-day indicator finds its reference rows by stepping back one
//! calendar day at a time from a reference date and asking the store for an
//! exact-date match. Two search shapes exist:
//!
//! - [`find_lagged`]: the first stored row inside a fixed offset range
//!   (e.g. 30..=49 days back for the one-month delta).
//! - [`collect_window`]: the N most recent stored rows. After each hit the
//!   search re-anchors on the found date, so a window is N observed trading
//!   days no matter how many scraper gaps or holidays fall between them.
//!   The walk gives up only when a single gap exceeds the search bound.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::Result;

/// Which calendar days are eligible for a store lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    /// Every calendar day is queried.
    AllDays,
    /// Saturdays and Sundays are stepped over without a lookup.
    #[default]
    Weekdays,
}

impl DayFilter {
    pub fn accepts(&self, date: NaiveDate) -> bool {
        match self {
            DayFilter::AllDays => true,
            DayFilter::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

/// Walker settings shared by the windowed indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkPolicy {
    pub filter: DayFilter,
    /// Calendar days searched for the next point before giving up.
    pub max_gap_days: u32,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            filter: DayFilter::Weekdays,
            max_gap_days: crate::config::DEFAULT_MAX_GAP_DAYS,
        }
    }
}

/// Inclusive range of calendar-day offsets behind a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagWindow {
    pub first: u32,
    pub last: u32,
}

impl LagWindow {
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }
}

/// Return the first row found stepping back from `reference`, trying offsets
/// `window.first..=window.last` in order. Days rejected by `filter` still use
/// up an offset. `Ok(None)` means nothing was stored in the window.
pub fn find_lagged<T, F>(
    reference: NaiveDate,
    window: LagWindow,
    filter: DayFilter,
    mut lookup: F,
) -> Result<Option<(NaiveDate, T)>>
where
    F: FnMut(NaiveDate) -> Result<Option<T>>,
{
    for offset in window.first..=window.last {
        let Some(day) = reference.checked_sub_signed(Duration::days(i64::from(offset))) else {
            break;
        };
        if !filter.accepts(day) {
            continue;
        }
        if let Some(row) = lookup(day)? {
            return Ok(Some((day, row)));
        }
    }
    Ok(None)
}

/// Collect the `count` most recent rows strictly before `reference`, newest
/// first. `Ok(None)` means some gap between consecutive stored rows (or
/// between the reference and the newest one) exceeded `policy.max_gap_days`
/// before the window filled.
pub fn collect_window<T, F>(
    reference: NaiveDate,
    count: usize,
    policy: WalkPolicy,
    mut lookup: F,
) -> Result<Option<Vec<T>>>
where
    F: FnMut(NaiveDate) -> Result<Option<T>>,
{
    let step = LagWindow::new(1, policy.max_gap_days);
    let mut anchor = reference;
    let mut found = Vec::with_capacity(count);

    while found.len() < count {
        match find_lagged(anchor, step, policy.filter, &mut lookup)? {
            Some((day, row)) => {
                found.push(row);
                anchor = day;
            }
            None => return Ok(None),
        }
    }

    Ok(Some(found))
}
