//! Same-day breadth formulas and the window aggregations used by the
//! multi-day ones. Everything here is pure; history lookups live in the
//! engine.

use crate::error::{EngineError, Result};
use crate::services::math::{percent_of, round2};

pub fn total_volume(advancing_volume: f64, declining_volume: f64) -> f64 {
    advancing_volume + declining_volume
}

/// Share of volume that was advancing (%).
pub fn upside_day(advancing_volume: f64, declining_volume: f64) -> Result<f64> {
    percent_of(
        "upside_day",
        advancing_volume,
        advancing_volume + declining_volume,
        "sum of advancing and declining volume is 0",
    )
}

/// Share of volume that was declining (%).
pub fn downside_day(advancing_volume: f64, declining_volume: f64) -> Result<f64> {
    percent_of(
        "downside_day",
        declining_volume,
        advancing_volume + declining_volume,
        "sum of advancing and declining volume is 0",
    )
}

pub fn net_advance_decline(advances: f64, declines: f64) -> f64 {
    round2(advances - declines)
}

pub fn advance_decline_ratio(advances: f64, declines: f64) -> Result<f64> {
    if declines == 0.0 {
        return Err(EngineError::division_by_zero(
            "advance_decline_ratio",
            "declines is 0",
        ));
    }
    Ok(round2(advances / declines))
}

pub fn advance_decline_thrust(advances: f64, declines: f64) -> Result<f64> {
    percent_of(
        "advance_decline_thrust",
        advances,
        advances + declines,
        "sum of advances and declines is 0",
    )
}

pub fn net_highs_lows(new_highs: f64, new_lows: f64) -> f64 {
    round2(new_highs - new_lows)
}

/// Today's pair added to the column sums of `window`.
fn window_totals(today: (f64, f64), window: &[(f64, f64)]) -> (f64, f64) {
    window
        .iter()
        .fold(today, |(up, down), (u, d)| (up + u, down + d))
}

/// Cumulative up / cumulative down over today plus `window`.
pub fn breakaway_momentum(
    indicator: &'static str,
    today: (f64, f64),
    window: &[(f64, f64)],
) -> Result<f64> {
    let (up, down) = window_totals(today, window);
    if down == 0.0 {
        return Err(EngineError::division_by_zero(
            indicator,
            format!("{}-day sum of declines is 0", window.len() + 1),
        ));
    }
    Ok(round2(up / down))
}

/// Cumulative up as a share of cumulative up + down over today plus `window` (%).
pub fn cumulative_thrust(
    indicator: &'static str,
    today: (f64, f64),
    window: &[(f64, f64)],
) -> Result<f64> {
    let (up, down) = window_totals(today, window);
    if up + down == 0.0 {
        return Err(EngineError::division_by_zero(
            indicator,
            format!("{}-day sum of up and down values is 0", window.len() + 1),
        ));
    }
    Ok(round2(up / (up + down) * 100.0))
}

/// Mean of today's value and `window`.
pub fn trailing_average(today: f64, window: &[f64]) -> f64 {
    let sum: f64 = today + window.iter().sum::<f64>();
    round2(sum / (window.len() + 1) as f64)
}
