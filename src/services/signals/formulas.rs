//! Ticker signal formulas.

use crate::error::{EngineError, Result};
use crate::services::math::{percent_change, round2};
use crate::services::walker::LagWindow;

/// Search window for the week-over-week spread delta.
pub const WEEK_OVER_WEEK_WINDOW: LagWindow = LagWindow::new(7, 29);

/// Calendar-lagged close-to-close deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaggedDelta {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonth,
    SixMonth,
    OneYear,
}

impl LaggedDelta {
    pub const ALL: [LaggedDelta; 6] = [
        LaggedDelta::OneDay,
        LaggedDelta::OneWeek,
        LaggedDelta::OneMonth,
        LaggedDelta::ThreeMonth,
        LaggedDelta::SixMonth,
        LaggedDelta::OneYear,
    ];

    /// Offsets (days back) searched for the reference close.
    pub fn window(&self) -> LagWindow {
        match self {
            LaggedDelta::OneDay => LagWindow::new(1, 29),
            LaggedDelta::OneWeek => LagWindow::new(7, 29),
            LaggedDelta::OneMonth => LagWindow::new(30, 49),
            LaggedDelta::ThreeMonth => LagWindow::new(90, 119),
            LaggedDelta::SixMonth => LagWindow::new(180, 209),
            LaggedDelta::OneYear => LagWindow::new(365, 399),
        }
    }

    /// Field name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            LaggedDelta::OneDay => "od_delta",
            LaggedDelta::OneWeek => "ow_delta",
            LaggedDelta::OneMonth => "om_delta",
            LaggedDelta::ThreeMonth => "tm_delta",
            LaggedDelta::SixMonth => "sm_delta",
            LaggedDelta::OneYear => "oy_delta",
        }
    }

    /// Close-to-close change vs. the reference close (%).
    pub fn compute(&self, close: f64, reference_close: f64) -> Result<f64> {
        percent_change(self.name(), close, reference_close)
    }
}

/// Today's buy/sell spread minus the reference day's spread.
pub fn delta_ww(today_buy: f64, today_sell: f64, ref_buy: f64, ref_sell: f64) -> f64 {
    round2((today_buy - today_sell) - (ref_buy - ref_sell))
}

/// Buy distance from close (%).
pub fn ra_buy(buy: f64, close: f64) -> Result<f64> {
    range_asymmetry("ra_buy", buy, close)
}

/// Sell distance from close (%).
pub fn ra_sell(sell: f64, close: f64) -> Result<f64> {
    range_asymmetry("ra_sell", sell, close)
}

fn range_asymmetry(indicator: &'static str, quote: f64, close: f64) -> Result<f64> {
    if close == 0.0 {
        return Err(EngineError::division_by_zero(indicator, "close is 0"));
    }
    Ok(round2((quote - close) / close * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ra_buy() {
        assert_eq!(ra_buy(218.0, 239.0).unwrap(), -8.79);
        assert_eq!(ra_buy(103.0, 123.0).unwrap(), -16.26);
    }

    #[test]
    fn test_ra_sell() {
        assert_eq!(ra_sell(242.0, 239.0).unwrap(), 1.26);
        assert_eq!(ra_sell(128.0, 123.0).unwrap(), 4.07);
    }

    #[test]
    fn test_range_asymmetry_zero_close() {
        assert!(matches!(
            ra_buy(1.0, 0.0),
            Err(EngineError::DivisionByZero { indicator: "ra_buy", .. })
        ));
        assert!(matches!(
            ra_sell(1.0, 0.0),
            Err(EngineError::DivisionByZero { indicator: "ra_sell", .. })
        ));
    }

    #[test]
    fn test_delta_ww() {
        // (88 - 99) - (80 - 99)
        assert_eq!(delta_ww(88.0, 99.0, 80.0, 99.0), 8.0);
        assert_eq!(delta_ww(3.98, 7.14, 5.0, 6.33), -1.83);
    }

    #[test]
    fn test_lagged_windows_are_ordered() {
        for delta in LaggedDelta::ALL {
            let window = delta.window();
            assert!(window.first <= window.last, "{}", delta.name());
        }
        assert_eq!(LaggedDelta::OneYear.window(), LagWindow::new(365, 399));
    }

    #[test]
    fn test_lagged_compute_zero_reference() {
        let err = LaggedDelta::OneMonth.compute(10.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("om_delta"));
    }
}
