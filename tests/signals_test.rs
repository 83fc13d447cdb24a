//! Integration tests for the signal delta engine

use breadthwatch::services::{
    DayFilter, LaggedDelta, MemoryStore, RowOutcome, SignalEngine, SignalRepository,
};
use breadthwatch::{EngineError, Signal, SignalInput};
use chrono::NaiveDate;
use std::sync::Arc;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn quote(date: &str, ticker: &str, buy: f64, sell: f64, close: f64) -> SignalInput {
    SignalInput {
        date: date.to_string(),
        ticker: ticker.to_string(),
        description: "APPLE INC".to_string(),
        buy,
        sell,
        close,
    }
}

fn setup() -> (Arc<MemoryStore>, SignalEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = SignalEngine::new(store.clone(), DayFilter::Weekdays);
    (store, engine)
}

fn add(engine: &SignalEngine, input: SignalInput) -> Signal {
    engine.add_row(&input).unwrap().written().unwrap()
}

#[test]
fn test_one_day_delta() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-03", "AAPL", 120.0, 135.0, 129.0));
    let row = add(&engine, quote("2023-01-04", "AAPL", 118.0, 131.0, 125.0));

    assert_eq!(row.od_delta, Some(-3.1));
    assert_eq!(row.ow_delta, None);
    assert_eq!(row.delta_ww, None);
}

#[test]
fn test_one_day_delta_reaches_back_over_weekend() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-06", "AAPL", 90.0, 110.0, 100.0));
    let row = add(&engine, quote("2023-01-09", "AAPL", 92.0, 112.0, 102.0));
    assert_eq!(row.od_delta, Some(2.0));
}

#[test]
fn test_week_over_week_spread() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-04", "AAPL", 80.0, 99.0, 90.0));
    let row = add(&engine, quote("2023-01-11", "AAPL", 88.0, 99.0, 99.0));

    assert_eq!(row.delta_ww, Some(8.0));
    assert_eq!(row.od_delta, Some(10.0));
    assert_eq!(row.ow_delta, Some(10.0));
}

#[test]
fn test_one_week_skips_recent_rows() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-04", "AAPL", 95.0, 105.0, 100.0));
    add(&engine, quote("2023-01-10", "AAPL", 105.0, 115.0, 110.0));
    let row = add(&engine, quote("2023-01-11", "AAPL", 115.0, 125.0, 121.0));

    assert_eq!(row.od_delta, Some(10.0));
    assert_eq!(row.ow_delta, Some(21.0));
}

#[test]
fn test_one_month_window() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-27", "AAPL", 45.0, 55.0, 50.0));
    add(&engine, quote("2023-02-15", "AAPL", 75.0, 85.0, 80.0));
    let row = add(&engine, quote("2023-03-01", "AAPL", 55.0, 65.0, 60.0));

    assert_eq!(row.om_delta, Some(20.0));
    assert_eq!(row.od_delta, Some(-25.0));
    assert_eq!(row.tm_delta, None);
}

#[test]
fn test_one_year_window() {
    let (_store, engine) = setup();
    add(&engine, quote("2022-01-05", "AAPL", 95.0, 105.0, 100.0));
    let row = add(&engine, quote("2023-01-05", "AAPL", 140.0, 160.0, 150.0));

    assert_eq!(row.oy_delta, Some(50.0));
    assert_eq!(row.sm_delta, None);
    assert_eq!(row.od_delta, None);
}

#[test]
fn test_tickers_do_not_share_history() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-03", "AAPL", 120.0, 135.0, 129.0));
    let row = add(&engine, quote("2023-01-04", "AMZN", 80.0, 90.0, 85.0));
    assert_eq!(row.od_delta, None);
}

#[test]
fn test_range_asymmetry() {
    let (_store, engine) = setup();
    let row = add(&engine, quote("2023-01-04", "AAPL", 218.0, 242.0, 239.0));
    assert_eq!(row.ra_buy, -8.79);
    assert_eq!(row.ra_sell, 1.26);
}

#[test]
fn test_zero_reference_close_aborts_row() {
    let (store, engine) = setup();
    store
        .write_signal(&Signal {
            date: d("2023-01-03"),
            ticker: "AAPL".to_string(),
            description: "APPLE INC".to_string(),
            buy: 1.0,
            sell: 2.0,
            close: 0.0,
            delta_ww: None,
            od_delta: None,
            ow_delta: None,
            om_delta: None,
            tm_delta: None,
            sm_delta: None,
            oy_delta: None,
            ra_buy: 0.0,
            ra_sell: 0.0,
        })
        .unwrap();

    let err = engine
        .add_row(&quote("2023-01-04", "AAPL", 118.0, 131.0, 125.0))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::DivisionByZero { indicator: "od_delta", .. }
    ));
    assert_eq!(store.signal_count(), 1);
}

#[test]
fn test_zero_close_rejected() {
    let (store, engine) = setup();
    let err = engine
        .add_row(&quote("2023-01-04", "AAPL", 1.0, 2.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, EngineError::DivisionByZero { .. }));
    assert!(store.is_empty());
}

#[test]
fn test_add_row_is_idempotent() {
    let (store, engine) = setup();
    let first = add(&engine, quote("2023-01-04", "AAPL", 218.0, 242.0, 239.0));
    let again = engine
        .add_row(&quote("2023-01-04", "AAPL", 1.0, 2.0, 3.0))
        .unwrap();

    assert_eq!(again, RowOutcome::AlreadyPresent);
    assert_eq!(
        store.get_by_date_and_ticker(d("2023-01-04"), "AAPL").unwrap(),
        Some(first)
    );
}

#[test]
fn test_lagged_delta_matches_named_accessors() {
    let (_store, engine) = setup();
    add(&engine, quote("2023-01-03", "AAPL", 120.0, 135.0, 129.0));
    let today = d("2023-01-04");
    assert_eq!(
        engine.lagged_delta(LaggedDelta::OneDay, today, "AAPL", 125.0).unwrap(),
        engine.od_delta(today, "AAPL", 125.0).unwrap()
    );
    assert_eq!(engine.tm_delta(today, "AAPL", 125.0).unwrap(), None);
}
