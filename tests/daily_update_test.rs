//! Daily update orchestration tests

use breadthwatch::config::WalkerConfig;
use breadthwatch::services::{BreadthRepository, DailyUpdater, SignalRepository, SqliteStore};
use breadthwatch::{DailySnapshot, Exchange};
use chrono::NaiveDate;
use std::sync::Arc;

fn snapshot(date: &str, nasdaq_advancing: &str, aapl_close: &str) -> DailySnapshot {
    let json = format!(
        r#"{{
            "date": "{date}",
            "breadth": {{
                "nasdaq": {{
                    "advancing_volume": "{nasdaq_advancing}",
                    "declining_volume": "1,000,000",
                    "close": "0.4%",
                    "advances": "2,310",
                    "declines": "1,905",
                    "new_highs": 80,
                    "new_lows": 41
                }},
                "nyse": {{
                    "advancing_volume": 900000,
                    "declining_volume": 700000,
                    "close": -0.2,
                    "advances": 1450,
                    "declines": 1320,
                    "new_highs": 35,
                    "new_lows": 22
                }}
            }},
            "signals": [
                {{"ticker": "aapl (Apple)", "description": "Apple Inc", "buy": "$118.00", "sell": "$131.00", "close": "{aapl_close}"}},
                {{"ticker": "TLT", "description": "Treasury bonds", "buy": "98.5", "sell": "104.1", "close": "101.2"}}
            ]
        }}"#
    );
    DailySnapshot::from_json(&json).unwrap()
}

fn updater(store: &Arc<SqliteStore>) -> DailyUpdater {
    DailyUpdater::new(store.clone(), store.clone(), &WalkerConfig::default())
}

#[tokio::test]
async fn test_apply_writes_every_table() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let report = updater(&store)
        .apply(snapshot("January 3, 2023", "3,000,000", "129"))
        .await
        .unwrap();

    assert_eq!(report.date, "2023-01-03");
    assert_eq!(report.breadth.written, 2);
    assert_eq!(report.signals.written, 2);
    assert!(report.breadth.is_clean() && report.signals.is_clean());

    let day = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
    let aapl = store.get_by_date_and_ticker(day, "AAPL").unwrap().unwrap();
    assert_eq!(aapl.description, "APPLE INC");
    assert_eq!(aapl.buy, 118.0);
}

#[tokio::test]
async fn test_backfill_applies_oldest_first() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let reports = updater(&store)
        .backfill(vec![
            snapshot("01/04/23", "2,000,000", "125"),
            snapshot("Tuesday, January 3, 2023", "3,000,000", "129"),
        ])
        .await
        .unwrap();

    assert_eq!(reports[0].date, "2023-01-03");
    assert_eq!(reports[1].date, "2023-01-04");

    let day = NaiveDate::from_ymd_opt(2023, 1, 4).unwrap();
    let aapl = store.get_by_date_and_ticker(day, "AAPL").unwrap().unwrap();
    assert_eq!(aapl.od_delta, Some(-3.1));

    let nasdaq = store.get_by_date(Exchange::Nasdaq, day).unwrap().unwrap();
    // total volume 3,000,000 vs 4,000,000 the day before
    assert_eq!(nasdaq.volume_delta, Some(-25.0));
}

#[tokio::test]
async fn test_reapplying_a_day_skips_existing_rows() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let updater = updater(&store);
    updater
        .apply(snapshot("January 3, 2023", "3,000,000", "129"))
        .await
        .unwrap();
    let report = updater
        .apply(snapshot("January 3, 2023", "9,000,000", "1"))
        .await
        .unwrap();

    assert_eq!(report.breadth.written, 0);
    assert_eq!(report.breadth.skipped, 2);
    assert_eq!(report.signals.skipped, 2);
}

#[tokio::test]
async fn test_bad_ticker_does_not_block_others() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let report = updater(&store)
        .apply(snapshot("January 3, 2023", "3,000,000", "0"))
        .await
        .unwrap();

    assert_eq!(report.signals.written, 1);
    assert_eq!(report.signals.failures.len(), 1);
    assert_eq!(report.signals.failures[0].key, "AAPL");
    assert_eq!(store.signal_dates().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unparseable_date_is_rejected() {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let result = updater(&store)
        .apply(snapshot("sometime last week", "3,000,000", "129"))
        .await;
    assert!(result.is_err());
}
