//! Look-ahead contamination tests.
//!
//! Invariant: the features used to predict at bar t depend only on returns
//! realised before bar t. Neither the current bar's return nor any unreleased
//! bar may influence them.
//!
//! Method: replay two bar series that share a prefix and differ from some bar
//! onward, and compare the features extracted at each step.

use chrono::NaiveDate;
use lagcast_core::data::{build_lagged_series, DataHandler, HistoricBarFeed, InMemoryBarSource};
use lagcast_core::domain::Bar;
use lagcast_core::strategy::extract_features;

fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: "SPY".into(),
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
            adj_close: close,
        })
        .collect()
}

fn walk(n: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            price *= 1.0 + ((seed % 200) as f64 - 100.0) * 0.0002;
            price
        })
        .collect()
}

#[test]
fn current_bar_does_not_affect_features() {
    let closes = walk(20);
    let mut shocked = closes.clone();
    *shocked.last_mut().unwrap() *= 1.5;

    let mut a = HistoricBarFeed::new("SPY", make_bars(&closes)).unwrap();
    let mut b = HistoricBarFeed::new("SPY", make_bars(&shocked)).unwrap();
    while a.update_bars().is_some() {}
    while b.update_bars().is_some() {}

    assert_eq!(
        extract_features(&a, "SPY").unwrap(),
        extract_features(&b, "SPY").unwrap()
    );
}

#[test]
fn unreleased_bars_do_not_affect_features() {
    let closes = walk(60);
    let mut diverged = closes.clone();
    for c in diverged.iter_mut().skip(30) {
        *c *= 0.7;
    }

    let mut a = HistoricBarFeed::new("SPY", make_bars(&closes)).unwrap();
    let mut b = HistoricBarFeed::new("SPY", make_bars(&diverged)).unwrap();

    for step in 1..=30 {
        a.update_bars();
        b.update_bars();
        if step < 4 {
            continue;
        }
        assert_eq!(
            extract_features(&a, "SPY").unwrap(),
            extract_features(&b, "SPY").unwrap(),
            "features diverged at step {step}"
        );
    }
}

#[test]
fn feature_lags_match_the_training_table() {
    // The live path and the training table must agree on what "lag1" and
    // "lag2" mean for the same date.
    let closes = walk(800);
    let bars = make_bars(&closes);
    let source = InMemoryBarSource::new().with_bars("SPY", bars.clone());
    let start = NaiveDate::from_ymd_opt(2018, 1, 10).unwrap();
    let end = NaiveDate::from_ymd_opt(2018, 2, 10).unwrap();
    let table = build_lagged_series(&source, "SPY", start, end, 2).unwrap();

    let mut feed = HistoricBarFeed::new("SPY", bars).unwrap();
    for row in table.rows() {
        while feed.update_bars().is_some() {
            if feed.latest_bar("SPY").map(|b| b.date) == Some(row.date) {
                break;
            }
        }
        // At the row's own bar, the features exclude that bar's return and
        // should equal the row's lag columns.
        let live = extract_features(&feed, "SPY").unwrap();
        assert!((live.lag1 - row.lag(1).unwrap()).abs() < 1e-9, "lag1 at {}", row.date);
        assert!((live.lag2 - row.lag(2).unwrap()).abs() < 1e-9, "lag2 at {}", row.date);
    }
}
