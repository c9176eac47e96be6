//! End-to-end replays: train on a bar source, then drive the strategy bar by
//! bar through the replay loop.

use chrono::NaiveDate;
use lagcast_core::config::RunConfig;
use lagcast_core::data::{BarSource, CsvBarSource, HistoricBarFeed, SyntheticBarSource};
use lagcast_core::domain::{SignalDirection, SignalEvent};
use lagcast_core::engine::run_backtest;
use lagcast_core::model::{ClassifierKind, QuadraticDiscriminant};
use lagcast_core::strategy::{ForecastStrategy, ModelSpec, PositionState};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn spec() -> ModelSpec {
    ModelSpec {
        symbol: "SPY".into(),
        train_start: d(2016, 1, 10),
        train_end: d(2017, 12, 31),
        test_cutoff: d(2017, 1, 1),
        lag_count: 5,
    }
}

fn synthetic() -> SyntheticBarSource {
    SyntheticBarSource::new(42, d(2014, 6, 2))
}

fn replay(source: &dyn BarSource) -> (Vec<SignalEvent>, usize, PositionState) {
    let mut strategy =
        ForecastStrategy::new(source, &spec(), QuadraticDiscriminant::default()).unwrap();
    let bars = source.bars("SPY", d(2017, 1, 3), d(2017, 12, 29)).unwrap();
    let mut feed = HistoricBarFeed::new("SPY", bars).unwrap();
    let summary = run_backtest(&mut feed, &mut strategy).unwrap();
    assert_eq!(summary.bars, summary.market_events);
    (summary.signals, summary.bars, strategy.position())
}

#[test]
fn synthetic_replay_produces_alternating_signals() {
    let (signals, bars, position) = replay(&synthetic());
    assert!(bars > 200);
    // A year of a noisy walk flips the forecast many times.
    assert!(signals.len() >= 20, "only {} signals over {bars} bars", signals.len());

    for (i, s) in signals.iter().enumerate() {
        let expected = if i % 2 == 0 {
            SignalDirection::Long
        } else {
            SignalDirection::Exit
        };
        assert_eq!(s.direction, expected);
        assert_eq!(s.strength, 1.0);
        assert_eq!(s.symbol, "SPY");
    }

    let expected_position = if signals.len() % 2 == 1 {
        PositionState::Long
    } else {
        PositionState::Flat
    };
    assert_eq!(position, expected_position);
}

#[test]
fn no_signal_before_sixth_bar() {
    let source = synthetic();
    let (signals, _, _) = replay(&source);
    let bars = source.bars("SPY", d(2017, 1, 3), d(2017, 12, 29)).unwrap();
    let first = signals.first().expect("replay emitted no signals");
    assert!(first.timestamp.date() >= bars[5].date);
}

#[test]
fn signal_timestamps_strictly_increase() {
    let (signals, _, _) = replay(&synthetic());
    assert!(signals.len() >= 2);
    assert!(signals.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn replay_is_deterministic() {
    let (a, _, _) = replay(&synthetic());
    let (b, _, _) = replay(&synthetic());
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn csv_source_replays_like_the_bars_it_was_written_from() {
    let source = synthetic();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("SPY.csv");

    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer
        .write_record(["date", "open", "high", "low", "close", "adj_close", "volume"])
        .unwrap();
    for bar in source.generate("SPY", d(2017, 12, 31)) {
        writer
            .write_record(&[
                bar.date.format("%Y-%m-%d").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.adj_close.to_string(),
                bar.volume.to_string(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();

    let csv_source = CsvBarSource::new(dir.path());
    let (from_csv, _, _) = replay(&csv_source);
    let (from_memory, _, _) = replay(&source);
    assert!(!from_memory.is_empty());
    assert_eq!(from_csv, from_memory);
}

#[test]
fn default_config_runs_on_synthetic_data() {
    let mut cfg = RunConfig::default();
    cfg.data.synthetic_seed = Some(7);
    cfg.data.backtest_end = Some(d(2017, 6, 30));
    cfg.validate().unwrap();

    let source = SyntheticBarSource::new(7, cfg.history_origin());
    for kind in [
        ClassifierKind::default(),
        ClassifierKind::Logistic {
            learning_rate: 0.05,
            max_iter: 500,
            l2: 0.0,
        },
    ] {
        let mut strategy =
            ForecastStrategy::new(&source, &cfg.model_spec(), kind.build()).unwrap();
        let bars = source
            .bars("SPY", cfg.data.backtest_start, d(2017, 6, 30))
            .unwrap();
        let mut feed = HistoricBarFeed::new("SPY", bars).unwrap();
        let summary = run_backtest(&mut feed, &mut strategy).unwrap();
        assert!(summary.bars > 100);
        let longs = summary.count(SignalDirection::Long);
        let exits = summary.count(SignalDirection::Exit);
        assert!(longs == exits || longs == exits + 1);
    }
}
