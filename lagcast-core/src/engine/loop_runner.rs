use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{info, warn};

use crate::data::HistoricBarFeed;
use crate::domain::{Event, SignalDirection, SignalEvent};
use crate::error::Result;
use crate::strategy::Strategy;

/// What happened during a replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bars: usize,
    pub market_events: usize,
    /// Signals in emission order.
    pub signals: Vec<SignalEvent>,
}

impl RunSummary {
    pub fn count(&self, direction: SignalDirection) -> usize {
        self.signals
            .iter()
            .filter(|s| s.direction == direction)
            .count()
    }
}

/// Replay every bar in `feed` through `strategy`.
///
/// Events are handled strictly in queue order. The first strategy error aborts
/// the run and is returned; signals emitted before it are lost with the summary.
pub fn run_backtest<S: Strategy + ?Sized>(
    feed: &mut HistoricBarFeed,
    strategy: &mut S,
) -> Result<RunSummary> {
    let mut queue: VecDeque<Event> = VecDeque::new();
    let mut summary = RunSummary::default();

    while let Some(market) = feed.update_bars() {
        summary.bars += 1;
        queue.push_back(Event::Market(market));

        while let Some(event) = queue.pop_front() {
            match &event {
                Event::Market(_) => {
                    summary.market_events += 1;
                    if let Err(e) = strategy.calculate_signals(&event, &*feed, &mut queue) {
                        warn!(
                            strategy = strategy.name(),
                            bar = summary.bars,
                            error = %e,
                            "aborting run"
                        );
                        return Err(e);
                    }
                }
                Event::Signal(signal) => summary.signals.push(signal.clone()),
            }
        }
    }

    info!(
        strategy = strategy.name(),
        symbol = feed.symbol(),
        bars = summary.bars,
        longs = summary.count(SignalDirection::Long),
        exits = summary.count(SignalDirection::Exit),
        "replay finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataHandler;
    use crate::domain::{Bar, EventSink, StrategyId};
    use crate::error::StrategyError;
    use chrono::{Duration, NaiveDate};

    fn feed(n: usize) -> HistoricBarFeed {
        let base = NaiveDate::from_ymd_opt(2017, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar {
                    symbol: "SPY".into(),
                    date: base + Duration::days(i as i64),
                    open: c,
                    high: c,
                    low: c,
                    close: c,
                    volume: 1,
                    adj_close: c,
                }
            })
            .collect();
        HistoricBarFeed::new("SPY", bars).unwrap()
    }

    /// Emits one signal per market event and records what it saw.
    struct Echo {
        seen: Vec<usize>,
        fail_at: Option<usize>,
    }

    impl Strategy for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn calculate_signals(
            &mut self,
            event: &Event,
            data: &dyn DataHandler,
            sink: &mut dyn EventSink,
        ) -> Result<()> {
            if let Event::Market(m) = event {
                let visible = data
                    .latest_values(&m.symbol, crate::data::BarField::Close, usize::MAX)?
                    .len();
                if Some(visible) == self.fail_at {
                    return Err(StrategyError::Prediction("boom".into()));
                }
                self.seen.push(visible);
                sink.put(Event::Signal(SignalEvent {
                    strategy_id: StrategyId(1),
                    symbol: m.symbol.clone(),
                    timestamp: m.timestamp,
                    direction: SignalDirection::Long,
                    strength: 1.0,
                }));
            }
            Ok(())
        }
    }

    #[test]
    fn drains_queue_after_each_bar() {
        let mut f = feed(4);
        let mut s = Echo {
            seen: Vec::new(),
            fail_at: None,
        };
        let summary = run_backtest(&mut f, &mut s).unwrap();
        assert_eq!(summary.bars, 4);
        assert_eq!(summary.market_events, 4);
        assert_eq!(summary.signals.len(), 4);
        // The strategy only ever sees bars released so far.
        assert_eq!(s.seen, vec![1, 2, 3, 4]);
        assert_eq!(summary.count(SignalDirection::Long), 4);
        assert_eq!(summary.count(SignalDirection::Exit), 0);
    }

    #[test]
    fn first_error_aborts() {
        let mut f = feed(10);
        let mut s = Echo {
            seen: Vec::new(),
            fail_at: Some(3),
        };
        assert!(run_backtest(&mut f, &mut s).is_err());
        assert_eq!(s.seen, vec![1, 2]);
        assert_eq!(f.released(), 3);
    }
}
