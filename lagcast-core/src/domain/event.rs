//! Events exchanged between the replay loop and the strategy.
//!
//! Market events flow in; signal events flow out through an append-only
//! [`EventSink`]. Signal events are immutable once emitted: they describe the
//! strategy's intent, not what execution later does with it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::ids::StrategyId;

/// A new bar is available for `symbol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
}

/// Exposure change requested by a signal. No short side exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Exit,
}

/// An intent to change market exposure, consumed downstream by portfolio logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub strategy_id: StrategyId,
    pub symbol: String,
    /// Timestamp of the market event that produced this signal.
    pub timestamp: NaiveDateTime,
    pub direction: SignalDirection,
    /// Signal weight (1.0 = full conviction).
    pub strength: f64,
}

/// Everything that travels through the event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
}

impl Event {
    pub fn as_signal(&self) -> Option<&SignalEvent> {
        match self {
            Self::Signal(signal) => Some(signal),
            Self::Market(_) => None,
        }
    }
}

/// Append-only outbound queue.
pub trait EventSink {
    fn put(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn put(&mut self, event: Event) {
        self.push(event);
    }
}

impl EventSink for VecDeque<Event> {
    fn put(&mut self, event: Event) {
        self.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 1, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn signal_direction_serializes_as_upper_case() {
        assert_eq!(
            serde_json::to_string(&SignalDirection::Long).unwrap(),
            "\"LONG\""
        );
        assert_eq!(
            serde_json::to_string(&SignalDirection::Exit).unwrap(),
            "\"EXIT\""
        );
    }

    #[test]
    fn event_is_tagged_by_type() {
        let event = Event::Signal(SignalEvent {
            strategy_id: StrategyId(1),
            symbol: "SPY".into(),
            timestamp: ts(),
            direction: SignalDirection::Exit,
            strength: 1.0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SIGNAL");
        assert_eq!(json["direction"], "EXIT");
        assert_eq!(json["symbol"], "SPY");
    }

    #[test]
    fn sinks_append_in_order() {
        let market = |s: &str| {
            Event::Market(MarketEvent {
                symbol: s.into(),
                timestamp: ts(),
            })
        };

        let mut vec_sink: Vec<Event> = Vec::new();
        vec_sink.put(market("A"));
        vec_sink.put(market("B"));
        assert_eq!(vec_sink[1], market("B"));

        let mut deque_sink: VecDeque<Event> = VecDeque::new();
        deque_sink.put(market("A"));
        deque_sink.put(market("B"));
        assert_eq!(deque_sink.pop_front(), Some(market("A")));
    }

    #[test]
    fn as_signal_filters_market_events() {
        let market = Event::Market(MarketEvent {
            symbol: "SPY".into(),
            timestamp: ts(),
        });
        assert!(market.as_signal().is_none());
    }
}
