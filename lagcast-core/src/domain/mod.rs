//! Domain types: bars, identifiers and queue events.

pub mod bar;
pub mod event;
pub mod ids;

pub use bar::Bar;
pub use event::{Event, EventSink, MarketEvent, SignalDirection, SignalEvent};
pub use ids::{RunId, StrategyId};
