//! The forecast strategy and its building blocks.
//!
//! Per market event the strategy runs four steps, in order:
//! 1. Count the event and check the warm-up gate
//! 2. Extract the two lag features from the data handler
//! 3. Ask the trained model for a direction
//! 4. Step the Flat/Long state machine and emit at most one signal

pub mod features;
pub mod forecast;
pub mod model;
pub mod position;
pub mod warmup;

pub use features::{extract_features, FEATURE_WINDOW};
pub use forecast::{ForecastStrategy, DEFAULT_STRATEGY_ID, SIGNAL_STRENGTH};
pub use model::{build_model, fit_model, prepare_dataset, ModelSpec, TrainedModel};
pub use position::{PositionState, Transition};
pub use warmup::{should_predict, WarmupCounter, WARMUP_EVENTS};

use crate::data::DataHandler;
use crate::domain::{Event, EventSink};
use crate::error::Result;

/// Anything that turns events into signals.
///
/// Strategies are driven synchronously by a single consumer. The data handler
/// and the outbound sink are lent per call, so a strategy never holds on to
/// either between events.
pub trait Strategy {
    fn name(&self) -> &str;

    /// React to one event. Non-market events are ignored.
    fn calculate_signals(
        &mut self,
        event: &Event,
        data: &dyn DataHandler,
        sink: &mut dyn EventSink,
    ) -> Result<()>;
}
