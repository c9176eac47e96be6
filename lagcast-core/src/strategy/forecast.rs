//! Forecast strategy: predict tomorrow's direction from two lagged returns and
//! hold a long position while the forecast stays non-negative.

use tracing::{debug, info};

use super::features::extract_features;
use super::model::{build_model, ModelSpec, TrainedModel};
use super::position::PositionState;
use super::warmup::WarmupCounter;
use super::Strategy;
use crate::data::{BarSource, DataHandler};
use crate::domain::{Event, EventSink, MarketEvent, SignalDirection, SignalEvent, StrategyId};
use crate::error::Result;
use crate::model::Classifier;

/// Identifier stamped on signals unless overridden.
pub const DEFAULT_STRATEGY_ID: StrategyId = StrategyId(1);

/// Every signal is emitted at full weight.
pub const SIGNAL_STRENGTH: f64 = 1.0;

/// Long/flat strategy driven by a trained direction classifier.
///
/// Owns its model, warm-up counter and position. None of these are shared;
/// other components only ever see the signals it emits.
#[derive(Debug)]
pub struct ForecastStrategy<C> {
    id: StrategyId,
    model: TrainedModel<C>,
    warmup: WarmupCounter,
    position: PositionState,
}

impl<C: Classifier> ForecastStrategy<C> {
    /// Train `classifier` per `spec` and return a strategy ready for events.
    ///
    /// Fails with `Configuration` or `Training` errors; no strategy exists
    /// unless training succeeded.
    pub fn new(source: &dyn BarSource, spec: &ModelSpec, classifier: C) -> Result<Self> {
        let model = build_model(source, spec, classifier)?;
        Ok(Self::from_model(model))
    }

    /// Start a strategy from an already-trained model.
    pub fn from_model(model: TrainedModel<C>) -> Self {
        Self {
            id: DEFAULT_STRATEGY_ID,
            model,
            warmup: WarmupCounter::new(),
            position: PositionState::Flat,
        }
    }

    pub fn with_id(mut self, id: StrategyId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> StrategyId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        self.model.symbol()
    }

    pub fn model(&self) -> &TrainedModel<C> {
        &self.model
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    pub fn events_seen(&self) -> usize {
        self.warmup.events_seen()
    }

    /// Handle one market event; returns the direction of the emitted signal, if any.
    ///
    /// State only changes after extraction and prediction have both
    /// succeeded, so an error leaves the position untouched and emits nothing.
    pub fn on_market(
        &mut self,
        event: &MarketEvent,
        data: &dyn DataHandler,
        sink: &mut dyn EventSink,
    ) -> Result<Option<SignalDirection>> {
        if event.symbol != self.model.symbol() {
            debug!(
                symbol = %event.symbol,
                strategy_symbol = self.model.symbol(),
                "ignoring market event for another symbol"
            );
            return Ok(None);
        }

        self.warmup.record_event();
        if !self.warmup.is_warm() {
            debug!(
                events = self.warmup.events_seen(),
                remaining = self.warmup.events_until_warm(),
                "warming up"
            );
            return Ok(None);
        }

        let features = extract_features(data, self.model.symbol())?;
        let prediction = self.model.predict(&features)?;
        let transition = self.position.transition(prediction);

        debug!(
            timestamp = %event.timestamp,
            lag1 = features.lag1,
            lag2 = features.lag2,
            prediction,
            from = ?self.position,
            to = ?transition.next,
            "prediction"
        );

        if let Some(direction) = transition.signal {
            let signal = SignalEvent {
                strategy_id: self.id,
                symbol: self.model.symbol().to_string(),
                timestamp: event.timestamp,
                direction,
                strength: SIGNAL_STRENGTH,
            };
            info!(
                symbol = %signal.symbol,
                timestamp = %signal.timestamp,
                direction = ?direction,
                "signal"
            );
            sink.put(Event::Signal(signal));
        }

        self.position = transition.next;
        Ok(transition.signal)
    }
}

impl<C: Classifier> Strategy for ForecastStrategy<C> {
    fn name(&self) -> &str {
        "lagged_return_forecast"
    }

    fn calculate_signals(
        &mut self,
        event: &Event,
        data: &dyn DataHandler,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        match event {
            Event::Market(market) => self.on_market(market, data, sink).map(|_| ()),
            Event::Signal(_) => Ok(()),
        }
    }
}
