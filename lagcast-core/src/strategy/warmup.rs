/// Market events that must be seen before the first prediction.
///
/// Must stay above 3: feature extraction needs three trailing returns.
pub const WARMUP_EVENTS: usize = 5;

/// True once `event_count` is past the warm-up threshold.
pub fn should_predict(event_count: usize) -> bool {
    event_count > WARMUP_EVENTS
}

/// Monotonic count of market events seen by a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmupCounter {
    events_seen: usize,
}

impl WarmupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event and return the new total.
    pub fn record_event(&mut self) -> usize {
        self.events_seen = self.events_seen.saturating_add(1);
        self.events_seen
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    pub fn is_warm(&self) -> bool {
        should_predict(self.events_seen)
    }

    pub fn events_until_warm(&self) -> usize {
        (WARMUP_EVENTS + 1).saturating_sub(self.events_seen)
    }
}
