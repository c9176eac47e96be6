//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// Returns are always derived from `adj_close`, matching the unit convention
/// used when the model is trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl Bar {
    /// Returns true if any price field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.adj_close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open/close, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
            && self.adj_close > 0.0
    }

    /// Fractional return from `prev` to this bar on adjusted closes.
    pub fn return_since(&self, prev: &Bar) -> f64 {
        self.adj_close / prev.adj_close - 1.0
    }
}
