//! The data-handler contract consumed by the strategy, plus a replay feed.
//!
//! `HistoricBarFeed` drip-feeds pre-loaded bars one at a time, so that at any
//! moment only bars up to the current one are observable. The strategy reads
//! from it through [`DataHandler`] and never sees the unreleased tail.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::provider::{ensure_ascending, DataError};
use crate::domain::{Bar, MarketEvent};

/// Field selector for [`DataHandler::latest_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    /// Fractional close-to-close return on adjusted closes.
    Returns,
}

impl BarField {
    /// Value read directly off a single bar. `Returns` needs two bars.
    fn raw_value(self, bar: &Bar) -> Option<f64> {
        match self {
            Self::Open => Some(bar.open),
            Self::High => Some(bar.high),
            Self::Low => Some(bar.low),
            Self::Close => Some(bar.close),
            Self::AdjClose => Some(bar.adj_close),
            Self::Volume => Some(bar.volume as f64),
            Self::Returns => None,
        }
    }
}

/// Read-only view of the bars observed so far.
pub trait DataHandler {
    /// Up to `n` most recent values of `field`, most recent first.
    ///
    /// Returns fewer than `n` values when not enough history has been
    /// observed yet. Fails for unknown symbols.
    fn latest_values(&self, symbol: &str, field: BarField, n: usize) -> Result<Vec<f64>, DataError>;

    /// The most recently released bar, if any.
    fn latest_bar(&self, symbol: &str) -> Option<&Bar>;
}

/// Replays a single symbol's bars in date order.
#[derive(Debug, Clone)]
pub struct HistoricBarFeed {
    symbol: String,
    bars: Vec<Bar>,
    released: usize,
}

impl HistoricBarFeed {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        let symbol = symbol.into();
        ensure_ascending(&symbol, &bars)?;
        Ok(Self {
            symbol,
            bars,
            released: 0,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// True while unreleased bars remain.
    pub fn has_next(&self) -> bool {
        self.released < self.bars.len()
    }

    /// Number of bars released so far.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Release the next bar and describe it as a market event.
    pub fn update_bars(&mut self) -> Option<MarketEvent> {
        let bar = self.bars.get(self.released)?;
        self.released += 1;
        Some(MarketEvent {
            symbol: self.symbol.clone(),
            timestamp: NaiveDateTime::new(bar.date, NaiveTime::default()),
        })
    }

    fn observed(&self) -> &[Bar] {
        &self.bars[..self.released]
    }

    fn check_symbol(&self, symbol: &str) -> Result<(), DataError> {
        if symbol == self.symbol {
            Ok(())
        } else {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }
}

impl DataHandler for HistoricBarFeed {
    fn latest_values(&self, symbol: &str, field: BarField, n: usize) -> Result<Vec<f64>, DataError> {
        self.check_symbol(symbol)?;
        let observed = self.observed();

        let values = match field {
            // The first observed bar has no prior close, so it yields no return.
            BarField::Returns => observed
                .windows(2)
                .rev()
                .take(n)
                .map(|pair| pair[1].return_since(&pair[0]))
                .collect(),
            _ => observed
                .iter()
                .rev()
                .take(n)
                .filter_map(|bar| field.raw_value(bar))
                .collect(),
        };
        Ok(values)
    }

    fn latest_bar(&self, symbol: &str) -> Option<&Bar> {
        if symbol != self.symbol {
            return None;
        }
        self.observed().last()
    }
}
