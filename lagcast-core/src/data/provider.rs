//! Bar source trait and structured data errors.
//!
//! The `BarSource` trait abstracts over where historical bars come from (CSV
//! directory, synthetic random walk, in-memory fixtures) so the lagged-series
//! builder and the replay feed can be tested without touching disk.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars for '{symbol}' between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("failed to read {}: {reason}", .path.display())]
    Csv { path: PathBuf, reason: String },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Source of historical daily bars.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Bars for `symbol` dated within `[start, end]`, ascending by date.
    fn bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError>;
}

/// Check that bars are strictly ascending by date.
pub fn ensure_ascending(symbol: &str, bars: &[Bar]) -> Result<(), DataError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(DataError::ValidationError(format!(
                "{symbol}: bars out of order or duplicated at {} -> {}",
                pair[0].date, pair[1].date
            )));
        }
    }
    Ok(())
}

/// Bars held in memory, keyed by symbol. Used for fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBarSource {
    bars: HashMap<String, Vec<Bar>>,
}

impl InMemoryBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for a symbol. Bars are sorted by date on insert.
    pub fn insert(&mut self, symbol: impl Into<String>, mut bars: Vec<Bar>) {
        bars.sort_by_key(|b| b.date);
        self.bars.insert(symbol.into(), bars);
    }

    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }
}

impl BarSource for InMemoryBarSource {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let all = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        ensure_ascending(symbol, all)?;
        Ok(all
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect())
    }
}
