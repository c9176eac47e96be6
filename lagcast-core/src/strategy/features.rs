//! Per-event feature extraction.

use crate::data::{BarField, DataHandler};
use crate::error::{Result, StrategyError};
use crate::model::FeatureVector;

/// Trailing returns requested per prediction.
pub const FEATURE_WINDOW: usize = 3;

const PERCENT: f64 = 100.0;

/// Build `{lag1, lag2}` from the three latest returns (most recent first).
///
/// `returns[0]` is the current period and is never a predictor; `returns[1]`
/// and `returns[2]` are scaled from fractions to percent, the unit the model
/// was trained in.
pub fn extract_features(data: &dyn DataHandler, symbol: &str) -> Result<FeatureVector> {
    let returns = data.latest_values(symbol, BarField::Returns, FEATURE_WINDOW)?;
    if returns.len() < FEATURE_WINDOW {
        return Err(StrategyError::InsufficientHistory {
            symbol: symbol.to_string(),
            required: FEATURE_WINDOW,
            available: returns.len(),
        });
    }
    Ok(FeatureVector::new(
        returns[1] * PERCENT,
        returns[2] * PERCENT,
    ))
}
