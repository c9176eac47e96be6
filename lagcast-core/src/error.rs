//! Error taxonomy for strategy construction and event processing.

use crate::data::DataError;
use thiserror::Error;

/// Errors raised by the forecast strategy and its collaborators.
///
/// `Configuration` and `Training` only occur while a strategy is being built;
/// a strategy that fails with either is never handed out. `InsufficientHistory`
/// after the warm-up gate has opened means the data feed broke its contract,
/// and the run should be aborted rather than skipped.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("prediction error: {0}")]
    Prediction(String),

    #[error(
        "insufficient history for '{symbol}': need {required} observations, have {available}"
    )]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type Result<T> = std::result::Result<T, StrategyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message_names_symbol_and_counts() {
        let err = StrategyError::InsufficientHistory {
            symbol: "SPY".into(),
            required: 3,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("SPY"));
        assert!(msg.contains("need 3"));
        assert!(msg.contains("have 1"));
    }

    #[test]
    fn data_error_converts_transparently() {
        let err: StrategyError = DataError::SymbolNotFound {
            symbol: "QQQ".into(),
        }
        .into();
        assert_eq!(err.to_string(), "symbol not found: QQQ");
    }
}
