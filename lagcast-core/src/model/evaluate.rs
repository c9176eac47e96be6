//! Offline hit-rate evaluation on the held-out partition.

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, Direction};
use crate::data::LaggedRow;
use crate::error::{Result, StrategyError};

/// Outcome of predicting every row of a held-out partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub hits: usize,
    pub hit_rate: f64,
    pub true_up: usize,
    pub false_up: usize,
    pub true_down: usize,
    pub false_down: usize,
    /// Predictions of 0, counted as misses.
    pub abstained: usize,
}

/// Predict each row and compare with its realised direction.
pub fn evaluate<C: Classifier + ?Sized>(model: &C, rows: &[LaggedRow]) -> Result<EvaluationReport> {
    if rows.is_empty() {
        return Err(StrategyError::Training(
            "test partition is empty; move the test cutoff earlier".into(),
        ));
    }

    let mut report = EvaluationReport {
        samples: rows.len(),
        hits: 0,
        hit_rate: 0.0,
        true_up: 0,
        false_up: 0,
        true_down: 0,
        false_down: 0,
        abstained: 0,
    };

    for row in rows {
        let predicted = model.predict(&row.features())?;
        match (predicted.signum(), row.direction) {
            (1, Direction::Up) => report.true_up += 1,
            (1, Direction::Down) => report.false_up += 1,
            (-1, Direction::Down) => report.true_down += 1,
            (-1, Direction::Up) => report.false_down += 1,
            _ => report.abstained += 1,
        }
    }

    report.hits = report.true_up + report.true_down;
    report.hit_rate = report.hits as f64 / report.samples as f64;
    Ok(report)
}
