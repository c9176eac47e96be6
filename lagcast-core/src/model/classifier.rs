//! The classifier contract: fit on lag features, predict a direction sign.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrategyError};

/// The two lag predictors, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub lag1: f64,
    pub lag2: f64,
}

impl FeatureVector {
    pub fn new(lag1: f64, lag2: f64) -> Self {
        Self { lag1, lag2 }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lag1, self.lag2]
    }

    pub fn is_finite(&self) -> bool {
        self.lag1.is_finite() && self.lag2.is_finite()
    }
}

/// Training label: direction of a period's return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` for strictly positive returns, `Down` otherwise.
    pub fn from_return(ret: f64) -> Self {
        if ret > 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// +1 for `Up`, -1 for `Down`.
    pub fn sign(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// A binary classifier over [`FeatureVector`]s.
///
/// `predict` returns the predicted label's sign. A correctly fitted model
/// only ever returns +1 or -1; callers treat any other value by its sign,
/// with 0 meaning "no opinion".
pub trait Classifier: Send + Sync {
    /// Human-readable name (e.g., "qda").
    fn name(&self) -> &str;

    /// Fit on parallel feature and label slices. Fitting again replaces the
    /// previous fit.
    fn fit(&mut self, features: &[FeatureVector], labels: &[Direction]) -> Result<()>;

    /// Predict the sign of the next period's return.
    fn predict(&self, features: &FeatureVector) -> Result<i8>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[Direction]) -> Result<()> {
        (**self).fit(features, labels)
    }

    fn predict(&self, features: &FeatureVector) -> Result<i8> {
        (**self).predict(features)
    }
}

/// Reject training sets no binary classifier can learn from: empty, ragged,
/// non-finite, or carrying a single class.
pub fn validate_training_set(features: &[FeatureVector], labels: &[Direction]) -> Result<()> {
    if features.is_empty() {
        return Err(StrategyError::Training("training set is empty".into()));
    }
    if features.len() != labels.len() {
        return Err(StrategyError::Training(format!(
            "{} feature rows but {} labels",
            features.len(),
            labels.len()
        )));
    }
    if let Some(i) = features.iter().position(|x| !x.is_finite()) {
        return Err(StrategyError::Training(format!(
            "non-finite feature at training row {i}"
        )));
    }
    let ups = labels.iter().filter(|&&l| l == Direction::Up).count();
    if ups == 0 || ups == labels.len() {
        return Err(StrategyError::Training(format!(
            "labels are degenerate: all {} rows are {:?}",
            labels.len(),
            labels[0]
        )));
    }
    Ok(())
}
