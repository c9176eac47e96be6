//! One-time model construction from historical lagged returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::lagged::MIN_LAGS;
use crate::data::{build_lagged_series, select_features, BarSource, TrainingDataset};
use crate::error::{Result, StrategyError};
use crate::model::{Classifier, FeatureVector};

/// What to train on: symbol, history window, train/test cutoff and lag depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub symbol: String,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    /// Rows dated before this train the model; the rest are held out.
    pub test_cutoff: NaiveDate,
    pub lag_count: usize,
}

impl ModelSpec {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(StrategyError::Configuration("symbol is empty".into()));
        }
        if self.lag_count < MIN_LAGS {
            return Err(StrategyError::Configuration(format!(
                "lag count must be at least {MIN_LAGS}, got {}",
                self.lag_count
            )));
        }
        if self.train_start > self.train_end {
            return Err(StrategyError::Configuration(format!(
                "train start {} is after train end {}",
                self.train_start, self.train_end
            )));
        }
        if self.test_cutoff <= self.train_start || self.test_cutoff > self.train_end {
            return Err(StrategyError::Configuration(format!(
                "test cutoff {} must fall after {} and on or before {}",
                self.test_cutoff, self.train_start, self.train_end
            )));
        }
        Ok(())
    }
}

/// A fitted classifier plus the provenance of its fit. Immutable.
#[derive(Debug, Clone)]
pub struct TrainedModel<C> {
    classifier: C,
    symbol: String,
    train_rows: usize,
    test_rows: usize,
    dataset_hash: Option<String>,
}

impl<C: Classifier> TrainedModel<C> {
    /// Wrap a classifier that was fitted elsewhere.
    pub fn pretrained(symbol: impl Into<String>, classifier: C) -> Self {
        Self {
            classifier,
            symbol: symbol.into(),
            train_rows: 0,
            test_rows: 0,
            dataset_hash: None,
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<i8> {
        self.classifier.predict(features)
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn train_rows(&self) -> usize {
        self.train_rows
    }

    pub fn test_rows(&self) -> usize {
        self.test_rows
    }

    /// BLAKE3 fingerprint of the dataset the model was fitted on.
    pub fn dataset_hash(&self) -> Option<&str> {
        self.dataset_hash.as_deref()
    }
}

/// Validate the spec and build the full lagged table for its window.
pub fn prepare_dataset(source: &dyn BarSource, spec: &ModelSpec) -> Result<TrainingDataset> {
    spec.validate()?;
    build_lagged_series(
        source,
        &spec.symbol,
        spec.train_start,
        spec.train_end,
        spec.lag_count,
    )
}

/// Fit `classifier` on the rows of `dataset` dated before `test_cutoff`.
pub fn fit_model<C: Classifier>(
    dataset: &TrainingDataset,
    test_cutoff: NaiveDate,
    mut classifier: C,
) -> Result<TrainedModel<C>> {
    let (train, test) = dataset.split(test_cutoff);
    if train.is_empty() {
        return Err(StrategyError::Training(format!(
            "no training rows for '{}' before {test_cutoff}",
            dataset.symbol()
        )));
    }

    let (x_train, y_train) = select_features(train);
    classifier.fit(&x_train, &y_train)?;

    let dataset_hash = dataset.fingerprint();
    info!(
        symbol = dataset.symbol(),
        model = classifier.name(),
        train_rows = train.len(),
        test_rows = test.len(),
        dataset = &dataset_hash[..12],
        "model trained"
    );

    Ok(TrainedModel {
        classifier,
        symbol: dataset.symbol().to_string(),
        train_rows: train.len(),
        test_rows: test.len(),
        dataset_hash: Some(dataset_hash),
    })
}

/// Build the lagged table and fit the classifier on its training partition.
pub fn build_model<C: Classifier>(
    source: &dyn BarSource,
    spec: &ModelSpec,
    classifier: C,
) -> Result<TrainedModel<C>> {
    let dataset = prepare_dataset(source, spec)?;
    fit_model(&dataset, spec.test_cutoff, classifier)
}
