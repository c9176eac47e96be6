//! Binary direction classifiers.
//!
//! The strategy only depends on the [`Classifier`] trait; any model that can
//! `fit` on lag features and `predict` a sign is a valid substitute.

pub mod classifier;
pub mod evaluate;
pub mod logistic;
pub mod qda;

pub use classifier::{validate_training_set, Classifier, Direction, FeatureVector};
pub use evaluate::{evaluate, EvaluationReport};
pub use logistic::LogisticRegression;
pub use qda::QuadraticDiscriminant;

use serde::{Deserialize, Serialize};

/// Serializable classifier selection, as it appears in run configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Quadratic discriminant analysis.
    Qda {
        #[serde(default)]
        reg_param: f64,
    },
    /// Logistic regression fitted by gradient descent.
    Logistic {
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_max_iter")]
        max_iter: usize,
        #[serde(default)]
        l2: f64,
    },
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_max_iter() -> usize {
    2000
}

impl Default for ClassifierKind {
    fn default() -> Self {
        Self::Qda { reg_param: 0.0 }
    }
}

impl ClassifierKind {
    /// Unfitted classifier of this kind.
    pub fn build(&self) -> Box<dyn Classifier> {
        match *self {
            Self::Qda { reg_param } => Box::new(QuadraticDiscriminant::new(reg_param)),
            Self::Logistic {
                learning_rate,
                max_iter,
                l2,
            } => Box::new(LogisticRegression::new(learning_rate, max_iter, 1e-9, l2)),
        }
    }
}
