//! Logistic regression for direction prediction.
//!
//! Full-batch gradient descent on the binary cross-entropy, optionally with an
//! L2 penalty on the weights (not the intercept). Weights start at zero, so
//! fitting is deterministic.

use crate::error::{Result, StrategyError};

use super::classifier::{validate_training_set, Classifier, Direction, FeatureVector};

/// Logistic regression classifier over the two lag features.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    l2: f64,
    /// `(weights, intercept)` once fitted.
    params: Option<([f64; 2], f64)>,
    /// Log loss after each iteration of the last fit.
    pub cost_history: Vec<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.05, 2000, 1e-9, 0.0)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize, tolerance: f64, l2: f64) -> Self {
        Self {
            learning_rate,
            max_iter,
            tolerance,
            l2,
            params: None,
            cost_history: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// Fitted `(weights, intercept)`.
    pub fn coefficients(&self) -> Option<([f64; 2], f64)> {
        self.params
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    fn log_loss(probs: &[f64], targets: &[f64]) -> f64 {
        let eps = 1e-15;
        -probs
            .iter()
            .zip(targets)
            .map(|(&p, &y)| {
                let p = p.clamp(eps, 1.0 - eps);
                y * p.ln() + (1.0 - y) * (1.0 - p).ln()
            })
            .sum::<f64>()
            / probs.len() as f64
    }

    /// Probability that the next period is up.
    pub fn probability_up(&self, features: &FeatureVector) -> Result<f64> {
        let (w, b) = self.params.ok_or_else(|| {
            StrategyError::Prediction("logistic regression has not been fitted".into())
        })?;
        if !features.is_finite() {
            return Err(StrategyError::Prediction(format!(
                "non-finite features {features:?}"
            )));
        }
        let x = features.as_array();
        Ok(Self::sigmoid(w[0] * x[0] + w[1] * x[1] + b))
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[Direction]) -> Result<()> {
        if !(self.learning_rate > 0.0) || self.max_iter == 0 || self.l2 < 0.0 {
            return Err(StrategyError::Configuration(format!(
                "invalid logistic regression parameters: learning_rate={}, max_iter={}, l2={}",
                self.learning_rate, self.max_iter, self.l2
            )));
        }
        validate_training_set(features, labels)?;

        let xs: Vec<[f64; 2]> = features.iter().map(FeatureVector::as_array).collect();
        let ys: Vec<f64> = labels
            .iter()
            .map(|l| if *l == Direction::Up { 1.0 } else { 0.0 })
            .collect();
        let n = xs.len() as f64;

        let mut w = [0.0_f64; 2];
        let mut b = 0.0_f64;
        self.cost_history.clear();

        for _ in 0..self.max_iter {
            let probs: Vec<f64> = xs
                .iter()
                .map(|x| Self::sigmoid(w[0] * x[0] + w[1] * x[1] + b))
                .collect();

            let mut dw = [0.0_f64; 2];
            let mut db = 0.0_f64;
            for ((x, p), y) in xs.iter().zip(&probs).zip(&ys) {
                let err = p - y;
                dw[0] += err * x[0];
                dw[1] += err * x[1];
                db += err;
            }
            dw[0] = dw[0] / n + self.l2 * w[0];
            dw[1] = dw[1] / n + self.l2 * w[1];
            db /= n;

            w[0] -= self.learning_rate * dw[0];
            w[1] -= self.learning_rate * dw[1];
            b -= self.learning_rate * db;

            self.cost_history.push(Self::log_loss(&probs, &ys));

            let step = dw[0].abs().max(dw[1].abs()).max(db.abs());
            if step < self.tolerance {
                break;
            }
        }

        self.params = Some((w, b));
        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> Result<i8> {
        let p = self.probability_up(features)?;
        Ok(if p >= 0.5 { 1 } else { -1 })
    }
}
