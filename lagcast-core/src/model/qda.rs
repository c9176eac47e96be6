//! Quadratic discriminant analysis over the two lag features.
//!
//! Each class gets its own Gaussian (mean, full 2x2 covariance, prior). A
//! point is assigned to the class with the larger log-posterior:
//!
//! `δ_k(x) = -½ ln|Σ_k| - ½ (x - μ_k)ᵀ Σ_k⁻¹ (x - μ_k) + ln π_k`
//!
//! Optional shrinkage `reg_param` blends each covariance toward the identity,
//! `Σ ← (1 - r) Σ + r I`, which keeps nearly collinear classes invertible.

use crate::error::{Result, StrategyError};

use super::classifier::{validate_training_set, Classifier, Direction, FeatureVector};

const SINGULAR_EPS: f64 = 1e-12;

/// Symmetric 2x2 covariance matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cov2 {
    xx: f64,
    xy: f64,
    yy: f64,
}

impl Cov2 {
    fn det(&self) -> f64 {
        self.xx * self.yy - self.xy * self.xy
    }

    /// Squared Mahalanobis distance of offset `d`.
    fn mahalanobis(&self, d: [f64; 2]) -> f64 {
        (self.yy * d[0] * d[0] - 2.0 * self.xy * d[0] * d[1] + self.xx * d[1] * d[1]) / self.det()
    }

    fn shrink(self, r: f64) -> Self {
        Self {
            xx: (1.0 - r) * self.xx + r,
            xy: (1.0 - r) * self.xy,
            yy: (1.0 - r) * self.yy + r,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClassStats {
    label: Direction,
    mean: [f64; 2],
    cov: Cov2,
    log_det: f64,
    log_prior: f64,
}

impl ClassStats {
    fn fit(label: Direction, points: &[[f64; 2]], total: usize, reg_param: f64) -> Result<Self> {
        let n = points.len();
        if n < 2 {
            return Err(StrategyError::Training(format!(
                "class {label:?} has {n} sample(s); at least 2 are needed for a covariance"
            )));
        }
        let nf = n as f64;
        let mean = [
            points.iter().map(|p| p[0]).sum::<f64>() / nf,
            points.iter().map(|p| p[1]).sum::<f64>() / nf,
        ];

        let (mut xx, mut xy, mut yy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p[0] - mean[0];
            let dy = p[1] - mean[1];
            xx += dx * dx;
            xy += dx * dy;
            yy += dy * dy;
        }
        let denom = nf - 1.0;
        let cov = Cov2 {
            xx: xx / denom,
            xy: xy / denom,
            yy: yy / denom,
        }
        .shrink(reg_param);

        let det = cov.det();
        if !(det > SINGULAR_EPS) {
            return Err(StrategyError::Training(format!(
                "covariance of class {label:?} is singular (det = {det:e}); use reg_param > 0"
            )));
        }

        Ok(Self {
            label,
            mean,
            cov,
            log_det: det.ln(),
            log_prior: (nf / total as f64).ln(),
        })
    }

    fn discriminant(&self, x: [f64; 2]) -> f64 {
        let d = [x[0] - self.mean[0], x[1] - self.mean[1]];
        -0.5 * self.log_det - 0.5 * self.cov.mahalanobis(d) + self.log_prior
    }
}

/// Quadratic discriminant analysis classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticDiscriminant {
    reg_param: f64,
    /// `[down, up]` once fitted.
    classes: Option<[ClassStats; 2]>,
}

impl Default for QuadraticDiscriminant {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl QuadraticDiscriminant {
    pub fn new(reg_param: f64) -> Self {
        Self {
            reg_param,
            classes: None,
        }
    }

    pub fn reg_param(&self) -> f64 {
        self.reg_param
    }

    pub fn is_fitted(&self) -> bool {
        self.classes.is_some()
    }

    /// Fitted class means as `(down, up)`.
    pub fn means(&self) -> Option<([f64; 2], [f64; 2])> {
        self.classes.map(|[down, up]| (down.mean, up.mean))
    }
}

impl Classifier for QuadraticDiscriminant {
    fn name(&self) -> &str {
        "qda"
    }

    fn fit(&mut self, features: &[FeatureVector], labels: &[Direction]) -> Result<()> {
        if !(0.0..=1.0).contains(&self.reg_param) {
            return Err(StrategyError::Configuration(format!(
                "reg_param must be within [0, 1], got {}",
                self.reg_param
            )));
        }
        validate_training_set(features, labels)?;

        let points_for = |label: Direction| -> Vec<[f64; 2]> {
            features
                .iter()
                .zip(labels)
                .filter(|(_, l)| **l == label)
                .map(|(x, _)| x.as_array())
                .collect()
        };
        let total = labels.len();
        let down = ClassStats::fit(Direction::Down, &points_for(Direction::Down), total, self.reg_param)?;
        let up = ClassStats::fit(Direction::Up, &points_for(Direction::Up), total, self.reg_param)?;

        self.classes = Some([down, up]);
        Ok(())
    }

    fn predict(&self, features: &FeatureVector) -> Result<i8> {
        let [down, up] = self
            .classes
            .ok_or_else(|| StrategyError::Prediction("qda model has not been fitted".into()))?;
        if !features.is_finite() {
            return Err(StrategyError::Prediction(format!(
                "non-finite features {features:?}"
            )));
        }
        let x = features.as_array();
        // Ties go to the first class (down).
        let label = if up.discriminant(x) > down.discriminant(x) {
            up.label
        } else {
            down.label
        };
        Ok(label.sign())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(a: f64, b: f64) -> FeatureVector {
        FeatureVector::new(a, b)
    }

    fn clusters() -> (Vec<FeatureVector>, Vec<Direction>) {
        let up = [(1.0, 1.0), (1.2, 0.9), (0.8, 1.1), (1.1, 1.2), (0.9, 0.8)];
        let x: Vec<FeatureVector> = up
            .iter()
            .map(|&(a, b)| fv(a, b))
            .chain(up.iter().map(|&(a, b)| fv(-a, -b)))
            .collect();
        let y = [vec![Direction::Up; 5], vec![Direction::Down; 5]].concat();
        (x, y)
    }

    #[test]
    fn separates_two_clusters() {
        let (x, y) = clusters();
        let mut qda = QuadraticDiscriminant::default();
        qda.fit(&x, &y).unwrap();
        assert_eq!(qda.predict(&fv(1.0, 1.0)).unwrap(), 1);
        assert_eq!(qda.predict(&fv(-1.0, -1.0)).unwrap(), -1);
        let (down, up) = qda.means().unwrap();
        assert!((up[0] - 1.0).abs() < 1e-9);
        assert!((down[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn learns_a_quadratic_boundary() {
        // Same mean, different spread: only the covariance separates them.
        let x = vec![
            fv(0.1, 0.0),
            fv(-0.1, 0.0),
            fv(0.0, 0.1),
            fv(0.0, -0.1),
            fv(3.0, 0.0),
            fv(-3.0, 0.0),
            fv(0.0, 3.0),
            fv(0.0, -3.0),
        ];
        let y = [vec![Direction::Up; 4], vec![Direction::Down; 4]].concat();
        let mut qda = QuadraticDiscriminant::default();
        qda.fit(&x, &y).unwrap();
        assert_eq!(qda.predict(&fv(0.0, 0.0)).unwrap(), 1);
        assert_eq!(qda.predict(&fv(2.0, 2.0)).unwrap(), -1);
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let qda = QuadraticDiscriminant::default();
        assert!(!qda.is_fitted());
        let err = qda.predict(&fv(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, StrategyError::Prediction(_)));
    }

    #[test]
    fn collinear_class_needs_regularisation() {
        let x = vec![
            fv(1.0, 1.0),
            fv(2.0, 2.0),
            fv(3.0, 3.0),
            fv(-1.0, 0.5),
            fv(-2.0, -1.5),
            fv(-0.5, -2.0),
        ];
        let y = [vec![Direction::Up; 3], vec![Direction::Down; 3]].concat();

        let err = QuadraticDiscriminant::new(0.0).fit(&x, &y).unwrap_err();
        assert!(err.to_string().contains("singular"));

        let mut regularised = QuadraticDiscriminant::new(0.1);
        regularised.fit(&x, &y).unwrap();
        assert_eq!(regularised.predict(&fv(2.5, 2.5)).unwrap(), 1);
    }

    #[test]
    fn lonely_class_is_a_training_error() {
        let x = vec![fv(1.0, 1.0), fv(2.0, 0.5), fv(0.5, 2.0), fv(-1.0, -1.0)];
        let y = vec![Direction::Up, Direction::Up, Direction::Up, Direction::Down];
        let err = QuadraticDiscriminant::default().fit(&x, &y).unwrap_err();
        assert!(matches!(err, StrategyError::Training(_)));
    }

    #[test]
    fn reg_param_out_of_range() {
        let (x, y) = clusters();
        let err = QuadraticDiscriminant::new(1.5).fit(&x, &y).unwrap_err();
        assert!(matches!(err, StrategyError::Configuration(_)));
    }

    #[test]
    fn nan_features_are_rejected_at_predict_time() {
        let (x, y) = clusters();
        let mut qda = QuadraticDiscriminant::default();
        qda.fit(&x, &y).unwrap();
        assert!(qda.predict(&fv(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn refitting_is_deterministic() {
        let (x, y) = clusters();
        let mut a = QuadraticDiscriminant::default();
        let mut b = QuadraticDiscriminant::default();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }
}
