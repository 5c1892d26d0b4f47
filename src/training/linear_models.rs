//! Logistic regression backed by `linfa-logistic`

use super::models::{check_xy, class_ids, Estimator};
use crate::error::{CompareError, Result};
use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Binary logistic regression with an L2 penalty
#[derive(Clone)]
pub struct LogisticRegressionClassifier {
    alpha: f64,
    max_iterations: u64,
    fit_intercept: bool,
    fitted: Option<Arc<FittedLogisticRegression<f64, usize>>>,
}

impl LogisticRegressionClassifier {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 100,
            fit_intercept: true,
            fitted: None,
        }
    }

    /// Set the L2 penalty strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

impl fmt::Debug for LogisticRegressionClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogisticRegressionClassifier")
            .field("alpha", &self.alpha)
            .field("max_iterations", &self.max_iterations)
            .field("fit_intercept", &self.fit_intercept)
            .field("fitted", &self.fitted.is_some())
            .finish()
    }
}

impl Default for LogisticRegressionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        if self.alpha < 0.0 {
            return Err(CompareError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }

        let dataset = Dataset::new(x.clone(), class_ids(y)?);
        let model = LogisticRegression::default()
            .alpha(self.alpha)
            .max_iterations(self.max_iterations)
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| CompareError::TrainingError(format!("logistic regression: {}", e)))?;

        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            alpha = self.alpha,
            "Fitted logistic regression"
        );
        self.fitted = Some(Arc::new(model));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.fitted.as_ref().ok_or(CompareError::ModelNotFitted)?;
        let predicted: Array1<usize> = model.predict(x);
        Ok(predicted.mapv(|c| c as f64))
    }
}
