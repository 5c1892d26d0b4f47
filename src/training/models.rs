//! Estimator trait and baseline classifier

use super::metrics::Scoring;
use crate::error::{CompareError, Result};
use crate::utils::class_of;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that can be fitted on a feature matrix and then predict labels
pub trait Estimator {
    /// Fit the estimator to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict a label for every row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Accuracy of `predict(x)` against `y`
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        Scoring::Accuracy.score(y, &y_pred)
    }
}

impl<E: Estimator + ?Sized> Estimator for Box<E> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        (**self).predict(x)
    }

    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        (**self).score(x, y)
    }
}

/// Check that features and labels describe the same rows
pub(crate) fn check_xy(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(CompareError::ShapeError {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(CompareError::DataError("cannot fit on zero samples".to_string()));
    }
    Ok(())
}

/// Convert float labels into the non-negative class ids linfa expects
pub(crate) fn class_ids(y: &Array1<f64>) -> Result<Array1<usize>> {
    y.iter()
        .map(|&v| {
            let class = class_of(v);
            usize::try_from(class).map_err(|_| CompareError::InvalidParameter {
                name: "label".to_string(),
                value: v.to_string(),
                reason: "class labels must be non-negative integers".to_string(),
            })
        })
        .collect::<Result<Vec<usize>>>()
        .map(Array1::from_vec)
}

/// Prediction rule of a [`DummyClassifier`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DummyStrategy {
    /// Always predict the most frequent training label (ties go to the smallest)
    MostFrequent,
    /// Always predict the given label
    Constant(f64),
}

/// Baseline classifier that ignores the features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyClassifier {
    strategy: DummyStrategy,
    prediction: Option<f64>,
}

impl DummyClassifier {
    pub fn new(strategy: DummyStrategy) -> Self {
        Self {
            strategy,
            prediction: None,
        }
    }

    pub fn most_frequent() -> Self {
        Self::new(DummyStrategy::MostFrequent)
    }

    pub fn strategy(&self) -> DummyStrategy {
        self.strategy
    }
}

impl Default for DummyClassifier {
    fn default() -> Self {
        Self::most_frequent()
    }
}

impl Estimator for DummyClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;

        let label = match self.strategy {
            DummyStrategy::Constant(label) => label,
            DummyStrategy::MostFrequent => {
                let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
                for &v in y.iter() {
                    *counts.entry(class_of(v)).or_insert(0) += 1;
                }
                // BTreeMap iterates ascending, so the first maximum is the smallest class
                let mut best = (0_i64, 0_usize);
                for (&class, &count) in &counts {
                    if count > best.1 {
                        best = (class, count);
                    }
                }
                best.0 as f64
            }
        };

        self.prediction = Some(label);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let label = self.prediction.ok_or(CompareError::ModelNotFitted)?;
        Ok(Array1::from_elem(x.nrows(), label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_most_frequent() {
        let x = Array2::zeros((5, 2));
        let y = array![1.0, 0.0, 1.0, 1.0, 0.0];

        let mut model = DummyClassifier::most_frequent();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), array![1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!((model.score(&x, &y).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_smallest_class() {
        let x = Array2::zeros((4, 1));
        let y = array![1.0, 0.0, 1.0, 0.0];

        let mut model = DummyClassifier::most_frequent();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap()[0], 0.0);
    }

    #[test]
    fn test_constant() {
        let x = Array2::zeros((3, 1));
        let mut model = DummyClassifier::new(DummyStrategy::Constant(1.0));
        model.fit(&x, &array![0.0, 0.0, 0.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), array![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = DummyClassifier::default();
        let err = model.predict(&Array2::zeros((2, 1))).unwrap_err();
        assert!(matches!(err, CompareError::ModelNotFitted));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut model = DummyClassifier::default();
        let err = model.fit(&Array2::zeros((3, 1)), &array![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, CompareError::ShapeError { .. }));
    }

    #[test]
    fn test_boxed_estimator() {
        let x = Array2::zeros((3, 1));
        let mut model: Box<dyn Estimator> = Box::new(DummyClassifier::most_frequent());
        model.fit(&x, &array![0.0, 0.0, 1.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), array![0.0, 0.0, 0.0]);
    }
}
