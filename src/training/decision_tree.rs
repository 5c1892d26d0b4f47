//! Decision tree classifier backed by `linfa-trees`

use super::models::{check_xy, class_ids, Estimator};
use crate::error::{CompareError, Result};
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Gini decision tree for class labels
#[derive(Clone)]
pub struct DecisionTreeClassifier {
    max_depth: Option<usize>,
    min_weight_split: f32,
    min_weight_leaf: f32,
    fitted: Option<Arc<DecisionTree<f64, usize>>>,
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_weight_split: 2.0,
            min_weight_leaf: 1.0,
            fitted: None,
        }
    }

    /// Limit the depth of the tree (`None` grows until leaves are pure)
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Minimum total sample weight a leaf must keep
    pub fn with_min_weight_leaf(mut self, min_weight_leaf: f32) -> Self {
        self.min_weight_leaf = min_weight_leaf;
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

impl fmt::Debug for DecisionTreeClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionTreeClassifier")
            .field("max_depth", &self.max_depth)
            .field("min_weight_split", &self.min_weight_split)
            .field("min_weight_leaf", &self.min_weight_leaf)
            .field("fitted", &self.fitted.is_some())
            .finish()
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;
        if self.max_depth == Some(0) {
            return Err(CompareError::InvalidParameter {
                name: "max_depth".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let dataset = Dataset::new(x.clone(), class_ids(y)?);
        let tree = DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.max_depth)
            .min_weight_split(self.min_weight_split)
            .min_weight_leaf(self.min_weight_leaf)
            .fit(&dataset)
            .map_err(|e| CompareError::TrainingError(format!("decision tree: {}", e)))?;

        debug!(
            n_samples = x.nrows(),
            depth = tree.max_depth(),
            leaves = tree.num_leaves(),
            "Fitted decision tree"
        );
        self.fitted = Some(Arc::new(tree));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let tree = self.fitted.as_ref().ok_or(CompareError::ModelNotFitted)?;
        let predicted: Array1<usize> = tree.predict(x);
        Ok(predicted.mapv(|c| c as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_predict_threshold() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [6.0], [7.0], [8.0], [9.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTreeClassifier::new().with_max_depth(Some(3));
        tree.fit(&x, &y).unwrap();

        assert!(tree.is_fitted());
        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.predict(&array![[0.5], [10.0]]).unwrap(), array![0.0, 1.0]);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 1.0];
        let mut tree = DecisionTreeClassifier::new().with_max_depth(Some(0));
        assert!(tree.fit(&x, &y).is_err());
    }

    #[test]
    fn test_negative_label_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![-1.0, 1.0];
        let mut tree = DecisionTreeClassifier::new();
        assert!(matches!(
            tree.fit(&x, &y),
            Err(CompareError::InvalidParameter { .. })
        ));
    }
}
