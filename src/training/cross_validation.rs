//! Cross-validation splitting and scoring

use super::metrics::Scoring;
use super::models::Estimator;
use crate::error::{CompareError, Result};
use crate::utils::{class_of, select_labels, select_rows};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Cross-validation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvStrategy {
    /// Contiguous (optionally shuffled) folds
    KFold,
    /// Folds that keep each class's share of the samples
    #[default]
    StratifiedKFold,
}

/// How folds are built and scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvConfig {
    pub strategy: CvStrategy,
    pub shuffle: bool,
    pub random_state: Option<u64>,
    pub scoring: Scoring,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            strategy: CvStrategy::StratifiedKFold,
            shuffle: false,
            random_state: None,
            scoring: Scoring::Accuracy,
        }
    }
}

impl CvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: CvStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shuffle before splitting, seeded for reproducibility
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.random_state = Some(seed);
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }
}

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
pub struct CrossValidator {
    strategy: CvStrategy,
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl CrossValidator {
    /// Create a new cross-validator
    pub fn new(strategy: CvStrategy, n_splits: usize) -> Self {
        Self {
            strategy,
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Build a splitter from a [`CvConfig`]
    pub fn from_config(config: &CvConfig, n_splits: usize) -> Self {
        Self {
            strategy: config.strategy,
            n_splits,
            shuffle: config.shuffle,
            random_state: config.random_state,
        }
    }

    /// Shuffle samples before assigning folds
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate train/test splits. Stratification needs `y`.
    pub fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> Result<Vec<CvSplit>> {
        if self.n_splits < 2 {
            return Err(CompareError::ValidationError(
                "n_splits must be at least 2".to_string()
            ));
        }
        if n_samples < self.n_splits {
            return Err(CompareError::ValidationError(
                format!("n_samples ({}) must be >= n_splits ({})", n_samples, self.n_splits)
            ));
        }

        match self.strategy {
            CvStrategy::KFold => Ok(self.k_fold_split(n_samples)),
            CvStrategy::StratifiedKFold => {
                let y = y.ok_or_else(|| CompareError::ValidationError(
                    "StratifiedKFold requires target array".to_string()
                ))?;
                if y.len() != n_samples {
                    return Err(CompareError::ShapeError {
                        expected: format!("{} labels", n_samples),
                        actual: format!("{} labels", y.len()),
                    });
                }
                Ok(self.stratified_k_fold_split(y))
            }
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn k_fold_split(&self, n_samples: usize) -> Vec<CvSplit> {
        let n_splits = self.n_splits;
        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            indices.shuffle(&mut self.rng());
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CvSplit {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        splits
    }

    fn stratified_k_fold_split(&self, y: &Array1<f64>) -> Vec<CvSplit> {
        let n_splits = self.n_splits;

        // Group samples by class, in ascending class order
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(class_of(val)).or_default().push(idx);
        }

        if self.shuffle {
            let mut rng = self.rng();
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        if let Some((class, indices)) = class_indices.iter().min_by_key(|(_, v)| v.len()) {
            if indices.len() < n_splits {
                warn!(
                    class = *class,
                    members = indices.len(),
                    n_splits,
                    "Least populated class has fewer members than n_splits"
                );
            }
        }

        // Deal samples class by class, continuing the deal position across classes
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
        let mut position = 0;
        for indices in class_indices.values() {
            for &idx in indices {
                folds[position % n_splits].push(idx);
                position += 1;
            }
        }
        for fold in &mut folds {
            fold.sort_unstable();
        }

        (0..n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let mut train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                train_indices.sort_unstable();

                CvSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect()
    }
}

/// Score an estimator on every fold.
///
/// A fresh clone of `estimator` is fitted per fold, so the caller's copy is
/// never modified. Returns one score per fold, in fold order.
pub fn cross_val_score<E>(
    estimator: &E,
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_splits: usize,
    config: &CvConfig,
) -> Result<Vec<f64>>
where
    E: Estimator + Clone,
{
    if x.nrows() != y.len() {
        return Err(CompareError::ShapeError {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }

    let splits = CrossValidator::from_config(config, n_splits).split(x.nrows(), Some(y))?;
    let mut scores = Vec::with_capacity(splits.len());

    for split in &splits {
        let x_train = select_rows(x, &split.train_indices);
        let y_train = select_labels(y, &split.train_indices);
        let x_test = select_rows(x, &split.test_indices);
        let y_test = select_labels(y, &split.test_indices);

        let mut model = estimator.clone();
        model.fit(&x_train, &y_train)?;
        let y_pred = model.predict(&x_test)?;
        let score = config.scoring.score(&y_test, &y_pred)?;

        debug!(
            fold = split.fold_idx,
            train = split.train_indices.len(),
            test = split.test_indices.len(),
            score,
            "Scored fold"
        );
        scores.push(score);
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::DummyClassifier;

    #[test]
    fn test_k_fold() {
        let cv = CrossValidator::new(CvStrategy::KFold, 5);
        let splits = cv.split(100, None).unwrap();

        assert_eq!(splits.len(), 5);

        // Each test set should have 20 samples
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        // All indices should be covered exactly once in test sets
        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_uneven() {
        let cv = CrossValidator::new(CvStrategy::KFold, 3);
        let sizes: Vec<usize> = cv.split(10, None).unwrap().iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_stratified_k_fold() {
        let mut labels = vec![0.0; 15];
        labels.extend(vec![1.0; 5]);
        let y = Array1::from_vec(labels);

        let cv = CrossValidator::new(CvStrategy::StratifiedKFold, 5);
        let splits = cv.split(20, Some(&y)).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            let positives = split.test_indices.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(split.test_indices.len(), 4);
            assert_eq!(positives, 1);
        }
    }

    #[test]
    fn test_stratified_small_class_keeps_folds_non_empty() {
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let cv = CrossValidator::new(CvStrategy::StratifiedKFold, 5);
        let splits = cv.split(7, Some(&y)).unwrap();
        assert!(splits.iter().all(|s| !s.test_indices.is_empty()));
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let a = CrossValidator::new(CvStrategy::KFold, 4).with_shuffle(true).with_random_state(7);
        let b = CrossValidator::new(CvStrategy::KFold, 4).with_shuffle(true).with_random_state(7);
        let sa = a.split(40, None).unwrap();
        let sb = b.split(40, None).unwrap();
        for (x, y) in sa.iter().zip(sb.iter()) {
            assert_eq!(x.test_indices, y.test_indices);
        }
    }

    #[test]
    fn test_invalid_split_counts() {
        assert!(CrossValidator::new(CvStrategy::KFold, 1).split(10, None).is_err());
        assert!(CrossValidator::new(CvStrategy::KFold, 11).split(10, None).is_err());
        assert!(CrossValidator::new(CvStrategy::StratifiedKFold, 2).split(10, None).is_err());
    }

    #[test]
    fn test_cross_val_score_majority_baseline() {
        let x = Array2::zeros((20, 2));
        let mut labels = vec![0.0; 15];
        labels.extend(vec![1.0; 5]);
        let y = Array1::from_vec(labels);

        let scores = cross_val_score(&DummyClassifier::most_frequent(), &x, &y, 5, &CvConfig::default()).unwrap();

        assert_eq!(scores.len(), 5);
        for score in scores {
            assert!((score - 0.75).abs() < 1e-12);
        }
    }
}
