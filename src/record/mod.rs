//! Cross-validated model records
//!
//! A [`ModelRecord`] pairs one candidate estimator with a display name and
//! borrowed training data, and keeps the outcome of its latest
//! cross-validation run. Records are built unevaluated; evaluation is an
//! explicit [`ModelRecord::cross_validate`] call (or the
//! [`ModelRecord::evaluated`] shortcut).

mod compare;

pub use compare::{comparison_table, rank, RankedModel};

use crate::error::{CompareError, Result};
use crate::training::{cross_val_score, CvConfig, Estimator, Scoring};
use crate::utils::{mean, median, std_dev};
use crate::visualization::PlotSurface;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Fold count used when none is given
pub const DEFAULT_FOLDS: usize = 10;

/// Data a cross-validation run should use
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'d> {
    /// The features and labels the record was created with
    Own,
    /// Caller-supplied features and labels
    Given {
        features: &'d Array2<f64>,
        labels: &'d Array1<f64>,
    },
}

/// Per-fold scores and their summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvResults {
    scores: Vec<f64>,
    mean: f64,
    median: f64,
    std: f64,
    scoring: Scoring,
}

impl CvResults {
    /// Summarize a complete set of fold scores
    pub fn from_scores(scores: Vec<f64>, scoring: Scoring) -> Result<Self> {
        let (lo, hi) = scoring.valid_range();
        if let Some(bad) = scores.iter().find(|s| !(lo..=hi).contains(*s)) {
            return Err(CompareError::ValidationError(format!(
                "{} score {} outside [{}, {}]",
                scoring, bad, lo, hi
            )));
        }

        let empty = || CompareError::ValidationError("no fold scores".to_string());
        Ok(Self {
            mean: mean(&scores).ok_or_else(empty)?,
            median: median(&scores).ok_or_else(empty)?,
            std: std_dev(&scores).ok_or_else(empty)?,
            scores,
            scoring,
        })
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn n_folds(&self) -> usize {
        self.scores.len()
    }
}

/// Whether a record has been cross-validated
#[derive(Debug, Clone, PartialEq)]
pub enum CvState {
    Pending,
    Computed(CvResults),
}

/// One candidate estimator and its cross-validated performance
#[derive(Debug, Clone)]
pub struct ModelRecord<'a, E> {
    estimator: E,
    name: String,
    features: &'a Array2<f64>,
    labels: &'a Array1<f64>,
    cv_config: CvConfig,
    state: CvState,
}

impl<'a, E> ModelRecord<'a, E>
where
    E: Estimator + Clone,
{
    /// Build an unevaluated record
    pub fn new(
        estimator: E,
        name: impl Into<String>,
        features: &'a Array2<f64>,
        labels: &'a Array1<f64>,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(CompareError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }

        Ok(Self {
            estimator,
            name: name.into(),
            features,
            labels,
            cv_config: CvConfig::default(),
            state: CvState::Pending,
        })
    }

    /// Build a record and cross-validate it on its own data with
    /// [`DEFAULT_FOLDS`] folds
    pub fn evaluated(
        estimator: E,
        name: impl Into<String>,
        features: &'a Array2<f64>,
        labels: &'a Array1<f64>,
    ) -> Result<Self> {
        let mut record = Self::new(estimator, name, features, labels)?;
        record.cross_validate(DataSource::Own, DEFAULT_FOLDS)?;
        Ok(record)
    }

    /// Use a different split strategy, seed or scoring metric
    pub fn with_cv_config(mut self, cv_config: CvConfig) -> Self {
        self.cv_config = cv_config;
        self
    }

    /// Run k-fold cross-validation and replace the stored results.
    ///
    /// On failure the previous results are kept.
    pub fn cross_validate(&mut self, source: DataSource<'_>, n_splits: usize) -> Result<&CvResults> {
        let (x, y) = match source {
            DataSource::Own => (self.features, self.labels),
            DataSource::Given { features, labels } => (features, labels),
        };

        let start = Instant::now();
        let scores = cross_val_score(&self.estimator, x, y, n_splits, &self.cv_config)?;
        let results = CvResults::from_scores(scores, self.cv_config.scoring)?;

        info!(
            model = %self.name,
            folds = results.n_folds(),
            scoring = %results.scoring(),
            mean = results.mean(),
            std = results.std(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cross-validated model"
        );

        self.state = CvState::Computed(results);
        self.require_results()
    }

    /// One-line report of the mean score and its spread
    pub fn summary(&self) -> Result<String> {
        let results = self.require_results()?;
        Ok(format!(
            "{}: {} {:.5} (+/- {:.5})",
            self.name,
            results.scoring(),
            results.mean(),
            results.std()
        ))
    }

    /// Draw the fold-score distribution as a violin with a swarm overlay
    pub fn plot<'s, S: PlotSurface>(&self, surface: &'s mut S) -> Result<&'s mut S> {
        let results = self.require_results()?;
        surface.set_title(&format!("{} cross-validation {}", self.name, results.scoring()));
        surface.violin(&self.name, results.scores())?;
        surface.swarm(&self.name, results.scores())?;
        Ok(surface)
    }

    fn require_results(&self) -> Result<&CvResults> {
        self.results()
            .ok_or_else(|| CompareError::NotCrossValidated(self.name.clone()))
    }
}

impl<'a, E> ModelRecord<'a, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn cv_config(&self) -> &CvConfig {
        &self.cv_config
    }

    pub fn state(&self) -> &CvState {
        &self.state
    }

    /// Results of the latest successful run
    pub fn results(&self) -> Option<&CvResults> {
        match &self.state {
            CvState::Computed(results) => Some(results),
            CvState::Pending => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.state, CvState::Computed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::DummyClassifier;
    use crate::visualization::SvgSurface;

    fn imbalanced() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| (i * (j + 1)) as f64);
        let mut labels = vec![0.0; 15];
        labels.extend(vec![1.0; 5]);
        (x, Array1::from_vec(labels))
    }

    #[test]
    fn test_new_record_is_pending() {
        let (x, y) = imbalanced();
        let record = ModelRecord::new(DummyClassifier::most_frequent(), "baseline", &x, &y).unwrap();

        assert!(!record.is_computed());
        assert!(record.results().is_none());
        assert_eq!(record.state(), &CvState::Pending);
    }

    #[test]
    fn test_summary_requires_results() {
        let (x, y) = imbalanced();
        let record = ModelRecord::new(DummyClassifier::most_frequent(), "baseline", &x, &y).unwrap();

        let err = record.summary().unwrap_err();
        assert!(matches!(err, CompareError::NotCrossValidated(ref name) if name == "baseline"));

        let mut surface = SvgSurface::default();
        assert!(record.plot(&mut surface).is_err());
        assert_eq!(surface.layer_count(), 0);
    }

    #[test]
    fn test_cross_validate_majority_baseline() {
        let (x, y) = imbalanced();
        let mut record = ModelRecord::new(DummyClassifier::most_frequent(), "baseline", &x, &y).unwrap();

        let results = record.cross_validate(DataSource::Own, 5).unwrap();
        assert_eq!(results.n_folds(), 5);
        assert!(results.scores().iter().all(|s| (s - 0.75).abs() < 1e-12));
        assert!((results.mean() - 0.75).abs() < 1e-12);
        assert!((results.median() - 0.75).abs() < 1e-12);
        assert!(results.std().abs() < 1e-12);

        assert_eq!(record.summary().unwrap(), "baseline: accuracy 0.75000 (+/- 0.00000)");
    }

    #[test]
    fn test_failed_run_keeps_previous_results() {
        let (x, y) = imbalanced();
        let mut record = ModelRecord::new(DummyClassifier::most_frequent(), "baseline", &x, &y).unwrap();
        record.cross_validate(DataSource::Own, 5).unwrap();

        assert!(record.cross_validate(DataSource::Own, 1).is_err());
        assert_eq!(record.results().unwrap().n_folds(), 5);
    }

    #[test]
    fn test_mismatched_lengths() {
        let (x, _) = imbalanced();
        let y = Array1::zeros(19);
        assert!(matches!(
            ModelRecord::new(DummyClassifier::most_frequent(), "baseline", &x, &y),
            Err(CompareError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_results_reject_out_of_range_scores() {
        assert!(CvResults::from_scores(vec![0.5, 1.2], Scoring::Accuracy).is_err());
        assert!(CvResults::from_scores(vec![], Scoring::Accuracy).is_err());
    }
}
