//! Scoring metrics for binary classification
//!
//! Labels are class ids stored as `f64`; class `1` is the positive class.

use crate::error::{CompareError, Result};
use crate::utils::class_of;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric used to score a fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    #[default]
    Accuracy,
    Precision,
    Recall,
    F1,
    BalancedAccuracy,
}

impl Scoring {
    /// Short metric name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Scoring::Accuracy => "accuracy",
            Scoring::Precision => "precision",
            Scoring::Recall => "recall",
            Scoring::F1 => "f1",
            Scoring::BalancedAccuracy => "balanced_accuracy",
        }
    }

    /// Closed interval every score of this metric falls in
    pub fn valid_range(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    /// Score predictions against ground truth
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
        let counts = ConfusionCounts::from_labels(y_true, y_pred)?;
        Ok(match self {
            Scoring::Accuracy => counts.accuracy(),
            Scoring::Precision => counts.precision(),
            Scoring::Recall => counts.recall(),
            Scoring::F1 => counts.f1(),
            Scoring::BalancedAccuracy => counts.balanced_accuracy(),
        })
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scoring {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accuracy" => Ok(Scoring::Accuracy),
            "precision" => Ok(Scoring::Precision),
            "recall" => Ok(Scoring::Recall),
            "f1" => Ok(Scoring::F1),
            "balanced_accuracy" => Ok(Scoring::BalancedAccuracy),
            other => Err(CompareError::InvalidParameter {
                name: "scoring".to_string(),
                value: other.to_string(),
                reason: "expected accuracy, precision, recall, f1 or balanced_accuracy".to_string(),
            }),
        }
    }
}

/// Binary confusion counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    /// Count outcomes, treating any class other than `1` as negative
    pub fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(CompareError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(CompareError::ValidationError(
                "cannot score an empty prediction set".to_string(),
            ));
        }

        let mut counts = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (class_of(*t) == 1, class_of(*p) == 1) {
                (true, true) => counts.tp += 1,
                (false, true) => counts.fp += 1,
                (false, false) => counts.tn += 1,
                (true, false) => counts.fn_ += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Mean of per-class recall; a class absent from `y_true` is left out
    pub fn balanced_accuracy(&self) -> f64 {
        let mut recalls = Vec::with_capacity(2);
        if self.tp + self.fn_ > 0 {
            recalls.push(self.recall());
        }
        if self.tn + self.fp > 0 {
            recalls.push(self.specificity());
        }
        crate::utils::mean(&recalls).unwrap_or(0.0)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

/// Full set of test-set metrics for a binary classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub balanced_accuracy: f64,
    pub confusion: ConfusionCounts,
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compute all metrics in one pass over the labels
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        let confusion = ConfusionCounts::from_labels(y_true, y_pred)?;
        Ok(Self {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1_score: confusion.f1(),
            balanced_accuracy: confusion.balanced_accuracy(),
            confusion,
            n_samples: y_true.len(),
        })
    }

    /// Look up the value of one metric
    pub fn get(&self, scoring: Scoring) -> f64 {
        match scoring {
            Scoring::Accuracy => self.accuracy,
            Scoring::Precision => self.precision,
            Scoring::Recall => self.recall,
            Scoring::F1 => self.f1_score,
            Scoring::BalancedAccuracy => self.balanced_accuracy,
        }
    }

    /// Plain-text report
    pub fn report(&self) -> String {
        let c = &self.confusion;
        let mut report = String::new();
        report.push_str(&format!("Samples:           {}\n", self.n_samples));
        report.push_str(&format!("Accuracy:          {:.4}\n", self.accuracy));
        report.push_str(&format!("Precision:         {:.4}\n", self.precision));
        report.push_str(&format!("Recall:            {:.4}\n", self.recall));
        report.push_str(&format!("F1 Score:          {:.4}\n", self.f1_score));
        report.push_str(&format!("Balanced Accuracy: {:.4}\n", self.balanced_accuracy));
        report.push_str("Confusion (rows = truth):\n");
        report.push_str("            pred 0  pred 1\n");
        report.push_str(&format!("  true 0  {:>7} {:>7}\n", c.tn, c.fp));
        report.push_str(&format!("  true 1  {:>7} {:>7}\n", c.fn_, c.tp));
        report
    }
}
