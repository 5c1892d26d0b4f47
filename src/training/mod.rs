//! Model training module
//!
//! Provides the estimator seam and everything needed to score estimators:
//! - The [`Estimator`] trait and a majority-class baseline
//! - Logistic regression and decision tree adapters over `linfa`
//! - Pipelines of transformers, an optional resampler and a final estimator
//! - K-fold and stratified k-fold cross-validation
//! - Classification scoring metrics

mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod linear_models;
pub mod metrics;
pub mod pipeline;

pub use models::{DummyClassifier, DummyStrategy, Estimator};
pub use cross_validation::{cross_val_score, CrossValidator, CvConfig, CvSplit, CvStrategy};
pub use decision_tree::DecisionTreeClassifier;
pub use linear_models::LogisticRegressionClassifier;
pub use metrics::{ClassificationMetrics, ConfusionCounts, Scoring};
pub use pipeline::{Pipeline, Resampler, Transformer};
