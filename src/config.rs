//! Comparison run configuration
//!
//! A [`CompareConfig`] describes one comparison: where the data lives, how
//! its columns are used, how folds are built and scored, and which candidate
//! models take part. It round-trips through JSON.

use crate::data::ColumnPlan;
use crate::error::{CompareError, Result};
use crate::preprocessing::{Scaler, ScalerType};
use crate::training::{
    CvConfig, CvStrategy, DecisionTreeClassifier, DummyClassifier, Estimator,
    LogisticRegressionClassifier, Pipeline, Scoring,
};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A candidate model and its hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Majority-class baseline
    Dummy,
    LogisticRegression {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_max_iterations")]
        max_iterations: u64,
    },
    DecisionTree {
        #[serde(default)]
        max_depth: Option<usize>,
    },
}

fn default_alpha() -> f64 {
    1.0
}

fn default_max_iterations() -> u64 {
    100
}

impl ModelSpec {
    /// Display name used for records, tables and plot files
    pub fn display_name(&self) -> String {
        match self {
            ModelSpec::Dummy => "Dummy".to_string(),
            ModelSpec::LogisticRegression { alpha, max_iterations } if *max_iterations == default_max_iterations() => {
                format!("LogisticRegression(alpha={})", alpha)
            }
            ModelSpec::LogisticRegression { alpha, max_iterations } => {
                format!("LogisticRegression(alpha={}, max_iter={})", alpha, max_iterations)
            }
            ModelSpec::DecisionTree { max_depth: Some(d) } => format!("DecisionTree(depth={})", d),
            ModelSpec::DecisionTree { max_depth: None } => "DecisionTree".to_string(),
        }
    }

    /// Unfitted estimator with these hyperparameters
    pub fn build(&self) -> CandidateModel {
        match self {
            ModelSpec::Dummy => CandidateModel::Dummy(DummyClassifier::most_frequent()),
            ModelSpec::LogisticRegression { alpha, max_iterations } => CandidateModel::Logistic(
                LogisticRegressionClassifier::new()
                    .with_alpha(*alpha)
                    .with_max_iterations(*max_iterations),
            ),
            ModelSpec::DecisionTree { max_depth } => {
                CandidateModel::Tree(DecisionTreeClassifier::new().with_max_depth(*max_depth))
            }
        }
    }

    /// Estimator wrapped in a pipeline, with a scaling step in front when
    /// `scaler` is not [`ScalerType::None`]
    pub fn build_pipeline(&self, scaler: ScalerType) -> Pipeline<CandidateModel> {
        let pipeline = Pipeline::new(self.build());
        match scaler {
            ScalerType::None => pipeline,
            other => pipeline.with_step("scaler", Scaler::new(other)),
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Any of the built-in estimators, as one cloneable type
#[derive(Debug, Clone)]
pub enum CandidateModel {
    Dummy(DummyClassifier),
    Logistic(LogisticRegressionClassifier),
    Tree(DecisionTreeClassifier),
}

impl Estimator for CandidateModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            CandidateModel::Dummy(m) => m.fit(x, y),
            CandidateModel::Logistic(m) => m.fit(x, y),
            CandidateModel::Tree(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            CandidateModel::Dummy(m) => m.predict(x),
            CandidateModel::Logistic(m) => m.predict(x),
            CandidateModel::Tree(m) => m.predict(x),
        }
    }
}

/// Full description of a comparison run. Fields missing from a JSON file
/// take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Input table (CSV, JSON or Parquet)
    pub data: PathBuf,

    /// Label column
    pub target: String,

    /// Explicit numeric columns; inferred from dtypes when both lists are empty
    pub numeric: Vec<String>,

    pub categorical: Vec<String>,

    /// Columns never used as features
    pub drop: Vec<String>,

    pub cv: CvConfig,

    pub folds: usize,

    /// Share of rows held out for the final test evaluation
    pub test_ratio: f64,

    pub seed: u64,

    pub scaler: ScalerType,

    pub models: Vec<ModelSpec>,

    /// Directory for one SVG plot per model
    pub plot_dir: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::new(),
            target: String::new(),
            numeric: Vec::new(),
            categorical: Vec::new(),
            drop: Vec::new(),
            cv: CvConfig::default(),
            folds: crate::record::DEFAULT_FOLDS,
            test_ratio: 0.2,
            seed: 42,
            scaler: ScalerType::Standard,
            models: vec![
                ModelSpec::Dummy,
                ModelSpec::LogisticRegression {
                    alpha: default_alpha(),
                    max_iterations: default_max_iterations(),
                },
                ModelSpec::DecisionTree { max_depth: Some(5) },
            ],
            plot_dir: None,
        }
    }
}

impl CompareConfig {
    pub fn new(data: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_test_ratio(mut self, test_ratio: f64) -> Self {
        self.test_ratio = test_ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.cv.scoring = scoring;
        self
    }

    pub fn with_strategy(mut self, strategy: CvStrategy) -> Self {
        self.cv.strategy = strategy;
        self
    }

    pub fn with_scaler(mut self, scaler: ScalerType) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelSpec>) -> Self {
        self.models = models;
        self
    }

    pub fn with_columns(mut self, numeric: Vec<String>, categorical: Vec<String>) -> Self {
        self.numeric = numeric;
        self.categorical = categorical;
        self
    }

    pub fn with_drop(mut self, drop: Vec<String>) -> Self {
        self.drop = drop;
        self
    }

    pub fn with_plot_dir(mut self, plot_dir: impl Into<PathBuf>) -> Self {
        self.plot_dir = Some(plot_dir.into());
        self
    }

    /// Check the settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(CompareError::ConfigError("target column is not set".to_string()));
        }
        if self.folds < 2 {
            return Err(CompareError::ConfigError(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(CompareError::ConfigError(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.models.is_empty() {
            return Err(CompareError::ConfigError("no models to compare".to_string()));
        }
        for model in &self.models {
            if let ModelSpec::LogisticRegression { alpha, .. } = model {
                if *alpha < 0.0 {
                    return Err(CompareError::ConfigError(format!(
                        "alpha must be non-negative, got {}",
                        alpha
                    )));
                }
            }
        }
        Ok(())
    }

    /// Column plan for `df`: the explicit lists when given, dtype inference
    /// otherwise
    pub fn column_plan(&self, df: &DataFrame) -> Result<ColumnPlan> {
        if self.numeric.is_empty() && self.categorical.is_empty() {
            ColumnPlan::infer(df, &self.target, &self.drop)
        } else {
            Ok(ColumnPlan::new(&self.target)
                .with_numeric(&self.numeric[..])
                .with_categorical(&self.categorical[..])
                .with_drop(&self.drop[..]))
        }
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parse a configuration file without validating it, so that callers
    /// can still override values
    pub fn read(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }
}
