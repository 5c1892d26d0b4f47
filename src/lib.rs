//! Kolosal Compare - cross-validated model comparison
//!
//! This crate wraps candidate classifiers in [`record::ModelRecord`]s,
//! scores them with k-fold cross-validation and reports the spread of the
//! fold scores as text and as violin/swarm plots.
//!
//! # Modules
//!
//! ## Core
//! - [`record`] - Model records, cross-validation results and ranking
//! - [`training`] - Estimators, pipelines, fold splitting and scoring
//! - [`visualization`] - Plot surfaces and SVG rendering
//!
//! ## Data
//! - [`data`] - Loading, column preparation and train/test splitting
//! - [`preprocessing`] - Feature scaling
//!
//! ## Runtime
//! - [`config`] - Comparison run configuration
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use kolosal_compare::prelude::*;
//! use ndarray::{Array1, Array2};
//!
//! # fn main() -> kolosal_compare::Result<()> {
//! let x = Array2::<f64>::zeros((20, 2));
//! let y = Array1::from_vec((0..20).map(|i| (i % 4 == 0) as u8 as f64).collect());
//!
//! let record = ModelRecord::evaluated(DummyClassifier::most_frequent(), "baseline", &x, &y)?;
//! println!("{}", record.summary()?);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Core modules
pub mod record;
pub mod training;
pub mod visualization;

// Data processing
pub mod data;
pub mod preprocessing;

// Runtime
pub mod config;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{CompareError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CompareError, Result};

    // Records
    pub use crate::record::{
        comparison_table, rank, CvResults, CvState, DataSource, ModelRecord, RankedModel, DEFAULT_FOLDS,
    };

    // Training
    pub use crate::training::{
        cross_val_score, ClassificationMetrics, CrossValidator, CvConfig, CvStrategy, DecisionTreeClassifier,
        DummyClassifier, DummyStrategy, Estimator, LogisticRegressionClassifier, Pipeline, Resampler, Scoring,
        Transformer,
    };

    // Data
    pub use crate::data::{load_frame, prepare, train_test_split, ColumnPlan, TabularData};
    pub use crate::preprocessing::{Scaler, ScalerType};

    // Plotting
    pub use crate::visualization::{PlotSurface, SvgSurface};

    // Configuration
    pub use crate::config::{CandidateModel, CompareConfig, ModelSpec};
}
