//! Estimator pipelines
//!
//! A [`Pipeline`] chains fitted transformers, an optional resampler and a
//! final estimator, and behaves as a single [`Estimator`]. Resampling runs
//! only while fitting, so validation and test rows are never resampled.

use super::models::{check_xy, Estimator};
use crate::error::Result;
use ndarray::{Array1, Array2};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A fitted feature transformation
pub trait Transformer {
    /// Learn parameters from training rows
    fn fit(&mut self, x: &Array2<f64>) -> Result<()>;

    /// Apply the learned transformation
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Clone into a box, so pipelines holding trait objects stay cloneable
    fn box_clone(&self) -> Box<dyn Transformer>;
}

impl Clone for Box<dyn Transformer> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Training-set resampling such as minority oversampling.
///
/// Implementations come from the caller; the pipeline only decides when to
/// apply them.
pub trait Resampler {
    fn fit_resample(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array2<f64>, Array1<f64>)>;
}

/// Ordered transformers followed by a final estimator
#[derive(Clone)]
pub struct Pipeline<E> {
    steps: Vec<(String, Box<dyn Transformer>)>,
    resampler: Option<(String, Arc<dyn Resampler>)>,
    estimator: E,
}

impl<E: Estimator> Pipeline<E> {
    /// Pipeline with no transformation steps
    pub fn new(estimator: E) -> Self {
        Self {
            steps: Vec::new(),
            resampler: None,
            estimator,
        }
    }

    /// Append a named transformation step
    pub fn with_step<T>(mut self, name: impl Into<String>, step: T) -> Self
    where
        T: Transformer + 'static,
    {
        self.steps.push((name.into(), Box::new(step)));
        self
    }

    /// Resample the transformed training data before the estimator is fitted
    pub fn with_resampler<R>(mut self, name: impl Into<String>, resampler: R) -> Self
    where
        R: Resampler + 'static,
    {
        self.resampler = Some((name.into(), Arc::new(resampler)));
        self
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.steps.iter().map(|(n, _)| n.as_str()).collect();
        if let Some((name, _)) = &self.resampler {
            names.push(name);
        }
        names
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    fn apply_steps(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut current = x.clone();
        for (_, step) in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

impl<E: Estimator> Estimator for Pipeline<E> {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_xy(x, y)?;

        let mut current = x.clone();
        for (name, step) in &mut self.steps {
            current = step.fit_transform(&current)?;
            debug!(step = %name, n_features = current.ncols(), "Fitted pipeline step");
        }

        match &self.resampler {
            Some((name, resampler)) => {
                let (x_res, y_res) = resampler.fit_resample(&current, y)?;
                check_xy(&x_res, &y_res)?;
                debug!(step = %name, before = y.len(), after = y_res.len(), "Resampled training data");
                self.estimator.fit(&x_res, &y_res)
            }
            None => self.estimator.fit(&current, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let transformed = self.apply_steps(x)?;
        self.estimator.predict(&transformed)
    }
}

impl<E: fmt::Debug> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<&str> = self.steps.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Pipeline")
            .field("steps", &steps)
            .field("resampler", &self.resampler.as_ref().map(|(n, _)| n.as_str()))
            .field("estimator", &self.estimator)
            .finish()
    }
}
