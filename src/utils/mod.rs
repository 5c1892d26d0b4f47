//! Utility functions and types

pub mod stats;

pub use stats::{mean, median, quantile, sample_std_dev, std_dev};

use ndarray::{Array1, Array2};

/// Gather the given rows of a feature matrix into a new owned matrix
pub fn select_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let n_cols = x.ncols();
    Array2::from_shape_fn((indices.len(), n_cols), |(i, j)| x[[indices[i], j]])
}

/// Gather the given entries of a label vector
pub fn select_labels(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| y[i]))
}

/// Class id of a float label
pub(crate) fn class_of(label: f64) -> i64 {
    label.round() as i64
}
