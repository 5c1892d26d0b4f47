//! Feature scaling implementations

use crate::error::{CompareError, Result};
use crate::training::Transformer;
use crate::utils::{mean, median, quantile, std_dev};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    #[default]
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Robust scaling using median and IQR
    Robust,
    /// Max absolute scaling: x / max(|x|)
    MaxAbs,
    /// No scaling
    None,
}

impl FromStr for ScalerType {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(ScalerType::Standard),
            "minmax" => Ok(ScalerType::MinMax),
            "robust" => Ok(ScalerType::Robust),
            "maxabs" => Ok(ScalerType::MaxAbs),
            "none" => Ok(ScalerType::None),
            other => Err(CompareError::InvalidParameter {
                name: "scaler".to_string(),
                value: other.to_string(),
                reason: "expected standard, minmax, robust, maxabs or none".to_string(),
            }),
        }
    }
}

/// Parameters for a fitted column
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScalerParams {
    center: f64,    // mean, min, or median
    scale: f64,     // std, range, IQR or max |x|
}

/// Column-wise feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn check_fitted(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(CompareError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(CompareError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }

    fn compute_params(&self, values: &[f64]) -> ScalerParams {
        let nonzero = |s: f64| if s == 0.0 || !s.is_finite() { 1.0 } else { s };

        match self.scaler_type {
            ScalerType::Standard => ScalerParams {
                center: mean(values).unwrap_or(0.0),
                scale: nonzero(std_dev(values).unwrap_or(1.0)),
            },
            ScalerType::MinMax => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                ScalerParams {
                    center: if min.is_finite() { min } else { 0.0 },
                    scale: nonzero(max - min),
                }
            }
            ScalerType::Robust => {
                let q1 = quantile(values, 0.25).unwrap_or(0.0);
                let q3 = quantile(values, 0.75).unwrap_or(1.0);
                ScalerParams {
                    center: median(values).unwrap_or(0.0),
                    scale: nonzero(q3 - q1),
                }
            }
            ScalerType::MaxAbs => {
                let max_abs = values.iter().fold(0.0f64, |a, b| a.max(b.abs()));
                ScalerParams {
                    center: 0.0,
                    scale: nonzero(max_abs),
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}

impl Transformer for Scaler {
    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(CompareError::DataError("cannot fit a scaler on zero rows".to_string()));
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|column| {
                let values: Vec<f64> = column.iter().copied().collect();
                self.compute_params(&values)
            })
            .collect();
        self.is_fitted = true;
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_fitted(x)?;
        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(out)
    }

    fn box_clone(&self) -> Box<dyn Transformer> {
        Box::new(self.clone())
    }
}
