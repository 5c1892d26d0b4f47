//! Tabular data loading and preparation
//!
//! Loads CSV, JSON or Parquet into a polars `DataFrame`, then turns a mixed
//! numeric/categorical frame into a dense feature matrix. Missing numeric
//! values are filled with the column mean and categorical columns are
//! expanded into dummy columns; both operations are delegated to polars.

mod split;

pub use split::train_test_split;

use crate::error::{CompareError, Result};
use crate::utils::{class_of, select_labels, select_rows};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Features and labels ready for estimators
#[derive(Debug, Clone)]
pub struct TabularData {
    features: Array2<f64>,
    labels: Array1<f64>,
    feature_names: Vec<String>,
}

impl TabularData {
    /// Bundle features and labels, checking that they line up
    pub fn new(features: Array2<f64>, labels: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(CompareError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(CompareError::ShapeError {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of samples per class
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &label in self.labels.iter() {
            *counts.entry(class_of(label)).or_insert(0) += 1;
        }
        counts
    }

    /// Rows at the given indices, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: select_rows(&self.features, indices),
            labels: select_labels(&self.labels, indices),
            feature_names: self.feature_names.clone(),
        }
    }
}

/// Which columns feed the model and how
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlan {
    pub target: String,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    #[serde(default)]
    pub drop: Vec<String>,
}

impl ColumnPlan {
    /// Plan with explicit column lists
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_numeric<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.numeric = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn with_categorical<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.categorical = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn with_drop<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.drop = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Classify every non-target, non-dropped column by dtype
    pub fn infer(df: &DataFrame, target: &str, drop: &[String]) -> Result<Self> {
        if df.column(target).is_err() {
            return Err(CompareError::FeatureNotFound(target.to_string()));
        }

        let mut plan = Self::new(target);
        plan.drop = drop.to_vec();

        for col in df.get_columns() {
            let name = col.name().to_string();
            if name == target || drop.contains(&name) {
                continue;
            }

            match col.dtype() {
                DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
                DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
                DataType::Float32 | DataType::Float64 | DataType::Boolean => {
                    plan.numeric.push(name);
                }
                DataType::String | DataType::Categorical(_, _) => {
                    plan.categorical.push(name);
                }
                other => {
                    debug!(column = %name, dtype = ?other, "Skipping column with unsupported dtype");
                }
            }
        }

        Ok(plan)
    }
}

/// Read a CSV, JSON or Parquet file based on its extension
pub fn load_frame(path: &Path) -> Result<DataFrame> {
    let start = Instant::now();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let df = match ext {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "json" => JsonReader::new(File::open(path)?).finish()?,
        "parquet" => ParquetReader::new(File::open(path)?).finish()?,
        _ => {
            return Err(CompareError::DataError(format!(
                "Unsupported file format: '{}'",
                path.display()
            )))
        }
    };

    info!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded data"
    );
    Ok(df)
}

/// Turn a frame into features and labels following `plan`
pub fn prepare(df: &DataFrame, plan: &ColumnPlan) -> Result<TabularData> {
    let labels = extract_target(df, &plan.target)?;

    let mut feature_names: Vec<String> = Vec::new();
    let mut col_data: Vec<Vec<f64>> = Vec::new();

    for name in &plan.numeric {
        let column = df
            .column(name)
            .map_err(|_| CompareError::FeatureNotFound(name.clone()))?;
        let filled = column
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .fill_null(FillNullStrategy::Mean)?;
        // A column with no values at all stays null after mean filling
        let values: Vec<f64> = filled.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();

        feature_names.push(name.clone());
        col_data.push(values);
    }

    if !plan.categorical.is_empty() {
        for name in &plan.categorical {
            if df.column(name).is_err() {
                return Err(CompareError::FeatureNotFound(name.clone()));
            }
        }
        let categorical = df.select(plan.categorical.iter().map(|s| s.as_str()))?;
        let dummies = categorical.to_dummies(Some("_"), false)?;

        for column in dummies.get_columns() {
            let values: Vec<f64> = column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            feature_names.push(column.name().to_string());
            col_data.push(values);
        }
    }

    let n_rows = df.height();
    let n_cols = col_data.len();
    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    let features = Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]);

    info!(
        rows = n_rows,
        numeric = plan.numeric.len(),
        categorical = plan.categorical.len(),
        features = n_cols,
        "Prepared feature matrix"
    );
    TabularData::new(features, labels, feature_names)
}

fn extract_target(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let column = df
        .column(target)
        .map_err(|_| CompareError::FeatureNotFound(target.to_string()))?;
    if column.null_count() > 0 {
        return Err(CompareError::DataError(format!(
            "target column '{}' has {} missing values",
            target,
            column.null_count()
        )));
    }

    let values = column
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                CompareError::DataError(format!("target column '{}' is not numeric", target))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Array1::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passengers() -> DataFrame {
        df!(
            "Survived" => &[0i32, 1, 1, 0, 1, 0],
            "Age" => &[Some(22.0), None, Some(26.0), Some(35.0), None, Some(54.0)],
            "Fare" => &[7.25, 71.28, 7.92, 8.05, 53.1, 51.86],
            "Sex" => &["male", "female", "female", "male", "female", "male"],
            "Ticket" => &["A/5", "PC", "STON", "373450", "113803", "17463"]
        )
        .unwrap()
    }

    #[test]
    fn test_infer_plan() {
        let df = passengers();
        let plan = ColumnPlan::infer(&df, "Survived", &["Ticket".to_string()]).unwrap();

        assert_eq!(plan.numeric, vec!["Age".to_string(), "Fare".to_string()]);
        assert_eq!(plan.categorical, vec!["Sex".to_string()]);
    }

    #[test]
    fn test_infer_missing_target() {
        let df = passengers();
        assert!(matches!(
            ColumnPlan::infer(&df, "Pclass", &[]),
            Err(CompareError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_prepare_fills_and_encodes() {
        let df = passengers();
        let plan = ColumnPlan::new("Survived")
            .with_numeric(&["Age", "Fare"])
            .with_categorical(&["Sex"]);

        let data = prepare(&df, &plan).unwrap();

        assert_eq!(data.n_samples(), 6);
        assert_eq!(data.n_features(), 4);
        assert!(data.feature_names().contains(&"Sex_male".to_string()));
        assert!(data.feature_names().contains(&"Sex_female".to_string()));

        // Missing ages become the mean of the known ones
        let known_mean = (22.0 + 26.0 + 35.0 + 54.0) / 4.0;
        assert!((data.features()[[1, 0]] - known_mean).abs() < 1e-9);
        assert_eq!(data.labels()[1], 1.0);
    }

    #[test]
    fn test_prepare_missing_column() {
        let df = passengers();
        let plan = ColumnPlan::new("Survived").with_numeric(&["Pclass"]);
        assert!(matches!(prepare(&df, &plan), Err(CompareError::FeatureNotFound(_))));
    }

    #[test]
    fn test_null_target_rejected() {
        let df = df!(
            "y" => &[Some(1.0), None],
            "x" => &[1.0, 2.0]
        )
        .unwrap();
        let plan = ColumnPlan::new("y").with_numeric(&["x"]);
        assert!(matches!(prepare(&df, &plan), Err(CompareError::DataError(_))));
    }

    #[test]
    fn test_tabular_data_shape_check() {
        let err = TabularData::new(Array2::zeros((3, 1)), Array1::zeros(2), vec!["x".to_string()]).unwrap_err();
        assert!(matches!(err, CompareError::ShapeError { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            load_frame(Path::new("passengers.xlsx")),
            Err(CompareError::DataError(_))
        ));
    }
}
