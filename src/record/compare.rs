//! Ranking of cross-validated records

use super::ModelRecord;
use crate::training::Scoring;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of a model comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    /// Position of the record in the ranked slice; names need not be unique
    pub index: usize,
    pub name: String,
    pub scoring: Scoring,
    pub mean: f64,
    pub std: f64,
}

/// Computed records ordered by mean score, best first. Pending records are
/// left out. Ties keep input order.
pub fn rank<E>(records: &[ModelRecord<'_, E>]) -> Vec<RankedModel> {
    let mut ranked: Vec<RankedModel> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            record.results().map(|results| RankedModel {
                index,
                name: record.name().to_string(),
                scoring: results.scoring(),
                mean: results.mean(),
                std: results.std(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(Ordering::Equal));
    ranked
}

/// Aligned text table of [`rank`]
pub fn comparison_table<E>(records: &[ModelRecord<'_, E>]) -> String {
    let ranked = rank(records);
    let name_width = ranked
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("Model".len());
    let metric = ranked
        .first()
        .map(|r| r.scoring.name())
        .unwrap_or(Scoring::default().name());

    let mut table = format!(
        "{:<4} {:<width$} {:>10} {:>10}\n",
        "Rank",
        "Model",
        metric,
        "std",
        width = name_width
    );
    for (i, row) in ranked.iter().enumerate() {
        table.push_str(&format!(
            "{:<4} {:<width$} {:>10.5} {:>10.5}\n",
            i + 1,
            row.name,
            row.mean,
            row.std,
            width = name_width
        ));
    }
    table
}
