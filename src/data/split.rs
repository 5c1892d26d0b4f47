//! Train/test splitting

use super::TabularData;
use crate::error::{CompareError, Result};
use crate::utils::class_of;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::info;

/// Shuffle and split into `(train, test)`.
///
/// With `stratify`, each class contributes `round(n_class * test_ratio)`
/// rows to the test set while always keeping at least one training row.
pub fn train_test_split(
    data: &TabularData,
    test_ratio: f64,
    stratify: bool,
    seed: u64,
) -> Result<(TabularData, TabularData)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(CompareError::InvalidParameter {
            name: "test_ratio".to_string(),
            value: test_ratio.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    if stratify {
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in data.labels().iter().enumerate() {
            class_indices.entry(class_of(label)).or_default().push(i);
        }

        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
            let class_test = ((indices.len() as f64) * test_ratio).round() as usize;
            let class_test = class_test.min(indices.len().saturating_sub(1));
            let split_point = indices.len() - class_test;
            train_indices.extend_from_slice(&indices[..split_point]);
            test_indices.extend_from_slice(&indices[split_point..]);
        }
    } else {
        let n = data.n_samples();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let n_test = ((n as f64) * test_ratio).round() as usize;
        let n_test = n_test.clamp(1, n.saturating_sub(1).max(1));
        let split_point = n.saturating_sub(n_test);
        train_indices.extend_from_slice(&indices[..split_point]);
        test_indices.extend_from_slice(&indices[split_point..]);
    }

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(CompareError::DataError(
            "Split resulted in empty train or test set".to_string(),
        ));
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    info!(
        train = train_indices.len(),
        test = test_indices.len(),
        stratify,
        "Split data"
    );
    Ok((data.subset(&train_indices), data.subset(&test_indices)))
}
