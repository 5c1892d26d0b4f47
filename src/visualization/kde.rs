//! Gaussian kernel density estimate used for violin outlines

use crate::utils::sample_std_dev;
use std::f64::consts::PI;

/// One-dimensional Gaussian KDE with Scott's bandwidth rule
#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit on `samples`. Returns `None` when there are no samples or every
    /// sample is identical (the density would be a spike).
    pub fn new(samples: &[f64]) -> Option<Self> {
        let std = sample_std_dev(samples)?;
        if std <= 0.0 || !std.is_finite() {
            return None;
        }
        let n = samples.len() as f64;
        Some(Self {
            samples: samples.to_vec(),
            bandwidth: std * n.powf(-0.2),
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at `x`
    pub fn density(&self, x: f64) -> f64 {
        let norm = self.samples.len() as f64 * self.bandwidth * (2.0 * PI).sqrt();
        self.samples
            .iter()
            .map(|&s| {
                let z = (x - s) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            / norm
    }

    /// Evaluate on `n_points` evenly spaced points covering the samples plus
    /// `cut` bandwidths on either side. Returns `(x, density)` pairs.
    pub fn grid(&self, n_points: usize, cut: f64) -> Vec<(f64, f64)> {
        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min) - cut * self.bandwidth;
        let max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * self.bandwidth;
        let n_points = n_points.max(2);
        let step = (max - min) / (n_points - 1) as f64;

        (0..n_points)
            .map(|i| {
                let x = min + step * i as f64;
                (x, self.density(x))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_samples() {
        assert!(GaussianKde::new(&[]).is_none());
        assert!(GaussianKde::new(&[0.8]).is_none());
        assert!(GaussianKde::new(&[0.75, 0.75, 0.75]).is_none());
    }

    #[test]
    fn test_density_integrates_to_one() {
        let kde = GaussianKde::new(&[0.7, 0.75, 0.8, 0.82, 0.9]).unwrap();
        let grid = kde.grid(2000, 6.0);
        let step = grid[1].0 - grid[0].0;
        let area: f64 = grid.iter().map(|(_, d)| d * step).sum();
        assert!((area - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_density_peaks_near_center() {
        let kde = GaussianKde::new(&[0.7, 0.8, 0.9]).unwrap();
        assert!(kde.density(0.8) > kde.density(0.6));
        assert!(kde.density(0.8) > kde.density(1.0));
    }
}
