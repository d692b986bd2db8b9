//! Tunable parameters for plane estimation and frame assembly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::selectors::Selectors;

/// Numerical thresholds shared by every stage of frame construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tolerances {
    /// Vectors shorter than this are treated as zero.
    pub degeneracy: f64,
    /// Raw in-plane axes with `|cos|` above this are rejected as colinear.
    pub colinearity: f64,
    /// PCA planes with `λ2/λ3` below this get a weak-separation warning.
    pub separation_ratio: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            degeneracy: 1e-8,
            colinearity: 0.98,
            separation_ratio: 1.3,
        }
    }
}

impl Tolerances {
    /// Create tolerances with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the colinearity rejection threshold.
    #[must_use]
    pub const fn with_colinearity(mut self, cos: f64) -> Self {
        self.colinearity = cos;
        self
    }
}

/// Configuration for the trimmed two-pass PCA plane estimator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaneConfig {
    /// Fewer finite points than this and no plane is estimated.
    pub min_points: usize,
    /// Larger clouds are uniformly subsampled down to this size.
    pub max_points: usize,
    /// Fraction of points closest to the coarse plane kept for the second pass.
    /// Clamped to `[0.2, 0.9]` when used.
    pub trim_fraction: f64,
    /// Lower bound on the number of points kept by trimming.
    pub min_retained: usize,
    /// Optional seed for reproducible subsampling.
    pub seed: Option<u64>,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            min_points: 50,
            max_points: 6000,
            trim_fraction: 0.5,
            min_retained: 100,
            seed: None,
        }
    }
}

impl PlaneConfig {
    /// Smallest accepted trim fraction.
    pub const MIN_TRIM_FRACTION: f64 = 0.2;
    /// Largest accepted trim fraction.
    pub const MAX_TRIM_FRACTION: f64 = 0.9;

    /// Create a plane configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subsampling cap.
    #[must_use]
    pub const fn with_max_points(mut self, n: usize) -> Self {
        self.max_points = n;
        self
    }

    /// Set the trim fraction.
    #[must_use]
    pub const fn with_trim_fraction(mut self, fraction: f64) -> Self {
        self.trim_fraction = fraction;
        self
    }

    /// Set the minimum number of points kept after trimming.
    #[must_use]
    pub const fn with_min_retained(mut self, n: usize) -> Self {
        self.min_retained = n;
        self
    }

    /// Set a random seed for reproducibility.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Trim fraction clamped to its accepted range. NaN falls back to the default.
    #[must_use]
    pub fn effective_trim_fraction(&self) -> f64 {
        if self.trim_fraction.is_nan() {
            return Self::default().trim_fraction;
        }
        self.trim_fraction
            .clamp(Self::MIN_TRIM_FRACTION, Self::MAX_TRIM_FRACTION)
    }
}

/// Everything the frame builder can be tuned with.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    /// Plane estimator settings.
    pub plane: PlaneConfig,
    /// Shared numerical thresholds.
    pub tolerances: Tolerances,
    /// Landmark candidate lists.
    pub selectors: Selectors,
}

impl FrameConfig {
    /// Create a frame configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the plane estimator settings.
    #[must_use]
    pub fn with_plane(mut self, plane: PlaneConfig) -> Self {
        self.plane = plane;
        self
    }

    /// Replace the numerical thresholds.
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Set the subsampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.plane.seed = Some(seed);
        self
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FrameConfig::default();
        assert_eq!(c.plane.min_points, 50);
        assert_eq!(c.plane.max_points, 6000);
        assert_eq!(c.plane.min_retained, 100);
        assert_eq!(c.plane.seed, None);
        assert_eq!(c.tolerances.degeneracy, 1e-8);
        assert_eq!(c.tolerances.colinearity, 0.98);
        assert_eq!(c.tolerances.separation_ratio, 1.3);
    }

    #[test]
    fn trim_fraction_is_clamped() {
        let effective = |f: f64| {
            PlaneConfig::new()
                .with_trim_fraction(f)
                .effective_trim_fraction()
        };
        assert_eq!(effective(0.05), 0.2);
        assert_eq!(effective(0.99), 0.9);
        assert_eq!(effective(0.6), 0.6);
        assert_eq!(effective(f64::NAN), 0.5);
    }

    #[test]
    fn builders_chain() {
        let c = FrameConfig::new()
            .with_plane(PlaneConfig::new().with_max_points(800))
            .with_seed(7)
            .with_tolerances(Tolerances::new().with_colinearity(0.9));
        assert_eq!(c.plane.seed, Some(7));
        assert_eq!(c.plane.max_points, 800);
        assert_eq!(c.tolerances.colinearity, 0.9);
    }
}
