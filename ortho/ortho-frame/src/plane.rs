//! Occlusal plane estimation from a dental scan point cloud.
//!
//! Two-pass trimmed PCA: a coarse plane from all (subsampled) points, then
//! a refined plane from the points closest to it. Trimming discards gingiva,
//! palate and cusp tips that pull a plain least-squares fit off the occlusal
//! surface.

use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ortho_types::{Frame, Quality};

use crate::config::{PlaneConfig, Tolerances};
use crate::error::{BuildResult, FrameError};
use crate::orthogonalize::orthogonalize;
use crate::pca::{pca_from_points, PcaResult};

/// Point counts seen by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaneStats {
    /// Points kept for the refined fit.
    pub n_in: usize,
    /// Points entering the coarse fit (after subsampling).
    pub n_all: usize,
}

/// A plane estimated from geometry.
#[derive(Debug, Clone)]
pub struct PlaneEstimate {
    /// Origin at the trimmed centroid; `ez` is the plane normal and `ex`,
    /// `ey` follow the two in-plane principal axes. Polarity is arbitrary.
    pub frame: Frame,
    /// Always [`Quality::Ok`] for a returned estimate.
    pub quality: Quality,
    /// Advisory messages, e.g. weak plane separation.
    pub warnings: Vec<String>,
    /// Point counts.
    pub stats: PlaneStats,
    /// Eigenvalues of the refined fit, descending.
    pub eigenvalues: [f64; 3],
}

/// Estimate the occlusal plane, seeding the sampler from `config.seed`.
///
/// Without a seed the thread-local RNG is used and subsampled results may
/// vary between calls on clouds larger than `config.max_points`.
///
/// # Errors
///
/// - [`FrameError::InsufficientPointCloud`] with fewer than
///   `config.min_points` finite points
/// - [`FrameError::DegenerateGeometry`] if the points do not span a plane
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use ortho_frame::{estimate_plane, PlaneConfig, Tolerances};
///
/// let mut cloud = Vec::new();
/// for i in 0..12 {
///     for j in 0..8 {
///         let (x, y) = (f64::from(i) * 2.0, f64::from(j) * 3.0);
///         cloud.push(Point3::new(x, y, 0.05 * (x * 0.7 + y).sin()));
///     }
/// }
/// let est = estimate_plane(&cloud, &PlaneConfig::new().with_seed(1), &Tolerances::default());
/// assert!(est.is_ok_and(|e| e.frame.ez.z.abs() > 0.99));
/// ```
pub fn estimate_plane(
    points: &[Point3<f64>],
    config: &PlaneConfig,
    tolerances: &Tolerances,
) -> BuildResult<PlaneEstimate> {
    if let Some(seed) = config.seed {
        estimate_plane_with_rng(points, config, tolerances, &mut StdRng::seed_from_u64(seed))
    } else {
        estimate_plane_with_rng(points, config, tolerances, &mut rand::thread_rng())
    }
}

/// Estimate the occlusal plane using the given random source for subsampling.
///
/// `config.seed` is ignored.
///
/// # Errors
///
/// Same as [`estimate_plane`].
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
// Precision loss / truncation: floor of a non-negative fraction of a point count
pub fn estimate_plane_with_rng<R: Rng + ?Sized>(
    points: &[Point3<f64>],
    config: &PlaneConfig,
    tolerances: &Tolerances,
    rng: &mut R,
) -> BuildResult<PlaneEstimate> {
    let finite: Vec<Point3<f64>> = points
        .iter()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .copied()
        .collect();

    if finite.len() < config.min_points {
        return Err(FrameError::InsufficientPointCloud {
            required: config.min_points,
            actual: finite.len(),
        });
    }

    let sample = if finite.len() > config.max_points {
        debug!(
            from = finite.len(),
            to = config.max_points,
            "Subsampling point cloud"
        );
        index::sample(rng, finite.len(), config.max_points)
            .into_iter()
            .map(|i| finite[i])
            .collect()
    } else {
        finite
    };
    let n_all = sample.len();

    let coarse = pca_from_points(&sample)
        .ok_or_else(|| FrameError::degenerate("coarse PCA needs at least 3 points"))?;
    let coarse_normal = coarse
        .plane_normal()
        .try_normalize(tolerances.degeneracy)
        .ok_or_else(|| FrameError::degenerate("coarse plane normal vanished"))?;

    let mut by_distance: Vec<(f64, Point3<f64>)> = sample
        .iter()
        .map(|p| ((p - coarse.centroid).dot(&coarse_normal).abs(), *p))
        .collect();
    by_distance.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let keep = ((n_all as f64 * config.effective_trim_fraction()).floor() as usize)
        .max(config.min_retained)
        .min(n_all);
    let trimmed: Vec<Point3<f64>> = by_distance.into_iter().take(keep).map(|(_, p)| p).collect();

    let fine = pca_from_points(&trimmed)
        .ok_or_else(|| FrameError::degenerate("refined PCA needs at least 3 points"))?;
    if fine.eigenvalues[1] <= tolerances.degeneracy {
        return Err(FrameError::degenerate(
            "point cloud is collinear or coincident",
        ));
    }

    let triad = orthogonalize(
        Some(fine.primary_axis()),
        Some(fine.secondary_axis()),
        Some(fine.plane_normal()),
        tolerances.degeneracy,
    )
    .ok_or_else(|| FrameError::degenerate("plane axes could not be orthogonalized"))?;

    let warnings = separation_warning(&fine, tolerances).into_iter().collect();

    debug!(
        n_all,
        n_in = keep,
        eigenvalues = ?fine.eigenvalues,
        "Estimated occlusal plane"
    );

    Ok(PlaneEstimate {
        frame: triad.at(fine.centroid),
        quality: Quality::Ok,
        warnings,
        stats: PlaneStats { n_in: keep, n_all },
        eigenvalues: fine.eigenvalues,
    })
}

fn separation_warning(pca: &PcaResult, tolerances: &Tolerances) -> Option<String> {
    let ratio = pca.separation_ratio(tolerances.degeneracy)?;
    (ratio < tolerances.separation_ratio).then(|| {
        warn!(ratio, "Weak plane separation");
        format!("weak plane separation in PCA (λ2/λ3≈{ratio:.2})")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ortho_types::ORTHONORMAL_TOLERANCE;

    /// Gently wavy sheet in XY with a few points far above it.
    fn occlusal_sheet(nx: usize, ny: usize) -> Vec<Point3<f64>> {
        let mut pts = Vec::with_capacity(nx * ny + 10);
        for i in 0..nx {
            for j in 0..ny {
                let x = i as f64 * 50.0 / nx as f64 - 25.0;
                let y = j as f64 * 60.0 / ny as f64 - 30.0;
                pts.push(Point3::new(x, y, 0.2 * (0.3 * x).sin() * (0.2 * y).cos()));
            }
        }
        for k in 0..10 {
            pts.push(Point3::new(k as f64 - 5.0, 0.0, 15.0));
        }
        pts
    }

    #[test]
    fn rejects_small_clouds() {
        let pts = occlusal_sheet(5, 8);
        let err = estimate_plane(&pts[..40], &PlaneConfig::new(), &Tolerances::default());
        assert_eq!(
            err.unwrap_err(),
            FrameError::InsufficientPointCloud {
                required: 50,
                actual: 40
            }
        );
    }

    #[test]
    fn non_finite_points_do_not_count() {
        let mut pts = occlusal_sheet(5, 9)[..45].to_vec();
        pts.extend(std::iter::repeat(Point3::new(f64::NAN, 0.0, 0.0)).take(10));
        let err = estimate_plane(&pts, &PlaneConfig::new(), &Tolerances::default());
        assert!(matches!(
            err,
            Err(FrameError::InsufficientPointCloud { actual: 45, .. })
        ));
    }

    #[test]
    fn trimmed_plane_ignores_outliers() {
        let pts = occlusal_sheet(20, 20);
        let est = estimate_plane(&pts, &PlaneConfig::new().with_seed(3), &Tolerances::default())
            .unwrap();
        assert!(est.frame.ez.z.abs() > 0.999);
        assert!(est.frame.origin.z.abs() < 0.5);
        assert!(est.frame.is_orthonormal(ORTHONORMAL_TOLERANCE));
        assert_eq!(est.stats.n_all, 410);
        assert_eq!(est.stats.n_in, 205);
        assert!(est.warnings.is_empty());
        assert_eq!(est.quality, Quality::Ok);
    }

    #[test]
    fn min_retained_floor() {
        let pts = occlusal_sheet(10, 10);
        let est = estimate_plane(&pts, &PlaneConfig::new().with_seed(3), &Tolerances::default())
            .unwrap();
        // floor(110 * 0.5) = 55 < 100
        assert_eq!(est.stats.n_in, 100);
    }

    #[test]
    fn large_clouds_are_subsampled() {
        let pts = occlusal_sheet(40, 40);
        let config = PlaneConfig::new().with_max_points(500).with_seed(11);
        let est = estimate_plane(&pts, &config, &Tolerances::default()).unwrap();
        assert_eq!(est.stats.n_all, 500);
        assert_eq!(est.stats.n_in, 250);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let pts = occlusal_sheet(40, 40);
        let config = PlaneConfig::new().with_max_points(300).with_seed(42);
        let a = estimate_plane(&pts, &config, &Tolerances::default()).unwrap();
        let b = estimate_plane(&pts, &config, &Tolerances::default()).unwrap();
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.eigenvalues, b.eigenvalues);
    }

    #[test]
    fn injected_rng_matches_seed() {
        let pts = occlusal_sheet(40, 40);
        let config = PlaneConfig::new().with_max_points(300);
        let tol = Tolerances::default();
        let a = estimate_plane(&pts, &config.clone().with_seed(9), &tol).unwrap();
        let b = estimate_plane_with_rng(&pts, &config, &tol, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a.frame, b.frame);
    }

    #[test]
    fn weak_separation_warns() {
        // Isotropic blob: λ2 ≈ λ3
        let mut pts = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                for k in 0..6 {
                    pts.push(Point3::new(f64::from(i), f64::from(j), f64::from(k)));
                }
            }
        }
        // Keep every point so trimming cannot sharpen the plane
        let config = PlaneConfig::new().with_min_retained(10_000);
        let est = estimate_plane(&pts, &config, &Tolerances::default()).unwrap();
        assert_eq!(est.stats.n_in, 216);
        assert_eq!(est.warnings.len(), 1);
        assert!(est.warnings[0].starts_with("weak plane separation"));
    }

    #[test]
    fn collinear_cloud_is_degenerate() {
        let pts: Vec<_> = (0..80).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        let err = estimate_plane(&pts, &PlaneConfig::new(), &Tolerances::default());
        assert!(matches!(err, Err(FrameError::DegenerateGeometry { .. })));
    }

    #[test]
    fn in_plane_axes_follow_spread() {
        // Wider in Y than X
        let pts: Vec<_> = (0..100)
            .map(|i| {
                let t = f64::from(i);
                Point3::new((t * 0.37).sin() * 5.0, (t * 0.11).cos() * 30.0, 0.0)
            })
            .collect();
        let est = estimate_plane(&pts, &PlaneConfig::new(), &Tolerances::default()).unwrap();
        assert!(est.frame.ex.y.abs() > 0.9);
        assert_relative_eq!(est.frame.ez.z.abs(), 1.0, epsilon = 1e-9);
    }
}
