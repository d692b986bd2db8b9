//! Principal component analysis of 3D point sets.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

/// Principal axes of a point set.
///
/// Axes are sorted by variance, largest first.
#[derive(Debug, Clone)]
pub struct PcaResult {
    /// Mean of the points.
    pub centroid: Point3<f64>,
    /// Unit eigenvectors, sorted by eigenvalue descending.
    pub axes: [Vector3<f64>; 3],
    /// Variances along each axis, sorted descending.
    pub eigenvalues: [f64; 3],
}

impl PcaResult {
    /// Direction of maximum variance.
    #[must_use]
    pub const fn primary_axis(&self) -> Vector3<f64> {
        self.axes[0]
    }

    /// Direction of second-most variance.
    #[must_use]
    pub const fn secondary_axis(&self) -> Vector3<f64> {
        self.axes[1]
    }

    /// Normal of the best-fit plane: `primary × secondary`.
    ///
    /// Unlike [`tertiary_axis`](Self::tertiary_axis), this always forms a
    /// right-handed triad with the two in-plane axes.
    #[must_use]
    pub fn plane_normal(&self) -> Vector3<f64> {
        self.axes[0].cross(&self.axes[1])
    }

    /// Direction of minimum variance.
    #[must_use]
    pub const fn tertiary_axis(&self) -> Vector3<f64> {
        self.axes[2]
    }

    /// `λ2/λ3`, or `None` when `λ3` is at or below `eps`.
    #[must_use]
    pub fn separation_ratio(&self, eps: f64) -> Option<f64> {
        (self.eigenvalues[2] > eps).then(|| self.eigenvalues[1] / self.eigenvalues[2])
    }
}

/// Compute PCA on a set of points.
///
/// Non-finite points must be filtered by the caller.
///
/// # Returns
///
/// `None` if fewer than 3 points are given.
///
/// # Example
///
/// ```
/// use ortho_frame::pca_from_points;
/// use nalgebra::Point3;
///
/// let pts = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(10.0, 1.0, 0.0),
/// ];
/// let pca = pca_from_points(&pts);
/// assert!(pca.is_some_and(|p| p.primary_axis().x.abs() > 0.9));
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
// Precision loss: point counts beyond 2^52 are unsupported
pub fn pca_from_points(points: &[Point3<f64>]) -> Option<PcaResult> {
    if points.len() < 3 {
        return None;
    }

    let count = points.len() as f64;
    let centroid = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords)
        / count;

    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p.coords - centroid;
        covariance += d * d.transpose();
    }
    covariance /= count;

    let eigen = SymmetricEigen::new(covariance);
    let eigenvalues = eigen.eigenvalues;
    let eigenvectors = eigen.eigenvectors;

    // Sort by eigenvalue (descending)
    let mut indices = [0usize, 1, 2];
    indices.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Some(PcaResult {
        centroid: Point3::from(centroid),
        axes: [
            eigenvectors.column(indices[0]).into_owned(),
            eigenvectors.column(indices[1]).into_owned(),
            eigenvectors.column(indices[2]).into_owned(),
        ],
        eigenvalues: [
            eigenvalues[indices[0]],
            eigenvalues[indices[1]],
            eigenvalues[indices[2]],
        ],
    })
}
