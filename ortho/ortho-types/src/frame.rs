//! Right-handed orthonormal coordinate frame.

use std::fmt;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance used when checking that a frame is orthonormal.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// An occlusal coordinate frame.
///
/// Axis conventions:
/// - `ex`: anterior (molars toward incisors)
/// - `ey`: patient right to patient left
/// - `ez`: toward the maxilla
///
/// Every frame handed out by the builder satisfies
/// [`is_orthonormal`](Self::is_orthonormal).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Frame origin in scan coordinates.
    pub origin: Point3<f64>,
    /// Anterior-posterior axis.
    pub ex: Vector3<f64>,
    /// Transverse axis.
    pub ey: Vector3<f64>,
    /// Vertical axis.
    pub ez: Vector3<f64>,
}

impl Frame {
    /// Create a frame from its parts. No validation is performed.
    #[must_use]
    pub const fn new(
        origin: Point3<f64>,
        ex: Vector3<f64>,
        ey: Vector3<f64>,
        ez: Vector3<f64>,
    ) -> Self {
        Self { origin, ex, ey, ez }
    }

    /// The scan coordinate system itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(
            Point3::origin(),
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
        )
    }

    /// Signed volume `(ex × ey) · ez`. Positive for right-handed frames.
    #[must_use]
    pub fn handedness(&self) -> f64 {
        self.ex.cross(&self.ey).dot(&self.ez)
    }

    /// Check unit length, mutual orthogonality, right-handedness and
    /// finiteness within `tol`.
    #[must_use]
    pub fn is_orthonormal(&self, tol: f64) -> bool {
        let axes = [self.ex, self.ey, self.ez];
        if !self.origin.iter().all(|c| c.is_finite())
            || !axes.iter().all(|a| a.iter().all(|c| c.is_finite()))
        {
            return false;
        }
        axes.iter().all(|a| (a.norm() - 1.0).abs() <= tol)
            && self.ex.dot(&self.ey).abs() <= tol
            && self.ey.dot(&self.ez).abs() <= tol
            && self.ez.dot(&self.ex).abs() <= tol
            && self.handedness() > 0.0
    }

    /// Express a scan-space point in frame coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use ortho_types::{Frame, Point3, Vector3};
    ///
    /// let f = Frame::new(
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Vector3::y(),
    ///     -Vector3::x(),
    ///     Vector3::z(),
    /// );
    /// let local = f.to_local(&Point3::new(1.0, 2.0, 3.0));
    /// assert!((local - Vector3::new(2.0, 0.0, 3.0)).norm() < 1e-12);
    /// ```
    #[must_use]
    pub fn to_local(&self, p: &Point3<f64>) -> Vector3<f64> {
        let d = p - self.origin;
        Vector3::new(d.dot(&self.ex), d.dot(&self.ey), d.dot(&self.ez))
    }

    /// Express a scan-space direction in frame coordinates (origin ignored).
    #[must_use]
    pub fn direction_to_local(&self, v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(v.dot(&self.ex), v.dot(&self.ey), v.dot(&self.ez))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |v: &[f64]| {
            v.iter()
                .map(|c| format!("{c:.3}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "origin: [{}]", row(self.origin.coords.as_slice()))?;
        writeln!(f, "ex(AP): [{}]", row(self.ex.as_slice()))?;
        writeln!(f, "ey(LR): [{}]", row(self.ey.as_slice()))?;
        write!(f, "ez(VT): [{}]", row(self.ez.as_slice()))
    }
}

/// Remove the component of `v` along the unit vector `normal`.
#[must_use]
pub fn project_onto_plane(v: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    v - normal * v.dot(normal)
}
