//! Gram-Schmidt completion of approximate axes into a right-handed triad.

use nalgebra::{Point3, Vector3};
use ortho_types::{project_onto_plane, Frame};

/// Three mutually orthogonal unit axes with `ex × ey = ez`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triad {
    /// Anterior-posterior axis.
    pub ex: Vector3<f64>,
    /// Transverse axis.
    pub ey: Vector3<f64>,
    /// Vertical axis.
    pub ez: Vector3<f64>,
}

impl Triad {
    /// Attach an origin.
    #[must_use]
    pub const fn at(self, origin: Point3<f64>) -> Frame {
        Frame::new(origin, self.ex, self.ey, self.ez)
    }
}

/// Turn approximate axes into an exact right-handed orthonormal triad.
///
/// `ez` is authoritative and must normalize. `ex` is projected onto the
/// plane orthogonal to `ez`; if it is absent or collapses there, `ey × ez`
/// is used instead. `ey` is then rebuilt as `ez × ex`.
///
/// Returns `None` if `ez` is absent or shorter than `eps`, or if neither
/// `ex` nor `ey` yields a usable in-plane direction.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use ortho_frame::orthogonalize;
///
/// let t = orthogonalize(
///     Some(Vector3::new(1.0, 0.2, 0.3)),
///     Some(Vector3::new(0.0, 1.0, 0.0)),
///     Some(Vector3::new(0.0, 0.0, 2.0)),
///     1e-8,
/// );
/// assert!(t.is_some_and(|t| (t.ex.cross(&t.ey) - t.ez).norm() < 1e-12));
/// ```
#[must_use]
pub fn orthogonalize(
    ex: Option<Vector3<f64>>,
    ey: Option<Vector3<f64>>,
    ez: Option<Vector3<f64>>,
    eps: f64,
) -> Option<Triad> {
    let ez = ez?.try_normalize(eps)?;
    let ex = ex
        .and_then(|x| project_onto_plane(&x, &ez).try_normalize(eps))
        .or_else(|| ey.and_then(|y| y.cross(&ez).try_normalize(eps)))?;
    let ey = ez.cross(&ex).try_normalize(eps)?;
    Some(Triad { ex, ey, ez })
}
