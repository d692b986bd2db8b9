//! Named anatomical landmarks and priority-ordered lookup.
//!
//! Landmark codes follow FDI tooth numbering followed by a point suffix,
//! e.g. `16mb` (upper right first molar, mesio-buccal cusp) or `11ma`
//! (upper right central incisor, mesial incisal angle).

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A landmark resolved from a list of candidate codes.
///
/// Records which candidate actually matched so callers can report
/// provenance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pick {
    /// The landmark code that resolved.
    pub name: String,
    /// Its position.
    pub point: Point3<f64>,
}

/// A mapping from landmark code to 3D position.
///
/// Values are stored as given. Non-finite coordinates are kept but every
/// lookup treats them as absent.
///
/// # Example
///
/// ```
/// use ortho_types::{LandmarkSet, Point3};
///
/// let mut lm = LandmarkSet::new();
/// lm.insert("16mb", Point3::new(1.0, 2.0, 3.0));
/// lm.insert("26mb", Point3::new(f64::NAN, 0.0, 0.0));
///
/// assert!(lm.get("16mb").is_some());
/// assert!(lm.get("26mb").is_none());
///
/// let pick = lm.pick(&["26mb", "16db", "16mb"]);
/// assert_eq!(pick.map(|p| p.name), Some("16mb".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LandmarkSet {
    points: HashMap<String, Point3<f64>>,
}

impl LandmarkSet {
    /// Create an empty landmark set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a landmark.
    pub fn insert(&mut self, name: impl Into<String>, point: Point3<f64>) {
        self.points.insert(name.into(), point);
    }

    /// Remove a landmark, returning its stored value.
    pub fn remove(&mut self, name: &str) -> Option<Point3<f64>> {
        self.points.remove(name)
    }

    /// Merge another set into this one. Entries in `other` win.
    pub fn extend(&mut self, other: Self) {
        self.points.extend(other.points);
    }

    /// Number of stored entries, finite or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a single landmark. Returns `None` for absent or non-finite
    /// values.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Point3<f64>> {
        self.points
            .get(name)
            .copied()
            .filter(|p| p.iter().all(|c| c.is_finite()))
    }

    /// Resolve the first candidate, in the caller's order, that has a
    /// finite position.
    #[must_use]
    pub fn pick<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Pick> {
        candidates.iter().find_map(|name| {
            let name = name.as_ref();
            self.get(name).map(|point| Pick {
                name: name.to_string(),
                point,
            })
        })
    }

    /// Like [`pick`](Self::pick) but only returns the position.
    #[must_use]
    pub fn pick_point<S: AsRef<str>>(&self, candidates: &[S]) -> Option<Point3<f64>> {
        self.pick(candidates).map(|p| p.point)
    }

    /// Iterate over the stored codes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, Point3<f64>)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (S, Point3<f64>)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Arithmetic mean of all present points, or `None` if there are none.
///
/// # Example
///
/// ```
/// use ortho_types::{centroid, Point3};
///
/// let c = centroid([Some(Point3::new(0.0, 0.0, 0.0)), None, Some(Point3::new(2.0, 4.0, 0.0))]);
/// assert_eq!(c, Some(Point3::new(1.0, 2.0, 0.0)));
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
// Precision loss: landmark groups are tiny
pub fn centroid<I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = Option<Point3<f64>>>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points.into_iter().flatten() {
        sum += p.coords;
        count += 1;
    }
    (count > 0).then(|| Point3::from(sum / count as f64))
}

/// Midpoint of two optional points; a lone point is returned as-is.
#[must_use]
pub fn midpoint(a: Option<Point3<f64>>, b: Option<Point3<f64>>) -> Option<Point3<f64>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(nalgebra::center(&a, &b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> LandmarkSet {
        [
            ("11m", Point3::new(10.0, 1.0, 0.0)),
            ("21m", Point3::new(10.0, -1.0, 0.0)),
            ("16mb", Point3::new(-20.0, -20.0, 0.0)),
            ("26mb", Point3::new(f64::INFINITY, 20.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn pick_respects_caller_order() {
        let lm = sample();
        let p = lm.pick(&["21m", "11m"]).unwrap();
        assert_eq!(p.name, "21m");
        let p = lm.pick(&["missing", "11m", "21m"]).unwrap();
        assert_eq!(p.name, "11m");
    }

    #[test]
    fn non_finite_is_absent() {
        let lm = sample();
        assert!(lm.get("26mb").is_none());
        assert!(lm.pick(&["26mb"]).is_none());
        assert_eq!(lm.len(), 4);
    }

    #[test]
    fn pick_none_when_all_missing() {
        let lm = sample();
        assert!(lm.pick(&["36mb", "36db"]).is_none());
        assert!(lm.pick::<&str>(&[]).is_none());
    }

    #[test]
    fn centroid_skips_missing() {
        let lm = sample();
        let c = centroid([lm.get("11m"), lm.get("21m"), lm.get("31m")]).unwrap();
        assert_relative_eq!(c, Point3::new(10.0, 0.0, 0.0));
        assert!(centroid([None, None]).is_none());
    }

    #[test]
    fn midpoint_of_one() {
        let a = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(midpoint(Some(a), None), Some(a));
        assert_eq!(midpoint(None, Some(a)), Some(a));
        assert_eq!(midpoint(None, None), None);
        assert_relative_eq!(
            midpoint(Some(a), Some(Point3::origin())).unwrap(),
            Point3::new(0.5, 1.0, 1.5)
        );
    }

    #[test]
    fn extend_overrides() {
        let mut lm = sample();
        let mut other = LandmarkSet::new();
        other.insert("11m", Point3::new(0.0, 0.0, 5.0));
        lm.extend(other);
        assert_eq!(lm.get("11m").unwrap().z, 5.0);
    }
}
