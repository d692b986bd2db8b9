//! The calling contract shared by every metric module.

use std::fmt;

use nalgebra::{Point3, Vector3};
use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Marker appended to a brief value that could be computed.
pub const PASS_MARK: &str = "✅";
/// Marker appended to a brief value that could not be computed.
pub const WARN_MARK: &str = "⚠️";

/// One line of the brief report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BriefEntry {
    /// Stable report key, e.g. `Overjet`.
    pub key: &'static str,
    /// Human-readable value without marker.
    pub value: String,
    /// Confidence of the underlying measurement.
    pub quality: Quality,
}

impl BriefEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(key: &'static str, value: impl Into<String>, quality: Quality) -> Self {
        Self {
            key,
            value: value.into(),
            quality,
        }
    }

    /// Whether the measurement produced a result.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.quality.is_usable()
    }

    /// Value followed by its pass/warn marker.
    #[must_use]
    pub fn rendered(&self) -> String {
        let mark = if self.passed() { PASS_MARK } else { WARN_MARK };
        format!("{} {mark}", self.value)
    }
}

/// A clinical measurement computed from landmarks in the occlusal frame.
///
/// Implementations are pure: they read the landmarks and frame, never
/// mutate shared state, and may run concurrently.
pub trait MetricModule: Send + Sync {
    /// Report key.
    fn key(&self) -> &'static str;

    /// Compute the measurement and summarize it for the brief report.
    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry;
}

/// Patient side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// Patient right (FDI quadrants 1 and 4).
    Right,
    /// Patient left (FDI quadrants 2 and 3).
    Left,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Right => "right",
            Self::Left => "left",
        })
    }
}

/// Local coordinates of a landmark, if it exists.
pub(crate) fn local(landmarks: &LandmarkSet, frame: &Frame, name: &str) -> Option<Vector3<f64>> {
    landmarks.get(name).map(|p| frame.to_local(&p))
}

/// First finite landmark among `names`, with its code.
pub(crate) fn pick_named<'n>(
    landmarks: &LandmarkSet,
    names: &[&'n str],
) -> Option<(&'n str, Point3<f64>)> {
    names
        .iter()
        .find_map(|name| landmarks.get(name).map(|p| (*name, p)))
}

/// Of the given side values, the one with the largest magnitude.
pub(crate) fn largest_magnitude(right: Option<f64>, left: Option<f64>) -> Option<(Side, f64)> {
    match (right, left) {
        (Some(r), Some(l)) => Some(if l.abs() > r.abs() {
            (Side::Left, l)
        } else {
            (Side::Right, r)
        }),
        (Some(r), None) => Some((Side::Right, r)),
        (None, Some(l)) => Some((Side::Left, l)),
        (None, None) => None,
    }
}

/// Round to `dec` decimals.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn round_to(value: f64, dec: u32) -> f64 {
    let scale = 10f64.powi(dec as i32);
    (value * scale).round() / scale
}

/// Millimetre text with trailing zero decimals dropped: `2.0` → `2mm`.
pub(crate) fn format_mm(value: f64, dec: u32) -> String {
    let rounded = round_to(value, dec);
    if rounded.fract().abs() < 1e-9 {
        format!("{rounded:.0}mm")
    } else {
        format!("{rounded:.prec$}mm", prec = dec as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_marks_quality() {
        assert_eq!(BriefEntry::new("K", "normal", Quality::Ok).rendered(), "normal ✅");
        assert_eq!(BriefEntry::new("K", "ovoid", Quality::Fallback).rendered(), "ovoid ✅");
        assert_eq!(BriefEntry::new("K", "missing", Quality::Missing).rendered(), "missing ⚠️");
    }

    #[test]
    fn millimetres_drop_zero_decimals() {
        assert_eq!(format_mm(2.0, 1), "2mm");
        assert_eq!(format_mm(2.04, 1), "2mm");
        assert_eq!(format_mm(2.46, 1), "2.5mm");
        assert_eq!(format_mm(12.346, 2), "12.35mm");
    }

    #[test]
    fn largest_magnitude_prefers_bigger_absolute_value() {
        assert_eq!(largest_magnitude(Some(1.0), Some(-3.0)), Some((Side::Left, -3.0)));
        assert_eq!(largest_magnitude(Some(2.0), Some(2.0)), Some((Side::Right, 2.0)));
        assert_eq!(largest_magnitude(None, Some(0.5)), Some((Side::Left, 0.5)));
        assert_eq!(largest_magnitude(None, None), None);
    }
}
