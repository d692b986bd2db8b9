//! Anterior overjet: sagittal distance from the upper incisal edge to the
//! labial face of the lower incisor.
//!
//! The labial face is approximated by the line from the lower incisal
//! point (`m`) to the labial gingival point (`bgb`), evaluated at the
//! height of the upper incisal edge.

use std::fmt;

use nalgebra::Vector3;
use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{
    format_mm, largest_magnitude, local, round_to, BriefEntry, MetricModule, Side,
};

const FLAT_EPS: f64 = 1e-6;

/// Category thresholds, millimetres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverjetParams {
    /// Magnitudes within this are edge-to-edge.
    pub edge_tolerance: f64,
    /// Lower bound of the normal range.
    pub normal_low: f64,
    /// Upper bound of the normal range.
    pub normal_high: f64,
    /// At or above this the overjet is excessive.
    pub excessive: f64,
}

impl Default for OverjetParams {
    fn default() -> Self {
        Self {
            edge_tolerance: 0.3,
            normal_low: 1.0,
            normal_high: 4.0,
            excessive: 5.0,
        }
    }
}

impl OverjetParams {
    /// Default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the edge-to-edge tolerance.
    #[must_use]
    pub const fn with_edge_tolerance(mut self, tol: f64) -> Self {
        self.edge_tolerance = tol;
        self
    }

    /// Set the normal range.
    #[must_use]
    pub const fn with_normal(mut self, low: f64, high: f64) -> Self {
        self.normal_low = low;
        self.normal_high = high;
        self
    }
}

/// Overjet category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverjetCategory {
    /// Incisal edges meet.
    EdgeToEdge,
    /// Lower incisors ahead of upper.
    Reverse,
    /// At or above the excessive threshold.
    Excessive,
    /// Within the normal range.
    Normal,
    /// Anything else.
    Deviated,
}

impl OverjetCategory {
    /// Categorize an overjet value.
    #[must_use]
    pub fn classify(value: f64, params: &OverjetParams) -> Self {
        if value.abs() <= params.edge_tolerance {
            Self::EdgeToEdge
        } else if value < -params.edge_tolerance {
            Self::Reverse
        } else if value >= params.excessive {
            Self::Excessive
        } else if (params.normal_low..=params.normal_high).contains(&value) {
            Self::Normal
        } else {
            Self::Deviated
        }
    }
}

impl fmt::Display for OverjetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EdgeToEdge => "edge-to-edge",
            Self::Reverse => "reverse",
            Self::Excessive => "excessive",
            Self::Normal => "normal",
            Self::Deviated => "deviated",
        })
    }
}

/// How the lower labial reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LabialSource {
    /// Interpolated on the labial line.
    Interpolated {
        /// Upper edge height fell outside the line and was clamped.
        clamped: bool,
    },
    /// Lower incisal point only.
    IncisalOnly,
}

/// One side's overjet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverjetSide {
    /// Upper edge minus lower labial reference, sagittal.
    pub value: f64,
    /// Reference construction.
    pub source: LabialSource,
}

/// Result of the overjet measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverjetReport {
    /// Value of the side with the largest magnitude.
    pub value: Option<f64>,
    /// Which side gave `value`.
    pub side_of_max: Option<Side>,
    /// Patient right (11 over 41).
    pub right: Option<OverjetSide>,
    /// Patient left (21 over 31).
    pub left: Option<OverjetSide>,
    /// Category.
    pub category: Option<OverjetCategory>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn labial_x(
    lower: &Vector3<f64>,
    labial: Option<&Vector3<f64>>,
    height: f64,
) -> (f64, LabialSource) {
    let Some(labial) = labial else {
        return (lower.x, LabialSource::IncisalOnly);
    };
    let dz = labial.z - lower.z;
    if dz.abs() < FLAT_EPS {
        return (lower.x, LabialSource::IncisalOnly);
    }
    let t = (height - lower.z) / dz;
    let clamped = !(0.0..=1.0).contains(&t);
    let t = t.clamp(0.0, 1.0);
    (
        lower.x + t * (labial.x - lower.x),
        LabialSource::Interpolated { clamped },
    )
}

fn side(
    landmarks: &LandmarkSet,
    frame: &Frame,
    upper: [&str; 2],
    lower: &str,
    labial: &str,
) -> Option<(f64, OverjetSide)> {
    let u = frame.to_local(&landmarks.pick_point(&upper)?);
    let l = local(landmarks, frame, lower)?;
    let b = local(landmarks, frame, labial);
    let (x, source) = labial_x(&l, b.as_ref(), u.z);
    let value = u.x - x;
    Some((
        value,
        OverjetSide {
            value: round_to(value, 1),
            source,
        },
    ))
}

/// Measure the anterior overjet.
#[must_use]
pub fn compute_overjet(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &OverjetParams,
) -> OverjetReport {
    let right = side(landmarks, frame, ["11m", "11ma"], "41m", "41bgb");
    let left = side(landmarks, frame, ["21m", "21ma"], "31m", "31bgb");

    let interpolated = |s: &Option<(f64, OverjetSide)>| {
        matches!(s, Some((_, OverjetSide { source: LabialSource::Interpolated { .. }, .. })))
    };
    let quality = if interpolated(&right) && interpolated(&left) {
        Quality::Ok
    } else {
        Quality::Fallback
    };

    let picked = largest_magnitude(right.map(|(v, _)| v), left.map(|(v, _)| v));
    let right = right.map(|(_, s)| s);
    let left = left.map(|(_, s)| s);
    let Some((side_of_max, value)) = picked else {
        return OverjetReport {
            value: None,
            side_of_max: None,
            right,
            left,
            category: None,
            summary_text: "missing".to_string(),
            quality: Quality::Missing,
        };
    };

    let category = OverjetCategory::classify(value, params);
    let value = round_to(value, 1);
    OverjetReport {
        value: Some(value),
        side_of_max: Some(side_of_max),
        right,
        left,
        category: Some(category),
        summary_text: format!("{} {category}", format_mm(value.abs(), 1)),
        quality,
    }
}

/// Overjet as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct OverjetMetric {
    /// Category thresholds.
    pub params: OverjetParams,
}

impl MetricModule for OverjetMetric {
    fn key(&self) -> &'static str {
        "Overjet"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_overjet(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Upper edges at height 2 over lower incisors whose labial face
    /// slopes back 2mm over 8mm of height.
    fn incisors(right_x: f64, left_x: f64) -> LandmarkSet {
        [
            ("11m", Point3::new(right_x, -2.0, 2.0)),
            ("21m", Point3::new(left_x, 2.0, 2.0)),
            ("41m", Point3::new(8.0, -2.0, 0.0)),
            ("41bgb", Point3::new(6.0, -2.0, -8.0)),
            ("31m", Point3::new(8.0, 2.0, 0.0)),
            ("31bgb", Point3::new(6.0, 2.0, -8.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn categories() {
        let p = OverjetParams::default();
        assert_eq!(OverjetCategory::classify(0.3, &p), OverjetCategory::EdgeToEdge);
        assert_eq!(OverjetCategory::classify(-0.31, &p), OverjetCategory::Reverse);
        assert_eq!(OverjetCategory::classify(0.5, &p), OverjetCategory::Deviated);
        assert_eq!(OverjetCategory::classify(3.0, &p), OverjetCategory::Normal);
        assert_eq!(OverjetCategory::classify(4.5, &p), OverjetCategory::Deviated);
        assert_eq!(OverjetCategory::classify(5.0, &p), OverjetCategory::Excessive);
    }

    #[test]
    fn clamps_above_incisal_edge() {
        let report = compute_overjet(
            &incisors(11.0, 10.0),
            &Frame::identity(),
            &OverjetParams::default(),
        );
        // Upper edge is above the lower incisal point, so t clamps to 0.
        let right = report.right.unwrap();
        assert_eq!(right.source, LabialSource::Interpolated { clamped: true });
        assert_relative_eq!(right.value, 3.0);
        assert_eq!(report.side_of_max, Some(Side::Right));
        assert_eq!(report.quality, Quality::Ok);
        assert_eq!(report.summary_text, "3mm normal");
    }

    #[test]
    fn interpolates_on_labial_line() {
        let mut lm = incisors(11.0, 10.0);
        lm.insert("11m", Point3::new(9.0, -2.0, -4.0));
        // Halfway down the face: labial x = 7.
        let right = compute_overjet(&lm, &Frame::identity(), &OverjetParams::default())
            .right
            .unwrap();
        assert_eq!(right.source, LabialSource::Interpolated { clamped: false });
        assert_relative_eq!(right.value, 2.0);
    }

    #[test]
    fn missing_labial_point_falls_back() {
        let mut lm = incisors(8.1, 13.5);
        lm.remove("31bgb");
        let report = compute_overjet(&lm, &Frame::identity(), &OverjetParams::default());
        assert_eq!(report.left.unwrap().source, LabialSource::IncisalOnly);
        assert_eq!(report.quality, Quality::Fallback);
        assert_eq!(report.category, Some(OverjetCategory::Excessive));
        assert_eq!(report.summary_text, "5.5mm excessive");
    }

    #[test]
    fn reverse_overjet() {
        let report = compute_overjet(
            &incisors(6.0, 7.0),
            &Frame::identity(),
            &OverjetParams::default(),
        );
        assert_eq!(report.category, Some(OverjetCategory::Reverse));
        assert_relative_eq!(report.value.unwrap(), -2.0);
        assert_eq!(report.summary_text, "2mm reverse");
    }

    #[test]
    fn no_incisors_is_missing() {
        let report = compute_overjet(
            &LandmarkSet::new(),
            &Frame::identity(),
            &OverjetParams::default(),
        );
        assert_eq!(report.quality, Quality::Missing);
        assert_eq!(report.summary_text, "missing");
    }
}
