//! Dental midline alignment against the frame's mid-sagittal plane.

use std::fmt;

use nalgebra::Point3;
use ortho_types::{midpoint, Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{format_mm, round_to, BriefEntry, MetricModule};

const CENTERED_EPS: f64 = 1e-6;

/// Lateral direction of a midline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MidlineDirection {
    /// On the mid-sagittal plane.
    Centered,
    /// Deviated to the patient's right.
    Right,
    /// Deviated to the patient's left.
    Left,
}

impl fmt::Display for MidlineDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Centered => "centered",
            Self::Right => "right",
            Self::Left => "left",
        })
    }
}

/// One arch's midline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MidlineOffset {
    /// Signed lateral offset; negative is patient right.
    pub signed: f64,
    /// Direction of the offset.
    pub direction: MidlineDirection,
}

impl MidlineOffset {
    fn new(y: f64) -> Self {
        let direction = if y.abs() < CENTERED_EPS {
            MidlineDirection::Centered
        } else if y < 0.0 {
            MidlineDirection::Right
        } else {
            MidlineDirection::Left
        };
        Self {
            signed: round_to(y, 1),
            direction,
        }
    }

    /// Deviation to the right, zero when deviated left.
    #[must_use]
    pub fn right_mm(&self) -> f64 {
        (-self.signed).max(0.0)
    }

    fn describe(&self, arch: &str) -> String {
        match self.direction {
            MidlineDirection::Centered => format!("{arch} centered"),
            direction => format!("{arch} {direction} {}", format_mm(self.signed.abs(), 0)),
        }
    }
}

/// Result of the midline assessment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MidlineReport {
    /// Upper incisor midline.
    pub upper: Option<MidlineOffset>,
    /// Lower incisor midline.
    pub lower: Option<MidlineOffset>,
    /// Both offsets within the threshold.
    pub passed: bool,
    /// Threshold used.
    pub threshold: f64,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn incisal_midpoint(landmarks: &LandmarkSet, a: &str, b: &str) -> Option<Point3<f64>> {
    midpoint(landmarks.get(&format!("{a}ma")), landmarks.get(&format!("{b}ma")))
        .or_else(|| midpoint(landmarks.get(&format!("{a}m")), landmarks.get(&format!("{b}m"))))
}

/// Measure upper and lower midline offsets.
#[must_use]
pub fn compute_midline(landmarks: &LandmarkSet, frame: &Frame, threshold: f64) -> MidlineReport {
    let upper = incisal_midpoint(landmarks, "11", "21");
    let lower = incisal_midpoint(landmarks, "31", "41");

    let (Some(upper), Some(lower)) = (upper, lower) else {
        return MidlineReport {
            upper: None,
            lower: None,
            passed: false,
            threshold,
            summary_text: "missing".to_string(),
            quality: Quality::Missing,
        };
    };

    let uy = frame.to_local(&upper).y;
    let ly = frame.to_local(&lower).y;
    let upper = MidlineOffset::new(uy);
    let lower = MidlineOffset::new(ly);

    MidlineReport {
        upper: Some(upper),
        lower: Some(lower),
        passed: uy.abs() <= threshold && ly.abs() <= threshold,
        threshold,
        summary_text: format!("{} {}", upper.describe("upper"), lower.describe("lower")),
        quality: Quality::Ok,
    }
}

/// Midline alignment as a [`MetricModule`].
#[derive(Debug, Clone)]
pub struct MidlineMetric {
    /// Largest acceptable offset, millimetres.
    pub threshold: f64,
}

impl Default for MidlineMetric {
    fn default() -> Self {
        Self { threshold: 1.0 }
    }
}

impl MetricModule for MidlineMetric {
    fn key(&self) -> &'static str {
        "Midline_Alignment"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_midline(landmarks, frame, self.threshold);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
