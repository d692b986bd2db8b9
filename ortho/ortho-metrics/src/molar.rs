//! First molar sagittal relationship.
//!
//! A positive offset means the upper mesiobuccal cusp sits mesial of the
//! lower one, i.e. a distal (Class II) molar relationship.

use std::ops::RangeInclusive;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{pick_named, round_to, BriefEntry, MetricModule, Side};

/// One side's relationship.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MolarSide {
    /// Upper minus lower cusp position, sagittal.
    pub offset: f64,
    /// Offset falls in the complete distal range.
    pub complete_distal: bool,
    /// Upper landmark used.
    pub upper: String,
    /// Lower landmark used.
    pub lower: String,
}

/// Result of the molar relationship measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MolarReport {
    /// Patient right.
    pub right: Option<MolarSide>,
    /// Patient left.
    pub left: Option<MolarSide>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn side(
    landmarks: &LandmarkSet,
    frame: &Frame,
    upper: &[&str],
    lower: &[&str],
    range: &RangeInclusive<f64>,
) -> Option<MolarSide> {
    let (u_name, u) = pick_named(landmarks, upper)?;
    let (l_name, l) = pick_named(landmarks, lower)?;
    let offset = frame.to_local(&u).x - frame.to_local(&l).x;
    Some(MolarSide {
        offset: round_to(offset, 1),
        complete_distal: range.contains(&offset),
        upper: u_name.to_string(),
        lower: l_name.to_string(),
    })
}

fn word(side: Option<&MolarSide>) -> &'static str {
    match side {
        Some(s) if s.complete_distal => "complete distal",
        Some(_) => "not complete distal",
        None => "missing",
    }
}

/// Evaluate both first molar relationships.
#[must_use]
pub fn compute_molar(
    landmarks: &LandmarkSet,
    frame: &Frame,
    complete_distal: &RangeInclusive<f64>,
) -> MolarReport {
    let right = side(
        landmarks,
        frame,
        &["16mb", "16db", "16bg"],
        &["46mb", "46bg"],
        complete_distal,
    );
    let left = side(
        landmarks,
        frame,
        &["26mb", "26db", "26bg"],
        &["36mb", "36bg"],
        complete_distal,
    );

    let quality = match (right.is_some(), left.is_some()) {
        (true, true) => Quality::Ok,
        (false, false) => Quality::Missing,
        _ => Quality::Fallback,
    };
    let summary_text = format!(
        "{} {}, {} {}",
        Side::Right,
        word(right.as_ref()),
        Side::Left,
        word(left.as_ref())
    );

    MolarReport {
        right,
        left,
        summary_text,
        quality,
    }
}

/// Molar relationship as a [`MetricModule`].
#[derive(Debug, Clone)]
pub struct MolarMetric {
    /// Offsets counted as a complete distal relationship.
    pub complete_distal: RangeInclusive<f64>,
}

impl Default for MolarMetric {
    fn default() -> Self {
        Self {
            complete_distal: 2.5..=7.5,
        }
    }
}

impl MetricModule for MolarMetric {
    fn key(&self) -> &'static str {
        "Molar_Relationship"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_molar(landmarks, frame, &self.complete_distal);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
