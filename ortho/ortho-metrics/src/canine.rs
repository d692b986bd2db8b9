//! Canine sagittal relationship.
//!
//! The upper canine cusp is compared against a point between the lower
//! canine and first premolar. When the premolar contact is absent the
//! proxy falls back to the canine's own distal contact, then to a fixed
//! distal shift.

use std::fmt;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{local, round_to, BriefEntry, MetricModule, Side};

/// Proxy and classification constants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CanineParams {
    /// Fraction of the way from the lower canine to the premolar contact.
    pub premolar_fraction: f64,
    /// Distal shift used when neither contact exists.
    pub fixed_shift: f64,
    /// Offsets within this band are cusp-to-cusp.
    pub edge_tolerance: f64,
    /// Offsets at or beyond this are complete.
    pub complete_threshold: f64,
}

impl Default for CanineParams {
    fn default() -> Self {
        Self {
            premolar_fraction: 0.35,
            fixed_shift: 1.5,
            edge_tolerance: 0.5,
            complete_threshold: 2.0,
        }
    }
}

impl CanineParams {
    /// Default constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the premolar fraction.
    #[must_use]
    pub const fn with_premolar_fraction(mut self, fraction: f64) -> Self {
        self.premolar_fraction = fraction;
        self
    }

    /// Set the cusp-to-cusp band.
    #[must_use]
    pub const fn with_edge_tolerance(mut self, tol: f64) -> Self {
        self.edge_tolerance = tol;
        self
    }

    /// Set the complete threshold.
    #[must_use]
    pub const fn with_complete_threshold(mut self, threshold: f64) -> Self {
        self.complete_threshold = threshold;
        self
    }
}

/// How the lower reference point was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProxySource {
    /// Between canine cusp and first premolar mesial contact.
    Premolar,
    /// Halfway to the canine distal contact.
    CanineDistal,
    /// Fixed shift behind the canine cusp.
    FixedShift,
}

/// Canine relationship class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CanineClass {
    /// Exactly aligned.
    CuspToCusp,
    /// Within tolerance, leaning distal.
    DistalCuspToCusp,
    /// Within tolerance, leaning mesial.
    MesialCuspToCusp,
    /// Distal, short of complete.
    Distal,
    /// Mesial, short of complete.
    Mesial,
    /// Complete distal.
    CompleteDistal,
    /// Complete mesial.
    CompleteMesial,
}

impl fmt::Display for CanineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CuspToCusp => "cusp-to-cusp",
            Self::DistalCuspToCusp => "distal cusp-to-cusp",
            Self::MesialCuspToCusp => "mesial cusp-to-cusp",
            Self::Distal => "distal",
            Self::Mesial => "mesial",
            Self::CompleteDistal => "complete distal",
            Self::CompleteMesial => "complete mesial",
        })
    }
}

/// One side's relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CanineSide {
    /// Upper cusp minus lower proxy, sagittal.
    pub offset: f64,
    /// Class.
    pub class: CanineClass,
    /// How the lower proxy was placed.
    pub proxy: ProxySource,
}

/// Result of the canine relationship measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CanineReport {
    /// Patient right.
    pub right: Option<CanineSide>,
    /// Patient left.
    pub left: Option<CanineSide>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

struct SideCodes {
    upper: &'static str,
    lower: &'static str,
    premolar_mesial: &'static str,
    canine_distal: &'static str,
}

const RIGHT: SideCodes = SideCodes {
    upper: "13m",
    lower: "43m",
    premolar_mesial: "44mc",
    canine_distal: "43dc",
};
const LEFT: SideCodes = SideCodes {
    upper: "23m",
    lower: "33m",
    premolar_mesial: "34mc",
    canine_distal: "33dc",
};

/// Classify a sagittal offset.
#[must_use]
pub fn classify_canine(offset: f64, params: &CanineParams) -> CanineClass {
    if offset.abs() <= params.edge_tolerance {
        if offset < 0.0 {
            CanineClass::DistalCuspToCusp
        } else if offset > 0.0 {
            CanineClass::MesialCuspToCusp
        } else {
            CanineClass::CuspToCusp
        }
    } else if offset <= -params.complete_threshold {
        CanineClass::CompleteDistal
    } else if offset >= params.complete_threshold {
        CanineClass::CompleteMesial
    } else if offset < 0.0 {
        CanineClass::Distal
    } else {
        CanineClass::Mesial
    }
}

fn side(
    landmarks: &LandmarkSet,
    frame: &Frame,
    codes: &SideCodes,
    params: &CanineParams,
) -> Option<CanineSide> {
    let upper = local(landmarks, frame, codes.upper)?;
    let canine = local(landmarks, frame, codes.lower)?;

    let (x, proxy) = if let Some(pm) = local(landmarks, frame, codes.premolar_mesial) {
        (
            canine.x + params.premolar_fraction * (pm.x - canine.x),
            ProxySource::Premolar,
        )
    } else if let Some(dc) = local(landmarks, frame, codes.canine_distal) {
        (canine.x + 0.5 * (dc.x - canine.x), ProxySource::CanineDistal)
    } else {
        (canine.x - params.fixed_shift, ProxySource::FixedShift)
    };

    let offset = upper.x - x;
    Some(CanineSide {
        offset: round_to(offset, 2),
        class: classify_canine(offset, params),
        proxy,
    })
}

fn side_text(side: Side, result: Option<&CanineSide>) -> String {
    match result {
        Some(r) => format!("{side} {}", r.class),
        None => format!("{side} missing"),
    }
}

/// Classify both canine relationships.
#[must_use]
pub fn compute_canine(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &CanineParams,
) -> CanineReport {
    let right = side(landmarks, frame, &RIGHT, params);
    let left = side(landmarks, frame, &LEFT, params);

    let quality = match (right.is_some(), left.is_some()) {
        (true, true) => Quality::Ok,
        (false, false) => Quality::Missing,
        _ => Quality::Fallback,
    };
    let summary_text = if quality == Quality::Missing {
        "missing".to_string()
    } else {
        format!(
            "{}, {}",
            side_text(Side::Right, right.as_ref()),
            side_text(Side::Left, left.as_ref())
        )
    };

    CanineReport {
        right,
        left,
        summary_text,
        quality,
    }
}

/// Canine relationship as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct CanineMetric {
    /// Constants.
    pub params: CanineParams,
}

impl MetricModule for CanineMetric {
    fn key(&self) -> &'static str {
        "Canine_Relationship"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_canine(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn x(name: &str, x: f64, lm: &mut LandmarkSet) {
        lm.insert(name, Point3::new(x, 0.0, 0.0));
    }

    #[test]
    fn classification_bands() {
        let p = CanineParams::default();
        assert_eq!(classify_canine(0.0, &p), CanineClass::CuspToCusp);
        assert_eq!(classify_canine(-0.5, &p), CanineClass::DistalCuspToCusp);
        assert_eq!(classify_canine(0.3, &p), CanineClass::MesialCuspToCusp);
        assert_eq!(classify_canine(-1.0, &p), CanineClass::Distal);
        assert_eq!(classify_canine(1.9, &p), CanineClass::Mesial);
        assert_eq!(classify_canine(-2.0, &p), CanineClass::CompleteDistal);
        assert_eq!(classify_canine(3.0, &p), CanineClass::CompleteMesial);
    }

    #[test]
    fn proxy_prefers_premolar_contact() {
        let mut lm = LandmarkSet::new();
        x("13m", 10.0, &mut lm);
        x("43m", 10.0, &mut lm);
        x("44mc", 0.0, &mut lm);
        x("43dc", 6.0, &mut lm);
        // Proxy at 10 - 0.35 * 10 = 6.5
        let right = compute_canine(&lm, &Frame::identity(), &CanineParams::default())
            .right
            .unwrap();
        assert_eq!(right.proxy, ProxySource::Premolar);
        assert_relative_eq!(right.offset, 3.5);
        assert_eq!(right.class, CanineClass::CompleteMesial);

        lm.remove("44mc");
        let right = compute_canine(&lm, &Frame::identity(), &CanineParams::default())
            .right
            .unwrap();
        assert_eq!(right.proxy, ProxySource::CanineDistal);
        assert_relative_eq!(right.offset, 2.0);

        lm.remove("43dc");
        let right = compute_canine(&lm, &Frame::identity(), &CanineParams::default())
            .right
            .unwrap();
        assert_eq!(right.proxy, ProxySource::FixedShift);
        assert_relative_eq!(right.offset, 1.5);
        assert_eq!(right.class, CanineClass::Mesial);
    }

    #[test]
    fn one_side_falls_back() {
        let mut lm = LandmarkSet::new();
        x("23m", 5.0, &mut lm);
        x("33m", 7.5, &mut lm);
        x("34mc", 2.5, &mut lm);
        let report = compute_canine(&lm, &Frame::identity(), &CanineParams::default());
        assert_eq!(report.quality, Quality::Fallback);
        assert!(report.right.is_none());
        // Proxy 7.5 - 0.35 * 5 = 5.75, offset -0.75
        assert_eq!(report.summary_text, "right missing, left distal");
    }

    #[test]
    fn no_canines_is_missing() {
        let report = compute_canine(
            &LandmarkSet::new(),
            &Frame::identity(),
            &CanineParams::default(),
        );
        assert_eq!(report.quality, Quality::Missing);
        assert_eq!(report.summary_text, "missing");
    }
}
