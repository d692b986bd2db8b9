//! Anterior arch length discrepancy (crowding or spacing).
//!
//! Available space is the sum of contact-to-contact spans between adjacent
//! anterior teeth. Required space is the sum of their mesiodistal widths.
//! A positive discrepancy means spacing, a negative one crowding.

use nalgebra::Point3;
use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{format_mm, round_to, BriefEntry, MetricModule};

const UPPER: [&str; 6] = ["23", "22", "21", "11", "12", "13"];
const LOWER: [&str; 6] = ["33", "32", "31", "41", "42", "43"];
const DISTAL: [&str; 2] = ["dc", "dr"];
const MESIAL: [&str; 3] = ["mc", "mr", "m"];

/// Arches to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ArchSelection {
    /// Maxillary only.
    Upper,
    /// Mandibular only.
    Lower,
    /// Both arches.
    #[default]
    Both,
}

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CrowdingParams {
    /// Which arches to measure.
    pub arches: ArchSelection,
    /// Measure in the occlusal plane instead of in 3D.
    pub in_plane: bool,
    /// Fewer measured contacts than this is flagged.
    pub min_pairs: usize,
    /// Fewer measured teeth than this is flagged.
    pub min_teeth: usize,
}

impl Default for CrowdingParams {
    fn default() -> Self {
        Self {
            arches: ArchSelection::Both,
            in_plane: true,
            min_pairs: 3,
            min_teeth: 4,
        }
    }
}

impl CrowdingParams {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the arches.
    #[must_use]
    pub const fn with_arches(mut self, arches: ArchSelection) -> Self {
        self.arches = arches;
        self
    }

    /// Measure in the occlusal plane or in 3D.
    #[must_use]
    pub const fn with_in_plane(mut self, in_plane: bool) -> Self {
        self.in_plane = in_plane;
        self
    }
}

/// Space analysis of one arch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchCrowding {
    /// Sum of contact spans.
    pub available: f64,
    /// Sum of tooth widths.
    pub required: f64,
    /// Available minus required.
    pub discrepancy: Option<f64>,
    /// Contact spans measured.
    pub pairs: usize,
    /// Tooth widths measured.
    pub teeth: usize,
    /// Diagnostics.
    pub warnings: Vec<String>,
    /// Confidence for this arch.
    pub quality: Quality,
}

/// Result of the crowding assessment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CrowdingReport {
    /// Maxillary arch.
    pub upper: Option<ArchCrowding>,
    /// Mandibular arch.
    pub lower: Option<ArchCrowding>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn tooth_point(landmarks: &LandmarkSet, tooth: &str, suffixes: &[&str]) -> Option<Point3<f64>> {
    suffixes
        .iter()
        .find_map(|suffix| landmarks.get(&format!("{tooth}{suffix}")))
}

fn arch(
    landmarks: &LandmarkSet,
    frame: &Frame,
    teeth: &[&str; 6],
    params: &CrowdingParams,
) -> ArchCrowding {
    let span = |a: Point3<f64>, b: Point3<f64>| {
        let d = frame.direction_to_local(&(b - a));
        if params.in_plane {
            d.x.hypot(d.y)
        } else {
            d.norm()
        }
    };

    let gaps: Vec<f64> = teeth
        .windows(2)
        .filter_map(|pair| {
            let distal = tooth_point(landmarks, pair[0], &DISTAL)?;
            let mesial = tooth_point(landmarks, pair[1], &MESIAL)?;
            Some(span(distal, mesial))
        })
        .collect();
    let widths: Vec<f64> = teeth
        .iter()
        .filter_map(|tooth| {
            let mesial = tooth_point(landmarks, tooth, &MESIAL)?;
            let distal = tooth_point(landmarks, tooth, &DISTAL)?;
            Some(span(mesial, distal))
        })
        .collect();

    let mut warnings = Vec::new();
    if gaps.len() < params.min_pairs {
        warnings.push(format!("only {} contact spans measured", gaps.len()));
    }
    if widths.len() < params.min_teeth {
        warnings.push(format!("only {} tooth widths measured", widths.len()));
    }

    let available: f64 = gaps.iter().sum();
    let required: f64 = widths.iter().sum();
    let complete = !gaps.is_empty() && !widths.is_empty();
    let quality = if !complete {
        Quality::Missing
    } else if warnings.is_empty() {
        Quality::Ok
    } else {
        Quality::Fallback
    };

    ArchCrowding {
        available: round_to(available, 1),
        required: round_to(required, 1),
        discrepancy: complete.then(|| round_to(available - required, 1)),
        pairs: gaps.len(),
        teeth: widths.len(),
        warnings,
        quality,
    }
}

fn describe(label: &str, arch: &ArchCrowding) -> String {
    match arch.discrepancy {
        Some(d) if d < 0.0 => format!("{label} crowding {}", format_mm(-d, 1)),
        Some(d) => format!("{label} spacing {}", format_mm(d, 1)),
        None => format!("{label} missing"),
    }
}

/// Measure anterior crowding or spacing.
#[must_use]
pub fn compute_crowding(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &CrowdingParams,
) -> CrowdingReport {
    let upper = matches!(params.arches, ArchSelection::Upper | ArchSelection::Both)
        .then(|| arch(landmarks, frame, &UPPER, params));
    let lower = matches!(params.arches, ArchSelection::Lower | ArchSelection::Both)
        .then(|| arch(landmarks, frame, &LOWER, params));

    let qualities: Vec<Quality> = [&upper, &lower]
        .into_iter()
        .flatten()
        .map(|a| a.quality)
        .collect();
    let quality = qualities.iter().copied().min().unwrap_or(Quality::Missing);

    let summary_text = if quality == Quality::Missing {
        "missing".to_string()
    } else {
        [("upper", &upper), ("lower", &lower)]
            .into_iter()
            .filter_map(|(label, a)| a.as_ref().map(|a| describe(label, a)))
            .collect::<Vec<_>>()
            .join(" ")
    };

    CrowdingReport {
        upper,
        lower,
        summary_text,
        quality,
    }
}

/// Crowding as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct CrowdingMetric {
    /// Settings.
    pub params: CrowdingParams,
}

impl MetricModule for CrowdingMetric {
    fn key(&self) -> &'static str {
        "Crowding"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_crowding(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Six teeth of width `w` along `y`, each distal contact `gap` short
    /// of the next tooth's mesial contact.
    fn segment(lm: &mut LandmarkSet, teeth: &[&str; 6], w: f64, gap: f64) {
        let mut y = 0.0;
        for tooth in teeth {
            lm.insert(format!("{tooth}mc"), Point3::new(0.0, y, 0.0));
            lm.insert(format!("{tooth}dc"), Point3::new(0.0, y + w, 0.0));
            y += w + gap;
        }
    }

    fn compute(lm: &LandmarkSet) -> CrowdingReport {
        compute_crowding(lm, &Frame::identity(), &CrowdingParams::default())
    }

    #[test]
    fn spacing_and_crowding() {
        let mut lm = LandmarkSet::new();
        segment(&mut lm, &UPPER, 8.0, 1.5);
        segment(&mut lm, &LOWER, 1.0, 1.5);
        let report = compute(&lm);
        assert_eq!(report.quality, Quality::Ok);
        let upper = report.upper.unwrap();
        assert_eq!(upper.pairs, 5);
        assert_eq!(upper.teeth, 6);
        assert_relative_eq!(upper.required, 48.0);
        assert_relative_eq!(upper.available, 7.5);
        // 5 × 1.5 - 6 × 8
        assert_relative_eq!(upper.discrepancy.unwrap(), -40.5);
        assert_eq!(report.summary_text, "upper crowding 40.5mm lower spacing 1.5mm");
    }

    #[test]
    fn gaps_add_space() {
        let mut lm = LandmarkSet::new();
        segment(&mut lm, &UPPER, 1.0, 2.0);
        let report = compute_crowding(
            &lm,
            &Frame::identity(),
            &CrowdingParams::default().with_arches(ArchSelection::Upper),
        );
        // 5 × 2 - 6 × 1
        assert_relative_eq!(report.upper.as_ref().unwrap().discrepancy.unwrap(), 4.0);
        assert!(report.lower.is_none());
        assert_eq!(report.summary_text, "upper spacing 4mm");
    }

    #[test]
    fn sparse_arch_falls_back() {
        let mut lm = LandmarkSet::new();
        segment(&mut lm, &UPPER, 8.0, 0.0);
        for tooth in ["21", "11", "12"] {
            lm.remove(&format!("{tooth}dc"));
            lm.remove(&format!("{tooth}mc"));
        }
        let report = compute(&lm);
        let upper = report.upper.unwrap();
        assert_eq!(upper.quality, Quality::Fallback);
        assert_eq!(upper.warnings.len(), 2);
        assert_eq!(report.lower.unwrap().quality, Quality::Missing);
        // The better arch sets the overall confidence.
        assert_eq!(report.quality, Quality::Fallback);
        assert!(report.summary_text.ends_with("lower missing"));
    }

    #[test]
    fn nothing_measured_is_missing() {
        let report = compute(&LandmarkSet::new());
        assert_eq!(report.quality, Quality::Missing);
        assert_eq!(report.summary_text, "missing");
    }
}
