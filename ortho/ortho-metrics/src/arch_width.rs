//! Upper versus lower transverse arch width at three sections.
//!
//! Each section pairs a left and right landmark per arch. Width is the
//! lateral (`y`) separation; a large sagittal offset between the two
//! points makes the pair suspicious and is reported as a warning.

use std::fmt;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{round_to, BriefEntry, MetricModule};

/// Arch section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Section {
    /// Canines.
    Anterior,
    /// First premolars.
    Middle,
    /// First molars.
    Posterior,
}

impl Section {
    /// All sections, front to back.
    pub const ALL: [Self; 3] = [Self::Anterior, Self::Middle, Self::Posterior];

    fn upper(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Self::Anterior => (&["13m"], &["23m"]),
            Self::Middle => (&["14b"], &["24b"]),
            Self::Posterior => (&["16mb", "16db", "16bg"], &["26mb", "26db", "26bg"]),
        }
    }

    fn lower(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Self::Anterior => (&["43m"], &["33m"]),
            Self::Middle => (&["44b"], &["34b"]),
            Self::Posterior => (&["46mb", "46db", "46bg"], &["36mb", "36db", "36bg"]),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anterior => "anterior",
            Self::Middle => "middle",
            Self::Posterior => "posterior",
        })
    }
}

/// Thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchWidthParams {
    /// Largest sagittal offset between a left/right pair before warning.
    pub ap_tolerance: f64,
    /// Upper minus lower width below `-narrow_margin` votes narrow.
    pub narrow_margin: f64,
}

impl Default for ArchWidthParams {
    fn default() -> Self {
        Self {
            ap_tolerance: 4.0,
            narrow_margin: 2.0,
        }
    }
}

impl ArchWidthParams {
    /// Default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sagittal offset tolerance.
    #[must_use]
    pub const fn with_ap_tolerance(mut self, tol: f64) -> Self {
        self.ap_tolerance = tol;
        self
    }

    /// Set the narrowing margin.
    #[must_use]
    pub const fn with_narrow_margin(mut self, margin: f64) -> Self {
        self.narrow_margin = margin;
        self
    }
}

/// One arch's width at one section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SectionWidth {
    /// Lateral separation.
    pub width: f64,
    /// In-plane Euclidean separation.
    pub euclid: f64,
    /// Sagittal offset between the two points.
    pub ap_offset: f64,
}

/// Upper and lower widths at one section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SectionComparison {
    /// Which section.
    pub section: Section,
    /// Upper arch width.
    pub upper: Option<SectionWidth>,
    /// Lower arch width.
    pub lower: Option<SectionWidth>,
    /// Upper minus lower width.
    pub difference: Option<f64>,
}

/// Result of the arch width comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchWidthReport {
    /// Per-section measurements, front to back.
    pub sections: Vec<SectionComparison>,
    /// Majority vote over complete sections, absent with fewer than two.
    pub upper_is_narrow: Option<bool>,
    /// Diagnostics.
    pub warnings: Vec<String>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn measure(
    landmarks: &LandmarkSet,
    frame: &Frame,
    (right, left): (&[&str], &[&str]),
    params: &ArchWidthParams,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<SectionWidth> {
    let r = frame.to_local(&landmarks.pick_point(right)?);
    let l = frame.to_local(&landmarks.pick_point(left)?);
    let dx = (l.x - r.x).abs();
    let dy = (l.y - r.y).abs();
    if dx > params.ap_tolerance {
        warnings.push(format!(
            "{label}: left/right sagittal offset {dx:.1}mm exceeds {:.1}mm",
            params.ap_tolerance
        ));
    }
    Some(SectionWidth {
        width: dy,
        euclid: dx.hypot(dy),
        ap_offset: dx,
    })
}

/// Compare upper and lower arch widths.
#[must_use]
pub fn compute_arch_width(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &ArchWidthParams,
) -> ArchWidthReport {
    let mut warnings = Vec::new();
    let sections: Vec<SectionComparison> = Section::ALL
        .into_iter()
        .map(|section| {
            let upper = measure(
                landmarks,
                frame,
                section.upper(),
                params,
                &format!("upper {section}"),
                &mut warnings,
            );
            let lower = measure(
                landmarks,
                frame,
                section.lower(),
                params,
                &format!("lower {section}"),
                &mut warnings,
            );
            let difference = upper.zip(lower).map(|(u, l)| round_to(u.width - l.width, 2));
            SectionComparison {
                section,
                upper,
                lower,
                difference,
            }
        })
        .collect();

    let complete: Vec<f64> = sections.iter().filter_map(|s| s.difference).collect();
    let votes = complete
        .iter()
        .filter(|d| **d < -params.narrow_margin)
        .count();
    let upper_is_narrow = (complete.len() >= 2).then_some(votes >= 2);

    let quality = if complete.is_empty() {
        Quality::Missing
    } else if warnings.is_empty() {
        Quality::Ok
    } else {
        Quality::Fallback
    };
    let summary_text = match (quality, upper_is_narrow) {
        (Quality::Missing, _) | (_, None) => "missing",
        (_, Some(true)) => "upper arch narrow",
        (_, Some(false)) => "no upper arch narrowing",
    }
    .to_string();

    ArchWidthReport {
        sections,
        upper_is_narrow,
        warnings,
        summary_text,
        quality,
    }
}

/// Arch width as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct ArchWidthMetric {
    /// Thresholds.
    pub params: ArchWidthParams,
}

impl MetricModule for ArchWidthMetric {
    fn key(&self) -> &'static str {
        "Arch_Width"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_arch_width(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn pair(lm: &mut LandmarkSet, right: &str, left: &str, x: f64, width: f64) {
        lm.insert(right, Point3::new(x, -width / 2.0, 0.0));
        lm.insert(left, Point3::new(x, width / 2.0, 0.0));
    }

    /// Upper widths `u`, lower widths `l`, front to back.
    fn arches(u: [f64; 3], l: [f64; 3]) -> LandmarkSet {
        let mut lm = LandmarkSet::new();
        pair(&mut lm, "13m", "23m", 0.0, u[0]);
        pair(&mut lm, "14b", "24b", -8.0, u[1]);
        pair(&mut lm, "16mb", "26mb", -20.0, u[2]);
        pair(&mut lm, "43m", "33m", 0.0, l[0]);
        pair(&mut lm, "44b", "34b", -8.0, l[1]);
        pair(&mut lm, "46mb", "36mb", -20.0, l[2]);
        lm
    }

    fn compute(lm: &LandmarkSet) -> ArchWidthReport {
        compute_arch_width(lm, &Frame::identity(), &ArchWidthParams::default())
    }

    #[test]
    fn normal_arches_are_not_narrow() {
        let report = compute(&arches([35.0, 42.0, 52.0], [27.0, 35.0, 46.0]));
        assert_eq!(report.quality, Quality::Ok);
        assert_eq!(report.upper_is_narrow, Some(false));
        assert_eq!(report.summary_text, "no upper arch narrowing");
        assert_relative_eq!(report.sections[0].difference.unwrap(), 8.0);
    }

    #[test]
    fn two_narrow_sections_vote_narrow() {
        let report = compute(&arches([30.0, 36.0, 52.0], [33.0, 39.0, 46.0]));
        assert_eq!(report.upper_is_narrow, Some(true));
        assert_eq!(report.summary_text, "upper arch narrow");
    }

    #[test]
    fn one_complete_section_is_undecided() {
        let mut lm = arches([35.0, 42.0, 52.0], [27.0, 35.0, 46.0]);
        lm.remove("14b");
        lm.remove("46mb");
        let report = compute(&lm);
        assert_eq!(report.upper_is_narrow, None);
        assert_eq!(report.quality, Quality::Ok);
        assert_eq!(report.summary_text, "missing");
    }

    #[test]
    fn sagittal_offset_warns() {
        let mut lm = arches([35.0, 42.0, 52.0], [27.0, 35.0, 46.0]);
        lm.insert("26mb", Point3::new(-26.0, 26.0, 0.0));
        let report = compute(&lm);
        assert_eq!(report.quality, Quality::Fallback);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("upper posterior"));
        let upper = report.sections[2].upper.unwrap();
        assert_relative_eq!(upper.ap_offset, 6.0);
        assert_relative_eq!(upper.euclid, 52.0f64.hypot(6.0));
    }

    #[test]
    fn no_pairs_is_missing() {
        let report = compute(&LandmarkSet::new());
        assert_eq!(report.quality, Quality::Missing);
        assert_eq!(report.summary_text, "missing");
    }
}
