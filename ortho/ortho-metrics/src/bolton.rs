//! Bolton tooth-size ratios.
//!
//! Mesiodistal widths come from each tooth's mesial and distal contact
//! landmarks (`mc`, `dc`). The anterior ratio covers canine to canine, the
//! overall ratio first molar to first molar. Second molars are excluded.

use std::fmt;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{format_mm, round_to, BriefEntry, MetricModule};

const SUM_EPS: f64 = 1e-6;

const UPPER_OVERALL: [&str; 12] = [
    "16", "15", "14", "13", "12", "11", "21", "22", "23", "24", "25", "26",
];
const LOWER_OVERALL: [&str; 12] = [
    "46", "45", "44", "43", "42", "41", "31", "32", "33", "34", "35", "36",
];
const UPPER_ANTERIOR: [&str; 6] = ["13", "12", "11", "21", "22", "23"];
const LOWER_ANTERIOR: [&str; 6] = ["43", "42", "41", "31", "32", "33"];

/// How a mesiodistal width is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WidthMode {
    /// Projected onto the occlusal plane.
    #[default]
    Plane,
    /// Full 3D distance.
    Spatial,
}

/// Targets and tolerances.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoltonParams {
    /// Width measurement mode.
    pub mode: WidthMode,
    /// Expected anterior ratio, percent.
    pub anterior_target: f64,
    /// Expected overall ratio, percent.
    pub overall_target: f64,
    /// Allowed deviation from either target, percentage points.
    pub tolerance: f64,
    /// Teeth per arch below which the anterior ratio is flagged.
    pub min_anterior_teeth: usize,
    /// Teeth per arch below which the overall ratio is flagged.
    pub min_overall_teeth: usize,
}

impl Default for BoltonParams {
    fn default() -> Self {
        Self {
            mode: WidthMode::Plane,
            anterior_target: 77.2,
            overall_target: 91.3,
            tolerance: 2.0,
            min_anterior_teeth: 5,
            min_overall_teeth: 10,
        }
    }
}

impl BoltonParams {
    /// Default targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the width mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: WidthMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set both target ratios.
    #[must_use]
    pub const fn with_targets(mut self, anterior: f64, overall: f64) -> Self {
        self.anterior_target = anterior;
        self.overall_target = overall;
        self
    }

    /// Set the tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Verdict for one ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoltonStatus {
    /// Within tolerance of the target.
    Normal,
    /// Lower teeth too large relative to upper.
    MandibularExcess,
    /// Upper teeth too large relative to lower.
    MaxillaryExcess,
    /// Not enough teeth measured.
    Missing,
}

impl fmt::Display for BoltonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::MandibularExcess => "mandibular excess",
            Self::MaxillaryExcess => "maxillary excess",
            Self::Missing => "missing",
        })
    }
}

/// One Bolton ratio.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoltonRatio {
    /// Lower sum over upper sum, percent.
    pub ratio: Option<f64>,
    /// Target ratio.
    pub target: f64,
    /// Sum of measured upper widths.
    pub upper_sum: f64,
    /// Sum of measured lower widths.
    pub lower_sum: f64,
    /// Lower sum minus the lower sum the target predicts.
    pub discrepancy: Option<f64>,
    /// Upper teeth measured.
    pub upper_count: usize,
    /// Lower teeth measured.
    pub lower_count: usize,
    /// Verdict.
    pub status: BoltonStatus,
}

/// Result of the Bolton analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoltonReport {
    /// Canine-to-canine ratio.
    pub anterior: BoltonRatio,
    /// First-molar-to-first-molar ratio.
    pub overall: BoltonRatio,
    /// Teeth whose width could not be measured.
    pub missing_teeth: Vec<String>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn tooth_width(
    landmarks: &LandmarkSet,
    frame: &Frame,
    tooth: &str,
    mode: WidthMode,
) -> Option<f64> {
    let mesial = landmarks.get(&format!("{tooth}mc"))?;
    let distal = landmarks.get(&format!("{tooth}dc"))?;
    let d = frame.direction_to_local(&(distal - mesial));
    Some(match mode {
        WidthMode::Plane => d.x.hypot(d.y),
        WidthMode::Spatial => d.norm(),
    })
}

fn sum_widths(
    landmarks: &LandmarkSet,
    frame: &Frame,
    teeth: &[&str],
    mode: WidthMode,
    missing: &mut Vec<String>,
) -> (f64, usize) {
    teeth.iter().fold((0.0, 0), |(sum, n), tooth| {
        match tooth_width(landmarks, frame, tooth, mode) {
            Some(w) => (sum + w, n + 1),
            None => {
                missing.push((*tooth).to_string());
                (sum, n)
            }
        }
    })
}

fn ratio(
    (upper_sum, upper_count): (f64, usize),
    (lower_sum, lower_count): (f64, usize),
    target: f64,
    tolerance: f64,
) -> BoltonRatio {
    let mut out = BoltonRatio {
        ratio: None,
        target,
        upper_sum: round_to(upper_sum, 2),
        lower_sum: round_to(lower_sum, 2),
        discrepancy: None,
        upper_count,
        lower_count,
        status: BoltonStatus::Missing,
    };
    if upper_sum <= SUM_EPS || upper_count == 0 || lower_count == 0 {
        return out;
    }
    let r = lower_sum / upper_sum * 100.0;
    out.ratio = Some(round_to(r, 2));
    out.discrepancy = Some(round_to(lower_sum - upper_sum * target / 100.0, 2));
    out.status = if (r - target).abs() <= tolerance {
        BoltonStatus::Normal
    } else if r > target + tolerance {
        BoltonStatus::MandibularExcess
    } else {
        BoltonStatus::MaxillaryExcess
    };
    out
}

fn describe(label: &str, r: &BoltonRatio) -> Option<String> {
    match r.status {
        BoltonStatus::Normal => None,
        BoltonStatus::Missing => Some(format!("{label} missing")),
        status => {
            let amount = r.discrepancy.map_or(0.0, f64::abs);
            let arch = if status == BoltonStatus::MandibularExcess {
                "mandibular"
            } else {
                "maxillary"
            };
            Some(format!("{label} {status} ({arch} {})", format_mm(amount, 2)))
        }
    }
}

/// Compute the anterior and overall Bolton ratios.
#[must_use]
pub fn compute_bolton(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &BoltonParams,
) -> BoltonReport {
    let mut missing = Vec::new();
    let mode = params.mode;

    let upper_ant = sum_widths(landmarks, frame, &UPPER_ANTERIOR, mode, &mut missing);
    let lower_ant = sum_widths(landmarks, frame, &LOWER_ANTERIOR, mode, &mut missing);
    let upper_all = sum_widths(landmarks, frame, &UPPER_OVERALL, mode, &mut missing);
    let lower_all = sum_widths(landmarks, frame, &LOWER_OVERALL, mode, &mut missing);
    missing.sort();
    missing.dedup();

    let anterior = ratio(upper_ant, lower_ant, params.anterior_target, params.tolerance);
    let overall = ratio(upper_all, lower_all, params.overall_target, params.tolerance);

    let short = upper_ant.1.min(lower_ant.1) < params.min_anterior_teeth
        || upper_all.1.min(lower_all.1) < params.min_overall_teeth;
    let quality = if anterior.ratio.is_none() || overall.ratio.is_none() {
        Quality::Missing
    } else if short {
        Quality::Fallback
    } else {
        Quality::Ok
    };

    let summary_text = if quality == Quality::Missing {
        "missing".to_string()
    } else {
        let parts: Vec<String> = [("anterior", &anterior), ("overall", &overall)]
            .into_iter()
            .filter_map(|(label, r)| describe(label, r))
            .collect();
        if parts.is_empty() {
            "normal".to_string()
        } else {
            parts.join("; ")
        }
    };

    BoltonReport {
        anterior,
        overall,
        missing_teeth: missing,
        summary_text,
        quality,
    }
}

/// Bolton analysis as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct BoltonMetric {
    /// Targets and tolerances.
    pub params: BoltonParams,
}

impl MetricModule for BoltonMetric {
    fn key(&self) -> &'static str {
        "Bolton_Ratio"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_bolton(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
