//! Upper arch form classification from canine, molar, and incisor landmarks.
//!
//! Two dimensionless indices drive the decision:
//!
//! | Index     | Definition                                   |
//! |-----------|----------------------------------------------|
//! | `ICW/IMW` | intercanine width over intermolar width       |
//! | `AD/ICW`  | anterior depth over intercanine width         |
//!
//! Widths are lateral (`y`) separations in the occlusal frame. Anterior
//! depth is the sagittal distance from the canine midpoint forward to the
//! incisor centroid.

use std::fmt;

use ortho_types::{centroid, Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{round_to, BriefEntry, MetricModule};

const RATIO_EPS: f64 = 1e-6;

const CANINE_RIGHT: &str = "13m";
const CANINE_LEFT: &str = "23m";
const MOLAR_RIGHT: [&str; 3] = ["16mb", "16db", "16bg"];
const MOLAR_LEFT: [&str; 3] = ["26mb", "26db", "26bg"];
const INCISORS: [&str; 4] = ["11m", "21m", "12m", "22m"];

/// Classification thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchFormParams {
    /// `ICW/IMW` at or below this suggests a tapered arch.
    pub tapered_width_ratio: f64,
    /// `AD/ICW` at or above this suggests a tapered arch.
    pub tapered_depth_ratio: f64,
    /// `ICW/IMW` at or above this suggests a square arch.
    pub square_width_ratio: f64,
    /// `AD/ICW` at or below this suggests a square arch.
    pub square_depth_ratio: f64,
}

impl Default for ArchFormParams {
    fn default() -> Self {
        Self {
            tapered_width_ratio: 0.72,
            tapered_depth_ratio: 0.80,
            square_width_ratio: 0.80,
            square_depth_ratio: 0.60,
        }
    }
}

impl ArchFormParams {
    /// Default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tapered thresholds.
    #[must_use]
    pub const fn with_tapered(mut self, width_ratio: f64, depth_ratio: f64) -> Self {
        self.tapered_width_ratio = width_ratio;
        self.tapered_depth_ratio = depth_ratio;
        self
    }

    /// Set the square thresholds.
    #[must_use]
    pub const fn with_square(mut self, width_ratio: f64, depth_ratio: f64) -> Self {
        self.square_width_ratio = width_ratio;
        self.square_depth_ratio = depth_ratio;
        self
    }
}

/// Arch form category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ArchForm {
    /// Narrow anterior segment.
    Tapered,
    /// Intermediate.
    Ovoid,
    /// Broad, flat anterior segment.
    Square,
}

impl fmt::Display for ArchForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tapered => "tapered",
            Self::Ovoid => "ovoid",
            Self::Square => "square",
        })
    }
}

/// Raw widths and derived indices, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchIndices {
    /// Intercanine width.
    pub intercanine: f64,
    /// Intermolar width.
    pub intermolar: f64,
    /// Anterior depth, clamped at zero.
    pub anterior_depth: f64,
    /// `ICW/IMW`, absent when the intermolar width vanishes.
    pub width_ratio: Option<f64>,
    /// `AD/ICW`, absent when the intercanine width vanishes.
    pub depth_ratio: Option<f64>,
}

/// Result of the arch form measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArchFormReport {
    /// Category, absent when landmarks are missing.
    pub form: Option<ArchForm>,
    /// Measured indices.
    pub indices: Option<ArchIndices>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

impl ArchFormReport {
    fn missing() -> Self {
        Self {
            form: None,
            indices: None,
            summary_text: "missing".to_string(),
            quality: Quality::Missing,
        }
    }
}

/// Classify the upper arch form.
#[must_use]
pub fn compute_arch_form(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &ArchFormParams,
) -> ArchFormReport {
    let point = |names: &[&str]| landmarks.pick_point(names).map(|p| frame.to_local(&p));

    let (Some(c_right), Some(c_left), Some(m_right), Some(m_left)) = (
        point(&[CANINE_RIGHT]),
        point(&[CANINE_LEFT]),
        point(&MOLAR_RIGHT),
        point(&MOLAR_LEFT),
    ) else {
        return ArchFormReport::missing();
    };
    let Some(incisal) = centroid(INCISORS.iter().map(|code| landmarks.get(code))) else {
        return ArchFormReport::missing();
    };
    let incisal = frame.to_local(&incisal);

    let intercanine = (c_right.y - c_left.y).abs();
    let intermolar = (m_right.y - m_left.y).abs();
    let canine_mid_x = 0.5 * (c_right.x + c_left.x);
    let anterior_depth = (incisal.x - canine_mid_x).max(0.0);

    let width_ratio = (intermolar > RATIO_EPS).then(|| intercanine / intermolar);
    let depth_ratio = (intercanine > RATIO_EPS).then(|| anterior_depth / intercanine);

    let mut form = ArchForm::Ovoid;
    if width_ratio.is_some_and(|r| r <= params.tapered_width_ratio)
        || depth_ratio.is_some_and(|r| r >= params.tapered_depth_ratio)
    {
        form = ArchForm::Tapered;
    }
    // Square is checked last and wins over tapered.
    if width_ratio.is_some_and(|r| r >= params.square_width_ratio)
        || depth_ratio.is_some_and(|r| r <= params.square_depth_ratio)
    {
        form = ArchForm::Square;
    }

    let quality = if width_ratio.is_some() && depth_ratio.is_some() {
        Quality::Ok
    } else {
        Quality::Fallback
    };

    ArchFormReport {
        form: Some(form),
        indices: Some(ArchIndices {
            intercanine: round_to(intercanine, 2),
            intermolar: round_to(intermolar, 2),
            anterior_depth: round_to(anterior_depth, 2),
            width_ratio: width_ratio.map(|r| round_to(r, 2)),
            depth_ratio: depth_ratio.map(|r| round_to(r, 2)),
        }),
        summary_text: form.to_string(),
        quality,
    }
}

/// Arch form as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct ArchFormMetric {
    /// Classification thresholds.
    pub params: ArchFormParams,
}

impl MetricModule for ArchFormMetric {
    fn key(&self) -> &'static str {
        "Arch_Form"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_arch_form(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
