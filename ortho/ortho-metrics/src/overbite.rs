//! Anterior overbite: vertical overlap of the central incisors.

use std::fmt;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{largest_magnitude, round_to, BriefEntry, MetricModule, Side};

const CROWN_EPS: f64 = 1e-6;

/// Category thresholds, millimetres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverbiteParams {
    /// Lower bound of the normal range.
    pub normal_low: f64,
    /// Upper bound of the normal range.
    pub normal_high: f64,
    /// At or above this the bite is deep.
    pub deep: f64,
    /// Lower bound of the tolerated band around normal.
    pub tolerated_low: f64,
    /// Upper bound of the tolerated band around normal.
    pub tolerated_high: f64,
}

impl Default for OverbiteParams {
    fn default() -> Self {
        Self {
            normal_low: 1.0,
            normal_high: 4.0,
            deep: 5.0,
            tolerated_low: 0.8,
            tolerated_high: 4.5,
        }
    }
}

impl OverbiteParams {
    /// Default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the normal range.
    #[must_use]
    pub const fn with_normal(mut self, low: f64, high: f64) -> Self {
        self.normal_low = low;
        self.normal_high = high;
        self
    }

    /// Set the deep bite threshold.
    #[must_use]
    pub const fn with_deep(mut self, deep: f64) -> Self {
        self.deep = deep;
        self
    }
}

/// Overbite category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverbiteCategory {
    /// Incisors do not overlap.
    OpenBite,
    /// Within the normal or tolerated range.
    Normal,
    /// Overlap at or above the deep threshold.
    Deep,
    /// Outside the tolerated range but not deep.
    Deviated,
}

impl OverbiteCategory {
    /// Categorize an overbite value.
    #[must_use]
    pub fn classify(value: f64, params: &OverbiteParams) -> Self {
        if value < 0.0 {
            Self::OpenBite
        } else if value >= params.deep {
            Self::Deep
        } else if (params.normal_low..=params.normal_high).contains(&value)
            || (params.tolerated_low..=params.tolerated_high).contains(&value)
        {
            Self::Normal
        } else {
            Self::Deviated
        }
    }
}

impl fmt::Display for OverbiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenBite => "open bite",
            Self::Normal => "normal",
            Self::Deep => "deep bite",
            Self::Deviated => "deviated",
        })
    }
}

/// One side's overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverbiteSide {
    /// Upper minus lower incisal height.
    pub value: f64,
    /// Lower incisor crown height.
    pub crown_height: Option<f64>,
    /// Overlap as a fraction of crown height.
    pub ratio: Option<f64>,
}

/// Result of the overbite measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OverbiteReport {
    /// Value of the side with the largest magnitude.
    pub value: Option<f64>,
    /// Which side gave `value`.
    pub side_of_max: Option<Side>,
    /// Patient right (11 over 41).
    pub right: Option<OverbiteSide>,
    /// Patient left (21 over 31).
    pub left: Option<OverbiteSide>,
    /// Category.
    pub category: Option<OverbiteCategory>,
    /// Category with value and crown-height ratio.
    pub detail: String,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn side(
    landmarks: &LandmarkSet,
    frame: &Frame,
    upper: [&str; 2],
    lower: &str,
    labial: &str,
) -> Option<(f64, OverbiteSide)> {
    let u = landmarks.pick_point(&upper)?;
    let l = landmarks.get(lower)?;
    let value = frame.to_local(&u).z - frame.to_local(&l).z;
    let crown_height = landmarks.get(labial).map(|b| (l - b).norm());
    let ratio = crown_height
        .filter(|h| *h > CROWN_EPS)
        .map(|h| round_to(value / h, 2));
    Some((
        value,
        OverbiteSide {
            value: round_to(value, 1),
            crown_height: crown_height.map(|h| round_to(h, 1)),
            ratio,
        },
    ))
}

/// Measure the anterior overbite.
#[must_use]
pub fn compute_overbite(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &OverbiteParams,
) -> OverbiteReport {
    let right = side(landmarks, frame, ["11m", "11ma"], "41m", "41bgb");
    let left = side(landmarks, frame, ["21m", "21ma"], "31m", "31bgb");
    let quality = if right.is_some() && left.is_some() {
        Quality::Ok
    } else {
        Quality::Fallback
    };

    let picked = largest_magnitude(right.map(|(v, _)| v), left.map(|(v, _)| v));
    let right = right.map(|(_, s)| s);
    let left = left.map(|(_, s)| s);
    let Some((side_of_max, value)) = picked else {
        return OverbiteReport {
            value: None,
            side_of_max: None,
            right,
            left,
            category: None,
            detail: "missing".to_string(),
            summary_text: "missing".to_string(),
            quality: Quality::Missing,
        };
    };

    let category = OverbiteCategory::classify(value, params);
    let ratio = match side_of_max {
        Side::Right => right.and_then(|s| s.ratio),
        Side::Left => left.and_then(|s| s.ratio),
    };
    let ratio_text = ratio.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));

    OverbiteReport {
        value: Some(round_to(value, 1)),
        side_of_max: Some(side_of_max),
        right,
        left,
        category: Some(category),
        detail: format!("{category} ({:.1}mm; ratio {ratio_text})", value.abs()),
        summary_text: category.to_string(),
        quality,
    }
}

/// Overbite as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct OverbiteMetric {
    /// Category thresholds.
    pub params: OverbiteParams,
}

impl MetricModule for OverbiteMetric {
    fn key(&self) -> &'static str {
        "Overbite"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_overbite(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
