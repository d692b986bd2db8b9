//! Posterior transverse locking: scissor bite and lingual crossbite.
//!
//! Per side, the buccal and lingual cusps of the upper and lower premolars
//! and molars are averaged laterally. Means are reported in raw local `y`
//! (patient left positive); comparisons flip the right side so that
//! "outward" is positive on both sides.
//!
//! - Scissor bite: the upper lingual cusps sit outside the lower buccal cusps.
//! - Lingual crossbite: the lower lingual cusps sit outside the upper buccal cusps.

use std::fmt;

use ortho_types::{Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{round_to, BriefEntry, MetricModule, Side};

const BUCCAL: [&str; 4] = ["mb", "db", "b", "bg"];
const LINGUAL: [&str; 4] = ["ml", "dl", "l", "lgb"];

/// Thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CrossbiteParams {
    /// Outward margin, millimetres, beyond which a side is locked.
    pub threshold: f64,
    /// Minimum opposing cusp pairs needed to judge a side.
    pub min_pairs: usize,
}

impl Default for CrossbiteParams {
    fn default() -> Self {
        Self {
            threshold: 1.5,
            min_pairs: 2,
        }
    }
}

impl CrossbiteParams {
    /// Default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lock threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the minimum pair count.
    #[must_use]
    pub const fn with_min_pairs(mut self, min_pairs: usize) -> Self {
        self.min_pairs = min_pairs;
        self
    }
}

/// One side's finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CrossbiteStatus {
    /// No locking.
    Clear,
    /// Upper lingual cusps outside lower buccal cusps.
    ScissorBite,
    /// Lower lingual cusps outside upper buccal cusps.
    LingualCrossbite,
    /// Too few cusps to judge.
    Missing,
}

impl fmt::Display for CrossbiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clear => "none",
            Self::ScissorBite => "scissor bite",
            Self::LingualCrossbite => "lingual crossbite",
            Self::Missing => "missing",
        })
    }
}

/// Mean local `y` of one side's cusp groups, millimetres. Right-side values
/// are normally negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CuspMeans {
    /// Upper lingual.
    pub upper_lingual: Option<f64>,
    /// Upper buccal.
    pub upper_buccal: Option<f64>,
    /// Lower lingual.
    pub lower_lingual: Option<f64>,
    /// Lower buccal.
    pub lower_buccal: Option<f64>,
}

/// One side's measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CrossbiteSide {
    /// Finding.
    pub status: CrossbiteStatus,
    /// Outward margin of the decisive comparison, when locked.
    pub margin: Option<f64>,
    /// Cusp pairs available for the scissor comparison.
    pub scissor_pairs: usize,
    /// Cusp pairs available for the crossbite comparison.
    pub cross_pairs: usize,
    /// Group means.
    pub means: CuspMeans,
    /// Landmark codes that contributed.
    pub used: Vec<String>,
}

/// Result of the crossbite assessment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CrossbiteReport {
    /// Patient right.
    pub right: CrossbiteSide,
    /// Patient left.
    pub left: CrossbiteSide,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

#[derive(Default)]
struct Group {
    values: Vec<f64>,
}

impl Group {
    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> Option<f64> {
        let n = self.values.len();
        (n > 0).then(|| self.values.iter().sum::<f64>() / n as f64)
    }
}

fn collect_arch(
    landmarks: &LandmarkSet,
    frame: &Frame,
    teeth: [&str; 4],
    used: &mut Vec<String>,
) -> (Group, Group) {
    let mut lingual = Group::default();
    let mut buccal = Group::default();
    for tooth in teeth {
        for (suffixes, group) in [(&LINGUAL, &mut lingual), (&BUCCAL, &mut buccal)] {
            let found = suffixes.iter().find_map(|suffix| {
                let code = format!("{tooth}{suffix}");
                landmarks.get(&code).map(|p| (code, p))
            });
            if let Some((code, p)) = found {
                group.values.push(frame.to_local(&p).y);
                used.push(code);
            }
        }
    }
    (lingual, buccal)
}

fn side(
    landmarks: &LandmarkSet,
    frame: &Frame,
    which: Side,
    params: &CrossbiteParams,
) -> CrossbiteSide {
    // Patient right is -y; flip its comparisons so outward is positive.
    let (upper, lower, sign) = match which {
        Side::Right => (["14", "15", "16", "17"], ["44", "45", "46", "47"], -1.0),
        Side::Left => (["24", "25", "26", "27"], ["34", "35", "36", "37"], 1.0),
    };
    let mut used = Vec::new();
    let (ul, ub) = collect_arch(landmarks, frame, upper, &mut used);
    let (ll, lb) = collect_arch(landmarks, frame, lower, &mut used);

    let scissor_pairs = ul.values.len().min(lb.values.len());
    let cross_pairs = ub.values.len().min(ll.values.len());
    let means = CuspMeans {
        upper_lingual: ul.mean().map(|v| round_to(v, 2)),
        upper_buccal: ub.mean().map(|v| round_to(v, 2)),
        lower_lingual: ll.mean().map(|v| round_to(v, 2)),
        lower_buccal: lb.mean().map(|v| round_to(v, 2)),
    };

    let scissor = (scissor_pairs >= params.min_pairs)
        .then(|| ul.mean().zip(lb.mean()).map(|(u, l)| sign * (u - l)))
        .flatten();
    let cross = (cross_pairs >= params.min_pairs)
        .then(|| ll.mean().zip(ub.mean()).map(|(l, u)| sign * (l - u)))
        .flatten();

    let (status, margin) = match (scissor, cross) {
        (Some(m), _) if m > params.threshold => (CrossbiteStatus::ScissorBite, Some(m)),
        (_, Some(m)) if m > params.threshold => (CrossbiteStatus::LingualCrossbite, Some(m)),
        (None, None) => (CrossbiteStatus::Missing, None),
        _ => (CrossbiteStatus::Clear, None),
    };

    CrossbiteSide {
        status,
        margin: margin.map(|m| round_to(m, 2)),
        scissor_pairs,
        cross_pairs,
        means,
        used,
    }
}

/// Assess both posterior segments for transverse locking.
#[must_use]
pub fn compute_crossbite(
    landmarks: &LandmarkSet,
    frame: &Frame,
    params: &CrossbiteParams,
) -> CrossbiteReport {
    let right = side(landmarks, frame, Side::Right, params);
    let left = side(landmarks, frame, Side::Left, params);

    let sides = [(Side::Right, &right), (Side::Left, &left)];
    let missing = sides
        .iter()
        .filter(|(_, s)| s.status == CrossbiteStatus::Missing)
        .count();
    let findings: Vec<String> = sides
        .iter()
        .filter(|(_, s)| {
            matches!(
                s.status,
                CrossbiteStatus::ScissorBite | CrossbiteStatus::LingualCrossbite
            )
        })
        .map(|(side, s)| format!("{side} {}", s.status))
        .collect();

    let (summary_text, quality) = match missing {
        2 => ("missing".to_string(), Quality::Missing),
        1 => (
            if findings.is_empty() {
                "none".to_string()
            } else {
                findings.join(", ")
            },
            Quality::Fallback,
        ),
        _ if findings.is_empty() => ("none".to_string(), Quality::Ok),
        _ => (findings.join(", "), Quality::Ok),
    };

    CrossbiteReport {
        right,
        left,
        summary_text,
        quality,
    }
}

/// Crossbite assessment as a [`MetricModule`].
#[derive(Debug, Clone, Default)]
pub struct CrossbiteMetric {
    /// Thresholds.
    pub params: CrossbiteParams,
}

impl MetricModule for CrossbiteMetric {
    fn key(&self) -> &'static str {
        "Crossbite"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_crossbite(landmarks, frame, &self.params);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}
