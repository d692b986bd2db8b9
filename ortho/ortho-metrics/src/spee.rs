//! Depth of the curve of Spee.
//!
//! Works in the sagittal (`x`, `z`) plane. A chord runs from the lower
//! incisal edge to the most distal lower molar cusp; the depth is the
//! largest distance of a premolar or molar cusp below that chord.

use nalgebra::{Point3, Vector2};
use ortho_types::{midpoint, Frame, LandmarkSet, Quality};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::contract::{format_mm, round_to, BriefEntry, MetricModule};

const EPS: f64 = 1e-9;
const BOUND_EPS: f64 = 1e-6;
const VERTICAL_FALLBACK: f64 = 1e-3;

const ANTERIOR_FALLBACK: [&str; 4] = ["31ma", "41ma", "31m", "41m"];
const POSTERIOR: [&str; 8] = [
    "37db", "47db", "37mb", "47mb", "36db", "46db", "36mb", "46mb",
];
const SAMPLES: [&str; 14] = [
    "33m", "34b", "35b", "36mb", "36db", "37mb", "37db", "43m", "44b", "45b", "46mb", "46db",
    "47mb", "47db",
];

/// Result of the curve of Spee measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SpeeReport {
    /// Depth below the chord, millimetres.
    pub depth: Option<f64>,
    /// Code of the distal chord end.
    pub posterior: Option<String>,
    /// Short text for the brief report.
    pub summary_text: String,
    /// Measurement confidence.
    pub quality: Quality,
}

fn sagittal(frame: &Frame, p: &Point3<f64>) -> Vector2<f64> {
    let v = frame.to_local(p);
    Vector2::new(v.x, v.z)
}

/// Depth of the curve of Spee with its distal chord end, or `None` when
/// the chord cannot be formed.
#[must_use]
pub fn spee_depth(landmarks: &LandmarkSet, frame: &Frame) -> Option<(f64, &'static str)> {
    let anterior = match (landmarks.get("31ma"), landmarks.get("41ma")) {
        (Some(a), Some(b)) => midpoint(Some(a), Some(b)),
        _ => landmarks.pick_point(&ANTERIOR_FALLBACK),
    }?;
    let a = sagittal(frame, &anterior);

    let (posterior, b) = POSTERIOR
        .iter()
        .filter_map(|name| landmarks.get(name).map(|p| (*name, sagittal(frame, &p))))
        .fold(None, |best: Option<(&'static str, Vector2<f64>)>, (name, p)| match best {
            Some((_, q)) if q.x <= p.x => best,
            _ => Some((name, p)),
        })?;

    let chord = b - a;
    let length = chord.norm();
    if length < EPS {
        return None;
    }
    let u = chord / length;
    // Normal pointing down, toward -z.
    let mut n = Vector2::new(-u.y, u.x);
    if n.y > 0.0 {
        n = -n;
    }
    let vertical = n.y.abs() < VERTICAL_FALLBACK;
    let (x_min, x_max) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };

    let depth = SAMPLES
        .iter()
        .filter_map(|name| landmarks.get(name))
        .map(|p| sagittal(frame, &p))
        .filter(|p| p.x >= x_min - BOUND_EPS && p.x <= x_max + BOUND_EPS)
        .filter_map(|p| {
            let w = p - a;
            let t = w.dot(&u);
            if t < -BOUND_EPS || t > length + BOUND_EPS {
                return None;
            }
            Some(if vertical {
                a.y + t * u.y - p.y
            } else {
                w.dot(&n)
            })
        })
        .fold(0.0_f64, f64::max);

    Some((depth, posterior))
}

/// Measure the curve of Spee.
#[must_use]
pub fn compute_spee(landmarks: &LandmarkSet, frame: &Frame) -> SpeeReport {
    match spee_depth(landmarks, frame) {
        Some((depth, posterior)) => {
            let depth = round_to(depth, 1);
            SpeeReport {
                depth: Some(depth),
                posterior: Some(posterior.to_string()),
                summary_text: format_mm(depth, 1),
                quality: Quality::Ok,
            }
        }
        None => SpeeReport {
            depth: None,
            posterior: None,
            summary_text: "missing".to_string(),
            quality: Quality::Missing,
        },
    }
}

/// Curve of Spee as a [`MetricModule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeeMetric;

impl MetricModule for SpeeMetric {
    fn key(&self) -> &'static str {
        "Curve_of_Spee"
    }

    fn brief(&self, landmarks: &LandmarkSet, frame: &Frame) -> BriefEntry {
        let report = compute_spee(landmarks, frame);
        BriefEntry::new(self.key(), report.summary_text, report.quality)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(sag: f64) -> LandmarkSet {
        [
            ("31ma", Point3::new(10.0, 1.0, 0.0)),
            ("41ma", Point3::new(10.0, -1.0, 0.0)),
            ("37db", Point3::new(-30.0, 20.0, 0.0)),
            ("47db", Point3::new(-29.0, -20.0, 0.0)),
            ("34b", Point3::new(-5.0, 15.0, -sag)),
            ("35b", Point3::new(-12.0, 16.0, -sag / 2.0)),
            ("44b", Point3::new(-5.0, -15.0, -sag + 0.5)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn depth_below_flat_chord() {
        let report = compute_spee(&curve(2.0), &Frame::identity());
        assert_eq!(report.quality, Quality::Ok);
        assert_relative_eq!(report.depth.unwrap(), 2.0);
        assert_eq!(report.posterior.as_deref(), Some("37db"));
        assert_eq!(report.summary_text, "2mm");
    }

    #[test]
    fn tilted_chord_measures_perpendicular_depth() {
        let mut lm = LandmarkSet::new();
        lm.insert("31m", Point3::new(0.0, 0.0, 0.0));
        lm.insert("36mb", Point3::new(-30.0, 0.0, 30.0));
        lm.insert("34b", Point3::new(-15.0, 0.0, 15.0 - 2.0f64.sqrt() * 2.0));
        let (depth, posterior) = spee_depth(&lm, &Frame::identity()).unwrap();
        assert_eq!(posterior, "36mb");
        assert_relative_eq!(depth, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn points_above_chord_give_zero() {
        let report = compute_spee(&curve(-1.0), &Frame::identity());
        assert_relative_eq!(report.depth.unwrap(), 0.0);
        assert_eq!(report.summary_text, "0mm");
    }

    #[test]
    fn outside_chord_is_ignored() {
        let mut lm = curve(0.0);
        lm.insert("33m", Point3::new(20.0, 10.0, -5.0));
        assert_relative_eq!(compute_spee(&lm, &Frame::identity()).depth.unwrap(), 0.0);
    }

    #[test]
    fn missing_endpoints() {
        let mut lm = curve(2.0);
        for code in POSTERIOR {
            lm.remove(code);
        }
        let report = compute_spee(&lm, &Frame::identity());
        assert_eq!(report.quality, Quality::Missing);
        assert!(report.depth.is_none());
        assert!(spee_depth(&LandmarkSet::new(), &Frame::identity()).is_none());
    }
}
