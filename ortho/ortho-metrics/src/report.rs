//! Brief report over all metric modules.

use ortho_frame::FrameResult;
use ortho_types::{Frame, LandmarkSet, Quality};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::arch_form::ArchFormMetric;
use crate::arch_width::ArchWidthMetric;
use crate::bolton::BoltonMetric;
use crate::canine::CanineMetric;
use crate::contract::{BriefEntry, MetricModule};
use crate::crossbite::CrossbiteMetric;
use crate::crowding::CrowdingMetric;
use crate::midline::MidlineMetric;
use crate::molar::MolarMetric;
use crate::overbite::OverbiteMetric;
use crate::overjet::OverjetMetric;
use crate::spee::SpeeMetric;

/// Diagnostic emitted instead of a report when there is no frame.
pub const FRAME_UNAVAILABLE: &str = "coordinate frame unavailable";

/// The eleven standard modules with default parameters, in report order.
#[must_use]
pub fn standard_modules() -> Vec<Box<dyn MetricModule>> {
    vec![
        Box::new(ArchFormMetric::default()),
        Box::new(ArchWidthMetric::default()),
        Box::new(BoltonMetric::default()),
        Box::new(CanineMetric::default()),
        Box::new(CrossbiteMetric::default()),
        Box::new(CrowdingMetric::default()),
        Box::new(SpeeMetric),
        Box::new(MidlineMetric::default()),
        Box::new(MolarMetric::default()),
        Box::new(OverbiteMetric::default()),
        Box::new(OverjetMetric::default()),
    ]
}

/// Evaluate `modules` concurrently. Entries keep the modules' order.
#[must_use]
pub fn brief_entries(
    landmarks: &LandmarkSet,
    frame: &Frame,
    modules: &[Box<dyn MetricModule>],
) -> Vec<BriefEntry> {
    modules
        .par_iter()
        .map(|module| {
            let entry = module.brief(landmarks, frame);
            debug!(
                key = entry.key,
                quality = %entry.quality,
                value = %entry.value,
                "metric evaluated"
            );
            entry
        })
        .collect()
}

/// The brief report, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefReport {
    /// One entry per module, in module order.
    Entries(Vec<BriefEntry>),
    /// The frame was missing; no metric was computed.
    Unavailable,
}

impl BriefReport {
    /// Run `modules` against the frame in `frame_result`.
    #[must_use]
    pub fn build(
        landmarks: &LandmarkSet,
        frame_result: &FrameResult,
        modules: &[Box<dyn MetricModule>],
    ) -> Self {
        let Some(frame) = frame_result.usable_frame() else {
            info!(quality = %frame_result.quality, "no frame, skipping metrics");
            return Self::Unavailable;
        };
        let entries = brief_entries(landmarks, frame, modules);
        let missing = entries
            .iter()
            .filter(|e| e.quality == Quality::Missing)
            .count();
        info!(
            metrics = entries.len(),
            missing,
            frame_quality = %frame_result.quality,
            "brief report complete"
        );
        Self::Entries(entries)
    }

    /// Entries, empty when unavailable.
    #[must_use]
    pub fn entries(&self) -> &[BriefEntry] {
        match self {
            Self::Entries(entries) => entries,
            Self::Unavailable => &[],
        }
    }

    /// `key: value marker` lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Entries(entries) => entries
                .iter()
                .map(|e| format!("{}: {}", e.key, e.rendered()))
                .collect(),
            Self::Unavailable => vec![format!("error: {FRAME_UNAVAILABLE}")],
        }
    }

    /// Ordered JSON object `{key: "value marker"}`, or the error object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Entries(entries) => {
                for entry in entries {
                    map.insert(entry.key.to_string(), Value::String(entry.rendered()));
                }
            }
            Self::Unavailable => {
                map.insert("error".to_string(), Value::String(FRAME_UNAVAILABLE.to_string()));
            }
        }
        Value::Object(map)
    }
}

/// Brief report with the standard modules.
#[must_use]
pub fn make_brief_report(landmarks: &LandmarkSet, frame_result: &FrameResult) -> BriefReport {
    BriefReport::build(landmarks, frame_result, &standard_modules())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ortho_frame::Provenance;

    fn with_frame(frame: Option<Frame>, quality: Quality) -> FrameResult {
        FrameResult {
            frame,
            quality,
            warnings: Vec::new(),
            used: Provenance::default(),
        }
    }

    #[test]
    fn standard_order() {
        let keys: Vec<_> = standard_modules().iter().map(|m| m.key()).collect();
        assert_eq!(
            keys,
            [
                "Arch_Form",
                "Arch_Width",
                "Bolton_Ratio",
                "Canine_Relationship",
                "Crossbite",
                "Crowding",
                "Curve_of_Spee",
                "Midline_Alignment",
                "Molar_Relationship",
                "Overbite",
                "Overjet",
            ]
        );
    }

    #[test]
    fn missing_frame_is_unavailable() {
        let missing = FrameResult::missing(Vec::new(), Provenance::default());
        let report = make_brief_report(&LandmarkSet::new(), &missing);
        assert_eq!(report, BriefReport::Unavailable);
        assert!(report.entries().is_empty());
        assert_eq!(report.to_json(), serde_json::json!({"error": FRAME_UNAVAILABLE}));
    }

    #[test]
    fn empty_landmarks_warn_everywhere() {
        let frame = with_frame(Some(Frame::identity()), Quality::Fallback);
        let report = make_brief_report(&LandmarkSet::new(), &frame);
        assert_eq!(report.entries().len(), 11);
        assert!(report.entries().iter().all(|e| !e.passed()));

        let json = report.to_json();
        let object = json.as_object().unwrap();
        assert_eq!(object.keys().next().map(String::as_str), Some("Arch_Form"));
        assert_eq!(object["Overjet"], "missing ⚠️");
        assert_eq!(report.lines()[6], "Curve_of_Spee: missing ⚠️");
    }
}
