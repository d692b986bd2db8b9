//! File-to-report pipeline behind the `ortho` binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nalgebra::Point3;
use ortho_frame::{build_frame, FrameConfig, FrameResult};
use ortho_io::{combine_point_clouds, load_landmarks, load_stl_points, merge_landmarks};
use ortho_metrics::{make_brief_report, BriefReport};
use tracing::{info, warn};

/// Input files for one case.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub upper_json: PathBuf,
    pub lower_json: PathBuf,
    pub upper_stl: Option<PathBuf>,
    pub lower_stl: Option<PathBuf>,
}

/// Frame and report for one case.
#[derive(Debug)]
pub struct Analysis {
    pub frame: FrameResult,
    pub report: BriefReport,
}

/// Read a JSON frame configuration. Absent fields keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<FrameConfig> {
    let Some(path) = path else {
        return Ok(FrameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_cloud(path: Option<&Path>) -> Result<Option<Vec<Point3<f64>>>> {
    path.map(|p| load_stl_points(p).with_context(|| format!("loading scan {}", p.display())))
        .transpose()
}

/// Load every input, build the frame, and run the metrics.
pub fn analyze(inputs: &Inputs, config: &FrameConfig) -> Result<Analysis> {
    let landmarks = merge_landmarks([
        load_landmarks(&inputs.upper_json)
            .with_context(|| format!("loading landmarks {}", inputs.upper_json.display()))?,
        load_landmarks(&inputs.lower_json)
            .with_context(|| format!("loading landmarks {}", inputs.lower_json.display()))?,
    ]);
    let cloud = combine_point_clouds([
        load_cloud(inputs.upper_stl.as_deref())?,
        load_cloud(inputs.lower_stl.as_deref())?,
    ]);
    info!(
        landmarks = landmarks.len(),
        cloud_points = cloud.as_ref().map_or(0, Vec::len),
        "Inputs loaded"
    );

    let frame = build_frame(&landmarks, cloud.as_deref(), config);
    for warning in &frame.warnings {
        warn!("{warning}");
    }
    let report = make_brief_report(&landmarks, &frame);
    Ok(Analysis { frame, report })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ortho_types::Quality;
    use tempfile::tempdir;

    const UPPER: &str = r#"{"markups": [{"controlPoints": [
        {"label": "16mb", "position": [-20.0, -22.0, 0.0]},
        {"label": "26mb", "position": [-20.0, 22.0, 0.0]},
        {"label": "11m", "position": [10.0, -2.0, 1.0]},
        {"label": "21m", "position": [10.0, 2.0, 1.0]}
    ]}]}"#;
    const LOWER: &str = r#"{
        "46mb": [-23.0, -20.0, -1.0],
        "36mb": [-23.0, 20.0, -1.0],
        "41m": [9.0, -2.0, -1.0],
        "31m": [9.0, 2.0, -1.0]
    }"#;

    fn case(dir: &Path) -> Inputs {
        let upper_json = dir.join("upper.json");
        let lower_json = dir.join("lower.json");
        fs::write(&upper_json, UPPER).unwrap();
        fs::write(&lower_json, LOWER).unwrap();
        Inputs {
            upper_json,
            lower_json,
            upper_stl: None,
            lower_stl: None,
        }
    }

    #[test]
    fn landmarks_only_case() {
        let dir = tempdir().unwrap();
        let analysis = analyze(&case(dir.path()), &FrameConfig::default()).unwrap();
        assert_eq!(analysis.frame.quality, Quality::Fallback);
        assert_eq!(analysis.report.entries().len(), 11);
    }

    #[test]
    fn missing_scan_names_the_file() {
        let dir = tempdir().unwrap();
        let mut inputs = case(dir.path());
        inputs.lower_stl = Some(dir.path().join("lower.stl"));
        let err = analyze(&inputs, &FrameConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("lower.stl"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.json");
        fs::write(&path, r#"{"plane": {"trim_fraction": 0.3, "seed": 7}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.plane.seed, Some(7));
        assert_eq!(config.plane.min_points, 50);
        assert_eq!(config.tolerances, FrameConfig::default().tolerances);
    }

    #[test]
    fn no_config_is_default() {
        assert_eq!(load_config(None).unwrap(), FrameConfig::default());
    }
}
