//! `ortho`: occlusal analysis from landmark and scan files.
//!
//! ```text
//! ortho --upper-json upper.json --lower-json lower.json \
//!       --upper-stl upper.stl --lower-stl lower.stl --out brief.json
//! ```
//!
//! Writes the brief report as an ordered JSON object, or
//! `{"error": "coordinate frame unavailable"}` when no frame could be built.
//! With `--frame` the frame diagnostic is written instead.

mod analyze;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ortho_frame::FrameConfig;
use tracing::info;

use crate::analyze::{analyze, load_config, Inputs};

/// Orthodontic metrics in the occlusal reference frame.
#[derive(Parser)]
#[command(name = "ortho")]
#[command(about = "Landmarks and dental scans in, brief orthodontic report out", long_about = None)]
#[command(version)]
struct Cli {
    /// Upper arch landmarks (Slicer markups or `{code: [x, y, z]}` JSON).
    #[arg(long)]
    upper_json: PathBuf,

    /// Lower arch landmarks.
    #[arg(long)]
    lower_json: PathBuf,

    /// Upper arch scan, registered with the landmarks.
    #[arg(long)]
    upper_stl: Option<PathBuf>,

    /// Lower arch scan, registered with the landmarks.
    #[arg(long)]
    lower_stl: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frame configuration JSON. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for point cloud subsampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Subsample the combined cloud to at most this many points.
    #[arg(long)]
    max_points: Option<usize>,

    /// Fraction of points kept for the refined plane fit (clamped to 0.2..=0.9).
    #[arg(long)]
    trim_fraction: Option<f64>,

    /// Write the frame diagnostic instead of the brief report.
    #[arg(long)]
    frame: bool,
}

impl Cli {
    fn inputs(&self) -> Inputs {
        Inputs {
            upper_json: self.upper_json.clone(),
            lower_json: self.lower_json.clone(),
            upper_stl: self.upper_stl.clone(),
            lower_stl: self.lower_stl.clone(),
        }
    }

    fn frame_config(&self) -> Result<FrameConfig> {
        let config = load_config(self.config.as_deref())?;
        let mut plane = config.plane.clone();
        if let Some(seed) = self.seed {
            plane = plane.with_seed(seed);
        }
        if let Some(n) = self.max_points {
            plane = plane.with_max_points(n);
        }
        if let Some(fraction) = self.trim_fraction {
            plane = plane.with_trim_fraction(fraction);
        }
        Ok(config.with_plane(plane))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.frame_config()?;
    let analysis = analyze(&cli.inputs(), &config)?;

    let json = if cli.frame {
        serde_json::to_string_pretty(&analysis.frame)?
    } else {
        serde_json::to_string_pretty(&analysis.report.to_json())?
    };

    match &cli.out {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            let entries = analysis.report.entries().len();
            info!(path = %path.display(), entries, "Report saved");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ortho",
            "--upper-json",
            "u.json",
            "--lower-json",
            "l.json",
            "--seed",
            "42",
            "--max-points",
            "2000",
            "--trim-fraction",
            "0.4",
        ]);
        let config = cli.frame_config().unwrap();
        assert_eq!(config.plane.seed, Some(42));
        assert_eq!(config.plane.max_points, 2000);
        assert!((config.plane.trim_fraction - 0.4).abs() < f64::EPSILON);
        assert!(!cli.frame);
        assert!(cli.upper_stl.is_none());
    }

    #[test]
    fn flags_keep_config_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");
        fs::write(&path, r#"{"plane": {"seed": 3, "min_retained": 40}}"#).unwrap();
        let path = path.to_str().unwrap();
        let cli = Cli::parse_from([
            "ortho",
            "--upper-json",
            "u.json",
            "--lower-json",
            "l.json",
            "--config",
            path,
            "--max-points",
            "900",
        ]);
        let config = cli.frame_config().unwrap();
        assert_eq!(config.plane.seed, Some(3));
        assert_eq!(config.plane.min_retained, 40);
        assert_eq!(config.plane.max_points, 900);
    }

    #[test]
    fn landmark_files_are_required() {
        assert!(Cli::try_parse_from(["ortho", "--upper-json", "u.json"]).is_err());
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
