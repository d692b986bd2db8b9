//! Occlusal frame assembly.
//!
//! The frame is built by a fixed chain of stages:
//!
//! | Stage | Purpose |
//! |---|---|
//! | S0 | Occlusal plane from the point cloud (optional) |
//! | S1 | Resolve anchors, require both first molars |
//! | S2 | Raw sagittal/transverse directions, colinearity guard |
//! | S3 | Orthonormal axes, geometric normal authoritative |
//! | S4 | `ez` toward the maxilla (incisors) |
//! | S5 | `ey` toward the patient's left (lower canines) |
//! | S6 | `ex` along the in-plane molar-to-incisor direction |
//! | S7 | Origin if still unset |
//!
//! Any stage may stop the chain. Skipped refinements lower the quality to
//! [`Quality::Fallback`](ortho_types::Quality::Fallback) and add a warning.

mod stages;
mod state;

use std::ops::ControlFlow;

use nalgebra::Point3;
use ortho_types::LandmarkSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::FrameConfig;
use crate::result::FrameResult;

use state::{CascadeState, Step};

type Stage = for<'a> fn(CascadeState<'a>) -> Step<'a>;

const STAGES: [(&str, Stage); 7] = [
    ("transverse landmarks", stages::transverse_landmarks),
    ("sagittal seed", stages::sagittal_seed),
    ("orthogonalize", stages::orthogonalize_axes),
    ("vertical polarity", stages::vertical_polarity),
    ("transverse polarity", stages::transverse_polarity),
    ("sagittal refinement", stages::sagittal_refinement),
    ("origin", stages::origin_resolution),
];

/// Build the occlusal frame for one case.
///
/// Subsampling of large clouds is seeded from `config.plane.seed` when set.
/// Never fails: problems are reported through
/// [`FrameResult::quality`] and [`FrameResult::warnings`].
///
/// # Example
///
/// ```
/// use ortho_frame::{build_frame, FrameConfig};
/// use ortho_types::{LandmarkSet, Point3, Quality};
///
/// let landmarks: LandmarkSet = [
///     ("26mb", Point3::new(-20.0, 22.0, 0.0)),
///     ("16mb", Point3::new(-20.0, -22.0, 0.0)),
///     ("11m", Point3::new(10.0, -2.0, 1.0)),
///     ("21m", Point3::new(10.0, 2.0, 1.0)),
///     ("31m", Point3::new(9.0, 2.0, -1.0)),
///     ("41m", Point3::new(9.0, -2.0, -1.0)),
///     ("33m", Point3::new(5.0, 12.0, -1.0)),
///     ("43m", Point3::new(5.0, -12.0, -1.0)),
/// ]
/// .into_iter()
/// .collect();
///
/// // No point cloud: landmarks alone give a usable, lower-confidence frame
/// let result = build_frame(&landmarks, None, &FrameConfig::default());
/// assert_eq!(result.quality, Quality::Fallback);
/// assert!(result.frame.is_some_and(|f| f.ez.z > 0.99));
/// ```
#[must_use]
pub fn build_frame(
    landmarks: &LandmarkSet,
    cloud: Option<&[Point3<f64>]>,
    config: &FrameConfig,
) -> FrameResult {
    if let Some(seed) = config.plane.seed {
        build_frame_with_rng(landmarks, cloud, config, &mut StdRng::seed_from_u64(seed))
    } else {
        build_frame_with_rng(landmarks, cloud, config, &mut rand::thread_rng())
    }
}

/// Build the occlusal frame, drawing subsampling randomness from `rng`.
///
/// `config.plane.seed` is ignored.
#[must_use]
pub fn build_frame_with_rng<R: Rng + ?Sized>(
    landmarks: &LandmarkSet,
    cloud: Option<&[Point3<f64>]>,
    config: &FrameConfig,
    rng: &mut R,
) -> FrameResult {
    info!(
        landmarks = landmarks.len(),
        cloud_points = cloud.map_or(0, <[Point3<f64>]>::len),
        "Building occlusal frame"
    );

    let mut state = stages::geometry_base(CascadeState::new(landmarks, config), cloud, rng);
    for (name, stage) in STAGES {
        state = match stage(state) {
            ControlFlow::Continue(next) => next,
            ControlFlow::Break(result) => {
                debug!(stage = name, "Frame cascade stopped early");
                return report(result);
            }
        };
    }
    report(state.finish())
}

fn report(result: FrameResult) -> FrameResult {
    info!(
        quality = %result.quality,
        warnings = result.warnings.len(),
        plane = ?result.used.plane,
        "Occlusal frame built"
    );
    result
}
