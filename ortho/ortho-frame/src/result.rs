//! Output of the frame builder.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ortho_types::{Frame, Quality};

use crate::plane::PlaneStats;

/// Where the occlusal plane normal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlaneSource {
    /// Trimmed PCA of the scan point cloud.
    Geometry,
    /// Cross product of the landmark-derived sagittal and transverse axes.
    Landmarks,
}

/// How each part of the frame was obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Provenance {
    /// Source of the plane normal.
    pub plane: Option<PlaneSource>,
    /// What fixed the sign of `ez`.
    pub z_from: Option<String>,
    /// What fixed the sign of `ey`.
    pub y_from: Option<String>,
    /// What refined `ex`.
    pub x_from: Option<String>,
    /// Codes of every landmark that resolved.
    pub landmarks: Vec<String>,
    /// Point counts of the geometric fit, if one ran.
    pub geometry: Option<PlaneStats>,
}

/// The frame together with its confidence and diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameResult {
    /// The frame, absent when `quality` is [`Quality::Missing`].
    pub frame: Option<Frame>,
    /// Overall confidence.
    pub quality: Quality,
    /// Human-readable notes, in the order they arose.
    pub warnings: Vec<String>,
    /// Provenance of each axis.
    pub used: Provenance,
}

impl FrameResult {
    /// A result with no frame.
    #[must_use]
    pub fn missing(warnings: Vec<String>, used: Provenance) -> Self {
        Self {
            frame: None,
            quality: Quality::Missing,
            warnings,
            used,
        }
    }

    /// The frame, if metrics may be computed against it.
    #[must_use]
    pub fn usable_frame(&self) -> Option<&Frame> {
        self.frame.as_ref().filter(|_| self.quality.is_usable())
    }
}
