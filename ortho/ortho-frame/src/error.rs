//! Error types for frame construction.
//!
//! The frame builder itself never returns these: each failure is folded
//! into the result's quality flag and its `Display` text becomes a warning.
//! Lower-level entry points such as [`estimate_plane`](crate::estimate_plane)
//! return them directly.

use thiserror::Error;

/// Result type for frame construction steps.
pub type BuildResult<T> = Result<T, FrameError>;

/// Reasons a frame (or part of one) could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Point cloud is absent or too small for plane estimation.
    #[error("insufficient point cloud: need at least {required} points, got {actual}")]
    InsufficientPointCloud {
        /// Minimum number of finite points required.
        required: usize,
        /// Number of finite points provided.
        actual: usize,
    },

    /// An axis could not be normalized or two axes were nearly parallel.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What degenerated.
        reason: String,
    },

    /// Required anatomical landmarks were missing or non-finite.
    #[error("insufficient landmarks: {what}")]
    InsufficientLandmarks {
        /// Which landmark groups could not be resolved.
        what: String,
    },
}

impl FrameError {
    /// Create a `DegenerateGeometry` error with the given reason.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    /// Create an `InsufficientLandmarks` error describing what is missing.
    #[must_use]
    pub fn landmarks(what: impl Into<String>) -> Self {
        Self::InsufficientLandmarks { what: what.into() }
    }
}
