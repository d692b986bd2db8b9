//! Occlusal reference frame construction.
//!
//! Turns sparse, partially missing dental landmarks and an optional scan
//! point cloud into one right-handed orthonormal coordinate frame that all
//! clinical measurements are expressed in:
//!
//! - Trimmed two-pass PCA estimation of the occlusal plane
//! - Gram-Schmidt completion of approximate axes
//! - A staged cascade that degrades gracefully when inputs are missing,
//!   then fixes the sign of every axis from anatomy
//!
//! The builder never fails. A missing frame is reported as
//! [`Quality::Missing`](ortho_types::Quality::Missing) with warnings that say why.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use ortho_frame::{build_frame, FrameConfig};
//! use ortho_types::{LandmarkSet, Quality};
//!
//! let landmarks = LandmarkSet::new();
//! let result = build_frame(&landmarks, None, &FrameConfig::default());
//! assert_eq!(result.quality, Quality::Missing);
//! assert!(result.frame.is_none());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod cascade;
mod config;
mod error;
mod orthogonalize;
mod pca;
mod plane;
mod result;
mod selectors;

pub use cascade::{build_frame, build_frame_with_rng};
pub use config::{FrameConfig, PlaneConfig, Tolerances};
pub use error::{BuildResult, FrameError};
pub use orthogonalize::{orthogonalize, Triad};
pub use pca::{pca_from_points, PcaResult};
pub use plane::{estimate_plane, estimate_plane_with_rng, PlaneEstimate, PlaneStats};
pub use result::{FrameResult, PlaneSource, Provenance};
pub use selectors::Selectors;
