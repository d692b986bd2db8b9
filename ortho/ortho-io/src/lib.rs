//! Input loading for occlusal analysis.
//!
//! - **Landmarks**: 3D Slicer markups JSON or a plain `{code: [x, y, z]}`
//!   object, merged across files with later files winning
//! - **Scans**: binary or ASCII STL, reduced to finite vertex positions and
//!   concatenated across arches
//!
//! # Example
//!
//! ```no_run
//! use ortho_io::{combine_point_clouds, load_landmarks, load_stl_points, merge_landmarks};
//!
//! let landmarks = merge_landmarks([
//!     load_landmarks("upper.json").unwrap(),
//!     load_landmarks("lower.json").unwrap(),
//! ]);
//! let cloud = combine_point_clouds([
//!     Some(load_stl_points("upper.stl").unwrap()),
//!     Some(load_stl_points("lower.stl").unwrap()),
//! ]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod landmarks;
mod stl;

pub use error::{IoError, IoResult};
pub use landmarks::{load_landmarks, merge_landmarks, parse_landmarks, read_landmarks};
pub use stl::{combine_point_clouds, load_stl_points, read_stl_points};
