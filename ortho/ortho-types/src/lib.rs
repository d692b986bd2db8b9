//! Core types for occlusal analysis.
//!
//! This crate provides the shared vocabulary of the `ortho-*` crates:
//!
//! - [`LandmarkSet`] - Named anatomical landmarks with priority-ordered lookup
//! - [`Pick`] - A landmark resolved from a candidate list, with its code
//! - [`Frame`] - A right-handed orthonormal occlusal coordinate frame
//! - [`Quality`] - Confidence flag carried by frames and measurements
//!
//! # Units
//!
//! Coordinates are `f64` in scan space. Clinical thresholds in downstream
//! crates assume millimeters.
//!
//! # Coordinate System
//!
//! Frames use a **right-handed** convention:
//! - X: anterior (molars toward incisors)
//! - Y: patient right toward patient left
//! - Z: mandible toward maxilla
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for all public types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod frame;
mod landmark;
mod quality;

pub use frame::{project_onto_plane, Frame, ORTHONORMAL_TOLERANCE};
pub use landmark::{centroid, midpoint, LandmarkSet, Pick};
pub use quality::Quality;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
