//! Orthodontic measurements in the occlusal frame.
//!
//! Every metric is a pure function of the landmark set and a
//! [`Frame`](ortho_types::Frame): points are projected with
//! [`Frame::to_local`](ortho_types::Frame::to_local), so `x` is
//! anterior-posterior, `y` left-right, and `z` vertical.
//!
//! | Module        | Measures                                  |
//! |---------------|-------------------------------------------|
//! | [`arch_form`] | tapered / ovoid / square upper arch       |
//! | [`arch_width`]| upper vs lower transverse width           |
//! | [`bolton`]    | anterior and overall tooth-size ratios    |
//! | [`canine`]    | canine sagittal relationship              |
//! | [`crossbite`] | posterior scissor bite / lingual crossbite|
//! | [`crowding`]  | anterior arch length discrepancy          |
//! | [`spee`]      | curve of Spee depth                       |
//! | [`midline`]   | dental midline deviation                  |
//! | [`molar`]     | first molar relationship                  |
//! | [`overbite`]  | incisor vertical overlap                  |
//! | [`overjet`]   | incisor sagittal overlap                  |
//!
//! [`make_brief_report`] runs all of them concurrently and renders one
//! line per metric.
//!
//! # Example
//!
//! ```
//! use ortho_frame::{build_frame, FrameConfig};
//! use ortho_metrics::{make_brief_report, BriefReport};
//! use ortho_types::LandmarkSet;
//!
//! let landmarks = LandmarkSet::new();
//! let frame = build_frame(&landmarks, None, &FrameConfig::default());
//! let report = make_brief_report(&landmarks, &frame);
//! assert_eq!(report, BriefReport::Unavailable);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

pub mod arch_form;
pub mod arch_width;
pub mod bolton;
pub mod canine;
mod contract;
pub mod crossbite;
pub mod crowding;
pub mod midline;
pub mod molar;
pub mod overbite;
pub mod overjet;
mod report;
pub mod spee;

pub use contract::{BriefEntry, MetricModule, Side, PASS_MARK, WARN_MARK};
pub use report::{
    brief_entries, make_brief_report, standard_modules, BriefReport, FRAME_UNAVAILABLE,
};
