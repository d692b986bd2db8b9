//! Intermediate state threaded through the cascade stages.

use std::ops::ControlFlow;

use nalgebra::{Point3, Vector3};
use ortho_types::{centroid, LandmarkSet, Pick, Quality, ORTHONORMAL_TOLERANCE};
use tracing::debug;

use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::orthogonalize::{orthogonalize, Triad};
use crate::plane::PlaneEstimate;
use crate::result::{FrameResult, PlaneSource, Provenance};
use crate::selectors::Selectors;

/// Either the state for the next stage or a finished result.
pub(crate) type Step<'a> = ControlFlow<FrameResult, CascadeState<'a>>;

/// Landmarks the cascade anchors on, resolved once.
#[derive(Debug, Clone, Default)]
pub(crate) struct Anchors {
    pub left_molar: Option<Pick>,
    pub right_molar: Option<Pick>,
    pub incisor_11: Option<Pick>,
    pub incisor_21: Option<Pick>,
    pub incisor_31: Option<Pick>,
    pub incisor_41: Option<Pick>,
    pub canine_33: Option<Pick>,
    pub canine_43: Option<Pick>,
}

fn at(pick: Option<&Pick>) -> Option<Point3<f64>> {
    pick.map(|p| p.point)
}

impl Anchors {
    pub fn resolve(landmarks: &LandmarkSet, selectors: &Selectors) -> Self {
        Self {
            left_molar: landmarks.pick(&selectors.left_molar),
            right_molar: landmarks.pick(&selectors.right_molar),
            incisor_11: landmarks.pick(&selectors.incisor_11),
            incisor_21: landmarks.pick(&selectors.incisor_21),
            incisor_31: landmarks.pick(&selectors.incisor_31),
            incisor_41: landmarks.pick(&selectors.incisor_41),
            canine_33: landmarks.pick(&selectors.canine_33),
            canine_43: landmarks.pick(&selectors.canine_43),
        }
    }

    fn all(&self) -> [Option<&Pick>; 8] {
        [
            self.left_molar.as_ref(),
            self.right_molar.as_ref(),
            self.incisor_11.as_ref(),
            self.incisor_21.as_ref(),
            self.incisor_31.as_ref(),
            self.incisor_41.as_ref(),
            self.canine_33.as_ref(),
            self.canine_43.as_ref(),
        ]
    }

    /// Codes of every resolved anchor.
    pub fn resolved_names(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .flatten()
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn left_molar_point(&self) -> Option<Point3<f64>> {
        at(self.left_molar.as_ref())
    }

    pub fn right_molar_point(&self) -> Option<Point3<f64>> {
        at(self.right_molar.as_ref())
    }

    /// Centroid of whichever central incisors resolved.
    pub fn incisors(&self) -> Option<Point3<f64>> {
        centroid([
            at(self.incisor_11.as_ref()),
            at(self.incisor_21.as_ref()),
            at(self.incisor_31.as_ref()),
            at(self.incisor_41.as_ref()),
        ])
    }

    pub fn upper_incisors(&self) -> Option<Point3<f64>> {
        centroid([at(self.incisor_11.as_ref()), at(self.incisor_21.as_ref())])
    }

    pub fn lower_incisors(&self) -> Option<Point3<f64>> {
        centroid([at(self.incisor_31.as_ref()), at(self.incisor_41.as_ref())])
    }

    pub fn canines(&self) -> Option<Point3<f64>> {
        centroid([at(self.canine_33.as_ref()), at(self.canine_43.as_ref())])
    }
}

/// Everything one stage hands to the next.
#[derive(Debug, Clone)]
pub(crate) struct CascadeState<'a> {
    pub landmarks: &'a LandmarkSet,
    pub config: &'a FrameConfig,
    pub geometry: Option<PlaneEstimate>,
    pub anchors: Anchors,
    /// Molar midpoint, `P`.
    pub molar_mid: Option<Point3<f64>>,
    /// Incisal midpoint (or canine proxy), `A`.
    pub incisal_mid: Option<Point3<f64>>,
    pub raw_ex: Option<Vector3<f64>>,
    pub raw_ey: Option<Vector3<f64>>,
    pub axes: Option<Triad>,
    pub origin: Option<Point3<f64>>,
    pub quality: Quality,
    pub warnings: Vec<String>,
    pub used: Provenance,
}

impl<'a> CascadeState<'a> {
    pub fn new(landmarks: &'a LandmarkSet, config: &'a FrameConfig) -> Self {
        Self {
            landmarks,
            config,
            geometry: None,
            anchors: Anchors::default(),
            molar_mid: None,
            incisal_mid: None,
            raw_ex: None,
            raw_ey: None,
            axes: None,
            origin: None,
            quality: Quality::Ok,
            warnings: Vec::new(),
            used: Provenance::default(),
        }
    }

    pub fn eps(&self) -> f64 {
        self.config.tolerances.degeneracy
    }

    /// Record a recoverable problem and lower confidence.
    pub fn fallback(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        debug!(warning = %warning, "Frame fallback");
        self.warnings.push(warning);
        self.quality = self.quality.downgrade();
    }

    /// Stop with no frame.
    pub fn missing(mut self, warning: impl Into<String>) -> FrameResult {
        let warning = warning.into();
        debug!(warning = %warning, "Frame unavailable");
        self.warnings.push(warning);
        FrameResult::missing(self.warnings, self.used)
    }

    /// Stop with the raw geometric frame, or with no frame if there is none.
    pub fn geometry_or_missing(mut self, warning: impl Into<String>) -> FrameResult {
        let warning = warning.into();
        match self.geometry.take() {
            Some(geometry) => {
                debug!(warning = %warning, "Returning geometry frame");
                self.warnings.push(warning);
                self.used.plane = Some(PlaneSource::Geometry);
                FrameResult {
                    frame: Some(geometry.frame),
                    quality: self.quality.downgrade(),
                    warnings: self.warnings,
                    used: self.used,
                }
            }
            None => self.missing(warning),
        }
    }

    /// Replace the axes with a fresh orthogonalization of the given ones.
    pub fn reorthogonalize(
        mut self,
        ex: Vector3<f64>,
        ey: Vector3<f64>,
        ez: Vector3<f64>,
    ) -> Step<'a> {
        match orthogonalize(Some(ex), Some(ey), Some(ez), self.eps()) {
            Some(triad) => {
                self.axes = Some(triad);
                ControlFlow::Continue(self)
            }
            None => ControlFlow::Break(
                self.missing(FrameError::degenerate("failed to orthogonalize axes").to_string()),
            ),
        }
    }

    /// Assemble the final result, refusing anything that is not orthonormal.
    pub fn finish(self) -> FrameResult {
        let (Some(axes), Some(origin)) = (self.axes, self.origin) else {
            return self.missing(FrameError::degenerate("frame incomplete").to_string());
        };
        let frame = axes.at(origin);
        if !frame.is_orthonormal(ORTHONORMAL_TOLERANCE) {
            return self.missing(
                FrameError::degenerate("assembled frame is not orthonormal").to_string(),
            );
        }
        FrameResult {
            frame: Some(frame),
            quality: self.quality,
            warnings: self.warnings,
            used: self.used,
        }
    }
}
