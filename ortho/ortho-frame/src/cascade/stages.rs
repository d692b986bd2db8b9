//! The individual cascade stages.
//!
//! Every stage after the geometry base takes the state by value and either
//! hands it on or stops the cascade with a finished [`FrameResult`].

use std::ops::ControlFlow::{Break, Continue};

use nalgebra::Point3;
use ortho_types::{midpoint, project_onto_plane};
use rand::Rng;

use super::state::{Anchors, CascadeState, Step};
use crate::error::FrameError;
use crate::orthogonalize::orthogonalize;
use crate::plane::estimate_plane_with_rng;
use crate::result::{FrameResult, PlaneSource};

const Z_FROM_INCISORS: &str = "incisors(upper - lower)";
const Y_FROM_CANINES: &str = "canines(33→43)";
const X_FROM_MIDPOINTS: &str = "A(mid incisors) - P(mid molars)";

fn axes_not_established(state: CascadeState<'_>) -> FrameResult {
    state.missing(FrameError::degenerate("axes not established").to_string())
}

/// S0: fit the occlusal plane to the point cloud if there is one.
pub(crate) fn geometry_base<'a, R: Rng + ?Sized>(
    mut state: CascadeState<'a>,
    cloud: Option<&[Point3<f64>]>,
    rng: &mut R,
) -> CascadeState<'a> {
    let config = state.config;
    let estimate = match cloud {
        Some(points) => {
            estimate_plane_with_rng(points, &config.plane, &config.tolerances, rng)
        }
        None => Err(FrameError::InsufficientPointCloud {
            required: config.plane.min_points,
            actual: 0,
        }),
    };

    match estimate {
        Ok(estimate) => {
            state.origin = Some(estimate.frame.origin);
            state.warnings.extend(estimate.warnings.iter().cloned());
            state.used.plane = Some(PlaneSource::Geometry);
            state.used.geometry = Some(estimate.stats);
            state.geometry = Some(estimate);
        }
        Err(err) => {
            state.fallback(format!(
                "geometry plane unavailable ({err}); using landmarks only"
            ));
        }
    }
    state
}

fn describe(label: &str, candidates: &[String]) -> String {
    format!("{label} ({})", candidates.join("|"))
}

/// S1: resolve anchors and require both first molars.
pub(crate) fn transverse_landmarks(mut state: CascadeState<'_>) -> Step<'_> {
    let config = state.config;
    let selectors = &config.selectors;
    state.anchors = Anchors::resolve(state.landmarks, selectors);
    state.used.landmarks = state.anchors.resolved_names();

    let mut unresolved = Vec::new();
    if state.anchors.left_molar.is_none() {
        unresolved.push(describe("left first molar", &selectors.left_molar));
    }
    if state.anchors.right_molar.is_none() {
        unresolved.push(describe("right first molar", &selectors.right_molar));
    }
    if unresolved.is_empty() {
        return Continue(state);
    }

    let err = FrameError::landmarks(format!(
        "{} unresolved; missing left/right molars for transverse axis",
        unresolved.join(" and ")
    ));
    if state.geometry.is_some() {
        Break(state.geometry_or_missing(format!("{err}; returned geometry frame")))
    } else {
        Break(state.missing(err.to_string()))
    }
}

/// S2: raw sagittal and transverse directions from landmark midpoints.
pub(crate) fn sagittal_seed(mut state: CascadeState<'_>) -> Step<'_> {
    let eps = state.eps();
    let left = state.anchors.left_molar_point();
    let right = state.anchors.right_molar_point();

    state.molar_mid = match (left, right) {
        (Some(l), Some(r)) => midpoint(Some(l), Some(r)),
        _ => None,
    };
    state.raw_ey = left.zip(right).and_then(|(l, r)| (l - r).try_normalize(eps));

    state.incisal_mid = state.anchors.incisors();
    if state.incisal_mid.is_none() {
        state.incisal_mid = state.anchors.canines();
        if state.incisal_mid.is_some() {
            state.fallback("incisal mid missing; used canines mid as proxy");
        }
    }
    state.raw_ex = state
        .incisal_mid
        .zip(state.molar_mid)
        .and_then(|(a, p)| (a - p).try_normalize(eps));

    let cos = state.raw_ex.zip(state.raw_ey).map(|(x, y)| x.dot(&y).abs());
    match cos {
        Some(c) if c <= state.config.tolerances.colinearity => Continue(state),
        _ => {
            let err = FrameError::degenerate(match cos {
                Some(c) => format!("ex/ey nearly colinear (|cos|={c:.3})"),
                None => "ex/ey missing".to_string(),
            });
            if state.geometry.is_some() {
                Break(state.geometry_or_missing(format!("{err}; used geometry axes")))
            } else {
                Break(state.missing(format!("{err}; cannot form stable in-plane axes")))
            }
        }
    }
}

/// S3: orthonormal axes, with the geometric normal authoritative if present.
pub(crate) fn orthogonalize_axes(mut state: CascadeState<'_>) -> Step<'_> {
    let eps = state.eps();
    let (ex, ey) = (state.raw_ex, state.raw_ey);

    let triad = if let Some(normal) = state.geometry.as_ref().map(|g| g.frame.ez) {
        if state.origin.is_none() {
            state.origin = midpoint(state.incisal_mid, state.molar_mid);
        }
        orthogonalize(
            ex.map(|v| project_onto_plane(&v, &normal)),
            ey.map(|v| project_onto_plane(&v, &normal)),
            Some(normal),
            eps,
        )
    } else {
        let normal = ex.zip(ey).map(|(x, y)| x.cross(&y));
        state.origin = midpoint(state.incisal_mid, state.molar_mid);
        state.quality = state.quality.downgrade();
        state.used.plane = Some(PlaneSource::Landmarks);
        orthogonalize(ex, ey, normal, eps)
    };

    match triad {
        Some(triad) => {
            state.axes = Some(triad);
            Continue(state)
        }
        None => Break(
            state.missing(FrameError::degenerate("failed to orthogonalize axes").to_string()),
        ),
    }
}

/// S4: make `ez` point from the lower incisors toward the upper ones.
pub(crate) fn vertical_polarity(mut state: CascadeState<'_>) -> Step<'_> {
    let Some(axes) = state.axes else {
        return Break(axes_not_established(state));
    };
    let (Some(upper), Some(lower)) = (
        state.anchors.upper_incisors(),
        state.anchors.lower_incisors(),
    ) else {
        state.fallback("Z polarity skipped (insufficient incisors)");
        return Continue(state);
    };

    if (upper - lower).dot(&axes.ez) < 0.0 {
        state = match state.reorthogonalize(-axes.ex, axes.ey, -axes.ez) {
            Continue(next) => next,
            Break(done) => return Break(done),
        };
    }
    state.used.z_from = Some(Z_FROM_INCISORS.to_string());
    Continue(state)
}

/// S5: make `ey` point from the right lower canine to the left one.
pub(crate) fn transverse_polarity(mut state: CascadeState<'_>) -> Step<'_> {
    let Some(axes) = state.axes else {
        return Break(axes_not_established(state));
    };
    let left = state.anchors.canine_33.as_ref().map(|p| p.point);
    let right = state.anchors.canine_43.as_ref().map(|p| p.point);
    let (Some(left), Some(right)) = (left, right) else {
        state.fallback("Y polarity skipped (missing canines)");
        return Continue(state);
    };

    if (left - right).dot(&axes.ey) < 0.0 {
        let ey = -axes.ey;
        let ex = ey.cross(&axes.ez);
        state = match state.reorthogonalize(ex, ey, axes.ez) {
            Continue(next) => next,
            Break(done) => return Break(done),
        };
    }
    state.used.y_from = Some(Y_FROM_CANINES.to_string());
    Continue(state)
}

/// S6: align `ex` with the in-plane molar-to-incisor direction.
pub(crate) fn sagittal_refinement(mut state: CascadeState<'_>) -> Step<'_> {
    let Some(axes) = state.axes else {
        return Break(axes_not_established(state));
    };
    let (Some(a), Some(p)) = (state.incisal_mid, state.molar_mid) else {
        state.fallback("X fine-tune skipped (missing A or P)");
        return Continue(state);
    };
    let Some(direction) = project_onto_plane(&(a - p), &axes.ez).try_normalize(state.eps()) else {
        state.fallback("X fine-tune skipped (degenerate A-P)");
        return Continue(state);
    };

    let direction = if direction.dot(&axes.ex) < 0.0 {
        -direction
    } else {
        direction
    };
    state = match state.reorthogonalize(direction, axes.ey, axes.ez) {
        Continue(next) => next,
        Break(done) => return Break(done),
    };
    state.used.x_from = Some(X_FROM_MIDPOINTS.to_string());
    Continue(state)
}

/// S7: fill in the origin if no earlier stage set it.
pub(crate) fn origin_resolution(mut state: CascadeState<'_>) -> Step<'_> {
    if state.origin.is_none() {
        state.origin = midpoint(state.incisal_mid, state.molar_mid);
    }
    if state.origin.is_none() {
        let err = FrameError::landmarks("no point to anchor the origin");
        return Break(state.missing(err.to_string()));
    }
    Continue(state)
}
