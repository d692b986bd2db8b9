//! Synthetic dentition shared by the integration tests.
//!
//! Canonical coordinates: X anterior, Y patient left, Z toward the maxilla.

#![allow(dead_code, clippy::cast_precision_loss)]

use nalgebra::{Point3, Rotation3, Vector3};
use ortho_types::LandmarkSet;

/// The eight anchors the frame builder uses, in canonical position.
pub const CANONICAL: [(&str, [f64; 3]); 8] = [
    ("26mb", [-20.0, 22.0, 0.0]),
    ("16mb", [-20.0, -22.0, 0.0]),
    ("11m", [10.0, -2.0, 1.0]),
    ("21m", [10.0, 2.0, 1.0]),
    ("31m", [9.0, 2.0, -1.0]),
    ("41m", [9.0, -2.0, -1.0]),
    ("33m", [5.0, 12.0, -1.0]),
    ("43m", [5.0, -12.0, -1.0]),
];

/// A rigid placement of the canonical dentition in scan space.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl Placement {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn apply(&self, p: Point3<f64>) -> Point3<f64> {
        self.rotation * p + self.translation
    }

    pub fn axis(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.rotation * v
    }
}

/// Canonical landmarks moved by `placement`.
pub fn landmarks(placement: &Placement) -> LandmarkSet {
    CANONICAL
        .iter()
        .map(|(name, [x, y, z])| (*name, placement.apply(Point3::new(*x, *y, *z))))
        .collect()
}

/// A gently undulating occlusal sheet of `n × n` points around the origin.
pub fn occlusal_cloud(n: usize, placement: &Placement) -> Vec<Point3<f64>> {
    let mut pts = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let x = i as f64 * 50.0 / n as f64 - 25.0;
            let y = j as f64 * 60.0 / n as f64 - 30.0;
            let z = 0.3 * (0.3 * x).sin() * (0.2 * y).cos();
            pts.push(placement.apply(Point3::new(x, y, z)));
        }
    }
    pts
}
