//! Landmark JSON loading.
//!
//! Two layouts are accepted:
//!
//! ```text
//! 3D Slicer markups               Plain map
//! {                               {
//!   "markups": [{                   "16mb": [x, y, z],
//!     "controlPoints": [            "26mb": [x, y, z]
//!       {"label": "16mb",         }
//!        "position": [x, y, z]}
//!     ]
//!   }]
//! }
//! ```
//!
//! Entries without a label or without three numeric coordinates are
//! skipped, not rejected. Coordinates given as numeric strings are accepted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nalgebra::Point3;
use ortho_types::LandmarkSet;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Load landmarks from a JSON file in either supported layout.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not JSON, or its top
/// level is not an object.
///
/// # Example
///
/// ```no_run
/// use ortho_io::load_landmarks;
///
/// let upper = load_landmarks("upper.json").unwrap();
/// println!("{} landmarks", upper.len());
/// ```
pub fn load_landmarks<P: AsRef<Path>>(path: P) -> IoResult<LandmarkSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::opening(path, e))?;
    let landmarks = read_landmarks(BufReader::new(file))?;
    debug!(path = %path.display(), landmarks = landmarks.len(), "Loaded landmarks");
    Ok(landmarks)
}

/// Read landmarks from any JSON source.
///
/// # Errors
///
/// Returns an error if the input is not JSON or its top level is not an
/// object.
pub fn read_landmarks<R: Read>(reader: R) -> IoResult<LandmarkSet> {
    let value: Value = serde_json::from_reader(reader)?;
    parse_landmarks(&value)
}

/// Extract landmarks from an already parsed JSON document.
///
/// # Errors
///
/// Returns [`IoError::InvalidContent`] if `value` is not an object.
pub fn parse_landmarks(value: &Value) -> IoResult<LandmarkSet> {
    let object = value
        .as_object()
        .ok_or_else(|| IoError::invalid_content("landmark file must be a JSON object"))?;

    let (landmarks, skipped) = match object.get("markups") {
        Some(markups) => from_markups(markups),
        None => from_plain_map(object),
    };
    if skipped > 0 {
        debug!(skipped, "Skipped malformed landmark entries");
    }
    Ok(landmarks)
}

/// Merge landmark sets in order. Later sets override earlier ones.
#[must_use]
pub fn merge_landmarks<I>(sets: I) -> LandmarkSet
where
    I: IntoIterator<Item = LandmarkSet>,
{
    sets.into_iter().fold(LandmarkSet::new(), |mut merged, set| {
        merged.extend(set);
        merged
    })
}

fn from_markups(markups: &Value) -> (LandmarkSet, usize) {
    let mut landmarks = LandmarkSet::new();
    let mut skipped = 0;
    let control_points = markups
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|markup| markup.get("controlPoints")?.as_array())
        .flatten();
    for cp in control_points {
        match (cp.get("label").and_then(label), cp.get("position").and_then(point)) {
            (Some(name), Some(p)) => landmarks.insert(name, p),
            _ => skipped += 1,
        }
    }
    (landmarks, skipped)
}

fn from_plain_map(object: &Map<String, Value>) -> (LandmarkSet, usize) {
    let mut landmarks = LandmarkSet::new();
    let mut skipped = 0;
    for (name, value) in object {
        match point(value) {
            Some(p) if !name.is_empty() => landmarks.insert(name.as_str(), p),
            _ => skipped += 1,
        }
    }
    (landmarks, skipped)
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn point(value: &Value) -> Option<Point3<f64>> {
    match value.as_array()?.as_slice() {
        [x, y, z] => Some(Point3::new(coordinate(x)?, coordinate(y)?, coordinate(z)?)),
        _ => None,
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|c: &f64| c.is_finite())
}
