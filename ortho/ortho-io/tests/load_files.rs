//! Loading landmark and scan files from disk.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use nalgebra::Point3;
use ortho_io::{
    combine_point_clouds, load_landmarks, load_stl_points, merge_landmarks, IoError,
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Binary STL with one triangle per `corner`, all three vertices equal.
fn binary_stl(corners: &[[f32; 3]]) -> Vec<u8> {
    let mut bytes = vec![0u8; 80];
    bytes.extend_from_slice(&u32::try_from(corners.len()).unwrap().to_le_bytes());
    for corner in corners {
        bytes.extend_from_slice(&[0u8; 12]);
        for _ in 0..3 {
            for c in corner {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&[0u8; 2]);
    }
    bytes
}

#[test]
fn upper_and_lower_landmark_files_merge() {
    let dir = tempdir().unwrap();
    let upper = write(
        dir.path(),
        "upper.mrk.json",
        br#"{"markups": [{"controlPoints": [
            {"label": "16mb", "position": [-20.0, -22.0, 0.0]},
            {"label": "11m", "position": [10.0, -2.0, 1.0]}
        ]}]}"#,
    );
    let lower = write(
        dir.path(),
        "lower.json",
        br#"{"46mb": [-23.0, -20.0, -1.0], "11m": [10.0, -2.0, 1.5]}"#,
    );

    let merged = merge_landmarks([
        load_landmarks(&upper).unwrap(),
        load_landmarks(&lower).unwrap(),
    ]);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get("11m"), Some(Point3::new(10.0, -2.0, 1.5)));
    assert_eq!(merged.get("46mb"), Some(Point3::new(-23.0, -20.0, -1.0)));
}

#[test]
fn missing_file_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match load_landmarks(&path) {
        Err(IoError::FileNotFound { path: p }) => assert_eq!(p, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert!(matches!(
        load_stl_points(dir.path().join("absent.stl")),
        Err(IoError::FileNotFound { .. })
    ));
}

#[test]
fn arches_concatenate_in_order() {
    let dir = tempdir().unwrap();
    let upper = write(dir.path(), "upper.stl", &binary_stl(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
    let ascii = b"solid lower
 facet normal 0 0 1
  outer loop
   vertex 7 8 9
   vertex 7 8 9
   vertex 7 8 9
  endloop
 endfacet
endsolid lower
";
    let lower = write(dir.path(), "lower.stl", ascii);

    let cloud = combine_point_clouds([
        Some(load_stl_points(&upper).unwrap()),
        Some(load_stl_points(&lower).unwrap()),
    ])
    .unwrap();
    assert_eq!(cloud.len(), 9);
    assert_eq!(cloud[0], Point3::new(1.0, 2.0, 3.0));
    assert_eq!(cloud[5], Point3::new(4.0, 5.0, 6.0));
    assert_eq!(cloud[8], Point3::new(7.0, 8.0, 9.0));
}
