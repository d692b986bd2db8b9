//! STL vertex extraction.
//!
//! Only vertex positions are kept; facets, normals and attributes are
//! discarded. Both encodings are supported:
//!
//! - ASCII files start with "solid" (after optional whitespace) and have no
//!   NUL bytes in the first 80 bytes
//! - Everything else is read as binary: an 80-byte header, a `u32` triangle
//!   count, then 50 bytes per triangle
//!
//! Vertices are returned three per triangle, unwelded. Non-finite vertices
//! are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Upper bound on triangles reserved up front; the header count is untrusted.
const MAX_PREALLOC_TRIANGLES: u32 = 1 << 20;

/// Load the vertex positions of an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
///
/// # Example
///
/// ```no_run
/// use ortho_io::load_stl_points;
///
/// let points = load_stl_points("upper.stl").unwrap();
/// println!("{} vertices", points.len());
/// ```
pub fn load_stl_points<P: AsRef<Path>>(path: P) -> IoResult<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::opening(path, e))?;
    let points = read_stl_points(BufReader::new(file))?;
    debug!(path = %path.display(), points = points.len(), "Loaded STL vertices");
    Ok(points)
}

/// Read STL vertex positions from any buffered source.
///
/// # Errors
///
/// Returns an error if the content is not valid STL.
pub fn read_stl_points<R: BufRead>(mut reader: R) -> IoResult<Vec<Point3<f64>>> {
    let mut header = Vec::with_capacity(HEADER_SIZE + 4);
    (&mut reader)
        .take((HEADER_SIZE + 4) as u64)
        .read_to_end(&mut header)?;

    if header.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    let points = if is_ascii(&header) {
        read_ascii(header.as_slice().chain(reader))?
    } else {
        read_binary(&header, reader)?
    };

    let total = points.len();
    let finite: Vec<_> = points
        .into_iter()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .collect();
    if finite.len() < total {
        debug!(dropped = total - finite.len(), "Dropped non-finite STL vertices");
    }
    Ok(finite)
}

/// Concatenate per-arch point clouds. `None` when no arch was given.
#[must_use]
pub fn combine_point_clouds<I>(clouds: I) -> Option<Vec<Point3<f64>>>
where
    I: IntoIterator<Item = Option<Vec<Point3<f64>>>>,
{
    clouds.into_iter().flatten().reduce(|mut all, cloud| {
        all.extend(cloud);
        all
    })
}

/// Binary files may also start with "solid"; a NUL in the header gives
/// them away.
fn is_ascii(header: &[u8]) -> bool {
    let header = &header[..header.len().min(HEADER_SIZE)];
    let text = String::from_utf8_lossy(header);
    text.trim_start().starts_with("solid") && !header.contains(&0)
}

fn read_binary<R: Read>(header: &[u8], mut reader: R) -> IoResult<Vec<Point3<f64>>> {
    let Some(count) = header.get(HEADER_SIZE..HEADER_SIZE + 4) else {
        return Err(IoError::invalid_content("binary STL header is shorter than 84 bytes"));
    };
    let face_count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]);

    let mut points = Vec::with_capacity(face_count.min(MAX_PREALLOC_TRIANGLES) as usize * 3);
    let mut triangle = [0u8; TRIANGLE_SIZE];
    for i in 0..face_count {
        if let Err(e) = reader.read_exact(&mut triangle) {
            return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
                IoError::InvalidFaceCount {
                    expected: face_count,
                    got: i,
                }
            } else {
                IoError::Io(e)
            });
        }
        // Skip the 12-byte normal.
        points.push(read_vertex(&triangle[12..24]));
        points.push(read_vertex(&triangle[24..36]));
        points.push(read_vertex(&triangle[36..48]));
    }
    Ok(points)
}

fn read_vertex(buf: &[u8]) -> Point3<f64> {
    let f = |i: usize| {
        let bytes = [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]];
        f64::from(f32::from_le_bytes(bytes))
    };
    Point3::new(f(0), f(4), f(8))
}

fn read_ascii<R: Read>(reader: R) -> IoResult<Vec<Point3<f64>>> {
    let mut points = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("vertex") => {
                let coords: Vec<&str> = parts.take(3).collect();
                let [x, y, z] = coords.as_slice() else {
                    return Err(IoError::invalid_content(format!(
                        "vertex line needs three coordinates: {}",
                        line.trim()
                    )));
                };
                points.push(Point3::new(x.parse::<f64>()?, y.parse::<f64>()?, z.parse::<f64>()?));
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    Ok(points)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn binary(triangles: &[[[f32; 3]; 3]], declared: u32) -> Vec<u8> {
        let mut bytes = vec![b' '; HEADER_SIZE];
        bytes[..5].copy_from_slice(b"solid");
        bytes[10] = 0;
        bytes.extend_from_slice(&declared.to_le_bytes());
        for tri in triangles {
            bytes.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn ascii_vertices() {
        let text = b"solid arch
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      VERTEX 1.5 0 0
      vertex 0 1 -2e-1
    endloop
  endfacet
endsolid arch
vertex 9 9 9";
        let points = read_stl_points(&text[..]).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point3::new(1.5, 0.0, 0.0));
        assert!((points[2].z + 0.2).abs() < 1e-12);
    }

    #[test]
    fn ascii_drops_non_finite() {
        let text =
            b"solid s\nvertex 0 0 0\nvertex nan 0 0\nvertex 1 inf 0\nvertex 1 1 1\nendsolid s\n";
        let points = read_stl_points(&text[..]).unwrap();
        assert_eq!(points, vec![Point3::origin(), Point3::new(1.0, 1.0, 1.0)]);
    }

    #[test]
    fn ascii_bad_number_is_an_error() {
        let text = b"solid s\nvertex 0 zero 0\nendsolid s\n";
        assert!(matches!(read_stl_points(&text[..]), Err(IoError::ParseFloat(_))));
    }

    #[test]
    fn binary_with_solid_header() {
        let bytes = binary(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, f32::NAN]]], 1);
        let points = read_stl_points(bytes.as_slice()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn binary_truncated() {
        let bytes = binary(&[[[0.0; 3]; 3]], 2);
        let err = read_stl_points(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, IoError::InvalidFaceCount { expected: 2, got: 1 }));
    }

    #[test]
    fn huge_declared_count_is_truncated() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        let err = read_stl_points(bytes.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidFaceCount {
                expected: u32::MAX,
                got: 0
            }
        ));
    }

    #[test]
    fn too_small() {
        assert!(matches!(
            read_stl_points(&b"sol"[..]),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn combine_skips_absent_arches() {
        let upper = vec![Point3::origin()];
        let lower = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0)];
        assert_eq!(combine_point_clouds([Some(upper.clone()), None]), Some(upper));
        assert_eq!(combine_point_clouds([None, Some(lower)]).map(|c| c.len()), Some(2));
        assert_eq!(combine_point_clouds([None, None]), None);
    }
}
