use crate::error::{OperationError, PolygonError, Result};
use crate::math::{Point2, Point3};
use crate::polygon::{OrientationPolicy, PolygonWithHoles};

/// Splits interleaved `(x, y)` coordinates into rings and validates them.
///
/// `ring_sizes[0]` is the outer ring; the remaining entries are holes.
///
/// # Errors
///
/// Returns `PolygonError::Encoding` if the sizes do not describe the
/// coordinate array exactly, or any other [`PolygonError`] raised by
/// validation.
pub fn decode_polygon(
    vertices: &[f64],
    ring_sizes: &[i32],
    policy: OrientationPolicy,
) -> Result<PolygonWithHoles> {
    if ring_sizes.is_empty() {
        return Err(PolygonError::Encoding("no rings given".into()).into());
    }
    if vertices.len() % 2 != 0 {
        return Err(PolygonError::Encoding(format!(
            "{} coordinates do not form (x, y) pairs",
            vertices.len()
        ))
        .into());
    }

    let mut sizes = Vec::with_capacity(ring_sizes.len());
    for (ring, &size) in ring_sizes.iter().enumerate() {
        let size = usize::try_from(size).map_err(|_| {
            PolygonError::Encoding(format!("ring {ring} has negative size {size}"))
        })?;
        sizes.push(size);
    }
    let expected: usize = sizes.iter().sum();
    if expected * 2 != vertices.len() {
        return Err(PolygonError::Encoding(format!(
            "ring sizes describe {expected} points but {} were given",
            vertices.len() / 2
        ))
        .into());
    }

    let points: Vec<Point2> = vertices
        .chunks_exact(2)
        .map(|xy| Point2::new(xy[0], xy[1]))
        .collect();
    let mut rings = Vec::with_capacity(sizes.len());
    let mut offset = 0;
    for size in sizes {
        rings.push(points[offset..offset + size].to_vec());
        offset += size;
    }

    let mut rings = rings.into_iter();
    let outer = rings.next().unwrap_or_default();
    Ok(PolygonWithHoles::build_with(outer, rings.collect(), policy)?)
}

/// Reads interleaved `(x, y, z)` coordinates.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if the length is not a multiple
/// of three.
pub fn decode_points_3d(coords: &[f64]) -> Result<Vec<Point3>> {
    if coords.len() % 3 != 0 {
        return Err(OperationError::InvalidInput(format!(
            "{} coordinates do not form (x, y, z) triples",
            coords.len()
        ))
        .into());
    }
    Ok(coords
        .chunks_exact(3)
        .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

/// Reads `(a, b)` vertex index pairs.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` for an odd length or a negative
/// index.
pub fn decode_index_pairs(indices: &[i32]) -> Result<Vec<(usize, usize)>> {
    if indices.len() % 2 != 0 {
        return Err(OperationError::InvalidInput(format!(
            "{} indices do not form pairs",
            indices.len()
        ))
        .into());
    }
    indices
        .chunks_exact(2)
        .map(|pair| -> Result<(usize, usize)> {
            let a = usize::try_from(pair[0]);
            let b = usize::try_from(pair[1]);
            match (a, b) {
                (Ok(a), Ok(b)) => Ok((a, b)),
                _ => Err(OperationError::InvalidInput(format!(
                    "negative vertex index in edge ({}, {})",
                    pair[0], pair[1]
                ))
                .into()),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RooflineError;

    const SQUARE_WITH_HOLE: [f64; 16] = [
        0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, // outer
        4.0, 4.0, 4.0, 6.0, 6.0, 6.0, 6.0, 4.0, // hole
    ];

    #[test]
    fn decodes_outer_and_hole() {
        let poly = decode_polygon(&SQUARE_WITH_HOLE, &[4, 4], OrientationPolicy::Reorient).unwrap();
        assert_eq!(poly.outer().len(), 4);
        assert_eq!(poly.holes().len(), 1);
        assert_eq!(poly.holes()[0][0], Point2::new(4.0, 4.0));
    }

    #[test]
    fn size_mismatch_is_encoding_error() {
        let err = decode_polygon(&SQUARE_WITH_HOLE, &[4, 3], OrientationPolicy::Reorient)
            .unwrap_err();
        assert!(matches!(
            err,
            RooflineError::InvalidPolygon(PolygonError::Encoding(_))
        ));
    }

    #[test]
    fn negative_size_is_encoding_error() {
        let err = decode_polygon(&SQUARE_WITH_HOLE, &[10, -2], OrientationPolicy::Reorient)
            .unwrap_err();
        assert!(matches!(
            err,
            RooflineError::InvalidPolygon(PolygonError::Encoding(_))
        ));
    }

    #[test]
    fn empty_ring_list_rejected() {
        assert!(decode_polygon(&[], &[], OrientationPolicy::Reorient).is_err());
    }

    #[test]
    fn two_point_ring_rejected() {
        let err = decode_polygon(&[0.0, 0.0, 1.0, 1.0], &[2], OrientationPolicy::Reorient)
            .unwrap_err();
        assert!(matches!(
            err,
            RooflineError::InvalidPolygon(PolygonError::TooFewPoints { ring: 0, count: 2 })
        ));
    }

    #[test]
    fn index_pairs_reject_negative() {
        assert_eq!(decode_index_pairs(&[0, 1, 2, 3]).unwrap(), vec![(0, 1), (2, 3)]);
        assert!(decode_index_pairs(&[0, -1]).is_err());
        assert!(decode_index_pairs(&[0]).is_err());
    }

    #[test]
    fn points_3d_require_triples() {
        assert_eq!(decode_points_3d(&[1.0, 2.0, 3.0]).unwrap().len(), 1);
        assert!(decode_points_3d(&[1.0, 2.0]).is_err());
    }
}
