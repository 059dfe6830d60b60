//! Flat-array entry points.
//!
//! Each function decodes plain slices, runs the corresponding operation and
//! copies the result into owned buffers. Nothing is copied until the whole
//! computation has succeeded, so an error never leaves a partial result.

pub mod buffers;
pub mod decode;

pub use buffers::{MstBuffers, ObbBuffers, OffsetBuffers, SkeletonBuffers};
pub use decode::{decode_index_pairs, decode_points_3d, decode_polygon};

use tracing::warn;

use crate::collab::{MinSpanningTree, OrientedBoundingBox3D};
use crate::error::Result;
use crate::offset::OffsetPolygons2D;
use crate::skeleton::{SkeletonOptions, StraightSkeleton2D};

/// Computes the straight skeleton of a flat-encoded polygon with holes.
///
/// `vertices` holds interleaved `(x, y)` pairs for all rings, outer ring
/// first; `ring_sizes` gives the point count of each ring.
///
/// # Errors
///
/// Returns [`crate::error::PolygonError`] for malformed or invalid input and
/// [`crate::error::SkeletonError`] if the skeleton cannot be built.
pub fn straight_skeleton_by_polygon_with_holes(
    vertices: &[f64],
    ring_sizes: &[i32],
    options: &SkeletonOptions,
) -> Result<SkeletonBuffers> {
    let run = || -> Result<_> {
        let polygon = decode_polygon(vertices, ring_sizes, options.orientation)?;
        let graph = StraightSkeleton2D::new(&polygon)
            .with_options(*options)
            .execute()?;
        SkeletonBuffers::from_graph(&graph)
    };
    run().inspect_err(|err| warn!(rings = ring_sizes.len(), %err, "Skeleton export failed"))
}

/// Computes the inset contours of a flat-encoded polygon at `distance`.
///
/// # Errors
///
/// Returns [`crate::error::PolygonError`] for invalid input, or the skeleton
/// and offset errors raised along the way.
pub fn create_offset_polygons(
    vertices: &[f64],
    ring_sizes: &[i32],
    distance: f64,
    options: &SkeletonOptions,
) -> Result<OffsetBuffers> {
    let run = || -> Result<_> {
        let polygon = decode_polygon(vertices, ring_sizes, options.orientation)?;
        let graph = StraightSkeleton2D::new(&polygon)
            .with_options(*options)
            .execute()?;
        let contours = OffsetPolygons2D::new(&graph, distance).execute()?;
        OffsetBuffers::from_contours(&contours)
    };
    run().inspect_err(|err| warn!(distance, %err, "Offset export failed"))
}

/// Minimum spanning forest over flat `(a, b)` index pairs.
///
/// # Errors
///
/// Returns [`crate::error::OperationError::InvalidInput`] for negative
/// indices, an odd index count, or a weight count that does not match.
pub fn kruskal_mst(edges: &[i32], weights: &[f64]) -> Result<MstBuffers> {
    let run = || -> Result<_> {
        let pairs = decode_index_pairs(edges)?;
        let tree = MinSpanningTree::new(pairs, weights.to_vec()).execute()?;
        MstBuffers::from_edges(&tree)
    };
    run().inspect_err(|err| warn!(edges = edges.len() / 2, %err, "Spanning tree export failed"))
}

/// Oriented bounding box of interleaved `(x, y, z)` points.
///
/// # Errors
///
/// Returns [`crate::error::OperationError::InvalidInput`] for an empty or
/// malformed point array.
pub fn oriented_bounding_box(points: &[f64]) -> Result<ObbBuffers> {
    let run = || -> Result<_> {
        let points = decode_points_3d(points)?;
        let corners = OrientedBoundingBox3D::new(points).execute()?;
        Ok(ObbBuffers::from_corners(&corners))
    };
    run().inspect_err(|err| warn!(coords = points.len(), %err, "Bounding box export failed"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{OperationError, PolygonError, RooflineError};

    const RECTANGLE: [f64; 8] = [0.0, 0.0, 10.0, 0.0, 10.0, 6.0, 0.0, 6.0];

    #[test]
    fn skeleton_of_rectangle() {
        let buffers =
            straight_skeleton_by_polygon_with_holes(&RECTANGLE, &[4], &SkeletonOptions::default())
                .unwrap();
        // 4 border pairs, 4 corner bisector pairs, 1 ridge pair.
        assert_eq!(buffers.edge_count, 18);
        assert_eq!(buffers.edge_type.iter().filter(|&&t| t == 0).count(), 2);
        assert_eq!(buffers.edge_type.iter().filter(|&&t| t == 1).count(), 8);
        assert_eq!(buffers.edge_type.iter().filter(|&&t| t == 2).count(), 8);
        let max_time = buffers.edge_times.iter().copied().fold(0.0, f64::max);
        assert!((max_time - 3.0).abs() < 1e-9);
    }

    #[test]
    fn clockwise_outer_is_reoriented_by_default() {
        let clockwise = [0.0, 0.0, 0.0, 6.0, 10.0, 6.0, 10.0, 0.0];
        let buffers =
            straight_skeleton_by_polygon_with_holes(&clockwise, &[4], &SkeletonOptions::default())
                .unwrap();
        assert_eq!(buffers.edge_count, 18);
    }

    #[test]
    fn strict_policy_rejects_clockwise_outer() {
        let clockwise = [0.0, 0.0, 0.0, 6.0, 10.0, 6.0, 10.0, 0.0];
        let options =
            SkeletonOptions::default().with_orientation(crate::polygon::OrientationPolicy::Strict);
        let err = straight_skeleton_by_polygon_with_holes(&clockwise, &[4], &options).unwrap_err();
        assert!(matches!(
            err,
            RooflineError::InvalidPolygon(PolygonError::Orientation { ring: 0, .. })
        ));
    }

    #[test]
    fn malformed_sizes_fail_before_any_output() {
        let err = straight_skeleton_by_polygon_with_holes(&RECTANGLE, &[5], &SkeletonOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RooflineError::InvalidPolygon(PolygonError::Encoding(_))
        ));
    }

    #[test]
    fn offset_of_framed_rectangle() {
        let vertices = [
            0.0, 0.0, 10.0, 0.0, 10.0, 6.0, 0.0, 6.0, // outer
            4.0, 2.0, 4.0, 4.0, 6.0, 4.0, 6.0, 2.0, // hole
        ];
        let options = SkeletonOptions::default();
        let buffers = create_offset_polygons(&vertices, &[4, 4], 0.5, &options).unwrap();
        assert_eq!(buffers.contour_count, 2);
        assert_eq!(buffers.contour_sizes, vec![4, 4]);
        assert_eq!(buffers.total_point_count, 8);
        assert_eq!(buffers.points.len(), 16);

        let gone = create_offset_polygons(&vertices, &[4, 4], 2.5, &options).unwrap();
        assert_eq!(gone.contour_count, 0);
        assert!(gone.points.is_empty());
    }

    #[test]
    fn offset_rejects_nan_distance() {
        let options = SkeletonOptions::default();
        let err = create_offset_polygons(&RECTANGLE, &[4], f64::NAN, &options).unwrap_err();
        assert!(matches!(
            err,
            RooflineError::Operation(OperationError::InvalidInput(_))
        ));
    }

    #[test]
    fn repeated_exports_are_identical() {
        let vertices = [0.0, 0.0, 7.0, 0.0, 7.0, 3.0, 4.0, 3.0, 4.0, 6.0, 0.0, 5.0];
        let options = SkeletonOptions::default();
        let first = straight_skeleton_by_polygon_with_holes(&vertices, &[6], &options).unwrap();
        let second = straight_skeleton_by_polygon_with_holes(&vertices, &[6], &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mst_over_flat_pairs() {
        let buffers = kruskal_mst(&[0, 1, 1, 2, 0, 2], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(buffers.edges, vec![0, 1, 1, 2]);
        assert_eq!(buffers.edge_count, 2);
    }

    #[test]
    fn mst_accepts_ids_near_i32_max() {
        let buffers = kruskal_mst(&[0, 1, 1, 2_000_000_000, 0, i32::MAX], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(buffers.edges, vec![0, 1, 1, 2_000_000_000, 0, i32::MAX]);
        assert_eq!(buffers.edge_count, 3);
    }

    #[test]
    fn mst_rejects_negative_index() {
        let err = kruskal_mst(&[0, -1], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            RooflineError::Operation(OperationError::InvalidInput(_))
        ));
    }

    #[test]
    fn obb_returns_24_values() {
        let points = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0];
        let buffers = oriented_bounding_box(&points).unwrap();
        assert_eq!(buffers.corners.len(), 24);
        assert!(oriented_bounding_box(&[]).is_err());
    }
}
