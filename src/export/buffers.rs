use crate::collab::ObbCorners;
use crate::error::{OperationError, Result};
use crate::offset::OffsetContour;
use crate::skeleton::SkeletonGraph;

fn count_i32(count: usize, what: &str) -> Result<i32> {
    i32::try_from(count)
        .map_err(|_| OperationError::InvalidInput(format!("{count} {what} exceed i32 range")).into())
}

/// Flat copy of every skeleton half-edge, index-parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonBuffers {
    /// `(x0, y0, x1, y1)` per half-edge, origin first.
    pub edge_endpoints: Vec<f64>,
    /// `(t0, t1)` per half-edge.
    pub edge_times: Vec<f64>,
    /// 0 inner bisector, 1 outer bisector, 2 border.
    pub edge_type: Vec<i32>,
    pub edge_count: i32,
}

impl SkeletonBuffers {
    /// Copies the graph's half-edges in iteration order.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the edge count does not fit
    /// an `i32`.
    pub fn from_graph(graph: &SkeletonGraph) -> Result<Self> {
        let count = graph.half_edge_count();
        let mut buffers = Self {
            edge_endpoints: Vec::with_capacity(count * 4),
            edge_times: Vec::with_capacity(count * 2),
            edge_type: Vec::with_capacity(count),
            edge_count: count_i32(count, "half-edges")?,
        };
        for (id, he) in graph.half_edges() {
            let (Some((p0, p1)), Some((t0, t1))) = (graph.endpoints(id), graph.times(id)) else {
                return Err(OperationError::InvalidInput("dangling half-edge".into()).into());
            };
            buffers
                .edge_endpoints
                .extend_from_slice(&[p0.x, p0.y, p1.x, p1.y]);
            buffers.edge_times.extend_from_slice(&[t0, t1]);
            buffers.edge_type.push(he.kind.code());
        }
        Ok(buffers)
    }

    /// Releases the buffers. Consuming `self` makes a second release
    /// impossible.
    pub fn release(self) {}
}

/// Flat copy of a set of offset contours.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetBuffers {
    /// Interleaved `(x, y)` over all contours, concatenated.
    pub points: Vec<f64>,
    pub contour_sizes: Vec<i32>,
    pub contour_count: i32,
    pub total_point_count: i32,
}

impl OffsetBuffers {
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if a count does not fit an
    /// `i32`.
    pub fn from_contours(contours: &[OffsetContour]) -> Result<Self> {
        let total: usize = contours.iter().map(OffsetContour::len).sum();
        let mut points = Vec::with_capacity(total * 2);
        let mut contour_sizes = Vec::with_capacity(contours.len());
        for contour in contours {
            contour_sizes.push(count_i32(contour.len(), "contour points")?);
            points.extend(contour.points().iter().flat_map(|p| [p.x, p.y]));
        }
        Ok(Self {
            points,
            contour_sizes,
            contour_count: count_i32(contours.len(), "contours")?,
            total_point_count: count_i32(total, "points")?,
        })
    }

    /// Releases the buffers.
    pub fn release(self) {}
}

/// Selected spanning-tree edges as flat index pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct MstBuffers {
    pub edges: Vec<i32>,
    pub edge_count: i32,
}

impl MstBuffers {
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if an index or the count does
    /// not fit an `i32`.
    pub fn from_edges(tree: &[(usize, usize)]) -> Result<Self> {
        let mut edges = Vec::with_capacity(tree.len() * 2);
        for &(a, b) in tree {
            edges.push(count_i32(a, "vertex index")?);
            edges.push(count_i32(b, "vertex index")?);
        }
        Ok(Self {
            edges,
            edge_count: count_i32(tree.len(), "edges")?,
        })
    }

    /// Releases the buffers.
    pub fn release(self) {}
}

/// The 8 corners of an oriented box as 24 interleaved coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ObbBuffers {
    pub corners: Vec<f64>,
}

impl ObbBuffers {
    #[must_use]
    pub fn from_corners(corners: &ObbCorners) -> Self {
        Self {
            corners: corners.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
        }
    }

    /// Releases the buffers.
    pub fn release(self) {}
}
