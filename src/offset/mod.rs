//! Inset contours read off a straight skeleton.
//!
//! Inside the roof face of contour edge `f`, the wavefront at time `d` is
//! the line `n_f · p = c_f + d`. Where that line passes through the face it
//! enters and leaves across skeleton edges whose end times straddle `d`;
//! the entry/exit pairs form chords, and chords from adjacent faces share
//! their end points through twin half-edges.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{OffsetError, OperationError, Result};
use crate::math::polygon_2d::{bounding_diagonal, signed_area};
use crate::math::{Point2, TOLERANCE};
use crate::skeleton::{EdgeKind, HalfEdgeId, SkeletonGraph};

/// A closed inset contour.
///
/// Contours derived from the outer ring run counter-clockwise; contours
/// derived from holes run clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetContour {
    points: Vec<Point2>,
}

impl OffsetContour {
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area; negative for hole-type contours.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    half_edge: HalfEdgeId,
    twin: HalfEdgeId,
    point: Point2,
    /// The half-edge runs from above the offset time to below it.
    descending: bool,
}

#[derive(Debug, Clone, Copy)]
struct Chord {
    start: Crossing,
    end: Crossing,
}

/// Extracts the contours of a skeleton's polygon shrunk by `distance`.
pub struct OffsetPolygons2D<'a> {
    graph: &'a SkeletonGraph,
    distance: f64,
}

impl<'a> OffsetPolygons2D<'a> {
    /// Creates a new `OffsetPolygons2D` operation.
    #[must_use]
    pub fn new(graph: &'a SkeletonGraph, distance: f64) -> Self {
        Self { graph, distance }
    }

    /// Computes the inset contours.
    ///
    /// A non-positive distance returns the original rings. Parts of the
    /// polygon eroded completely contribute nothing, so the result may be
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for a NaN distance, and
    /// [`OffsetError`] if the crossings of a face cannot be paired or a
    /// contour cannot be closed.
    pub fn execute(&self) -> Result<Vec<OffsetContour>> {
        if self.distance.is_nan() {
            return Err(OperationError::InvalidInput("offset distance is NaN".into()).into());
        }
        if self.distance <= 0.0 {
            return Ok(self
                .graph
                .rings()
                .iter()
                .map(|ring| OffsetContour {
                    points: ring.clone(),
                })
                .collect());
        }

        let chords = self.chords()?;
        let eps = TOLERANCE * bounding_diagonal(self.graph.rings().iter().flatten()).max(1.0);
        let contours = chain_chords(&chords, eps)?;
        info!(
            distance = self.distance,
            chords = chords.len(),
            contours = contours.len(),
            "Extracted offset contours"
        );
        Ok(contours)
    }

    /// Crossings of the offset front with every face boundary, grouped by face.
    fn crossings(&self) -> Vec<Vec<Crossing>> {
        let d = self.distance;
        let mut by_face = vec![Vec::new(); self.graph.contour_edges().len()];
        for (id, he) in self.graph.half_edges() {
            let Some(face) = he.face else { continue };
            if he.kind == EdgeKind::Border {
                continue;
            }
            let (Some((t0, t1)), Some((p0, p1))) = (self.graph.times(id), self.graph.endpoints(id))
            else {
                continue;
            };
            if (t0 <= d) == (t1 <= d) {
                continue;
            }
            let s = (d - t0) / (t1 - t0);
            by_face[face].push(Crossing {
                half_edge: id,
                twin: he.twin,
                point: p0 + (p1 - p0) * s,
                descending: t0 > d,
            });
        }
        by_face
    }

    /// Pairs the crossings of each face into chords running along the face's
    /// contour edge direction.
    fn chords(&self) -> Result<Vec<Chord>> {
        let mut chords = Vec::new();
        for (face, mut crossings) in self.crossings().into_iter().enumerate() {
            if crossings.is_empty() {
                continue;
            }
            if crossings.len() % 2 != 0 {
                return Err(OffsetError::OddCrossings {
                    face,
                    count: crossings.len(),
                }
                .into());
            }
            let direction = self.graph.contour_edges()[face].direction;
            crossings.sort_by(|a, b| {
                direction
                    .dot(&a.point.coords)
                    .total_cmp(&direction.dot(&b.point.coords))
            });
            for pair in crossings.chunks_exact(2) {
                let (start, end) = (pair[0], pair[1]);
                if !start.descending || end.descending {
                    return Err(OffsetError::MalformedChord { face }.into());
                }
                chords.push(Chord { start, end });
            }
        }
        debug!(chords = chords.len(), "Paired offset crossings");
        Ok(chords)
    }
}

/// Links chords into closed loops: a chord ending on half-edge `h` is
/// followed by the chord starting on the twin of `h`.
fn chain_chords(chords: &[Chord], eps: f64) -> Result<Vec<OffsetContour>> {
    let by_start: HashMap<HalfEdgeId, usize> = chords
        .iter()
        .enumerate()
        .map(|(i, c)| (c.start.half_edge, i))
        .collect();

    let mut visited = vec![false; chords.len()];
    let mut contours = Vec::new();
    for first in 0..chords.len() {
        if visited[first] {
            continue;
        }
        let mut points = Vec::new();
        let mut current = first;
        loop {
            if visited[current] {
                if current == first {
                    break;
                }
                return Err(OffsetError::OpenLoop(format!(
                    "chord {current} reached twice before closing"
                ))
                .into());
            }
            visited[current] = true;
            let chord = chords[current];
            points.push(chord.start.point);
            current = by_start.get(&chord.end.twin).copied().ok_or_else(|| {
                OffsetError::OpenLoop(format!("no chord continues chord {current}"))
            })?;
        }
        let points = dedup_ring(points, eps);
        if points.len() >= 3 {
            contours.push(OffsetContour { points });
        }
    }
    Ok(contours)
}

/// Drops consecutive points closer than `eps`, including across the seam.
fn dedup_ring(points: Vec<Point2>, eps: f64) -> Vec<Point2> {
    let mut ring: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last().is_none_or(|last: &Point2| (p - *last).norm() > eps) {
            ring.push(p);
        }
    }
    while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() <= eps {
        ring.pop();
    }
    ring
}
